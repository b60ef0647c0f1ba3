//! Day-by-day schedule generator for Y-maze behavioral experiments:
//! balanced exit-arm assignment plus per-trial start-arm sequences.

pub mod animal;
pub mod error;
pub mod exit_arm;
pub mod export;
pub mod rng;
pub mod roster;
pub mod schedule;
pub mod trial_sequence;
