use crate::animal::{Animal, AnimalId, Stratum};
use crate::error::{ErrorCode, ScheduleError};
use crate::rng::SeededRng;
use std::collections::{BTreeMap, HashMap};

/// The three physical maze arms.
pub const ARMS: [u8; 3] = [1, 2, 3];

/// AnimalID -> exit arm, created once per run and immutable afterward.
/// BTreeMap so serialized schedules are byte-stable across runs.
pub type ExitArmMap = BTreeMap<AnimalId, u8>;

/// Running per-arm assignment counts for one scheduling run.
#[derive(Debug, Clone, Default)]
pub struct ArmTally {
    counts: [usize; 3],
}

impl ArmTally {
    pub fn count(&self, arm: u8) -> usize {
        self.counts[(arm - 1) as usize]
    }

    pub fn record(&mut self, arm: u8) {
        self.counts[(arm - 1) as usize] += 1;
    }
}

/// Assign every animal one of the three exit arms, balanced within each
/// (genotype, sex, cage) stratum and pulled toward even global totals.
///
/// Within a stratum the next animal always receives a stratum-least-used
/// arm, so per-stratum counts never differ by more than 1; ties go to the
/// globally least-used arm, then to the lower arm index. The seeded
/// shuffle of each stratum's member order is the only randomness.
pub fn assign_exit_arms(
    animals: &[Animal],
    rng: &mut SeededRng,
) -> Result<ExitArmMap, ScheduleError> {
    if animals.is_empty() {
        return Err(ScheduleError {
            code: ErrorCode::InvalidInput,
            message: "Roster is empty".to_string(),
        });
    }

    // Strata in first-seen roster order, members in roster order.
    let mut stratum_order: Vec<Stratum> = Vec::new();
    let mut members: HashMap<Stratum, Vec<usize>> = HashMap::new();
    for (pos, animal) in animals.iter().enumerate() {
        let key = animal.stratum_key();
        if !members.contains_key(&key) {
            stratum_order.push(key.clone());
        }
        members.entry(key).or_default().push(pos);
    }

    let mut global = ArmTally::default();
    let mut map = ExitArmMap::new();
    for key in &stratum_order {
        let mut positions = members[key].clone();
        rng.shuffle(&mut positions);
        let mut local = ArmTally::default();
        for pos in positions {
            let arm = pick_arm(&local, &global);
            local.record(arm);
            global.record(arm);
            let animal = &animals[pos];
            if map.insert(animal.animal_id.clone(), arm).is_some() {
                return Err(ScheduleError {
                    code: ErrorCode::InvalidInput,
                    message: format!("Duplicate AnimalID '{}'", animal.animal_id),
                });
            }
        }
    }
    Ok(map)
}

fn pick_arm(local: &ArmTally, global: &ArmTally) -> u8 {
    let mut best = ARMS[0];
    for &arm in &ARMS[1..] {
        if (local.count(arm), global.count(arm), arm)
            < (local.count(best), global.count(best), best)
        {
            best = arm;
        }
    }
    best
}
