use std::time::{SystemTime, UNIX_EPOCH};

const DEFAULT_SEED: u64 = 0x9E3779B97F4A7C15;
const LCG_MULTIPLIER: u64 = 6364136223846793005;
const LCG_INCREMENT: u64 = 1442695040888963407;

/// Deterministic pseudo-random generator, one instance per schedule run.
/// Never process-global, so concurrent runs cannot interfere.
#[derive(Debug, Clone)]
pub struct SeededRng {
    state: u64,
}

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Seeded generator when a seed is supplied, otherwise a fresh
    /// time-derived one.
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::new(seed),
            None => Self::new(Self::entropy_seed()),
        }
    }

    fn entropy_seed() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(DEFAULT_SEED)
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(LCG_MULTIPLIER)
            .wrapping_add(LCG_INCREMENT);
        self.state
    }

    /// Uniform-ish draw in 0..bound. `bound` must be non-zero.
    pub fn next_below(&mut self, bound: usize) -> usize {
        (self.next_u64() % bound as u64) as usize
    }

    /// Fisher-Yates shuffle.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.next_below(i + 1);
            items.swap(i, j);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_shuffle() {
        let mut a: Vec<usize> = (0..20).collect();
        let mut b: Vec<usize> = (0..20).collect();
        SeededRng::new(42).shuffle(&mut a);
        SeededRng::new(42).shuffle(&mut b);
        assert_eq!(a, b);
    }

    #[test]
    fn test_shuffle_is_a_permutation() {
        let mut items: Vec<usize> = (0..50).collect();
        SeededRng::new(7).shuffle(&mut items);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut a = SeededRng::new(1);
        let mut b = SeededRng::new(2);
        let draws_a: Vec<u64> = (0..4).map(|_| a.next_u64()).collect();
        let draws_b: Vec<u64> = (0..4).map(|_| b.next_u64()).collect();
        assert_ne!(draws_a, draws_b);
    }
}
