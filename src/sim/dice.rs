//! Seeded dice
//!
//! Every random decision in the simulation (hit dice, crits, bullet noise)
//! goes through one `Dice`, so a run is reproducible from its seed.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

#[derive(Debug, Clone)]
pub struct Dice {
    seed: u64,
    rng: Pcg32,
}

impl Dice {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Roll one die with `faces` sides, 1..=faces (a zero-sided die rolls 0)
    pub fn roll(&mut self, faces: u32) -> u32 {
        if faces == 0 {
            return 0;
        }
        self.rng.random_range(1..=faces)
    }

    /// Roll `count` dice of `faces` sides and sum them
    pub fn roll_many(&mut self, count: u32, faces: u32) -> u32 {
        (0..count).map(|_| self.roll(faces)).sum()
    }

    /// True with the given probability in percent
    pub fn chance(&mut self, percent: f32) -> bool {
        self.rng.random::<f32>() * 100.0 < percent
    }

    /// Uniform value in [min, max)
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        if max <= min {
            return min;
        }
        self.rng.random_range(min..max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roll_stays_on_the_die() {
        let mut dice = Dice::new(7);
        for _ in 0..500 {
            let r = dice.roll(8);
            assert!((1..=8).contains(&r));
        }
        assert_eq!(dice.roll(0), 0);
    }

    #[test]
    fn test_same_seed_same_rolls() {
        let mut a = Dice::new(42);
        let mut b = Dice::new(42);
        let ra: Vec<u32> = (0..20).map(|_| a.roll(20)).collect();
        let rb: Vec<u32> = (0..20).map(|_| b.roll(20)).collect();
        assert_eq!(ra, rb);
    }

    #[test]
    fn test_chance_extremes() {
        let mut dice = Dice::new(1);
        for _ in 0..100 {
            assert!(!dice.chance(0.0));
            assert!(dice.chance(100.0));
        }
    }

    #[test]
    fn test_roll_many_bounds() {
        let mut dice = Dice::new(3);
        let total = dice.roll_many(8, 8);
        assert!((8..=64).contains(&total));
    }
}
