use rand::{rngs::StdRng, Rng, SeedableRng};

/// Uniform die roller over an owned generator.
#[derive(Debug, Clone)]
pub struct RandomRoller {
  rng: StdRng,
}

impl RandomRoller {
  pub fn from_seed(seed: u64) -> Self {
    Self { rng: StdRng::seed_from_u64(seed) }
  }

  pub fn from_entropy() -> Self {
    Self { rng: StdRng::from_os_rng() }
  }

  /// Draws one value in `[1, sides]`. Callers guarantee `sides >= 2`.
  pub fn roll(&mut self, sides: u32) -> u32 {
    debug_assert!(sides >= 2, "d{sides} is not a rollable die");
    self.rng.random_range(1..=sides)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_rolls_stay_in_range_and_cover_faces() {
    let mut roller = RandomRoller::from_seed(7);
    for sides in [2u32, 4, 6, 8, 10, 12, 20, 100] {
      let mut seen = vec![false; sides as usize];
      for _ in 0..(sides * 200) {
        let value = roller.roll(sides);
        assert!((1..=sides).contains(&value), "d{sides} rolled {value}");
        seen[(value - 1) as usize] = true;
      }
      assert!(seen.iter().all(|s| *s), "d{sides} never rolled some faces");
    }
  }

  #[test]
  fn test_same_seed_same_sequence() {
    let mut a = RandomRoller::from_seed(42);
    let mut b = RandomRoller::from_seed(42);
    let left: Vec<u32> = (0..32).map(|_| a.roll(20)).collect();
    let right: Vec<u32> = (0..32).map(|_| b.roll(20)).collect();
    assert_eq!(left, right);
  }

  #[test]
  fn test_entropy_roller_in_range() {
    let mut roller = RandomRoller::from_entropy();
    for _ in 0..1000 {
      let value = roller.roll(6);
      assert!((1..=6).contains(&value));
    }
  }
}
