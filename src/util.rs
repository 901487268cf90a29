//! Miscellaneous utility structs and functions.

use std::fmt::Debug;

use rand::distributions::uniform::SampleUniform;
use rand::Rng;

/// A closed interval on the real number line.
#[derive(Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Interval<T> {
    pub min: T,
    pub max: T,
}

impl<T> Interval<T> {
    /// Creates a new interval.
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

impl<T: Copy> Interval<T> {
    /// Creates an interval containing a single value.
    pub const fn exactly(value: T) -> Self {
        Self {
            min: value,
            max: value,
        }
    }
}

impl<T: PartialOrd> Interval<T> {
    /// Returns true if this interval contains the value.
    pub fn contains(&self, value: T) -> bool {
        value >= self.min && value <= self.max
    }
}

impl<T: SampleUniform + PartialOrd + Copy> Interval<T> {
    /// Draws a value uniformly from the interval, bounds included.
    ///
    /// Panics if `min > max`.
    pub fn sample(&self, rng: &mut impl Rng) -> T {
        rng.gen_range(self.min..=self.max)
    }
}

impl<T: Debug> Debug for Interval<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Interval({:?}, {:?})", &self.min, &self.max)
    }
}

#[cfg(test)]
mod test {
    use super::Interval;
    use rand::SeedableRng;

    #[test]
    fn samples_stay_in_bounds() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let ints = Interval::new(5u32, 8);
        let floats = Interval::new(0.2f32, 1.0);
        for _ in 0..500 {
            assert!(ints.contains(ints.sample(&mut rng)));
            assert!(floats.contains(floats.sample(&mut rng)));
        }
    }

    #[test]
    fn degenerate_interval() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        assert_eq!(Interval::exactly(42u32).sample(&mut rng), 42);
    }
}
