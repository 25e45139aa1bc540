//! Multiplicative noise applied to AQI forecasts.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Default half-width of the jitter band (±3%)
pub const DEFAULT_AMPLITUDE: f64 = 0.03;

/// Source of multiplicative perturbation factors
pub trait Jitter {
    /// Next factor, close to 1
    fn factor(&mut self) -> f64;

    fn apply(&mut self, value: f64) -> f64 {
        value * self.factor()
    }
}

/// Uniform factor in `[1 - amplitude, 1 + amplitude)`
#[derive(Debug, Clone)]
pub struct UniformJitter {
    rng: StdRng,
    amplitude: f64,
}

impl UniformJitter {
    /// Reproducible jitter
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            amplitude: DEFAULT_AMPLITUDE,
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            amplitude: DEFAULT_AMPLITUDE,
        }
    }

    pub fn with_amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = amplitude.abs();
        self
    }
}

impl Jitter for UniformJitter {
    fn factor(&mut self) -> f64 {
        1.0 + (self.rng.gen::<f64>() - 0.5) * 2.0 * self.amplitude
    }
}

/// Identity jitter for deterministic runs
#[derive(Debug, Clone, Copy, Default)]
pub struct NoJitter;

impl Jitter for NoJitter {
    fn factor(&mut self) -> f64 {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_within_band() {
        let mut jitter = UniformJitter::seeded(9);
        for _ in 0..1000 {
            let f = jitter.factor();
            assert!((0.97..1.03).contains(&f));
        }
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let mut a = UniformJitter::seeded(5);
        let mut b = UniformJitter::seeded(5);
        for _ in 0..10 {
            assert_eq!(a.factor(), b.factor());
        }
    }

    #[test]
    fn test_no_jitter() {
        assert_eq!(NoJitter.apply(42.0), 42.0);
    }

    #[test]
    fn test_zero_amplitude() {
        let mut jitter = UniformJitter::seeded(1).with_amplitude(0.0);
        assert_eq!(jitter.apply(10.0), 10.0);
    }
}
