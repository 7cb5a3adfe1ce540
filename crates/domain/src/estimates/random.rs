use rand::{rngs::StdRng, Rng, SeedableRng};

/// Uniform draws in `[0, 1)` feeding the mock calculator.
pub trait RandomSource: Send {
    fn next_unit(&mut self) -> f64;
}

/// Entropy-seeded PRNG used outside of tests.
pub struct SystemRandom(StdRng);

impl SystemRandom {
    pub fn new() -> Self {
        Self(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl Default for SystemRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for SystemRandom {
    fn next_unit(&mut self) -> f64 {
        self.0.gen::<f64>()
    }
}

/// Replays the given values in order, wrapping around at the end.
#[derive(Clone, Debug)]
pub struct FixedSequence {
    values: Vec<f64>,
    cursor: usize,
}

impl FixedSequence {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, cursor: 0 }
    }

    /// The same value for every draw.
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }
}

impl RandomSource for FixedSequence {
    fn next_unit(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}
