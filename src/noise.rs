use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// Source of the per-layer perturbation.
pub trait NoiseSource {
    /// Draw one zero-mean perturbation with the given standard deviation.
    fn draw(&mut self, std_dev: f64) -> f64;
}

impl<N: NoiseSource + ?Sized> NoiseSource for &mut N {
    fn draw(&mut self, std_dev: f64) -> f64 {
        (**self).draw(std_dev)
    }
}

/// Zero-mean normal noise backed by any `rand` generator.
#[derive(Debug, Clone)]
pub struct GaussianNoise<R> {
    rng: R,
}

impl<R: Rng> GaussianNoise<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn into_inner(self) -> R {
        self.rng
    }
}

impl GaussianNoise<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> NoiseSource for GaussianNoise<R> {
    fn draw(&mut self, std_dev: f64) -> f64 {
        let z: f64 = self.rng.sample(StandardNormal);
        std_dev * z
    }
}

/// Always returns zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentNoise;

impl NoiseSource for SilentNoise {
    fn draw(&mut self, _std_dev: f64) -> f64 {
        0.0
    }
}

/// Replays a fixed list of draws, then zeros once exhausted.
///
/// The requested standard deviation is ignored.
#[derive(Debug, Clone, Default)]
pub struct ScriptedNoise {
    draws: Vec<f64>,
    cursor: usize,
}

impl ScriptedNoise {
    pub fn new(draws: impl Into<Vec<f64>>) -> Self {
        Self {
            draws: draws.into(),
            cursor: 0,
        }
    }

    /// Number of draws handed out so far, including zeros past the end.
    pub fn consumed(&self) -> usize {
        self.cursor
    }
}

impl NoiseSource for ScriptedNoise {
    fn draw(&mut self, _std_dev: f64) -> f64 {
        let value = self.draws.get(self.cursor).copied().unwrap_or(0.0);
        self.cursor += 1;
        value
    }
}
