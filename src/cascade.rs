//! Cascade generator
//!
//! Runs the first-order recurrence
//!
//! ```text
//! a[0] = initial_amplitude
//! a[i] = feedback_gain * a[i-1] * (1 - damping_factor) + noise_i
//! ```
//!
//! where `noise_i` is an independent zero-mean draw with standard deviation
//! `noise_level`. Nothing clamps the sign or magnitude of the result.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::noise::{GaussianNoise, NoiseSource};
use crate::params::CascadeParameters;
use crate::CascadeError;

/// One amplitude paired with its 1-based layer index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CascadePoint {
    pub layer: usize,
    pub amplitude: f64,
}

/// Amplitude at each layer, seed layer first.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CascadeSequence {
    amplitudes: Vec<f64>,
}

impl CascadeSequence {
    pub fn amplitudes(&self) -> &[f64] {
        &self.amplitudes
    }

    pub fn into_amplitudes(self) -> Vec<f64> {
        self.amplitudes
    }

    pub fn len(&self) -> usize {
        self.amplitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amplitudes.is_empty()
    }

    /// Amplitudes against the layer axis `1..=len`.
    pub fn points(&self) -> impl Iterator<Item = CascadePoint> + '_ {
        self.amplitudes
            .iter()
            .enumerate()
            .map(|(idx, &amplitude)| CascadePoint {
                layer: idx + 1,
                amplitude,
            })
    }

    pub fn final_amplitude(&self) -> Option<f64> {
        self.amplitudes.last().copied()
    }

    /// Largest absolute amplitude across all layers.
    pub fn peak_magnitude(&self) -> f64 {
        self.amplitudes.iter().map(|a| a.abs()).fold(0.0, f64::max)
    }
}

/// Generate a cascade after validating `params`.
pub fn generate<N>(params: &CascadeParameters, noise: &mut N) -> Result<CascadeSequence, CascadeError>
where
    N: NoiseSource + ?Sized,
{
    params.validate()?;
    Ok(run_recurrence(params, noise))
}

/// Generate a cascade with Gaussian noise drawn from `rng`.
pub fn generate_with_rng<R: Rng + ?Sized>(
    params: &CascadeParameters,
    rng: &mut R,
) -> Result<CascadeSequence, CascadeError> {
    generate(params, &mut GaussianNoise::new(rng))
}

// Total over `layer_count`: 0 yields an empty sequence, 1 only the seed.
fn run_recurrence<N>(params: &CascadeParameters, noise: &mut N) -> CascadeSequence
where
    N: NoiseSource + ?Sized,
{
    let mut amplitudes = Vec::with_capacity(params.layer_count);
    if params.layer_count == 0 {
        return CascadeSequence { amplitudes };
    }

    let retention = 1.0 - params.damping_factor;
    let mut prev = params.initial_amplitude;
    amplitudes.push(prev);

    for layer in 2..=params.layer_count {
        let perturbation = noise.draw(params.noise_level);
        let next = params.feedback_gain * prev * retention + perturbation;
        debug!(layer, prev, perturbation, next, "cascade layer");
        amplitudes.push(next);
        prev = next;
    }

    CascadeSequence { amplitudes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::{ScriptedNoise, SilentNoise};
    use approx::assert_relative_eq;

    fn noiseless(layers: usize, a: f64, d: f64, g: f64) -> CascadeParameters {
        CascadeParameters {
            layer_count: layers,
            initial_amplitude: a,
            damping_factor: d,
            feedback_gain: g,
            noise_level: 0.0,
        }
    }

    #[test]
    fn geometric_decay_scenario() {
        let seq = generate(&noiseless(5, 1.0, 0.1, 1.0), &mut SilentNoise).unwrap();
        let expected = [1.0, 0.9, 0.81, 0.729, 0.6561];

        assert_eq!(seq.len(), expected.len());
        for (got, want) in seq.amplitudes().iter().zip(expected) {
            assert_relative_eq!(*got, want, epsilon = 1e-12);
        }
    }

    #[test]
    fn seed_layer_is_untouched() {
        let params = CascadeParameters {
            layer_count: 8,
            initial_amplitude: 3.7,
            damping_factor: 0.4,
            feedback_gain: 1.8,
            noise_level: 0.5,
        };
        let mut noise = ScriptedNoise::new(vec![9.0; 8]);
        let seq = generate(&params, &mut noise).unwrap();
        assert_eq!(seq.amplitudes()[0], 3.7);
    }

    #[test]
    fn zero_gain_passes_noise_through() {
        let params = CascadeParameters {
            layer_count: 4,
            initial_amplitude: 2.0,
            damping_factor: 0.3,
            feedback_gain: 0.0,
            noise_level: 0.2,
        };
        let draws = vec![0.11, -0.07, 0.02];
        let seq = generate(&params, &mut ScriptedNoise::new(draws.clone())).unwrap();

        assert_eq!(seq.amplitudes()[0], 2.0);
        assert_eq!(&seq.amplitudes()[1..], draws.as_slice());
    }

    #[test]
    fn zero_gain_without_noise_collapses_to_zero() {
        let seq = generate(&noiseless(6, 1.5, 0.7, 0.0), &mut SilentNoise).unwrap();
        assert_eq!(seq.amplitudes(), &[1.5, 0.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn draws_once_per_layer_after_seed() {
        let params = CascadeParameters {
            layer_count: 12,
            ..CascadeParameters::default()
        };
        let mut noise = ScriptedNoise::default();
        generate(&params, &mut noise).unwrap();
        assert_eq!(noise.consumed(), 11);
    }

    #[test]
    fn invalid_params_are_rejected_before_drawing() {
        let params = CascadeParameters {
            noise_level: 0.9,
            ..CascadeParameters::default()
        };
        let mut noise = ScriptedNoise::default();
        assert!(matches!(
            generate(&params, &mut noise),
            Err(CascadeError::InvalidParameter { name: "noise_level", .. })
        ));
        assert_eq!(noise.consumed(), 0);
    }

    #[test]
    fn degenerate_layer_counts_are_total() {
        let empty = run_recurrence(&noiseless(0, 1.0, 0.1, 1.0), &mut SilentNoise);
        assert!(empty.is_empty());

        let single = run_recurrence(&noiseless(1, 1.0, 0.1, 1.0), &mut SilentNoise);
        assert_eq!(single.amplitudes(), &[1.0]);
    }

    #[test]
    fn points_use_one_based_layers() {
        let seq = generate(&noiseless(3, 2.0, 0.5, 1.0), &mut SilentNoise).unwrap();
        let points: Vec<CascadePoint> = seq.points().collect();
        assert_eq!(points[0], CascadePoint { layer: 1, amplitude: 2.0 });
        assert_eq!(points[2].layer, 3);
        assert_relative_eq!(points[2].amplitude, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn sequence_serializes_as_plain_array() {
        let seq = generate(&noiseless(3, 1.0, 0.0, 1.0), &mut SilentNoise).unwrap();
        assert_eq!(serde_json::to_string(&seq).unwrap(), "[1.0,1.0,1.0]");
    }
}
