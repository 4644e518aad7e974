//! Recursive Signal Cascade
//!
//! Simulates an amplitude that is repeatedly scaled by a feedback gain,
//! attenuated by a damping factor, and perturbed by zero-mean Gaussian noise
//! as it passes through a fixed number of layers.

pub mod cascade;
pub mod config;
pub mod noise;
pub mod output;
pub mod params;
pub mod regime;

use thiserror::Error;

// Re-export main types
pub use cascade::{generate, generate_with_rng, CascadePoint, CascadeSequence};
pub use config::{RunConfig, RunOverrides};
pub use noise::{GaussianNoise, NoiseSource, ScriptedNoise, SilentNoise};
pub use output::{create_timestamped_output_dir, write_run, OutputFiles, RunSummary};
pub use params::{CascadeParameters, ParamRange};
pub use regime::{expected_amplitude, loop_gain, Regime};

#[derive(Debug, Error)]
pub enum CascadeError {
    #[error("invalid parameter {name}: {value} is outside [{min}, {max}]")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("plot error: {0}")]
    Plot(String),
}
