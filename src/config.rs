use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::params::CascadeParameters;
use crate::CascadeError;

/// Config file picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "cascade.json";

/// Command-line values layered over a loaded [`RunConfig`]; `None` keeps the
/// file value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOverrides {
    pub layer_count: Option<usize>,
    pub initial_amplitude: Option<f64>,
    pub damping_factor: Option<f64>,
    pub feedback_gain: Option<f64>,
    pub noise_level: Option<f64>,
    pub seed: Option<u64>,
    pub clamp: Option<bool>,
    pub chart: Option<bool>,
    pub output_dir: Option<PathBuf>,
}

/// Runtime configuration for one cascade run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Cascade parameters
    pub params: CascadeParameters,
    /// RNG seed; `None` draws from OS entropy
    pub seed: Option<u64>,
    /// Clamp out-of-range parameters instead of rejecting them
    pub clamp: bool,
    /// Base directory for timestamped run directories
    pub output_dir: PathBuf,
    /// Render the line chart
    pub chart: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            params: CascadeParameters::default(),
            seed: None,
            clamp: false,
            output_dir: PathBuf::from("output-signal-cascade"),
            chart: true,
        }
    }
}

impl RunConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, CascadeError> {
        let raw = fs::read_to_string(path)?;
        let config: RunConfig = serde_json::from_str(&raw)?;
        Ok(config)
    }

    /// Load `path` if given, else `cascade.json` in the working directory if
    /// present, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, CascadeError> {
        Self::load_with_fallback(path, Path::new(DEFAULT_CONFIG_FILE))
    }

    pub fn load_with_fallback(path: Option<&Path>, fallback: &Path) -> Result<Self, CascadeError> {
        if let Some(path) = path {
            return Self::from_json_file(path);
        }

        if fallback.exists() {
            return Self::from_json_file(fallback);
        }

        Ok(Self::default())
    }

    pub fn apply_overrides(&mut self, overrides: &RunOverrides) {
        if let Some(v) = overrides.layer_count {
            self.params.layer_count = v;
        }
        if let Some(v) = overrides.initial_amplitude {
            self.params.initial_amplitude = v;
        }
        if let Some(v) = overrides.damping_factor {
            self.params.damping_factor = v;
        }
        if let Some(v) = overrides.feedback_gain {
            self.params.feedback_gain = v;
        }
        if let Some(v) = overrides.noise_level {
            self.params.noise_level = v;
        }
        if overrides.seed.is_some() {
            self.seed = overrides.seed;
        }
        if let Some(v) = overrides.clamp {
            self.clamp = v;
        }
        if let Some(v) = overrides.chart {
            self.chart = v;
        }
        if let Some(v) = &overrides.output_dir {
            self.output_dir = v.clone();
        }
    }

    /// Parameters ready for the generator.
    pub fn resolve_params(&self) -> Result<CascadeParameters, CascadeError> {
        if self.clamp {
            return Ok(self.params.clamped());
        }

        self.params.validate()?;
        Ok(self.params)
    }
}
