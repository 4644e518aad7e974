//! Cascade parameters
//!
//! The five scalars that drive one cascade run, with their admissible ranges.

use serde::{Deserialize, Serialize};

use crate::CascadeError;

/// Closed interval `[min, max]` a parameter must lie in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    pub min: f64,
    pub max: f64,
}

impl ParamRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    fn check(&self, name: &'static str, value: f64) -> Result<(), CascadeError> {
        if self.contains(value) {
            return Ok(());
        }

        Err(CascadeError::InvalidParameter {
            name,
            value,
            min: self.min,
            max: self.max,
        })
    }
}

pub const LAYER_COUNT_MIN: usize = 3;
pub const LAYER_COUNT_MAX: usize = 20;

pub const LAYER_COUNT_RANGE: ParamRange =
    ParamRange::new(LAYER_COUNT_MIN as f64, LAYER_COUNT_MAX as f64);
pub const INITIAL_AMPLITUDE_RANGE: ParamRange = ParamRange::new(0.1, 5.0);
pub const DAMPING_FACTOR_RANGE: ParamRange = ParamRange::new(0.0, 1.0);
pub const FEEDBACK_GAIN_RANGE: ParamRange = ParamRange::new(0.0, 2.0);
pub const NOISE_LEVEL_RANGE: ParamRange = ParamRange::new(0.0, 0.5);

/// Cascade parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadeParameters {
    /// Number of layers, including the seed layer
    pub layer_count: usize,
    /// Amplitude of the first layer, passed through untouched
    pub initial_amplitude: f64,
    /// Fraction of the previous amplitude lost per layer
    pub damping_factor: f64,
    /// Multiplier applied to the previous amplitude per layer
    pub feedback_gain: f64,
    /// Standard deviation of the per-layer Gaussian perturbation
    pub noise_level: f64,
}

impl Default for CascadeParameters {
    fn default() -> Self {
        Self {
            layer_count: 10,
            initial_amplitude: 1.0,
            damping_factor: 0.1,
            feedback_gain: 1.0,
            noise_level: 0.1,
        }
    }
}

impl CascadeParameters {
    /// Build a validated parameter set.
    pub fn new(
        layer_count: usize,
        initial_amplitude: f64,
        damping_factor: f64,
        feedback_gain: f64,
        noise_level: f64,
    ) -> Result<Self, CascadeError> {
        let params = Self {
            layer_count,
            initial_amplitude,
            damping_factor,
            feedback_gain,
            noise_level,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), CascadeError> {
        LAYER_COUNT_RANGE.check("layer_count", self.layer_count as f64)?;
        INITIAL_AMPLITUDE_RANGE.check("initial_amplitude", self.initial_amplitude)?;
        DAMPING_FACTOR_RANGE.check("damping_factor", self.damping_factor)?;
        FEEDBACK_GAIN_RANGE.check("feedback_gain", self.feedback_gain)?;
        NOISE_LEVEL_RANGE.check("noise_level", self.noise_level)?;
        Ok(())
    }

    /// Pull every field into its range, the way a slider would.
    ///
    /// Non-finite fields fall back to the default value for that field.
    pub fn clamped(self) -> Self {
        let defaults = Self::default();
        let clamp_or = |range: ParamRange, value: f64, fallback: f64| {
            if !value.is_finite() {
                fallback
            } else {
                range.clamp(value)
            }
        };

        Self {
            layer_count: self.layer_count.clamp(LAYER_COUNT_MIN, LAYER_COUNT_MAX),
            initial_amplitude: clamp_or(
                INITIAL_AMPLITUDE_RANGE,
                self.initial_amplitude,
                defaults.initial_amplitude,
            ),
            damping_factor: clamp_or(
                DAMPING_FACTOR_RANGE,
                self.damping_factor,
                defaults.damping_factor,
            ),
            feedback_gain: clamp_or(
                FEEDBACK_GAIN_RANGE,
                self.feedback_gain,
                defaults.feedback_gain,
            ),
            noise_level: clamp_or(NOISE_LEVEL_RANGE, self.noise_level, defaults.noise_level),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(CascadeParameters::default().validate().is_ok());
    }

    #[test]
    fn range_bounds_are_inclusive() {
        assert!(CascadeParameters::new(3, 0.1, 0.0, 0.0, 0.0).is_ok());
        assert!(CascadeParameters::new(20, 5.0, 1.0, 2.0, 0.5).is_ok());
    }

    #[test]
    fn out_of_range_field_is_named() {
        let err = CascadeParameters::new(10, 1.0, 0.1, 2.5, 0.1).unwrap_err();
        match err {
            CascadeError::InvalidParameter { name, value, .. } => {
                assert_eq!(name, "feedback_gain");
                assert_eq!(value, 2.5);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn layer_count_below_minimum_is_rejected() {
        for layers in [0, 1, 2] {
            assert!(CascadeParameters::new(layers, 1.0, 0.1, 1.0, 0.1).is_err());
        }
        assert!(CascadeParameters::new(21, 1.0, 0.1, 1.0, 0.1).is_err());
    }

    #[test]
    fn non_finite_values_are_rejected() {
        assert!(CascadeParameters::new(5, f64::NAN, 0.1, 1.0, 0.1).is_err());
        assert!(CascadeParameters::new(5, 1.0, 0.1, f64::INFINITY, 0.1).is_err());
    }

    #[test]
    fn clamped_behaves_like_a_slider() {
        let params = CascadeParameters {
            layer_count: 50,
            initial_amplitude: -3.0,
            damping_factor: f64::NAN,
            feedback_gain: 9.0,
            noise_level: f64::NEG_INFINITY,
        }
        .clamped();

        assert_eq!(params.layer_count, 20);
        assert_eq!(params.initial_amplitude, 0.1);
        assert_eq!(params.damping_factor, 0.1);
        assert_eq!(params.feedback_gain, 2.0);
        assert_eq!(params.noise_level, 0.1);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn clamped_sends_infinities_to_defaults() {
        let params = CascadeParameters {
            feedback_gain: f64::INFINITY,
            noise_level: f64::NEG_INFINITY,
            ..CascadeParameters::default()
        }
        .clamped();

        assert_eq!(params.feedback_gain, 1.0);
        assert_eq!(params.noise_level, 0.1);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let params: CascadeParameters =
            serde_json::from_str(r#"{ "layer_count": 4, "noise_level": 0.0 }"#).unwrap();
        assert_eq!(params.layer_count, 4);
        assert_eq!(params.noise_level, 0.0);
        assert_eq!(params.feedback_gain, 1.0);
    }
}
