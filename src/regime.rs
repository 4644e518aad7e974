use serde::{Deserialize, Serialize};

use crate::params::CascadeParameters;

const NEUTRAL_TOLERANCE: f64 = 1e-9;

/// Per-layer multiplier of the noiseless recurrence.
pub fn loop_gain(params: &CascadeParameters) -> f64 {
    params.feedback_gain * (1.0 - params.damping_factor)
}

/// Noiseless amplitude at 1-based `layer`.
pub fn expected_amplitude(params: &CascadeParameters, layer: usize) -> f64 {
    if layer == 0 {
        return 0.0;
    }
    params.initial_amplitude * loop_gain(params).powi((layer - 1) as i32)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    Amplifying,
    Neutral,
    Damped,
}

impl Regime {
    pub fn classify(params: &CascadeParameters) -> Self {
        let gain = loop_gain(params);
        if gain > 1.0 + NEUTRAL_TOLERANCE {
            Regime::Amplifying
        } else if gain < 1.0 - NEUTRAL_TOLERANCE {
            Regime::Damped
        } else {
            Regime::Neutral
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Regime::Amplifying => "amplifying",
            Regime::Neutral => "neutral",
            Regime::Damped => "damped",
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Regime::Amplifying => {
                "feedback outweighs damping: the signal reinforces itself and grows layer over layer"
            }
            Regime::Neutral => {
                "feedback and damping balance: the signal persists and drifts only with noise"
            }
            Regime::Damped => {
                "damping outweighs feedback: the signal dissipates toward the noise floor"
            }
        }
    }
}

impl std::fmt::Display for Regime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
