use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use plotters::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cascade::CascadeSequence;
use crate::params::CascadeParameters;
use crate::regime::{loop_gain, Regime};
use crate::CascadeError;

pub const CHART_TITLE: &str = "Recursive Signal Strength Across Identity Layers";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub params: CascadeParameters,
    pub seed: Option<u64>,
    pub loop_gain: f64,
    pub regime: Regime,
    pub amplitudes: CascadeSequence,
    pub final_amplitude: Option<f64>,
    pub peak_amplitude: f64,
}

impl RunSummary {
    pub fn new(params: &CascadeParameters, seed: Option<u64>, sequence: &CascadeSequence) -> Self {
        Self {
            params: *params,
            seed,
            loop_gain: loop_gain(params),
            regime: Regime::classify(params),
            amplitudes: sequence.clone(),
            final_amplitude: sequence.final_amplitude(),
            peak_amplitude: sequence.peak_magnitude(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OutputFiles {
    pub output_dir: PathBuf,
    pub csv_path: PathBuf,
    pub summary_path: PathBuf,
    pub chart_path: Option<PathBuf>,
}

/// Create `base/<UTC timestamp>`, suffixing `-NN` if it already exists.
pub fn create_timestamped_output_dir(base: &Path) -> Result<PathBuf, CascadeError> {
    fs::create_dir_all(base)?;

    let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%SZ").to_string();
    let mut output_dir = base.join(&timestamp);
    let mut counter = 1_u32;

    while output_dir.exists() {
        output_dir = base.join(format!("{timestamp}-{counter:02}"));
        counter += 1;
    }

    fs::create_dir_all(&output_dir)?;
    Ok(output_dir)
}

/// Write `cascade.csv`, `summary.json` and optionally `cascade.svg` into `dir`.
pub fn write_run(
    dir: &Path,
    summary: &RunSummary,
    chart: bool,
) -> Result<OutputFiles, CascadeError> {
    fs::create_dir_all(dir)?;

    let files = OutputFiles {
        output_dir: dir.to_path_buf(),
        csv_path: dir.join("cascade.csv"),
        summary_path: dir.join("summary.json"),
        chart_path: chart.then(|| dir.join("cascade.svg")),
    };

    write_sequence_csv(&files.csv_path, &summary.amplitudes)?;
    write_summary(&files.summary_path, summary)?;
    if let Some(chart_path) = &files.chart_path {
        plot_sequence(chart_path, &summary.amplitudes)?;
    }

    Ok(files)
}

pub fn write_sequence_csv(path: &Path, sequence: &CascadeSequence) -> Result<(), CascadeError> {
    let mut writer = csv::Writer::from_path(path)?;
    for point in sequence.points() {
        writer.serialize(point)?;
    }
    writer.flush()?;

    info!(path = %path.display(), rows = sequence.len(), "wrote cascade csv");
    Ok(())
}

pub fn write_summary(path: &Path, summary: &RunSummary) -> Result<(), CascadeError> {
    let data = serde_json::to_string_pretty(summary)?;
    fs::write(path, data)?;

    info!(path = %path.display(), "wrote run summary");
    Ok(())
}

fn plot_err<E: std::fmt::Display>(err: E) -> CascadeError {
    CascadeError::Plot(err.to_string())
}

/// Axis bounds with a margin; degenerate spans are widened to one unit.
fn padded_bounds(lo: f64, hi: f64) -> (f64, f64) {
    let span = hi - lo;
    if span.abs() < f64::EPSILON {
        return (lo - 0.5, hi + 0.5);
    }
    let pad = 0.08 * span;
    (lo - pad, hi + pad)
}

/// Render the sequence as an SVG line chart over layers `1..=len`.
pub fn plot_sequence(path: &Path, sequence: &CascadeSequence) -> Result<(), CascadeError> {
    let root = SVGBackend::new(path, (960, 540)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let layers = sequence.len().max(1);
    let (x_min, x_max) = if layers == 1 {
        (0.5, 1.5)
    } else {
        (1.0, layers as f64)
    };

    let lo = sequence.amplitudes().iter().copied().fold(f64::INFINITY, f64::min);
    let hi = sequence.amplitudes().iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (y_min, y_max) = if lo.is_finite() && hi.is_finite() {
        padded_bounds(lo, hi)
    } else {
        (0.0, 1.0)
    };

    let mut chart = ChartBuilder::on(&root)
        .caption(CHART_TITLE, ("sans-serif", 26).into_font())
        .margin(20)
        .x_label_area_size(45)
        .y_label_area_size(65)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_labels(layers)
        .x_label_formatter(&|x| format!("{x:.0}"))
        .x_desc("Layer")
        .y_desc("Signal Strength")
        .draw()
        .map_err(plot_err)?;

    let series: Vec<(f64, f64)> = sequence
        .points()
        .map(|p| (p.layer as f64, p.amplitude))
        .collect();

    chart
        .draw_series(LineSeries::new(series.iter().copied(), BLUE.stroke_width(2)))
        .map_err(plot_err)?;
    chart
        .draw_series(
            series
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 3, BLUE.filled())),
        )
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;

    info!(path = %path.display(), layers, "rendered cascade chart");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_bounds_widen_flat_series() {
        assert_eq!(padded_bounds(2.0, 2.0), (1.5, 2.5));
        let (lo, hi) = padded_bounds(0.0, 1.0);
        assert!(lo < 0.0 && hi > 1.0);
    }

    #[test]
    fn summary_carries_derived_fields() {
        let params = CascadeParameters {
            layer_count: 3,
            initial_amplitude: 2.0,
            damping_factor: 0.5,
            feedback_gain: 1.0,
            noise_level: 0.0,
        };
        let sequence =
            crate::cascade::generate(&params, &mut crate::noise::SilentNoise).unwrap();
        let summary = RunSummary::new(&params, Some(3), &sequence);

        assert_eq!(summary.regime, Regime::Damped);
        assert_eq!(summary.final_amplitude, Some(0.5));
        assert_eq!(summary.peak_amplitude, 2.0);
        assert_eq!(summary.loop_gain, 0.5);
    }
}
