use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use signal_cascade::noise::GaussianNoise;
use signal_cascade::output::{write_run, RunSummary};
use signal_cascade::{create_timestamped_output_dir, generate, RunConfig, RunOverrides};
use tracing_subscriber::EnvFilter;

/// Recursive signal cascade: simulate amplification, damping and noise across layers
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON run configuration (defaults to ./cascade.json when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Recursive depth, number of layers [3, 20]
    #[arg(long)]
    layers: Option<usize>,

    /// Initial signal strength [0.1, 5.0]
    #[arg(long)]
    amplitude: Option<f64>,

    /// Damping coefficient [0, 1]
    #[arg(long)]
    damping: Option<f64>,

    /// Recursive feedback gain [0, 2]
    #[arg(long)]
    gain: Option<f64>,

    /// Noise standard deviation [0, 0.5]
    #[arg(long)]
    noise: Option<f64>,

    /// Random seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Clamp out-of-range parameters instead of failing
    #[arg(long, default_value_t = false, conflicts_with = "no_clamp")]
    clamp: bool,

    /// Reject out-of-range parameters even if the config enables clamping
    #[arg(long, default_value_t = false)]
    no_clamp: bool,

    /// Skip chart rendering
    #[arg(long, default_value_t = false)]
    no_chart: bool,

    /// Output base directory
    #[arg(long)]
    output: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> RunOverrides {
        let clamp = if self.clamp {
            Some(true)
        } else if self.no_clamp {
            Some(false)
        } else {
            None
        };

        RunOverrides {
            layer_count: self.layers,
            initial_amplitude: self.amplitude,
            damping_factor: self.damping,
            feedback_gain: self.gain,
            noise_level: self.noise,
            seed: self.seed,
            clamp,
            chart: self.no_chart.then_some(false),
            output_dir: self.output.clone(),
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(error) = try_main() {
        eprintln!("signal-cascade failed: {error:#}");
        std::process::exit(1);
    }
}

fn try_main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut cfg = RunConfig::load(cli.config.as_deref()).context("failed to load run configuration")?;
    cfg.apply_overrides(&cli.overrides());
    let params = cfg.resolve_params()?;

    println!("Recursive Signal Cascade");
    println!("========================");
    println!("  Layers:            {}", params.layer_count);
    println!("  Initial amplitude: {}", params.initial_amplitude);
    println!("  Damping factor:    {}", params.damping_factor);
    println!("  Feedback gain:     {}", params.feedback_gain);
    println!("  Noise level:       {}", params.noise_level);
    match cfg.seed {
        Some(seed) => println!("  Seed:              {seed}"),
        None => println!("  Seed:              (entropy)"),
    }
    println!();

    let sequence = match cfg.seed {
        Some(seed) => generate(&params, &mut GaussianNoise::seeded(seed))?,
        None => generate(&params, &mut GaussianNoise::from_entropy())?,
    };

    println!("{:>6}  {:>14}", "Layer", "Signal");
    for point in sequence.points() {
        println!("{:>6}  {:>14.6}", point.layer, point.amplitude);
    }
    println!();

    let summary = RunSummary::new(&params, cfg.seed, &sequence);
    println!("Interpretation");
    println!("  Loop gain {:.4} ({})", summary.loop_gain, summary.regime);
    println!("  {}", summary.regime.describe());
    println!("  Damping reduces signal persistence.");
    println!("  Feedback gain amplifies self-reinforcing loops.");
    println!("  Noise introduces instability or mutation.");
    println!();

    let run_dir = create_timestamped_output_dir(&cfg.output_dir).with_context(|| {
        format!(
            "failed to create run directory under {}",
            cfg.output_dir.display()
        )
    })?;
    let files = write_run(&run_dir, &summary, cfg.chart)?;

    println!("Run directory: {}", files.output_dir.display());
    println!("CSV: {}", files.csv_path.display());
    println!("Summary: {}", files.summary_path.display());
    if let Some(chart) = &files.chart_path {
        println!("Chart: {}", chart.display());
    }

    Ok(())
}
