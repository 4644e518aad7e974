//! Damping Sweep Example
//!
//! Runs the cascade over a grid of damping factors at a fixed seed and writes
//! one CSV with a column per damping value.

use signal_cascade::{generate, CascadeParameters, GaussianNoise, Regime};
use std::fs;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Running damping sweep...\n");

    fs::create_dir_all("out")?;

    let base = CascadeParameters {
        layer_count: 20,
        initial_amplitude: 1.0,
        damping_factor: 0.0,
        feedback_gain: 1.2,
        noise_level: 0.05,
    };
    let seed = 42;
    let dampings = [0.0, 0.1, 0.2, 0.3, 0.5];

    println!("Configuration:");
    println!("  Layers: {}", base.layer_count);
    println!("  Feedback gain: {}", base.feedback_gain);
    println!("  Noise level: {}", base.noise_level);
    println!("  Seed: {seed}");
    println!();

    let mut columns = Vec::with_capacity(dampings.len());
    for &damping_factor in &dampings {
        let params = CascadeParameters {
            damping_factor,
            ..base
        };
        let sequence = generate(&params, &mut GaussianNoise::seeded(seed))?;
        println!(
            "  damping {:.1}: final {:>10.4} ({})",
            damping_factor,
            sequence.final_amplitude().unwrap_or(0.0),
            Regime::classify(&params)
        );
        columns.push(sequence.into_amplitudes());
    }

    let mut writer = csv::Writer::from_path("out/damping_sweep.csv")?;
    let mut header = vec!["layer".to_string()];
    header.extend(dampings.iter().map(|d| format!("damping_{d:.1}")));
    writer.write_record(&header)?;

    for layer in 0..base.layer_count {
        let mut row = vec![(layer + 1).to_string()];
        row.extend(columns.iter().map(|c| format!("{:.10}", c[layer])));
        writer.write_record(&row)?;
    }
    writer.flush()?;

    println!("\nResults saved to out/damping_sweep.csv");
    Ok(())
}
