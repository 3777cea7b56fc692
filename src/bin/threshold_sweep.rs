//! Sweep voting thresholds over a synthetic ensemble and report, per sample,
//! the undecided share and the mean Dice against the ground truth.

use label_fusion::config::threshold_sweep;
use label_fusion::diagnostics::timing::elapsed_ms;
use label_fusion::inputs::FusionInputs;
use label_fusion::sweep::{SweepSeries, ThresholdSweep};
use label_fusion::synthetic::SyntheticEnsemble;
use label_fusion::voters::LabelScores;
use label_fusion::volume::io::write_json_file;
use serde::Serialize;
use std::env;
use std::path::Path;
use std::time::Instant;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config =
        threshold_sweep::load_config(Path::new(&config_path)).map_err(|e| e.to_string())?;

    let ensemble = SyntheticEnsemble::generate(&config.synthetic);
    let scores = LabelScores::from_reference(
        &ensemble.ground_truth,
        &ensemble.labels,
        config.synthetic.label_count,
    )
    .map_err(|e| e.to_string())?;

    // thresholds of the base are overridden per sample; only the shared
    // settings matter here
    let base = config
        .voting
        .resolve(Some(&scores))
        .map_err(|e| e.to_string())?;
    let sweep = ThresholdSweep {
        base,
        samples: config.samples,
        parameters: config.parameters.clone(),
        label_scores: Some(scores),
    };
    let inputs = FusionInputs::new(&ensemble.labels).with_probabilities(&ensemble.probabilities);

    let start = Instant::now();
    let series = sweep
        .run(&inputs, &ensemble.ground_truth)
        .map_err(|e| e.to_string())?;
    let elapsed_ms = elapsed_ms(start);

    let report = SweepReport {
        classifiers: ensemble.labels.len(),
        samples: config.samples,
        elapsed_ms,
        series,
    };
    for s in &report.series {
        print_series(s);
    }
    match &config.output.json_out {
        Some(path) => {
            write_json_file(path, &report)?;
            println!("JSON report written to {}", path.display());
        }
        None => {
            let json = serde_json::to_string_pretty(&report)
                .map_err(|e| format!("Failed to serialize JSON: {e}"))?;
            println!("{json}");
        }
    }
    Ok(())
}

fn usage() -> String {
    "Usage: threshold_sweep <config.json>".to_string()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SweepReport {
    classifiers: usize,
    samples: usize,
    elapsed_ms: f64,
    series: Vec<SweepSeries>,
}

fn print_series(series: &SweepSeries) {
    println!("{}:", series.parameter.name());
    println!("  {:>10} {:>10} {:>10}", "value", "undecided", "dice");
    for s in &series.samples {
        let dice = s
            .mean_dice
            .map(|d| format!("{d:.4}"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:>10.4} {:>10.4} {:>10}",
            s.value, s.undecided_fraction, dice
        );
    }
}
