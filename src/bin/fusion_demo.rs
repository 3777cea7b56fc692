//! End-to-end fusion on a synthetic ensemble.
//!
//! 1. Generate a ground truth and noisy classifier outputs from the config.
//! 2. Optionally score every classifier per label against the ground truth.
//! 3. Vote, then resolve undecided voxels.
//! 4. Compare voted and final labels with the ground truth and emit a JSON
//!    report.

use label_fusion::config::fusion_demo::{self, FusionDemoConfig};
use label_fusion::diagnostics::{FusionReport, TimingBreakdown};
use label_fusion::inputs::FusionInputs;
use label_fusion::overlap::OverlapMeasures;
use label_fusion::pipeline::{FusionParams, FusionPipeline};
use label_fusion::synthetic::SyntheticEnsemble;
use label_fusion::voters::LabelScores;
use label_fusion::volume::io::write_json_file;
use serde::Serialize;
use std::env;
use std::path::Path;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = fusion_demo::load_config(Path::new(&config_path)).map_err(|e| e.to_string())?;

    let mut setup = TimingBreakdown::default();
    let ensemble = setup.measure("generate", || SyntheticEnsemble::generate(&config.synthetic));
    let scores = if config.score_against_ground_truth {
        let scores = setup
            .measure("score", || {
                LabelScores::from_reference(
                    &ensemble.ground_truth,
                    &ensemble.labels,
                    config.synthetic.label_count,
                )
            })
            .map_err(|e| e.to_string())?;
        Some(scores)
    } else {
        None
    };

    let params = fusion_params(&config, scores.as_ref())?;
    let mut inputs = FusionInputs::new(&ensemble.labels);
    if !config.without_probabilities {
        inputs = inputs.with_probabilities(&ensemble.probabilities);
    }
    let report = FusionPipeline::new(params)
        .run(&inputs)
        .map_err(|e| e.to_string())?;

    let summary = DemoSummary::new(&ensemble, &report, setup)?;
    print_text_summary(&summary);
    match &config.output.json_out {
        Some(path) => {
            write_json_file(path, &summary)?;
            println!("JSON report written to {}", path.display());
        }
        None => {
            let json = serde_json::to_string_pretty(&summary)
                .map_err(|e| format!("Failed to serialize JSON: {e}"))?;
            println!("{json}");
        }
    }
    Ok(())
}

fn usage() -> String {
    "Usage: fusion_demo <config.json>".to_string()
}

fn fusion_params(
    config: &FusionDemoConfig,
    scores: Option<&LabelScores>,
) -> Result<FusionParams, String> {
    Ok(FusionParams {
        voting: config.voting.resolve(scores).map_err(|e| e.to_string())?,
        resolver: config.resolver.resolve(),
        resolve_undecided: config.resolver.enabled && !config.without_probabilities,
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DemoSummary<'a> {
    setup: TimingBreakdown,
    report: &'a FusionReport,
    /// Best single classifier by mean Dice.
    best_classifier_dice: Option<f64>,
    /// Dice of the final labels, undecided voxels ignored.
    fused_dice: Option<f64>,
}

impl<'a> DemoSummary<'a> {
    fn new(
        ensemble: &SyntheticEnsemble,
        report: &'a FusionReport,
        setup: TimingBreakdown,
    ) -> Result<Self, String> {
        let truth = &ensemble.ground_truth;
        let mut best: Option<f64> = None;
        for labels in &ensemble.labels {
            let dice = OverlapMeasures::compute(truth, labels, None)
                .map_err(|e| e.to_string())?
                .mean_overlap();
            best = match (best, dice) {
                (Some(b), Some(d)) => Some(b.max(d)),
                (b, d) => b.or(d),
            };
        }
        let undecided = Some(report.undecided_label);
        let fused_dice = OverlapMeasures::compute(truth, &report.labels, undecided)
            .map_err(|e| e.to_string())?
            .mean_overlap();
        Ok(Self {
            setup,
            report,
            best_classifier_dice: best,
            fused_dice,
        })
    }
}

fn print_text_summary(summary: &DemoSummary<'_>) {
    let trace = &summary.report.trace;
    println!(
        "Fused {} classifiers on a {} grid ({} labels, weight={})",
        trace.input.classifiers,
        trace.input.dims,
        trace.input.total_label_count,
        trace.voting.weight_type.name()
    );
    println!(
        "  vote:    {} undecided ({:.2}%) in {:.2} ms",
        trace.voting.undecided_count,
        trace.voting.undecided_fraction * 100.0,
        trace.voting.elapsed_ms
    );
    if let Some(resolve) = &trace.resolve {
        println!(
            "  resolve: {} resolved, {} ambiguous, {} left in {:.2} ms",
            resolve.resolved_count,
            resolve.ambiguous_count,
            resolve.remaining_undecided,
            resolve.elapsed_ms
        );
    }
    if let Some(ms) = summary.setup.stage_ms("generate") {
        println!("  setup:   synthetic ensemble generated in {ms:.2} ms");
    }
    for w in &trace.voting.warnings {
        println!("  warning: {w}");
    }
    println!(
        "  dice:    best single {}, fused {}",
        format_optional(summary.best_classifier_dice),
        format_optional(summary.fused_dice)
    );
}

fn format_optional(val: Option<f64>) -> String {
    val.map(|v| format!("{v:.4}"))
        .unwrap_or_else(|| "-".to_string())
}
