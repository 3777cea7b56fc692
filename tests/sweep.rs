mod common;

use common::ensemble::row;
use label_fusion::inputs::FusionInputs;
use label_fusion::sweep::{SweepParameter, ThresholdSweep};
use label_fusion::synthetic::{SyntheticEnsemble, SyntheticParams};
use label_fusion::volume::Dims;
use label_fusion::voters::LabelScores;
use label_fusion::FusionError;

fn ensemble() -> SyntheticEnsemble {
    SyntheticEnsemble::generate(&SyntheticParams {
        dims: Dims::new(20, 20, 8),
        classifiers: 5,
        noise: 0.15,
        seed: 3,
        ..Default::default()
    })
}

#[test]
fn threshold_curves_only_grow_undecided_share() {
    let e = ensemble();
    let inputs = FusionInputs::new(&e.labels).with_probabilities(&e.probabilities);
    let sweep = ThresholdSweep {
        samples: 6,
        parameters: vec![
            SweepParameter::AbsoluteMinPercentage,
            SweepParameter::MinDifferencePercentage,
            SweepParameter::MinRatio,
        ],
        ..Default::default()
    };
    let series = sweep.run(&inputs, &e.ground_truth).unwrap();
    assert_eq!(series.len(), 3);
    for s in &series {
        assert_eq!(s.samples.len(), 6);
        for pair in s.samples.windows(2) {
            assert!(pair[1].value > pair[0].value);
            assert!(
                pair[1].undecided_fraction >= pair[0].undecided_fraction,
                "{} not monotone",
                s.parameter.name()
            );
        }
    }
    // ratio range starts at 1: nothing but raw ties is rejected
    let ratio = &series[2].samples[0];
    assert_eq!(ratio.value, 1.0);
}

#[test]
fn every_parameter_is_sampled_with_scores() {
    let e = ensemble();
    let scores = LabelScores::from_reference(&e.ground_truth, &e.labels, 4).unwrap();
    let inputs = FusionInputs::new(&e.labels).with_probabilities(&e.probabilities);
    let sweep = ThresholdSweep {
        samples: 3,
        label_scores: Some(scores),
        ..Default::default()
    };
    let series = sweep.run(&inputs, &e.ground_truth).unwrap();
    let params: Vec<_> = series.iter().map(|s| s.parameter).collect();
    assert_eq!(params, SweepParameter::ALL.to_vec());
    for s in &series {
        for sample in &s.samples {
            assert!((0.0..=1.0).contains(&sample.undecided_fraction));
            if let Some(d) = sample.mean_dice {
                assert!((0.0..=1.0 + 1e-12).contains(&d));
            }
        }
    }
    let voters = &series[4].samples;
    assert_eq!(
        voters.iter().map(|s| s.value).collect::<Vec<_>>(),
        vec![1.0, 1.0 + 4.0 / 3.0, 1.0 + 8.0 / 3.0]
    );
}

#[test]
fn ground_truth_must_share_the_grid() {
    let labels = vec![row(&[1, 2]), row(&[1, 1])];
    let sweep = ThresholdSweep {
        samples: 2,
        parameters: vec![SweepParameter::MinRatio],
        ..Default::default()
    };
    let err = sweep
        .run(&FusionInputs::new(&labels), &row(&[1, 2, 2]))
        .unwrap_err();
    assert!(matches!(err, FusionError::DimensionMismatch { .. }));
}
