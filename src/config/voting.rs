use crate::error::FusionError;
use crate::resolve::{NeighborhoodRadius, ResolverParams};
use crate::volume::Label;
use crate::voters::{label_weights, top_voters, LabelScores};
use crate::voting::VotingParams;
use crate::weighting::WeightType;
use serde::Deserialize;

/// Voting thresholds and weighting as read from JSON.
///
/// Thresholds that are negative or not finite count as unset, so `-1`
/// disables a rule.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct VotingConfig {
    pub absolute_min_percentage: Option<f64>,
    pub min_difference_percentage: Option<f64>,
    pub min_ratio: Option<f64>,
    pub max_pixel_entropy: Option<f64>,
    pub weight_type: WeightType,
    /// Let only the `k` best-scoring classifiers vote for each label.
    pub label_voters: Option<usize>,
    pub undecided_label: Option<Label>,
    pub max_regions: Option<usize>,
}

impl VotingConfig {
    /// Build engine parameters. Label scores feed the voter restriction and,
    /// for label-based weighting, the weight map.
    pub fn resolve(&self, scores: Option<&LabelScores>) -> Result<VotingParams, FusionError> {
        let mut p = VotingParams {
            absolute_min_percentage: threshold(self.absolute_min_percentage),
            min_difference_percentage: threshold(self.min_difference_percentage),
            min_ratio: threshold(self.min_ratio),
            max_pixel_entropy: threshold(self.max_pixel_entropy),
            weight_type: self.weight_type,
            undecided_label: self.undecided_label,
            max_regions: self.max_regions,
            ..Default::default()
        };
        if let Some(k) = self.label_voters.filter(|&k| k > 0) {
            let scores = scores.ok_or(FusionError::MissingLabelScores)?;
            p.voters = Some(top_voters(scores, k));
        }
        if p.weight_type == WeightType::LabelBased {
            if let Some(scores) = scores {
                p.label_weights = label_weights(scores);
            }
        }
        Ok(p)
    }
}

fn threshold(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite() && *x >= 0.0)
}

/// Settings of the undecided-voxel pass.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub enabled: bool,
    pub radius: NeighborhoodRadius,
    pub uncertainty_tie_solver: bool,
    pub max_regions: Option<usize>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            radius: NeighborhoodRadius::default(),
            uncertainty_tie_solver: false,
            max_regions: None,
        }
    }
}

impl ResolverConfig {
    pub fn resolve(&self) -> ResolverParams {
        ResolverParams {
            radius: self.radius,
            uncertainty_tie_solver: self.uncertainty_tie_solver,
            max_regions: self.max_regions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_thresholds_are_unset() {
        let cfg: VotingConfig = serde_json::from_str(
            r#"{"absolute_min_percentage": -1, "min_ratio": 1.5, "weight_type": "certainty"}"#,
        )
        .unwrap();
        let p = cfg.resolve(None).unwrap();
        assert_eq!(p.absolute_min_percentage, None);
        assert_eq!(p.min_ratio, Some(1.5));
        assert_eq!(p.weight_type, WeightType::Certainty);
    }

    #[test]
    fn label_voters_need_scores() {
        let cfg = VotingConfig {
            label_voters: Some(2),
            ..Default::default()
        };
        assert!(matches!(cfg.resolve(None), Err(FusionError::MissingLabelScores)));
        let scores = LabelScores::new(vec![vec![0.1, 0.9], vec![0.8, 0.2], vec![0.5, 0.5]]);
        let p = cfg.resolve(Some(&scores)).unwrap();
        assert_eq!(p.voters.map(|v| v.len()), Some(4));
    }

    #[test]
    fn empty_resolver_section_uses_defaults() {
        let cfg: ResolverConfig = serde_json::from_str("{}").unwrap();
        assert!(cfg.enabled);
        assert_eq!(cfg.resolve().radius, NeighborhoodRadius::uniform(1));
    }
}
