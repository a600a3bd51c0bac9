//! Trained model artifacts
//!
//! Linear models exported by the offline training job and loaded once at
//! startup: a 3-class softmax classifier for the match outcome and a
//! two-head regressor for the scoreline. Absence of either artifact is a
//! normal state; a corrupt artifact is treated exactly like a missing one.

use crate::features::FeatureVector;
use crate::{FootyError, MatchOutcome, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the outcome classifier inside the model directory.
pub const OUTCOME_FILE: &str = "outcome_classifier.json";
/// File name of the score regressor inside the model directory.
pub const SCORE_FILE: &str = "score_regressor.json";

/// One linear head: logit = weights · x + bias.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearHead {
    pub weights: Vec<f64>,
    pub bias: f64,
}

impl LinearHead {
    fn apply(&self, x: &[f64]) -> f64 {
        self.weights.iter().zip(x).map(|(w, v)| w * v).sum::<f64>() + self.bias
    }
}

/// Per-feature standardization parameters fitted during training.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Standardization {
    pub means: Vec<f64>,
    pub stds: Vec<f64>,
}

impl Standardization {
    fn apply(&self, x: &[f64]) -> Vec<f64> {
        x.iter()
            .enumerate()
            .map(|(i, &v)| (v - self.means[i]) / self.stds[i].max(1e-10))
            .collect()
    }

    fn validate(&self, dim: usize) -> Result<()> {
        if self.means.len() != dim || self.stds.len() != dim {
            return Err(FootyError::Model(format!(
                "standardization dimension {}/{} does not match feature dimension {}",
                self.means.len(),
                self.stds.len(),
                dim
            )));
        }
        Ok(())
    }
}

/// 3-class softmax classifier over the feature vector.
///
/// Head order is the class order: HOME_WIN, DRAW, AWAY_WIN.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeClassifier {
    pub heads: Vec<LinearHead>,
    pub standardization: Standardization,
}

impl OutcomeClassifier {
    /// Class probabilities in (home win, draw, away win) order.
    pub fn predict_proba(&self, features: &FeatureVector) -> [f64; 3] {
        let x = self.standardization.apply(features.as_slice());
        let logits: Vec<f64> = self.heads.iter().map(|h| h.apply(&x)).collect();

        // Softmax, shifted by the max logit for numeric stability
        let max = logits.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = logits.iter().map(|l| (l - max).exp()).collect();
        let sum: f64 = exps.iter().sum();
        [exps[0] / sum, exps[1] / sum, exps[2] / sum]
    }

    /// Most probable outcome for the feature vector.
    pub fn predict(&self, features: &FeatureVector) -> MatchOutcome {
        let probs = self.predict_proba(features);
        argmax_outcome(&probs)
    }

    fn validate(&self) -> Result<()> {
        if self.heads.len() != 3 {
            return Err(FootyError::Model(format!(
                "outcome classifier has {} heads, expected 3",
                self.heads.len()
            )));
        }
        for head in &self.heads {
            if head.weights.len() != FeatureVector::DIM {
                return Err(FootyError::Model(format!(
                    "classifier head dimension {} does not match feature dimension {}",
                    head.weights.len(),
                    FeatureVector::DIM
                )));
            }
        }
        self.standardization.validate(FeatureVector::DIM)
    }
}

/// Outcome for a probability triple in (home, draw, away) order.
pub fn argmax_outcome(probs: &[f64; 3]) -> MatchOutcome {
    let mut best = 0;
    for i in 1..3 {
        if probs[i] > probs[best] {
            best = i;
        }
    }
    match best {
        0 => MatchOutcome::HomeWin,
        1 => MatchOutcome::Draw,
        _ => MatchOutcome::AwayWin,
    }
}

/// Two-head linear regressor for the (home, away) scoreline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreRegressor {
    pub home: LinearHead,
    pub away: LinearHead,
    pub standardization: Standardization,
}

impl ScoreRegressor {
    /// Continuous (home, away) score estimates.
    pub fn predict(&self, features: &FeatureVector) -> (f64, f64) {
        let x = self.standardization.apply(features.as_slice());
        (self.home.apply(&x), self.away.apply(&x))
    }

    fn validate(&self) -> Result<()> {
        for head in [&self.home, &self.away] {
            if head.weights.len() != FeatureVector::DIM {
                return Err(FootyError::Model(format!(
                    "regressor head dimension {} does not match feature dimension {}",
                    head.weights.len(),
                    FeatureVector::DIM
                )));
            }
        }
        self.standardization.validate(FeatureVector::DIM)
    }
}

/// The trained artifacts available to the predictors.
#[derive(Debug, Clone, Default)]
pub struct ModelBundle {
    pub outcome: Option<OutcomeClassifier>,
    pub score: Option<ScoreRegressor>,
}

impl ModelBundle {
    /// An empty bundle; every prediction takes the fallback path.
    pub fn none() -> Self {
        ModelBundle::default()
    }

    /// Load whatever artifacts exist in `dir`.
    ///
    /// Missing files are informational; unreadable or dimensionally invalid
    /// files are logged and then treated identically to missing ones.
    pub fn load<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        let outcome = match load_artifact::<OutcomeClassifier>(&dir.join(OUTCOME_FILE)) {
            Ok(Some(model)) => match model.validate() {
                Ok(()) => Some(model),
                Err(e) => {
                    log::warn!("rejecting outcome classifier: {}", e);
                    None
                }
            },
            Ok(None) => {
                log::info!("no outcome classifier in {}; using heuristic path", dir.display());
                None
            }
            Err(e) => {
                log::warn!("failed to load outcome classifier: {}", e);
                None
            }
        };

        let score = match load_artifact::<ScoreRegressor>(&dir.join(SCORE_FILE)) {
            Ok(Some(model)) => match model.validate() {
                Ok(()) => Some(model),
                Err(e) => {
                    log::warn!("rejecting score regressor: {}", e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                log::warn!("failed to load score regressor: {}", e);
                None
            }
        };

        ModelBundle { outcome, score }
    }

    pub fn has_classifier(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn has_regressor(&self) -> bool {
        self.score.is_some()
    }
}

fn load_artifact<T: serde::de::DeserializeOwned>(path: &PathBuf) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)?;
    let artifact = serde_json::from_str(&content)
        .map_err(|e| FootyError::Model(format!("{}: {}", path.display(), e)))?;
    Ok(Some(artifact))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::derive;
    use crate::{parse_form, TeamStats};

    fn identity_standardization() -> Standardization {
        Standardization {
            means: vec![0.0; FeatureVector::DIM],
            stds: vec![1.0; FeatureVector::DIM],
        }
    }

    fn bias_classifier(home: f64, draw: f64, away: f64) -> OutcomeClassifier {
        let head = |bias| LinearHead {
            weights: vec![0.0; FeatureVector::DIM],
            bias,
        };
        OutcomeClassifier {
            heads: vec![head(home), head(draw), head(away)],
            standardization: identity_standardization(),
        }
    }

    fn any_features() -> FeatureVector {
        let stats = TeamStats {
            team_name: "Arsenal".to_string(),
            matches_played: 10,
            wins: 5,
            draws: 3,
            losses: 2,
            goals_for: 15,
            goals_against: 10,
            goal_diff: 5,
            points: 18,
            league_position: Some(4),
            form: parse_form("WDWLW"),
        };
        derive(&stats, &stats)
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let model = bias_classifier(1.0, 0.5, -0.5);
        let probs = model.predict_proba(&any_features());
        let sum: f64 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert_eq!(model.predict(&any_features()), MatchOutcome::HomeWin);
    }

    #[test]
    fn test_argmax_order() {
        assert_eq!(argmax_outcome(&[0.5, 0.3, 0.2]), MatchOutcome::HomeWin);
        assert_eq!(argmax_outcome(&[0.2, 0.5, 0.3]), MatchOutcome::Draw);
        assert_eq!(argmax_outcome(&[0.2, 0.3, 0.5]), MatchOutcome::AwayWin);
        // Ties keep the earlier class
        assert_eq!(argmax_outcome(&[0.4, 0.4, 0.2]), MatchOutcome::HomeWin);
    }

    #[test]
    fn test_load_missing_dir_is_empty_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = ModelBundle::load(dir.path().join("nope"));
        assert!(!bundle.has_classifier());
        assert!(!bundle.has_regressor());
    }

    #[test]
    fn test_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let model = bias_classifier(0.1, 0.2, 0.3);
        std::fs::write(
            dir.path().join(OUTCOME_FILE),
            serde_json::to_string(&model).unwrap(),
        )
        .unwrap();

        let bundle = ModelBundle::load(dir.path());
        assert!(bundle.has_classifier());
        assert!(!bundle.has_regressor());

        let probs = bundle.outcome.unwrap().predict_proba(&any_features());
        assert_eq!(argmax_outcome(&probs), MatchOutcome::AwayWin);
    }

    #[test]
    fn test_corrupt_artifact_treated_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(OUTCOME_FILE), "not json {").unwrap();

        let bundle = ModelBundle::load(dir.path());
        assert!(!bundle.has_classifier());
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let bad = OutcomeClassifier {
            heads: vec![
                LinearHead { weights: vec![0.0; 5], bias: 0.0 },
                LinearHead { weights: vec![0.0; 5], bias: 0.0 },
                LinearHead { weights: vec![0.0; 5], bias: 0.0 },
            ],
            standardization: Standardization {
                means: vec![0.0; 5],
                stds: vec![1.0; 5],
            },
        };
        std::fs::write(
            dir.path().join(OUTCOME_FILE),
            serde_json::to_string(&bad).unwrap(),
        )
        .unwrap();

        let bundle = ModelBundle::load(dir.path());
        assert!(!bundle.has_classifier());
    }

    #[test]
    fn test_score_regressor_predict() {
        let regressor = ScoreRegressor {
            home: LinearHead { weights: vec![0.0; FeatureVector::DIM], bias: 2.4 },
            away: LinearHead { weights: vec![0.0; FeatureVector::DIM], bias: 0.6 },
            standardization: identity_standardization(),
        };
        let (h, a) = regressor.predict(&any_features());
        assert!((h - 2.4).abs() < 1e-12);
        assert!((a - 0.6).abs() < 1e-12);
    }
}
