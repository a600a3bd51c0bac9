//! Match outcome prediction
//!
//! Two mutually exclusive paths: the trained classifier when it is loaded
//! and both teams resolve, otherwise a deterministic strength heuristic.
//! Neither path surfaces missing data as an error; the worst case is a
//! neutral default prediction.

use crate::data::StatsStore;
use crate::features;
use crate::model::{argmax_outcome, ModelBundle};
use crate::{
    MatchOutcome, MatchPrediction, PredictionConfig, PredictionSource, Result, TeamStats,
};

/// Mixing weights for the heuristic score estimate: a team's attack rate
/// against the opponent's concession rate, with a home/away adjustment.
const ATTACK_WEIGHT: f64 = 0.7;
const DEFENSE_WEIGHT: f64 = 0.3;
const HOME_SCORE_BOOST: f64 = 1.1;
const AWAY_SCORE_DAMP: f64 = 0.9;

/// Predicts single-match outcomes from stored statistics.
pub struct MatchPredictor<'a> {
    store: &'a StatsStore,
    models: ModelBundle,
    tunables: PredictionConfig,
}

impl<'a> MatchPredictor<'a> {
    pub fn new(store: &'a StatsStore, models: ModelBundle, tunables: PredictionConfig) -> Self {
        MatchPredictor {
            store,
            models,
            tunables,
        }
    }

    /// Predict the outcome of `home_team` hosting `away_team`.
    ///
    /// `Err` only on storage failure; unknown teams and missing model
    /// artifacts degrade to fallback results.
    pub fn predict(&self, home_team: &str, away_team: &str) -> Result<MatchPrediction> {
        let home_stats = self.store.resolve_team_stats(home_team)?;
        let away_stats = self.store.resolve_team_stats(away_team)?;

        let (home_stats, away_stats) = match (home_stats, away_stats) {
            (Some(h), Some(a)) => (h, a),
            _ => {
                log::info!(
                    "statistics unavailable for {} vs {}; returning neutral default",
                    home_team,
                    away_team
                );
                return Ok(neutral_default(home_team, away_team));
            }
        };

        if let Some(classifier) = &self.models.outcome {
            Ok(self.model_prediction(home_team, away_team, &home_stats, &away_stats, classifier))
        } else {
            log::debug!("no classifier loaded; using heuristic path");
            Ok(self.heuristic(home_team, away_team, &home_stats, &away_stats))
        }
    }

    fn model_prediction(
        &self,
        home_team: &str,
        away_team: &str,
        home: &TeamStats,
        away: &TeamStats,
        classifier: &crate::model::OutcomeClassifier,
    ) -> MatchPrediction {
        let vector = features::derive(home, away);
        let probs = classifier.predict_proba(&vector);
        let predicted_result = argmax_outcome(&probs);

        // Regressor scores are rounded and floored at zero; no upper clamp
        // on this path.
        let (predicted_home_score, predicted_away_score) = match &self.models.score {
            Some(regressor) => {
                let (h, a) = regressor.predict(&vector);
                (
                    Some(h.round().max(0.0) as u32),
                    Some(a.round().max(0.0) as u32),
                )
            }
            None => (None, None),
        };

        let confidence = probs.iter().cloned().fold(0.0, f64::max);

        MatchPrediction {
            home_team: home_team.to_string(),
            away_team: away_team.to_string(),
            predicted_result,
            home_win_probability: probs[0],
            draw_probability: probs[1],
            away_win_probability: probs[2],
            predicted_home_score,
            predicted_away_score,
            confidence,
            source: PredictionSource::Model,
        }
    }

    /// Deterministic strength heuristic over resolved stats.
    fn heuristic(
        &self,
        home_team: &str,
        away_team: &str,
        home: &TeamStats,
        away: &TeamStats,
    ) -> MatchPrediction {
        let t = &self.tunables;

        let home_strength = (f64::from(home.points)
            + t.goal_diff_weight * f64::from(home.goal_diff))
            * t.home_advantage;
        let away_strength = f64::from(away.points);

        let home_matches = f64::from(home.matches_for_rates());
        let away_matches = f64::from(away.matches_for_rates());
        let home_goals_per_game = f64::from(home.goals_for) / home_matches;
        let away_goals_per_game = f64::from(away.goals_for) / away_matches;
        let home_conceded_per_game = f64::from(home.goals_against) / home_matches;
        let away_conceded_per_game = f64::from(away.goals_against) / away_matches;

        let mut home_score = clamp_score(
            (home_goals_per_game * ATTACK_WEIGHT + away_conceded_per_game * DEFENSE_WEIGHT)
                * HOME_SCORE_BOOST,
            t.max_goals,
        );
        let mut away_score = clamp_score(
            (away_goals_per_game * ATTACK_WEIGHT + home_conceded_per_game * DEFENSE_WEIGHT)
                * AWAY_SCORE_DAMP,
            t.max_goals,
        );

        // Strict > keeps a dead zone of `strength_margin` around equal
        // strength, so marginal differences stay a draw.
        let (predicted_result, probs) = if home_strength > away_strength + t.strength_margin {
            if home_score <= away_score {
                home_score = away_score + 1;
            }
            (MatchOutcome::HomeWin, (0.60, 0.25, 0.15))
        } else if away_strength > home_strength + t.strength_margin {
            if away_score <= home_score {
                away_score = home_score + 1;
            }
            (MatchOutcome::AwayWin, (0.15, 0.25, 0.60))
        } else {
            let average = f64::from(home_score + away_score) / 2.0;
            let level = average.round().max(0.0) as u32;
            home_score = level;
            away_score = level;
            (MatchOutcome::Draw, (0.35, 0.35, 0.30))
        };

        let (home_prob, draw_prob, away_prob) = probs;
        MatchPrediction {
            home_team: home_team.to_string(),
            away_team: away_team.to_string(),
            predicted_result,
            home_win_probability: home_prob,
            draw_probability: draw_prob,
            away_win_probability: away_prob,
            predicted_home_score: Some(home_score),
            predicted_away_score: Some(away_score),
            confidence: home_prob.max(draw_prob).max(away_prob),
            source: PredictionSource::Heuristic,
        }
    }
}

fn clamp_score(value: f64, max_goals: u32) -> u32 {
    (value.round().max(0.0) as u32).min(max_goals)
}

/// Prediction used when either team's statistics are unavailable.
fn neutral_default(home_team: &str, away_team: &str) -> MatchPrediction {
    MatchPrediction {
        home_team: home_team.to_string(),
        away_team: away_team.to_string(),
        predicted_result: MatchOutcome::Draw,
        home_win_probability: 0.33,
        draw_probability: 0.34,
        away_win_probability: 0.33,
        predicted_home_score: Some(1),
        predicted_away_score: Some(1),
        confidence: 0.5,
        source: PredictionSource::Default,
    }
}

/// Format a prediction for terminal display.
pub fn format_prediction(pred: &MatchPrediction) -> String {
    let scoreline = match (pred.predicted_home_score, pred.predicted_away_score) {
        (Some(h), Some(a)) => format!("{} - {}", h, a),
        _ => "n/a".to_string(),
    };

    format!(
        r#"
┌─────────────────────────────────────────────────┐
│  {} vs {}
├─────────────────────────────────────────────────┤
│  Result:           {}
│  Probabilities:    H {:.0}%  D {:.0}%  A {:.0}%
│  Predicted score:  {}
│  Confidence:       {:.0}%  ({})
└─────────────────────────────────────────────────┘
"#,
        pred.home_team,
        pred.away_team,
        pred.predicted_result,
        pred.home_win_probability * 100.0,
        pred.draw_probability * 100.0,
        pred.away_win_probability * 100.0,
        scoreline,
        pred.confidence * 100.0,
        pred.source,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureVector;
    use crate::model::{LinearHead, OutcomeClassifier, ScoreRegressor, Standardization};
    use crate::parse_form;

    fn stats(name: &str, points: u32, goal_diff: i32) -> TeamStats {
        TeamStats {
            team_name: name.to_string(),
            matches_played: 20,
            wins: points / 3,
            draws: points % 3,
            losses: 20 - points / 3 - points % 3,
            goals_for: 25,
            goals_against: (25 - goal_diff) as u32,
            goal_diff,
            points,
            league_position: Some(5),
            form: parse_form("WDWLW"),
        }
    }

    fn seeded_store(pairs: &[(&str, TeamStats)]) -> StatsStore {
        let store = StatsStore::in_memory().unwrap();
        for (name, stats) in pairs {
            store.upsert_team_stats(name, stats).unwrap();
        }
        store
    }

    fn identity_standardization() -> Standardization {
        Standardization {
            means: vec![0.0; FeatureVector::DIM],
            stds: vec![1.0; FeatureVector::DIM],
        }
    }

    #[test]
    fn test_unknown_teams_get_neutral_default() {
        let store = StatsStore::in_memory().unwrap();
        let predictor = MatchPredictor::new(&store, ModelBundle::none(), PredictionConfig::default());

        let pred = predictor.predict("Atlantis FC", "El Dorado").unwrap();
        assert_eq!(pred.source, PredictionSource::Default);
        assert_eq!(pred.predicted_result, MatchOutcome::Draw);
        assert_eq!(pred.home_win_probability, 0.33);
        assert_eq!(pred.draw_probability, 0.34);
        assert_eq!(pred.predicted_home_score, Some(1));
        assert_eq!(pred.predicted_away_score, Some(1));
        assert_eq!(pred.confidence, 0.5);
    }

    #[test]
    fn test_one_unknown_team_is_enough_for_default() {
        let store = seeded_store(&[("Arsenal", stats("Arsenal", 40, 10))]);
        let predictor = MatchPredictor::new(&store, ModelBundle::none(), PredictionConfig::default());

        let pred = predictor.predict("Arsenal", "Atlantis FC").unwrap();
        assert_eq!(pred.source, PredictionSource::Default);
    }

    #[test]
    fn test_heuristic_deterministic() {
        let store = seeded_store(&[
            ("Arsenal", stats("Arsenal", 45, 20)),
            ("Everton", stats("Everton", 22, -5)),
        ]);
        let predictor = MatchPredictor::new(&store, ModelBundle::none(), PredictionConfig::default());

        let first = predictor.predict("Arsenal", "Everton").unwrap();
        let second = predictor.predict("Arsenal", "Everton").unwrap();
        assert_eq!(first.predicted_result, second.predicted_result);
        assert_eq!(first.predicted_home_score, second.predicted_home_score);
        assert_eq!(first.home_win_probability, second.home_win_probability);
        assert_eq!(first.source, PredictionSource::Heuristic);
    }

    #[test]
    fn test_hysteresis_boundary_is_strict() {
        // home strength = (40 + 0.1*0) * 1.15 = 46.0 exactly; away = 36.
        // The gap is exactly the 10-point margin: not decisive.
        let store = seeded_store(&[
            ("Home", stats("Home", 40, 0)),
            ("Away", stats("Away", 36, 0)),
        ]);
        let predictor = MatchPredictor::new(&store, ModelBundle::none(), PredictionConfig::default());
        let pred = predictor.predict("Home", "Away").unwrap();
        assert_eq!(pred.predicted_result, MatchOutcome::Draw);
        assert_eq!(pred.home_win_probability, 0.35);

        // Nudge the gap past the margin: decisive.
        let store = seeded_store(&[
            ("Home", stats("Home", 40, 2)),
            ("Away", stats("Away", 36, 0)),
        ]);
        let predictor = MatchPredictor::new(&store, ModelBundle::none(), PredictionConfig::default());
        let pred = predictor.predict("Home", "Away").unwrap();
        assert_eq!(pred.predicted_result, MatchOutcome::HomeWin);
        assert_eq!(pred.home_win_probability, 0.60);
        assert_eq!(pred.confidence, 0.60);
    }

    #[test]
    fn test_away_win_side() {
        // home strength = 20 * 1.15 = 23; away 34 > 33.
        let store = seeded_store(&[
            ("Home", stats("Home", 20, 0)),
            ("Away", stats("Away", 34, 0)),
        ]);
        let predictor = MatchPredictor::new(&store, ModelBundle::none(), PredictionConfig::default());
        let pred = predictor.predict("Home", "Away").unwrap();
        assert_eq!(pred.predicted_result, MatchOutcome::AwayWin);
        assert_eq!(pred.away_win_probability, 0.60);
    }

    #[test]
    fn test_decisive_outcome_forces_consistent_scoreline() {
        // A goalless attack on both sides yields a 0-0 estimate; a decisive
        // strength gap must still produce a winning scoreline.
        let mut home = stats("Home", 60, 0);
        home.goals_for = 0;
        home.goals_against = 0;
        let mut away = stats("Away", 10, 0);
        away.goals_for = 0;
        away.goals_against = 0;

        let store = seeded_store(&[("Home", home), ("Away", away)]);
        let predictor = MatchPredictor::new(&store, ModelBundle::none(), PredictionConfig::default());
        let pred = predictor.predict("Home", "Away").unwrap();

        assert_eq!(pred.predicted_result, MatchOutcome::HomeWin);
        assert_eq!(pred.predicted_home_score, Some(1));
        assert_eq!(pred.predicted_away_score, Some(0));
    }

    #[test]
    fn test_draw_levels_the_scores() {
        let mut home = stats("Home", 30, 0);
        home.goals_for = 60; // 3 per game, clamps high
        let away = stats("Away", 30, 0);

        let store = seeded_store(&[("Home", home), ("Away", away)]);
        let predictor = MatchPredictor::new(&store, ModelBundle::none(), PredictionConfig::default());
        let pred = predictor.predict("Home", "Away").unwrap();

        assert_eq!(pred.predicted_result, MatchOutcome::Draw);
        assert_eq!(pred.predicted_home_score, pred.predicted_away_score);
    }

    #[test]
    fn test_heuristic_probabilities_sum_to_one() {
        let store = seeded_store(&[
            ("Arsenal", stats("Arsenal", 45, 20)),
            ("Everton", stats("Everton", 22, -5)),
        ]);
        let predictor = MatchPredictor::new(&store, ModelBundle::none(), PredictionConfig::default());
        let pred = predictor.predict("Arsenal", "Everton").unwrap();
        let sum =
            pred.home_win_probability + pred.draw_probability + pred.away_win_probability;
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_model_path_used_when_classifier_loaded() {
        let store = seeded_store(&[
            ("Arsenal", stats("Arsenal", 45, 20)),
            ("Everton", stats("Everton", 22, -5)),
        ]);

        // Zero weights, biases favouring the away class
        let head = |bias| LinearHead {
            weights: vec![0.0; FeatureVector::DIM],
            bias,
        };
        let models = ModelBundle {
            outcome: Some(OutcomeClassifier {
                heads: vec![head(-1.0), head(0.0), head(2.0)],
                standardization: identity_standardization(),
            }),
            score: None,
        };

        let predictor = MatchPredictor::new(&store, models, PredictionConfig::default());
        let pred = predictor.predict("Arsenal", "Everton").unwrap();

        assert_eq!(pred.source, PredictionSource::Model);
        assert_eq!(pred.predicted_result, MatchOutcome::AwayWin);
        assert_eq!(pred.confidence, pred.away_win_probability);
        // No regressor loaded: scores absent on the model path
        assert_eq!(pred.predicted_home_score, None);

        let sum =
            pred.home_win_probability + pred.draw_probability + pred.away_win_probability;
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_model_path_scores_have_no_upper_clamp() {
        let store = seeded_store(&[
            ("Arsenal", stats("Arsenal", 45, 20)),
            ("Everton", stats("Everton", 22, -5)),
        ]);

        let head = |bias| LinearHead {
            weights: vec![0.0; FeatureVector::DIM],
            bias,
        };
        let models = ModelBundle {
            outcome: Some(OutcomeClassifier {
                heads: vec![head(1.0), head(0.0), head(0.0)],
                standardization: identity_standardization(),
            }),
            score: Some(ScoreRegressor {
                home: LinearHead { weights: vec![0.0; FeatureVector::DIM], bias: 7.6 },
                away: LinearHead { weights: vec![0.0; FeatureVector::DIM], bias: -0.4 },
                standardization: identity_standardization(),
            }),
        };

        let predictor = MatchPredictor::new(&store, models, PredictionConfig::default());
        let pred = predictor.predict("Arsenal", "Everton").unwrap();

        // Rounded, floored at zero, allowed past the heuristic's cap
        assert_eq!(pred.predicted_home_score, Some(8));
        assert_eq!(pred.predicted_away_score, Some(0));
    }

    #[test]
    fn test_missing_stats_beat_loaded_model() {
        // Even with a classifier loaded, unresolved stats mean the neutral
        // default, not a model prediction over garbage.
        let store = StatsStore::in_memory().unwrap();
        let head = |bias| LinearHead {
            weights: vec![0.0; FeatureVector::DIM],
            bias,
        };
        let models = ModelBundle {
            outcome: Some(OutcomeClassifier {
                heads: vec![head(1.0), head(0.0), head(0.0)],
                standardization: identity_standardization(),
            }),
            score: None,
        };

        let predictor = MatchPredictor::new(&store, models, PredictionConfig::default());
        let pred = predictor.predict("Arsenal", "Everton").unwrap();
        assert_eq!(pred.source, PredictionSource::Default);
    }
}
