//! Feature derivation
//!
//! Converts a pair of team stat records into the fixed feature vector the
//! trained models consume.

use crate::{FormResult, TeamStats};

/// Number of recent results scored when computing form.
const FORM_WINDOW: usize = 5;

/// Rank assumed for a team whose league position is unknown (worst plausible).
const DEFAULT_POSITION: f64 = 20.0;

/// Ordered numeric features for a single (home, away) pairing.
///
/// The slot order is the contract between training and inference; reordering
/// or resizing it invalidates previously trained artifacts.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Vec<f64>,
}

impl FeatureVector {
    /// Dimension of the feature vector.
    pub const DIM: usize = 27;

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Derive the feature vector for a match, home perspective first.
///
/// Pure and total: zeroed stats produce a valid vector (rate divisors are
/// floored at 1).
pub fn derive(home: &TeamStats, away: &TeamStats) -> FeatureVector {
    let home_matches = f64::from(home.matches_for_rates());
    let away_matches = f64::from(away.matches_for_rates());

    let mut values = Vec::with_capacity(FeatureVector::DIM);

    // Points
    values.push(f64::from(home.points));
    values.push(f64::from(away.points));
    values.push(f64::from(home.points) - f64::from(away.points));

    // Goal statistics
    values.push(f64::from(home.goals_for));
    values.push(f64::from(away.goals_for));
    values.push(f64::from(home.goals_against));
    values.push(f64::from(away.goals_against));
    values.push(f64::from(home.goal_diff));
    values.push(f64::from(away.goal_diff));

    // Win/draw/loss records
    values.push(f64::from(home.wins));
    values.push(f64::from(away.wins));
    values.push(f64::from(home.draws));
    values.push(f64::from(away.draws));
    values.push(f64::from(home.losses));
    values.push(f64::from(away.losses));

    // Matches played
    values.push(f64::from(home.matches_played));
    values.push(f64::from(away.matches_played));

    // Goals per game
    values.push(f64::from(home.goals_for) / home_matches);
    values.push(f64::from(away.goals_for) / away_matches);
    values.push(f64::from(home.goals_against) / home_matches);
    values.push(f64::from(away.goals_against) / away_matches);

    // Win rate
    values.push(f64::from(home.wins) / home_matches);
    values.push(f64::from(away.wins) / away_matches);

    // Recent form
    values.push(form_score(&home.form));
    values.push(form_score(&away.form));

    // Position difference
    let home_pos = home.league_position.map_or(DEFAULT_POSITION, f64::from);
    let away_pos = away.league_position.map_or(DEFAULT_POSITION, f64::from);
    values.push(home_pos - away_pos);

    // Home advantage marker
    values.push(1.0);

    FeatureVector { values }
}

/// Score recent form on a 0–1 scale.
///
/// The most recent `FORM_WINDOW` results are scored (W=3, D=1, L=0) and the
/// sum is normalized by the maximum attainable. An empty sequence is neutral.
pub fn form_score(form: &[FormResult]) -> f64 {
    if form.is_empty() {
        return 0.5;
    }
    let considered = form.len().min(FORM_WINDOW);
    let total: u32 = form.iter().take(considered).map(FormResult::points).sum();
    f64::from(total) / (considered as f64 * 3.0)
}
