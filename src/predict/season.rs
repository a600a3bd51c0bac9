//! Season table extrapolation
//!
//! Projects the final table by extending each team's current points-per-game
//! over the full season. Teams without statistics get a baseline projection
//! rather than being dropped from the table.

use crate::data::StatsStore;
use crate::{
    PredictionConfig, Result, SeasonPrediction, SeasonTableRow, Team,
};
use chrono::{DateTime, Datelike, Utc};

/// Teams relegated from the bottom of the table.
const RELEGATION_SPOTS: usize = 3;

/// Projects final standings from current league statistics.
pub struct SeasonPredictor<'a> {
    store: &'a StatsStore,
    tunables: PredictionConfig,
}

impl<'a> SeasonPredictor<'a> {
    pub fn new(store: &'a StatsStore, tunables: PredictionConfig) -> Self {
        SeasonPredictor { store, tunables }
    }

    /// Project final standings for `teams`.
    ///
    /// Ties in projected points keep the input order of `teams`.
    pub fn predict(&self, teams: &[Team]) -> Result<SeasonPrediction> {
        let t = &self.tunables;
        let mut standings = Vec::with_capacity(teams.len());

        for team in teams {
            let row = match self.store.resolve_team_stats(&team.name)? {
                Some(stats) => {
                    let predicted_points = if stats.matches_played == 0 {
                        t.baseline_points
                    } else {
                        let per_game = f64::from(stats.points) / f64::from(stats.matches_played);
                        round_tenth(per_game * f64::from(t.season_games))
                    };
                    SeasonTableRow {
                        team: team.name.clone(),
                        predicted_points,
                        current_points: stats.points,
                        current_position: stats.league_position.unwrap_or(t.default_position),
                        predicted_position: 0,
                    }
                }
                None => {
                    log::debug!("no statistics for {}; baseline projection", team.name);
                    SeasonTableRow {
                        team: team.name.clone(),
                        predicted_points: t.baseline_points,
                        current_points: 0,
                        current_position: t.default_position,
                        predicted_position: 0,
                    }
                }
            };
            standings.push(row);
        }

        // Stable sort: tied teams keep their input order
        standings.sort_by(|a, b| b.predicted_points.total_cmp(&a.predicted_points));
        for (i, row) in standings.iter_mut().enumerate() {
            row.predicted_position = i as u32 + 1;
        }

        let predicted_champion = standings.first().map(|row| row.team.clone());
        let predicted_relegated = if standings.len() >= RELEGATION_SPOTS {
            standings[standings.len() - RELEGATION_SPOTS..]
                .iter()
                .map(|row| row.team.clone())
                .collect()
        } else {
            Vec::new()
        };

        Ok(SeasonPrediction {
            season: season_label(Utc::now()),
            standings,
            predicted_champion,
            predicted_relegated,
            updated_at: Utc::now(),
        })
    }
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Season label for a given instant, rolling over in July ("2025/26" for any
/// date from July 2025 through June 2026).
fn season_label(now: DateTime<Utc>) -> String {
    let start_year = if now.month() >= 7 {
        now.year()
    } else {
        now.year() - 1
    };
    format!("{}/{:02}", start_year, (start_year + 1) % 100)
}
