//! Football match and season prediction from league statistics
//!
//! A two-tier prediction engine: a trained linear model when artifacts are
//! available, and a deterministic statistical fallback when they are not.

pub mod data;
pub mod features;
pub mod model;
pub mod predict;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A single result in a team's recent form, most recent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormResult {
    Win,
    Draw,
    Loss,
}

impl FormResult {
    /// Points awarded for this result when scoring form (W=3, D=1, L=0).
    pub fn points(&self) -> u32 {
        match self {
            FormResult::Win => 3,
            FormResult::Draw => 1,
            FormResult::Loss => 0,
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'W' => Some(FormResult::Win),
            'D' => Some(FormResult::Draw),
            'L' => Some(FormResult::Loss),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            FormResult::Win => 'W',
            FormResult::Draw => 'D',
            FormResult::Loss => 'L',
        }
    }
}

/// Parse a form string like "WDLWW" into results, most recent first.
///
/// Lenient: separator characters (commas, spaces) are skipped. Upstream
/// standings feeds deliver form both as "WDLWW" and "W,D,L,W,W".
pub fn parse_form(form: &str) -> Vec<FormResult> {
    form.chars().filter_map(FormResult::from_char).collect()
}

/// Render a form sequence back to its compact letter string.
pub fn form_to_string(form: &[FormResult]) -> String {
    form.iter().map(FormResult::as_char).collect()
}

/// Aggregate league statistics for one team.
///
/// Created or overwritten wholesale on each refresh from the external data
/// source; there are no partial updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamStats {
    pub team_name: String,
    pub matches_played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_diff: i32,
    pub points: u32,
    /// Current league position, 1-indexed. `None` when the source did not
    /// report one.
    pub league_position: Option<u32>,
    /// Recent results, most recent first.
    pub form: Vec<FormResult>,
}

impl TeamStats {
    /// Whether the win/draw/loss record adds up to the matches played.
    pub fn record_consistent(&self) -> bool {
        self.matches_played == 0 || self.wins + self.draws + self.losses == self.matches_played
    }

    /// Matches played floored at 1, for per-game rate computations.
    pub fn matches_for_rates(&self) -> u32 {
        self.matches_played.max(1)
    }
}

/// A team as reported by the external data source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    pub name: String,
    pub short_name: Option<String>,
    pub crest: Option<String>,
    pub founded: Option<u32>,
}

/// A single match as reported by the external data source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: i64,
    pub home_team: String,
    pub away_team: String,
    pub date: Option<DateTime<Utc>>,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub status: Option<String>,
}

impl MatchRecord {
    /// Full-time outcome, if both scores are known.
    pub fn outcome(&self) -> Option<MatchOutcome> {
        match (self.home_score, self.away_score) {
            (Some(h), Some(a)) if h > a => Some(MatchOutcome::HomeWin),
            (Some(h), Some(a)) if a > h => Some(MatchOutcome::AwayWin),
            (Some(_), Some(_)) => Some(MatchOutcome::Draw),
            _ => None,
        }
    }
}

/// Predicted full-time outcome of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchOutcome {
    HomeWin,
    Draw,
    AwayWin,
}

impl fmt::Display for MatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchOutcome::HomeWin => write!(f, "HOME_WIN"),
            MatchOutcome::Draw => write!(f, "DRAW"),
            MatchOutcome::AwayWin => write!(f, "AWAY_WIN"),
        }
    }
}

/// Which path produced a prediction.
///
/// Callers see the same fully-populated result either way; tests and logs can
/// still tell a model prediction from a degraded one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionSource {
    /// Trained classifier (and optionally regressor) produced the result.
    Model,
    /// Deterministic strength heuristic over resolved stats.
    Heuristic,
    /// Neutral default; one or both teams had no statistics.
    Default,
}

impl fmt::Display for PredictionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictionSource::Model => write!(f, "model"),
            PredictionSource::Heuristic => write!(f, "heuristic"),
            PredictionSource::Default => write!(f, "default"),
        }
    }
}

/// Outcome distribution and score estimate for a single match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchPrediction {
    pub home_team: String,
    pub away_team: String,
    pub predicted_result: MatchOutcome,
    pub home_win_probability: f64,
    pub draw_probability: f64,
    pub away_win_probability: f64,
    pub predicted_home_score: Option<u32>,
    pub predicted_away_score: Option<u32>,
    /// Maximum of the three outcome probabilities.
    pub confidence: f64,
    pub source: PredictionSource,
}

/// One row of the projected final table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonTableRow {
    pub team: String,
    pub predicted_points: f64,
    pub current_points: u32,
    pub current_position: u32,
    pub predicted_position: u32,
}

/// Projected final table with champion and relegation summaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonPrediction {
    pub season: String,
    pub standings: Vec<SeasonTableRow>,
    pub predicted_champion: Option<String>,
    pub predicted_relegated: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

/// Application-wide errors
#[derive(Debug, Error)]
pub enum FootyError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Model artifact error: {0}")]
    Model(String),
}

pub type Result<T> = std::result::Result<T, FootyError>;

/// Application configuration loaded from config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub prediction: PredictionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub database_path: String,
    pub model_dir: String,
}

/// Tunables for the prediction heuristics.
///
/// These were fixed literals in earlier iterations of the system; they are
/// configuration now, with the historical values as defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionConfig {
    /// Multiplier applied to home strength.
    pub home_advantage: f64,
    /// Weight of goal difference in the strength score.
    pub goal_diff_weight: f64,
    /// Dead zone around equal strength inside which no decisive outcome is
    /// chosen (strict `>` at the boundary).
    pub strength_margin: f64,
    /// Upper clamp for heuristic score estimates.
    pub max_goals: u32,
    /// Rank assumed for a team with no reported league position.
    pub default_position: u32,
    /// Matches in a full season, for points extrapolation.
    pub season_games: u32,
    /// Projected total for a team that has not played yet.
    pub baseline_points: f64,
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            database_path: "data/footy.db".to_string(),
            model_dir: "model".to_string(),
        }
    }
}

impl Default for PredictionConfig {
    fn default() -> Self {
        PredictionConfig {
            home_advantage: 1.15,
            goal_diff_weight: 0.1,
            strength_margin: 10.0,
            max_goals: 5,
            default_position: 20,
            season_games: 38,
            baseline_points: 50.0,
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            FootyError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        toml::from_str(&content)
            .map_err(|e| FootyError::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| FootyError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
