//! SQLite-backed statistics store
//!
//! Persists wholesale snapshots of team statistics, teams and matches, and
//! resolves informal team names to stored records.

use crate::{form_to_string, parse_form, MatchRecord, Result, Team, TeamStats};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Store connection and operations.
pub struct StatsStore {
    conn: Connection,
}

impl StatsStore {
    /// Open or create the store at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let store = StatsStore { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = StatsStore { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS teams (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                short_name TEXT,
                crest TEXT,
                founded INTEGER,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS team_stats (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                team_name TEXT NOT NULL UNIQUE,
                matches_played INTEGER NOT NULL DEFAULT 0,
                wins INTEGER NOT NULL DEFAULT 0,
                draws INTEGER NOT NULL DEFAULT 0,
                losses INTEGER NOT NULL DEFAULT 0,
                goals_for INTEGER NOT NULL DEFAULT 0,
                goals_against INTEGER NOT NULL DEFAULT 0,
                goal_diff INTEGER NOT NULL DEFAULT 0,
                points INTEGER NOT NULL DEFAULT 0,
                position INTEGER,
                form TEXT NOT NULL DEFAULT '',
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS matches (
                id INTEGER PRIMARY KEY,
                home_team TEXT NOT NULL,
                away_team TEXT NOT NULL,
                match_date TEXT,
                home_score INTEGER,
                away_score INTEGER,
                status TEXT,
                result TEXT,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_matches_date ON matches(match_date);
            "#,
        )?;
        Ok(())
    }

    // ==================== Team statistics ====================

    /// Replace the statistics record stored under `name` (no merge).
    pub fn upsert_team_stats(&self, name: &str, stats: &TeamStats) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT OR REPLACE INTO team_stats
                (team_name, matches_played, wins, draws, losses, goals_for,
                 goals_against, goal_diff, points, position, form, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                name,
                stats.matches_played,
                stats.wins,
                stats.draws,
                stats.losses,
                stats.goals_for,
                stats.goals_against,
                stats.goal_diff,
                stats.points,
                stats.league_position,
                form_to_string(&stats.form),
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Resolve a possibly informal team name to its stored statistics.
    ///
    /// `Ok(None)` means "statistics unavailable" and is the expected miss
    /// path; `Err` is reserved for storage failures.
    pub fn resolve_team_stats(&self, name: &str) -> Result<Option<TeamStats>> {
        // Exact case-insensitive match first
        if let Some(stats) = self.stats_by_exact_name(name)? {
            return Ok(Some(stats));
        }

        // Fall back to scanning stored names with the fuzzy rules
        let names = self.stat_team_names()?;
        match resolve_stored_name(name, &names) {
            Some(stored) => {
                log::debug!("resolved {:?} to stored record {:?}", name, stored);
                self.stats_by_exact_name(&stored)
            }
            None => Ok(None),
        }
    }

    fn stats_by_exact_name(&self, name: &str) -> Result<Option<TeamStats>> {
        let stats = self
            .conn
            .query_row(
                "SELECT team_name, matches_played, wins, draws, losses, goals_for,
                        goals_against, goal_diff, points, position, form
                 FROM team_stats WHERE LOWER(team_name) = LOWER(?1)",
                params![name],
                Self::row_to_stats,
            )
            .optional()?;
        Ok(stats)
    }

    /// Stored stat record names in insertion order.
    fn stat_team_names(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT team_name FROM team_stats ORDER BY id")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(names)
    }

    fn row_to_stats(row: &rusqlite::Row) -> rusqlite::Result<TeamStats> {
        let form: String = row.get(10)?;
        Ok(TeamStats {
            team_name: row.get(0)?,
            matches_played: row.get(1)?,
            wins: row.get(2)?,
            draws: row.get(3)?,
            losses: row.get(4)?,
            goals_for: row.get(5)?,
            goals_against: row.get(6)?,
            goal_diff: row.get(7)?,
            points: row.get(8)?,
            league_position: row.get(9)?,
            form: parse_form(&form),
        })
    }

    // ==================== Teams ====================

    /// Replace the stored team list with the given snapshot entries.
    pub fn save_teams(&self, teams: &[Team]) -> Result<()> {
        for team in teams {
            self.conn.execute(
                "INSERT OR REPLACE INTO teams (id, name, short_name, crest, founded, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    team.id,
                    team.name,
                    team.short_name,
                    team.crest,
                    team.founded,
                    Utc::now().to_rfc3339(),
                ],
            )?;
        }
        Ok(())
    }

    /// All stored teams in id order.
    pub fn teams(&self) -> Result<Vec<Team>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, short_name, crest, founded FROM teams ORDER BY id")?;
        let teams = stmt
            .query_map([], |row| {
                Ok(Team {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    short_name: row.get(2)?,
                    crest: row.get(3)?,
                    founded: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(teams)
    }

    // ==================== Matches ====================

    /// Insert or replace a match record.
    pub fn upsert_match(&self, record: &MatchRecord) -> Result<()> {
        let result = record.outcome().map(|o| o.to_string());
        self.conn.execute(
            r#"
            INSERT OR REPLACE INTO matches
                (id, home_team, away_team, match_date, home_score, away_score,
                 status, result, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                record.id,
                record.home_team,
                record.away_team,
                record.date.map(|d| d.to_rfc3339()),
                record.home_score,
                record.away_score,
                record.status,
                result,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Most recent matches, newest first.
    pub fn recent_matches(&self, limit: usize) -> Result<Vec<MatchRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, home_team, away_team, match_date, home_score, away_score, status
             FROM matches ORDER BY match_date DESC LIMIT ?1",
        )?;
        let matches = stmt
            .query_map(params![limit], |row| {
                let date: Option<String> = row.get(3)?;
                Ok(MatchRecord {
                    id: row.get(0)?,
                    home_team: row.get(1)?,
                    away_team: row.get(2)?,
                    date: date
                        .and_then(|d| DateTime::parse_from_rfc3339(&d).ok())
                        .map(|d| d.with_timezone(&Utc)),
                    home_score: row.get(4)?,
                    away_score: row.get(5)?,
                    status: row.get(6)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(matches)
    }

    // ==================== Status ====================

    /// Row counts for the CLI status display.
    pub fn summary(&self) -> Result<StoreSummary> {
        let team_count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM teams", [], |row| row.get(0))?;
        let stats_count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM team_stats", [], |row| row.get(0))?;
        let match_count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM matches", [], |row| row.get(0))?;

        Ok(StoreSummary {
            team_count: team_count as usize,
            stats_count: stats_count as usize,
            match_count: match_count as usize,
        })
    }
}

/// Store row counts.
#[derive(Debug, Clone)]
pub struct StoreSummary {
    pub team_count: usize,
    pub stats_count: usize,
    pub match_count: usize,
}

// ==================== Name resolution ====================

/// Apply the fuzzy rules to pick a stored name for `query`.
///
/// Rules in priority order, candidates scanned in stored order, first hit
/// wins: suffix-stripped equality, then substring/abbreviation matching over
/// normalized variants. (Exact matching happens in SQL before this runs.)
fn resolve_stored_name(query: &str, stored: &[String]) -> Option<String> {
    let query_base = strip_org_suffix(&normalize(query));

    for candidate in stored {
        if strip_org_suffix(&normalize(candidate)) == query_base {
            return Some(candidate.clone());
        }
    }

    let query_variants = name_variants(query);
    for candidate in stored {
        let candidate_variants = name_variants(candidate);
        for q in &query_variants {
            for c in &candidate_variants {
                if fuzzy_match(q, c) {
                    return Some(candidate.clone());
                }
            }
        }
    }

    None
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Drop a trailing organizational suffix ("FC") plus surrounding whitespace.
/// Expects an already-normalized name.
fn strip_org_suffix(name: &str) -> String {
    match name.strip_suffix(" fc") {
        Some(stripped) => stripped.trim_end().to_string(),
        None => name.to_string(),
    }
}

/// Normalized variants of a name. The United/Utd abbreviation is substituted
/// in both directions as distinct variants.
fn name_variants(name: &str) -> Vec<String> {
    let base = strip_org_suffix(&normalize(name));
    let mut variants = vec![base.clone()];
    if base.contains("united") {
        variants.push(base.replace("united", "utd"));
    }
    if base.contains("utd") {
        variants.push(base.replace("utd", "united"));
    }
    variants
}

/// Two normalized variants match when one contains the other, or when one is
/// a token-by-token abbreviation of the other ("man united" against
/// "manchester united").
fn fuzzy_match(a: &str, b: &str) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.contains(b) || b.contains(a) || tokens_abbreviate(a, b) || tokens_abbreviate(b, a)
}

/// Every token of `abbrev` is, in order, a prefix of a token of `full`.
fn tokens_abbreviate(abbrev: &str, full: &str) -> bool {
    let mut full_tokens = full.split_whitespace();
    !abbrev.is_empty()
        && abbrev
            .split_whitespace()
            .all(|a| full_tokens.any(|f| f.starts_with(a)))
}
