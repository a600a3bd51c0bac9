//! Data acquisition seam and storage
//!
//! The stats store persists snapshots of an external league-data source; the
//! `DataProvider` trait is the seam that source plugs into.

pub mod fixtures;
pub mod store;

pub use fixtures::FixtureProvider;
pub use store::StatsStore;

use crate::{MatchRecord, Result, Team, TeamStats};

/// External collaborator supplying team, stat and match records.
///
/// Implementations signal failure by returning empty collections or `None`;
/// the prediction core treats absence as "use fallback", never as fatal.
pub trait DataProvider {
    /// All teams in the competition. Empty on failure.
    fn fetch_teams(&self) -> Result<Vec<Team>>;

    /// Current aggregate statistics for one team. `None` when the team is
    /// unknown or the source is unavailable.
    fn fetch_team_stats(&self, team_name: &str) -> Result<Option<TeamStats>>;

    /// Recently completed matches, newest first, up to `limit`. Empty on
    /// failure.
    fn fetch_recent_matches(&self, limit: usize) -> Result<Vec<MatchRecord>>;
}

/// Refresh the store from a provider: teams, per-team stats, recent matches.
///
/// Each record is replaced wholesale; teams the provider no longer reports
/// keep their stale snapshot until the next full refresh. Returns the number
/// of stat records written.
pub fn sync_store(store: &StatsStore, provider: &dyn DataProvider) -> Result<usize> {
    let teams = provider.fetch_teams()?;
    store.save_teams(&teams)?;

    let mut written = 0;
    for team in &teams {
        if let Some(stats) = provider.fetch_team_stats(&team.name)? {
            store.upsert_team_stats(&team.name, &stats)?;
            written += 1;
        } else {
            log::info!("no statistics available for {}", team.name);
        }
    }

    for record in provider.fetch_recent_matches(100)? {
        store.upsert_match(&record)?;
    }

    Ok(written)
}
