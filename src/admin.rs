//! Match curation for the admin panel.
//!
//! Each mutation waits out a configurable delay before touching storage, to
//! behave like a remote call. Nothing cancels a pending operation.

use std::time::Duration;

use serde::Deserialize;
use tokio::time::sleep;
use tracing::{info, instrument};

use crate::error::{MatchdayError, Result};
use crate::keys::SlotKey;
use crate::model::{Competition, Engagement, Match, MatchTeam, Score, Stadium};
use crate::ranking::EngagementCounters;
use crate::reviews::load_matches;
use crate::seed;
use crate::store::Store;

/// Everything an admin fills in for a match. The id is assigned on insert.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchDraft {
    pub home_team: MatchTeam,
    pub away_team: MatchTeam,
    pub score: Score,
    pub date: String,
    pub competition: Competition,
    #[serde(default)]
    pub stage: Option<String>,
    pub stadium: Stadium,
    #[serde(default)]
    pub poster: String,
    #[serde(default)]
    pub highlights: Option<String>,
    #[serde(default)]
    pub engagement: Option<Engagement>,
}

impl MatchDraft {
    fn validate(&self) -> Result<()> {
        let required = [
            (self.home_team.name.as_str(), "homeTeam.name"),
            (self.away_team.name.as_str(), "awayTeam.name"),
            (self.competition.name.as_str(), "competition.name"),
            (self.stadium.name.as_str(), "stadium.name"),
            (self.date.as_str(), "date"),
        ];
        if let Some((_, field)) = required.iter().find(|(value, _)| value.trim().is_empty()) {
            return Err(MatchdayError::MissingField(*field));
        }
        if crate::model::parse_match_date(&self.date).is_none() {
            return Err(MatchdayError::MissingField("date"));
        }
        if let Some(avg) = self.engagement.as_ref().and_then(|e| e.rating_average) {
            if !(0.0..=5.0).contains(&avg) {
                return Err(MatchdayError::InvalidRatingAverage(avg));
            }
        }
        Ok(())
    }

    fn into_match(self, id: u32) -> Match {
        Match {
            id,
            home_team: self.home_team,
            away_team: self.away_team,
            score: self.score,
            date: self.date.trim().to_owned(),
            competition: self.competition,
            stage: self.stage.filter(|s| !s.trim().is_empty()),
            stadium: self.stadium,
            poster: self.poster,
            highlights: self.highlights.filter(|h| !h.trim().is_empty()),
            engagement: self.engagement,
        }
    }
}

impl From<Match> for MatchDraft {
    fn from(m: Match) -> Self {
        Self {
            home_team: m.home_team,
            away_team: m.away_team,
            score: m.score,
            date: m.date,
            competition: m.competition,
            stage: m.stage,
            stadium: m.stadium,
            poster: m.poster,
            highlights: m.highlights,
            engagement: m.engagement,
        }
    }
}

#[instrument(skip(store, draft))]
pub(crate) async fn add_match(store: &Store, draft: MatchDraft, latency: Duration) -> Result<Match> {
    draft.validate()?;
    sleep(latency).await;

    let mut matches = load_matches(store);
    let id = next_match_id(store, &matches);
    let added = draft.into_match(id);
    matches.push(added.clone());
    store.write(SlotKey::Matches, &matches);

    info!(id, title = %added.title(), "match added");
    Ok(added)
}

/// Ids are never reused, so per-user data left behind by a deleted match
/// stays dangling instead of attaching to a newer one.
fn next_match_id(store: &Store, matches: &[Match]) -> u32 {
    let highest = matches.iter().map(|m| m.id).max().unwrap_or(0);
    let id = store
        .read(SlotKey::MatchSeq, 0u32)
        .max(highest)
        .saturating_add(1);
    store.write(SlotKey::MatchSeq, &id);
    id
}

/// Replace a match's details. Engagement counters are kept unless the
/// draft brings its own.
#[instrument(skip(store, draft))]
pub(crate) async fn update_match(
    store: &Store,
    id: u32,
    draft: MatchDraft,
    latency: Duration,
) -> Result<Match> {
    draft.validate()?;
    sleep(latency).await;

    let mut matches = load_matches(store);
    let existing = matches
        .iter_mut()
        .find(|m| m.id == id)
        .ok_or(MatchdayError::MatchNotFound(id))?;
    let mut updated = draft.into_match(id);
    if updated.engagement.is_none() {
        updated.engagement = existing.engagement.take();
    }
    *existing = updated.clone();
    store.write(SlotKey::Matches, &matches);

    info!(id, "match updated");
    Ok(updated)
}

/// Remove a match. Lists that reference it keep the dangling id.
#[instrument(skip(store))]
pub(crate) async fn delete_match(store: &Store, id: u32, latency: Duration) -> Result<Match> {
    sleep(latency).await;

    let mut matches = load_matches(store);
    let position = matches
        .iter()
        .position(|m| m.id == id)
        .ok_or(MatchdayError::MatchNotFound(id))?;
    let removed = matches.remove(position);
    store.write(SlotKey::Matches, &matches);

    info!(id, "match deleted");
    Ok(removed)
}

/// Write the static catalog if no match slot exists yet. Returns how many
/// matches were written.
pub(crate) fn seed_if_empty(store: &Store) -> usize {
    if store.contains(SlotKey::Matches) {
        return 0;
    }
    let matches = seed::matches();
    store.write(SlotKey::Matches, &matches);
    info!(count = matches.len(), "seeded match catalog");
    matches.len()
}

/// Catalog-wide engagement totals for the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogStats {
    pub matches: usize,
    pub ratings: u64,
    pub reviews: u64,
    pub views: u64,
}

pub(crate) fn stats(store: &Store) -> CatalogStats {
    load_matches(store)
        .iter()
        .map(EngagementCounters::of)
        .fold(CatalogStats::default(), |acc, c| CatalogStats {
            matches: acc.matches + 1,
            ratings: acc.ratings + u64::from(c.ratings),
            reviews: acc.reviews + u64::from(c.reviews),
            views: acc.views + u64::from(c.views),
        })
}
