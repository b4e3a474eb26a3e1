//! Searching, filtering and sorting the in-memory match catalog.

use chrono::NaiveDate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::model::Match;
use crate::ranking::EngagementCounters;

/// Sort order for catalog results.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "kebab-case")]
pub enum MatchSort {
    /// Most recent kickoff first.
    #[default]
    Newest,
    Oldest,
    /// Highest average rating first.
    Rating,
    /// Most viewed first.
    Popularity,
}

/// Filters applied to the catalog. Empty fields match everything.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CatalogQuery {
    /// Case-insensitive text matched against teams, competition and stadium.
    pub text: Option<String>,
    pub competition: Option<String>,
    pub stage: Option<String>,
    /// Earliest kickoff date, inclusive.
    pub from: Option<NaiveDate>,
    /// Latest kickoff date, inclusive.
    pub to: Option<NaiveDate>,
    pub sort: MatchSort,
}

impl CatalogQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn competition(mut self, competition: impl Into<String>) -> Self {
        self.competition = Some(competition.into());
        self
    }

    pub fn stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = Some(stage.into());
        self
    }

    pub fn between(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    pub fn sort(mut self, sort: MatchSort) -> Self {
        self.sort = sort;
        self
    }

    fn accepts(&self, m: &Match) -> bool {
        self.matches_text(m)
            && matches_field(self.competition.as_deref(), Some(m.competition.name.as_str()))
            && matches_field(self.stage.as_deref(), m.stage.as_deref())
            && self.matches_dates(m)
    }

    fn matches_text(&self, m: &Match) -> bool {
        let Some(needle) = non_blank(self.text.as_deref()) else {
            return true;
        };
        let needle = needle.to_lowercase();
        [
            m.home_team.name.as_str(),
            m.away_team.name.as_str(),
            m.competition.name.as_str(),
            m.stadium.name.as_str(),
            m.stadium.city.as_str(),
        ]
        .iter()
        .any(|haystack| haystack.to_lowercase().contains(&needle))
    }

    fn matches_dates(&self, m: &Match) -> bool {
        if self.from.is_none() && self.to.is_none() {
            return true;
        }
        let Some(day) = m.kickoff().map(|k| k.date_naive()) else {
            return false;
        };
        self.from.map_or(true, |from| day >= from) && self.to.map_or(true, |to| day <= to)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Exact, case-insensitive comparison; a blank filter accepts anything.
fn matches_field(filter: Option<&str>, value: Option<&str>) -> bool {
    match non_blank(filter) {
        None => true,
        Some(filter) => value.is_some_and(|v| v.trim().eq_ignore_ascii_case(filter)),
    }
}

/// Matches accepted by `query`, in its sort order. Sorting is stable.
pub fn search<'a>(matches: &'a [Match], query: &CatalogQuery) -> Vec<&'a Match> {
    let filtered = matches.iter().filter(|m| query.accepts(m));
    match query.sort {
        MatchSort::Newest => filtered
            .sorted_by(|a, b| {
                // Undated matches sink to the bottom either way.
                b.kickoff().cmp(&a.kickoff())
            })
            .collect(),
        MatchSort::Oldest => filtered
            .sorted_by_key(|m| (m.kickoff().is_none(), m.kickoff()))
            .collect(),
        MatchSort::Rating => filtered
            .sorted_by(|a, b| {
                let a = EngagementCounters::of(a).rating_average;
                let b = EngagementCounters::of(b).rating_average;
                b.total_cmp(&a)
            })
            .collect(),
        MatchSort::Popularity => filtered
            .sorted_by(|a, b| {
                EngagementCounters::of(b)
                    .views
                    .cmp(&EngagementCounters::of(a).views)
            })
            .collect(),
    }
}

pub fn find(matches: &[Match], id: u32) -> Option<&Match> {
    matches.iter().find(|m| m.id == id)
}

/// Look up `ids` in order, skipping ids that no longer resolve.
pub fn resolve<'a>(matches: &'a [Match], ids: &[u32]) -> Vec<&'a Match> {
    ids.iter().filter_map(|id| find(matches, *id)).collect()
}

/// Distinct competition names, in catalog order.
pub fn competitions(matches: &[Match]) -> Vec<&str> {
    matches
        .iter()
        .map(|m| m.competition.name.as_str())
        .unique()
        .collect()
}
