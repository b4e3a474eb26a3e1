use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::{Competition, Stadium};
use super::engagement::Engagement;

const DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Full record of a single football match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: u32,
    pub home_team: MatchTeam,
    pub away_team: MatchTeam,
    pub score: Score,
    /// ISO-8601 kickoff date, with or without a time component.
    pub date: String,
    pub competition: Competition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    pub stadium: Stadium,
    #[serde(default)]
    pub poster: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlights: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engagement: Option<Engagement>,
}

impl Match {
    /// "Home vs Away".
    pub fn title(&self) -> String {
        format!("{} vs {}", self.home_team.name, self.away_team.name)
    }

    /// Parse the stored date. Accepts RFC 3339, a naive date-time, or a bare
    /// date (midnight UTC). Returns `None` for anything else.
    pub fn kickoff(&self) -> Option<DateTime<Utc>> {
        parse_match_date(&self.date)
    }

    /// Engagement block, created empty on first use.
    pub fn engagement_mut(&mut self) -> &mut Engagement {
        self.engagement.get_or_insert_with(Engagement::default)
    }
}

/// Parse a match date the way [`Match::kickoff`] does.
pub fn parse_match_date(date: &str) -> Option<DateTime<Utc>> {
    let date = date.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(date) {
        return Some(parsed.with_timezone(&Utc));
    }
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(date, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(date, DATE_FORMAT)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

/// A team as it appears on a match card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchTeam {
    pub name: String,
    #[serde(default)]
    pub logo: String,
    #[serde(default)]
    pub country: String,
}

/// Final score, with extra time and shootout details when they happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    pub home: u32,
    pub away: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_time: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub penalties: Option<PenaltyScore>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PenaltyScore {
    pub home: u32,
    pub away: u32,
}

/// Which side won a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Outcome {
    Home,
    Away,
    Draw,
}

impl Score {
    /// The winner, with a shootout deciding a level score.
    pub fn winner(&self) -> Outcome {
        let (home, away) = match self.penalties {
            Some(p) if self.home == self.away => (p.home, p.away),
            _ => (self.home, self.away),
        };
        match home.cmp(&away) {
            std::cmp::Ordering::Greater => Outcome::Home,
            std::cmp::Ordering::Less => Outcome::Away,
            std::cmp::Ordering::Equal => Outcome::Draw,
        }
    }

    pub fn went_to_extra_time(&self) -> bool {
        self.extra_time.unwrap_or(false) || self.penalties.is_some()
    }
}
