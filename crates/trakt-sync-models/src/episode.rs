use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use crate::ids::ShowIds;

/// Normalized episode identity.
///
/// Show fields are repeated on every episode so that lookups by
/// `(tvdb, season, number)` never need a join against a show table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Episode {
    pub show_ids: ShowIds,
    pub show_title: String,
    pub show_year: Option<u32>,
    pub season: u32,
    pub number: u32,
}

impl Episode {
    /// Composite lookup key, `None` when the show has no TVDB id.
    pub fn key(&self) -> Option<EpisodeKey> {
        self.show_ids
            .tvdb
            .map(|tvdb| EpisodeKey::new(tvdb, self.season, self.number))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EpisodeWatched {
    #[serde(flatten)]
    pub episode: Episode,
    #[serde(default)]
    pub plays: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_watched_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EpisodeCollected {
    #[serde(flatten)]
    pub episode: Episode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collected_at: Option<DateTime<Utc>>,
}

/// `(show TVDB id, season, episode number)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EpisodeKey {
    pub tvdb: u32,
    pub season: u32,
    pub number: u32,
}

impl EpisodeKey {
    pub fn new(tvdb: u32, season: u32, number: u32) -> Self {
        Self { tvdb, season, number }
    }
}

impl fmt::Display for EpisodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.tvdb, self.season, self.number)
    }
}
