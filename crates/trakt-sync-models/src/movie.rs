use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::ids::MovieIds;

/// Identity of a movie, as reported back by the unwatched diff.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub ids: MovieIds,
    pub title: String,
    pub year: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchedMovie {
    pub ids: MovieIds,
    pub title: String,
    pub year: Option<u32>,
    #[serde(default)]
    pub plays: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_watched_at: Option<DateTime<Utc>>,
}

impl WatchedMovie {
    pub fn identity(&self) -> Movie {
        Movie {
            ids: self.ids.clone(),
            title: self.title.clone(),
            year: self.year,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollectedMovie {
    pub ids: MovieIds,
    pub title: String,
    pub year: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collected_at: Option<DateTime<Utc>>,
}
