use serde::{Deserialize, Serialize};

/// Identifiers of a movie on the tracking service and on external databases.
///
/// At least one of `imdb` or `tmdb` is expected to be populated, but neither
/// is guaranteed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct MovieIds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trakt: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imdb: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmdb: Option<u32>,
}

impl MovieIds {
    /// IMDb id with Trakt's occasional slashes stripped, `None` when blank.
    pub fn imdb(&self) -> Option<&str> {
        self.imdb
            .as_deref()
            .map(|id| id.trim().trim_matches('/'))
            .filter(|id| !id.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.trakt.is_none() && self.slug.is_none() && self.imdb().is_none() && self.tmdb.is_none()
    }
}

/// Identifiers of a show. Episodes are matched on `tvdb`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ShowIds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trakt: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tvdb: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imdb: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmdb: Option<u32>,
}
