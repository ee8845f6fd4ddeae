use serde::{Deserialize, Serialize};
use std::fmt;

/// Last-activity timestamps reported by the tracking service.
///
/// Timestamps are kept as the opaque strings the service returns. Staleness
/// is decided by textual equality, so two spellings of the same instant count
/// as a change.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LastActivities {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all: Option<String>,
    #[serde(default)]
    pub movies: ActivityWatermark,
    #[serde(default)]
    pub episodes: ActivityWatermark,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActivityWatermark {
    #[serde(default)]
    pub watched_at: Option<String>,
    #[serde(default)]
    pub collected_at: Option<String>,
}

/// The four cached categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    WatchedMovies,
    CollectedMovies,
    WatchedEpisodes,
    CollectedEpisodes,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::WatchedMovies,
        Category::CollectedMovies,
        Category::WatchedEpisodes,
        Category::CollectedEpisodes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::WatchedMovies => "watched_movies",
            Category::CollectedMovies => "collected_movies",
            Category::WatchedEpisodes => "watched_episodes",
            Category::CollectedEpisodes => "collected_episodes",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl LastActivities {
    /// The sub-timestamp that governs `category`.
    pub fn watermark(&self, category: Category) -> Option<&str> {
        match category {
            Category::WatchedMovies => self.movies.watched_at.as_deref(),
            Category::CollectedMovies => self.movies.collected_at.as_deref(),
            Category::WatchedEpisodes => self.episodes.watched_at.as_deref(),
            Category::CollectedEpisodes => self.episodes.collected_at.as_deref(),
        }
    }

    /// Replace only the sub-timestamp of `category`, leaving its siblings alone.
    pub fn set_watermark(&mut self, category: Category, value: Option<String>) {
        let slot = match category {
            Category::WatchedMovies => &mut self.movies.watched_at,
            Category::CollectedMovies => &mut self.movies.collected_at,
            Category::WatchedEpisodes => &mut self.episodes.watched_at,
            Category::CollectedEpisodes => &mut self.episodes.collected_at,
        };
        *slot = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_service_payload_ignoring_unknown_fields() {
        let json = r#"{
            "all": "2014-11-20T07:01:32.000Z",
            "movies": {
                "watched_at": "2014-11-19T21:42:41.000Z",
                "collected_at": "2014-11-20T06:51:30.000Z",
                "rated_at": "2014-11-19T18:32:29.000Z"
            },
            "episodes": {
                "watched_at": "2014-11-20T06:51:30.000Z",
                "collected_at": "2014-11-19T22:02:41.000Z"
            },
            "shows": { "rated_at": "2014-11-19T19:50:58.000Z" }
        }"#;

        let activities: LastActivities = serde_json::from_str(json).unwrap();
        assert_eq!(activities.watermark(Category::WatchedMovies), Some("2014-11-19T21:42:41.000Z"));
        assert_eq!(activities.watermark(Category::CollectedEpisodes), Some("2014-11-19T22:02:41.000Z"));
    }

    #[test]
    fn test_set_watermark_touches_one_field() {
        let mut activities = LastActivities::default();
        activities.set_watermark(Category::CollectedMovies, Some("2020-01-01T00:00:00.000Z".to_string()));

        assert_eq!(activities.watermark(Category::CollectedMovies), Some("2020-01-01T00:00:00.000Z"));
        assert_eq!(activities.watermark(Category::WatchedMovies), None);
        assert_eq!(activities.episodes, ActivityWatermark::default());
    }

    #[test]
    fn test_saved_watermark_survives_reload() {
        let mut activities = LastActivities {
            all: Some("2024-03-01T10:00:00.000Z".to_string()),
            ..LastActivities::default()
        };
        activities.set_watermark(Category::WatchedMovies, Some("2024-03-01T09:00:00.000Z".to_string()));
        activities.set_watermark(Category::CollectedEpisodes, Some("2024-02-28T12:30:00.000Z".to_string()));

        let json = serde_json::to_string_pretty(&activities).unwrap();
        let back: LastActivities = serde_json::from_str(&json).unwrap();
        assert_eq!(back, activities);
        assert_eq!(back.watermark(Category::CollectedMovies), None);
    }

    #[test]
    fn test_comparison_is_textual() {
        let mut a = LastActivities::default();
        let mut b = LastActivities::default();
        a.set_watermark(Category::WatchedMovies, Some("2020-01-01T00:00:00Z".to_string()));
        b.set_watermark(Category::WatchedMovies, Some("2020-01-01T00:00:00.000Z".to_string()));
        assert_ne!(a.watermark(Category::WatchedMovies), b.watermark(Category::WatchedMovies));
    }
}
