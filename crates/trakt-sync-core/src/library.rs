//! The local media library the orchestrator reconciles against.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::{debug, info};
use trakt_sync_models::{LocalEpisode, LocalMovie};

use crate::error::LibraryError;

/// Query and mutation surface of a host media library.
///
/// Mutators return `Ok(false)` when the host declined the change, for
/// instance because the item no longer exists.
#[async_trait]
pub trait MediaLibrary: Send + Sync {
    async fn movies(&self) -> Result<Vec<LocalMovie>, LibraryError>;

    async fn episodes(&self) -> Result<Vec<LocalEpisode>, LibraryError>;

    async fn mark_watched(
        &self,
        item_id: &str,
        plays: u32,
        last_played: Option<DateTime<Utc>>,
    ) -> Result<bool, LibraryError>;

    async fn mark_unwatched(&self, item_id: &str) -> Result<bool, LibraryError>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LibrarySnapshot {
    #[serde(default)]
    pub movies: Vec<LocalMovie>,
    #[serde(default)]
    pub episodes: Vec<LocalEpisode>,
}

impl LibrarySnapshot {
    fn play_state(&mut self, item_id: &str) -> Option<(&mut u32, &mut Option<DateTime<Utc>>)> {
        if let Some(movie) = self.movies.iter_mut().find(|m| m.id == item_id) {
            return Some((&mut movie.play_count, &mut movie.last_played));
        }
        self.episodes
            .iter_mut()
            .find(|e| e.id == item_id)
            .map(|e| (&mut e.play_count, &mut e.last_played))
    }
}

/// A library kept in a JSON snapshot file; every mutation is saved back.
pub struct JsonLibrary {
    path: PathBuf,
    snapshot: Mutex<LibrarySnapshot>,
}

impl JsonLibrary {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LibraryError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)?;
        let snapshot: LibrarySnapshot = serde_json::from_str(&content)?;
        info!(
            "Loaded library {}: {} movies, {} episodes",
            path.display(),
            snapshot.movies.len(),
            snapshot.episodes.len()
        );
        Ok(Self {
            path,
            snapshot: Mutex::new(snapshot),
        })
    }

    fn save(&self, snapshot: &LibrarySnapshot) -> Result<(), LibraryError> {
        let content = serde_json::to_string_pretty(snapshot)?;
        let temp_path = self.path.with_extension("json.tmp");
        std::fs::write(&temp_path, content)?;
        std::fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

#[async_trait]
impl MediaLibrary for JsonLibrary {
    async fn movies(&self) -> Result<Vec<LocalMovie>, LibraryError> {
        Ok(self.snapshot.lock().await.movies.clone())
    }

    async fn episodes(&self) -> Result<Vec<LocalEpisode>, LibraryError> {
        Ok(self.snapshot.lock().await.episodes.clone())
    }

    async fn mark_watched(
        &self,
        item_id: &str,
        plays: u32,
        last_played: Option<DateTime<Utc>>,
    ) -> Result<bool, LibraryError> {
        let mut snapshot = self.snapshot.lock().await;
        let Some((play_count, played_at)) = snapshot.play_state(item_id) else {
            debug!("mark_watched: item {} not in library", item_id);
            return Ok(false);
        };
        *play_count = plays.max(1);
        if last_played.is_some() {
            *played_at = last_played;
        }
        self.save(&snapshot)?;
        Ok(true)
    }

    async fn mark_unwatched(&self, item_id: &str) -> Result<bool, LibraryError> {
        let mut snapshot = self.snapshot.lock().await;
        let Some((play_count, played_at)) = snapshot.play_state(item_id) else {
            debug!("mark_unwatched: item {} not in library", item_id);
            return Ok(false);
        };
        *play_count = 0;
        *played_at = None;
        self.save(&snapshot)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use trakt_sync_models::MediaInfo;

    fn movie(id: &str, play_count: u32) -> LocalMovie {
        LocalMovie {
            id: id.to_string(),
            title: "Arrival".to_string(),
            year: Some(2016),
            imdb_id: Some("tt2543164".to_string()),
            tmdb_id: Some(329865),
            play_count,
            last_played: None,
            date_added: None,
            media: MediaInfo::default(),
        }
    }

    fn write_library(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("library.json");
        let snapshot = LibrarySnapshot {
            movies: vec![movie("m1", 0), movie("m2", 3)],
            episodes: Vec::new(),
        };
        std::fs::write(&path, serde_json::to_string(&snapshot).unwrap()).unwrap();
        path
    }

    #[tokio::test]
    async fn test_mark_watched_persists() {
        let dir = TempDir::new().unwrap();
        let path = write_library(&dir);
        let library = JsonLibrary::open(&path).unwrap();

        let played = "2024-05-01T20:00:00Z".parse().unwrap();
        assert!(library.mark_watched("m1", 2, Some(played)).await.unwrap());
        assert!(!library.mark_watched("missing", 1, None).await.unwrap());

        let reopened = JsonLibrary::open(&path).unwrap();
        let movies = reopened.movies().await.unwrap();
        assert_eq!(movies[0].play_count, 2);
        assert_eq!(movies[0].last_played, Some(played));
    }

    #[tokio::test]
    async fn test_mark_unwatched_clears_play_state() {
        let dir = TempDir::new().unwrap();
        let path = write_library(&dir);
        let library = JsonLibrary::open(&path).unwrap();

        assert!(library.mark_unwatched("m2").await.unwrap());
        let movies = library.movies().await.unwrap();
        assert_eq!(movies[1].play_count, 0);
        assert!(!movies[1].is_watched());
    }

    #[test]
    fn test_open_rejects_invalid_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("library.json");
        std::fs::write(&path, "[").unwrap();
        assert!(matches!(JsonLibrary::open(&path), Err(LibraryError::Parse(_))));
    }
}
