//! Shared mocks for the trakt-sync-core integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use trakt_sync_core::{LibraryError, MediaLibrary};
use trakt_sync_models::{Category, LastActivities, LocalEpisode, LocalMovie, MediaInfo};
use trakt_sync_sources::trakt::api::{
    SyncCounts, SyncItems, SyncResponse, TraktCollectedEpisode, TraktCollectedMovie,
    TraktCollectedSeason, TraktCollectedShow, TraktIds, TraktMovie, TraktShow,
    TraktWatchedEpisode, TraktWatchedMovie, TraktWatchedSeason, TraktWatchedShow,
};
use trakt_sync_sources::{SourceError, TrackingClient};

// ============================================================================
// Mock tracking service
// ============================================================================

#[derive(Default)]
pub struct MockTrakt {
    pub activities: Mutex<LastActivities>,
    pub watched_movies: Mutex<Vec<TraktWatchedMovie>>,
    pub collected_movies: Mutex<Vec<TraktCollectedMovie>>,
    pub watched_shows: Mutex<Vec<TraktWatchedShow>>,
    pub collected_shows: Mutex<Vec<TraktCollectedShow>>,
    /// Overrides the `added` counts echoed back for pushes.
    pub added_override: Mutex<Option<SyncCounts>>,
    pub fail_fetches: Mutex<bool>,

    pub history_pushes: Mutex<Vec<SyncItems>>,
    pub collection_pushes: Mutex<Vec<SyncItems>>,

    pub activity_calls: AtomicUsize,
    pub watched_movie_calls: AtomicUsize,
    pub collected_movie_calls: AtomicUsize,
    pub watched_show_calls: AtomicUsize,
    pub collected_show_calls: AtomicUsize,
}

impl MockTrakt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_watermark(&self, category: Category, value: &str) {
        self.activities
            .lock()
            .unwrap()
            .set_watermark(category, Some(value.to_string()));
    }

    pub fn set_all_watermarks(&self, value: &str) {
        for category in Category::ALL {
            self.set_watermark(category, value);
        }
    }

    pub fn fetch_count(&self, category: Category) -> usize {
        let counter = match category {
            Category::WatchedMovies => &self.watched_movie_calls,
            Category::CollectedMovies => &self.collected_movie_calls,
            Category::WatchedEpisodes => &self.watched_show_calls,
            Category::CollectedEpisodes => &self.collected_show_calls,
        };
        counter.load(Ordering::SeqCst)
    }

    fn check_failure(&self, operation: &str) -> Result<(), SourceError> {
        if *self.fail_fetches.lock().unwrap() {
            return Err(SourceError::Api {
                operation: operation.to_string(),
                status: 503,
                body: "service unavailable".to_string(),
            });
        }
        Ok(())
    }

    fn respond(&self, items: &SyncItems) -> SyncResponse {
        let added = self.added_override.lock().unwrap().unwrap_or(SyncCounts {
            movies: items.movies.len() as u32,
            episodes: items.episode_count() as u32,
        });
        SyncResponse {
            added,
            ..SyncResponse::default()
        }
    }
}

#[async_trait]
impl TrackingClient for MockTrakt {
    async fn get_last_activities(&self) -> Result<LastActivities, SourceError> {
        self.activity_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.activities.lock().unwrap().clone())
    }

    async fn get_watched_movies(&self) -> Result<Vec<TraktWatchedMovie>, SourceError> {
        self.watched_movie_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure("get_watched_movies")?;
        Ok(self.watched_movies.lock().unwrap().clone())
    }

    async fn get_collected_movies(&self) -> Result<Vec<TraktCollectedMovie>, SourceError> {
        self.collected_movie_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure("get_collected_movies")?;
        Ok(self.collected_movies.lock().unwrap().clone())
    }

    async fn get_watched_shows(&self) -> Result<Vec<TraktWatchedShow>, SourceError> {
        self.watched_show_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure("get_watched_shows")?;
        Ok(self.watched_shows.lock().unwrap().clone())
    }

    async fn get_collected_shows(&self) -> Result<Vec<TraktCollectedShow>, SourceError> {
        self.collected_show_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure("get_collected_shows")?;
        Ok(self.collected_shows.lock().unwrap().clone())
    }

    async fn add_watched_history_items(&self, items: &SyncItems) -> Result<SyncResponse, SourceError> {
        self.history_pushes.lock().unwrap().push(items.clone());
        Ok(self.respond(items))
    }

    async fn add_collection_items(&self, items: &SyncItems) -> Result<SyncResponse, SourceError> {
        self.collection_pushes.lock().unwrap().push(items.clone());
        Ok(self.respond(items))
    }
}

// ============================================================================
// Mock host library
// ============================================================================

#[derive(Default)]
pub struct MockLibrary {
    pub movies: Mutex<Vec<LocalMovie>>,
    pub episodes: Mutex<Vec<LocalEpisode>>,
    pub marked_watched: Mutex<Vec<String>>,
    pub marked_unwatched: Mutex<Vec<String>>,
}

impl MockLibrary {
    pub fn with_movies(movies: Vec<LocalMovie>) -> Self {
        Self {
            movies: Mutex::new(movies),
            ..Self::default()
        }
    }

    pub fn with_episodes(episodes: Vec<LocalEpisode>) -> Self {
        Self {
            episodes: Mutex::new(episodes),
            ..Self::default()
        }
    }
}

#[async_trait]
impl MediaLibrary for MockLibrary {
    async fn movies(&self) -> Result<Vec<LocalMovie>, LibraryError> {
        Ok(self.movies.lock().unwrap().clone())
    }

    async fn episodes(&self) -> Result<Vec<LocalEpisode>, LibraryError> {
        Ok(self.episodes.lock().unwrap().clone())
    }

    async fn mark_watched(
        &self,
        item_id: &str,
        plays: u32,
        last_played: Option<DateTime<Utc>>,
    ) -> Result<bool, LibraryError> {
        self.marked_watched.lock().unwrap().push(item_id.to_string());
        for movie in self.movies.lock().unwrap().iter_mut().filter(|m| m.id == item_id) {
            movie.play_count = plays;
            movie.last_played = last_played;
        }
        for episode in self.episodes.lock().unwrap().iter_mut().filter(|e| e.id == item_id) {
            episode.play_count = plays;
            episode.last_played = last_played;
        }
        Ok(true)
    }

    async fn mark_unwatched(&self, item_id: &str) -> Result<bool, LibraryError> {
        self.marked_unwatched.lock().unwrap().push(item_id.to_string());
        for movie in self.movies.lock().unwrap().iter_mut().filter(|m| m.id == item_id) {
            movie.play_count = 0;
        }
        for episode in self.episodes.lock().unwrap().iter_mut().filter(|e| e.id == item_id) {
            episode.play_count = 0;
        }
        Ok(true)
    }
}

// ============================================================================
// Fixtures
// ============================================================================

pub fn trakt_movie(trakt: u64, imdb: Option<&str>, title: &str, year: u32) -> TraktMovie {
    TraktMovie {
        title: title.to_string(),
        year: Some(year),
        ids: TraktIds {
            trakt: Some(trakt),
            imdb: imdb.map(str::to_string),
            ..TraktIds::default()
        },
    }
}

pub fn watched_movie(trakt: u64, imdb: Option<&str>, title: &str, year: u32) -> TraktWatchedMovie {
    TraktWatchedMovie {
        plays: 1,
        last_watched_at: Some("2024-01-15T21:00:00Z".parse().unwrap()),
        movie: trakt_movie(trakt, imdb, title, year),
    }
}

pub fn collected_movie(trakt: u64, imdb: Option<&str>, title: &str, year: u32) -> TraktCollectedMovie {
    TraktCollectedMovie {
        collected_at: Some("2023-11-02T08:30:00Z".parse().unwrap()),
        movie: trakt_movie(trakt, imdb, title, year),
    }
}

pub fn watched_show(tvdb: u32, title: &str, seasons: Vec<(u32, Vec<u32>)>) -> TraktWatchedShow {
    TraktWatchedShow {
        plays: 1,
        last_watched_at: None,
        show: TraktShow {
            title: title.to_string(),
            year: None,
            ids: TraktIds {
                tvdb: Some(tvdb),
                ..TraktIds::default()
            },
        },
        seasons: seasons
            .into_iter()
            .map(|(number, episodes)| TraktWatchedSeason {
                number,
                episodes: episodes
                    .into_iter()
                    .map(|number| TraktWatchedEpisode {
                        number,
                        plays: 1,
                        last_watched_at: Some("2024-02-01T20:00:00Z".parse().unwrap()),
                    })
                    .collect(),
            })
            .collect(),
    }
}

pub fn collected_show(tvdb: u32, title: &str, seasons: Vec<(u32, Vec<u32>)>) -> TraktCollectedShow {
    TraktCollectedShow {
        last_collected_at: Some("2023-12-24T10:00:00Z".parse().unwrap()),
        show: TraktShow {
            title: title.to_string(),
            year: None,
            ids: TraktIds {
                tvdb: Some(tvdb),
                ..TraktIds::default()
            },
        },
        seasons: seasons
            .into_iter()
            .map(|(number, episodes)| TraktCollectedSeason {
                number,
                episodes: episodes
                    .into_iter()
                    .map(|number| TraktCollectedEpisode {
                        number,
                        collected_at: Some("2023-12-24T10:00:00Z".parse().unwrap()),
                    })
                    .collect(),
            })
            .collect(),
    }
}

pub fn local_movie(id: &str, imdb: Option<&str>, title: &str, year: u32, play_count: u32) -> LocalMovie {
    LocalMovie {
        id: id.to_string(),
        title: title.to_string(),
        year: Some(year),
        imdb_id: imdb.map(str::to_string),
        tmdb_id: None,
        play_count,
        last_played: None,
        date_added: None,
        media: MediaInfo::default(),
    }
}

pub fn local_episode(id: &str, tvdb: Option<u32>, season: u32, number: u32, play_count: u32) -> LocalEpisode {
    LocalEpisode {
        id: id.to_string(),
        show_title: "The Expanse".to_string(),
        show_year: Some(2015),
        tvdb_id: tvdb,
        season,
        number,
        play_count,
        last_played: None,
        date_added: None,
        media: MediaInfo::default(),
    }
}
