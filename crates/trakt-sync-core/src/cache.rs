//! Reconciliation cache between the tracking service and the local store.
//!
//! Every category accessor runs the same freshness protocol under one lock:
//! fetch the online last-activity watermark, load the persisted one, and
//! compare the sub-timestamp that governs the category. Equal strings mean
//! the persisted payload is trusted; anything else triggers a refetch that
//! rewrites the payload first and the watermark second.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use trakt_sync_models::{
    Category, Episode, EpisodeCollected, EpisodeWatched, LastActivities, Movie, CollectedMovie,
    WatchedMovie,
};
use trakt_sync_sources::{SourceError, TrackingClient};

use crate::diff;
use crate::error::{CacheError, StoreError};
use crate::records;
use crate::store::PersistentStore;

pub const ACTIVITIES_FILE: &str = "last.sync.activities.json";
pub const WATCHED_MOVIES_FILE: &str = "watched.movies.json";
pub const COLLECTED_MOVIES_FILE: &str = "collected.movies.json";
pub const WATCHED_EPISODES_FILE: &str = "watched.episodes.json";
pub const COLLECTED_EPISODES_FILE: &str = "collected.episodes.json";

/// Payload file holding the records of `category`.
pub fn payload_file(category: Category) -> &'static str {
    match category {
        Category::WatchedMovies => WATCHED_MOVIES_FILE,
        Category::CollectedMovies => COLLECTED_MOVIES_FILE,
        Category::WatchedEpisodes => WATCHED_EPISODES_FILE,
        Category::CollectedEpisodes => COLLECTED_EPISODES_FILE,
    }
}

/// Persisted state of one category, as reported by `TraktCache::snapshot`.
#[derive(Debug, Clone, Serialize)]
pub struct CategorySnapshot {
    pub category: String,
    pub file: &'static str,
    pub present: bool,
    pub records: usize,
    pub watermark: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheSnapshot {
    pub activities: LastActivities,
    pub categories: Vec<CategorySnapshot>,
}

pub struct TraktCache {
    client: Arc<dyn TrackingClient>,
    store: Arc<dyn PersistentStore>,
    // Held across read-compare-fetch-write so concurrent accessors cannot
    // clobber each other's watermark sub-fields.
    lock: Mutex<()>,
}

impl TraktCache {
    pub fn new(client: Arc<dyn TrackingClient>, store: Arc<dyn PersistentStore>) -> Self {
        Self {
            client,
            store,
            lock: Mutex::new(()),
        }
    }

    pub fn client(&self) -> &Arc<dyn TrackingClient> {
        &self.client
    }

    pub async fn get_watched_movies(&self) -> Result<Vec<WatchedMovie>, CacheError> {
        let fetch = async {
            self.client
                .get_watched_movies()
                .await
                .map(records::watched_movies)
        };
        self.read_through(Category::WatchedMovies, fetch).await
    }

    pub async fn get_collected_movies(&self) -> Result<Vec<CollectedMovie>, CacheError> {
        let fetch = async {
            self.client
                .get_collected_movies()
                .await
                .map(records::collected_movies)
        };
        self.read_through(Category::CollectedMovies, fetch).await
    }

    pub async fn get_watched_episodes(&self) -> Result<Vec<EpisodeWatched>, CacheError> {
        let fetch = async {
            self.client
                .get_watched_shows()
                .await
                .map(records::watched_episodes)
        };
        self.read_through(Category::WatchedEpisodes, fetch).await
    }

    pub async fn get_collected_episodes(&self) -> Result<Vec<EpisodeCollected>, CacheError> {
        let fetch = async {
            self.client
                .get_collected_shows()
                .await
                .map(records::collected_episodes)
        };
        self.read_through(Category::CollectedEpisodes, fetch).await
    }

    /// Movies that were watched at the last refresh but are not watched now.
    ///
    /// The baseline is the persisted watched payload as-is, even when stale.
    /// The current set is fetched live and is not persisted.
    pub async fn get_unwatched_movies(&self) -> Result<Vec<Movie>, CacheError> {
        let _guard = self.lock.lock().await;

        // A baseline with no watermark vouching for it is not trusted.
        self.load_saved_activities()?;
        let baseline: Vec<WatchedMovie> = self.load_records(WATCHED_MOVIES_FILE)?;
        if baseline.is_empty() {
            debug!(category = "unwatched_movies", "No watched baseline, nothing to diff");
            return Ok(Vec::new());
        }

        let current = records::watched_movies(self.client.get_watched_movies().await?);
        let unwatched = diff::unwatched_movies(&baseline, &current);
        info!(
            category = "unwatched_movies",
            baseline = baseline.len(),
            current = current.len(),
            count = unwatched.len(),
            "Computed unwatched movies"
        );
        Ok(unwatched)
    }

    /// Episodes that were watched at the last refresh but are not watched now.
    pub async fn get_unwatched_episodes(&self) -> Result<Vec<Episode>, CacheError> {
        let _guard = self.lock.lock().await;

        self.load_saved_activities()?;
        let baseline: Vec<EpisodeWatched> = self.load_records(WATCHED_EPISODES_FILE)?;
        if baseline.is_empty() {
            debug!(category = "unwatched_episodes", "No watched baseline, nothing to diff");
            return Ok(Vec::new());
        }

        let current = records::watched_episodes(self.client.get_watched_shows().await?);
        let unwatched = diff::unwatched_episodes(&baseline, &current);
        info!(
            category = "unwatched_episodes",
            baseline = baseline.len(),
            current = current.len(),
            count = unwatched.len(),
            "Computed unwatched episodes"
        );
        Ok(unwatched)
    }

    /// Persisted watermark and record counts. Makes no remote calls.
    pub async fn snapshot(&self) -> Result<CacheSnapshot, CacheError> {
        let _guard = self.lock.lock().await;

        let activities = self.load_saved_activities()?;
        let mut categories = Vec::with_capacity(Category::ALL.len());
        for category in Category::ALL {
            let file = payload_file(category);
            let present = self.store.exists(file);
            let records = if present {
                self.load_records::<serde_json::Value>(file)?.len()
            } else {
                0
            };
            categories.push(CategorySnapshot {
                category: category.to_string(),
                file,
                present,
                records,
                watermark: activities.watermark(category).map(str::to_string),
            });
        }

        Ok(CacheSnapshot {
            activities,
            categories,
        })
    }

    /// Remove every persisted cache file.
    ///
    /// The watermark goes first so an interrupted clear can never leave a
    /// watermark that vouches for a deleted payload.
    pub async fn clear(&self) -> Result<usize, CacheError> {
        let _guard = self.lock.lock().await;

        let mut removed = 0;
        let files = std::iter::once(ACTIVITIES_FILE).chain(Category::ALL.map(payload_file));
        for file in files {
            if self.store.exists(file) {
                self.store.remove(file)?;
                debug!(file, "Removed cache file");
                removed += 1;
            }
        }
        info!(removed, "Cleared sync cache");
        Ok(removed)
    }

    async fn read_through<T, Fut>(&self, category: Category, fetch: Fut) -> Result<Vec<T>, CacheError>
    where
        T: Serialize + DeserializeOwned,
        Fut: Future<Output = Result<Vec<T>, SourceError>>,
    {
        let _guard = self.lock.lock().await;

        let online = self.client.get_last_activities().await?;
        let saved = self.load_saved_activities()?;
        let file = payload_file(category);

        let online_mark = online.watermark(category);
        let saved_mark = saved.watermark(category);

        if online_mark == saved_mark {
            let records: Vec<T> = self.load_records(file)?;
            debug!(
                category = %category,
                watermark = ?online_mark,
                count = records.len(),
                "Cache hit"
            );
            return Ok(records);
        }

        info!(
            category = %category,
            saved = ?saved_mark,
            online = ?online_mark,
            "Cache stale, refreshing from {}",
            self.client.source_name()
        );

        let records = fetch.await?;
        self.save_records(file, &records)?;

        let mut merged = saved;
        merged.set_watermark(category, online_mark.map(str::to_string));
        if online.all.is_some() {
            merged.all = online.all.clone();
        }
        self.save_activities(&merged)?;

        info!(category = %category, count = records.len(), "Cache refreshed");
        Ok(records)
    }

    fn load_saved_activities(&self) -> Result<LastActivities, CacheError> {
        if !self.store.exists(ACTIVITIES_FILE) {
            let orphan = Category::ALL
                .into_iter()
                .map(payload_file)
                .find(|file| self.store.exists(file));
            return match orphan {
                Some(file) => Err(CacheError::Corrupted {
                    file: ACTIVITIES_FILE.to_string(),
                    reason: format!("missing while payload {} exists", file),
                }),
                None => {
                    debug!("No saved activities, starting from an empty watermark");
                    Ok(LastActivities::default())
                }
            };
        }

        let text = self
            .store
            .read_text(ACTIVITIES_FILE)
            .map_err(|e| CacheError::Corrupted {
                file: ACTIVITIES_FILE.to_string(),
                reason: e.to_string(),
            })?;
        serde_json::from_str(&text).map_err(|e| CacheError::Corrupted {
            file: ACTIVITIES_FILE.to_string(),
            reason: e.to_string(),
        })
    }

    fn save_activities(&self, activities: &LastActivities) -> Result<(), CacheError> {
        let text = serde_json::to_string_pretty(activities).map_err(|source| {
            CacheError::Serialization {
                file: ACTIVITIES_FILE.to_string(),
                source,
            }
        })?;
        self.store.write_text(ACTIVITIES_FILE, &text)?;
        Ok(())
    }

    /// An absent payload is an empty sequence. A present but unreadable one
    /// is corruption.
    fn load_records<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>, CacheError> {
        let text = match self.store.read_text(file) {
            Ok(text) => text,
            Err(StoreError::NotFound(_)) => return Ok(Vec::new()),
            Err(e) => {
                warn!(file, error = %e, "Cache payload unreadable");
                return Err(CacheError::Corrupted {
                    file: file.to_string(),
                    reason: e.to_string(),
                });
            }
        };
        serde_json::from_str(&text).map_err(|e| CacheError::Corrupted {
            file: file.to_string(),
            reason: e.to_string(),
        })
    }

    fn save_records<T: Serialize>(&self, file: &str, records: &[T]) -> Result<(), CacheError> {
        let text = serde_json::to_string_pretty(records).map_err(|source| {
            CacheError::Serialization {
                file: file.to_string(),
                source,
            }
        })?;
        self.store.write_text(file, &text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use async_trait::async_trait;
    use trakt_sync_sources::trakt::api::{
        SyncItems, SyncResponse, TraktCollectedMovie, TraktCollectedShow, TraktIds, TraktMovie,
        TraktWatchedMovie, TraktWatchedShow,
    };

    struct FixedClient {
        activities: LastActivities,
        watched: Vec<TraktWatchedMovie>,
    }

    #[async_trait]
    impl TrackingClient for FixedClient {
        async fn get_last_activities(&self) -> Result<LastActivities, SourceError> {
            Ok(self.activities.clone())
        }
        async fn get_watched_movies(&self) -> Result<Vec<TraktWatchedMovie>, SourceError> {
            Ok(self.watched.clone())
        }
        async fn get_collected_movies(&self) -> Result<Vec<TraktCollectedMovie>, SourceError> {
            Ok(Vec::new())
        }
        async fn get_watched_shows(&self) -> Result<Vec<TraktWatchedShow>, SourceError> {
            Ok(Vec::new())
        }
        async fn get_collected_shows(&self) -> Result<Vec<TraktCollectedShow>, SourceError> {
            Ok(Vec::new())
        }
        async fn add_watched_history_items(&self, _: &SyncItems) -> Result<SyncResponse, SourceError> {
            Ok(SyncResponse::default())
        }
        async fn add_collection_items(&self, _: &SyncItems) -> Result<SyncResponse, SourceError> {
            Ok(SyncResponse::default())
        }
    }

    fn activities(watched: &str, collected: &str) -> LastActivities {
        let mut activities = LastActivities::default();
        activities.set_watermark(Category::WatchedMovies, Some(watched.to_string()));
        activities.set_watermark(Category::CollectedMovies, Some(collected.to_string()));
        activities
    }

    fn cache(store: Arc<InMemoryStore>) -> TraktCache {
        let client = FixedClient {
            activities: activities("2024-03-01T10:00:00.000Z", "2024-02-01T10:00:00.000Z"),
            watched: vec![TraktWatchedMovie {
                plays: 1,
                last_watched_at: None,
                movie: TraktMovie {
                    title: "Heat".to_string(),
                    year: Some(1995),
                    ids: TraktIds {
                        trakt: Some(1),
                        imdb: Some("tt0113277".to_string()),
                        ..TraktIds::default()
                    },
                },
            }],
        };
        TraktCache::new(Arc::new(client), store)
    }

    #[tokio::test]
    async fn test_refresh_updates_only_own_watermark() {
        let store = Arc::new(InMemoryStore::new());
        let cache = cache(store.clone());

        let movies = cache.get_watched_movies().await.unwrap();
        assert_eq!(movies.len(), 1);

        let saved: LastActivities =
            serde_json::from_str(&store.read_text(ACTIVITIES_FILE).unwrap()).unwrap();
        assert_eq!(
            saved.watermark(Category::WatchedMovies),
            Some("2024-03-01T10:00:00.000Z")
        );
        assert_eq!(saved.watermark(Category::CollectedMovies), None);
    }

    #[tokio::test]
    async fn test_missing_watermark_with_payload_is_corruption() {
        let store = Arc::new(InMemoryStore::new());
        store.write_text(WATCHED_MOVIES_FILE, "[]").unwrap();
        let cache = cache(store);

        let err = cache.get_collected_movies().await.unwrap_err();
        assert!(matches!(err, CacheError::Corrupted { ref file, .. } if file == ACTIVITIES_FILE));
    }

    #[tokio::test]
    async fn test_unparseable_watermark_is_corruption() {
        let store = Arc::new(InMemoryStore::new());
        store.write_text(ACTIVITIES_FILE, "{not json").unwrap();
        let cache = cache(store);

        assert!(matches!(
            cache.get_watched_movies().await,
            Err(CacheError::Corrupted { .. })
        ));
    }

    #[tokio::test]
    async fn test_snapshot_and_clear() {
        let store = Arc::new(InMemoryStore::new());
        let cache = cache(store.clone());
        cache.get_watched_movies().await.unwrap();

        let snapshot = cache.snapshot().await.unwrap();
        let watched = &snapshot.categories[0];
        assert_eq!(watched.file, WATCHED_MOVIES_FILE);
        assert!(watched.present);
        assert_eq!(watched.records, 1);
        assert!(!snapshot.categories[1].present);

        assert_eq!(cache.clear().await.unwrap(), 2);
        assert!(!store.exists(ACTIVITIES_FILE));
        assert!(!store.exists(WATCHED_MOVIES_FILE));
    }
}
