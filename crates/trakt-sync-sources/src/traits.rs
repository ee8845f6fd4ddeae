use async_trait::async_trait;
use trakt_sync_models::LastActivities;
use crate::error::SourceError;
use crate::trakt::api::{
    SyncItems, SyncResponse, TraktCollectedMovie, TraktCollectedShow, TraktWatchedMovie,
    TraktWatchedShow,
};

/// The remote tracking service as seen by the sync cache and orchestrator.
///
/// Timeouts and retries, if any, are the implementation's business.
#[async_trait]
pub trait TrackingClient: Send + Sync {
    fn source_name(&self) -> &str {
        "trakt"
    }

    async fn get_last_activities(&self) -> Result<LastActivities, SourceError>;

    async fn get_watched_movies(&self) -> Result<Vec<TraktWatchedMovie>, SourceError>;
    async fn get_collected_movies(&self) -> Result<Vec<TraktCollectedMovie>, SourceError>;

    /// Nested show → season → episode watched state
    async fn get_watched_shows(&self) -> Result<Vec<TraktWatchedShow>, SourceError>;
    async fn get_collected_shows(&self) -> Result<Vec<TraktCollectedShow>, SourceError>;

    async fn add_watched_history_items(&self, items: &SyncItems) -> Result<SyncResponse, SourceError>;
    async fn add_collection_items(&self, items: &SyncItems) -> Result<SyncResponse, SourceError>;
}
