use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use trakt_sync_config::{AuthorizationStore, Config};
use trakt_sync_models::LastActivities;
use crate::error::SourceError;
use crate::traits::TrackingClient;
use crate::trakt::api::{
    self, ApiContext, SyncItems, SyncResponse, TraktCollectedMovie, TraktCollectedShow,
    TraktWatchedMovie, TraktWatchedShow,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub fn create_trakt_client() -> Client {
    Client::builder()
        .user_agent(concat!("trakt-sync/", env!("CARGO_PKG_VERSION")))
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_else(|_| Client::new())
}

#[derive(Clone)]
pub struct TraktClient {
    client: Arc<Client>,
    base_url: String,
    client_id: String,
    access_token: Option<String>,
}

impl TraktClient {
    pub fn new(base_url: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            client: Arc::new(create_trakt_client()),
            base_url: base_url.into(),
            client_id: client_id.into(),
            access_token: None,
        }
    }

    pub fn with_access_token(mut self, access_token: impl Into<String>) -> Self {
        self.access_token = Some(access_token.into());
        self
    }

    /// Build a client from the settings and whatever token the pairing flow left behind.
    pub fn from_config(config: &Config, authorization: &AuthorizationStore) -> Self {
        let client = Self::new(config.trakt.api_url.clone(), config.trakt.client_id.clone());
        match authorization.access_token() {
            Some(token) => {
                info!("Using saved Trakt access token");
                client.with_access_token(token)
            }
            None => client,
        }
    }

    fn context(&self) -> Result<ApiContext<'_>, SourceError> {
        let access_token = self
            .access_token
            .as_deref()
            .ok_or(SourceError::NotAuthenticated)?;
        Ok(ApiContext {
            client: &self.client,
            base_url: &self.base_url,
            access_token,
            client_id: &self.client_id,
        })
    }
}

#[async_trait]
impl TrackingClient for TraktClient {
    async fn get_last_activities(&self) -> Result<LastActivities, SourceError> {
        api::get_last_activities(&self.context()?).await
    }

    async fn get_watched_movies(&self) -> Result<Vec<TraktWatchedMovie>, SourceError> {
        api::get_watched_movies(&self.context()?).await
    }

    async fn get_collected_movies(&self) -> Result<Vec<TraktCollectedMovie>, SourceError> {
        api::get_collected_movies(&self.context()?).await
    }

    async fn get_watched_shows(&self) -> Result<Vec<TraktWatchedShow>, SourceError> {
        api::get_watched_shows(&self.context()?).await
    }

    async fn get_collected_shows(&self) -> Result<Vec<TraktCollectedShow>, SourceError> {
        api::get_collected_shows(&self.context()?).await
    }

    async fn add_watched_history_items(&self, items: &SyncItems) -> Result<SyncResponse, SourceError> {
        api::add_to_history(&self.context()?, items).await
    }

    async fn add_collection_items(&self, items: &SyncItems) -> Result<SyncResponse, SourceError> {
        api::add_to_collection(&self.context()?, items).await
    }
}
