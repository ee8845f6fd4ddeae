use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use trakt_sync_models::{LastActivities, MovieIds, ShowIds};
use crate::error::SourceError;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TraktIds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trakt: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imdb: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmdb: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tvdb: Option<u32>,
}

impl From<&TraktIds> for MovieIds {
    fn from(ids: &TraktIds) -> Self {
        MovieIds {
            trakt: ids.trakt,
            slug: ids.slug.clone(),
            imdb: ids.imdb.as_ref().map(|s| s.replace('/', "")),
            tmdb: ids.tmdb,
        }
    }
}

impl From<&TraktIds> for ShowIds {
    fn from(ids: &TraktIds) -> Self {
        ShowIds {
            trakt: ids.trakt,
            slug: ids.slug.clone(),
            tvdb: ids.tvdb,
            imdb: ids.imdb.as_ref().map(|s| s.replace('/', "")),
            tmdb: ids.tmdb,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraktMovie {
    pub title: String,
    pub year: Option<u32>,
    pub ids: TraktIds,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraktShow {
    pub title: String,
    pub year: Option<u32>,
    pub ids: TraktIds,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraktWatchedMovie {
    #[serde(default)]
    pub plays: u32,
    pub last_watched_at: Option<DateTime<Utc>>,
    pub movie: TraktMovie,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraktCollectedMovie {
    pub collected_at: Option<DateTime<Utc>>,
    pub movie: TraktMovie,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraktWatchedShow {
    #[serde(default)]
    pub plays: u32,
    pub last_watched_at: Option<DateTime<Utc>>,
    pub show: TraktShow,
    #[serde(default)]
    pub seasons: Vec<TraktWatchedSeason>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraktWatchedSeason {
    pub number: u32,
    #[serde(default)]
    pub episodes: Vec<TraktWatchedEpisode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraktWatchedEpisode {
    pub number: u32,
    #[serde(default)]
    pub plays: u32,
    pub last_watched_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraktCollectedShow {
    pub last_collected_at: Option<DateTime<Utc>>,
    pub show: TraktShow,
    #[serde(default)]
    pub seasons: Vec<TraktCollectedSeason>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraktCollectedSeason {
    pub number: u32,
    #[serde(default)]
    pub episodes: Vec<TraktCollectedEpisode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraktCollectedEpisode {
    pub number: u32,
    pub collected_at: Option<DateTime<Utc>>,
}

/// Technical details attached to collection entries
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CollectionMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_channels: Option<String>,
    #[serde(rename = "3d", default)]
    pub is_3d: bool,
}

/// Body of `POST /sync/history` and `POST /sync/collection`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SyncItems {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub movies: Vec<SyncMovie>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shows: Vec<SyncShow>,
}

impl SyncItems {
    pub fn movies(movies: Vec<SyncMovie>) -> Self {
        Self { movies, shows: Vec::new() }
    }

    pub fn shows(shows: Vec<SyncShow>) -> Self {
        Self { movies: Vec::new(), shows }
    }

    pub fn episode_count(&self) -> usize {
        self.shows
            .iter()
            .flat_map(|show| show.seasons.iter())
            .map(|season| season.episodes.len())
            .sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncMovie {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    pub ids: TraktIds,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watched_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collected_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub metadata: Option<CollectionMetadata>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncShow {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    pub ids: TraktIds,
    pub seasons: Vec<SyncSeason>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncSeason {
    pub number: u32,
    pub episodes: Vec<SyncEpisode>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncEpisode {
    pub number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watched_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collected_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub metadata: Option<CollectionMetadata>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncCounts {
    #[serde(default)]
    pub movies: u32,
    #[serde(default)]
    pub episodes: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SyncNotFound {
    #[serde(default)]
    pub movies: Vec<serde_json::Value>,
    #[serde(default)]
    pub shows: Vec<serde_json::Value>,
    #[serde(default)]
    pub episodes: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SyncResponse {
    #[serde(default)]
    pub added: SyncCounts,
    #[serde(default)]
    pub updated: SyncCounts,
    #[serde(default)]
    pub existing: SyncCounts,
    #[serde(default)]
    pub not_found: SyncNotFound,
}

/// Connection parameters shared by every request.
pub struct ApiContext<'a> {
    pub client: &'a Client,
    pub base_url: &'a str,
    pub access_token: &'a str,
    pub client_id: &'a str,
}

impl ApiContext<'_> {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.url(path))
            .header("Authorization", format!("Bearer {}", self.access_token))
            .header("trakt-api-version", "2")
            .header("trakt-api-key", self.client_id)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response, operation: &str) -> Result<T, SourceError> {
    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        return Err(SourceError::Api {
            operation: operation.to_string(),
            status,
            body,
        });
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|source| SourceError::Decode {
        operation: operation.to_string(),
        source,
    })
}

async fn get_json<T: DeserializeOwned>(ctx: &ApiContext<'_>, path: &str, operation: &str) -> Result<T, SourceError> {
    debug!(operation, path, "GET");
    let response = ctx.request(reqwest::Method::GET, path).send().await?;
    decode(response, operation).await
}

async fn post_json<B: Serialize, T: DeserializeOwned>(
    ctx: &ApiContext<'_>,
    path: &str,
    body: &B,
    operation: &str,
) -> Result<T, SourceError> {
    debug!(operation, path, "POST");
    let response = ctx
        .request(reqwest::Method::POST, path)
        .json(body)
        .send()
        .await?;
    decode(response, operation).await
}

pub async fn get_last_activities(ctx: &ApiContext<'_>) -> Result<LastActivities, SourceError> {
    get_json(ctx, "/sync/last_activities", "Fetch last activities").await
}

pub async fn get_watched_movies(ctx: &ApiContext<'_>) -> Result<Vec<TraktWatchedMovie>, SourceError> {
    get_json(ctx, "/sync/watched/movies", "Fetch watched movies").await
}

pub async fn get_collected_movies(ctx: &ApiContext<'_>) -> Result<Vec<TraktCollectedMovie>, SourceError> {
    get_json(ctx, "/sync/collection/movies", "Fetch collected movies").await
}

pub async fn get_watched_shows(ctx: &ApiContext<'_>) -> Result<Vec<TraktWatchedShow>, SourceError> {
    get_json(ctx, "/sync/watched/shows", "Fetch watched shows").await
}

pub async fn get_collected_shows(ctx: &ApiContext<'_>) -> Result<Vec<TraktCollectedShow>, SourceError> {
    get_json(ctx, "/sync/collection/shows", "Fetch collected shows").await
}

pub async fn add_to_history(ctx: &ApiContext<'_>, items: &SyncItems) -> Result<SyncResponse, SourceError> {
    post_json(ctx, "/sync/history", items, "Add watched history").await
}

pub async fn add_to_collection(ctx: &ApiContext<'_>, items: &SyncItems) -> Result<SyncResponse, SourceError> {
    post_json(ctx, "/sync/collection", items, "Add collection items").await
}
