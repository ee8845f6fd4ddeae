//! Two-way reconciliation between the local library and the tracking service.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, instrument, warn};
use trakt_sync_models::{LocalEpisode, LocalMovie};
use trakt_sync_sources::trakt::api::{
    SyncEpisode, SyncItems, SyncMovie, SyncResponse, SyncSeason, SyncShow, TraktIds,
};

use crate::cache::TraktCache;
use crate::error::CacheError;
use crate::library::MediaLibrary;
use crate::matching::{EpisodeIndex, MovieIndex};
use crate::metadata::collection_metadata;

/// Counters of the most recent movie and series passes.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct SyncStatistics {
    pub movies_marked_unwatched_in_library: u32,
    pub movies_marked_watched_in_library: u32,
    pub movies_added_to_history: u32,
    pub movies_added_to_collection: u32,
    pub episodes_marked_unwatched_in_library: u32,
    pub episodes_marked_watched_in_library: u32,
    pub episodes_added_to_history: u32,
    pub episodes_added_to_collection: u32,
    pub status: String,
}

pub struct SyncOrchestrator {
    cache: Arc<TraktCache>,
    library: Arc<dyn MediaLibrary>,
    statistics: Mutex<SyncStatistics>,
}

impl SyncOrchestrator {
    pub fn new(cache: Arc<TraktCache>, library: Arc<dyn MediaLibrary>) -> Self {
        Self {
            cache,
            library,
            statistics: Mutex::new(SyncStatistics::default()),
        }
    }

    pub fn statistics(&self) -> SyncStatistics {
        self.statistics
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub(crate) fn set_status(&self, status: impl Into<String>) {
        let status = status.into();
        self.record(|stats| stats.status = status);
    }

    fn record(&self, update: impl FnOnce(&mut SyncStatistics)) {
        let mut stats = self.statistics.lock().unwrap_or_else(|e| e.into_inner());
        update(&mut stats);
    }

    /// Run one movie pass. Any failure is logged and reported as `false`;
    /// mutations made before the failure are kept.
    #[instrument(skip(self))]
    pub async fn sync_movies(&self) -> bool {
        self.record(|stats| {
            stats.movies_marked_unwatched_in_library = 0;
            stats.movies_marked_watched_in_library = 0;
            stats.movies_added_to_history = 0;
            stats.movies_added_to_collection = 0;
            stats.status = "Synchronizing movies".to_string();
        });

        match self.movies_pass().await {
            Ok(()) => {
                self.set_status("Movies synchronized");
                true
            }
            Err(e) => {
                error!("Movie sync failed: {:#}", e);
                self.set_status(format!("Movie sync failed: {}", e));
                false
            }
        }
    }

    /// Run one series pass, mirroring `sync_movies` for episodes.
    #[instrument(skip(self))]
    pub async fn sync_series(&self) -> bool {
        self.record(|stats| {
            stats.episodes_marked_unwatched_in_library = 0;
            stats.episodes_marked_watched_in_library = 0;
            stats.episodes_added_to_history = 0;
            stats.episodes_added_to_collection = 0;
            stats.status = "Synchronizing series".to_string();
        });

        match self.series_pass().await {
            Ok(()) => {
                self.set_status("Series synchronized");
                true
            }
            Err(e) => {
                error!("Series sync failed: {:#}", e);
                self.set_status(format!("Series sync failed: {}", e));
                false
            }
        }
    }

    async fn movies_pass(&self) -> Result<()> {
        let unwatched = unwatched_or_skip("movies", self.cache.get_unwatched_movies().await)?;
        let watched = self
            .cache
            .get_watched_movies()
            .await
            .context("Failed to get watched movies")?;
        let collected = self
            .cache
            .get_collected_movies()
            .await
            .context("Failed to get collected movies")?;

        let mut local = self
            .library
            .movies()
            .await
            .context("Failed to query local movies")?;

        info!(
            "Movie pass: {} local, {} remote watched, {} remote unwatched, {} remote collected",
            local.len(),
            watched.len(),
            unwatched.len(),
            collected.len()
        );

        let unwatched_index = MovieIndex::new(&unwatched);
        if !unwatched_index.is_empty() {
            for movie in local.iter_mut().filter(|m| m.is_watched()) {
                if !unwatched_index.contains(movie) {
                    continue;
                }
                if self.library.mark_unwatched(&movie.id).await? {
                    debug!("Marked '{}' unwatched in library", movie.title);
                    movie.play_count = 0;
                    movie.last_played = None;
                    self.record(|stats| stats.movies_marked_unwatched_in_library += 1);
                } else {
                    warn!("Library refused to mark '{}' unwatched", movie.title);
                }
            }
        }

        let watched_index = MovieIndex::new(&watched);
        for movie in local.iter_mut().filter(|m| !m.is_watched()) {
            let Some(remote) = watched_index.find(movie) else {
                continue;
            };
            let plays = remote.plays.max(1);
            if self
                .library
                .mark_watched(&movie.id, plays, remote.last_watched_at)
                .await?
            {
                debug!("Marked '{}' watched in library ({} plays)", movie.title, plays);
                movie.play_count = plays;
                movie.last_played = remote.last_watched_at.or(movie.last_played);
                self.record(|stats| stats.movies_marked_watched_in_library += 1);
            } else {
                warn!("Library refused to mark '{}' watched", movie.title);
            }
        }

        let history: Vec<SyncMovie> = local
            .iter()
            .filter(|m| m.is_watched() && !watched_index.contains(m))
            .map(history_movie)
            .collect();
        if !history.is_empty() {
            let submitted = history.len();
            let response = self
                .cache
                .client()
                .add_watched_history_items(&SyncItems::movies(history))
                .await
                .context("Failed to add movies to history")?;
            let added = reported_count("history", submitted, response.added.movies);
            self.record(|stats| stats.movies_added_to_history += added);
            log_not_found(&response);
        }

        let collected_index = MovieIndex::new(&collected);
        let additions: Vec<SyncMovie> = local
            .iter()
            .filter(|m| !collected_index.contains(m))
            .map(collection_movie)
            .collect();
        if !additions.is_empty() {
            let submitted = additions.len();
            let response = self
                .cache
                .client()
                .add_collection_items(&SyncItems::movies(additions))
                .await
                .context("Failed to add movies to collection")?;
            let added = reported_count("collection", submitted, response.added.movies);
            self.record(|stats| stats.movies_added_to_collection += added);
            log_not_found(&response);
        }

        Ok(())
    }

    async fn series_pass(&self) -> Result<()> {
        let unwatched = unwatched_or_skip("episodes", self.cache.get_unwatched_episodes().await)?;
        let watched = self
            .cache
            .get_watched_episodes()
            .await
            .context("Failed to get watched episodes")?;
        let collected = self
            .cache
            .get_collected_episodes()
            .await
            .context("Failed to get collected episodes")?;

        let mut local = self
            .library
            .episodes()
            .await
            .context("Failed to query local episodes")?;

        let unkeyed = local.iter().filter(|e| e.key().is_none()).count();
        if unkeyed > 0 {
            debug!("Skipping {} local episodes without a TVDB id", unkeyed);
        }
        info!(
            "Series pass: {} local episodes, {} remote watched, {} remote unwatched, {} remote collected",
            local.len() - unkeyed,
            watched.len(),
            unwatched.len(),
            collected.len()
        );

        let unwatched_index = EpisodeIndex::new(&unwatched);
        if unwatched_index.unkeyed() > 0 {
            debug!(
                "{} remote unwatched episodes have no TVDB id and cannot be matched",
                unwatched_index.unkeyed()
            );
        }
        if !unwatched_index.is_empty() {
            debug!("{} distinct episodes unwatched remotely", unwatched_index.len());
            for episode in local.iter_mut().filter(|e| e.is_watched()) {
                let Some(key) = episode.key() else { continue };
                if !unwatched_index.contains(&key) {
                    continue;
                }
                if self.library.mark_unwatched(&episode.id).await? {
                    debug!("Marked {} unwatched in library", key);
                    episode.play_count = 0;
                    episode.last_played = None;
                    self.record(|stats| stats.episodes_marked_unwatched_in_library += 1);
                } else {
                    warn!("Library refused to mark {} unwatched", key);
                }
            }
        }

        let watched_index = EpisodeIndex::new(&watched);
        for episode in local.iter_mut().filter(|e| !e.is_watched()) {
            let Some(key) = episode.key() else { continue };
            let Some(remote) = watched_index.first(&key) else {
                continue;
            };
            let plays = remote.plays.max(1);
            if self
                .library
                .mark_watched(&episode.id, plays, remote.last_watched_at)
                .await?
            {
                debug!("Marked {} watched in library ({} plays)", key, plays);
                episode.play_count = plays;
                episode.last_played = remote.last_watched_at.or(episode.last_played);
                self.record(|stats| stats.episodes_marked_watched_in_library += 1);
            } else {
                warn!("Library refused to mark {} watched", key);
            }
        }

        let history = group_by_show(
            local
                .iter()
                .filter(|e| e.is_watched())
                .filter(|e| e.key().is_some_and(|key| !watched_index.contains(&key)))
                .map(|e| (e, history_episode(e))),
        );
        if !history.is_empty() {
            let items = SyncItems::shows(history);
            let submitted = items.episode_count();
            let response = self
                .cache
                .client()
                .add_watched_history_items(&items)
                .await
                .context("Failed to add episodes to history")?;
            let added = reported_count("history", submitted, response.added.episodes);
            self.record(|stats| stats.episodes_added_to_history += added);
            log_not_found(&response);
        }

        let collected_index = EpisodeIndex::new(&collected);
        let additions = group_by_show(
            local
                .iter()
                .filter(|e| e.key().is_some_and(|key| !collected_index.contains(&key)))
                .map(|e| (e, collection_episode(e))),
        );
        if !additions.is_empty() {
            let items = SyncItems::shows(additions);
            let submitted = items.episode_count();
            let response = self
                .cache
                .client()
                .add_collection_items(&items)
                .await
                .context("Failed to add episodes to collection")?;
            let added = reported_count("collection", submitted, response.added.episodes);
            self.record(|stats| stats.episodes_added_to_collection += added);
            log_not_found(&response);
        }

        Ok(())
    }
}

/// A remote outage while diffing costs only the unwatched sub-phase.
/// Corruption still fails the pass.
fn unwatched_or_skip<T>(kind: &str, result: Result<Vec<T>, CacheError>) -> Result<Vec<T>> {
    match result {
        Err(CacheError::Remote(e)) => {
            warn!("Skipping unwatched {}: {}", kind, e);
            Ok(Vec::new())
        }
        other => other.with_context(|| format!("Failed to get unwatched {}", kind)),
    }
}

/// The server's added count. A mismatch with what was submitted is only
/// worth a warning.
fn reported_count(target: &str, submitted: usize, added: u32) -> u32 {
    if added as usize != submitted {
        warn!(
            "Submitted {} items to {} but server reported {} added",
            submitted, target, added
        );
    } else {
        info!("Added {} items to {}", added, target);
    }
    added
}

fn log_not_found(response: &SyncResponse) {
    let missing = &response.not_found;
    let total = missing.movies.len() + missing.shows.len() + missing.episodes.len();
    if total > 0 {
        debug!("Server did not recognise {} submitted items", total);
    }
}

fn movie_ids(movie: &LocalMovie) -> TraktIds {
    TraktIds {
        imdb: movie
            .imdb_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string),
        tmdb: movie.tmdb_id,
        ..TraktIds::default()
    }
}

fn history_movie(movie: &LocalMovie) -> SyncMovie {
    SyncMovie {
        title: movie.title.clone(),
        year: movie.year,
        ids: movie_ids(movie),
        watched_at: movie.last_played,
        collected_at: None,
        metadata: None,
    }
}

fn collection_movie(movie: &LocalMovie) -> SyncMovie {
    SyncMovie {
        title: movie.title.clone(),
        year: movie.year,
        ids: movie_ids(movie),
        watched_at: None,
        collected_at: movie.date_added,
        metadata: collection_metadata(&movie.media),
    }
}

fn history_episode(episode: &LocalEpisode) -> SyncEpisode {
    SyncEpisode {
        number: episode.number,
        watched_at: episode.last_played,
        collected_at: None,
        metadata: None,
    }
}

fn collection_episode(episode: &LocalEpisode) -> SyncEpisode {
    SyncEpisode {
        number: episode.number,
        watched_at: None,
        collected_at: episode.date_added,
        metadata: collection_metadata(&episode.media),
    }
}

struct ShowBatch {
    title: String,
    year: Option<u32>,
    seasons: BTreeMap<u32, Vec<SyncEpisode>>,
}

/// Nest flat episodes into show → season → episode push batches.
fn group_by_show<'a, I>(items: I) -> Vec<SyncShow>
where
    I: IntoIterator<Item = (&'a LocalEpisode, SyncEpisode)>,
{
    let mut shows: BTreeMap<u32, ShowBatch> = BTreeMap::new();
    for (local, episode) in items {
        let Some(tvdb) = local.tvdb_id else { continue };
        shows
            .entry(tvdb)
            .or_insert_with(|| ShowBatch {
                title: local.show_title.clone(),
                year: local.show_year,
                seasons: BTreeMap::new(),
            })
            .seasons
            .entry(local.season)
            .or_default()
            .push(episode);
    }

    shows
        .into_iter()
        .map(|(tvdb, show)| SyncShow {
            title: show.title,
            year: show.year,
            ids: TraktIds {
                tvdb: Some(tvdb),
                ..TraktIds::default()
            },
            seasons: show
                .seasons
                .into_iter()
                .map(|(number, episodes)| SyncSeason { number, episodes })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use trakt_sync_models::MediaInfo;

    fn local_episode(tvdb: Option<u32>, season: u32, number: u32) -> LocalEpisode {
        LocalEpisode {
            id: format!("{:?}-{}-{}", tvdb, season, number),
            show_title: "Severance".to_string(),
            show_year: Some(2022),
            tvdb_id: tvdb,
            season,
            number,
            play_count: 1,
            last_played: None,
            date_added: None,
            media: MediaInfo::default(),
        }
    }

    #[test]
    fn test_group_by_show_nests_seasons() {
        let episodes = vec![
            local_episode(Some(371980), 2, 1),
            local_episode(Some(371980), 1, 2),
            local_episode(Some(371980), 1, 1),
            local_episode(Some(81189), 5, 16),
            local_episode(None, 1, 1),
        ];

        let shows = group_by_show(episodes.iter().map(|e| (e, history_episode(e))));
        assert_eq!(shows.len(), 2);
        assert_eq!(shows[0].ids.tvdb, Some(81189));

        let severance = &shows[1];
        assert_eq!(severance.seasons.len(), 2);
        assert_eq!(severance.seasons[0].number, 1);
        assert_eq!(severance.seasons[0].episodes.len(), 2);
        assert_eq!(severance.seasons[1].episodes[0].number, 1);
        assert_eq!(SyncItems::shows(shows).episode_count(), 4);
    }

    #[test]
    fn test_collection_movie_carries_metadata() {
        let movie = LocalMovie {
            id: "m".to_string(),
            title: "Dune".to_string(),
            year: Some(2021),
            imdb_id: Some(" ".to_string()),
            tmdb_id: Some(438631),
            play_count: 0,
            last_played: None,
            date_added: None,
            media: MediaInfo {
                video_width: Some(3840),
                video_height: Some(2160),
                audio_codec: Some("truehd".to_string()),
                audio_channels: Some(8),
                is_3d: false,
            },
        };

        let pushed = collection_movie(&movie);
        assert_eq!(pushed.ids.imdb, None);
        assert_eq!(pushed.ids.tmdb, Some(438631));
        let metadata = pushed.metadata.unwrap();
        assert_eq!(metadata.resolution.as_deref(), Some("uhd_4k"));
        assert_eq!(metadata.audio_channels.as_deref(), Some("7.1"));
    }

    #[test]
    fn test_reported_count_returns_server_value() {
        assert_eq!(reported_count("history", 3, 2), 2);
        assert_eq!(reported_count("history", 2, 2), 2);
    }
}
