// Watched-to-unwatched regression diff between two watched snapshots

use std::collections::HashSet;
use tracing::debug;
use trakt_sync_models::{Episode, EpisodeKey, EpisodeWatched, Movie, WatchedMovie};

/// Movies in `baseline` with no counterpart in `current`.
///
/// Two records are the same movie when their service ids are equal or their
/// IMDb ids are equal. Title and year are never consulted here.
pub fn unwatched_movies(baseline: &[WatchedMovie], current: &[WatchedMovie]) -> Vec<Movie> {
    let current_trakt: HashSet<u64> = current.iter().filter_map(|m| m.ids.trakt).collect();
    let current_imdb: HashSet<&str> = current.iter().filter_map(|m| m.ids.imdb()).collect();

    let unwatched: Vec<Movie> = baseline
        .iter()
        .filter(|movie| {
            let by_trakt = movie
                .ids
                .trakt
                .map(|id| current_trakt.contains(&id))
                .unwrap_or(false);
            let by_imdb = movie
                .ids
                .imdb()
                .map(|id| current_imdb.contains(id))
                .unwrap_or(false);
            !(by_trakt || by_imdb)
        })
        .map(WatchedMovie::identity)
        .collect();

    debug!(
        "unwatched_movies: baseline={}, current={}, unwatched={}",
        baseline.len(),
        current.len(),
        unwatched.len()
    );
    unwatched
}

/// Episodes in `baseline` whose `(tvdb, season, number)` key is absent from
/// `current`.
///
/// A baseline episode without a TVDB id cannot be keyed, so it never matches
/// and is always reported.
pub fn unwatched_episodes(baseline: &[EpisodeWatched], current: &[EpisodeWatched]) -> Vec<Episode> {
    let current_keys: HashSet<EpisodeKey> =
        current.iter().filter_map(|e| e.episode.key()).collect();

    let unwatched: Vec<Episode> = baseline
        .iter()
        .filter(|watched| match watched.episode.key() {
            Some(key) => !current_keys.contains(&key),
            None => true,
        })
        .map(|watched| watched.episode.clone())
        .collect();

    debug!(
        "unwatched_episodes: baseline={}, current={}, unwatched={}",
        baseline.len(),
        current.len(),
        unwatched.len()
    );
    unwatched
}
