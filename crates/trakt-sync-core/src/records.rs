//! Conversion of tracking-service payloads into the flat records the cache persists.

use trakt_sync_models::{
    CollectedMovie, Episode, EpisodeCollected, EpisodeWatched, MovieIds, ShowIds, WatchedMovie,
};
use trakt_sync_sources::trakt::api::{
    TraktCollectedMovie, TraktCollectedShow, TraktShow, TraktWatchedMovie, TraktWatchedShow,
};

pub fn watched_movies(items: Vec<TraktWatchedMovie>) -> Vec<WatchedMovie> {
    items
        .into_iter()
        .map(|item| WatchedMovie {
            ids: MovieIds::from(&item.movie.ids),
            title: item.movie.title,
            year: item.movie.year,
            plays: item.plays,
            last_watched_at: item.last_watched_at,
        })
        .collect()
}

pub fn collected_movies(items: Vec<TraktCollectedMovie>) -> Vec<CollectedMovie> {
    items
        .into_iter()
        .map(|item| CollectedMovie {
            ids: MovieIds::from(&item.movie.ids),
            title: item.movie.title,
            year: item.movie.year,
            collected_at: item.collected_at,
        })
        .collect()
}

fn episode(show: &TraktShow, season: u32, number: u32) -> Episode {
    Episode {
        show_ids: ShowIds::from(&show.ids),
        show_title: show.title.clone(),
        show_year: show.year,
        season,
        number,
    }
}

/// Flatten every show × season × episode into one record per episode.
pub fn watched_episodes(shows: Vec<TraktWatchedShow>) -> Vec<EpisodeWatched> {
    let mut episodes = Vec::new();
    for show in &shows {
        for season in &show.seasons {
            for item in &season.episodes {
                episodes.push(EpisodeWatched {
                    episode: episode(&show.show, season.number, item.number),
                    plays: item.plays,
                    last_watched_at: item.last_watched_at,
                });
            }
        }
    }
    episodes
}

pub fn collected_episodes(shows: Vec<TraktCollectedShow>) -> Vec<EpisodeCollected> {
    let mut episodes = Vec::new();
    for show in &shows {
        for season in &show.seasons {
            for item in &season.episodes {
                episodes.push(EpisodeCollected {
                    episode: episode(&show.show, season.number, item.number),
                    collected_at: item.collected_at,
                });
            }
        }
    }
    episodes
}
