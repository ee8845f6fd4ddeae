// Identity matching between local library items and tracking-service records

use std::collections::HashMap;
use trakt_sync_models::{
    CollectedMovie, Episode, EpisodeCollected, EpisodeKey, EpisodeWatched, LocalMovie, Movie,
    MovieIds, WatchedMovie,
};

pub trait MovieRecord {
    fn movie_ids(&self) -> &MovieIds;
    fn title(&self) -> &str;
    fn year(&self) -> Option<u32>;
}

impl MovieRecord for Movie {
    fn movie_ids(&self) -> &MovieIds {
        &self.ids
    }
    fn title(&self) -> &str {
        &self.title
    }
    fn year(&self) -> Option<u32> {
        self.year
    }
}

impl MovieRecord for WatchedMovie {
    fn movie_ids(&self) -> &MovieIds {
        &self.ids
    }
    fn title(&self) -> &str {
        &self.title
    }
    fn year(&self) -> Option<u32> {
        self.year
    }
}

impl MovieRecord for CollectedMovie {
    fn movie_ids(&self) -> &MovieIds {
        &self.ids
    }
    fn title(&self) -> &str {
        &self.title
    }
    fn year(&self) -> Option<u32> {
        self.year
    }
}

pub trait EpisodeRecord {
    fn episode(&self) -> &Episode;
}

impl EpisodeRecord for Episode {
    fn episode(&self) -> &Episode {
        self
    }
}

impl EpisodeRecord for EpisodeWatched {
    fn episode(&self) -> &Episode {
        &self.episode
    }
}

impl EpisodeRecord for EpisodeCollected {
    fn episode(&self) -> &Episode {
        &self.episode
    }
}

fn normalize_imdb(id: Option<&str>) -> Option<&str> {
    id.map(|s| s.trim().trim_matches('/')).filter(|s| !s.is_empty())
}

fn title_key(title: &str, year: Option<u32>) -> Option<(String, Option<u32>)> {
    let title = title.trim().to_lowercase();
    if title.is_empty() {
        None
    } else {
        Some((title, year))
    }
}

/// Lookup of remote movie records for local items.
///
/// A local movie is matched by IMDb id, else TMDb id, else title and year.
/// The first successful lookup wins; within one key the first record wins.
pub struct MovieIndex<'a, T> {
    records: &'a [T],
    by_imdb: HashMap<&'a str, usize>,
    by_tmdb: HashMap<u32, usize>,
    by_title: HashMap<(String, Option<u32>), usize>,
}

impl<'a, T: MovieRecord> MovieIndex<'a, T> {
    pub fn new(records: &'a [T]) -> Self {
        let mut by_imdb = HashMap::new();
        let mut by_tmdb = HashMap::new();
        let mut by_title = HashMap::new();

        for (index, record) in records.iter().enumerate() {
            let ids = record.movie_ids();
            if let Some(imdb) = ids.imdb() {
                by_imdb.entry(imdb).or_insert(index);
            }
            if let Some(tmdb) = ids.tmdb {
                by_tmdb.entry(tmdb).or_insert(index);
            }
            if let Some(key) = title_key(record.title(), record.year()) {
                by_title.entry(key).or_insert(index);
            }
        }

        Self {
            records,
            by_imdb,
            by_tmdb,
            by_title,
        }
    }

    pub fn find(&self, movie: &LocalMovie) -> Option<&'a T> {
        let index = normalize_imdb(movie.imdb_id.as_deref())
            .and_then(|imdb| self.by_imdb.get(imdb))
            .or_else(|| movie.tmdb_id.and_then(|tmdb| self.by_tmdb.get(&tmdb)))
            .or_else(|| {
                title_key(&movie.title, movie.year).and_then(|key| self.by_title.get(&key))
            })?;
        self.records.get(*index)
    }

    pub fn contains(&self, movie: &LocalMovie) -> bool {
        self.find(movie).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Multimap of episode records keyed by `(tvdb, season, number)`.
///
/// Built once per pass so membership tests are O(1). Records whose show has
/// no TVDB id cannot be keyed and are left out.
pub struct EpisodeIndex<'a, T> {
    by_key: HashMap<EpisodeKey, Vec<&'a T>>,
    unkeyed: usize,
}

impl<'a, T: EpisodeRecord> EpisodeIndex<'a, T> {
    pub fn new(records: &'a [T]) -> Self {
        let mut by_key: HashMap<EpisodeKey, Vec<&'a T>> = HashMap::new();
        let mut unkeyed = 0;
        for record in records {
            match record.episode().key() {
                Some(key) => by_key.entry(key).or_default().push(record),
                None => unkeyed += 1,
            }
        }
        Self { by_key, unkeyed }
    }

    pub fn get(&self, key: &EpisodeKey) -> &[&'a T] {
        self.by_key.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn first(&self, key: &EpisodeKey) -> Option<&'a T> {
        self.get(key).first().copied()
    }

    pub fn contains(&self, key: &EpisodeKey) -> bool {
        self.by_key.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Number of records skipped for lack of a TVDB id.
    pub fn unkeyed(&self) -> usize {
        self.unkeyed
    }
}
