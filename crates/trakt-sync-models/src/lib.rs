pub mod activities;
pub mod episode;
pub mod ids;
pub mod library;
pub mod movie;

pub use activities::{ActivityWatermark, Category, LastActivities};
pub use episode::{Episode, EpisodeCollected, EpisodeKey, EpisodeWatched};
pub use ids::{MovieIds, ShowIds};
pub use library::{LocalEpisode, LocalMovie, MediaInfo};
pub use movie::{CollectedMovie, Movie, WatchedMovie};
