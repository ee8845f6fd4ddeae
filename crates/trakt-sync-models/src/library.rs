use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Technical attributes of the local media file, used to describe
/// collection entries pushed to the tracking service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MediaInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_codec: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_channels: Option<u32>,
    #[serde(default)]
    pub is_3d: bool,
}

/// A movie as known to the host media library.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocalMovie {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub year: Option<u32>,
    #[serde(default)]
    pub imdb_id: Option<String>,
    #[serde(default)]
    pub tmdb_id: Option<u32>,
    #[serde(default)]
    pub play_count: u32,
    #[serde(default)]
    pub last_played: Option<DateTime<Utc>>,
    #[serde(default)]
    pub date_added: Option<DateTime<Utc>>,
    #[serde(default)]
    pub media: MediaInfo,
}

impl LocalMovie {
    pub fn is_watched(&self) -> bool {
        self.play_count > 0
    }
}

/// An episode as known to the host media library.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocalEpisode {
    pub id: String,
    pub show_title: String,
    #[serde(default)]
    pub show_year: Option<u32>,
    #[serde(default)]
    pub tvdb_id: Option<u32>,
    pub season: u32,
    pub number: u32,
    #[serde(default)]
    pub play_count: u32,
    #[serde(default)]
    pub last_played: Option<DateTime<Utc>>,
    #[serde(default)]
    pub date_added: Option<DateTime<Utc>>,
    #[serde(default)]
    pub media: MediaInfo,
}

impl LocalEpisode {
    pub fn is_watched(&self) -> bool {
        self.play_count > 0
    }

    pub fn key(&self) -> Option<crate::EpisodeKey> {
        self.tvdb_id
            .map(|tvdb| crate::EpisodeKey::new(tvdb, self.season, self.number))
    }
}
