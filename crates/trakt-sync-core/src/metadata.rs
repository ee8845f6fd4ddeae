//! Technical metadata attached to collection pushes.

use trakt_sync_models::MediaInfo;
use trakt_sync_sources::trakt::api::CollectionMetadata;

const MEDIA_TYPE_DIGITAL: &str = "digital";

/// Derive collection metadata from local media attributes.
///
/// Returns `None` when nothing beyond the media type could be derived.
pub fn collection_metadata(media: &MediaInfo) -> Option<CollectionMetadata> {
    let resolution = resolution(media.video_width, media.video_height);
    let audio = media.audio_codec.as_deref().and_then(audio_codec);
    let audio_channels = media.audio_channels.and_then(audio_channels);

    if resolution.is_none() && audio.is_none() && audio_channels.is_none() && !media.is_3d {
        return None;
    }

    Some(CollectionMetadata {
        media_type: Some(MEDIA_TYPE_DIGITAL.to_string()),
        resolution: resolution.map(str::to_string),
        audio: audio.map(str::to_string),
        audio_channels: audio_channels.map(str::to_string),
        is_3d: media.is_3d,
    })
}

pub fn resolution(width: Option<u32>, height: Option<u32>) -> Option<&'static str> {
    if width.is_none() && height.is_none() {
        return None;
    }
    let width = width.unwrap_or(0);
    let height = height.unwrap_or(0);

    let label = if height >= 2160 || width >= 3840 {
        "uhd_4k"
    } else if height >= 1080 || width >= 1920 {
        "hd_1080p"
    } else if height >= 720 || width >= 1280 {
        "hd_720p"
    } else if height >= 576 {
        "sd_576p"
    } else {
        "sd_480p"
    };
    Some(label)
}

pub fn audio_codec(codec: &str) -> Option<&'static str> {
    let codec = codec.trim().to_lowercase();
    let mapped = match codec.as_str() {
        "truehd" | "dolby truehd" => "dolby_truehd",
        "dts-hd ma" | "dtshd_ma" | "dts-hd" => "dts_ma",
        "dts" => "dts",
        "eac3" | "e-ac-3" | "dd+" => "dolby_digital_plus",
        "ac3" | "ac-3" => "dolby_digital",
        "aac" => "aac",
        "mp3" => "mp3",
        "flac" => "flac",
        "pcm" | "lpcm" => "lpcm",
        "vorbis" | "ogg" => "ogg",
        _ => return None,
    };
    Some(mapped)
}

pub fn audio_channels(channels: u32) -> Option<&'static str> {
    match channels {
        1 => Some("1.0"),
        2 => Some("2.0"),
        3 => Some("2.1"),
        4 => Some("4.0"),
        5 => Some("5.0"),
        6 => Some("5.1"),
        7 => Some("6.1"),
        8 => Some("7.1"),
        _ => None,
    }
}
