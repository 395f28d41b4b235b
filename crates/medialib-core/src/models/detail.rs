//! Per-item detail with type-specific metadata.
//!
//! The server sends up to three optional metadata objects (`image_metadata`,
//! `video_metadata`, `audio_metadata`). [`MediaDetail`] collapses them into a single
//! [`MediaMetadata`] variant matching `media_type`, rejecting payloads that disagree.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

use super::media::{null_as_empty, MediaId, MediaSummary, MediaType, ProcessingStatus};
use super::timestamp;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageMetadata {
    #[serde(default)]
    pub dimensions: Option<String>,
    #[serde(default)]
    pub color_depth: Option<u32>,
    #[serde(default)]
    pub resolution: Option<String>,
    #[serde(default)]
    pub exif_data: BTreeMap<String, JsonValue>,
    #[serde(default, rename = "thumbnail_s3_key")]
    pub thumbnail_ref: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    #[serde(default, rename = "duration")]
    pub duration_sec: Option<f64>,
    #[serde(default)]
    pub resolution: Option<String>,
    #[serde(default)]
    pub frame_rate: Option<f64>,
    #[serde(default)]
    pub video_codec: Option<String>,
    #[serde(default)]
    pub audio_codec: Option<String>,
    #[serde(default)]
    pub bit_rate: Option<u64>,
    /// Quality label -> stream URL.
    #[serde(default)]
    pub available_qualities: BTreeMap<String, String>,
    #[serde(default, rename = "thumbnail_s3_key")]
    pub thumbnail_ref: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioMetadata {
    #[serde(default, rename = "duration")]
    pub duration_sec: Option<f64>,
    #[serde(default)]
    pub bit_rate: Option<u64>,
    #[serde(default)]
    pub sample_rate: Option<u32>,
    #[serde(default)]
    pub channels: Option<u32>,
    #[serde(default)]
    pub genre: Option<String>,
}

/// Type-specific metadata. Exactly one variant, matching the item's media type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MediaMetadata {
    Image(ImageMetadata),
    Video(VideoMetadata),
    Audio(AudioMetadata),
}

impl MediaMetadata {
    pub fn media_type(&self) -> MediaType {
        match self {
            MediaMetadata::Image(_) => MediaType::Image,
            MediaMetadata::Video(_) => MediaType::Video,
            MediaMetadata::Audio(_) => MediaType::Audio,
        }
    }

    pub fn empty_for(media_type: MediaType) -> Self {
        match media_type {
            MediaType::Image => MediaMetadata::Image(ImageMetadata::default()),
            MediaType::Video => MediaMetadata::Video(VideoMetadata::default()),
            MediaType::Audio => MediaMetadata::Audio(AudioMetadata::default()),
        }
    }

    pub fn duration_sec(&self) -> Option<f64> {
        match self {
            MediaMetadata::Image(_) => None,
            MediaMetadata::Video(v) => v.duration_sec,
            MediaMetadata::Audio(a) => a.duration_sec,
        }
    }

    pub fn genre(&self) -> Option<&str> {
        match self {
            MediaMetadata::Image(_) => None,
            MediaMetadata::Video(v) => v.genre.as_deref(),
            MediaMetadata::Audio(a) => a.genre.as_deref(),
        }
    }

    pub fn thumbnail_ref(&self) -> Option<&str> {
        match self {
            MediaMetadata::Image(i) => i.thumbnail_ref.as_deref(),
            MediaMetadata::Video(v) => v.thumbnail_ref.as_deref(),
            MediaMetadata::Audio(_) => None,
        }
    }
}

/// Full detail of one item (`GET /media/{id}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MediaDetailWire")]
pub struct MediaDetail {
    #[serde(flatten)]
    pub summary: MediaSummary,
    pub file_size_bytes: u64,
    pub upload_timestamp: Option<DateTime<Utc>>,
    pub metadata: MediaMetadata,
}

impl MediaDetail {
    pub fn id(&self) -> MediaId {
        self.summary.id
    }

    pub fn media_type(&self) -> MediaType {
        self.summary.media_type
    }

    pub fn video(&self) -> Option<&VideoMetadata> {
        match &self.metadata {
            MediaMetadata::Video(v) => Some(v),
            _ => None,
        }
    }

    /// URL of the original file, used as the initial stream for playback.
    pub fn original_url(&self) -> Option<&str> {
        self.summary.original_url.as_deref()
    }
}

#[derive(Deserialize)]
struct MediaDetailWire {
    id: MediaId,
    filename: String,
    mime_type: String,
    media_type: MediaType,
    status: ProcessingStatus,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    tags: Vec<String>,
    #[serde(default)]
    s3_url: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default, rename = "thumbnail_s3_key")]
    thumbnail_ref: Option<String>,
    #[serde(default)]
    genre: Option<String>,
    #[serde(default)]
    file_size: Option<u64>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    upload_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    image_metadata: Option<ImageMetadata>,
    #[serde(default)]
    video_metadata: Option<VideoMetadata>,
    #[serde(default)]
    audio_metadata: Option<AudioMetadata>,
}

impl TryFrom<MediaDetailWire> for MediaDetail {
    type Error = String;

    fn try_from(wire: MediaDetailWire) -> Result<Self, Self::Error> {
        let mut populated = Vec::new();
        if let Some(image) = wire.image_metadata {
            populated.push(MediaMetadata::Image(image));
        }
        if let Some(video) = wire.video_metadata {
            populated.push(MediaMetadata::Video(video));
        }
        if let Some(audio) = wire.audio_metadata {
            populated.push(MediaMetadata::Audio(audio));
        }
        if populated.len() > 1 {
            return Err(format!(
                "media {} carries {} metadata variants, expected at most one",
                wire.id,
                populated.len()
            ));
        }
        let metadata = match populated.pop() {
            Some(m) if m.media_type() != wire.media_type => {
                return Err(format!(
                    "media {} is {} but carries {} metadata",
                    wire.id,
                    wire.media_type,
                    m.media_type()
                ));
            }
            Some(m) => m,
            None => MediaMetadata::empty_for(wire.media_type),
        };

        let genre = wire
            .genre
            .or_else(|| metadata.genre().map(str::to_string));
        let thumbnail_ref = wire
            .thumbnail_ref
            .or_else(|| metadata.thumbnail_ref().map(str::to_string));
        let uploaded = wire.upload_date.or(wire.created_at);

        Ok(MediaDetail {
            summary: MediaSummary {
                id: wire.id,
                filename: wire.filename,
                mime_type: wire.mime_type,
                media_type: wire.media_type,
                status: wire.status,
                description: wire.description,
                tags: wire.tags,
                thumbnail_ref,
                original_url: wire.s3_url.or(wire.url),
                genre,
                created_at: wire.created_at.or(wire.upload_date),
                updated_at: wire.updated_at,
            },
            file_size_bytes: wire.file_size.unwrap_or_default(),
            upload_timestamp: uploaded,
            metadata,
        })
    }
}
