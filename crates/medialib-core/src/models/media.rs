use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

use super::timestamp;

/// Server-assigned media identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaId(pub i64);

impl Display for MediaId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for MediaId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(MediaId)
    }
}

/// Media type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MediaType {
    #[serde(alias = "image")]
    Image,
    #[serde(alias = "video")]
    Video,
    #[serde(alias = "audio")]
    Audio,
}

impl MediaType {
    /// Genre is only meaningful (and editable) for time-based media.
    pub fn supports_genre(self) -> bool {
        matches!(self, MediaType::Video | MediaType::Audio)
    }
}

impl Display for MediaType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            MediaType::Image => write!(f, "image"),
            MediaType::Video => write!(f, "video"),
            MediaType::Audio => write!(f, "audio"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProcessingStatus {
    #[serde(alias = "pending")]
    Pending,
    #[serde(alias = "processing")]
    Processing,
    #[serde(alias = "completed")]
    Completed,
    #[serde(alias = "failed")]
    Failed,
}

impl ProcessingStatus {
    pub fn is_in_progress(self) -> bool {
        matches!(self, ProcessingStatus::Pending | ProcessingStatus::Processing)
    }
}

impl Display for ProcessingStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ProcessingStatus::Pending => write!(f, "pending"),
            ProcessingStatus::Processing => write!(f, "processing"),
            ProcessingStatus::Completed => write!(f, "completed"),
            ProcessingStatus::Failed => write!(f, "failed"),
        }
    }
}

/// One entry of the library listing (`GET /media`, `GET /media/search`).
///
/// Servers name the original URL `s3_url` or `url`, and the creation time `created_at` or
/// `upload_date`, sometimes both in one payload. Decoding goes through [`MediaSummaryWire`]
/// so either spelling is accepted and the first present wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "MediaSummaryWire")]
pub struct MediaSummary {
    pub id: MediaId,
    pub filename: String,
    pub mime_type: String,
    pub media_type: MediaType,
    pub status: ProcessingStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub tags: Vec<String>,
    #[serde(rename = "thumbnail_s3_key", skip_serializing_if = "Option::is_none")]
    pub thumbnail_ref: Option<String>,
    #[serde(rename = "s3_url", skip_serializing_if = "Option::is_none")]
    pub original_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct MediaSummaryWire {
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
    thumbnail_s3_key: Option<String>,
    #[serde(default)]
    s3_url: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    genre: Option<String>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    upload_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    updated_at: Option<DateTime<Utc>>,
}

impl From<MediaSummaryWire> for MediaSummary {
    fn from(wire: MediaSummaryWire) -> Self {
        Self {
            id: wire.id,
            filename: wire.filename,
            mime_type: wire.mime_type,
            media_type: wire.media_type,
            status: wire.status,
            description: wire.description,
            tags: wire.tags,
            thumbnail_ref: wire.thumbnail_s3_key,
            original_url: wire.s3_url.or(wire.url),
            genre: wire.genre,
            created_at: wire.created_at.or(wire.upload_date),
            updated_at: wire.updated_at,
        }
    }
}

/// List/search response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaListResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub media: Vec<MediaSummary>,
}

/// Stream URL resolution response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamUrlResponse {
    pub url: String,
}

pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_accepts_either_case_and_missing_optionals() {
        let json = serde_json::json!({
            "id": 7,
            "filename": "clip.mp4",
            "mime_type": "video/mp4",
            "media_type": "video",
            "status": "COMPLETED",
            "tags": null,
            "url": "https://cdn.example.com/clip.mp4",
            "created_at": "2024-01-02T03:04:05"
        });
        let summary: MediaSummary = serde_json::from_value(json).unwrap();
        assert_eq!(summary.id, MediaId(7));
        assert_eq!(summary.media_type, MediaType::Video);
        assert_eq!(summary.status, ProcessingStatus::Completed);
        assert!(summary.tags.is_empty());
        assert_eq!(
            summary.original_url.as_deref(),
            Some("https://cdn.example.com/clip.mp4")
        );
        assert!(summary.created_at.is_some());
        assert_eq!(summary.genre, None);
    }

    #[test]
    fn summary_accepts_both_url_and_date_spellings_at_once() {
        let json = serde_json::json!({
            "id": 8,
            "filename": "a.png",
            "mime_type": "image/png",
            "media_type": "IMAGE",
            "status": "PENDING",
            "s3_url": "https://cdn.example.com/a.png",
            "url": "https://mirror.example.com/a.png",
            "upload_date": "2024-05-01T00:00:00Z",
            "created_at": "2024-01-01T00:00:00Z"
        });
        let summary: MediaSummary = serde_json::from_value(json).unwrap();
        assert_eq!(
            summary.original_url.as_deref(),
            Some("https://cdn.example.com/a.png")
        );
        assert_eq!(
            summary.created_at.unwrap().to_rfc3339(),
            "2024-01-01T00:00:00+00:00"
        );
    }

    #[test]
    fn summary_falls_back_to_upload_date() {
        let json = serde_json::json!({
            "id": 9,
            "filename": "b.png",
            "mime_type": "image/png",
            "media_type": "IMAGE",
            "status": "COMPLETED",
            "upload_date": "2024-05-01T00:00:00Z"
        });
        let summary: MediaSummary = serde_json::from_value(json).unwrap();
        assert!(summary.created_at.is_some());
        assert_eq!(summary.original_url, None);
    }

    #[test]
    fn status_helpers() {
        assert!(ProcessingStatus::Pending.is_in_progress());
        assert!(ProcessingStatus::Processing.is_in_progress());
        assert!(!ProcessingStatus::Completed.is_in_progress());
        assert_eq!(ProcessingStatus::Failed.to_string(), "failed");
    }

    #[test]
    fn genre_support_by_type() {
        assert!(!MediaType::Image.supports_genre());
        assert!(MediaType::Video.supports_genre());
        assert!(MediaType::Audio.supports_genre());
    }

    #[test]
    fn media_id_parses_from_cli_input() {
        assert_eq!(" 42 ".parse::<MediaId>().unwrap(), MediaId(42));
        assert!("abc".parse::<MediaId>().is_err());
    }
}
