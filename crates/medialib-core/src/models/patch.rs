use serde::{Deserialize, Serialize};

use super::media::{MediaSummary, MediaType};
use crate::validation::{non_blank, parse_tags};

/// Partial metadata update (`PUT /media/{id}`). `None` fields are left untouched server-side
/// and are omitted from the request body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
}

impl MediaPatch {
    pub fn is_empty(&self) -> bool {
        self.filename.is_none()
            && self.description.is_none()
            && self.tags.is_none()
            && self.genre.is_none()
    }
}

/// Raw text of the edit form, as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditForm {
    pub filename: String,
    pub description: String,
    /// Comma-separated tags.
    pub tags: String,
    pub genre: String,
}

impl EditForm {
    /// Pre-fill the form from an existing item.
    pub fn from_summary(item: &MediaSummary) -> Self {
        Self {
            filename: item.filename.clone(),
            description: item.description.clone().unwrap_or_default(),
            tags: item.tags.join(", "),
            genre: item.genre.clone().unwrap_or_default(),
        }
    }

    /// Build the outgoing patch. Blank inputs are omitted rather than sent as empty strings,
    /// and genre is dropped entirely for media types that do not carry one.
    pub fn to_patch(&self, media_type: MediaType) -> MediaPatch {
        let tags = parse_tags(&self.tags);
        MediaPatch {
            filename: non_blank(&self.filename),
            description: non_blank(&self.description),
            tags: if tags.is_empty() { None } else { Some(tags) },
            genre: if media_type.supports_genre() {
                non_blank(&self.genre)
            } else {
                None
            },
        }
    }
}
