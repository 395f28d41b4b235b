use serde::{Deserialize, Serialize};
use std::path::{Component, Path};

use crate::error::{ClientError, ClientResult};
use crate::validation::non_blank;

/// A file selected for upload, already read into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        let filename = filename.into();
        let content_type = mime_guess::from_path(&filename)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Self {
            filename,
            content_type,
            bytes,
        }
    }

    /// Read a local file. Paths containing `..` are rejected.
    pub fn from_path(path: impl AsRef<Path>) -> ClientResult<Self> {
        let path = path.as_ref();
        if path.components().any(|c| c == Component::ParentDir) {
            return Err(ClientError::Validation(format!(
                "Invalid path: {}",
                path.display()
            )));
        }
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                ClientError::Validation(format!("Path has no file name: {}", path.display()))
            })?
            .to_string();
        let bytes = std::fs::read(path).map_err(|e| {
            ClientError::Validation(format!("Failed to read file {}: {}", path.display(), e))
        })?;
        Ok(Self::new(filename, bytes))
    }
}

/// Metadata shared by every file of one upload batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadMetadata {
    pub description: Option<String>,
    /// Comma-separated tag text, forwarded as typed.
    pub tags: Option<String>,
    pub genre: Option<String>,
}

impl UploadMetadata {
    /// Multipart text fields to send alongside the file; blank values are skipped.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();
        if let Some(description) = self.description.as_deref().and_then(non_blank) {
            fields.push(("description", description));
        }
        if let Some(tags) = self.tags.as_deref().and_then(non_blank) {
            fields.push(("tags", tags));
        }
        if let Some(genre) = self.genre.as_deref().and_then(non_blank) {
            fields.push(("genre", genre));
        }
        fields
    }
}
