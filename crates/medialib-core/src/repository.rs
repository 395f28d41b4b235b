//! Repository contracts consumed by the controllers.
//!
//! The HTTP client implements both traits; tests substitute in-memory implementations.
//! Implementations are stateless request functions: no caching, no retries.

use async_trait::async_trait;

use crate::error::ClientResult;
use crate::models::{
    CreateUserRequest, Credentials, MediaDetail, MediaId, MediaPatch, MediaSummary,
    ProfileUpdate, TokenResponse, UploadFile, UploadMetadata, User, UserId,
};

/// Pagination window for list and search calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: u32,
    pub limit: u32,
}

impl Page {
    pub fn first(limit: u32) -> Self {
        Self { offset: 0, limit }
    }
}

#[async_trait]
pub trait MediaRepository: Send + Sync {
    async fn list(&self, page: Page) -> ClientResult<Vec<MediaSummary>>;

    async fn search(&self, query: &str, page: Page) -> ClientResult<Vec<MediaSummary>>;

    async fn upload(
        &self,
        file: &UploadFile,
        metadata: &UploadMetadata,
    ) -> ClientResult<MediaSummary>;

    async fn detail(&self, id: MediaId) -> ClientResult<MediaDetail>;

    async fn update(&self, id: MediaId, patch: &MediaPatch) -> ClientResult<MediaSummary>;

    async fn delete(&self, id: MediaId) -> ClientResult<()>;

    /// Resolve a playable URL for one quality variant of a video.
    async fn stream_url(&self, id: MediaId, quality: &str) -> ClientResult<String>;
}

#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> ClientResult<TokenResponse>;

    async fn logout(&self) -> ClientResult<()>;

    async fn register(&self, request: &CreateUserRequest) -> ClientResult<User>;

    async fn current_user(&self) -> ClientResult<User>;

    async fn update_user(&self, id: UserId, update: &ProfileUpdate) -> ClientResult<User>;

    async fn upload_profile_picture(&self, file: &UploadFile) -> ClientResult<User>;
}
