//! Domain methods for the API client.
//!
//! [`ApiClient`] implements both repository traits so controllers depend only on
//! `medialib_core`.

use async_trait::async_trait;
use medialib_core::models::{
    CreateUserRequest, Credentials, MediaDetail, MediaId, MediaListResponse, MediaPatch,
    MediaSummary, MessageResponse, ProfileUpdate, StreamUrlResponse, TokenResponse, UploadFile,
    UploadMetadata, User, UserId,
};
use medialib_core::{AccountRepository, ClientError, ClientResult, MediaRepository, Page};
use reqwest::multipart::{Form, Part};

use crate::ApiClient;

const LOGIN: &str = "/auth/token";
const LOGOUT: &str = "/auth/logout";
const USERS: &str = "/users";
const USER_ME: &str = "/users/me";
const USER_PROFILE_PICTURE: &str = "/users/me/profile-picture";
const MEDIA: &str = "/media";
const MEDIA_UPLOAD: &str = "/media/upload";
const MEDIA_SEARCH: &str = "/media/search";

fn media_by_id(id: MediaId) -> String {
    format!("{}/{}", MEDIA, id)
}

fn media_stream(id: MediaId, quality: &str) -> String {
    format!("{}/{}/stream/{}", MEDIA, id, urlencoding::encode(quality))
}

fn user_by_id(id: UserId) -> String {
    format!("{}/{}", USERS, id)
}

fn page_query(page: Page) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if page.offset > 0 {
        query.push(("offset", page.offset.to_string()));
    }
    query.push(("limit", page.limit.to_string()));
    query
}

fn file_part(file: &UploadFile) -> ClientResult<Part> {
    Part::bytes(file.bytes.clone())
        .file_name(file.filename.clone())
        .mime_str(&file.content_type)
        .map_err(|_| {
            ClientError::Validation(format!(
                "Invalid content type '{}' for {}",
                file.content_type, file.filename
            ))
        })
}

#[async_trait]
impl MediaRepository for ApiClient {
    async fn list(&self, page: Page) -> ClientResult<Vec<MediaSummary>> {
        let response: MediaListResponse = self.get(MEDIA, &page_query(page)).await?;
        Ok(response.media)
    }

    async fn search(&self, query: &str, page: Page) -> ClientResult<Vec<MediaSummary>> {
        let mut params = vec![("q", query.to_string())];
        params.extend(page_query(page));
        let response: MediaListResponse = self.get(MEDIA_SEARCH, &params).await?;
        Ok(response.media)
    }

    async fn upload(
        &self,
        file: &UploadFile,
        metadata: &UploadMetadata,
    ) -> ClientResult<MediaSummary> {
        let mut form = Form::new().part("file", file_part(file)?);
        for (name, value) in metadata.form_fields() {
            form = form.text(name, value);
        }
        tracing::debug!(filename = %file.filename, size = file.bytes.len(), "uploading media");
        self.post_multipart(MEDIA_UPLOAD, form, true).await
    }

    async fn detail(&self, id: MediaId) -> ClientResult<MediaDetail> {
        self.get(&media_by_id(id), &[]).await
    }

    async fn update(&self, id: MediaId, patch: &MediaPatch) -> ClientResult<MediaSummary> {
        self.put_json(&media_by_id(id), patch).await
    }

    async fn delete(&self, id: MediaId) -> ClientResult<()> {
        ApiClient::delete(self, &media_by_id(id)).await
    }

    async fn stream_url(&self, id: MediaId, quality: &str) -> ClientResult<String> {
        let response: StreamUrlResponse = self.get(&media_stream(id, quality), &[]).await?;
        Ok(response.url)
    }
}

#[async_trait]
impl AccountRepository for ApiClient {
    async fn login(&self, credentials: &Credentials) -> ClientResult<TokenResponse> {
        let form = Form::new()
            .text("username", credentials.username.clone())
            .text("password", credentials.password.clone());
        self.post_multipart(LOGIN, form, false).await
    }

    async fn logout(&self) -> ClientResult<()> {
        let _: MessageResponse = self.post_empty(LOGOUT).await?;
        Ok(())
    }

    async fn register(&self, request: &CreateUserRequest) -> ClientResult<User> {
        self.post_json(USERS, request, false).await
    }

    async fn current_user(&self) -> ClientResult<User> {
        self.get(USER_ME, &[]).await
    }

    async fn update_user(&self, id: UserId, update: &ProfileUpdate) -> ClientResult<User> {
        let body = update.clone().cleaned();
        self.patch_json(&user_by_id(id), &body).await
    }

    async fn upload_profile_picture(&self, file: &UploadFile) -> ClientResult<User> {
        let form = Form::new().part("file", file_part(file)?);
        self.post_multipart(USER_PROFILE_PICTURE, form, true).await
    }
}
