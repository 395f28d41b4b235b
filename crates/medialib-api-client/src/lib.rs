//! HTTP client for the media library API.
//!
//! Provides a minimal client that reads its bearer token from the shared [`Session`] on
//! every request, generic GET/POST/PUT/PATCH/DELETE helpers, and implementations of the
//! repository traits from `medialib_core` (see [`api`]).

pub mod api;

use anyhow::Context;
use medialib_core::{ClientConfig, ClientError, ClientResult, Session};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// HTTP client for the media API.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Arc<Session>,
}

impl ApiClient {
    pub fn new(base_url: String, session: Arc<Session>, timeout: Duration) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn from_config(config: &ClientConfig, session: Arc<Session>) -> ClientResult<Self> {
        Self::new(
            config.api_url.clone(),
            session,
            Duration::from_secs(config.http_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn apply_auth(&self, request: RequestBuilder) -> RequestBuilder {
        request.header("Authorization", self.session.authorization_header())
    }

    /// Send a request and turn non-2xx responses into [`ClientError::Api`].
    async fn send(&self, request: RequestBuilder, authenticated: bool) -> ClientResult<Response> {
        let request = if authenticated {
            self.apply_auth(request)
        } else {
            request
        };

        let response = request.send().await.map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = error_detail(&body);
            tracing::debug!(status = status.as_u16(), %detail, "API request rejected");
            return Err(ClientError::Api {
                status: status.as_u16(),
                detail,
            });
        }

        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
        let bytes = response.bytes().await.map_err(transport_error)?;
        serde_json::from_slice(&bytes).map_err(|e| {
            ClientError::Decode(format!("Failed to parse response as JSON: {}", e))
        })
    }

    /// GET request with optional query parameters. Deserializes JSON response.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ClientResult<T> {
        let mut request = self.client.get(self.build_url(path));
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = self.send(request, true).await?;
        Self::decode(response).await
    }

    /// POST JSON body and deserialize response.
    pub async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        authenticated: bool,
    ) -> ClientResult<T> {
        let request = self.client.post(self.build_url(path)).json(body);
        let response = self.send(request, authenticated).await?;
        Self::decode(response).await
    }

    /// POST with no body and deserialize response.
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let request = self.client.post(self.build_url(path));
        let response = self.send(request, true).await?;
        Self::decode(response).await
    }

    /// POST multipart form and deserialize response.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
        authenticated: bool,
    ) -> ClientResult<T> {
        let request = self.client.post(self.build_url(path)).multipart(form);
        let response = self.send(request, authenticated).await?;
        Self::decode(response).await
    }

    /// PUT JSON body and deserialize response.
    pub async fn put_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let request = self.client.put(self.build_url(path)).json(body);
        let response = self.send(request, true).await?;
        Self::decode(response).await
    }

    /// PATCH JSON body and deserialize response.
    pub async fn patch_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let request = self.client.patch(self.build_url(path)).json(body);
        let response = self.send(request, true).await?;
        Self::decode(response).await
    }

    /// DELETE request. Returns Ok(()) on any 2xx; the body is ignored.
    pub async fn delete(&self, path: &str) -> ClientResult<()> {
        let request = self.client.delete(self.build_url(path));
        self.send(request, true).await?;
        Ok(())
    }
}

fn transport_error(err: reqwest::Error) -> ClientError {
    if err.is_decode() {
        ClientError::Decode(err.to_string())
    } else {
        ClientError::Transport(err.to_string())
    }
}

/// Extract the server's `{ "detail": ... }` message. Bodies that are not JSON map to
/// "Network error"; JSON without a usable detail maps to "Request failed".
pub(crate) fn error_detail(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => match value.get("detail") {
            Some(serde_json::Value::String(s)) if !s.is_empty() => s.clone(),
            Some(serde_json::Value::Null) | None => "Request failed".to_string(),
            Some(other) => other.to_string(),
        },
        Err(_) => "Network error".to_string(),
    }
}
