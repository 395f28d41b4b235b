//! Mock repository implementations for testing
//!
//! These mocks keep everything in memory, count calls per operation and can be told to fail
//! or delay specific requests.

use async_trait::async_trait;
use medialib_core::models::{
    CreateUserRequest, Credentials, MediaDetail, MediaId, MediaPatch, MediaSummary, MediaType,
    ProcessingStatus, ProfileUpdate, TokenResponse, UploadFile, UploadMetadata, User, UserId,
};
use medialib_core::validation::parse_tags;
use medialib_core::{AccountRepository, ClientError, ClientResult, MediaRepository, Page};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::fixtures::detail_for;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Search,
    Upload,
    Detail,
    Update,
    Delete,
    StreamUrl,
}

fn server_error() -> ClientError {
    ClientError::Api {
        status: 500,
        detail: "Internal server error".to_string(),
    }
}

fn not_found() -> ClientError {
    ClientError::Api {
        status: 404,
        detail: "Media not found".to_string(),
    }
}

/// Mock media repository for testing without a server
#[derive(Clone)]
pub struct MockMediaRepository {
    items: Arc<Mutex<BTreeMap<MediaId, MediaSummary>>>,
    details: Arc<Mutex<HashMap<MediaId, MediaDetail>>>,
    next_id: Arc<AtomicI64>,
    calls: Arc<Mutex<HashMap<Operation, usize>>>,
    failing: Arc<Mutex<HashSet<Operation>>>,
    failing_uploads: Arc<Mutex<HashSet<String>>>,
    query_delays: Arc<Mutex<HashMap<String, Duration>>>,
    detail_delays: Arc<Mutex<HashMap<MediaId, Duration>>>,
    stream_delays: Arc<Mutex<HashMap<String, Duration>>>,
    stream_failures: Arc<Mutex<HashSet<String>>>,
    updates: Arc<Mutex<Vec<(MediaId, MediaPatch)>>>,
}

impl Default for MockMediaRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMediaRepository {
    pub fn new() -> Self {
        Self {
            items: Arc::new(Mutex::new(BTreeMap::new())),
            details: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(AtomicI64::new(1000)),
            calls: Arc::new(Mutex::new(HashMap::new())),
            failing: Arc::new(Mutex::new(HashSet::new())),
            failing_uploads: Arc::new(Mutex::new(HashSet::new())),
            query_delays: Arc::new(Mutex::new(HashMap::new())),
            detail_delays: Arc::new(Mutex::new(HashMap::new())),
            stream_delays: Arc::new(Mutex::new(HashMap::new())),
            stream_failures: Arc::new(Mutex::new(HashSet::new())),
            updates: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn add_item(&self, item: MediaSummary) {
        self.items.lock().unwrap().insert(item.id, item);
    }

    pub fn add_detail(&self, detail: MediaDetail) {
        self.add_item(detail.summary.clone());
        self.details.lock().unwrap().insert(detail.id(), detail);
    }

    pub fn call_count(&self, operation: Operation) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(&operation)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    pub fn fail(&self, operation: Operation) {
        self.failing.lock().unwrap().insert(operation);
    }

    pub fn fail_upload_of(&self, filename: &str) {
        self.failing_uploads
            .lock()
            .unwrap()
            .insert(filename.to_string());
    }

    /// Delay list (`""`) or search responses for `query`.
    pub fn set_query_delay(&self, query: &str, delay: Duration) {
        self.query_delays
            .lock()
            .unwrap()
            .insert(query.to_string(), delay);
    }

    pub fn set_detail_delay(&self, id: MediaId, delay: Duration) {
        self.detail_delays.lock().unwrap().insert(id, delay);
    }

    pub fn set_stream_delay(&self, quality: &str, delay: Duration) {
        self.stream_delays
            .lock()
            .unwrap()
            .insert(quality.to_string(), delay);
    }

    pub fn fail_stream(&self, quality: &str) {
        self.stream_failures
            .lock()
            .unwrap()
            .insert(quality.to_string());
    }

    pub fn clear_stream_failures(&self) {
        self.stream_failures.lock().unwrap().clear();
    }

    /// Patches received by `update`, in call order.
    pub fn updates(&self) -> Vec<(MediaId, MediaPatch)> {
        self.updates.lock().unwrap().clone()
    }

    fn record(&self, operation: Operation) -> ClientResult<()> {
        *self.calls.lock().unwrap().entry(operation).or_insert(0) += 1;
        if self.failing.lock().unwrap().contains(&operation) {
            return Err(server_error());
        }
        Ok(())
    }

    async fn delay(delay: Option<Duration>) {
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn page_of(&self, page: Page, filter: impl Fn(&MediaSummary) -> bool) -> Vec<MediaSummary> {
        self.items
            .lock()
            .unwrap()
            .values()
            .rev()
            .filter(|item| filter(item))
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl MediaRepository for MockMediaRepository {
    async fn list(&self, page: Page) -> ClientResult<Vec<MediaSummary>> {
        let delay = self.query_delays.lock().unwrap().get("").copied();
        Self::delay(delay).await;
        self.record(Operation::List)?;
        Ok(self.page_of(page, |_| true))
    }

    async fn search(&self, query: &str, page: Page) -> ClientResult<Vec<MediaSummary>> {
        let delay = self.query_delays.lock().unwrap().get(query).copied();
        Self::delay(delay).await;
        self.record(Operation::Search)?;
        let needle = query.to_lowercase();
        Ok(self.page_of(page, |item| {
            item.filename.to_lowercase().contains(&needle)
                || item.tags.iter().any(|t| t.to_lowercase().contains(&needle))
                || item
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle))
        }))
    }

    async fn upload(
        &self,
        file: &UploadFile,
        metadata: &UploadMetadata,
    ) -> ClientResult<MediaSummary> {
        self.record(Operation::Upload)?;
        if self.failing_uploads.lock().unwrap().contains(&file.filename) {
            return Err(ClientError::Api {
                status: 400,
                detail: format!("Unsupported file: {}", file.filename),
            });
        }

        let media_type = if file.content_type.starts_with("video/") {
            MediaType::Video
        } else if file.content_type.starts_with("audio/") {
            MediaType::Audio
        } else {
            MediaType::Image
        };
        let id = MediaId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let item = MediaSummary {
            id,
            filename: file.filename.clone(),
            mime_type: file.content_type.clone(),
            media_type,
            status: ProcessingStatus::Pending,
            description: metadata.description.clone(),
            tags: metadata.tags.as_deref().map(parse_tags).unwrap_or_default(),
            thumbnail_ref: None,
            original_url: None,
            genre: metadata.genre.clone(),
            created_at: None,
            updated_at: None,
        };
        self.add_item(item.clone());
        Ok(item)
    }

    async fn detail(&self, id: MediaId) -> ClientResult<MediaDetail> {
        let delay = self.detail_delays.lock().unwrap().get(&id).copied();
        Self::delay(delay).await;
        self.record(Operation::Detail)?;
        if let Some(detail) = self.details.lock().unwrap().get(&id) {
            return Ok(detail.clone());
        }
        let summary = self.items.lock().unwrap().get(&id).cloned();
        summary.map(detail_for).ok_or_else(not_found)
    }

    async fn update(&self, id: MediaId, patch: &MediaPatch) -> ClientResult<MediaSummary> {
        self.record(Operation::Update)?;
        self.updates.lock().unwrap().push((id, patch.clone()));

        let mut items = self.items.lock().unwrap();
        let item = items.get_mut(&id).ok_or_else(not_found)?;
        if let Some(filename) = &patch.filename {
            item.filename = filename.clone();
        }
        if let Some(description) = &patch.description {
            item.description = Some(description.clone());
        }
        if let Some(tags) = &patch.tags {
            item.tags = tags.clone();
        }
        if let Some(genre) = &patch.genre {
            item.genre = Some(genre.clone());
        }
        Ok(item.clone())
    }

    async fn delete(&self, id: MediaId) -> ClientResult<()> {
        self.record(Operation::Delete)?;
        self.details.lock().unwrap().remove(&id);
        self.items
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(not_found)
    }

    async fn stream_url(&self, id: MediaId, quality: &str) -> ClientResult<String> {
        self.record(Operation::StreamUrl)?;
        let delay = self.stream_delays.lock().unwrap().get(quality).copied();
        Self::delay(delay).await;
        if self.stream_failures.lock().unwrap().contains(quality) {
            return Err(server_error());
        }
        Ok(format!("https://cdn/{}/{}.mp4", id, quality))
    }
}

#[derive(Debug, Clone)]
struct Account {
    user: User,
    password: String,
}

/// Mock account repository. Logging in with either username or email works.
#[derive(Clone, Default)]
pub struct MockAccountRepository {
    accounts: Arc<Mutex<HashMap<UserId, Account>>>,
    signed_in: Arc<Mutex<Option<UserId>>>,
    calls: Arc<Mutex<HashMap<&'static str, usize>>>,
    failing: Arc<Mutex<HashSet<&'static str>>>,
}

impl MockAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_account(&self, user: User, password: &str) {
        self.accounts.lock().unwrap().insert(
            user.id,
            Account {
                user,
                password: password.to_string(),
            },
        );
    }

    fn stored_user(&self, id: UserId) -> Option<User> {
        self.accounts.lock().unwrap().get(&id).map(|a| a.user.clone())
    }

    pub fn call_count(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(operation)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    pub fn fail(&self, operation: &'static str) {
        self.failing.lock().unwrap().insert(operation);
    }

    fn record(&self, operation: &'static str) -> ClientResult<()> {
        *self.calls.lock().unwrap().entry(operation).or_insert(0) += 1;
        if self.failing.lock().unwrap().contains(operation) {
            return Err(server_error());
        }
        Ok(())
    }

    fn unauthorized() -> ClientError {
        ClientError::Api {
            status: 401,
            detail: "Could not validate credentials".to_string(),
        }
    }

    fn signed_in_id(&self) -> ClientResult<UserId> {
        self.signed_in.lock().unwrap().ok_or_else(Self::unauthorized)
    }
}

#[async_trait]
impl AccountRepository for MockAccountRepository {
    async fn login(&self, credentials: &Credentials) -> ClientResult<TokenResponse> {
        self.record("login")?;
        let accounts = self.accounts.lock().unwrap();
        let account = accounts
            .values()
            .find(|a| {
                (a.user.username == credentials.username || a.user.email == credentials.username)
                    && a.password == credentials.password
            })
            .ok_or_else(|| ClientError::Api {
                status: 401,
                detail: "Incorrect username or password".to_string(),
            })?;
        *self.signed_in.lock().unwrap() = Some(account.user.id);
        Ok(TokenResponse {
            access_token: format!("token-{}", account.user.id),
            token_type: "bearer".to_string(),
        })
    }

    async fn logout(&self) -> ClientResult<()> {
        self.record("logout")?;
        *self.signed_in.lock().unwrap() = None;
        Ok(())
    }

    async fn register(&self, request: &CreateUserRequest) -> ClientResult<User> {
        self.record("register")?;
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.values().any(|a| a.user.username == request.username) {
            return Err(ClientError::Api {
                status: 400,
                detail: "Username already registered".to_string(),
            });
        }
        let id = accounts.keys().max().copied().unwrap_or(0) + 1;
        let user = User {
            id,
            username: request.username.clone(),
            email: request.email.clone(),
            full_name: request.full_name.clone(),
            description: request.description.clone(),
            profile_picture_base64: None,
            profile_picture_content_type: None,
            created_at: None,
            updated_at: None,
        };
        accounts.insert(
            id,
            Account {
                user: user.clone(),
                password: request.password.clone(),
            },
        );
        Ok(user)
    }

    async fn current_user(&self) -> ClientResult<User> {
        self.record("current_user")?;
        let id = self.signed_in_id()?;
        self.stored_user(id).ok_or_else(Self::unauthorized)
    }

    async fn update_user(&self, id: UserId, update: &ProfileUpdate) -> ClientResult<User> {
        self.record("update_user")?;
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts.get_mut(&id).ok_or_else(Self::unauthorized)?;
        let update = update.clone().cleaned();
        if let Some(v) = update.username {
            account.user.username = v;
        }
        if let Some(v) = update.email {
            account.user.email = v;
        }
        if let Some(v) = update.full_name {
            account.user.full_name = v;
        }
        if let Some(v) = update.description {
            account.user.description = Some(v);
        }
        if let Some(v) = update.password {
            account.password = v;
        }
        Ok(account.user.clone())
    }

    async fn upload_profile_picture(&self, file: &UploadFile) -> ClientResult<User> {
        self.record("upload_profile_picture")?;
        let id = self.signed_in_id()?;
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts.get_mut(&id).ok_or_else(Self::unauthorized)?;
        account.user.profile_picture_content_type = Some(file.content_type.clone());
        account.user.profile_picture_base64 = Some(format!("<{} bytes>", file.bytes.len()));
        Ok(account.user.clone())
    }
}
