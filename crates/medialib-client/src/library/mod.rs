//! Library controller.
//!
//! Owns the visible working set and is the single entry point for list, search, upload,
//! edit and delete. Every mutation is followed by a reload from the server; the controller
//! never patches its working set locally. Outcomes are reported through the [`Notifier`].
//!
//! State lives behind a `Mutex` so methods can take `&self`. The lock is never held across
//! an await.

use futures::future::join_all;
use medialib_core::models::{
    EditForm, MediaDetail, MediaId, MediaSummary, ProcessingStatus, UploadFile, UploadMetadata,
};
use medialib_core::{ClientConfig, ClientError, ClientResult, MediaRepository, Page};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::notifier::Notifier;
use crate::playback::PlaybackSession;


/// Dashboard counters over the working set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LibraryStats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub failed: usize,
}

impl LibraryStats {
    pub fn from_items(items: &[MediaSummary]) -> Self {
        items.iter().fold(Self::default(), |mut stats, item| {
            stats.total += 1;
            if item.status.is_in_progress() {
                stats.in_progress += 1;
            } else if item.status == ProcessingStatus::Completed {
                stats.completed += 1;
            } else if item.status == ProcessingStatus::Failed {
                stats.failed += 1;
            }
            stats
        })
    }
}

/// The detail view currently open, with its playback session for videos.
#[derive(Debug, Clone)]
pub struct OpenItem {
    pub detail: MediaDetail,
    pub playback: Option<Arc<PlaybackSession>>,
}

#[derive(Debug, Default)]
struct LibraryState {
    items: Vec<MediaSummary>,
    query: String,
    loads_in_flight: usize,
    uploads_in_flight: usize,
    /// Last generation handed out to a load.
    load_generation: u64,
    /// Generation of the response currently shown.
    applied_generation: u64,
    open_generation: u64,
    editing: Option<MediaSummary>,
    open: Option<OpenItem>,
}

#[derive(Clone, Copy)]
enum Activity {
    Loading,
    Uploading,
}

/// Marks an activity as in flight until dropped, so the flag clears on every exit path.
struct ActivityGuard<'a> {
    state: &'a Mutex<LibraryState>,
    activity: Activity,
}

impl<'a> ActivityGuard<'a> {
    fn start(state: &'a Mutex<LibraryState>, activity: Activity) -> Self {
        let mut s = lock(state);
        match activity {
            Activity::Loading => s.loads_in_flight += 1,
            Activity::Uploading => s.uploads_in_flight += 1,
        }
        drop(s);
        Self { state, activity }
    }
}

impl Drop for ActivityGuard<'_> {
    fn drop(&mut self) {
        let mut s = lock(self.state);
        match self.activity {
            Activity::Loading => s.loads_in_flight = s.loads_in_flight.saturating_sub(1),
            Activity::Uploading => s.uploads_in_flight = s.uploads_in_flight.saturating_sub(1),
        }
    }
}

fn lock(state: &Mutex<LibraryState>) -> MutexGuard<'_, LibraryState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct LibraryController {
    repo: Arc<dyn MediaRepository>,
    notifier: Notifier,
    page_size: u32,
    state: Mutex<LibraryState>,
}

impl LibraryController {
    pub fn new(repo: Arc<dyn MediaRepository>, notifier: Notifier, page_size: u32) -> Self {
        Self {
            repo,
            notifier,
            page_size: page_size.max(1),
            state: Mutex::new(LibraryState::default()),
        }
    }

    pub fn from_config(
        repo: Arc<dyn MediaRepository>,
        notifier: Notifier,
        config: &ClientConfig,
    ) -> Self {
        Self::new(repo, notifier, config.page_size)
    }

    fn state(&self) -> MutexGuard<'_, LibraryState> {
        lock(&self.state)
    }

    // ----- read accessors -----

    pub fn items(&self) -> Vec<MediaSummary> {
        self.state().items.clone()
    }

    pub fn query(&self) -> String {
        self.state().query.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state().loads_in_flight > 0
    }

    pub fn is_uploading(&self) -> bool {
        self.state().uploads_in_flight > 0
    }

    pub fn editing(&self) -> Option<MediaSummary> {
        self.state().editing.clone()
    }

    pub fn open_item(&self) -> Option<OpenItem> {
        self.state().open.clone()
    }

    pub fn playback(&self) -> Option<Arc<PlaybackSession>> {
        self.state().open.as_ref().and_then(|o| o.playback.clone())
    }

    pub fn stats(&self) -> LibraryStats {
        LibraryStats::from_items(&self.state().items)
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn notification(&self) -> Option<medialib_core::models::Notification> {
        self.notifier.current()
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    // ----- operations -----

    /// Replace the working set with the first page of the listing, or of the search results
    /// when `query` is non-blank.
    ///
    /// On failure the previous working set is kept. A response older than the one already
    /// shown is dropped, and a failure of a load that has since been superseded is silent.
    pub async fn load(&self, query: Option<&str>) -> ClientResult<()> {
        let query = query.map(str::trim).filter(|q| !q.is_empty());
        let generation = {
            let mut s = self.state();
            s.load_generation += 1;
            s.load_generation
        };
        let _loading = ActivityGuard::start(&self.state, Activity::Loading);

        let page = Page::first(self.page_size);
        tracing::debug!(generation, query = query.unwrap_or(""), "loading media");
        let result = match query {
            Some(q) => self.repo.search(q, page).await,
            None => self.repo.list(page).await,
        };

        match result {
            Ok(items) => {
                let mut s = self.state();
                if generation < s.applied_generation {
                    tracing::debug!(
                        generation,
                        applied = s.applied_generation,
                        "discarding stale load response"
                    );
                    return Ok(());
                }
                tracing::info!(generation, count = items.len(), "media loaded");
                s.applied_generation = generation;
                s.items = items;
                Ok(())
            }
            Err(err) => {
                let latest = self.state().load_generation;
                if generation < latest {
                    tracing::debug!(
                        generation,
                        latest,
                        error = %err,
                        "discarding stale load failure"
                    );
                    return Ok(());
                }
                err.log("load_media");
                self.notifier
                    .error(format!("Failed to load media: {}", err.client_message()));
                Err(err)
            }
        }
    }

    /// Reload with the active query.
    pub async fn refresh(&self) -> ClientResult<()> {
        let query = self.query();
        self.load(Some(&query)).await
    }

    /// Set the active query and load it. A blank query is the unfiltered listing.
    pub async fn search(&self, query: &str) -> ClientResult<()> {
        let query = query.trim().to_string();
        self.state().query = query.clone();
        self.load(Some(&query)).await
    }

    /// Upload `files` with shared metadata. All requests are issued together and the batch
    /// succeeds only if every file does. Returns the number of files uploaded.
    pub async fn upload(
        &self,
        files: Vec<UploadFile>,
        metadata: UploadMetadata,
    ) -> ClientResult<usize> {
        if files.is_empty() {
            return Err(ClientError::Validation(
                "Select at least one file to upload".to_string(),
            ));
        }

        let uploading = ActivityGuard::start(&self.state, Activity::Uploading);
        tracing::debug!(count = files.len(), "uploading batch");

        let results = join_all(files.iter().map(|file| self.repo.upload(file, &metadata))).await;

        let mut first_error = None;
        for (file, result) in files.iter().zip(results) {
            match result {
                Ok(created) => {
                    tracing::debug!(filename = %file.filename, id = %created.id, "file uploaded")
                }
                Err(err) => {
                    tracing::warn!(filename = %file.filename, error = %err, "file upload failed");
                    first_error.get_or_insert(err);
                }
            }
        }
        drop(uploading);

        if let Some(err) = first_error {
            err.log("upload_media");
            self.notifier
                .error(format!("Failed to upload files: {}", err.client_message()));
            return Err(err);
        }

        let count = files.len();
        tracing::info!(count, "upload batch completed");
        self.notifier
            .success(format!("{} file(s) uploaded successfully", count));
        // Reload failures notify on their own; the upload itself succeeded.
        let _ = self.refresh().await;
        Ok(count)
    }

    /// Open the edit form for an item of the working set or the open detail view.
    pub fn begin_edit(&self, id: MediaId) -> ClientResult<EditForm> {
        let mut s = self.state();
        let item = find_item(&s, id)
            .ok_or_else(|| ClientError::NotFound(format!("Media {} is not loaded", id)))?;
        let form = EditForm::from_summary(&item);
        s.editing = Some(item);
        Ok(form)
    }

    pub fn cancel_edit(&self) {
        self.state().editing = None;
    }

    /// Apply an edit form to item `id`. On success the edit form closes and the working set
    /// is reloaded; on failure the form stays open.
    pub async fn edit(&self, id: MediaId, form: &EditForm) -> ClientResult<MediaSummary> {
        let media_type = {
            let s = self.state();
            find_item(&s, id)
                .map(|item| item.media_type)
                .ok_or_else(|| ClientError::NotFound(format!("Media {} is not loaded", id)))?
        };

        let patch = form.to_patch(media_type);
        if patch.is_empty() {
            return Err(ClientError::Validation("Nothing to update".to_string()));
        }

        tracing::debug!(%id, ?patch, "updating media");
        match self.repo.update(id, &patch).await {
            Ok(updated) => {
                tracing::info!(%id, "media updated");
                self.notifier.success("Media updated successfully");
                self.state().editing = None;
                let _ = self.refresh().await;
                Ok(updated)
            }
            Err(err) => {
                err.log("update_media");
                self.notifier
                    .error(format!("Failed to update media: {}", err.client_message()));
                Err(err)
            }
        }
    }

    /// Delete item `id`. Callers confirm with the user first.
    pub async fn delete(&self, id: MediaId) -> ClientResult<()> {
        tracing::debug!(%id, "deleting media");
        if let Err(err) = self.repo.delete(id).await {
            err.log("delete_media");
            self.notifier
                .error(format!("Failed to delete file: {}", err.client_message()));
            return Err(err);
        }

        tracing::info!(%id, "media deleted");
        self.notifier.success("File deleted successfully");
        {
            let mut s = self.state();
            if s.editing.as_ref().is_some_and(|e| e.id == id) {
                s.editing = None;
            }
        }
        let open_id = self.state().open.as_ref().map(|o| o.detail.id());
        if open_id == Some(id) {
            self.close();
        }
        let _ = self.refresh().await;
        Ok(())
    }

    /// Fetch the detail of `id` and make it the open view. Videos get a playback session.
    pub async fn open(&self, id: MediaId) -> ClientResult<OpenItem> {
        let generation = {
            let mut s = self.state();
            s.open_generation += 1;
            s.open_generation
        };

        let detail = match self.repo.detail(id).await {
            Ok(detail) => detail,
            Err(err) => {
                if self.state().open_generation != generation {
                    tracing::debug!(%id, error = %err, "discarding superseded detail failure");
                    return Err(err);
                }
                err.log("media_detail");
                self.notifier.error(format!(
                    "Failed to load media details: {}",
                    err.client_message()
                ));
                return Err(err);
            }
        };

        let playback = PlaybackSession::from_detail(self.repo.clone(), &detail).map(Arc::new);
        let item = OpenItem { detail, playback };

        let previous = {
            let mut s = self.state();
            if s.open_generation != generation {
                tracing::debug!(%id, "discarding superseded detail response");
                if let Some(playback) = &item.playback {
                    playback.close();
                }
                return Ok(item);
            }
            s.open.replace(item.clone())
        };
        if let Some(playback) = previous.and_then(|p| p.playback) {
            playback.close();
        }

        tracing::info!(%id, media_type = %item.detail.media_type(), "media opened");
        Ok(item)
    }

    /// Close the open detail view, if any, invalidating its playback session.
    pub fn close(&self) {
        let previous = {
            let mut s = self.state();
            s.open_generation += 1;
            s.open.take()
        };
        if let Some(item) = previous {
            tracing::debug!(id = %item.detail.id(), "media closed");
            if let Some(playback) = item.playback {
                playback.close();
            }
        }
    }
}

fn find_item(state: &LibraryState, id: MediaId) -> Option<MediaSummary> {
    state
        .items
        .iter()
        .find(|item| item.id == id)
        .cloned()
        .or_else(|| {
            state
                .open
                .as_ref()
                .filter(|o| o.detail.id() == id)
                .map(|o| o.detail.summary.clone())
        })
}
