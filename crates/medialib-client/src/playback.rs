//! Quality switching for one open video.
//!
//! Every switch request is stamped with a token from a monotonically increasing counter and
//! only the latest issued token may apply its response. A slow response for a superseded
//! quality is therefore dropped instead of overwriting the user's newer choice. Closing the
//! session invalidates every outstanding token.

use medialib_core::models::{MediaDetail, MediaId};
use medialib_core::{ClientError, ClientResult, MediaRepository};
use serde::Serialize;
use std::cmp::Ordering;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Quality assumed when the media exposes no labels at all.
pub const DEFAULT_QUALITY: &str = "1080p";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum PlaybackPhase {
    Ready {
        quality: String,
        url: String,
    },
    Switching {
        from: String,
        to: String,
    },
    Error {
        message: String,
        last_good_quality: String,
        last_good_url: String,
    },
}

/// Snapshot of a session. `selected_quality` and `active_stream_url` always describe the
/// stream that is actually playing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaybackState {
    pub media_id: MediaId,
    pub selected_quality: String,
    pub active_stream_url: String,
    pub phase: PlaybackPhase,
    pub pending_request_token: Option<u64>,
}

/// Issued by [`PlaybackSession::begin_switch`]; hand it back to
/// [`PlaybackSession::complete_switch`] together with the resolved URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchTicket {
    pub token: u64,
    pub media_id: MediaId,
    pub quality: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchOutcome {
    /// Nothing to do: the quality is already playing or already being fetched.
    Unchanged,
    Applied,
    Failed,
    /// A newer request (or `close`) superseded this one.
    Discarded,
}

#[derive(Debug)]
struct Inner {
    state: PlaybackState,
    last_token: u64,
    closed: bool,
}

pub struct PlaybackSession {
    repo: Arc<dyn MediaRepository>,
    qualities: Vec<String>,
    inner: Mutex<Inner>,
}

impl std::fmt::Debug for PlaybackSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackSession")
            .field("qualities", &self.qualities)
            .field("inner", &self.inner)
            .finish()
    }
}

impl PlaybackSession {
    pub fn new(
        repo: Arc<dyn MediaRepository>,
        media_id: MediaId,
        qualities: impl IntoIterator<Item = String>,
        initial_url: impl Into<String>,
    ) -> Self {
        let qualities = sort_qualities(qualities);
        let initial_url = initial_url.into();
        let quality = initial_quality(&qualities, &initial_url);

        tracing::debug!(%media_id, %quality, available = ?qualities, "playback session created");

        Self {
            repo,
            qualities,
            inner: Mutex::new(Inner {
                state: PlaybackState {
                    media_id,
                    selected_quality: quality.clone(),
                    active_stream_url: initial_url.clone(),
                    phase: PlaybackPhase::Ready {
                        quality,
                        url: initial_url,
                    },
                    pending_request_token: None,
                },
                last_token: 0,
                closed: false,
            }),
        }
    }

    /// Build a session for a video detail. Returns `None` for images and audio.
    ///
    /// Playback starts on the original URL; when the server did not send one the URL of the
    /// initial quality is used instead.
    pub fn from_detail(repo: Arc<dyn MediaRepository>, detail: &MediaDetail) -> Option<Self> {
        let video = detail.video()?;
        let qualities: Vec<String> = video.available_qualities.keys().cloned().collect();
        let initial_url = match detail.original_url() {
            Some(url) => url.to_string(),
            None => {
                let sorted = sort_qualities(qualities.clone());
                let quality = initial_quality(&sorted, "");
                video
                    .available_qualities
                    .get(&quality)
                    .cloned()
                    .unwrap_or_default()
            }
        };
        Some(Self::new(repo, detail.id(), qualities, initial_url))
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn media_id(&self) -> MediaId {
        self.inner().state.media_id
    }

    /// Available labels, highest resolution first.
    pub fn qualities(&self) -> &[String] {
        &self.qualities
    }

    pub fn state(&self) -> PlaybackState {
        self.inner().state.clone()
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.inner().state.phase.clone()
    }

    pub fn selected_quality(&self) -> String {
        self.inner().state.selected_quality.clone()
    }

    pub fn active_stream_url(&self) -> String {
        self.inner().state.active_stream_url.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.inner().closed
    }

    /// Switch to `quality`, resolving its stream URL through the repository.
    ///
    /// Concurrent calls are allowed; whichever was issued last decides the final state.
    pub async fn select_quality(&self, quality: &str) -> ClientResult<SwitchOutcome> {
        let Some(ticket) = self.begin_switch(quality)? else {
            return Ok(SwitchOutcome::Unchanged);
        };

        tracing::debug!(
            media_id = %ticket.media_id,
            quality = %ticket.quality,
            token = ticket.token,
            "resolving stream url"
        );
        let result = self.repo.stream_url(ticket.media_id, &ticket.quality).await;
        Ok(self.complete_switch(&ticket, result))
    }

    /// First half of a switch: validate the label and issue a token.
    ///
    /// Returns `Ok(None)` when no request is needed. Unknown labels are rejected.
    pub fn begin_switch(&self, quality: &str) -> ClientResult<Option<SwitchTicket>> {
        if !self.qualities.iter().any(|q| q == quality) {
            return Err(ClientError::Validation(format!(
                "Quality '{}' is not available for this video",
                quality
            )));
        }

        let mut inner = self.inner();
        if inner.closed {
            tracing::debug!(quality, "ignoring quality selection on closed session");
            return Ok(None);
        }

        let already_requested = match &inner.state.phase {
            PlaybackPhase::Ready { quality: current, .. } => current == quality,
            PlaybackPhase::Switching { to, .. } => to == quality,
            PlaybackPhase::Error { .. } => false,
        };
        if already_requested {
            return Ok(None);
        }

        let playing = inner.state.selected_quality.clone();
        if playing == quality {
            // Back to what is already playing: supersede any pending request without
            // going to the network.
            inner.last_token += 1;
            let url = inner.state.active_stream_url.clone();
            inner.state.pending_request_token = None;
            inner.state.phase = PlaybackPhase::Ready {
                quality: playing,
                url,
            };
            return Ok(None);
        }

        inner.last_token += 1;
        let token = inner.last_token;
        inner.state.pending_request_token = Some(token);
        inner.state.phase = PlaybackPhase::Switching {
            from: playing,
            to: quality.to_string(),
        };

        Ok(Some(SwitchTicket {
            token,
            media_id: inner.state.media_id,
            quality: quality.to_string(),
        }))
    }

    /// Second half of a switch: apply `result` if `ticket` is still the latest request.
    pub fn complete_switch(
        &self,
        ticket: &SwitchTicket,
        result: ClientResult<String>,
    ) -> SwitchOutcome {
        let mut inner = self.inner();
        if inner.closed || inner.state.pending_request_token != Some(ticket.token) {
            tracing::debug!(
                quality = %ticket.quality,
                token = ticket.token,
                latest = inner.last_token,
                "discarding stale stream response"
            );
            return SwitchOutcome::Discarded;
        }

        inner.state.pending_request_token = None;
        match result {
            Ok(url) => {
                tracing::info!(
                    media_id = %ticket.media_id,
                    from = %inner.state.selected_quality,
                    to = %ticket.quality,
                    "quality switched"
                );
                inner.state.selected_quality = ticket.quality.clone();
                inner.state.active_stream_url = url.clone();
                inner.state.phase = PlaybackPhase::Ready {
                    quality: ticket.quality.clone(),
                    url,
                };
                SwitchOutcome::Applied
            }
            Err(err) => {
                err.log("select_quality");
                inner.state.phase = PlaybackPhase::Error {
                    message: format!(
                        "Could not load {} stream: {}",
                        ticket.quality,
                        err.client_message()
                    ),
                    last_good_quality: inner.state.selected_quality.clone(),
                    last_good_url: inner.state.active_stream_url.clone(),
                };
                SwitchOutcome::Failed
            }
        }
    }

    /// Invalidate the token stream and settle on the last good stream. Responses that arrive
    /// afterwards are discarded.
    pub fn close(&self) {
        let mut inner = self.inner();
        if inner.closed {
            return;
        }
        inner.closed = true;
        inner.last_token += 1;
        inner.state.pending_request_token = None;
        inner.state.phase = PlaybackPhase::Ready {
            quality: inner.state.selected_quality.clone(),
            url: inner.state.active_stream_url.clone(),
        };
        tracing::debug!(media_id = %inner.state.media_id, "playback session closed");
    }
}

/// Leading run of digits in a label, e.g. `1080` for `"1080p"`.
fn resolution_of(label: &str) -> Option<u32> {
    let digits: String = label
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

fn compare_labels(a: &str, b: &str) -> Ordering {
    match (resolution_of(a), resolution_of(b)) {
        (Some(x), Some(y)) => y.cmp(&x).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Sort labels by resolution, highest first. Labels without a number go last,
/// alphabetically. Duplicates are removed.
pub fn sort_qualities(labels: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut labels: Vec<String> = labels.into_iter().collect();
    labels.sort_by(|a, b| compare_labels(a, b));
    labels.dedup();
    labels
}

/// Pick the quality that `initial_url` already plays. `sorted` must come from
/// [`sort_qualities`].
pub fn initial_quality(sorted: &[String], initial_url: &str) -> String {
    sorted
        .iter()
        .find(|q| !initial_url.is_empty() && initial_url.contains(q.as_str()))
        .or_else(|| sorted.first())
        .cloned()
        .unwrap_or_else(|| DEFAULT_QUALITY.to_string())
}
