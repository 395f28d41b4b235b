//! Data models for the client
//!
//! Wire shapes follow the media API; anything that branches on media type is decoded once
//! here so consumers match on enums instead of comparing strings.

mod detail;
mod media;
mod notification;
mod patch;
mod timestamp;
mod upload;
mod user;

pub use detail::{AudioMetadata, ImageMetadata, MediaDetail, MediaMetadata, VideoMetadata};
pub use media::{
    MediaId, MediaListResponse, MediaSummary, MediaType, ProcessingStatus, StreamUrlResponse,
};
pub use notification::{Notification, NotificationKind, DEFAULT_NOTIFICATION_TTL};
pub use patch::{EditForm, MediaPatch};
pub use upload::{UploadFile, UploadMetadata};
pub use user::{
    CreateUserRequest, Credentials, MessageResponse, ProfileUpdate, Registration, TokenResponse,
    User, UserId,
};
