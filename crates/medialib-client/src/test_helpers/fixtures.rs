use medialib_core::models::{
    AudioMetadata, ImageMetadata, MediaDetail, MediaId, MediaMetadata, MediaSummary, MediaType,
    ProcessingStatus, User, VideoMetadata,
};
use std::collections::BTreeMap;

pub fn sample_summary(id: i64, filename: &str, media_type: MediaType) -> MediaSummary {
    let mime_type = match media_type {
        MediaType::Image => "image/jpeg",
        MediaType::Video => "video/mp4",
        MediaType::Audio => "audio/mpeg",
    };
    MediaSummary {
        id: MediaId(id),
        filename: filename.to_string(),
        mime_type: mime_type.to_string(),
        media_type,
        status: ProcessingStatus::Completed,
        description: None,
        tags: Vec::new(),
        thumbnail_ref: None,
        original_url: None,
        genre: None,
        created_at: None,
        updated_at: None,
    }
}

/// Detail for a summary, with empty metadata of the matching kind.
pub fn detail_for(summary: MediaSummary) -> MediaDetail {
    let metadata = match summary.media_type {
        MediaType::Image => MediaMetadata::Image(ImageMetadata::default()),
        MediaType::Video => MediaMetadata::Video(VideoMetadata::default()),
        MediaType::Audio => MediaMetadata::Audio(AudioMetadata::default()),
    };
    MediaDetail {
        summary,
        file_size_bytes: 1024,
        upload_timestamp: None,
        metadata,
    }
}

/// Video detail offering 480p/720p/1080p at `https://cdn/v{id}_{quality}.mp4`.
pub fn sample_video_detail(id: i64, original_url: Option<&str>) -> MediaDetail {
    let mut summary = sample_summary(id, &format!("clip-{}.mp4", id), MediaType::Video);
    summary.original_url = original_url.map(str::to_string);

    let available_qualities: BTreeMap<String, String> = ["480p", "720p", "1080p"]
        .iter()
        .map(|q| (q.to_string(), format!("https://cdn/v{}_{}.mp4", id, q)))
        .collect();

    MediaDetail {
        summary,
        file_size_bytes: 10 * 1024 * 1024,
        upload_timestamp: None,
        metadata: MediaMetadata::Video(VideoMetadata {
            duration_sec: Some(42.0),
            available_qualities,
            ..Default::default()
        }),
    }
}

pub fn sample_user(id: i64) -> User {
    User {
        id,
        username: format!("user{}", id),
        email: format!("user{}@example.com", id),
        full_name: format!("User {}", id),
        description: None,
        profile_picture_base64: None,
        profile_picture_content_type: None,
        created_at: None,
        updated_at: None,
    }
}
