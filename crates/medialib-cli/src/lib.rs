use clap::ValueEnum;
use medialib_client::LibraryStats;
use medialib_core::models::{MediaSummary, Notification, NotificationKind};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

pub fn to_pretty_json(value: &impl Serialize) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Fixed-width listing of the working set.
pub fn render_media_table(items: &[MediaSummary]) -> String {
    if items.is_empty() {
        return "No media found.\n".to_string();
    }

    let mut out = format!(
        "{:<8} {:<40} {:<6} {:<11} {:<30} {:<10}\n",
        "ID", "Filename", "Type", "Status", "Tags", "Created"
    );
    out.push_str(&"-".repeat(110));
    out.push('\n');
    for item in items {
        let created = item
            .created_at
            .map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "{:<8} {:<40} {:<6} {:<11} {:<30} {:<10}\n",
            item.id.to_string(),
            truncate_string(&item.filename, 40),
            item.media_type.to_string(),
            item.status.to_string(),
            truncate_string(&item.tags.join(", "), 30),
            created
        ));
    }
    out
}

pub fn render_stats(stats: &LibraryStats) -> String {
    format!(
        "Total:       {:>6}\nCompleted:   {:>6}\nIn progress: {:>6}\nFailed:      {:>6}\n",
        stats.total, stats.completed, stats.in_progress, stats.failed
    )
}

/// One-line rendering of a notification for stderr.
pub fn render_notification(notification: &Notification) -> String {
    let label = match notification.kind {
        NotificationKind::Success => "ok",
        NotificationKind::Error => "error",
        NotificationKind::Info => "info",
        NotificationKind::Warning => "warning",
    };
    format!("[{}] {}", label, notification.message)
}
