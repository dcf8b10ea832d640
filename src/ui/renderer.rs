// Renderer module - formatting utilities shared by the layout code

use chrono::{DateTime, Local, Utc};

/// Format an event timestamp (fractional epoch seconds) for display
pub fn format_timestamp(timestamp: f64) -> String {
    match DateTime::<Utc>::from_timestamp(timestamp.floor() as i64, 0) {
        Some(dt) => dt.with_timezone(&Local).format("%H:%M:%S").to_string(),
        None => "N/A".to_string(),
    }
}

/// Format a model accuracy fraction as a percentage
pub fn format_accuracy(accuracy: f64) -> String {
    format!("{:.2}%", accuracy * 100.0)
}

/// Format a silhouette score
pub fn format_silhouette(score: f64) -> String {
    format!("{:.3}", score)
}
