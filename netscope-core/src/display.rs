//! Formatting helpers for consumers rendering records
//!
//! Rendering itself lives with the consumer. These helpers pin down the
//! formatting contract so every consumer shows bodies and statuses the
//! same way: anything that is not structured data falls back to raw text.

use crate::record::{Body, CapturedRequest, Status};

/// Placeholder shown for an absent body or trace
pub const NOT_AVAILABLE: &str = "N/A";

/// Broad classification of a status for badge styling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Ok,
    Error,
    Other,
}

impl StatusClass {
    pub fn of(status: Option<&Status>) -> Self {
        match status {
            Some(Status::Code(code)) if (200..300).contains(code) => Self::Ok,
            Some(Status::Code(code)) if (400..600).contains(code) => Self::Error,
            Some(Status::Error) => Self::Error,
            _ => Self::Other,
        }
    }
}

/// Status text for a badge, `"???"` when unknown
pub fn status_label(status: Option<&Status>) -> String {
    status.map_or_else(|| "???".to_string(), Status::to_string)
}

/// Pretty-print a body, falling back to the raw text
pub fn format_body(body: Option<&Body>) -> String {
    match body {
        None => NOT_AVAILABLE.to_string(),
        Some(Body::Text(text)) => format_text(text),
        Some(Body::Json(value)) => {
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
    }
}

/// Pretty-print text when it parses as JSON, otherwise return it unchanged
pub fn format_text(text: &str) -> String {
    serde_json::from_str::<serde_json::Value>(text)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| text.to_string())
}

/// Whole milliseconds, empty when no time elapsed
pub fn format_duration(duration_ms: f64) -> String {
    if duration_ms > 0.0 {
        format!("{duration_ms:.0}ms")
    } else {
        String::new()
    }
}

/// One-line summary: kind, status, method and url
pub fn summary(record: &CapturedRequest) -> String {
    format!(
        "{} {} {} {}",
        record.kind,
        status_label(Some(&record.status)),
        record.method,
        record.url
    )
}
