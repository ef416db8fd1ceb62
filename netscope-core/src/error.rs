//! Error types for netscope-core

use thiserror::Error;

/// Errors raised while moving records across a context boundary
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Failed to serialize record: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Malformed payload: {0}")]
    MalformedPayload(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_payload_displays_source() {
        let source = serde_json::from_str::<u32>("nope").unwrap_err();
        let error = CoreError::MalformedPayload(source);
        assert!(error.to_string().starts_with("Malformed payload"));
    }
}
