//! # Live Error Types
//!
//! Error types for everything outside the pure core.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │    Realtime     │  │     Rate Limiting       │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  InvalidPayload │  │  RateLimited            │ │
//! │  │  ConfigLoad…    │  │  ChannelClosed  │  │                         │ │
//! │  │  ConfigSave…    │  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for live operations.
pub type LiveResult<T> = Result<T, LiveError>;

#[derive(Debug, Error)]
pub enum LiveError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Realtime Errors
    // =========================================================================
    /// A change notification could not be decoded.
    #[error("Invalid change payload: {0}")]
    InvalidPayload(String),

    /// Nobody is listening on the change feed any more.
    #[error("Change feed closed")]
    ChannelClosed,

    // =========================================================================
    // Rate Limiting
    // =========================================================================
    #[error("Too many requests from {key}, retry in {retry_after_secs}s")]
    RateLimited { key: String, retry_after_secs: u64 },
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<serde_json::Error> for LiveError {
    fn from(err: serde_json::Error) -> Self {
        LiveError::InvalidPayload(err.to_string())
    }
}

impl From<std::io::Error> for LiveError {
    fn from(err: std::io::Error) -> Self {
        LiveError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for LiveError {
    fn from(err: toml::de::Error) -> Self {
        LiveError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for LiveError {
    fn from(err: toml::ser::Error) -> Self {
        LiveError::ConfigSaveFailed(err.to_string())
    }
}

impl LiveError {
    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            LiveError::InvalidConfig(_)
                | LiveError::ConfigLoadFailed(_)
                | LiveError::ConfigSaveFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LiveError::RateLimited {
            key: "203.0.113.7".into(),
            retry_after_secs: 12,
        };
        assert_eq!(err.to_string(), "Too many requests from 203.0.113.7, retry in 12s");
    }

    #[test]
    fn test_json_error_becomes_invalid_payload() {
        let err: LiveError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, LiveError::InvalidPayload(_)));
        assert!(!err.is_config_error());
    }

    #[test]
    fn test_toml_error_is_config_error() {
        let err: LiveError = toml::from_str::<toml::Value>("= broken").unwrap_err().into();
        assert!(err.is_config_error());
    }
}
