//! Error types for viewsync.
//!
//! This module defines the error taxonomy using `thiserror` for structured error
//! handling. Errors compose via `?` and `From` conversions.
//!
//! # Error Hierarchy
//!
//! - [`ViewError`] - Top-level error for the binary and host setup code
//!   - [`CodecError`] - Malformed JSON in a URL parameter or storage payload
//!   - [`StorageError`] - Durable storage writes that failed (quota, I/O)
//!   - [`ConfigError`](crate::config::ConfigError) - Configuration loading failures
//!   - [`LoggingError`](crate::logging::LoggingError) - Tracing initialization failures
//!
//! # Error Recovery Strategy
//!
//! Codec and storage errors are **non-fatal** inside the state managers: a decode
//! failure falls back to the raw string (URL) or to the default payload (storage),
//! and a failed write is logged while the in-memory state stays authoritative.
//! The worst outcome is losing persistence, never losing the current view.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;
use crate::logging::LoggingError;

/// Top-level error encompassing all failure modes surfaced to a host.
///
/// State managers never return these; they are produced by setup code
/// (configuration, logging, opening a storage file) and by the CLI.
///
/// # Examples
///
/// ```
/// use viewsync::model::error::{CodecError, ViewError};
///
/// fn decode_order(raw: &str) -> Result<Vec<String>, ViewError> {
///     // CodecError converts into ViewError via From
///     let order = serde_json::from_str(raw).map_err(CodecError::malformed)?;
///     Ok(order)
/// }
/// assert!(decode_order("not json").is_err());
/// ```
#[derive(Debug, Error)]
pub enum ViewError {
    /// A payload could not be encoded or decoded.
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// Durable storage rejected a read or write.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Tracing could not be initialized.
    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),
}

/// Errors produced while converting state to or from its serialized form.
///
/// **Recovery**: URL values fall back to the raw parameter string; storage
/// payloads fall back to the manager's default payload. Never propagated to
/// the view.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Input was not valid JSON or did not match the expected shape.
    ///
    /// Covers truncated writes, hand-edited URLs and payloads written by an
    /// older, incompatible version.
    #[error("Malformed payload: {source}")]
    Malformed {
        /// Underlying `serde_json` failure.
        #[source]
        source: serde_json::Error,
    },

    /// A value could not be serialized.
    #[error("Failed to encode payload: {source}")]
    Encode {
        /// Underlying `serde_json` failure.
        #[source]
        source: serde_json::Error,
    },
}

impl CodecError {
    /// Wrap a decode failure.
    pub fn malformed(source: serde_json::Error) -> Self {
        Self::Malformed { source }
    }

    /// Wrap an encode failure.
    pub fn encode(source: serde_json::Error) -> Self {
        Self::Encode { source }
    }
}

/// Errors from a durable storage backend.
///
/// **Recovery**: logged once per failed write; the session keeps working with
/// in-memory state only ("this session only" persistence).
#[derive(Debug, Error)]
pub enum StorageError {
    /// Writing the item would exceed the backend's byte quota.
    ///
    /// # Examples
    ///
    /// ```
    /// use viewsync::model::error::StorageError;
    ///
    /// let err = StorageError::QuotaExceeded {
    ///     key: "column-sizing-users".to_string(),
    ///     needed: 2048,
    ///     quota: 1024,
    /// };
    /// assert!(err.to_string().contains("column-sizing-users"));
    /// ```
    #[error("Storage quota exceeded writing {key}: needs {needed} bytes, quota is {quota}")]
    QuotaExceeded {
        /// Key that was being written.
        key: String,
        /// Total bytes the store would hold after the write.
        needed: usize,
        /// Configured quota in bytes.
        quota: usize,
    },

    /// The backend is not usable at all (disabled, private mode, ...).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// File-backed storage failed to read or write its file.
    #[error("Storage I/O error at {path:?}: {source}")]
    Io {
        /// Path of the backing file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The store's contents could not be serialized.
    #[error("Storage codec error: {0}")]
    Codec(#[from] CodecError),
}
