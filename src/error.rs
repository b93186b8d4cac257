//! Unified error type for the vodforge pipeline.
//!
//! All subsystems funnel their failures into [`Error`]. Cache failures are
//! deliberately absent: both cache variants degrade to a miss (reads) or a
//! dropped write and never surface an error to callers.

use std::fmt;

/// Unified error type covering all failure modes in vodforge.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested entity could not be found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "genre", "movie").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// The upstream metadata provider failed or was unreachable.
    #[error("Upstream error: {message}")]
    Upstream {
        /// Human-readable description including the request path.
        message: String,
    },

    /// An external tool (ffmpeg, ffprobe) returned an error.
    #[error("Tool error [{tool}]: {message}")]
    Tool {
        /// Name of the tool that failed.
        tool: String,
        /// Human-readable error description, including captured stderr.
        message: String,
    },

    /// Media probing output could not be parsed.
    #[error("Probe error: {0}")]
    Probe(String),

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// An object-store operation failed after all retries.
    #[error("Storage error [{operation}]: {message}")]
    Storage {
        /// The storage operation that failed (e.g. "list", "delete").
        operation: String,
        /// Human-readable error description.
        message: String,
    },

    /// A subtitle track could not be parsed or rewritten.
    #[error("Subtitle error: {0}")]
    Subtitle(String),

    /// Configuration could not be loaded or failed validation.
    #[error("Config error: {0}")]
    Config(String),

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Error::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Convenience constructor for [`Error::Upstream`].
    pub fn upstream(message: impl Into<String>) -> Self {
        Error::Upstream {
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::Tool`].
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::Storage`].
    pub fn storage(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Storage {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
