// ABOUTME: Error types for feed rendering, serialization and output.
// ABOUTME: Provides FeedError enum with Render, Serialize, Invalid, and Write variants.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur while turning video records into a written feed.
#[derive(Debug, Error)]
pub enum FeedError {
    /// A record could not be mapped to a feed entry (e.g. unparseable timestamp).
    #[error("failed to render entry {id}: {reason}")]
    Render { id: String, reason: String },

    /// The XML or JSON writer failed.
    #[error("failed to serialize feed: {0}")]
    Serialize(String),

    /// Configuration or produced document is not valid.
    #[error("invalid feed: {0}")]
    Invalid(String),

    /// The output could not be persisted.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FeedError {
    /// Creates a Render error for the given video id.
    pub fn render(id: impl Into<String>, reason: impl Into<String>) -> Self {
        FeedError::Render {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Creates a Serialize error from an underlying writer error.
    pub fn serialize(err: impl fmt::Display) -> Self {
        FeedError::Serialize(err.to_string())
    }

    /// Creates an Invalid error with a custom message.
    pub fn invalid(msg: impl Into<String>) -> Self {
        FeedError::Invalid(msg.into())
    }

    /// Creates a Write error for the given output path.
    pub fn write(path: &Path, source: io::Error) -> Self {
        FeedError::Write {
            path: path.to_path_buf(),
            source,
        }
    }
}
