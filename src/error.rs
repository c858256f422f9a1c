//! Error types for the pdf-insights library.
//!
//! Two distinct error types reflect two distinct layers:
//!
//! * [`TransportError`] — raised by the API gateway when a single HTTP
//!   exchange fails (connection refused, non-2xx status, undecodable body).
//!   It always carries a message fit to show a user.
//!
//! * [`InsightsError`] — raised by the session controller at the operation
//!   boundary. Local validation failures (wrong file type, empty prompt,
//!   document not ready) are caught before any network call; gateway
//!   failures are folded into [`InsightsError::Upload`] or
//!   [`InsightsError::Query`].
//!
//! None of these are fatal: every failure leaves the session consistent and
//! retriable. The controller also copies the message into the matching
//! [`crate::session::RequestStatus`] so a view can show it.

use crate::session::Operation;
use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of an [`InsightsError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected locally, no request was sent.
    Validation,
    /// The backend could not be reached or answered with an error.
    Transport,
    /// A newer operation of the same kind finished the race.
    Stale,
    /// Client configuration is unusable.
    Config,
}

/// Operation-level errors returned by [`crate::controller::SessionController`].
#[derive(Debug, Error)]
pub enum InsightsError {
    // ── Validation errors ─────────────────────────────────────────────────
    /// The selected file is not a PDF.
    #[error("Invalid file type. Please select a PDF file.")]
    InvalidFileType {
        file_name: String,
        content_type: String,
    },

    /// The prompt was empty or whitespace only.
    #[error("Prompt cannot be empty.")]
    EmptyPrompt,

    /// No document has been uploaded and processed yet.
    #[error("Please upload and process a PDF first.")]
    DocumentNotReady,

    /// Local file was not found.
    #[error("File not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// Process lacks read permission on the local file.
    #[error("Permission denied reading '{path}'")]
    PermissionDenied { path: PathBuf },

    /// Any other I/O failure while reading the local file.
    #[error("Failed to read '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Transport errors ──────────────────────────────────────────────────
    /// The upload request failed.
    #[error("{message}")]
    Upload { message: String },

    /// The query request failed.
    #[error("{message}")]
    Query { message: String },

    // ── Race ──────────────────────────────────────────────────────────────
    /// The completion arrived after a newer operation was started and was
    /// discarded without touching the session.
    #[error("{operation} result discarded: a newer request superseded it")]
    Superseded { operation: Operation },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl InsightsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            InsightsError::InvalidFileType { .. }
            | InsightsError::EmptyPrompt
            | InsightsError::DocumentNotReady
            | InsightsError::FileNotFound { .. }
            | InsightsError::PermissionDenied { .. }
            | InsightsError::FileRead { .. } => ErrorKind::Validation,
            InsightsError::Upload { .. } | InsightsError::Query { .. } => ErrorKind::Transport,
            InsightsError::Superseded { .. } => ErrorKind::Stale,
            InsightsError::InvalidConfig(_) => ErrorKind::Config,
        }
    }

    /// True when the operation was refused before any network call.
    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }
}

/// A failed HTTP exchange with the extraction backend.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The request never produced a response (DNS, refused, reset).
    #[error("Could not reach server at {url}: {reason}")]
    Connect { url: String, reason: String },

    /// The server answered with a non-2xx status.
    ///
    /// `message` has already been extracted from the error body following
    /// the gateway's message policy.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// A 2xx response whose body did not match the expected shape.
    #[error("Unexpected response from server: {reason}")]
    Decode { reason: String },

    /// The request could not be built (bad multipart part, bad URL).
    #[error("Could not build request: {reason}")]
    Request { reason: String },
}

impl TransportError {
    /// HTTP status code, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_match_ui_copy() {
        let e = InsightsError::InvalidFileType {
            file_name: "notes.txt".into(),
            content_type: "text/plain".into(),
        };
        assert_eq!(e.to_string(), "Invalid file type. Please select a PDF file.");
        assert_eq!(InsightsError::EmptyPrompt.to_string(), "Prompt cannot be empty.");
        assert_eq!(
            InsightsError::DocumentNotReady.to_string(),
            "Please upload and process a PDF first."
        );
    }

    #[test]
    fn kinds_are_classified() {
        assert_eq!(InsightsError::EmptyPrompt.kind(), ErrorKind::Validation);
        assert!(InsightsError::DocumentNotReady.is_validation());
        assert_eq!(
            InsightsError::Upload {
                message: "boom".into()
            }
            .kind(),
            ErrorKind::Transport
        );
        assert_eq!(
            InsightsError::Superseded {
                operation: Operation::Query
            }
            .kind(),
            ErrorKind::Stale
        );
        assert_eq!(
            InsightsError::InvalidConfig("x".into()).kind(),
            ErrorKind::Config
        );
    }

    #[test]
    fn transport_message_is_passed_through() {
        let e = InsightsError::Query {
            message: "Rate limit exceeded".into(),
        };
        assert_eq!(e.to_string(), "Rate limit exceeded");
    }

    #[test]
    fn transport_status_accessor() {
        let e = TransportError::Status {
            status: 503,
            message: "down".into(),
        };
        assert_eq!(e.status(), Some(503));
        assert_eq!(e.to_string(), "down");

        let e = TransportError::Connect {
            url: "http://localhost:8000/upload".into(),
            reason: "connection refused".into(),
        };
        assert_eq!(e.status(), None);
        assert!(e.to_string().contains("localhost:8000"));
    }

    #[test]
    fn superseded_display_names_operation() {
        let e = InsightsError::Superseded {
            operation: Operation::Upload,
        };
        assert!(e.to_string().starts_with("upload"), "got: {e}");
    }
}
