//! Session state: the loaded document, the transcript and per-operation
//! request status.
//!
//! [`SessionState`] is a plain synchronous state machine. Every transition the
//! controller performs goes through one of its `begin_*` / `complete_*`
//! methods, so the rules below can be tested without a runtime or a backend:
//!
//! * a new upload clears the document and the transcript before the request
//!   is sent, so a failed upload never leaves the previous text behind;
//! * a query is refused locally unless the document is ready and the prompt
//!   has visible characters;
//! * a successful query appends exactly two turns, user then AI;
//! * a completion is applied only if its [`Ticket`] is still the newest one
//!   issued for that operation (and, for queries, only if no upload has
//!   started since).

use crate::error::{InsightsError, TransportError};
use crate::file::PdfFile;
use crate::gateway::{QueryResponse, UploadResponse};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two operations a session can issue against the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Upload,
    Query,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Upload => f.write_str("upload"),
            Operation::Query => f.write_str("query"),
        }
    }
}

/// Per-operation request state used to drive spinners and error banners.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    Idle,
    InFlight,
    Failed(String),
}

impl RequestStatus {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, RequestStatus::InFlight)
    }

    /// The failure message, if the last attempt failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            RequestStatus::Failed(msg) => Some(msg),
            _ => None,
        }
    }
}

/// Token accounting reported by the backend for one AI response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

/// One transcript entry.
///
/// Serialises without a type tag: a user turn is `{"user_prompt": ..}` and an
/// AI turn is `{"ai_response": .., "model_used": .., "usage": ..}`, so the
/// variant is recovered from which fields are present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Turn {
    User {
        #[serde(rename = "user_prompt")]
        text: String,
    },
    Ai {
        #[serde(rename = "ai_response")]
        text: String,
        #[serde(rename = "model_used")]
        model: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        usage: Option<Usage>,
    },
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Turn::User { text: text.into() }
    }

    pub fn text(&self) -> &str {
        match self {
            Turn::User { text } | Turn::Ai { text, .. } => text,
        }
    }

    pub fn is_user(&self) -> bool {
        matches!(self, Turn::User { .. })
    }
}

impl From<QueryResponse> for Turn {
    fn from(r: QueryResponse) -> Self {
        Turn::Ai {
            text: r.ai_response,
            model: r.model_used,
            usage: r.usage,
        }
    }
}

/// The currently loaded document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSession {
    pub extracted_text: Option<String>,
    pub is_ready: bool,
    /// Name reported by the backend, or the local file name.
    pub file_name: Option<String>,
}

impl DocumentSession {
    /// Number of characters of extracted text (0 when nothing is loaded).
    pub fn char_count(&self) -> usize {
        self.extracted_text
            .as_deref()
            .map(|t| t.chars().count())
            .unwrap_or(0)
    }
}

/// Identifies one started operation.
///
/// `seq` is the per-operation sequence number; `generation` counts accepted
/// uploads and ties a query to the document it was asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub operation: Operation,
    pub seq: u64,
    pub generation: u64,
}

/// Immutable copy of the whole session, handed to renderers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub document: DocumentSession,
    pub transcript: Vec<Turn>,
    pub upload: RequestStatus,
    pub query: RequestStatus,
    pub draft: String,
}

#[derive(Debug, Default)]
pub struct SessionState {
    document: DocumentSession,
    transcript: Vec<Turn>,
    upload: RequestStatus,
    query: RequestStatus,
    draft: String,
    upload_seq: u64,
    query_seq: u64,
    generation: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document(&self) -> &DocumentSession {
        &self.document
    }

    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    pub fn status(&self, operation: Operation) -> &RequestStatus {
        match operation {
            Operation::Upload => &self.upload,
            Operation::Query => &self.query,
        }
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            document: self.document.clone(),
            transcript: self.transcript.clone(),
            upload: self.upload.clone(),
            query: self.query.clone(),
            draft: self.draft.clone(),
        }
    }

    /// Record a failure that happened before any request was sent.
    ///
    /// While a request of the same kind is still pending its status stays
    /// `InFlight`; that request's outcome decides what is shown next.
    pub fn reject(&mut self, operation: Operation, error: &InsightsError) {
        let status = self.status_mut(operation);
        if !status.is_in_flight() {
            *status = RequestStatus::Failed(error.to_string());
        }
    }

    fn fail(&mut self, operation: Operation, error: &InsightsError) {
        *self.status_mut(operation) = RequestStatus::Failed(error.to_string());
    }

    /// Validate `file` and open a fresh document session for it.
    ///
    /// On success the previous document and transcript are gone and any
    /// in-flight upload or query is now stale.
    pub fn begin_upload(&mut self, file: &PdfFile) -> Result<Ticket, InsightsError> {
        if !file.is_pdf() {
            let err = InsightsError::InvalidFileType {
                file_name: file.name.clone(),
                content_type: file.content_type.clone(),
            };
            self.reject(Operation::Upload, &err);
            return Err(err);
        }

        self.upload_seq += 1;
        self.generation += 1;
        self.document = DocumentSession::default();
        self.transcript.clear();
        self.upload = RequestStatus::InFlight;
        self.query = RequestStatus::Idle;

        Ok(Ticket {
            operation: Operation::Upload,
            seq: self.upload_seq,
            generation: self.generation,
        })
    }

    /// Apply the outcome of the upload identified by `ticket`.
    pub fn complete_upload(
        &mut self,
        ticket: Ticket,
        local_name: &str,
        result: Result<UploadResponse, TransportError>,
    ) -> Result<DocumentSession, InsightsError> {
        if ticket.seq != self.upload_seq {
            return Err(InsightsError::Superseded {
                operation: Operation::Upload,
            });
        }

        match result {
            Ok(resp) => {
                self.document = DocumentSession {
                    extracted_text: Some(resp.extracted_text),
                    is_ready: true,
                    file_name: Some(resp.filename.unwrap_or_else(|| local_name.to_string())),
                };
                self.upload = RequestStatus::Idle;
                Ok(self.document.clone())
            }
            Err(e) => {
                let err = InsightsError::Upload {
                    message: e.to_string(),
                };
                // begin_upload already cleared the document; keep it that way.
                self.document = DocumentSession::default();
                self.fail(Operation::Upload, &err);
                Err(err)
            }
        }
    }

    /// Validate `prompt` against the current document and mark a query in flight.
    pub fn begin_query(&mut self, prompt: &str) -> Result<Ticket, InsightsError> {
        let refusal = if !self.document.is_ready {
            Some(InsightsError::DocumentNotReady)
        } else if prompt.trim().is_empty() {
            Some(InsightsError::EmptyPrompt)
        } else {
            None
        };
        if let Some(err) = refusal {
            self.reject(Operation::Query, &err);
            return Err(err);
        }

        self.query_seq += 1;
        self.query = RequestStatus::InFlight;

        Ok(Ticket {
            operation: Operation::Query,
            seq: self.query_seq,
            generation: self.generation,
        })
    }

    /// Apply the outcome of the query identified by `ticket`.
    ///
    /// Returns the appended AI turn.
    pub fn complete_query(
        &mut self,
        ticket: Ticket,
        prompt: String,
        result: Result<QueryResponse, TransportError>,
    ) -> Result<Turn, InsightsError> {
        if ticket.seq != self.query_seq || ticket.generation != self.generation {
            return Err(InsightsError::Superseded {
                operation: Operation::Query,
            });
        }

        match result {
            Ok(resp) => {
                let ai = Turn::from(resp);
                self.transcript.push(Turn::User { text: prompt });
                self.transcript.push(ai.clone());
                self.draft.clear();
                self.query = RequestStatus::Idle;
                Ok(ai)
            }
            Err(e) => {
                let err = InsightsError::Query {
                    message: e.to_string(),
                };
                self.fail(Operation::Query, &err);
                Err(err)
            }
        }
    }

    /// Drop the document and transcript; every in-flight request goes stale.
    pub fn reset(&mut self) {
        self.upload_seq += 1;
        self.query_seq += 1;
        self.generation += 1;
        self.document = DocumentSession::default();
        self.transcript.clear();
        self.upload = RequestStatus::Idle;
        self.query = RequestStatus::Idle;
        self.draft.clear();
    }

    fn status_mut(&mut self, operation: Operation) -> &mut RequestStatus {
        match operation {
            Operation::Upload => &mut self.upload,
            Operation::Query => &mut self.query,
        }
    }
}
