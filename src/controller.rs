//! Session controller: the two user-facing operations.
//!
//! [`SessionController::submit_file`] and [`SessionController::submit_query`]
//! take `&self`, so a UI can have both (or two of the same) in flight at once.
//! Each one locks the state to begin, releases the lock while the gateway
//! call is pending, and relocks to apply the result. A result is only applied
//! if no newer request of the same kind has been started in the meantime; see
//! [`crate::session::SessionState`] for the rules.

use crate::config::ClientConfig;
use crate::error::InsightsError;
use crate::file::PdfFile;
use crate::gateway::{HttpGateway, SharedApi};
use crate::progress::{NoopObserver, ObserverRef};
use crate::session::{
    DocumentSession, Operation, RequestStatus, SessionSnapshot, SessionState, Turn,
};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Owns the document/transcript state and talks to the backend.
pub struct SessionController {
    api: SharedApi,
    observer: ObserverRef,
    state: Mutex<SessionState>,
}

impl SessionController {
    /// Create a controller over any [`crate::gateway::DocumentApi`].
    pub fn new(api: SharedApi) -> Self {
        Self {
            api,
            observer: Arc::new(NoopObserver),
            state: Mutex::new(SessionState::new()),
        }
    }

    /// Create a controller talking HTTP to the backend described by `config`.
    pub fn from_config(config: &ClientConfig) -> Result<Self, InsightsError> {
        Ok(Self::new(Arc::new(HttpGateway::new(config)?)))
    }

    /// Attach an observer for start/complete/error events.
    pub fn with_observer(mut self, observer: ObserverRef) -> Self {
        self.observer = observer;
        self
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        // Poisoning is ignored: every critical section is one whole transition.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Upload ───────────────────────────────────────────────────────────

    /// Upload `file` and make it the current document.
    ///
    /// # Errors
    /// * [`InsightsError::InvalidFileType`] — not a PDF; nothing was sent and
    ///   the current document is kept
    /// * [`InsightsError::Upload`] — the backend failed; the session is left
    ///   with no document
    /// * [`InsightsError::Superseded`] — a newer upload (or a reset) started
    ///   while this one was pending; its result was dropped
    pub async fn submit_file(&self, file: PdfFile) -> Result<DocumentSession, InsightsError> {
        let begun = self.lock().begin_upload(&file);
        let ticket = match begun {
            Ok(t) => t,
            Err(e) => {
                warn!("Upload refused: {} ({})", e, file.content_type);
                self.observer.on_upload_error(&e.to_string());
                return Err(e);
            }
        };

        info!("Uploading {} ({} bytes)", file.name, file.len());
        self.observer.on_upload_start(&file.name, file.len());

        let result = self.api.upload(&file).await;
        let outcome = self.lock().complete_upload(ticket, &file.name, result);

        match &outcome {
            Ok(doc) => {
                let name = doc.file_name.as_deref().unwrap_or(&file.name);
                info!("Document ready: {} ({} chars)", name, doc.char_count());
                self.observer.on_upload_complete(name, doc.char_count());
            }
            Err(InsightsError::Superseded { operation }) => {
                debug!("Discarding stale upload result for {}", file.name);
                self.observer.on_superseded(*operation);
            }
            Err(e) => {
                warn!("Upload of {} failed: {}", file.name, e);
                self.observer.on_upload_error(&e.to_string());
            }
        }
        outcome
    }

    /// Read `path` from disk and [`submit_file`](Self::submit_file) it.
    ///
    /// A file that cannot be read is reported like any other local
    /// validation failure: upload status becomes `Failed`, the current
    /// document is kept.
    pub async fn submit_path(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<DocumentSession, InsightsError> {
        match PdfFile::from_path(path).await {
            Ok(file) => self.submit_file(file).await,
            Err(e) => {
                warn!("{}", e);
                self.lock().reject(Operation::Upload, &e);
                self.observer.on_upload_error(&e.to_string());
                Err(e)
            }
        }
    }

    // ── Query ────────────────────────────────────────────────────────────

    /// Ask `prompt` about the current document.
    ///
    /// On success the transcript grows by exactly two turns (the prompt,
    /// then the answer) and the returned value is the answer.
    ///
    /// # Errors
    /// * [`InsightsError::DocumentNotReady`] / [`InsightsError::EmptyPrompt`]
    ///   — refused locally
    /// * [`InsightsError::Query`] — the backend failed; transcript unchanged
    /// * [`InsightsError::Superseded`] — a newer query, upload or reset
    ///   started while this one was pending
    pub async fn submit_query(&self, prompt: impl Into<String>) -> Result<Turn, InsightsError> {
        let prompt = prompt.into();
        let begun = self.lock().begin_query(&prompt);
        let ticket = match begun {
            Ok(t) => t,
            Err(e) => {
                debug!("Query refused: {}", e);
                self.observer.on_query_error(&e.to_string());
                return Err(e);
            }
        };

        info!("Submitting query ({} chars)", prompt.chars().count());
        self.observer.on_query_start(&prompt);

        let result = self.api.query(&prompt).await;
        let outcome = self.lock().complete_query(ticket, prompt, result);

        match &outcome {
            Ok(answer) => {
                if let Turn::Ai { model, usage, .. } = answer {
                    info!(
                        "Answer received from {} ({} tokens)",
                        model,
                        usage.map(|u| u.total_tokens).unwrap_or(0)
                    );
                }
                self.observer.on_query_complete(answer);
            }
            Err(InsightsError::Superseded { operation }) => {
                debug!("Discarding stale query result");
                self.observer.on_superseded(*operation);
            }
            Err(e) => {
                warn!("Query failed: {}", e);
                self.observer.on_query_error(&e.to_string());
            }
        }
        outcome
    }

    /// Submit the pending prompt input.
    pub async fn submit_draft(&self) -> Result<Turn, InsightsError> {
        let prompt = self.draft();
        self.submit_query(prompt).await
    }

    // ── State access ─────────────────────────────────────────────────────

    pub fn set_draft(&self, text: impl Into<String>) {
        self.lock().set_draft(text);
    }

    pub fn draft(&self) -> String {
        self.lock().draft().to_string()
    }

    pub fn is_ready(&self) -> bool {
        self.lock().document().is_ready
    }

    pub fn document(&self) -> DocumentSession {
        self.lock().document().clone()
    }

    pub fn transcript(&self) -> Vec<Turn> {
        self.lock().transcript().to_vec()
    }

    pub fn status(&self, operation: Operation) -> RequestStatus {
        self.lock().status(operation).clone()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock().snapshot()
    }

    /// Forget the document and transcript. Pending results will be dropped.
    pub fn reset(&self) {
        info!("Session reset");
        self.lock().reset();
    }
}
