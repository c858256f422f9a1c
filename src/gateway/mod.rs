//! API gateway: the two HTTP calls the session makes against the backend.
//!
//! ```text
//! SessionController ──▶ DocumentApi ──▶ POST {base}/upload   (multipart "file")
//!                                   └─▶ POST {base}/process  (JSON {user_prompt})
//! ```
//!
//! 1. [`wire`] — request/response bodies and the error-message policy for
//!    non-2xx answers
//! 2. [`http`] — the `reqwest` implementation of [`DocumentApi`]
//!
//! Both operations are single request/response pass-throughs: no retries, no
//! caching, no cancellation. The trait exists so the controller can be driven
//! by a scripted backend in tests.

pub mod http;
pub mod wire;

use crate::error::TransportError;
use crate::file::PdfFile;
use async_trait::async_trait;
use std::sync::Arc;

pub use http::HttpGateway;
pub use wire::{QueryRequest, QueryResponse, UploadResponse};

/// The extraction/inference backend as seen by the session.
#[async_trait]
pub trait DocumentApi: Send + Sync {
    /// Send `file` for text extraction.
    async fn upload(&self, file: &PdfFile) -> Result<UploadResponse, TransportError>;

    /// Ask a question about the most recently uploaded document.
    async fn query(&self, prompt: &str) -> Result<QueryResponse, TransportError>;
}

/// Shared handle stored by the controller.
pub type SharedApi = Arc<dyn DocumentApi>;
