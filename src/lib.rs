//! # pdf-insights
//!
//! Upload a PDF to an extraction backend and hold a question-and-answer
//! conversation about its text.
//!
//! The backend does the heavy lifting (text extraction, retrieval, LLM
//! calls). This crate is the client side: a session state machine that
//! gates questions on a loaded document, keeps the transcript, tracks the
//! state of each request, and refuses to let a late response overwrite a
//! newer one.
//!
//! ## Flow
//!
//! ```text
//! PdfFile ──submit_file──▶ POST /upload  ──▶ DocumentSession { is_ready }
//!                                                 │
//! prompt  ──submit_query─▶ POST /process ──▶ Transcript += [User, Ai]
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf_insights::{ClientConfig, SessionController};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::builder()
//!         .base_url("http://localhost:8000")
//!         .build()?;
//!     let session = SessionController::from_config(&config)?;
//!
//!     session.submit_path("report.pdf").await?;
//!     let answer = session.submit_query("What is this document about?").await?;
//!     println!("{}", answer.text());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf-insights` binary (clap + anyhow + indicatif + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod controller;
pub mod error;
pub mod file;
pub mod gateway;
pub mod progress;
pub mod session;
pub mod view;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ClientConfig, ClientConfigBuilder};
pub use controller::SessionController;
pub use error::{ErrorKind, InsightsError, TransportError};
pub use file::{PdfFile, PDF_MIME};
pub use gateway::{DocumentApi, HttpGateway, QueryResponse, UploadResponse};
pub use progress::{NoopObserver, ObserverRef, SessionObserver};
pub use session::{
    DocumentSession, Operation, RequestStatus, SessionSnapshot, Turn, Usage,
};
pub use view::Palette;
