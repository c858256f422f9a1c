//! Observer trait for session events.
//!
//! Inject an [`Arc<dyn SessionObserver>`] via
//! [`crate::controller::SessionController::with_observer`] to be told when an
//! upload or query starts, completes, fails, or is discarded as stale. A
//! terminal front-end drives its spinners from these; a GUI would repaint.
//!
//! # Example
//!
//! ```rust
//! use pdf_insights::{SessionObserver, Turn};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! #[derive(Default)]
//! struct CountingObserver {
//!     answers: AtomicUsize,
//! }
//!
//! impl SessionObserver for CountingObserver {
//!     fn on_query_complete(&self, _answer: &Turn) {
//!         self.answers.fetch_add(1, Ordering::SeqCst);
//!     }
//! }
//! ```

use crate::session::{Operation, Turn};
use std::sync::Arc;

/// Called by the controller as operations progress.
///
/// Implementations must be `Send + Sync`; several operations may be in flight
/// at once. All methods have default no-op implementations so callers only
/// override what they care about.
pub trait SessionObserver: Send + Sync {
    /// Called just before the upload request is sent.
    ///
    /// # Arguments
    /// * `file_name`  — name sent with the multipart part
    /// * `size_bytes` — payload size
    fn on_upload_start(&self, file_name: &str, size_bytes: usize) {
        let _ = (file_name, size_bytes);
    }

    /// Called when the uploaded document is ready for questions.
    fn on_upload_complete(&self, file_name: &str, extracted_chars: usize) {
        let _ = (file_name, extracted_chars);
    }

    /// Called when an upload is refused locally or fails at the backend.
    fn on_upload_error(&self, error: &str) {
        let _ = error;
    }

    /// Called just before the query request is sent.
    fn on_query_start(&self, prompt: &str) {
        let _ = prompt;
    }

    /// Called with the AI turn once it has been appended to the transcript.
    fn on_query_complete(&self, answer: &Turn) {
        let _ = answer;
    }

    /// Called when a query is refused locally or fails at the backend.
    fn on_query_error(&self, error: &str) {
        let _ = error;
    }

    /// Called when a completion arrives for a request that is no longer the
    /// newest of its kind and is dropped.
    fn on_superseded(&self, operation: Operation) {
        let _ = operation;
    }
}

/// A no-op observer; the default when none is configured.
pub struct NoopObserver;

impl SessionObserver for NoopObserver {}

/// Convenience alias matching the type stored in the controller.
pub type ObserverRef = Arc<dyn SessionObserver>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingObserver {
        starts: AtomicUsize,
        errors: AtomicUsize,
        stale: AtomicUsize,
    }

    impl SessionObserver for TrackingObserver {
        fn on_upload_start(&self, _file_name: &str, _size_bytes: usize) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_query_start(&self, _prompt: &str) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_query_error(&self, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }

        fn on_superseded(&self, _operation: Operation) {
            self.stale.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_observer_does_not_panic() {
        let o = NoopObserver;
        o.on_upload_start("a.pdf", 10);
        o.on_upload_complete("a.pdf", 5);
        o.on_upload_error("bad");
        o.on_query_start("q");
        o.on_query_complete(&Turn::user("q"));
        o.on_query_error("bad");
        o.on_superseded(Operation::Upload);
    }

    #[test]
    fn overridden_methods_receive_events() {
        let t = TrackingObserver::default();
        t.on_upload_start("a.pdf", 10);
        t.on_query_start("q");
        t.on_query_error("boom");
        t.on_upload_error("ignored by default impl");
        t.on_superseded(Operation::Query);

        assert_eq!(t.starts.load(Ordering::SeqCst), 2);
        assert_eq!(t.errors.load(Ordering::SeqCst), 1);
        assert_eq!(t.stale.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_observer_works() {
        let o: ObserverRef = Arc::new(NoopObserver);
        o.on_query_start("hello");
    }
}
