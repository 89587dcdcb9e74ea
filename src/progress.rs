//! Progress-callback trait for per-record enrichment events.
//!
//! Inject an [`Arc<dyn EnrichProgressCallback>`] via
//! [`crate::config::PipelineConfigBuilder::progress_callback`] to receive
//! real-time events as the enrichment stage works through the dataset.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers can
//! forward events to a terminal progress bar, a log file, or a channel
//! without the library knowing anything about how the host application
//! communicates. The trait is `Send + Sync` so it remains correct when the
//! optional worker pool overlaps fetches.

use std::sync::Arc;

/// Called by the enrichment stage as it processes each record.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. With `concurrency > 1` the per-record methods may be
/// called from overlapping futures; implementations must protect shared
/// mutable state.
pub trait EnrichProgressCallback: Send + Sync {
    /// Called once before any record is processed.
    fn on_enrich_start(&self, total_records: usize) {
        let _ = total_records;
    }

    /// Called just before a record's webpage is fetched.
    fn on_record_start(&self, index: usize, total: usize, url: &str) {
        let _ = (index, total, url);
    }

    /// Called when a record had no webpage reference and was skipped without
    /// a fetch attempt.
    fn on_record_skipped(&self, index: usize, total: usize) {
        let _ = (index, total);
    }

    /// Called when a record's page was fetched and parsed successfully.
    fn on_record_complete(&self, index: usize, total: usize, status: u16) {
        let _ = (index, total, status);
    }

    /// Called when a record's fetch failed (non-200, timeout, transport).
    /// The error text is exactly what lands in the `LabError` column.
    fn on_record_error(&self, index: usize, total: usize, error: &str) {
        let _ = (index, total, error);
    }

    /// Called once after every record has been attempted.
    fn on_enrich_complete(&self, total: usize, fetched: usize, failed: usize) {
        let _ = (total, fetched, failed);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl EnrichProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::PipelineConfig`].
pub type ProgressCallback = Arc<dyn EnrichProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TrackingCallback {
        starts: AtomicUsize,
        completes: AtomicUsize,
        errors: AtomicUsize,
        skips: AtomicUsize,
    }

    impl EnrichProgressCallback for TrackingCallback {
        fn on_record_start(&self, _index: usize, _total: usize, _url: &str) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }
        fn on_record_skipped(&self, _index: usize, _total: usize) {
            self.skips.fetch_add(1, Ordering::SeqCst);
        }
        fn on_record_complete(&self, _index: usize, _total: usize, _status: u16) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }
        fn on_record_error(&self, _index: usize, _total: usize, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_enrich_start(3);
        cb.on_record_start(0, 3, "https://example.org");
        cb.on_record_complete(0, 3, 200);
        cb.on_record_error(1, 3, "HTTP 404");
        cb.on_record_skipped(2, 3);
        cb.on_enrich_complete(3, 1, 1);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback {
            starts: AtomicUsize::new(0),
            completes: AtomicUsize::new(0),
            errors: AtomicUsize::new(0),
            skips: AtomicUsize::new(0),
        };

        tracker.on_record_start(0, 2, "https://a.example");
        tracker.on_record_complete(0, 2, 200);
        tracker.on_record_start(1, 2, "https://b.example");
        tracker.on_record_error(1, 2, "request timed out");
        tracker.on_record_skipped(2, 3);

        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.skips.load(Ordering::SeqCst), 1);
    }
}
