//! Error types for the ku-star-labs library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ScrapeError`] — **Fatal**: the stage cannot produce a valid output
//!   file at all (PDF download failure, unparseable PDF, header row or
//!   canonical column missing, file I/O). Returned as `Err(ScrapeError)` from
//!   the stage entry points; no partial artifact is written.
//!
//! * [`FetchError`] — **Per-record**: one lab webpage could not be fetched or
//!   returned a non-200 status. Never propagated — rendered to text and
//!   stored in the record's `LabError` column so the dataset itself documents
//!   which entries could not be enriched and why.
//!
//! Rows failing structural expectations during normalization (missing
//! sequence number, leaked header label, missing name) are a third, silent
//! category: they are data-quality skips, not errors.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the ku-star-labs library.
#[derive(Debug, Error)]
pub enum ScrapeError {
    // ── Acquisition errors ────────────────────────────────────────────────
    /// The PDF download request failed or returned a non-success status.
    #[error("Failed to download '{url}': {reason}")]
    DownloadFailed { url: String, reason: String },

    /// The PDF download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'")]
    DownloadTimeout { url: String, secs: u64 },

    /// The downloaded body does not start with the `%PDF` magic bytes.
    #[error("Response from '{url}' is not a PDF (first bytes: {magic:?})")]
    NotAPdf { url: String, magic: [u8; 4] },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// The PDF could not be opened or parsed by the table extractor.
    #[error("Failed to parse PDF '{path}': {detail}")]
    PdfParseFailed { path: PathBuf, detail: String },

    // ── Normalization errors ──────────────────────────────────────────────
    /// The raw table has fewer rows than the configured header position.
    #[error("Header row expected at index {index} but only {rows} raw rows were extracted")]
    HeaderRowMissing { index: usize, rows: usize },

    /// A canonical column is absent from the detected header row. The source
    /// document layout has changed and the run must be recalibrated.
    #[error("Column '{name}' not found in the detected header row")]
    MissingColumn { name: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// CSV read/write failure (wraps file-open errors from `csv` as well).
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialisation failure during projection.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Plain file I/O failure, with the offending path.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A per-record enrichment failure, captured as dataset text.
///
/// The `Display` form is exactly what lands in the `LabError` column.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// A response was received but its status was not 200.
    #[error("HTTP {0}")]
    Status(u16),

    /// The request did not complete within the fetch timeout.
    #[error("request timed out")]
    Timeout,

    /// Connection, TLS, or protocol failure before a response was obtained,
    /// or a body that could not be read.
    #[error("request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Request(e.to_string())
        }
    }
}
