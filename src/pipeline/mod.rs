//! Pipeline stages for the laboratory-list dataset.
//!
//! Each submodule implements exactly one transformation step. Control and
//! data flow are strictly linear and file-mediated: every stage reads the
//! previous stage's artifact and rewrites its own output whole, so the
//! stages stay independently runnable and independently testable.
//!
//! ## Data Flow
//!
//! ```text
//! acquire ──▶ extract ──▶ normalize ──▶ enrich
//! (PDF URL)   (raw rows)  (clean CSV)   (enriched CSV)
//! ```
//!
//! 1. [`acquire`]   — download the laboratory-list PDF from its fixed URL
//! 2. [`extract`]   — harvest every non-blank table row via pdfplumber;
//!    CPU-bound and synchronous, drive it through `spawn_blocking` from
//!    async callers
//! 3. [`normalize`] — reinterpret raw rows against the known header position
//!    and project them onto the canonical column set
//! 4. [`enrich`]    — fetch each lab webpage once, sequentially by default,
//!    and attach title/email/snippet or the per-record error

pub mod acquire;
pub mod enrich;
pub mod extract;
pub mod normalize;
