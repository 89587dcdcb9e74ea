//! # ku-star-labs
//!
//! Scrape, clean, enrich, and search the KU-STAR laboratory list.
//!
//! ## Why this crate?
//!
//! The KU-STAR program publishes its laboratory/professor roster as a PDF
//! table — fine for humans, useless for tooling. This crate turns that PDF
//! into a queryable flat-file dataset: it harvests the table rows, cleans
//! them into canonical records, visits each lab's webpage for a title,
//! contact address, and text snippet, and exposes search and JSON export
//! over the result.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF URL
//!  │
//!  ├─ 1. Acquire    download the laboratory-list PDF (fatal on failure)
//!  ├─ 2. Extract    harvest table rows via pdfplumber → raw CSV
//!  ├─ 3. Normalize  header mapping + filters + cell cleanup → clean CSV
//!  ├─ 4. Enrich     one polite GET per lab page → enriched CSV
//!  ├─ 5. Search     field / campus / keyword substring queries + export
//!  └─ 6. Project    coerced, null-safe JSON array for external consumers
//! ```
//!
//! Stages are file-mediated and independently runnable: each reads the
//! previous stage's artifact and rewrites its own output whole. There is no
//! shared in-memory state across stages and no feedback loop.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ku_star_labs::{dataset, pipeline, PipelineConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PipelineConfig::default();
//!     let clean = dataset::read_clean(&config.clean_csv)?;
//!     let (enriched, stats) = pipeline::enrich::enrich_records(clean, &config).await?;
//!     dataset::write_enriched(&config.enriched_csv, &enriched)?;
//!     eprintln!("fetched {} / failed {}", stats.fetched, stats.failed);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `kustar` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod dataset;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod progress;
pub mod records;
pub mod search;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{PipelineConfig, PipelineConfigBuilder, DEFAULT_PDF_URL};
pub use error::{FetchError, ScrapeError};
pub use export::{project_json, LabJsonRecord};
pub use pipeline::enrich::{enrich_records, normalize_url, EnrichStats};
pub use pipeline::extract::extract_rows;
pub use pipeline::normalize::normalize_rows;
pub use progress::{EnrichProgressCallback, NoopProgressCallback, ProgressCallback};
pub use records::{EnrichedRecord, ProfessorRecord, RawRow};
