//! The record types that flow through the pipeline.
//!
//! Three shapes, one per maturity level:
//!
//! 1. [`RawRow`] — cells exactly as the table extractor produced them,
//!    positional only, no header interpretation.
//! 2. [`ProfessorRecord`] — one cleaned row of the laboratory list, projected
//!    onto the canonical column set.
//! 3. [`EnrichedRecord`] — a `ProfessorRecord` plus whatever the lab's
//!    webpage yielded (status, title, contact address, snippet) or the error
//!    that prevented fetching it.
//!
//! Records are immutable once written to disk: every pipeline run recomputes
//! its output file from scratch rather than patching the previous one.

use serde::{Deserialize, Serialize};

/// One table row as harvested from the PDF. `None` means the extractor
/// reported no text for that cell.
pub type RawRow = Vec<Option<String>>;

/// CSV header label of the sequence-number column. A data row whose sequence
/// cell carries this literal value is a header row repeated across a page
/// break, not a record, and is dropped during normalization.
pub const SEQUENCE_HEADER_LABEL: &str = "No";

/// Canonical column names, in clean-dataset order. Every one of these must be
/// present in the detected header row; a missing column is a fatal
/// configuration error for the run.
pub const CANONICAL_COLUMNS: [&str; 8] = [
    "No",
    "Field",
    "Name",
    "Affiliation",
    "Research Topic",
    "Keywords",
    "Webpages",
    "Campus",
];

/// A cleaned, canonical professor/lab entry prior to web enrichment.
///
/// Invariants enforced by [`crate::pipeline::normalize`]: `no` is a parsed
/// positive integer (never the leaked header label) and `name` is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfessorRecord {
    #[serde(rename = "No")]
    pub no: u32,
    #[serde(rename = "Field")]
    pub field: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Affiliation")]
    pub affiliation: String,
    #[serde(rename = "Research Topic")]
    pub research_topic: String,
    #[serde(rename = "Keywords")]
    pub keywords: String,
    #[serde(rename = "Webpages")]
    pub webpages: String,
    #[serde(rename = "Campus")]
    pub campus: String,
}

/// A [`ProfessorRecord`] augmented with data fetched from its webpage.
///
/// Enrichment is tri-state per record:
/// * clean URL empty → every enrichment field empty, no error;
/// * fetch succeeded → `lab_http_status == Some(200)`, facts populated,
///   `lab_error` empty;
/// * fetch failed → `lab_error` non-empty (status present only when a
///   response was actually received).
///
/// Field order doubles as the enriched CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    #[serde(rename = "No")]
    pub no: u32,
    #[serde(rename = "Field")]
    pub field: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Affiliation")]
    pub affiliation: String,
    #[serde(rename = "Research Topic")]
    pub research_topic: String,
    #[serde(rename = "Keywords")]
    pub keywords: String,
    #[serde(rename = "Webpages")]
    pub webpages: String,
    #[serde(rename = "Campus")]
    pub campus: String,
    #[serde(rename = "LabURLOriginal")]
    pub lab_url_original: String,
    #[serde(rename = "LabURLClean")]
    pub lab_url_clean: String,
    #[serde(rename = "LabHTTPStatus")]
    pub lab_http_status: Option<u16>,
    #[serde(rename = "LabError")]
    pub lab_error: String,
    #[serde(rename = "LabTitle")]
    pub lab_title: String,
    #[serde(rename = "LabEmail")]
    pub lab_email: String,
    #[serde(rename = "LabSnippet")]
    pub lab_snippet: String,
}

impl EnrichedRecord {
    /// Start from a clean record with every enrichment field empty.
    pub fn from_record(record: ProfessorRecord) -> Self {
        let lab_url_original = record.webpages.clone();
        Self {
            no: record.no,
            field: record.field,
            name: record.name,
            affiliation: record.affiliation,
            research_topic: record.research_topic,
            keywords: record.keywords,
            webpages: record.webpages,
            campus: record.campus,
            lab_url_original,
            lab_url_clean: String::new(),
            lab_http_status: None,
            lab_error: String::new(),
            lab_title: String::new(),
            lab_email: String::new(),
            lab_snippet: String::new(),
        }
    }

    /// Lowercased haystack for keyword search: research topic, keywords,
    /// and webpage snippet joined with single spaces.
    pub fn search_blob(&self) -> String {
        format!(
            "{} {} {}",
            self.research_topic, self.keywords, self.lab_snippet
        )
        .to_lowercase()
    }
}

/// Strip PDF formatting artifacts from a cell value: embedded newlines become
/// single spaces and surrounding whitespace is trimmed.
pub fn clean_cell(raw: &str) -> String {
    raw.replace("\r\n", " ")
        .replace(['\n', '\r'], " ")
        .trim()
        .to_string()
}
