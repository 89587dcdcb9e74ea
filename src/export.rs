//! JSON projection of the enriched dataset for external consumers.
//!
//! The enriched CSV is read *loosely* here — every column as text — rather
//! than through [`crate::records::EnrichedRecord`], because this stage is
//! also the safety net for files that predate the current pipeline: it
//! tolerates and repairs header-label leakage and placeholder values
//! instead of refusing the file.
//!
//! Coercion rules, in order:
//! * a row whose `No` cell literally equals the header label is dropped;
//! * `No` is coerced to a number, `null` when unparseable;
//! * text columns render absent values as empty strings (a literal `nan`
//!   placeholder counts as absent);
//! * `LabHTTPStatus` renders as a number or `null`.
//!
//! Output is an indented array of one object per record, input order
//! preserved, with non-escaped (human-readable) text.

use crate::error::ScrapeError;
use crate::records::SEQUENCE_HEADER_LABEL;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// One exported object. Struct field order fixes the JSON key order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabJsonRecord {
    #[serde(rename = "No")]
    pub no: Option<u32>,
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

/// Everything-as-text view of one enriched CSV row. Columns absent from the
/// file default to empty.
#[derive(Debug, Deserialize, Default)]
struct LooseRow {
    #[serde(rename = "No", default)]
    no: String,
    #[serde(rename = "Field", default)]
    field: String,
    #[serde(rename = "Name", default)]
    name: String,
    #[serde(rename = "Affiliation", default)]
    affiliation: String,
    #[serde(rename = "Research Topic", default)]
    research_topic: String,
    #[serde(rename = "Keywords", default)]
    keywords: String,
    #[serde(rename = "Campus", default)]
    campus: String,
    #[serde(rename = "LabURLOriginal", default)]
    lab_url_original: String,
    #[serde(rename = "LabURLClean", default)]
    lab_url_clean: String,
    #[serde(rename = "LabHTTPStatus", default)]
    lab_http_status: String,
    #[serde(rename = "LabError", default)]
    lab_error: String,
    #[serde(rename = "LabTitle", default)]
    lab_title: String,
    #[serde(rename = "LabEmail", default)]
    lab_email: String,
    #[serde(rename = "LabSnippet", default)]
    lab_snippet: String,
}

impl LooseRow {
    fn coerce(self) -> Option<LabJsonRecord> {
        if self.no.trim() == SEQUENCE_HEADER_LABEL {
            return None;
        }
        Some(LabJsonRecord {
            no: self.no.trim().parse().ok(),
            field: scrub(self.field),
            name: scrub(self.name),
            affiliation: scrub(self.affiliation),
            research_topic: scrub(self.research_topic),
            keywords: scrub(self.keywords),
            campus: scrub(self.campus),
            lab_url_original: scrub(self.lab_url_original),
            lab_url_clean: scrub(self.lab_url_clean),
            lab_http_status: self.lab_http_status.trim().parse().ok(),
            lab_error: scrub(self.lab_error),
            lab_title: scrub(self.lab_title),
            lab_email: scrub(self.lab_email),
            lab_snippet: scrub(self.lab_snippet),
        })
    }
}

/// Treat the literal `nan` placeholder as an absent value.
fn scrub(value: String) -> String {
    if value == "nan" {
        String::new()
    } else {
        value
    }
}

/// Project the enriched CSV at `enriched_csv` into a JSON array at
/// `json_path`. Returns the number of exported records.
///
/// Rows that do not deserialize at all (wrong field count and the like) are
/// logged and skipped, matching the lenient posture of
/// [`crate::dataset::read_enriched`].
pub fn project_json(enriched_csv: &Path, json_path: &Path) -> Result<usize, ScrapeError> {
    info!("Loading enriched dataset from {}", enriched_csv.display());

    let mut reader = csv::Reader::from_path(enriched_csv)?;
    let mut records: Vec<LabJsonRecord> = Vec::new();
    for (line, result) in reader.deserialize::<LooseRow>().enumerate() {
        match result {
            Ok(row) => {
                if let Some(record) = row.coerce() {
                    records.push(record);
                }
            }
            Err(e) => warn!(
                "Skipping unreadable row {} in {}: {e}",
                line + 2,
                enriched_csv.display()
            ),
        }
    }

    let json = serde_json::to_string_pretty(&records)?;
    std::fs::write(json_path, json).map_err(|e| ScrapeError::Io {
        path: json_path.to_path_buf(),
        source: e,
    })?;

    info!("Exported {} records to {}", records.len(), json_path.display());
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loose(no: &str) -> LooseRow {
        LooseRow {
            no: no.to_string(),
            name: "Taro".into(),
            ..LooseRow::default()
        }
    }

    #[test]
    fn header_label_row_is_dropped() {
        assert!(loose("No").coerce().is_none());
    }

    #[test]
    fn numeric_sequence_is_coerced() {
        let record = loose(" 12 ").coerce().unwrap();
        assert_eq!(record.no, Some(12));
    }

    #[test]
    fn unparseable_sequence_becomes_null() {
        let record = loose("twelve").coerce().unwrap();
        assert_eq!(record.no, None);
    }

    #[test]
    fn nan_placeholder_becomes_empty() {
        let mut row = loose("1");
        row.keywords = "nan".into();
        let record = row.coerce().unwrap();
        assert_eq!(record.keywords, "");
    }

    #[test]
    fn key_order_is_fixed() {
        let record = loose("1").coerce().unwrap();
        let json = serde_json::to_string(&record).unwrap();
        let no_pos = json.find("\"No\"").unwrap();
        let field_pos = json.find("\"Field\"").unwrap();
        let snippet_pos = json.find("\"LabSnippet\"").unwrap();
        assert!(no_pos < field_pos && field_pos < snippet_pos);
    }
}
