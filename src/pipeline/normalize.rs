//! Record normalization: raw positional rows → canonical clean records.
//!
//! The raw artifact has no trustworthy header — the extractor reports a
//! banner row first and the real column names on the second physical row.
//! This stage reinterprets the rows against that known header position,
//! filters out everything that is not a data row, and projects what remains
//! onto the canonical column set.
//!
//! ## Filtering rules
//!
//! A candidate row (any row after the header) is dropped when:
//! * its sequence cell is missing or blank,
//! * its sequence cell literally equals the header label `"No"` — the source
//!   document repeats the header across page breaks and those repeats leak
//!   through extraction as ordinary rows,
//! * its sequence cell does not parse as an unsigned integer, or
//! * its name cell is missing or blank.
//!
//! These are data-quality skips, not errors: they are logged at debug level
//! and excluded, and the run continues. A *canonical column* missing from
//! the header row, by contrast, means the document layout changed and is a
//! fatal configuration error — this stage must be recalibrated, never
//! silently degraded.

use crate::error::ScrapeError;
use crate::records::{clean_cell, ProfessorRecord, RawRow, SEQUENCE_HEADER_LABEL};
use tracing::{debug, info};

/// Positions of the canonical columns inside the detected header row.
struct ColumnIndex {
    no: usize,
    field: usize,
    name: usize,
    affiliation: usize,
    research_topic: usize,
    keywords: usize,
    webpages: usize,
    campus: usize,
}

impl ColumnIndex {
    fn from_header(header: &RawRow) -> Result<Self, ScrapeError> {
        let find = |name: &str| -> Result<usize, ScrapeError> {
            header
                .iter()
                .position(|cell| cell.as_deref().map(clean_cell).as_deref() == Some(name))
                .ok_or_else(|| ScrapeError::MissingColumn {
                    name: name.to_string(),
                })
        };

        Ok(Self {
            no: find("No")?,
            field: find("Field")?,
            name: find("Name")?,
            affiliation: find("Affiliation")?,
            research_topic: find("Research Topic")?,
            keywords: find("Keywords")?,
            webpages: find("Webpages")?,
            campus: find("Campus")?,
        })
    }
}

/// Normalize raw rows into clean records, using the row at `header_row` as
/// the column-name row and everything after it as candidate data.
pub fn normalize_rows(
    rows: &[RawRow],
    header_row: usize,
) -> Result<Vec<ProfessorRecord>, ScrapeError> {
    let header = rows.get(header_row).ok_or(ScrapeError::HeaderRowMissing {
        index: header_row,
        rows: rows.len(),
    })?;
    let columns = ColumnIndex::from_header(header)?;

    let mut records = Vec::new();
    for (offset, row) in rows[header_row + 1..].iter().enumerate() {
        let Some(sequence) = cell(row, columns.no) else {
            debug!("Row {}: missing sequence number, skipped", offset);
            continue;
        };
        if sequence == SEQUENCE_HEADER_LABEL {
            debug!("Row {}: repeated header row, skipped", offset);
            continue;
        }
        let Ok(no) = sequence.parse::<u32>() else {
            debug!("Row {}: non-numeric sequence '{sequence}', skipped", offset);
            continue;
        };
        let Some(name) = cell(row, columns.name) else {
            debug!("Row {} (No={no}): missing name, skipped", offset);
            continue;
        };

        records.push(ProfessorRecord {
            no,
            field: cell(row, columns.field).unwrap_or_default(),
            name,
            affiliation: cell(row, columns.affiliation).unwrap_or_default(),
            research_topic: cell(row, columns.research_topic).unwrap_or_default(),
            keywords: cell(row, columns.keywords).unwrap_or_default(),
            webpages: cell(row, columns.webpages).unwrap_or_default(),
            campus: cell(row, columns.campus).unwrap_or_default(),
        });
    }

    info!(
        "Normalized {} records from {} candidate rows",
        records.len(),
        rows.len().saturating_sub(header_row + 1)
    );
    Ok(records)
}

/// Cleaned cell at position `index`, or `None` when absent or blank.
fn cell(row: &RawRow, index: usize) -> Option<String> {
    row.get(index)
        .and_then(|c| c.as_deref())
        .map(clean_cell)
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(cells: &[&str]) -> RawRow {
        cells
            .iter()
            .map(|c| {
                if c.is_empty() {
                    None
                } else {
                    Some(c.to_string())
                }
            })
            .collect()
    }

    fn fixture() -> Vec<RawRow> {
        vec![
            raw(&["KU-STAR Program Laboratory List"]),
            raw(&[
                "No",
                "Field",
                "Name",
                "Affiliation",
                "Research\nTopic",
                "Keywords",
                "Webpages",
                "Campus",
            ]),
            raw(&[
                "1",
                "Informatics",
                "Taro\nYamada",
                "Grad. School of Informatics",
                "AI ethics",
                "fairness",
                "example.org/lab",
                "Yoshida",
            ]),
            // header repeated on a page break
            raw(&[
                "No", "Field", "Name", "Affiliation", "Research Topic", "Keywords", "Webpages",
                "Campus",
            ]),
            // missing name
            raw(&["2", "Chemistry", "", "Institute", "Catalysis", "", "", "Uji"]),
            // missing sequence number
            raw(&["", "Biology", "Hana Sato", "", "", "", "", "Katsura"]),
            raw(&["3", "Energy Science", "Hana Sato", "", "Solar cells", "perovskite", "", "Uji"]),
        ]
    }

    #[test]
    fn keeps_only_structurally_valid_rows() {
        let records = normalize_rows(&fixture(), 1).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].no, 1);
        assert_eq!(records[1].no, 3);
    }

    #[test]
    fn strips_newlines_from_cells() {
        let records = normalize_rows(&fixture(), 1).unwrap();
        assert_eq!(records[0].name, "Taro Yamada");
    }

    #[test]
    fn header_with_embedded_newline_still_matches() {
        // "Research\nTopic" in the header cell must resolve the
        // "Research Topic" canonical column.
        let records = normalize_rows(&fixture(), 1).unwrap();
        assert_eq!(records[0].research_topic, "AI ethics");
    }

    #[test]
    fn missing_canonical_column_is_fatal() {
        let rows = vec![
            raw(&["banner"]),
            raw(&["No", "Field", "Name", "Affiliation", "Research Topic", "Keywords", "Campus"]),
        ];
        match normalize_rows(&rows, 1) {
            Err(ScrapeError::MissingColumn { name }) => assert_eq!(name, "Webpages"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn header_position_beyond_input_is_fatal() {
        let rows = vec![raw(&["banner"])];
        match normalize_rows(&rows, 1) {
            Err(ScrapeError::HeaderRowMissing { index: 1, rows: 1 }) => {}
            other => panic!("expected HeaderRowMissing, got {other:?}"),
        }
    }

    #[test]
    fn non_numeric_sequence_is_skipped() {
        let mut rows = fixture();
        rows.push(raw(&["x9", "Physics", "Jiro", "", "", "", "", "Yoshida"]));
        let records = normalize_rows(&rows, 1).unwrap();
        assert!(records.iter().all(|r| r.name != "Jiro"));
    }

    #[test]
    fn header_row_is_parameterized() {
        // Same fixture minus the banner row: header sits at index 0.
        let rows: Vec<RawRow> = fixture()[1..].to_vec();
        let records = normalize_rows(&rows, 0).unwrap();
        assert_eq!(records.len(), 2);
    }
}
