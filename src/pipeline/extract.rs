//! Table extraction: harvest every non-blank table row from the PDF.
//!
//! This stage is purely mechanical. The pdfplumber table finder is treated
//! as a black box: whatever rows it reports are kept verbatim, in page and
//! table order, with no column alignment or type inference. The only
//! filtering is dropping rows whose every cell is null or blank after
//! trimming — the header mapping and all interpretation happen in
//! [`crate::pipeline::normalize`].
//!
//! Everything here is synchronous and CPU-bound; async callers should wrap
//! [`extract_rows`] in `spawn_blocking`.

use crate::error::ScrapeError;
use crate::records::RawRow;
use pdfplumber::{Pdf, TableSettings};
use std::path::Path;
use tracing::{debug, info};

/// Walk each page of the PDF at `path` and collect every non-blank table
/// row as a [`RawRow`]. Any open or parse failure is fatal for the run.
pub fn extract_rows(path: &Path) -> Result<Vec<RawRow>, ScrapeError> {
    info!("Opening {}", path.display());

    let pdf = Pdf::open_file(path, None).map_err(|e| ScrapeError::PdfParseFailed {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;

    let settings = TableSettings::default();
    let mut rows: Vec<RawRow> = Vec::new();

    for page_result in pdf.pages_iter() {
        let page = page_result.map_err(|e| ScrapeError::PdfParseFailed {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;

        let tables = page.find_tables(&settings);
        debug!(
            "Page {}: {} table(s) detected",
            page.page_number(),
            tables.len()
        );

        for table in &tables {
            for row in &table.rows {
                let cells: RawRow = row.iter().map(|cell| cell.text.clone()).collect();
                if is_blank_row(&cells) {
                    continue;
                }
                rows.push(cells);
            }
        }
    }

    info!("Total rows extracted: {}", rows.len());
    Ok(rows)
}

/// A row is blank iff every cell is null or whitespace-only after trimming.
pub fn is_blank_row(row: &RawRow) -> bool {
    row.iter()
        .all(|cell| cell.as_deref().map_or(true, |text| text.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[Option<&str>]) -> RawRow {
        cells.iter().map(|c| c.map(str::to_string)).collect()
    }

    #[test]
    fn row_with_one_non_blank_cell_is_kept() {
        assert!(!is_blank_row(&row(&[None, Some("Taro"), Some("  ")])));
    }

    #[test]
    fn all_null_row_is_blank() {
        assert!(is_blank_row(&row(&[None, None, None])));
    }

    #[test]
    fn whitespace_only_row_is_blank() {
        assert!(is_blank_row(&row(&[Some("  "), Some("\n"), Some("")])));
    }

    #[test]
    fn empty_row_is_blank() {
        assert!(is_blank_row(&Vec::new()));
    }

    #[test]
    fn unreadable_pdf_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not_a_pdf.pdf");
        std::fs::write(&path, b"plain text, no PDF structure").unwrap();

        match extract_rows(&path) {
            Err(ScrapeError::PdfParseFailed { .. }) => {}
            other => panic!("expected PdfParseFailed, got {other:?}"),
        }
    }
}
