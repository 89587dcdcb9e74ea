//! Flat-file persistence for every pipeline artifact.
//!
//! Each stage reads one file and writes another; this module owns all of
//! that CSV plumbing so the stages themselves stay pure transformations.
//! Output files are always rewritten whole — a later run recomputes, never
//! patches.
//!
//! The raw artifact is an unheadered, ragged CSV (PDF rows do not all have
//! the same cell count), so it goes through `flexible` readers/writers and
//! positional records. The clean and enriched artifacts are headered and go
//! through serde.

use crate::error::ScrapeError;
use crate::records::{EnrichedRecord, ProfessorRecord, RawRow};
use std::path::Path;
use tracing::{debug, warn};

// ── Raw rows (unheadered, ragged) ────────────────────────────────────────

/// Persist raw extracted rows. `None` cells are written as empty fields.
pub fn write_raw_rows(path: &Path, rows: &[RawRow]) -> Result<(), ScrapeError> {
    let mut writer = csv::WriterBuilder::new().flexible(true).from_path(path)?;
    for row in rows {
        writer.write_record(row.iter().map(|cell| cell.as_deref().unwrap_or("")))?;
    }
    writer.flush().map_err(|e| ScrapeError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    debug!("Wrote {} raw rows to {}", rows.len(), path.display());
    Ok(())
}

/// Load raw rows back. Blank fields come back as `None`: the null/blank
/// distinction does not survive a CSV round trip and nothing downstream
/// depends on it.
pub fn read_raw_rows(path: &Path) -> Result<Vec<RawRow>, ScrapeError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(
            record
                .iter()
                .map(|cell| {
                    if cell.trim().is_empty() {
                        None
                    } else {
                        Some(cell.to_string())
                    }
                })
                .collect(),
        );
    }
    Ok(rows)
}

// ── Clean dataset ────────────────────────────────────────────────────────

/// Persist the clean dataset with its canonical header.
pub fn write_clean(path: &Path, records: &[ProfessorRecord]) -> Result<(), ScrapeError> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush().map_err(|e| ScrapeError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    debug!("Wrote {} clean records to {}", records.len(), path.display());
    Ok(())
}

/// Load the clean dataset. Strict: a malformed row here means the file was
/// not produced by this pipeline and the run should stop.
pub fn read_clean(path: &Path) -> Result<Vec<ProfessorRecord>, ScrapeError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for result in reader.deserialize() {
        records.push(result?);
    }
    Ok(records)
}

// ── Enriched dataset ─────────────────────────────────────────────────────

/// Persist the enriched dataset.
pub fn write_enriched(path: &Path, records: &[EnrichedRecord]) -> Result<(), ScrapeError> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush().map_err(|e| ScrapeError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    debug!(
        "Wrote {} enriched records to {}",
        records.len(),
        path.display()
    );
    Ok(())
}

/// Load the enriched dataset for the search tool.
///
/// Lenient on purpose: the search surface must never fail on a dataset
/// anomaly, so rows that do not deserialize are logged and skipped rather
/// than aborting the load.
pub fn read_enriched(path: &Path) -> Result<Vec<EnrichedRecord>, ScrapeError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for (line, result) in reader.deserialize::<EnrichedRecord>().enumerate() {
        match result {
            Ok(record) => records.push(record),
            Err(e) => warn!("Skipping unreadable row {} in {}: {e}", line + 2, path.display()),
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn professor(no: u32, name: &str) -> ProfessorRecord {
        ProfessorRecord {
            no,
            field: "Informatics".into(),
            name: name.into(),
            affiliation: "Graduate School of Informatics".into(),
            research_topic: "Machine learning".into(),
            keywords: "AI, optimisation".into(),
            webpages: String::new(),
            campus: "Yoshida".into(),
        }
    }

    #[test]
    fn raw_rows_round_trip_with_ragged_lengths() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("raw.csv");
        let rows: Vec<RawRow> = vec![
            vec![Some("KU-STAR Laboratory List".into())],
            vec![Some("No".into()), Some("Field".into()), None],
            vec![Some("1".into()), None, Some("Taro".into())],
        ];

        write_raw_rows(&path, &rows).unwrap();
        let loaded = read_raw_rows(&path).unwrap();

        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded[0], vec![Some("KU-STAR Laboratory List".to_string())]);
        assert_eq!(loaded[2][0].as_deref(), Some("1"));
        assert_eq!(loaded[2][1], None);
    }

    #[test]
    fn clean_dataset_round_trips_with_canonical_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clean.csv");
        let records = vec![professor(1, "Taro"), professor(2, "Hana")];

        write_clean(&path, &records).unwrap();

        let header = std::fs::read_to_string(&path).unwrap();
        assert!(header.starts_with(
            "No,Field,Name,Affiliation,Research Topic,Keywords,Webpages,Campus"
        ));

        let loaded = read_clean(&path).unwrap();
        assert_eq!(loaded, records);
    }

    #[test]
    fn enriched_dataset_round_trips_optional_status() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("enriched.csv");

        let mut ok = EnrichedRecord::from_record(professor(1, "Taro"));
        ok.lab_url_clean = "https://example.org".into();
        ok.lab_http_status = Some(200);
        ok.lab_title = "Example Lab".into();
        let unfetched = EnrichedRecord::from_record(professor(2, "Hana"));

        write_enriched(&path, &[ok.clone(), unfetched.clone()]).unwrap();
        let loaded = read_enriched(&path).unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].lab_http_status, Some(200));
        assert_eq!(loaded[1].lab_http_status, None);
        assert_eq!(loaded[1].lab_error, "");
    }

    #[test]
    fn read_enriched_skips_malformed_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("enriched.csv");
        let mut ok = EnrichedRecord::from_record(professor(1, "Taro"));
        ok.lab_http_status = Some(200);
        write_enriched(&path, &[ok]).unwrap();

        // Append a row whose No column is the leaked header label.
        let mut contents = std::fs::read_to_string(&path).unwrap();
        contents.push_str("No,Field,Name,Aff,Topic,Kw,Web,Campus,,,,,,,\n");
        std::fs::write(&path, contents).unwrap();

        let loaded = read_enriched(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].no, 1);
    }
}
