//! Query primitives over the enriched dataset.
//!
//! Three searches, all case-insensitive substring matches:
//!
//! * **field**   — against the discipline column,
//! * **campus**  — against the campus column,
//! * **keyword** — against a per-record blob of research topic, keywords,
//!   and webpage snippet (see [`EnrichedRecord::search_blob`]).
//!
//! The interactive menu itself lives in the `kustar` binary; this module is
//! only the matching, preview-rendering, and export logic so all of it can
//! be tested without a terminal. None of these functions fail: an empty or
//! unmatched query is an empty result, never an error.

use crate::dataset;
use crate::error::ScrapeError;
use crate::records::EnrichedRecord;
use std::collections::HashMap;
use std::path::Path;

/// Maximum number of matches shown in a preview.
pub const PREVIEW_CAP: usize = 15;

/// Width cap per preview cell, so one long title cannot wreck the table.
const PREVIEW_CELL_WIDTH: usize = 28;

/// Columns shown in result previews, in order.
const PREVIEW_COLUMNS: [&str; 8] = [
    "No",
    "Field",
    "Name",
    "Affiliation",
    "Campus",
    "LabURLClean",
    "LabTitle",
    "LabEmail",
];

/// Records whose discipline contains the query (case-insensitive).
/// A blank query matches nothing.
pub fn by_field<'a>(records: &'a [EnrichedRecord], query: &str) -> Vec<&'a EnrichedRecord> {
    filter(records, query, |record, needle| {
        record.field.to_lowercase().contains(needle)
    })
}

/// Records whose campus contains the query (case-insensitive).
pub fn by_campus<'a>(records: &'a [EnrichedRecord], query: &str) -> Vec<&'a EnrichedRecord> {
    filter(records, query, |record, needle| {
        record.campus.to_lowercase().contains(needle)
    })
}

/// Records whose combined topic/keywords/snippet blob contains the query
/// (case-insensitive).
pub fn by_keyword<'a>(records: &'a [EnrichedRecord], query: &str) -> Vec<&'a EnrichedRecord> {
    filter(records, query, |record, needle| {
        record.search_blob().contains(needle)
    })
}

fn filter<'a>(
    records: &'a [EnrichedRecord],
    query: &str,
    matches: impl Fn(&EnrichedRecord, &str) -> bool,
) -> Vec<&'a EnrichedRecord> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    records
        .iter()
        .filter(|record| matches(record, &needle))
        .collect()
}

// ── Dataset overview ─────────────────────────────────────────────────────

/// Per-field record counts, most frequent first (ties by name).
pub fn field_counts(records: &[EnrichedRecord]) -> Vec<(String, usize)> {
    counts(records.iter().map(|r| r.field.as_str()))
}

/// Per-campus record counts, most frequent first (ties by name).
pub fn campus_counts(records: &[EnrichedRecord]) -> Vec<(String, usize)> {
    counts(records.iter().map(|r| r.campus.as_str()))
}

fn counts<'a>(values: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut map: HashMap<String, usize> = HashMap::new();
    for value in values {
        let key = if value.is_empty() { "(unknown)" } else { value };
        *map.entry(key.to_string()).or_insert(0) += 1;
    }
    let mut pairs: Vec<(String, usize)> = map.into_iter().collect();
    pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    pairs
}

// ── Presentation helpers ─────────────────────────────────────────────────

/// Render up to [`PREVIEW_CAP`] matches as an aligned text table, followed
/// by the total match count. Returns an explanatory line for empty input.
pub fn render_preview(results: &[&EnrichedRecord]) -> String {
    if results.is_empty() {
        return "No results.\n".to_string();
    }

    let shown = &results[..results.len().min(PREVIEW_CAP)];
    let mut table: Vec<Vec<String>> = Vec::with_capacity(shown.len() + 1);
    table.push(PREVIEW_COLUMNS.iter().map(|c| c.to_string()).collect());
    for record in shown {
        table.push(vec![
            record.no.to_string(),
            clip(&record.field),
            clip(&record.name),
            clip(&record.affiliation),
            clip(&record.campus),
            clip(&record.lab_url_clean),
            clip(&record.lab_title),
            clip(&record.lab_email),
        ]);
    }

    let widths: Vec<usize> = (0..PREVIEW_COLUMNS.len())
        .map(|col| table.iter().map(|row| row[col].chars().count()).max().unwrap_or(0))
        .collect();

    let mut out = String::new();
    for row in &table {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }
    out.push_str(&format!(
        "\n{} match(es) total, showing up to {PREVIEW_CAP}.\n",
        results.len()
    ));
    out
}

fn clip(text: &str) -> String {
    if text.chars().count() > PREVIEW_CELL_WIDTH {
        let mut cut: String = text.chars().take(PREVIEW_CELL_WIDTH - 1).collect();
        cut.push('…');
        cut
    } else {
        text.to_string()
    }
}

/// Append `.csv` unless the operator already typed it.
pub fn ensure_csv_extension(name: &str) -> String {
    if name.ends_with(".csv") {
        name.to_string()
    } else {
        format!("{name}.csv")
    }
}

/// Persist the **full** (uncapped) match set with the enriched columns.
pub fn export_results(path: &Path, results: &[&EnrichedRecord]) -> Result<usize, ScrapeError> {
    let owned: Vec<EnrichedRecord> = results.iter().map(|r| (*r).clone()).collect();
    dataset::write_enriched(path, &owned)?;
    Ok(owned.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::ProfessorRecord;

    fn record(no: u32, field: &str, campus: &str, topic: &str, keywords: &str) -> EnrichedRecord {
        EnrichedRecord::from_record(ProfessorRecord {
            no,
            field: field.into(),
            name: format!("Prof {no}"),
            affiliation: String::new(),
            research_topic: topic.into(),
            keywords: keywords.into(),
            webpages: String::new(),
            campus: campus.into(),
        })
    }

    fn dataset() -> Vec<EnrichedRecord> {
        vec![
            record(1, "Informatics", "Yoshida", "AI ethics", ""),
            record(2, "Chemistry", "Uji", "Catalysis", "surface chemistry"),
            record(3, "Energy Science", "Uji", "Solar cells", "perovskite"),
        ]
    }

    #[test]
    fn keyword_search_is_case_insensitive() {
        let records = dataset();
        let lower = by_keyword(&records, "ai");
        let upper = by_keyword(&records, "AI");
        assert_eq!(lower.len(), 1);
        assert_eq!(lower[0].no, 1);
        assert_eq!(upper.len(), 1);
        assert_eq!(upper[0].no, 1);
    }

    #[test]
    fn keyword_search_covers_snippet() {
        let mut records = dataset();
        records[1].lab_snippet = "We study heterogeneous CATALYSTS daily".into();
        let results = by_keyword(&records, "catalysts");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].no, 2);
    }

    #[test]
    fn field_and_campus_search() {
        let records = dataset();
        assert_eq!(by_field(&records, "chem").len(), 1);
        assert_eq!(by_campus(&records, "uji").len(), 2);
        assert_eq!(by_campus(&records, "katsura").len(), 0);
    }

    #[test]
    fn blank_query_matches_nothing() {
        let records = dataset();
        assert!(by_field(&records, "").is_empty());
        assert!(by_keyword(&records, "   ").is_empty());
    }

    #[test]
    fn counts_sorted_by_frequency_then_name() {
        let records = dataset();
        let campuses = campus_counts(&records);
        assert_eq!(campuses[0], ("Uji".to_string(), 2));
        assert_eq!(campuses[1], ("Yoshida".to_string(), 1));
    }

    #[test]
    fn preview_caps_rows_but_reports_full_count() {
        let records: Vec<EnrichedRecord> = (1..=20)
            .map(|no| record(no, "Informatics", "Yoshida", "AI", ""))
            .collect();
        let refs: Vec<&EnrichedRecord> = records.iter().collect();
        let preview = render_preview(&refs);
        // header + PREVIEW_CAP data rows
        let data_rows = preview.lines().take_while(|l| !l.is_empty()).count() - 1;
        assert_eq!(data_rows, PREVIEW_CAP);
        assert!(preview.contains("20 match(es) total"));
    }

    #[test]
    fn preview_of_nothing_is_explanatory() {
        assert_eq!(render_preview(&[]), "No results.\n");
    }

    #[test]
    fn csv_extension_appended_once() {
        assert_eq!(ensure_csv_extension("labs_by_field"), "labs_by_field.csv");
        assert_eq!(ensure_csv_extension("out.csv"), "out.csv");
    }
}
