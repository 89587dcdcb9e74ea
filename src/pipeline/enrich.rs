//! Web enrichment: fetch each lab's webpage once and record what it says.
//!
//! For every clean record with a webpage reference this stage normalizes the
//! URL, performs at most one bounded GET, and attaches the HTTP status, the
//! page `<title>`, the first `mailto:` contact address, and a capped
//! visible-text snippet. Any failure — timeout, transport error, non-200
//! status — becomes text in the record's `LabError` column and processing
//! moves on. There are no retries.
//!
//! ## Rate control
//!
//! After every fetch attempt the stage sleeps for the configured politeness
//! delay. This is a fixed, unconditional throughput ceiling protecting small
//! academic web servers, not adaptive backoff. Fetching is strictly
//! sequential by default; `concurrency > 1` switches to a bounded,
//! order-preserving worker pool that keeps the one-fetch-per-record and
//! no-retry semantics.

use crate::config::PipelineConfig;
use crate::error::{FetchError, ScrapeError};
use crate::records::{EnrichedRecord, ProfessorRecord};
use futures::stream::{self, StreamExt};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::time::Instant;
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};

// Selector parsing only fails on malformed CSS syntax, which cannot occur
// with these constants.
static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("title").expect("title selector"));
static ANCHOR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("anchor selector"));

/// What a successful fetch of a lab page yields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFacts {
    pub status: u16,
    pub title: String,
    pub email: String,
    pub snippet: String,
}

/// Counters for one enrichment run.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnrichStats {
    /// Records processed in total.
    pub total: usize,
    /// Records fetched and parsed successfully.
    pub fetched: usize,
    /// Records with a per-record error recorded.
    pub failed: usize,
    /// Records without a webpage reference (no fetch attempted).
    pub skipped: usize,
    /// Wall-clock duration of the whole run, including politeness delays.
    pub duration_ms: u64,
}

// ── URL normalization ────────────────────────────────────────────────────

/// Clean a webpage reference from the PDF: drop *all* whitespace (line-wrap
/// artifacts split URLs mid-token, e.g. `"k yoto-u.ac.jp"`), and prepend
/// `https://` when no scheme is present. Empty input stays empty.
///
/// Idempotent: normalizing an already-normalized URL is a no-op.
pub fn normalize_url(raw: &str) -> String {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return String::new();
    }
    if compact.starts_with("http://") || compact.starts_with("https://") {
        compact
    } else {
        format!("https://{compact}")
    }
}

// ── HTML fact extraction ─────────────────────────────────────────────────

/// Parse a fetched body and pull out the title, first contact address, and
/// a snippet capped at `snippet_max_chars` characters.
pub fn extract_page_facts(status: u16, body: &str, snippet_max_chars: usize) -> PageFacts {
    let document = Html::parse_document(body);
    PageFacts {
        status,
        title: page_title(&document),
        email: first_mailto(&document),
        snippet: truncate_snippet(&visible_text(&document), snippet_max_chars),
    }
}

/// Trimmed text of the first `<title>` element, or empty.
fn page_title(document: &Html) -> String {
    document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .unwrap_or_default()
}

/// First `mailto:` link target in document order, prefix stripped and
/// trimmed, or empty when the page advertises no address.
fn first_mailto(document: &Html) -> String {
    for anchor in document.select(&ANCHOR_SELECTOR) {
        if let Some(href) = anchor.value().attr("href") {
            if let Some(address) = href.strip_prefix("mailto:") {
                return address.trim().to_string();
            }
        }
    }
    String::new()
}

/// All visible text with script/style/noscript content removed and
/// whitespace collapsed to single spaces.
fn visible_text(document: &Html) -> String {
    let mut buffer = String::new();
    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .parent()
            .and_then(ElementRef::wrap)
            .map(|el| matches!(el.value().name(), "script" | "style" | "noscript"))
            .unwrap_or(false);
        if hidden {
            continue;
        }
        buffer.push_str(text);
        buffer.push(' ');
    }
    collapse_whitespace(&buffer)
}

fn collapse_whitespace(input: &str) -> String {
    let mut buf = String::with_capacity(input.len());
    let mut last_space = false;
    for ch in input.chars() {
        if ch.is_whitespace() {
            if !last_space && !buf.is_empty() {
                buf.push(' ');
            }
            last_space = true;
        } else {
            buf.push(ch);
            last_space = false;
        }
    }
    buf.trim_end().to_string()
}

/// Cap the snippet at `max_chars` characters, appending an ellipsis marker
/// only when something was actually cut off.
fn truncate_snippet(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let mut cut: String = text.chars().take(max_chars).collect();
        cut.push_str("...");
        cut
    } else {
        text.to_string()
    }
}

// ── Fetching ─────────────────────────────────────────────────────────────

/// One bounded GET against a cleaned URL.
async fn fetch_lab_page(
    client: &reqwest::Client,
    url: &str,
    snippet_max_chars: usize,
) -> Result<PageFacts, FetchError> {
    let response = client.get(url).send().await?;
    let status = response.status().as_u16();
    if status != 200 {
        return Err(FetchError::Status(status));
    }
    let body = response.text().await?;
    Ok(extract_page_facts(status, &body, snippet_max_chars))
}

// ── Stage entry point ────────────────────────────────────────────────────

/// Enrich every record, strictly in input order.
///
/// Records whose cleaned URL is empty are passed through with all
/// enrichment fields empty and no error; everything else gets exactly one
/// fetch attempt. The returned vector is always the same length and order
/// as the input — per-record failures are data, not errors.
pub async fn enrich_records(
    records: Vec<ProfessorRecord>,
    config: &PipelineConfig,
) -> Result<(Vec<EnrichedRecord>, EnrichStats), ScrapeError> {
    let start = Instant::now();
    let total = records.len();
    info!(
        "Enriching {total} records (concurrency {}, delay {}ms)",
        config.concurrency, config.fetch_delay_ms
    );

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.fetch_timeout_secs))
        .user_agent(&config.user_agent)
        .build()
        .map_err(|e| ScrapeError::Internal(format!("failed to build HTTP client: {e}")))?;

    if let Some(ref cb) = config.progress {
        cb.on_enrich_start(total);
    }

    let enriched = if config.concurrency <= 1 {
        enrich_sequential(&client, records, config).await
    } else {
        enrich_concurrent(&client, records, config).await
    };

    let mut stats = EnrichStats {
        total,
        duration_ms: start.elapsed().as_millis() as u64,
        ..EnrichStats::default()
    };
    for record in &enriched {
        if record.lab_url_clean.is_empty() {
            stats.skipped += 1;
        } else if record.lab_error.is_empty() {
            stats.fetched += 1;
        } else {
            stats.failed += 1;
        }
    }

    if let Some(ref cb) = config.progress {
        cb.on_enrich_complete(total, stats.fetched, stats.failed);
    }
    info!(
        "Enrichment complete: {} fetched, {} failed, {} without URL, {}ms",
        stats.fetched, stats.failed, stats.skipped, stats.duration_ms
    );

    Ok((enriched, stats))
}

/// Default path: one record at a time, delay between fetches.
async fn enrich_sequential(
    client: &reqwest::Client,
    records: Vec<ProfessorRecord>,
    config: &PipelineConfig,
) -> Vec<EnrichedRecord> {
    let total = records.len();
    let mut out = Vec::with_capacity(total);
    for (index, record) in records.into_iter().enumerate() {
        out.push(enrich_one(client, record, index, total, config).await);
    }
    out
}

/// Bounded worker pool. `buffered` (not `buffer_unordered`) keeps output in
/// input order, so the enriched dataset stays deterministic.
async fn enrich_concurrent(
    client: &reqwest::Client,
    records: Vec<ProfessorRecord>,
    config: &PipelineConfig,
) -> Vec<EnrichedRecord> {
    let total = records.len();
    stream::iter(
        records
            .into_iter()
            .enumerate()
            .map(|(index, record)| enrich_one(client, record, index, total, config)),
    )
    .buffered(config.concurrency)
    .collect()
    .await
}

/// Process a single record: normalize, fetch at most once, attach facts or
/// the error, then observe the politeness delay.
async fn enrich_one(
    client: &reqwest::Client,
    record: ProfessorRecord,
    index: usize,
    total: usize,
    config: &PipelineConfig,
) -> EnrichedRecord {
    let mut enriched = EnrichedRecord::from_record(record);
    let clean = normalize_url(&enriched.lab_url_original);

    if clean.is_empty() {
        debug!("[{index}] No={} has no webpage, skipping", enriched.no);
        if let Some(ref cb) = config.progress {
            cb.on_record_skipped(index, total);
        }
        return enriched;
    }

    enriched.lab_url_clean = clean.clone();
    debug!("[{index}] Fetching: {clean}");
    if let Some(ref cb) = config.progress {
        cb.on_record_start(index, total, &clean);
    }

    match fetch_lab_page(client, &clean, config.snippet_max_chars).await {
        Ok(facts) => {
            enriched.lab_http_status = Some(facts.status);
            enriched.lab_title = facts.title;
            enriched.lab_email = facts.email;
            enriched.lab_snippet = facts.snippet;
            if let Some(ref cb) = config.progress {
                cb.on_record_complete(index, total, facts.status);
            }
        }
        Err(error) => {
            // A non-200 response still carries a status worth recording.
            if let FetchError::Status(code) = error {
                enriched.lab_http_status = Some(code);
            }
            enriched.lab_error = error.to_string();
            warn!("[{index}] {clean}: {}", enriched.lab_error);
            if let Some(ref cb) = config.progress {
                cb.on_record_error(index, total, &enriched.lab_error);
            }
        }
    }

    sleep(Duration::from_millis(config.fetch_delay_ms)).await;
    enriched
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_url_strips_line_wrap_artifacts() {
        assert_eq!(normalize_url(" k yoto-u.ac.jp "), "https://kyoto-u.ac.jp");
    }

    #[test]
    fn normalize_url_is_idempotent() {
        let once = normalize_url("example.org/lab");
        assert_eq!(once, "https://example.org/lab");
        assert_eq!(normalize_url(&once), once);
    }

    #[test]
    fn normalize_url_keeps_existing_scheme() {
        assert_eq!(normalize_url("http://example.org"), "http://example.org");
        assert_eq!(normalize_url("https://example.org"), "https://example.org");
    }

    #[test]
    fn normalize_url_empty_and_whitespace_only() {
        assert_eq!(normalize_url(""), "");
        assert_eq!(normalize_url("   \n "), "");
    }

    #[test]
    fn page_facts_from_simple_document() {
        let body = r#"
            <html><head><title> Example  Lab </title>
            <script>var hidden = "SECRET";</script>
            <style>.x { color: red }</style></head>
            <body>
              <noscript>enable javascript</noscript>
              <p>Welcome to the lab.</p>
              <a href="/about">About</a>
              <a href="mailto: taro@example.org ">Contact</a>
              <a href="mailto:second@example.org">Second</a>
            </body></html>
        "#;
        let facts = extract_page_facts(200, body, 300);
        assert_eq!(facts.status, 200);
        assert_eq!(facts.title, "Example Lab");
        assert_eq!(facts.email, "taro@example.org");
        assert!(facts.snippet.contains("Welcome to the lab."));
        assert!(!facts.snippet.contains("SECRET"));
        assert!(!facts.snippet.contains("enable javascript"));
        assert!(!facts.snippet.contains("color: red"));
    }

    #[test]
    fn missing_title_and_mailto_yield_empty_fields() {
        let facts = extract_page_facts(200, "<html><body><p>hi</p></body></html>", 300);
        assert_eq!(facts.title, "");
        assert_eq!(facts.email, "");
        assert_eq!(facts.snippet, "hi");
    }

    #[test]
    fn snippet_is_capped_with_ellipsis_marker() {
        let long_word = "a".repeat(400);
        let body = format!("<html><body><p>{long_word}</p></body></html>");
        let facts = extract_page_facts(200, &body, 300);
        assert_eq!(facts.snippet.chars().count(), 303);
        assert!(facts.snippet.ends_with("..."));
        assert_eq!(&facts.snippet[..300], &long_word[..300]);
    }

    #[test]
    fn short_snippet_has_no_marker() {
        let body = "<html><body><p>short text</p></body></html>";
        let facts = extract_page_facts(200, body, 300);
        assert_eq!(facts.snippet, "short text");
    }

    #[test]
    fn snippet_exactly_at_cap_has_no_marker() {
        let word = "b".repeat(300);
        let body = format!("<html><body><p>{word}</p></body></html>");
        let facts = extract_page_facts(200, &body, 300);
        assert_eq!(facts.snippet, word);
    }

    #[test]
    fn collapse_whitespace_squeezes_runs() {
        assert_eq!(collapse_whitespace("  a \n\t b  c "), "a b c");
    }
}
