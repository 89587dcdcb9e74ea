//! Configuration for a pipeline run.
//!
//! All stage behaviour is controlled through [`PipelineConfig`], built via
//! its [`PipelineConfigBuilder`]. The original tooling this crate replaces
//! kept its file paths as implicit module-level constants; making every path
//! an explicit config field lets each stage run against substitute
//! paths/fixtures in tests and keeps two runs diffable.
//!
//! Defaults reproduce the published KU-STAR workflow: the fixed PDF URL, the
//! well-known artifact filenames, a 10 s per-page fetch timeout, a 1 s
//! politeness delay, and strictly sequential fetching.

use crate::error::ScrapeError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;

/// Source URL of the KU-STAR laboratory list PDF.
pub const DEFAULT_PDF_URL: &str = "https://www.kugd.k.kyoto-u.ac.jp/wp-content/uploads/2025/11/Appendix-KU-STAR-Program-Laboratory-List_as-of-20251028";

/// User-agent sent on every outbound request, so target servers can identify
/// (and if need be, contact) this scraper.
pub const DEFAULT_USER_AGENT: &str = "ku-star-labs/0.3 (research scraper; contact: maintainer@example.com)";

/// Configuration for the scrape/normalize/enrich/export pipeline.
///
/// Built via [`PipelineConfig::builder()`] or [`PipelineConfig::default()`].
///
/// # Example
/// ```rust
/// use ku_star_labs::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .fetch_delay_ms(500)
///     .concurrency(4)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct PipelineConfig {
    /// URL the laboratory-list PDF is downloaded from.
    pub pdf_url: String,

    /// Where the downloaded PDF is persisted.
    pub pdf_path: PathBuf,

    /// Raw extraction output: unheadered CSV, one line per harvested row.
    pub raw_csv: PathBuf,

    /// Clean dataset of [`crate::records::ProfessorRecord`] rows.
    pub clean_csv: PathBuf,

    /// Enriched dataset of [`crate::records::EnrichedRecord`] rows.
    pub enriched_csv: PathBuf,

    /// JSON projection output path.
    pub json_path: PathBuf,

    /// Physical index of the header row inside the raw table. Default: 1.
    ///
    /// The source document places a banner row above the column names, so the
    /// header is the second physical row. This is deliberate coupling to one
    /// known layout — kept configurable so a layout change means recalibrating
    /// one number instead of silently mis-parsing.
    pub header_row: usize,

    /// User-agent header for the PDF download and every lab-page fetch.
    pub user_agent: String,

    /// Timeout for the PDF download in seconds. Default: 60.
    pub download_timeout_secs: u64,

    /// Timeout per lab-page fetch in seconds. Default: 10.
    pub fetch_timeout_secs: u64,

    /// Unconditional politeness delay after each fetched record, in
    /// milliseconds. Default: 1000.
    ///
    /// This is a fixed throughput ceiling, not adaptive backoff: it bounds
    /// load on the (small, academic) target servers and keeps output order
    /// deterministic.
    pub fetch_delay_ms: u64,

    /// Number of lab pages fetched at once. Default: 1 (strictly sequential).
    ///
    /// Values above 1 use a bounded, order-preserving worker pool. Each
    /// record still gets at most one fetch attempt and no retries; only the
    /// overlap changes. Leave at 1 unless the target servers can take it.
    pub concurrency: usize,

    /// Character cap for the visible-text snippet. Default: 300.
    pub snippet_max_chars: usize,

    /// Optional per-record progress events during enrichment.
    pub progress: Option<ProgressCallback>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            pdf_url: DEFAULT_PDF_URL.to_string(),
            pdf_path: PathBuf::from("ku_star_labs.pdf"),
            raw_csv: PathBuf::from("ku_star_labs_raw.csv"),
            clean_csv: PathBuf::from("ku_star_professors_clean.csv"),
            enriched_csv: PathBuf::from("ku_star_professors_enriched.csv"),
            json_path: PathBuf::from("ku_star_professors.json"),
            header_row: 1,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            download_timeout_secs: 60,
            fetch_timeout_secs: 10,
            fetch_delay_ms: 1000,
            concurrency: 1,
            snippet_max_chars: 300,
            progress: None,
        }
    }
}

impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("pdf_url", &self.pdf_url)
            .field("pdf_path", &self.pdf_path)
            .field("raw_csv", &self.raw_csv)
            .field("clean_csv", &self.clean_csv)
            .field("enriched_csv", &self.enriched_csv)
            .field("json_path", &self.json_path)
            .field("header_row", &self.header_row)
            .field("user_agent", &self.user_agent)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .field("fetch_delay_ms", &self.fetch_delay_ms)
            .field("concurrency", &self.concurrency)
            .field("snippet_max_chars", &self.snippet_max_chars)
            .field("progress", &self.progress.as_ref().map(|_| "<dyn EnrichProgressCallback>"))
            .finish()
    }
}

impl PipelineConfig {
    /// Create a new builder for `PipelineConfig`.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            config: Self::default(),
        }
    }

    /// Reopen a built configuration for further adjustment.
    pub fn into_builder(self) -> PipelineConfigBuilder {
        PipelineConfigBuilder { config: self }
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Debug)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn pdf_url(mut self, url: impl Into<String>) -> Self {
        self.config.pdf_url = url.into();
        self
    }

    pub fn pdf_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdf_path = path.into();
        self
    }

    pub fn raw_csv(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.raw_csv = path.into();
        self
    }

    pub fn clean_csv(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.clean_csv = path.into();
        self
    }

    pub fn enriched_csv(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.enriched_csv = path.into();
        self
    }

    pub fn json_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.json_path = path.into();
        self
    }

    pub fn header_row(mut self, index: usize) -> Self {
        self.config.header_row = index;
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn fetch_timeout_secs(mut self, secs: u64) -> Self {
        self.config.fetch_timeout_secs = secs;
        self
    }

    pub fn fetch_delay_ms(mut self, ms: u64) -> Self {
        self.config.fetch_delay_ms = ms;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn snippet_max_chars(mut self, n: usize) -> Self {
        self.config.snippet_max_chars = n;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PipelineConfig, ScrapeError> {
        let c = &self.config;
        if c.pdf_url.is_empty() {
            return Err(ScrapeError::InvalidConfig("pdf_url must not be empty".into()));
        }
        if c.concurrency == 0 {
            return Err(ScrapeError::InvalidConfig("concurrency must be ≥ 1".into()));
        }
        if c.snippet_max_chars == 0 {
            return Err(ScrapeError::InvalidConfig(
                "snippet_max_chars must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_published_workflow() {
        let config = PipelineConfig::default();
        assert_eq!(config.header_row, 1);
        assert_eq!(config.fetch_timeout_secs, 10);
        assert_eq!(config.fetch_delay_ms, 1000);
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.snippet_max_chars, 300);
        assert_eq!(config.pdf_path, PathBuf::from("ku_star_labs.pdf"));
    }

    #[test]
    fn builder_clamps_concurrency() {
        let config = PipelineConfig::builder().concurrency(0).build().unwrap();
        assert_eq!(config.concurrency, 1);
    }

    #[test]
    fn builder_rejects_empty_url() {
        let err = PipelineConfig::builder().pdf_url("").build().unwrap_err();
        assert!(err.to_string().contains("pdf_url"));
    }

    #[test]
    fn debug_does_not_require_callback_debug() {
        let config = PipelineConfig::default();
        let s = format!("{config:?}");
        assert!(s.contains("header_row"));
    }
}
