//! CLI binary for ku-star-labs.
//!
//! A thin shim over the library crate: subcommands map onto pipeline stages,
//! plus an interactive search menu over the enriched dataset. All matching,
//! cleanup, and export logic lives in the library; this file is flags,
//! prompts, and printing.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use ku_star_labs::{
    dataset, pipeline, search, EnrichProgressCallback, EnrichedRecord, PipelineConfig,
    ProgressCallback,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Download the PDF and extract raw table rows
  kustar scrape

  # Raw rows -> clean professor records
  kustar normalize

  # Visit each lab webpage (sequential, 1s politeness delay)
  kustar enrich

  # Same, but 4 pages in flight and a faster delay
  kustar enrich --concurrency 4 --delay-ms 250

  # Full pipeline in one go
  kustar run

  # Interactive field/campus/keyword search over the enriched dataset
  kustar search

  # Export the enriched dataset as JSON
  kustar export-json

FILES (override with the global path flags):
  ku_star_labs.pdf                   downloaded PDF
  ku_star_labs_raw.csv               raw extracted rows (no header)
  ku_star_professors_clean.csv       clean dataset
  ku_star_professors_enriched.csv    enriched dataset
  ku_star_professors.json            JSON projection
"#;

/// Scrape, clean, enrich, and search the KU-STAR laboratory list.
#[derive(Parser, Debug)]
#[command(
    name = "kustar",
    version,
    about = "Scrape, clean, enrich, and search the KU-STAR laboratory list",
    arg_required_else_help = true,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// URL of the laboratory-list PDF.
    #[arg(long, env = "KUSTAR_PDF_URL", global = true)]
    pdf_url: Option<String>,

    /// Local path for the downloaded PDF.
    #[arg(long, env = "KUSTAR_PDF_PATH", global = true)]
    pdf_path: Option<PathBuf>,

    /// Raw extraction output CSV (unheadered).
    #[arg(long, env = "KUSTAR_RAW_CSV", global = true)]
    raw_csv: Option<PathBuf>,

    /// Clean dataset CSV.
    #[arg(long, env = "KUSTAR_CLEAN_CSV", global = true)]
    clean_csv: Option<PathBuf>,

    /// Enriched dataset CSV.
    #[arg(long, env = "KUSTAR_ENRICHED_CSV", global = true)]
    enriched_csv: Option<PathBuf>,

    /// JSON export path.
    #[arg(long, env = "KUSTAR_JSON_PATH", global = true)]
    json_path: Option<PathBuf>,

    /// Physical index of the header row in the raw table.
    #[arg(long, env = "KUSTAR_HEADER_ROW", global = true)]
    header_row: Option<usize>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "KUSTAR_VERBOSE", global = true)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "KUSTAR_QUIET", global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download the PDF and extract raw table rows.
    Scrape,
    /// Turn raw rows into the clean professor dataset.
    Normalize,
    /// Fetch each lab webpage and write the enriched dataset.
    Enrich {
        /// Politeness delay after each fetch, in milliseconds.
        #[arg(long, env = "KUSTAR_DELAY_MS", default_value_t = 1000)]
        delay_ms: u64,

        /// Lab pages in flight at once (1 = strictly sequential).
        #[arg(long, env = "KUSTAR_CONCURRENCY", default_value_t = 1)]
        concurrency: usize,

        /// Per-page fetch timeout in seconds.
        #[arg(long, env = "KUSTAR_FETCH_TIMEOUT", default_value_t = 10)]
        timeout_secs: u64,

        /// Disable the progress bar.
        #[arg(long)]
        no_progress: bool,
    },
    /// Run scrape, normalize, and enrich back to back.
    Run {
        /// Politeness delay after each fetch, in milliseconds.
        #[arg(long, env = "KUSTAR_DELAY_MS", default_value_t = 1000)]
        delay_ms: u64,

        /// Lab pages in flight at once (1 = strictly sequential).
        #[arg(long, env = "KUSTAR_CONCURRENCY", default_value_t = 1)]
        concurrency: usize,
    },
    /// Interactive search over the enriched dataset.
    Search,
    /// Export the enriched dataset as a JSON array.
    ExportJson,
}

// ── Enrichment progress bar ──────────────────────────────────────────────

/// Drives an indicatif bar from library progress events.
struct BarCallback {
    bar: ProgressBar,
}

impl BarCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len}  {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  "),
        );
        bar.set_prefix("Enriching");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl EnrichProgressCallback for BarCallback {
    fn on_enrich_start(&self, total_records: usize) {
        self.bar.set_length(total_records as u64);
    }

    fn on_record_start(&self, _index: usize, _total: usize, url: &str) {
        self.bar.set_message(url.to_string());
    }

    fn on_record_skipped(&self, _index: usize, _total: usize) {
        self.bar.inc(1);
    }

    fn on_record_complete(&self, _index: usize, _total: usize, _status: u16) {
        self.bar.inc(1);
    }

    fn on_record_error(&self, _index: usize, _total: usize, error: &str) {
        self.bar.println(format!("  ✗ {error}"));
        self.bar.inc(1);
    }

    fn on_enrich_complete(&self, _total: usize, _fetched: usize, _failed: usize) {
        self.bar.finish_and_clear();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Scrape => {
            let config = build_config(&cli, None)?;
            scrape(&config).await
        }
        Command::Normalize => {
            let config = build_config(&cli, None)?;
            normalize(&config)
        }
        Command::Enrich {
            delay_ms,
            concurrency,
            timeout_secs,
            no_progress,
        } => {
            let progress = (!cli.quiet && !no_progress).then(|| BarCallback::new() as ProgressCallback);
            let config = build_config(&cli, progress)?
                .into_builder()
                .fetch_delay_ms(delay_ms)
                .concurrency(concurrency)
                .fetch_timeout_secs(timeout_secs)
                .build()
                .context("Invalid configuration")?;
            enrich(&config).await
        }
        Command::Run {
            delay_ms,
            concurrency,
        } => {
            let progress = (!cli.quiet).then(|| BarCallback::new() as ProgressCallback);
            let config = build_config(&cli, progress)?
                .into_builder()
                .fetch_delay_ms(delay_ms)
                .concurrency(concurrency)
                .build()
                .context("Invalid configuration")?;
            scrape(&config).await?;
            normalize(&config)?;
            enrich(&config).await
        }
        Command::Search => {
            let config = build_config(&cli, None)?;
            run_search_menu(&config)
        }
        Command::ExportJson => {
            let config = build_config(&cli, None)?;
            let count = ku_star_labs::project_json(&config.enriched_csv, &config.json_path)
                .context("JSON export failed")?;
            println!(
                "Exported {count} records to {}",
                config.json_path.display()
            );
            Ok(())
        }
    }
}

/// Map global CLI flags onto a `PipelineConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<PipelineConfig> {
    let mut builder = PipelineConfig::builder();
    if let Some(ref url) = cli.pdf_url {
        builder = builder.pdf_url(url.clone());
    }
    if let Some(ref path) = cli.pdf_path {
        builder = builder.pdf_path(path.clone());
    }
    if let Some(ref path) = cli.raw_csv {
        builder = builder.raw_csv(path.clone());
    }
    if let Some(ref path) = cli.clean_csv {
        builder = builder.clean_csv(path.clone());
    }
    if let Some(ref path) = cli.enriched_csv {
        builder = builder.enriched_csv(path.clone());
    }
    if let Some(ref path) = cli.json_path {
        builder = builder.json_path(path.clone());
    }
    if let Some(index) = cli.header_row {
        builder = builder.header_row(index);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }
    builder.build().context("Invalid configuration")
}

// ── Stage drivers ────────────────────────────────────────────────────────

async fn scrape(config: &PipelineConfig) -> Result<()> {
    pipeline::acquire::download_pdf(
        &config.pdf_url,
        &config.pdf_path,
        config.download_timeout_secs,
        &config.user_agent,
    )
    .await
    .context("PDF download failed")?;

    // pdfplumber is synchronous and CPU-bound; keep it off the async runtime.
    let pdf_path = config.pdf_path.clone();
    let rows = tokio::task::spawn_blocking(move || pipeline::extract::extract_rows(&pdf_path))
        .await
        .context("extraction task panicked")?
        .context("Table extraction failed")?;

    dataset::write_raw_rows(&config.raw_csv, &rows).context("Failed to write raw CSV")?;
    println!(
        "Extracted {} raw rows to {}",
        rows.len(),
        config.raw_csv.display()
    );
    Ok(())
}

fn normalize(config: &PipelineConfig) -> Result<()> {
    let rows = dataset::read_raw_rows(&config.raw_csv).context("Failed to read raw CSV")?;
    let records = pipeline::normalize::normalize_rows(&rows, config.header_row)
        .context("Normalization failed")?;
    dataset::write_clean(&config.clean_csv, &records).context("Failed to write clean CSV")?;
    println!(
        "Normalized {} records to {}",
        records.len(),
        config.clean_csv.display()
    );
    Ok(())
}

async fn enrich(config: &PipelineConfig) -> Result<()> {
    let records = dataset::read_clean(&config.clean_csv).context("Failed to read clean CSV")?;
    let (enriched, stats) = pipeline::enrich::enrich_records(records, config)
        .await
        .context("Enrichment failed")?;
    dataset::write_enriched(&config.enriched_csv, &enriched)
        .context("Failed to write enriched CSV")?;
    println!(
        "Enriched {} records ({} fetched, {} failed, {} without URL) in {:.1}s → {}",
        stats.total,
        stats.fetched,
        stats.failed,
        stats.skipped,
        stats.duration_ms as f64 / 1000.0,
        config.enriched_csv.display()
    );
    Ok(())
}

// ── Interactive search menu ──────────────────────────────────────────────

fn run_search_menu(config: &PipelineConfig) -> Result<()> {
    let records =
        dataset::read_enriched(&config.enriched_csv).context("Failed to load enriched dataset")?;
    show_overview(&records);

    loop {
        println!("\n=== KU-STAR Lab Search Menu ===");
        println!("1. Search by Field (e.g., 'Informatics', 'Biological Sciences')");
        println!("2. Search by Campus (e.g., 'Yoshida')");
        println!("3. Search by Keyword (e.g., 'AI', 'energy', 'climate')");
        println!("4. Exit");
        let choice = prompt("Enter your choice (1-4): ")?;

        match choice.as_str() {
            "1" => {
                let query = prompt("Enter field text to search: ")?;
                run_one_search(&records, &query, "labs_by_field", search::by_field)?;
            }
            "2" => {
                let query = prompt("Enter campus text to search: ")?;
                run_one_search(&records, &query, "labs_by_campus", search::by_campus)?;
            }
            "3" => {
                let query = prompt("Enter keyword to search in topics/keywords/snippets: ")?;
                run_one_search(&records, &query, "labs_by_keyword", search::by_keyword)?;
            }
            "4" => {
                println!("Goodbye.");
                return Ok(());
            }
            other => println!("Invalid choice '{other}'. Please enter 1-4."),
        }
    }
}

fn run_one_search<'a>(
    records: &'a [EnrichedRecord],
    query: &str,
    default_name: &str,
    search_fn: impl Fn(&'a [EnrichedRecord], &str) -> Vec<&'a EnrichedRecord>,
) -> Result<()> {
    if query.trim().is_empty() {
        println!("Empty query.");
        return Ok(());
    }

    let results = search_fn(records, query);
    println!("\nFound {} labs for '{}':", results.len(), query.trim());
    print!("{}", search::render_preview(&results));

    if results.is_empty() {
        return Ok(());
    }

    let save = prompt(&format!(
        "Save these {} results to CSV? (y/n): ",
        results.len()
    ))?;
    if save.to_lowercase() != "y" {
        return Ok(());
    }

    let name = prompt(&format!(
        "Enter filename (or press Enter for '{default_name}'): "
    ))?;
    let name = if name.is_empty() {
        default_name.to_string()
    } else {
        name
    };
    let filename = search::ensure_csv_extension(&name);
    let count = search::export_results(filename.as_ref(), &results)
        .context("Failed to save search results")?;
    println!("Saved {count} results to {filename}");
    Ok(())
}

fn show_overview(records: &[EnrichedRecord]) {
    println!("=== Dataset Overview ===");
    println!("Total labs/professors: {}", records.len());
    println!("\nLabs per Field:");
    for (field, count) in search::field_counts(records) {
        println!("  {field}: {count}");
    }
    println!("\nLabs per Campus:");
    for (campus, count) in search::campus_counts(records) {
        println!("  {campus}: {count}");
    }
}

fn prompt(message: &str) -> Result<String> {
    print!("{message}");
    io::stdout().flush().context("Failed to flush stdout")?;
    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(line.trim().to_string())
}
