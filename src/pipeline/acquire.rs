//! PDF acquisition: download the laboratory list and persist it locally.
//!
//! Failure here is always fatal — the rest of the pipeline has nothing to
//! work with. The body is validated against the `%PDF` magic bytes *before*
//! anything touches the disk, so a failed run never leaves a partial or
//! bogus artifact behind for the extraction stage to trip over.

use crate::error::ScrapeError;
use std::path::Path;
use tracing::info;

/// Download the PDF at `url` and write it to `dest`.
///
/// A non-success HTTP status, a timeout, or a body without the PDF magic
/// bytes all abort the run; nothing is written in those cases.
pub async fn download_pdf(
    url: &str,
    dest: &Path,
    timeout_secs: u64,
    user_agent: &str,
) -> Result<(), ScrapeError> {
    info!("Downloading PDF from: {url}");

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .user_agent(user_agent)
        .build()
        .map_err(|e| ScrapeError::Internal(format!("failed to build HTTP client: {e}")))?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            ScrapeError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            ScrapeError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(ScrapeError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response.bytes().await.map_err(|e| {
        if e.is_timeout() {
            ScrapeError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            ScrapeError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if bytes.len() < 4 || &bytes[..4] != b"%PDF" {
        let mut magic = [0u8; 4];
        let n = bytes.len().min(4);
        magic[..n].copy_from_slice(&bytes[..n]);
        return Err(ScrapeError::NotAPdf {
            url: url.to_string(),
            magic,
        });
    }

    tokio::fs::write(dest, &bytes)
        .await
        .map_err(|e| ScrapeError::Io {
            path: dest.to_path_buf(),
            source: e,
        })?;

    info!("Saved PDF ({} bytes) to {}", bytes.len(), dest.display());
    Ok(())
}
