//! Resumable archive downloads.
//!
//! A partial file left by an interrupted invocation is resumed with a
//! byte-range request; a file that already covers the remote length is
//! skipped entirely, which is what makes repeated installs cheap.

use futures_util::StreamExt;
use renutil_core::{Error, Result};
use renutil_ui::Progress;
use reqwest::header::{CONTENT_LENGTH, RANGE};
use reqwest::StatusCode;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Build the HTTP client used for archive downloads.
///
/// Only the connection attempt is bounded; large SDK archives can
/// legitimately take a long time to transfer.
pub fn client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| anyhow::anyhow!("failed to create HTTP client: {}", e).into())
}

/// Download `url` to `dest`, resuming a partial file if one exists.
pub async fn download(client: &reqwest::Client, url: &str, dest: &Path) -> Result<()> {
    let head = client
        .head(url)
        .send()
        .await
        .map_err(|e| anyhow::anyhow!("failed to reach {}: {}", url, e))?;

    if head.status() == StatusCode::NOT_FOUND {
        return Err(Error::PackageNotFound {
            url: url.to_string(),
        });
    }

    let total: u64 = head
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);

    let mut first_byte = fs::metadata(dest).map(|m| m.len()).unwrap_or(0);
    if total > 0 && first_byte >= total {
        debug!("Already downloaded: {}", dest.display());
        return Ok(());
    }

    let filename = url.rsplit('/').next().unwrap_or(url);
    debug!(
        "Downloading {} ({} of {} bytes present)",
        url, first_byte, total
    );

    let response = client
        .get(url)
        .header(RANGE, format!("bytes={}-", first_byte))
        .send()
        .await
        .map_err(|e| anyhow::anyhow!("failed to download {}: {}", url, e))?;

    if response.status() == StatusCode::NOT_FOUND {
        return Err(Error::PackageNotFound {
            url: url.to_string(),
        });
    }
    if !response.status().is_success() {
        return Err(anyhow::anyhow!("HTTP {} from {}", response.status(), url).into());
    }

    // A server that ignores the range request replays the whole body.
    if response.status() != StatusCode::PARTIAL_CONTENT {
        first_byte = 0;
    }

    let mut file = if first_byte > 0 {
        OpenOptions::new()
            .append(true)
            .open(dest)
            .map_err(|e| Error::io("failed to open download file", dest, e))?
    } else {
        fs::File::create(dest).map_err(|e| Error::io("failed to create download file", dest, e))?
    };

    let progress = if total > 0 {
        let bar = Progress::new(total, filename.to_string());
        bar.set_position(first_byte);
        Some(bar)
    } else {
        None
    };

    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| anyhow::anyhow!("download interrupted: {}", e))?;
        file.write_all(&chunk)
            .map_err(|e| Error::io("failed to write download data", dest, e))?;
        if let Some(ref bar) = progress {
            bar.inc(chunk.len() as u64);
        }
    }

    if let Some(bar) = progress {
        bar.finish(format!("Downloaded {}", filename));
    }

    Ok(())
}
