//! Remote release catalog.
//!
//! Resolves "what versions exist online" by fetching the release listing
//! page and extracting anchor texts that parse as versions. Releases are
//! never persisted; every query recomputes them from the listing.

use regex_lite::Regex;
use renutil_core::{Error, Result, Version};
use renutil_registry::Registry;
use std::time::Duration;
use tracing::debug;

/// Base URL of the release archive listing.
pub const DEFAULT_BASE_URL: &str = "https://www.renpy.org/dl";

/// HTTP timeout for catalog requests.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// A version known to be downloadable, not necessarily installed.
#[derive(Debug, Clone)]
pub struct Release {
    /// Version of the release.
    pub version: Version,
    /// Download URL of the SDK archive.
    pub url: String,
}

impl PartialEq for Release {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
    }
}

impl Eq for Release {}

impl PartialOrd for Release {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Release {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.version.cmp(&other.version)
    }
}

/// Client for the remote release listing.
#[derive(Debug, Clone)]
pub struct ReleaseCatalog {
    base_url: String,
    client: reqwest::Client,
}

impl Default for ReleaseCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl ReleaseCatalog {
    /// Create a catalog pointed at the official listing.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a catalog with a custom base URL (used by tests and mirrors).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: reqwest::Client::builder()
                .timeout(FETCH_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }

    /// The SDK archive URL for a version.
    pub fn sdk_url(&self, version: &Version) -> String {
        format!(
            "{base}/{version}/renpy-{version}-sdk.zip",
            base = self.base_url,
            version = version
        )
    }

    /// The auxiliary Android toolchain (RAPT) archive URL for a version.
    pub fn rapt_url(&self, version: &Version) -> String {
        format!(
            "{base}/{version}/renpy-{version}-rapt.zip",
            base = self.base_url,
            version = version
        )
    }

    /// Fetch the listing and return all discoverable releases, newest first.
    ///
    /// Network failure is fatal; there is no cached fallback for the set of
    /// versions that exist online.
    pub async fn list_available(&self) -> Result<Vec<Release>> {
        let url = format!("{}/", self.base_url);
        debug!("Fetching release listing from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::CatalogUnreachable {
                source: Box::new(e),
            })?;

        if !response.status().is_success() {
            return Err(Error::CatalogUnreachable {
                source: anyhow::anyhow!("HTTP {} from {}", response.status(), url).into(),
            });
        }

        let body = response.text().await.map_err(|e| Error::CatalogUnreachable {
            source: Box::new(e),
        })?;

        Ok(self.parse_listing(&body))
    }

    /// Extract releases from the listing HTML.
    ///
    /// Each anchor whose text parses as a version becomes a release; the
    /// listing wraps versions in directory links with a trailing slash,
    /// which the version parser tolerates.
    pub fn parse_listing(&self, html: &str) -> Vec<Release> {
        // Anchor text only; hrefs are redundant with the URL template.
        let anchor = Regex::new(r"<a[^>]*>([^<]+)</a>").expect("anchor pattern is valid");

        let mut releases: Vec<Release> = Vec::new();
        for captures in anchor.captures_iter(html) {
            let text = captures.get(1).map(|m| m.as_str().trim()).unwrap_or("");
            let Ok(version) = text.parse::<Version>() else {
                continue;
            };
            if releases.iter().any(|r| r.version == version) {
                continue;
            }
            let url = self.sdk_url(&version);
            releases.push(Release { version, url });
        }
        releases.sort_by(|a, b| b.cmp(a));
        releases
    }

    /// Whether a version is installable: already registered locally, or
    /// present in the remote listing. An arbitrary syntactically-valid
    /// version that was never released is rejected.
    pub async fn is_valid_version(&self, version: &Version, registry: &Registry) -> Result<bool> {
        if registry.is_installed(version) {
            return Ok(true);
        }
        let releases = self.list_available().await?;
        Ok(releases.iter().any(|r| &r.version == version))
    }
}
