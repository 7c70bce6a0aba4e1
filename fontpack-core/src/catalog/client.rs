//! Remote catalog client
//!
//! Talks to a Google Fonts compatible catalog: a listing endpoint for
//! existence checks and a css2 endpoint whose stylesheets point at the
//! font binaries. The listing is fetched once per client and kept in memory
//! until [`CatalogClient::refresh`] is called.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::stylesheet::{descriptors_from_faces, parse_font_faces};
use super::types::{CatalogEntry, CatalogListing, FontFileDescriptor};
use super::variants::{canonical_variant, is_italic, weight_of};
use crate::config::{FontpackConfig, DEFAULT_CSS_BASE};
use crate::error::{FontpackError, Result};
use crate::paths::sanitize_family;

/// The css2 endpoint only serves woff2 URLs to modern browsers
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Operations the bundler and installer need from a font catalog
///
/// [`CatalogClient`] is the HTTP implementation; tests substitute their own.
#[async_trait]
pub trait FontCatalog: Send + Sync {
    /// Look up a family by name, ignoring case and whitespace
    async fn search(&self, family: &str) -> Result<Option<CatalogEntry>>;

    /// Downloadable files for the requested variants of a family
    async fn font_files(
        &self,
        family: &str,
        variants: &[String],
    ) -> Result<Vec<FontFileDescriptor>>;

    /// Fetch one file into `target_dir`, returning the written path
    async fn download(&self, descriptor: &FontFileDescriptor, target_dir: &Path)
        -> Result<PathBuf>;

    /// Public stylesheet URL for linking a family from the CDN
    fn stylesheet_url(&self, family: &str, variants: &[String]) -> String {
        stylesheet_url(DEFAULT_CSS_BASE, family, variants)
    }
}

/// Build a css2 URL: spaces become `+`, weights are sorted and joined by `;`
///
/// Upright-only requests use the `wght@400;700` axis. Once any italic is
/// requested the `ital,wght@0,400;1,700` tuple form is used instead, since
/// the `wght` axis alone only serves upright faces.
pub fn stylesheet_url(css_base: &str, family: &str, variants: &[String]) -> String {
    let mut faces: Vec<(u8, u16)> = variants
        .iter()
        .filter_map(|v| weight_of(v).map(|w| (u8::from(is_italic(v)), w)))
        .collect();
    faces.sort_unstable();
    faces.dedup();
    if faces.is_empty() {
        faces.push((0, 400));
    }

    let axes = if faces.iter().any(|(ital, _)| *ital == 1) {
        let tuples = faces
            .iter()
            .map(|(ital, w)| format!("{ital},{w}"))
            .collect::<Vec<_>>()
            .join(";");
        format!("ital,wght@{tuples}")
    } else {
        let weights = faces
            .iter()
            .map(|(_, w)| w.to_string())
            .collect::<Vec<_>>()
            .join(";");
        format!("wght@{weights}")
    };

    format!(
        "{}/css2?family={}:{}&display=swap",
        css_base.trim_end_matches('/'),
        family.trim().replace(' ', "+"),
        axes
    )
}

/// Deterministic file name for a downloaded variant
pub fn font_file_name(descriptor: &FontFileDescriptor) -> String {
    format!(
        "{}-{}.{}",
        sanitize_family(&descriptor.family),
        descriptor.variant,
        descriptor.format.extension()
    )
}

fn normalize_family(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// HTTP client for the remote font catalog
pub struct CatalogClient {
    client: reqwest::Client,
    api_base: String,
    css_base: String,
    api_key: Option<String>,
    api_key_env: String,
    listing: RwLock<Option<Arc<Vec<CatalogEntry>>>>,
}

impl CatalogClient {
    /// Create a client from configuration, reading the API key from the environment
    pub fn from_config(config: &FontpackConfig) -> Result<Self> {
        let mut client = Self::with_endpoints(&config.api_base, &config.css_base, config.api_key())?;
        client.api_key_env = config.api_key_env.clone();
        Ok(client)
    }

    /// Create a client against explicit endpoints
    pub fn with_endpoints(
        api_base: &str,
        css_base: &str,
        api_key: Option<String>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("fontpack/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            css_base: css_base.trim_end_matches('/').to_string(),
            api_key,
            api_key_env: crate::config::DEFAULT_API_KEY_ENV.to_string(),
            listing: RwLock::new(None),
        })
    }

    /// The full catalog listing, fetched on first use
    pub async fn list(&self) -> Result<Arc<Vec<CatalogEntry>>> {
        let cached = self.listing.read().await.clone();
        if let Some(cached) = cached {
            return Ok(cached);
        }

        // Fetched without holding the lock; a racing fetch just overwrites
        let entries = Arc::new(self.fetch_listing().await?);
        info!("Fetched catalog listing: {} families", entries.len());
        *self.listing.write().await = Some(Arc::clone(&entries));
        Ok(entries)
    }

    /// Drop the cached listing so the next lookup refetches it
    pub async fn refresh(&self) {
        debug!("Clearing cached catalog listing");
        *self.listing.write().await = None;
    }

    /// Whether a listing is currently cached
    pub async fn is_cached(&self) -> bool {
        self.listing.read().await.is_some()
    }

    async fn fetch_listing(&self) -> Result<Vec<CatalogEntry>> {
        let key = self.api_key.as_deref().ok_or_else(|| FontpackError::MissingApiKey {
            env: self.api_key_env.clone(),
        })?;

        let url = format!("{}/webfonts", self.api_base);
        let response = self
            .client
            .get(&url)
            .query(&[("key", key), ("sort", "popularity")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FontpackError::Http {
                url,
                status: response.status().as_u16(),
            });
        }

        let listing: CatalogListing = response
            .json()
            .await
            .map_err(|e| FontpackError::Parse(format!("Invalid catalog listing: {e}")))?;
        Ok(listing.items)
    }

    async fn fetch_stylesheet(&self, url: &str) -> Result<String> {
        debug!("Fetching stylesheet {}", url);
        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, BROWSER_USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 400 || status.as_u16() == 404 {
            // css2 answers 400 for families it does not know
            return Err(FontpackError::FamilyNotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(FontpackError::Http {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl FontCatalog for CatalogClient {
    async fn search(&self, family: &str) -> Result<Option<CatalogEntry>> {
        let wanted = normalize_family(family);
        let listing = self.list().await?;
        Ok(listing
            .iter()
            .find(|entry| normalize_family(&entry.family) == wanted)
            .cloned())
    }

    async fn font_files(
        &self,
        family: &str,
        variants: &[String],
    ) -> Result<Vec<FontFileDescriptor>> {
        let url = self.stylesheet_url(family, variants);
        let css = self.fetch_stylesheet(&url).await.map_err(|e| match e {
            FontpackError::FamilyNotFound(_) => FontpackError::FamilyNotFound(family.to_string()),
            other => other,
        })?;

        let wanted: Vec<String> = variants.iter().filter_map(|v| canonical_variant(v)).collect();
        let descriptors: Vec<FontFileDescriptor> = descriptors_from_faces(parse_font_faces(&css))
            .into_iter()
            .filter(|d| wanted.contains(&d.variant))
            .collect();

        for missing in wanted
            .iter()
            .filter(|w| !descriptors.iter().any(|d| &d.variant == *w))
        {
            warn!("{} has no {} face in the catalog stylesheet", family, missing);
        }

        debug!(
            "{}: {} descriptor(s) for {:?}",
            family,
            descriptors.len(),
            variants
        );
        Ok(descriptors)
    }

    async fn download(
        &self,
        descriptor: &FontFileDescriptor,
        target_dir: &Path,
    ) -> Result<PathBuf> {
        let response = self.client.get(&descriptor.url).send().await?;
        if !response.status().is_success() {
            return Err(FontpackError::Http {
                url: descriptor.url.clone(),
                status: response.status().as_u16(),
            });
        }
        let bytes = response.bytes().await?;

        tokio::fs::create_dir_all(target_dir)
            .await
            .map_err(|e| FontpackError::io(target_dir, e))?;

        let path = target_dir.join(font_file_name(descriptor));
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| FontpackError::io(&path, e))?;

        debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }

    fn stylesheet_url(&self, family: &str, variants: &[String]) -> String {
        stylesheet_url(&self.css_base, family, variants)
    }
}
