//! Direct installation of catalog fonts into the user font directory
//!
//! Picks a small set of variants, downloads them and asks the platform to
//! refresh its font cache. The cache refresh is best effort.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::catalog::{font_file_name, select_variants, FontCatalog};
use crate::config::DEFAULT_VARIANT_CAP;
use crate::error::{FontpackError, Result};
use crate::paths::sanitize_family;

/// What a successful install wrote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOutcome {
    pub family: String,
    pub variants: Vec<String>,
    pub installed_files: Vec<PathBuf>,
}

/// Installer for catalog fonts
pub struct FontInstaller {
    catalog: Arc<dyn FontCatalog>,
    font_dir: PathBuf,
    variant_cap: usize,
    refresh_cache: bool,
}

impl FontInstaller {
    /// Create an installer targeting the platform's user font directory
    pub fn new(catalog: Arc<dyn FontCatalog>) -> Result<Self> {
        let font_dir = dirs::font_dir().ok_or_else(|| {
            FontpackError::Config(
                "Could not determine the user font directory on this platform".to_string(),
            )
        })?;
        Ok(Self::with_font_dir(catalog, font_dir))
    }

    /// Create an installer with a custom font directory
    pub fn with_font_dir(catalog: Arc<dyn FontCatalog>, font_dir: PathBuf) -> Self {
        Self {
            catalog,
            font_dir,
            variant_cap: DEFAULT_VARIANT_CAP,
            refresh_cache: true,
        }
    }

    pub fn with_variant_cap(mut self, cap: usize) -> Self {
        self.variant_cap = cap.max(1);
        self
    }

    /// Skip the platform font-cache refresh after installing
    pub fn without_cache_refresh(mut self) -> Self {
        self.refresh_cache = false;
        self
    }

    pub fn font_dir(&self) -> &Path {
        &self.font_dir
    }

    /// Install a family from the catalog
    pub async fn install(&self, family: &str) -> Result<InstallOutcome> {
        let entry = self
            .catalog
            .search(family)
            .await?
            .ok_or_else(|| FontpackError::FamilyNotFound(family.to_string()))?;

        let variants = select_variants(&entry.variants, self.variant_cap);
        if variants.is_empty() {
            return Err(FontpackError::DownloadFailed(format!(
                "{} has no regular or bold variants to install",
                entry.family
            )));
        }

        info!("Installing {} ({})", entry.family, variants.join(", "));

        let descriptors = self.catalog.font_files(&entry.family, &variants).await?;
        let mut installed_files = Vec::new();
        for descriptor in &descriptors {
            match self.catalog.download(descriptor, &self.font_dir).await {
                Ok(path) => installed_files.push(path),
                Err(e) => warn!(
                    "Failed to install {} {}: {}",
                    entry.family, descriptor.variant, e
                ),
            }
        }

        if installed_files.is_empty() {
            return Err(FontpackError::DownloadFailed(format!(
                "No files could be downloaded for {}",
                entry.family
            )));
        }

        if self.refresh_cache {
            refresh_font_cache(&self.font_dir).await;
        }

        info!(
            "Installed {} file(s) for {} into {:?}",
            installed_files.len(),
            entry.family,
            self.font_dir
        );

        Ok(InstallOutcome {
            family: entry.family,
            variants,
            installed_files,
        })
    }

    /// Whether any file for `family` is present in the font directory
    pub fn is_installed(&self, family: &str) -> bool {
        let prefix = format!("{}-", sanitize_family(family));
        std::fs::read_dir(&self.font_dir)
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .any(|e| e.file_name().to_string_lossy().starts_with(&prefix))
            })
            .unwrap_or(false)
    }

    /// Path a given descriptor would be installed to
    pub fn install_path(&self, descriptor: &crate::catalog::FontFileDescriptor) -> PathBuf {
        self.font_dir.join(font_file_name(descriptor))
    }
}

/// Ask the platform to rescan fonts; failures are only logged
#[cfg(target_os = "linux")]
pub async fn refresh_font_cache(font_dir: &Path) {
    match tokio::process::Command::new("fc-cache")
        .arg("-f")
        .arg(font_dir)
        .output()
        .await
    {
        Ok(output) if output.status.success() => debug!("Refreshed font cache"),
        Ok(output) => warn!(
            "fc-cache exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        ),
        Err(e) => warn!("Could not run fc-cache: {}", e),
    }
}

/// Ask the platform to rescan fonts; nothing to do here
#[cfg(not(target_os = "linux"))]
pub async fn refresh_font_cache(_font_dir: &Path) {
    debug!("No font cache refresh needed on this platform");
}
