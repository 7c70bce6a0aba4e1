//! Font detection
//!
//! Scans a project for font-family usages and produces a deduplicated list
//! of [`DetectedFontReference`]s.
//!
//! # Sources
//!
//! ```text
//! host UI font stack  ──┐
//! *.css / *.scss      ──┤
//! tailwind.config.*   ──┼──► parse_font_family ──► dedupe (first wins) ──► Vec<DetectedFontReference>
//! package.json        ──┘    (@fontsource/* → knownInstalled)
//! ```
//!
//! Each glob is capped (20 files by default) to keep scans quick on large
//! projects. A file that can't be read or parsed is logged and skipped.

mod sources;
mod stack;

pub use sources::{
    extract_manifest_fonts, extract_stylesheet_fonts, extract_utility_config_fonts,
    font_package_name, list_project_files, EXCLUDED_DIRS, MANIFEST_GLOBS, STYLESHEET_GLOBS,
    UTILITY_CONFIG_GLOBS,
};
pub use stack::{is_system_font, normalize_text, parse_font_family, MAX_FAMILIES_PER_STACK};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{FontpackConfig, DEFAULT_SCAN_LIMIT};
use crate::error::{FontpackError, Result};

/// Where a font reference was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontSource {
    HostSetting,
    Stylesheet,
    UtilityConfig,
    Manifest,
}

impl FontSource {
    pub const ALL: [FontSource; 4] = [
        FontSource::HostSetting,
        FontSource::Stylesheet,
        FontSource::UtilityConfig,
        FontSource::Manifest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FontSource::HostSetting => "host-setting",
            FontSource::Stylesheet => "stylesheet",
            FontSource::UtilityConfig => "utility-config",
            FontSource::Manifest => "manifest",
        }
    }
}

impl std::fmt::Display for FontSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A font family name found somewhere in the project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedFontReference {
    pub name: String,
    pub source: FontSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub known_installed: Option<bool>,
}

impl DetectedFontReference {
    fn new(name: String, source: FontSource, origin_path: Option<PathBuf>) -> Self {
        Self {
            name,
            source,
            origin_path,
            known_installed: None,
        }
    }

    /// Case-insensitive identity used for deduplication
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }
}

/// Keep the first reference per case-insensitive name, in order
///
/// Later duplicates are dropped whole, including their `known_installed` flag.
pub fn dedupe(references: Vec<DetectedFontReference>) -> Vec<DetectedFontReference> {
    let mut seen = HashSet::new();
    references
        .into_iter()
        .filter(|r| seen.insert(r.key()))
        .collect()
}

/// Scans project files for font references
#[derive(Debug, Clone)]
pub struct Detector {
    sources: Vec<FontSource>,
    scan_limit: usize,
    host_font_family: Option<String>,
}

impl Default for Detector {
    fn default() -> Self {
        Self {
            sources: FontSource::ALL.to_vec(),
            scan_limit: DEFAULT_SCAN_LIMIT,
            host_font_family: None,
        }
    }
}

impl Detector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a detector from configuration
    pub fn from_config(config: &FontpackConfig) -> Self {
        Self {
            sources: config.sources.clone(),
            scan_limit: config.scan_limit,
            host_font_family: config.host_font_family.clone(),
        }
    }

    /// Set the host UI font stack
    pub fn with_host_font_family(mut self, stack: impl Into<String>) -> Self {
        self.host_font_family = Some(stack.into());
        self
    }

    pub fn with_scan_limit(mut self, limit: usize) -> Self {
        self.scan_limit = limit.max(1);
        self
    }

    pub fn with_sources(mut self, sources: Vec<FontSource>) -> Self {
        self.sources = sources;
        self
    }

    fn enabled(&self, source: FontSource) -> bool {
        self.sources.contains(&source)
    }

    /// Detect font references under `project_root`
    ///
    /// Cancellation is honored between files; whatever was collected so far
    /// is returned.
    pub async fn detect(
        &self,
        project_root: &Path,
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<DetectedFontReference>> {
        if !project_root.is_dir() {
            return Err(FontpackError::io(
                project_root,
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "project root is not a directory",
                ),
            ));
        }

        info!("Scanning for fonts in: {:?}", project_root);
        let cancelled = || cancel.map(|c| c.is_cancelled()).unwrap_or(false);
        let mut found = Vec::new();

        if self.enabled(FontSource::HostSetting) {
            if let Some(stack) = &self.host_font_family {
                for name in parse_font_family(stack) {
                    found.push(DetectedFontReference::new(name, FontSource::HostSetting, None));
                }
            }
        }

        let passes: [(FontSource, &[&str]); 3] = [
            (FontSource::Stylesheet, STYLESHEET_GLOBS),
            (FontSource::UtilityConfig, UTILITY_CONFIG_GLOBS),
            (FontSource::Manifest, MANIFEST_GLOBS),
        ];

        'passes: for (source, globs) in passes {
            if !self.enabled(source) {
                continue;
            }

            let files = list_project_files(project_root, globs, self.scan_limit);
            debug!("{} candidate {} file(s)", files.len(), source);

            for path in files {
                if cancelled() {
                    info!("Font scan cancelled");
                    break 'passes;
                }

                match scan_file(&path, source).await {
                    Ok(names) => {
                        let origin = path
                            .strip_prefix(project_root)
                            .map(Path::to_path_buf)
                            .unwrap_or_else(|_| path.clone());
                        for name in names {
                            let mut reference =
                                DetectedFontReference::new(name, source, Some(origin.clone()));
                            if source == FontSource::Manifest {
                                reference.known_installed = Some(true);
                            }
                            found.push(reference);
                        }
                    }
                    Err(e) => warn!("Skipping {}: {}", path.display(), e),
                }
            }
        }

        let references = dedupe(found);
        info!("Scan complete: found {} font(s)", references.len());
        Ok(references)
    }
}

async fn scan_file(path: &Path, source: FontSource) -> anyhow::Result<Vec<String>> {
    let bytes = tokio::fs::read(path).await?;
    let content = String::from_utf8_lossy(&bytes);

    let names = match source {
        FontSource::Stylesheet => extract_stylesheet_fonts(&content),
        FontSource::UtilityConfig => extract_utility_config_fonts(&content),
        FontSource::Manifest => extract_manifest_fonts(&content)?,
        FontSource::HostSetting => Vec::new(),
    };

    debug!("{}: {:?}", path.display(), names);
    Ok(names)
}
