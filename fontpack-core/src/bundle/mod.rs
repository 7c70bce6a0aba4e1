//! Production bundling
//!
//! For each font name, materializes `<output_dir>/<Slug>/` with downloaded
//! binaries (self-hosted), a stylesheet, optional framework code and a
//! license notice, then writes one `FONT_GUIDE.md` for the whole run.
//!
//! ```text
//! <output_dir>/
//! ├── FONT_GUIDE.md
//! └── Roboto/
//!     ├── Roboto-regular.woff2
//!     ├── Roboto-700.woff2
//!     ├── Roboto.css
//!     ├── Roboto.ts          (nextjs only)
//!     └── LICENSE.txt
//! ```
//!
//! Fonts are processed one at a time with a pause in between. A failed
//! download drops that variant; a filesystem failure fails that font only.

mod codegen;
mod css;
mod guide;
mod license;
mod queue;

pub use codegen::{export_name, import_snippet, nextjs_module, stylesheet_import};
pub use css::{
    css_ident, custom_property, font_stack, generate_css, utility_class, DownloadedFile,
};
pub use guide::{generate_guide, GUIDE_FILE};
pub use license::{license_notice, LICENSE_FILE};
pub use queue::SequentialQueue;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::catalog::{font_file_name, FontCatalog};
use crate::config::{FontpackConfig, DEFAULT_DELAY_MS};
use crate::error::{FontpackError, Result};
use crate::framework::Framework;
use crate::paths::{resolve_output_dir, sanitize_family};

/// How fonts reach production
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    SelfHosted,
    Cdn,
    Both,
}

impl Strategy {
    pub fn includes_self_hosting(&self) -> bool {
        matches!(self, Strategy::SelfHosted | Strategy::Both)
    }

    pub fn includes_cdn(&self) -> bool {
        matches!(self, Strategy::Cdn | Strategy::Both)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::SelfHosted => "self-hosted",
            Strategy::Cdn => "cdn",
            Strategy::Both => "both",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "self-hosted" | "selfhosted" | "self" => Ok(Strategy::SelfHosted),
            "cdn" => Ok(Strategy::Cdn),
            "both" => Ok(Strategy::Both),
            other => Err(format!(
                "Unknown strategy '{other}'. Expected one of: self-hosted, cdn, both"
            )),
        }
    }
}

/// Options for one bundling run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleOptions {
    pub strategy: Strategy,
    /// Variants requested per font (e.g., `regular`, `700`)
    pub variants: Vec<String>,
    /// Project-relative output root
    pub output_dir: PathBuf,
    pub framework: Framework,
    /// Add preconnect/preload hints to the guide
    pub include_preload: bool,
    /// Pause between fonts
    pub delay: Duration,
}

impl BundleOptions {
    pub fn default_variants() -> Vec<String> {
        ["regular", "500", "600", "700"]
            .iter()
            .map(|v| v.to_string())
            .collect()
    }

    /// Options seeded from configuration defaults
    pub fn from_config(config: &FontpackConfig, framework: Framework, output_dir: PathBuf) -> Self {
        Self {
            strategy: config.bundle.strategy,
            variants: config.bundle.variants.clone(),
            output_dir,
            framework,
            include_preload: config.bundle.include_preload,
            delay: config.delay(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        crate::paths::validate_output_dir(&self.output_dir)?;
        if self.variants.is_empty() {
            return Err(FontpackError::Config(
                "At least one variant must be requested".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for BundleOptions {
    fn default() -> Self {
        Self {
            strategy: Strategy::SelfHosted,
            variants: Self::default_variants(),
            output_dir: PathBuf::from(crate::framework::DEFAULT_OUTPUT_DIR),
            framework: Framework::Vanilla,
            include_preload: false,
            delay: Duration::from_millis(DEFAULT_DELAY_MS),
        }
    }
}

/// Outcome for one font
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleResult {
    pub font_family: String,
    pub strategy: Strategy,
    /// Non-empty only when self-hosting and at least one download succeeded
    pub written_font_files: Vec<PathBuf>,
    pub css_file: Option<PathBuf>,
    pub license_file: Option<PathBuf>,
    pub framework_snippet: Option<String>,
    /// Stylesheet URL linked for the CDN strategies
    pub cdn_url: Option<String>,
    /// Set when a filesystem failure stopped this font
    pub error: Option<String>,
}

impl BundleResult {
    fn new(font_family: &str, strategy: Strategy) -> Self {
        Self {
            font_family: font_family.to_string(),
            strategy,
            written_font_files: Vec::new(),
            css_file: None,
            license_file: None,
            framework_snippet: None,
            cdn_url: None,
            error: None,
        }
    }

    /// Whether this font produced something usable
    pub fn succeeded(&self) -> bool {
        if self.error.is_some() {
            return false;
        }
        match self.strategy {
            Strategy::SelfHosted => !self.written_font_files.is_empty(),
            Strategy::Cdn | Strategy::Both => self.css_file.is_some(),
        }
    }

    pub fn slug(&self) -> String {
        sanitize_family(&self.font_family)
    }
}

/// Everything a bundling run produced
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleReport {
    pub results: Vec<BundleResult>,
    pub guide_path: PathBuf,
}

/// Orchestrates the catalog and the filesystem for a bundling run
pub struct Bundler {
    catalog: Arc<dyn FontCatalog>,
    project_root: PathBuf,
}

impl Bundler {
    pub fn new(catalog: Arc<dyn FontCatalog>, project_root: impl Into<PathBuf>) -> Self {
        Self {
            catalog,
            project_root: project_root.into(),
        }
    }

    /// Bundle every font in `font_names` and write the integration guide
    ///
    /// Invalid options are rejected before anything is written.
    pub async fn bundle(
        &self,
        font_names: &[String],
        options: &BundleOptions,
    ) -> Result<BundleReport> {
        options.validate()?;
        let out_root = resolve_output_dir(&self.project_root, &options.output_dir)?;

        info!(
            "Bundling {} font(s) into {} ({}, {})",
            font_names.len(),
            out_root.display(),
            options.strategy,
            options.framework
        );

        let queue = SequentialQueue::new(options.delay);
        let root = out_root.as_path();
        let results = queue
            .run(font_names, move |name| self.bundle_font(name, root, options))
            .await;

        tokio::fs::create_dir_all(&out_root)
            .await
            .map_err(|e| FontpackError::io(&out_root, e))?;

        let guide = generate_guide(&results, options, chrono::Utc::now());
        let guide_path = out_root.join(GUIDE_FILE);
        tokio::fs::write(&guide_path, guide)
            .await
            .map_err(|e| FontpackError::io(&guide_path, e))?;

        info!("Wrote integration guide to {}", guide_path.display());
        Ok(BundleReport {
            results,
            guide_path,
        })
    }

    async fn bundle_font(&self, name: &str, out_root: &Path, options: &BundleOptions) -> BundleResult {
        let family = self.resolve_family(name).await;
        let mut result = BundleResult::new(&family, options.strategy);

        if let Err(e) = self.materialize(&family, out_root, options, &mut result).await {
            warn!("Bundling {} failed: {}", family, e);
            result.error = Some(e.to_string());
        }

        result
    }

    /// Prefer the catalog's spelling of a family when it can be looked up
    async fn resolve_family(&self, name: &str) -> String {
        match self.catalog.search(name).await {
            Ok(Some(entry)) => entry.family,
            Ok(None) => {
                warn!("'{}' is not in the catalog; using the name as written", name);
                name.to_string()
            }
            Err(e) => {
                debug!("Catalog lookup for '{}' skipped: {}", name, e);
                name.to_string()
            }
        }
    }

    async fn materialize(
        &self,
        family: &str,
        out_root: &Path,
        options: &BundleOptions,
        result: &mut BundleResult,
    ) -> Result<()> {
        let slug = sanitize_family(family);
        let font_dir = out_root.join(&slug);
        tokio::fs::create_dir_all(&font_dir)
            .await
            .map_err(|e| FontpackError::io(&font_dir, e))?;

        let mut downloaded = Vec::new();
        if options.strategy.includes_self_hosting() {
            downloaded = self.download_variants(family, &font_dir, options, result).await;
        }

        if options.strategy.includes_cdn() {
            result.cdn_url = Some(self.catalog.stylesheet_url(family, &options.variants));
        }

        let css_path = font_dir.join(format!("{slug}.css"));
        let css = generate_css(family, &downloaded, result.cdn_url.as_deref());
        write_file(&css_path, &css).await?;
        result.css_file = Some(css_path);

        match options.framework {
            Framework::NextJs if !downloaded.is_empty() => {
                let module = nextjs_module(family, &downloaded);
                write_file(&font_dir.join(format!("{slug}.ts")), &module).await?;
                result.framework_snippet = Some(module);
            }
            framework => {
                let relative_css = options.output_dir.join(&slug).join(format!("{slug}.css"));
                result.framework_snippet = import_snippet(framework, &relative_css);
            }
        }

        let license_path = font_dir.join(LICENSE_FILE);
        write_file(&license_path, &license_notice(family)).await?;
        result.license_file = Some(license_path);

        Ok(())
    }

    /// Download each requested variant, skipping the ones that fail
    async fn download_variants(
        &self,
        family: &str,
        font_dir: &Path,
        options: &BundleOptions,
        result: &mut BundleResult,
    ) -> Vec<DownloadedFile> {
        let descriptors = match self.catalog.font_files(family, &options.variants).await {
            Ok(descriptors) => descriptors,
            Err(e) => {
                warn!("Could not list files for {}: {}", family, e);
                return Vec::new();
            }
        };

        let mut downloaded = Vec::new();
        for descriptor in descriptors {
            match self.catalog.download(&descriptor, font_dir).await {
                Ok(path) => {
                    debug!("Downloaded {} {}", family, descriptor.variant);
                    downloaded.push(DownloadedFile {
                        file_name: path
                            .file_name()
                            .map(|n| n.to_string_lossy().into_owned())
                            .unwrap_or_else(|| font_file_name(&descriptor)),
                        variant: descriptor.variant.clone(),
                        format: descriptor.format,
                    });
                    result.written_font_files.push(path);
                }
                Err(e) => warn!(
                    "Skipping {} {}: download failed: {}",
                    family, descriptor.variant, e
                ),
            }
        }

        if downloaded.is_empty() {
            warn!("No files downloaded for {}", family);
        }
        downloaded
    }
}

async fn write_file(path: &Path, content: &str) -> Result<()> {
    tokio::fs::write(path, content)
        .await
        .map_err(|e| FontpackError::io(path, e))
}
