//! fontpack configuration
//!
//! ## Configuration Sources (in precedence order)
//!
//! 1. Explicit path passed by the caller (`--config`)
//! 2. `.fontpack/config.yaml` in the project root
//! 3. Built-in defaults
//!
//! ```yaml
//! auto_detect: true
//! sources: [host-setting, stylesheet, utility-config, manifest]
//! host_font_family: "'Inter', system-ui, sans-serif"
//! scan_limit: 20
//! variant_cap: 3
//! delay_ms: 150
//! bundle:
//!   strategy: self-hosted
//!   framework: vanilla
//!   variants: [regular, "500", "600", "700"]
//!   include_preload: true
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::bundle::{BundleOptions, Strategy};
use crate::detect::FontSource;
use crate::error::{FontpackError, Result};
use crate::framework::Framework;

/// Project-relative location of the config file
pub const CONFIG_FILE: &str = ".fontpack/config.yaml";

/// Default listing endpoint base
pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/webfonts/v1";

/// Default generated-stylesheet endpoint base
pub const DEFAULT_CSS_BASE: &str = "https://fonts.googleapis.com";

/// Environment variable holding the catalog API key
pub const DEFAULT_API_KEY_ENV: &str = "FONTPACK_API_KEY";

/// Maximum files inspected per glob during detection
pub const DEFAULT_SCAN_LIMIT: usize = 20;

/// Maximum variants picked by the direct-install flow
pub const DEFAULT_VARIANT_CAP: usize = 3;

/// Pause between fonts while bundling
pub const DEFAULT_DELAY_MS: u64 = 150;

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontpackConfig {
    /// Whether `bundle` without explicit names runs detection
    pub auto_detect: bool,

    /// Detector sources to run
    pub sources: Vec<FontSource>,

    /// Host UI font stack, scanned as the `host-setting` source
    pub host_font_family: Option<String>,

    pub scan_limit: usize,

    pub variant_cap: usize,

    pub delay_ms: u64,

    /// Catalog listing endpoint base URL
    pub api_base: String,

    /// Generated stylesheet endpoint base URL
    pub css_base: String,

    /// Environment variable to read the API key from
    pub api_key_env: String,

    /// Bundling defaults, overridable per invocation
    pub bundle: BundleDefaults,
}

/// Bundling defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BundleDefaults {
    pub strategy: Strategy,
    /// `None` lets the framework inferencer decide
    pub framework: Option<Framework>,
    pub variants: Vec<String>,
    /// `None` lets the framework inferencer decide
    pub output_dir: Option<PathBuf>,
    pub include_preload: bool,
}

impl Default for FontpackConfig {
    fn default() -> Self {
        Self {
            auto_detect: true,
            sources: FontSource::ALL.to_vec(),
            host_font_family: None,
            scan_limit: DEFAULT_SCAN_LIMIT,
            variant_cap: DEFAULT_VARIANT_CAP,
            delay_ms: DEFAULT_DELAY_MS,
            api_base: DEFAULT_API_BASE.to_string(),
            css_base: DEFAULT_CSS_BASE.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            bundle: BundleDefaults::default(),
        }
    }
}

impl Default for BundleDefaults {
    fn default() -> Self {
        Self {
            strategy: Strategy::SelfHosted,
            framework: None,
            variants: BundleOptions::default_variants(),
            output_dir: None,
            include_preload: true,
        }
    }
}

impl FontpackConfig {
    /// Load from an explicit path, or `<project_root>/.fontpack/config.yaml`, or defaults
    pub fn load(project_root: &Path, explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(FontpackError::Config(format!(
                        "Config file does not exist: {}",
                        path.display()
                    )));
                }
                path.to_path_buf()
            }
            None => {
                let path = project_root.join(CONFIG_FILE);
                if !path.exists() {
                    debug!("No config at {}, using defaults", path.display());
                    return Ok(Self::default());
                }
                path
            }
        };

        Self::load_from_path(&path)
    }

    /// Parse a config file
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| FontpackError::io(path, e))?;
        let config: Self = serde_yaml_ng::from_str(&content).map_err(|e| {
            FontpackError::Config(format!("Failed to parse {}: {e}", path.display()))
        })?;
        config.validate()?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Reject values that would make the pipeline meaningless
    pub fn validate(&self) -> Result<()> {
        if self.scan_limit == 0 {
            return Err(FontpackError::Config("scan_limit must be at least 1".into()));
        }
        if self.variant_cap == 0 {
            return Err(FontpackError::Config("variant_cap must be at least 1".into()));
        }
        if self.bundle.variants.is_empty() {
            return Err(FontpackError::Config(
                "bundle.variants must list at least one variant".into(),
            ));
        }
        if let Some(dir) = &self.bundle.output_dir {
            crate::paths::validate_output_dir(dir)?;
        }
        Ok(())
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}
