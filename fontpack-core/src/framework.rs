//! Framework inference
//!
//! Suggests a target framework and output directory from the project's
//! `package.json`, falling back to conventional asset directories. The
//! caller may always override both.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Code-generation target for bundling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    Vanilla,
    #[serde(rename = "nextjs")]
    NextJs,
    React,
    Vue,
    Custom,
}

impl Framework {
    pub fn as_str(&self) -> &'static str {
        match self {
            Framework::Vanilla => "vanilla",
            Framework::NextJs => "nextjs",
            Framework::React => "react",
            Framework::Vue => "vue",
            Framework::Custom => "custom",
        }
    }
}

impl std::fmt::Display for Framework {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Framework {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "vanilla" | "html" => Ok(Framework::Vanilla),
            "nextjs" | "next" | "next.js" => Ok(Framework::NextJs),
            "react" => Ok(Framework::React),
            "vue" => Ok(Framework::Vue),
            "custom" => Ok(Framework::Custom),
            other => Err(format!(
                "Unknown framework '{other}'. Expected one of: vanilla, nextjs, react, vue, custom"
            )),
        }
    }
}

/// Result of framework inference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameworkSuggestion {
    pub framework: Framework,
    pub default_output_dir: PathBuf,
    pub detected_from_manifest: bool,
}

impl FrameworkSuggestion {
    fn new(framework: Framework, dir: &str, detected_from_manifest: bool) -> Self {
        Self {
            framework,
            default_output_dir: PathBuf::from(dir),
            detected_from_manifest,
        }
    }
}

/// Existing asset directories checked when the manifest says nothing, in order
pub const ASSET_DIRS: &[&str] = &["public", "assets", "src/assets", "static"];

/// Fallback when nothing else matches
pub const DEFAULT_OUTPUT_DIR: &str = "assets/fonts";

/// Infer framework and output directory for a project
pub fn infer_framework(project_root: &Path) -> FrameworkSuggestion {
    let deps = read_dependencies(&project_root.join("package.json"));

    if let Some(suggestion) = suggest_from_dependencies(&deps) {
        debug!("Framework {} inferred from package.json", suggestion.framework);
        return suggestion;
    }

    for dir in ASSET_DIRS {
        if project_root.join(dir).is_dir() {
            debug!("Using existing asset directory {}", dir);
            return FrameworkSuggestion {
                framework: Framework::Vanilla,
                default_output_dir: Path::new(dir).join("fonts"),
                detected_from_manifest: false,
            };
        }
    }

    FrameworkSuggestion::new(Framework::Vanilla, DEFAULT_OUTPUT_DIR, false)
}

/// Apply the dependency rules in priority order
pub fn suggest_from_dependencies(deps: &HashSet<String>) -> Option<FrameworkSuggestion> {
    let has = |name: &str| deps.contains(name);

    if has("next") {
        Some(FrameworkSuggestion::new(Framework::NextJs, "public/fonts", true))
    } else if has("nuxt") {
        Some(FrameworkSuggestion::new(Framework::Vue, "assets/fonts", true))
    } else if has("react") && has("vite") {
        Some(FrameworkSuggestion::new(Framework::React, "src/assets/fonts", true))
    } else if has("react") {
        Some(FrameworkSuggestion::new(Framework::React, "public/fonts", true))
    } else if has("vue") {
        Some(FrameworkSuggestion::new(Framework::Vue, "src/assets/fonts", true))
    } else if has("@angular/core") {
        Some(FrameworkSuggestion::new(Framework::Custom, "src/assets/fonts", true))
    } else {
        None
    }
}

/// Combined `dependencies` and `devDependencies`; empty when unreadable
fn read_dependencies(manifest: &Path) -> HashSet<String> {
    let content = match std::fs::read_to_string(manifest) {
        Ok(content) => content,
        Err(e) => {
            debug!("No readable manifest at {}: {}", manifest.display(), e);
            return HashSet::new();
        }
    };

    let value: serde_json::Value = match serde_json::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            debug!("Ignoring unparsable manifest {}: {}", manifest.display(), e);
            return HashSet::new();
        }
    };

    ["dependencies", "devDependencies"]
        .iter()
        .filter_map(|section| value.get(section).and_then(|d| d.as_object()))
        .flat_map(|deps| deps.keys().cloned())
        .collect()
}
