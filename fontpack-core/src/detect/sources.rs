//! Per-source extraction of font names
//!
//! Everything here is pattern matching over normalized text, not real
//! parsing. Nested braces, comments and preprocessor interpolation can
//! produce misses or stray matches; that is a known limitation.

use glob::Pattern;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use walkdir::WalkDir;

use super::stack::{normalize_text, parse_font_family};

/// Directories never descended into while scanning
pub const EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    "dist",
    "build",
    "out",
    ".next",
    ".nuxt",
    "target",
    "vendor",
];

pub const STYLESHEET_GLOBS: &[&str] = &["*.css", "*.scss"];

pub const UTILITY_CONFIG_GLOBS: &[&str] = &["tailwind.config.*"];

pub const MANIFEST_GLOBS: &[&str] = &["package.json"];

/// Dependency namespaces whose packages each ship one font family
pub const FONT_PACKAGE_PREFIXES: &[&str] = &["@fontsource/", "@fontsource-variable/"];

static FONT_FAMILY_DECL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"font-family\s*:\s*([^;}]+)").expect("valid regex"));

static UTILITY_FONT_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"fontFamily\s*:\s*\{([^}]*)\}").expect("valid regex"));

static UTILITY_FONT_ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"['"]?([\w-]+)['"]?\s*:\s*\[([^\]]*)\]"#).expect("valid regex")
});

/// List files under `root` whose name matches one of `globs`
///
/// Walks in file-name order so the cap always selects the same files.
/// Dependency and build directories are pruned.
pub fn list_project_files(root: &Path, globs: &[&str], limit: usize) -> Vec<PathBuf> {
    let patterns: Vec<Pattern> = globs
        .iter()
        .filter_map(|g| Pattern::new(g).ok())
        .collect();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            !EXCLUDED_DIRS.contains(&name.as_ref())
        });

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if patterns.iter().any(|p| p.matches(&name)) {
            trace!("Matched {:?}", entry.path());
            files.push(entry.into_path());
            if files.len() >= limit {
                break;
            }
        }
    }

    files
}

/// Every custom family named by `font-family:` declarations in a stylesheet
pub fn extract_stylesheet_fonts(content: &str) -> Vec<String> {
    let normalized = normalize_text(content);
    FONT_FAMILY_DECL
        .captures_iter(&normalized)
        .filter_map(|caps| caps.get(1))
        .flat_map(|value| parse_font_family(value.as_str()))
        .collect()
}

/// Families listed in a utility config's `fontFamily: { key: [...] }` block
pub fn extract_utility_config_fonts(content: &str) -> Vec<String> {
    let normalized = normalize_text(content);
    let mut fonts = Vec::new();

    for block in UTILITY_FONT_BLOCK.captures_iter(&normalized) {
        let Some(body) = block.get(1) else { continue };
        for entry in UTILITY_FONT_ENTRY.captures_iter(body.as_str()) {
            if let Some(stack) = entry.get(2) {
                fonts.extend(parse_font_family(stack.as_str()));
            }
        }
    }

    fonts
}

/// Families installed through font packages declared in a manifest
pub fn extract_manifest_fonts(content: &str) -> Result<Vec<String>, serde_json::Error> {
    let manifest: serde_json::Value = serde_json::from_str(content)?;
    let mut fonts = Vec::new();

    for section in ["dependencies", "devDependencies"] {
        let Some(deps) = manifest.get(section).and_then(|d| d.as_object()) else {
            continue;
        };
        for key in deps.keys() {
            if let Some(name) = font_package_name(key) {
                fonts.push(name);
            }
        }
    }

    Ok(fonts)
}

/// `@fontsource/open-sans` becomes `open sans`
pub fn font_package_name(dependency: &str) -> Option<String> {
    FONT_PACKAGE_PREFIXES.iter().find_map(|prefix| {
        dependency
            .strip_prefix(prefix)
            .filter(|rest| !rest.is_empty())
            .map(|rest| rest.replace('-', " "))
    })
}
