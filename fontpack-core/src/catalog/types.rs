//! Catalog data types
//!
//! The listing endpoint returns `{ items: [CatalogEntry] }`; stylesheet
//! parsing yields [`FontFileDescriptor`]s.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One family in the remote catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    /// Display family name (e.g., "IBM Plex Mono")
    pub family: String,

    /// Available variants in catalog order (e.g., "regular", "700", "700italic")
    #[serde(default)]
    pub variants: Vec<String>,

    /// Supported charset subsets (e.g., "latin", "cyrillic")
    #[serde(default)]
    pub subsets: Vec<String>,

    /// Direct file URL per variant
    #[serde(default)]
    pub files: BTreeMap<String, String>,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub version: Option<String>,
}

impl CatalogEntry {
    pub fn supports_subset(&self, subset: &str) -> bool {
        self.subsets.iter().any(|s| s.eq_ignore_ascii_case(subset))
    }

    pub fn has_variant(&self, variant: &str) -> bool {
        self.variants.iter().any(|v| v == variant)
    }
}

/// Listing endpoint response body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogListing {
    #[serde(default)]
    pub items: Vec<CatalogEntry>,
}

/// Font binary format, best first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFormat {
    Woff2,
    Woff,
    Ttf,
}

impl FontFormat {
    /// Infer the format from a URL's file extension, defaulting to TTF
    pub fn from_url(url: &str) -> Self {
        let path = url.split(['?', '#']).next().unwrap_or(url).to_lowercase();
        if path.ends_with(".woff2") {
            FontFormat::Woff2
        } else if path.ends_with(".woff") {
            FontFormat::Woff
        } else {
            FontFormat::Ttf
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            FontFormat::Woff2 => "woff2",
            FontFormat::Woff => "woff",
            FontFormat::Ttf => "ttf",
        }
    }

    /// Value for `format(...)` in an `@font-face` `src`
    pub fn css_format(&self) -> &'static str {
        match self {
            FontFormat::Woff2 => "woff2",
            FontFormat::Woff => "woff",
            FontFormat::Ttf => "truetype",
        }
    }
}

impl std::fmt::Display for FontFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// A downloadable file for one variant of a family
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontFileDescriptor {
    pub family: String,
    pub variant: String,
    pub url: String,
    pub format: FontFormat,
}
