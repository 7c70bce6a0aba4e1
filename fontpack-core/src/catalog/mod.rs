//! Font catalog access
//!
//! # Overview
//!
//! ```text
//! Catalog (Google Fonts compatible)
//!     │
//!     ├── /webfonts?key=…&sort=popularity  ← family listing (cached in memory)
//!     └── /css2?family=…:wght@…            ← generated @font-face stylesheet
//!            │
//!            ▼
//!     FontFileDescriptor (family, variant, url, format)
//!            │
//!            ▼
//!     download → <target>/<Family>-<variant>.<ext>
//! ```

mod client;
mod stylesheet;
mod types;
mod variants;

pub use client::{
    font_file_name, stylesheet_url, CatalogClient, FontCatalog, BROWSER_USER_AGENT,
};
pub use stylesheet::{descriptors_from_faces, parse_font_faces, FontFace};
pub use types::{CatalogEntry, CatalogListing, FontFileDescriptor, FontFormat};
pub use variants::{
    canonical_variant, is_italic, select_variants, variant_label, weight_of,
    VARIANT_PREFERENCE,
};
