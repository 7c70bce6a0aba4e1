//! Path handling for generated output
//!
//! Output directories are always relative to the project root and may not
//! climb out of it. Family names become filesystem/CSS-safe slugs.

use std::path::{Component, Path, PathBuf};

use crate::error::{FontpackError, Result};

/// Validate a caller-supplied output directory and join it onto the project root
pub fn resolve_output_dir(project_root: &Path, output_dir: &Path) -> Result<PathBuf> {
    validate_output_dir(output_dir)?;
    Ok(project_root.join(output_dir))
}

/// Reject absolute paths, `..` segments and empty paths
pub fn validate_output_dir(output_dir: &Path) -> Result<()> {
    let invalid = |reason: &str| FontpackError::InvalidOutputDir {
        path: output_dir.display().to_string(),
        reason: reason.to_string(),
    };

    if output_dir.as_os_str().is_empty() {
        return Err(invalid("path is empty"));
    }

    if output_dir.is_absolute() || output_dir.has_root() {
        return Err(invalid("absolute paths are not allowed"));
    }

    for component in output_dir.components() {
        match component {
            Component::ParentDir => return Err(invalid("parent segments ('..') are not allowed")),
            Component::Prefix(_) | Component::RootDir => {
                return Err(invalid("absolute paths are not allowed"))
            }
            Component::CurDir | Component::Normal(_) => {}
        }
    }

    Ok(())
}

/// Turn a family name into a slug: non-alphanumerics become `-`, runs collapse
///
/// `"IBM Plex Mono"` becomes `"IBM-Plex-Mono"`. Letters and digits from any
/// script are kept, so `"微软雅黑"` stays as is. A name with no letters or
/// digits at all maps to `font-<hex of its bytes>` so the slug is never empty
/// and distinct names stay distinct. Applying it twice is a no-op.
pub fn sanitize_family(family: &str) -> String {
    let mut slug = String::with_capacity(family.len());
    for ch in family.chars() {
        if ch.is_alphanumeric() {
            slug.push(ch);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }

    let slug = slug.trim_matches('-');
    if !slug.is_empty() {
        return slug.to_string();
    }

    let hex: String = family
        .trim()
        .bytes()
        .take(FALLBACK_SLUG_BYTES)
        .map(|b| format!("{b:02x}"))
        .collect();
    if hex.is_empty() {
        "font".to_string()
    } else {
        format!("font-{hex}")
    }
}

/// Bytes of the original name encoded into a fallback slug
const FALLBACK_SLUG_BYTES: usize = 16;
