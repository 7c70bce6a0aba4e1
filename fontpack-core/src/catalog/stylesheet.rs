//! Parsing of generated catalog stylesheets
//!
//! The css2 endpoint answers with one `@font-face` block per weight and
//! unicode-range subset, each preceded by a `/* subset */` comment.

use once_cell::sync::Lazy;
use regex::Regex;

use super::types::{FontFileDescriptor, FontFormat};
use super::variants::variant_label;

static FONT_FACE_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:/\*\s*([\w-]+)\s*\*/\s*)?@font-face\s*\{([^}]*)\}").expect("valid regex")
});

static FAMILY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"font-family\s*:\s*['"]?([^;'"]+)['"]?"#).expect("valid regex"));

static WEIGHT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"font-weight\s*:\s*(\d+)").expect("valid regex"));

static STYLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"font-style\s*:\s*(\w+)").expect("valid regex"));

static URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"url\(\s*['"]?([^)'"]+)['"]?\s*\)"#).expect("valid regex"));

/// Subset preferred when a weight is served in several unicode ranges
const PREFERRED_SUBSET: &str = "latin";

/// A single `@font-face` block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontFace {
    pub family: String,
    pub weight: u16,
    pub italic: bool,
    pub url: String,
    pub format: FontFormat,
    pub subset: Option<String>,
}

impl FontFace {
    pub fn variant(&self) -> String {
        variant_label(self.weight, self.italic)
    }
}

/// Extract every `@font-face` block that has a usable `src` URL
///
/// When a block lists several URLs the best format wins (woff2, woff, ttf).
/// Missing `font-weight` means 400.
pub fn parse_font_faces(css: &str) -> Vec<FontFace> {
    FONT_FACE_BLOCK
        .captures_iter(css)
        .filter_map(|caps| {
            let subset = caps.get(1).map(|m| m.as_str().to_string());
            let body = caps.get(2)?.as_str();

            let family = FAMILY.captures(body)?.get(1)?.as_str().trim().to_string();
            let weight = WEIGHT
                .captures(body)
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(400);
            let italic = STYLE
                .captures(body)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().eq_ignore_ascii_case("italic"))
                .unwrap_or(false);

            let (format, url) = URL
                .captures_iter(body)
                .filter_map(|c| c.get(1))
                .map(|m| {
                    let url = m.as_str().trim().to_string();
                    (FontFormat::from_url(&url), url)
                })
                .min_by_key(|(format, _)| *format)?;

            Some(FontFace {
                family,
                weight,
                italic,
                url,
                format,
                subset,
            })
        })
        .collect()
}

/// Collapse faces to one descriptor per variant
///
/// Keeps first-seen variant order; the `latin` subset replaces an earlier
/// pick for the same variant.
pub fn descriptors_from_faces(faces: Vec<FontFace>) -> Vec<FontFileDescriptor> {
    let mut picked: Vec<FontFace> = Vec::new();

    for face in faces {
        let variant = face.variant();
        match picked.iter_mut().find(|p| p.variant() == variant) {
            Some(existing) => {
                let existing_preferred = existing.subset.as_deref() == Some(PREFERRED_SUBSET);
                let face_preferred = face.subset.as_deref() == Some(PREFERRED_SUBSET);
                if face_preferred && !existing_preferred {
                    *existing = face;
                }
            }
            None => picked.push(face),
        }
    }

    picked
        .into_iter()
        .map(|face| FontFileDescriptor {
            variant: face.variant(),
            family: face.family,
            url: face.url,
            format: face.format,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ROBOTO_CSS: &str = r#"
/* cyrillic */
@font-face {
  font-family: 'Roboto';
  font-style: normal;
  font-weight: 400;
  font-display: swap;
  src: url(https://fonts.gstatic.com/s/roboto/v30/cyr400.woff2) format('woff2');
  unicode-range: U+0301, U+0400-045F;
}
/* latin */
@font-face {
  font-family: 'Roboto';
  font-style: normal;
  font-weight: 400;
  font-display: swap;
  src: url(https://fonts.gstatic.com/s/roboto/v30/lat400.woff2) format('woff2');
  unicode-range: U+0000-00FF;
}
/* latin */
@font-face {
  font-family: 'Roboto';
  font-style: normal;
  font-weight: 700;
  font-display: swap;
  src: url(https://fonts.gstatic.com/s/roboto/v30/lat700.woff2) format('woff2');
  unicode-range: U+0000-00FF;
}
"#;

    #[test]
    fn test_parse_font_faces() {
        let faces = parse_font_faces(ROBOTO_CSS);
        assert_eq!(faces.len(), 3);
        assert_eq!(faces[0].family, "Roboto");
        assert_eq!(faces[0].subset.as_deref(), Some("cyrillic"));
        assert_eq!(faces[2].weight, 700);
        assert_eq!(faces[2].format, FontFormat::Woff2);
    }

    #[test]
    fn test_descriptors_prefer_latin_subset() {
        let descriptors = descriptors_from_faces(parse_font_faces(ROBOTO_CSS));
        assert_eq!(descriptors.len(), 2);
        assert_eq!(descriptors[0].variant, "regular");
        assert!(descriptors[0].url.ends_with("lat400.woff2"));
        assert_eq!(descriptors[1].variant, "700");
    }

    #[test]
    fn test_best_format_wins_within_block() {
        let css = r#"@font-face {
  font-family: "Local Sans";
  src: url("fonts/local.ttf") format("truetype"), url('fonts/local.woff2') format("woff2"), url(fonts/local.woff);
}"#;
        let faces = parse_font_faces(css);
        assert_eq!(faces.len(), 1);
        assert_eq!(faces[0].format, FontFormat::Woff2);
        assert_eq!(faces[0].url, "fonts/local.woff2");
        assert_eq!(faces[0].weight, 400);
    }

    #[test]
    fn test_block_without_url_skipped() {
        let css = "@font-face { font-family: 'X'; font-weight: 400; }";
        assert!(parse_font_faces(css).is_empty());
    }
}
