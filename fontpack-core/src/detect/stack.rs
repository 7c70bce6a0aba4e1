//! Font-stack parsing
//!
//! Turns the raw value of a `font-family` declaration (or a utility config
//! array) into the custom family names it mentions.

/// Custom names surfaced per declaration; the primary font comes first
pub const MAX_FAMILIES_PER_STACK: usize = 3;

/// Generic families, platform system fonts and CSS-wide keywords
const SYSTEM_FONTS: &[&str] = &[
    "serif",
    "sans-serif",
    "monospace",
    "cursive",
    "fantasy",
    "system-ui",
    "ui-sans-serif",
    "ui-serif",
    "ui-monospace",
    "ui-rounded",
    "emoji",
    "math",
    "fangsong",
    "-apple-system",
    "blinkmacsystemfont",
    "segoe ui",
    "arial",
    "helvetica",
    "helvetica neue",
    "times",
    "times new roman",
    "courier",
    "courier new",
    "georgia",
    "verdana",
    "tahoma",
    "inherit",
    "initial",
    "unset",
    "revert",
];

/// Whether a name is generic or a stock system font
pub fn is_system_font(name: &str) -> bool {
    let lower = name.to_lowercase();
    SYSTEM_FONTS.contains(&lower.as_str())
}

/// Parse a comma-separated font stack into at most three custom family names
///
/// Quotes are stripped, system fonts dropped. Tokens that are expressions
/// rather than names (`var(--x)`, `$scss-var`, `...spread`) are ignored.
pub fn parse_font_family(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    let raw = raw
        .strip_suffix("!important")
        .map(str::trim_end)
        .unwrap_or(raw);

    raw.split(',')
        .filter_map(|token| {
            let name = strip_quotes(token.trim()).trim();
            if name.is_empty() || is_expression(name) || is_system_font(name) {
                None
            } else {
                Some(name.to_string())
            }
        })
        .take(MAX_FAMILIES_PER_STACK)
        .collect()
}

fn strip_quotes(token: &str) -> &str {
    token.trim_matches(|c| c == '\'' || c == '"' || c == '`')
}

fn is_expression(token: &str) -> bool {
    token.starts_with("...")
        || token.starts_with('$')
        || token.starts_with('@')
        || token.contains('(')
        || token.contains('{')
        || token.contains('}')
}

/// Strip NUL and other control characters and collapse whitespace runs
pub fn normalize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !last_space {
                out.push(' ');
                last_space = true;
            }
        } else if ch.is_control() {
            continue;
        } else {
            out.push(ch);
            last_space = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_quotes_stripped_and_generic_dropped() {
        assert_eq!(parse_font_family("'Inter', sans-serif"), vec!["Inter"]);
        assert_eq!(parse_font_family("\"Fira Code\", monospace"), vec!["Fira Code"]);
    }

    #[test]
    fn test_at_most_three_custom_names() {
        let parsed = parse_font_family("A One, B Two, C Three, D Four, E Five");
        assert_eq!(parsed, vec!["A One", "B Two", "C Three"]);
    }

    #[test]
    fn test_system_fonts_case_insensitive() {
        assert!(parse_font_family("Arial, HELVETICA, Times New Roman, serif").is_empty());
        assert_eq!(
            parse_font_family("-apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto"),
            vec!["Roboto"]
        );
    }

    #[test]
    fn test_expressions_ignored() {
        assert_eq!(
            parse_font_family("var(--font-body), 'Lato', ...defaultTheme.fontFamily.sans"),
            vec!["Lato"]
        );
        assert!(parse_font_family("$body-font").is_empty());
    }

    #[test]
    fn test_important_suffix() {
        assert_eq!(parse_font_family("'Poppins', sans-serif !important"), vec!["Poppins"]);
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("a\0b\n\n  c\t\x07d"), "ab c d");
    }
}
