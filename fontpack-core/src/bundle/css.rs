//! Stylesheet generation for a bundled font

use crate::catalog::{is_italic, weight_of, FontFormat};
use crate::paths::sanitize_family;

/// A font file that made it to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    pub variant: String,
    pub file_name: String,
    pub format: FontFormat,
}

impl DownloadedFile {
    pub fn weight(&self) -> u16 {
        weight_of(&self.variant).unwrap_or(400)
    }

    pub fn style(&self) -> &'static str {
        if is_italic(&self.variant) {
            "italic"
        } else {
            "normal"
        }
    }
}

/// Lowercase slug used for CSS class and custom property names
pub fn css_ident(family: &str) -> String {
    sanitize_family(family).to_lowercase()
}

/// `.font-<slug>` utility class name, without the dot
pub fn utility_class(family: &str) -> String {
    format!("font-{}", css_ident(family))
}

/// `--font-<slug>` custom property name
pub fn custom_property(family: &str) -> String {
    format!("--font-{}", css_ident(family))
}

/// The declaration value every generated rule binds to
pub fn font_stack(family: &str) -> String {
    format!("'{family}', sans-serif")
}

/// Build the per-font stylesheet
///
/// `cdn_url` adds an `@import` (placed first, as CSS requires). Each
/// downloaded file gets its own `@font-face`. The utility class and custom
/// property are always appended.
pub fn generate_css(family: &str, files: &[DownloadedFile], cdn_url: Option<&str>) -> String {
    let mut css = String::new();
    css.push_str(&format!("/* {family} - generated by fontpack */\n"));

    if let Some(url) = cdn_url {
        css.push_str(&format!("@import url('{url}');\n"));
    }

    for file in files {
        css.push_str(&format!(
            "\n@font-face {{\n  font-family: '{family}';\n  font-style: {style};\n  font-weight: {weight};\n  font-display: swap;\n  src: url('./{name}') format('{format}');\n}}\n",
            style = file.style(),
            weight = file.weight(),
            name = file.file_name,
            format = file.format.css_format(),
        ));
    }

    let stack = font_stack(family);
    css.push_str(&format!(
        "\n.{class} {{\n  font-family: {stack};\n}}\n\n:root {{\n  {prop}: {stack};\n}}\n",
        class = utility_class(family),
        prop = custom_property(family),
    ));

    css
}
