//! Framework glue code
//!
//! Next.js gets a `next/font/local` module per font. React and Vue only get
//! an import line for the generated stylesheet.

use std::path::Path;

use super::css::{custom_property, DownloadedFile};
use crate::framework::Framework;

/// camelCase export identifier for a family (`IBM Plex Mono` → `ibmPlexMono`)
pub fn export_name(family: &str) -> String {
    let mut name = String::new();
    for (i, word) in family
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .enumerate()
    {
        let lower = word.to_lowercase();
        if i == 0 {
            name.push_str(&lower);
        } else {
            let mut chars = lower.chars();
            if let Some(first) = chars.next() {
                name.push(first.to_ascii_uppercase());
                name.push_str(chars.as_str());
            }
        }
    }

    if name.is_empty() || name.starts_with(|c: char| !c.is_alphabetic()) {
        name.insert_str(0, "font");
    }
    name
}

/// `next/font/local` module exporting one config for all downloaded files
pub fn nextjs_module(family: &str, files: &[DownloadedFile]) -> String {
    let mut module = String::new();
    module.push_str("import localFont from 'next/font/local';\n\n");
    module.push_str(&format!("export const {} = localFont({{\n", export_name(family)));
    module.push_str("  src: [\n");
    for file in files {
        module.push_str(&format!(
            "    {{ path: './{}', weight: '{}', style: '{}' }},\n",
            file.file_name,
            file.weight(),
            file.style(),
        ));
    }
    module.push_str("  ],\n");
    module.push_str("  display: 'swap',\n");
    module.push_str(&format!("  variable: '{}',\n", custom_property(family)));
    module.push_str("});\n");
    module
}

/// Import line pulling the generated stylesheet into a component tree
pub fn stylesheet_import(css_path: &Path) -> String {
    let path = css_path.to_string_lossy().replace('\\', "/");
    let path = if path.starts_with('.') || path.starts_with('/') {
        path
    } else {
        format!("./{path}")
    };
    format!("import '{path}';")
}

/// Snippet for frameworks that only need an import
pub fn import_snippet(framework: Framework, css_path: &Path) -> Option<String> {
    match framework {
        Framework::React | Framework::Vue => Some(stylesheet_import(css_path)),
        Framework::NextJs | Framework::Vanilla | Framework::Custom => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FontFormat;

    #[test]
    fn test_export_name() {
        assert_eq!(export_name("IBM Plex Mono"), "ibmPlexMono");
        assert_eq!(export_name("Roboto"), "roboto");
        assert_eq!(export_name("42dot Sans"), "font42dotSans");
        assert_eq!(export_name("Noto Sans 日本"), "notoSans日本");
        assert_eq!(export_name("***"), "font");
    }

    #[test]
    fn test_nextjs_module() {
        let files = vec![
            DownloadedFile {
                variant: "regular".to_string(),
                file_name: "Inter-regular.woff2".to_string(),
                format: FontFormat::Woff2,
            },
            DownloadedFile {
                variant: "700".to_string(),
                file_name: "Inter-700.woff2".to_string(),
                format: FontFormat::Woff2,
            },
        ];

        let module = nextjs_module("Inter", &files);
        assert!(module.starts_with("import localFont from 'next/font/local';"));
        assert!(module.contains("export const inter = localFont({"));
        assert!(module.contains("{ path: './Inter-regular.woff2', weight: '400', style: 'normal' },"));
        assert!(module.contains("{ path: './Inter-700.woff2', weight: '700', style: 'normal' },"));
        assert!(module.contains("display: 'swap',"));
        assert!(module.contains("variable: '--font-inter',"));
    }

    #[test]
    fn test_import_snippet() {
        let css = Path::new("src/assets/fonts/Inter/Inter.css");
        assert_eq!(
            import_snippet(Framework::React, css).as_deref(),
            Some("import './src/assets/fonts/Inter/Inter.css';")
        );
        assert!(import_snippet(Framework::Vanilla, css).is_none());
    }
}
