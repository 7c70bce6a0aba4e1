//! Aggregate integration guide (`FONT_GUIDE.md`)

use chrono::{DateTime, Utc};
use std::path::Path;

use super::css::{custom_property, font_stack, utility_class};
use super::{BundleOptions, BundleResult};
use crate::catalog::FontFormat;
use crate::framework::Framework;

/// File name of the guide inside the output directory
pub const GUIDE_FILE: &str = "FONT_GUIDE.md";

/// Origins the browser should connect to early for a catalog stylesheet
fn preconnect_origins(cdn_url: &str) -> Vec<(String, bool)> {
    let Ok(url) = reqwest::Url::parse(cdn_url) else {
        return Vec::new();
    };
    let origin = url.origin().ascii_serialization();
    let mut origins = vec![(origin, false)];
    if url.host_str() == Some("fonts.googleapis.com") {
        origins.push(("https://fonts.gstatic.com".to_string(), true));
    }
    origins
}

/// URL path a browser would use for a file under the output directory
///
/// Files under `public/` are served from the site root.
fn web_path(output_dir: &Path, relative: &str) -> String {
    let dir = output_dir.to_string_lossy().replace('\\', "/");
    let dir = dir.trim_start_matches("./").trim_end_matches('/');
    let dir = if dir == "public" {
        ""
    } else {
        dir.strip_prefix("public/").unwrap_or(dir)
    };

    if dir.is_empty() {
        format!("/{relative}")
    } else {
        format!("/{dir}/{relative}")
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Render the guide for a finished run
pub fn generate_guide(
    results: &[BundleResult],
    options: &BundleOptions,
    generated_at: DateTime<Utc>,
) -> String {
    let mut md = String::new();
    md.push_str("# Font Integration Guide\n\n");
    md.push_str("| Setting | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Generated | {} |\n", generated_at.to_rfc3339()));
    md.push_str(&format!("| Strategy | {} |\n", options.strategy));
    md.push_str(&format!("| Framework | {} |\n", options.framework));
    md.push_str(&format!("| Output directory | `{}` |\n\n", options.output_dir.display()));

    write_summary(&mut md, results);

    if options.strategy.includes_self_hosting() {
        write_self_hosted(&mut md, results, options);
    }

    if options.strategy.includes_cdn() {
        write_cdn(&mut md, results, options);
    }

    write_usage(&mut md, results);
    md
}

fn write_summary(md: &mut String, results: &[BundleResult]) {
    md.push_str("## Fonts\n\n");
    if results.is_empty() {
        md.push_str("No fonts were bundled.\n\n");
        return;
    }

    for result in results {
        let status = match &result.error {
            Some(error) => format!("failed: {error}"),
            None if result.strategy.includes_self_hosting() => {
                format!("{} file(s) downloaded", result.written_font_files.len())
            }
            None => "linked from CDN".to_string(),
        };
        md.push_str(&format!("- **{}**: {}\n", result.font_family, status));
    }
    md.push('\n');
}

fn write_self_hosted(md: &mut String, results: &[BundleResult], options: &BundleOptions) {
    let hosted: Vec<&BundleResult> = results
        .iter()
        .filter(|r| r.error.is_none() && !r.written_font_files.is_empty())
        .collect();

    md.push_str("## Self-hosted setup\n\n");

    if hosted.is_empty() {
        md.push_str("No font files were downloaded.\n\n");
        return;
    }

    md.push_str("Import each font's stylesheet from your global CSS:\n\n");
    md.push_str("```css\n");
    for result in &hosted {
        let slug = result.slug();
        md.push_str(&format!("@import url('./{slug}/{slug}.css');\n"));
    }
    md.push_str("```\n\n");

    if options.include_preload {
        md.push_str("Preload the primary file of each font:\n\n");
        md.push_str("```html\n");
        for result in &hosted {
            let primary = result
                .written_font_files
                .iter()
                .find(|p| p.extension().map(|e| e == "woff2").unwrap_or(false))
                .or_else(|| result.written_font_files.first());
            if let Some(path) = primary {
                let name = file_name(path);
                let format = FontFormat::from_url(&name);
                let href = web_path(&options.output_dir, &format!("{}/{}", result.slug(), name));
                md.push_str(&format!(
                    "<link rel=\"preload\" href=\"{href}\" as=\"font\" type=\"font/{}\" crossorigin>\n",
                    format.extension(),
                ));
            }
        }
        md.push_str("```\n\n");
    }

    let snippets: Vec<&BundleResult> = hosted
        .iter()
        .copied()
        .filter(|r| r.framework_snippet.is_some())
        .collect();

    if options.framework == Framework::NextJs && !snippets.is_empty() {
        md.push_str("### Next.js\n\n");
        md.push_str("Each font has a generated `next/font/local` module next to its files:\n\n");
        for result in snippets {
            let slug = result.slug();
            md.push_str(&format!("`{slug}/{slug}.ts`\n\n"));
            md.push_str("```ts\n");
            md.push_str(result.framework_snippet.as_deref().unwrap_or_default());
            md.push_str("```\n\n");
        }
    } else if !snippets.is_empty() {
        md.push_str(&format!("### {}\n\n", options.framework));
        md.push_str("```js\n");
        for result in snippets {
            md.push_str(&format!("{}\n", result.framework_snippet.as_deref().unwrap_or_default()));
        }
        md.push_str("```\n\n");
    }
}

fn write_cdn(md: &mut String, results: &[BundleResult], options: &BundleOptions) {
    let linked: Vec<(&BundleResult, &str)> = results
        .iter()
        .filter(|r| r.error.is_none())
        .filter_map(|r| r.cdn_url.as_deref().map(|url| (r, url)))
        .collect();

    md.push_str("## CDN setup\n\n");

    if linked.is_empty() {
        md.push_str("No fonts are linked from the CDN.\n\n");
        return;
    }

    md.push_str("Add to the document `<head>`:\n\n");
    md.push_str("```html\n");
    if options.include_preload {
        let mut seen = Vec::new();
        for (_, url) in &linked {
            for (origin, crossorigin) in preconnect_origins(url) {
                if seen.contains(&origin) {
                    continue;
                }
                let attr = if crossorigin { " crossorigin" } else { "" };
                md.push_str(&format!("<link rel=\"preconnect\" href=\"{origin}\"{attr}>\n"));
                seen.push(origin);
            }
        }
    }
    for (_, url) in &linked {
        md.push_str(&format!("<link href=\"{url}\" rel=\"stylesheet\">\n"));
    }
    md.push_str("```\n\n");

    md.push_str("Or import from CSS:\n\n");
    md.push_str("```css\n");
    for (_, url) in &linked {
        md.push_str(&format!("@import url('{url}');\n"));
    }
    md.push_str("```\n\n");
}

fn write_usage(md: &mut String, results: &[BundleResult]) {
    let usable: Vec<&BundleResult> = results.iter().filter(|r| r.error.is_none()).collect();
    if usable.is_empty() {
        return;
    }

    md.push_str("## Usage\n\n");
    for result in usable {
        let family = &result.font_family;
        md.push_str(&format!("### {family}\n\n"));
        md.push_str("```css\n");
        md.push_str(&format!("body {{\n  font-family: {};\n}}\n\n", font_stack(family)));
        md.push_str(&format!(
            ".heading {{\n  font-family: var({});\n}}\n",
            custom_property(family),
        ));
        md.push_str("```\n\n");
        md.push_str("```html\n");
        md.push_str(&format!(
            "<p class=\"{}\">The quick brown fox jumps over the lazy dog.</p>\n",
            utility_class(family),
        ));
        md.push_str("```\n\n");
    }
}
