//! Integration tests for the bundler

use anyhow::Result;
use async_trait::async_trait;
use fontpack_core::bundle::{BundleOptions, Bundler, Strategy, GUIDE_FILE, LICENSE_FILE};
use fontpack_core::catalog::{
    font_file_name, CatalogClient, CatalogEntry, FontCatalog, FontFileDescriptor, FontFormat,
};
use fontpack_core::framework::Framework;
use fontpack_core::{FontpackError, Result as CoreResult};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// In-memory catalog that knows a fixed set of families
struct MockCatalog {
    families: Vec<&'static str>,
    failing_downloads: bool,
    downloads: Mutex<Vec<String>>,
}

impl MockCatalog {
    fn new(families: &[&'static str]) -> Self {
        Self {
            families: families.to_vec(),
            failing_downloads: false,
            downloads: Mutex::new(Vec::new()),
        }
    }

    fn failing(mut self) -> Self {
        self.failing_downloads = true;
        self
    }
}

#[async_trait]
impl FontCatalog for MockCatalog {
    async fn search(&self, family: &str) -> CoreResult<Option<CatalogEntry>> {
        let wanted = family.replace(' ', "").to_lowercase();
        Ok(self
            .families
            .iter()
            .find(|f| f.replace(' ', "").to_lowercase() == wanted)
            .map(|f| CatalogEntry {
                family: f.to_string(),
                variants: vec!["regular".to_string(), "700".to_string()],
                subsets: vec!["latin".to_string()],
                files: Default::default(),
                category: None,
                version: None,
            }))
    }

    async fn font_files(
        &self,
        family: &str,
        variants: &[String],
    ) -> CoreResult<Vec<FontFileDescriptor>> {
        if !self.families.iter().any(|f| *f == family) {
            return Err(FontpackError::FamilyNotFound(family.to_string()));
        }
        Ok(variants
            .iter()
            .map(|v| FontFileDescriptor {
                family: family.to_string(),
                variant: v.clone(),
                url: format!("https://fonts.example/{family}/{v}.woff2"),
                format: FontFormat::Woff2,
            })
            .collect())
    }

    async fn download(
        &self,
        descriptor: &FontFileDescriptor,
        target_dir: &Path,
    ) -> CoreResult<PathBuf> {
        if self.failing_downloads {
            return Err(FontpackError::Http {
                url: descriptor.url.clone(),
                status: 500,
            });
        }
        self.downloads.lock().unwrap().push(descriptor.url.clone());
        let path = target_dir.join(font_file_name(descriptor));
        std::fs::write(&path, b"wOF2").map_err(|e| FontpackError::io(&path, e))?;
        Ok(path)
    }
}

fn options(strategy: Strategy, variants: &[&str]) -> BundleOptions {
    BundleOptions {
        strategy,
        variants: variants.iter().map(|v| v.to_string()).collect(),
        output_dir: PathBuf::from("public/fonts"),
        framework: Framework::Vanilla,
        include_preload: false,
        delay: Duration::ZERO,
    }
}

#[tokio::test]
async fn test_self_hosted_single_variant() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let catalog = Arc::new(MockCatalog::new(&["Roboto"]));
    let bundler = Bundler::new(catalog, temp_dir.path());

    let report = bundler
        .bundle(&["Roboto".to_string()], &options(Strategy::SelfHosted, &["regular"]))
        .await?;

    assert_eq!(report.results.len(), 1);
    let result = &report.results[0];
    let font_dir = temp_dir.path().join("public/fonts/Roboto");

    assert!(result.succeeded());
    assert_eq!(result.written_font_files.len(), 1);
    assert!(result.written_font_files[0].starts_with(&font_dir));
    assert!(result.cdn_url.is_none());

    let css = std::fs::read_to_string(font_dir.join("Roboto.css"))?;
    assert_eq!(css.matches("@font-face").count(), 1);
    assert!(css.contains("font-weight: 400;"));
    assert!(css.contains("url('./Roboto-regular.woff2')"));
    assert!(!css.contains("@import"));

    assert!(font_dir.join(LICENSE_FILE).exists());
    assert_eq!(report.guide_path, temp_dir.path().join("public/fonts").join(GUIDE_FILE));
    let guide = std::fs::read_to_string(&report.guide_path)?;
    assert!(guide.contains("@import url('./Roboto/Roboto.css');"));
    assert!(!guide.contains("## CDN setup"));
    Ok(())
}

#[tokio::test]
async fn test_both_strategy_links_and_hosts() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let catalog = Arc::new(MockCatalog::new(&["Open Sans"]));
    let bundler = Bundler::new(catalog, temp_dir.path());

    let report = bundler
        .bundle(
            &["opensans".to_string()],
            &options(Strategy::Both, &["regular", "700"]),
        )
        .await?;

    let result = &report.results[0];
    assert_eq!(result.font_family, "Open Sans");
    assert!(result.succeeded());
    assert_eq!(result.written_font_files.len(), 2);

    let css_path = result.css_file.as_ref().expect("css written");
    assert_eq!(
        css_path,
        &temp_dir.path().join("public/fonts/Open-Sans/Open-Sans.css")
    );
    let css = std::fs::read_to_string(css_path)?;
    assert!(css.contains("@font-face"));
    assert!(css.contains(
        "@import url('https://fonts.googleapis.com/css2?family=Open+Sans:wght@400;700&display=swap');"
    ));
    assert!(css.find("@import") < css.find("@font-face"));

    let guide = std::fs::read_to_string(&report.guide_path)?;
    assert!(guide.contains("## Self-hosted setup"));
    assert!(guide.contains("## CDN setup"));
    Ok(())
}

#[tokio::test]
async fn test_cdn_strategy_downloads_nothing() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let catalog = Arc::new(MockCatalog::new(&["Lato"]));
    let bundler = Bundler::new(catalog.clone(), temp_dir.path());

    let report = bundler
        .bundle(&["Lato".to_string()], &options(Strategy::Cdn, &["regular"]))
        .await?;

    let result = &report.results[0];
    assert!(result.succeeded());
    assert!(result.written_font_files.is_empty());
    assert!(result.cdn_url.is_some());
    assert!(catalog.downloads.lock().unwrap().is_empty());

    let css = std::fs::read_to_string(result.css_file.as_ref().unwrap())?;
    assert!(!css.contains("@font-face"));
    assert!(css.contains(".font-lato"));
    Ok(())
}

#[tokio::test]
async fn test_all_downloads_failing_leaves_font_unhosted() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let catalog = Arc::new(MockCatalog::new(&["Roboto"]).failing());
    let bundler = Bundler::new(catalog, temp_dir.path());

    let report = bundler
        .bundle(
            &["Roboto".to_string()],
            &options(Strategy::SelfHosted, &["regular", "700"]),
        )
        .await?;

    let result = &report.results[0];
    assert!(result.written_font_files.is_empty());
    assert!(result.error.is_none());
    assert!(!result.succeeded());

    let guide = std::fs::read_to_string(&report.guide_path)?;
    assert!(!guide.contains("@import url('./Roboto/Roboto.css');"));
    assert!(guide.contains("No font files were downloaded."));
    Ok(())
}

#[tokio::test]
async fn test_invalid_output_dir_rejected_before_writing() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let catalog = Arc::new(MockCatalog::new(&["Roboto"]));
    let bundler = Bundler::new(catalog.clone(), temp_dir.path());

    for bad in ["../outside", "/tmp/fonts", ""] {
        let mut opts = options(Strategy::SelfHosted, &["regular"]);
        opts.output_dir = PathBuf::from(bad);

        let err = bundler.bundle(&["Roboto".to_string()], &opts).await.unwrap_err();
        assert!(matches!(err, FontpackError::InvalidOutputDir { .. }), "{bad}");
        assert_eq!(err.exit_code(), 2);
    }

    assert!(catalog.downloads.lock().unwrap().is_empty());
    assert_eq!(std::fs::read_dir(temp_dir.path())?.count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_filesystem_failure_only_fails_that_font() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let out = temp_dir.path().join("public/fonts");
    std::fs::create_dir_all(&out)?;
    // A plain file where the font directory should go
    std::fs::write(out.join("Lato"), "not a directory")?;

    let catalog = Arc::new(MockCatalog::new(&["Lato", "Roboto"]));
    let bundler = Bundler::new(catalog, temp_dir.path());

    let report = bundler
        .bundle(
            &["Lato".to_string(), "Roboto".to_string()],
            &options(Strategy::SelfHosted, &["regular"]),
        )
        .await?;

    assert_eq!(report.results.len(), 2);
    assert!(report.results[0].error.is_some());
    assert!(!report.results[0].succeeded());
    assert!(report.results[1].succeeded());

    let guide = std::fs::read_to_string(&report.guide_path)?;
    assert!(guide.contains("- **Lato**: failed:"));
    assert!(guide.contains("@import url('./Roboto/Roboto.css');"));
    assert!(!guide.contains("@import url('./Lato/Lato.css');"));
    Ok(())
}

#[tokio::test]
async fn test_non_latin_families_get_separate_directories() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let catalog = Arc::new(MockCatalog::new(&["微软雅黑", "Noto Sans 日本"]));
    let bundler = Bundler::new(catalog, temp_dir.path());

    let report = bundler
        .bundle(
            &["微软雅黑".to_string(), "Noto Sans 日本".to_string()],
            &options(Strategy::SelfHosted, &["regular"]),
        )
        .await?;

    let out = temp_dir.path().join("public/fonts");
    let first = &report.results[0];
    let second = &report.results[1];
    assert!(first.succeeded() && second.succeeded());

    assert_eq!(first.css_file, Some(out.join("微软雅黑/微软雅黑.css")));
    assert_eq!(second.css_file, Some(out.join("Noto-Sans-日本/Noto-Sans-日本.css")));
    assert_ne!(first.license_file, second.license_file);
    assert_ne!(first.written_font_files, second.written_font_files);
    assert!(!out.join(".css").exists());
    assert!(!out.join(LICENSE_FILE).exists());

    let guide = std::fs::read_to_string(&report.guide_path)?;
    assert!(guide.contains("@import url('./微软雅黑/微软雅黑.css');"));
    assert!(!guide.contains(".//.css"));
    Ok(())
}

#[tokio::test]
async fn test_nextjs_module_written() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let catalog = Arc::new(MockCatalog::new(&["Inter"]));
    let bundler = Bundler::new(catalog, temp_dir.path());

    let mut opts = options(Strategy::SelfHosted, &["regular", "700"]);
    opts.framework = Framework::NextJs;
    opts.include_preload = true;

    let report = bundler.bundle(&["Inter".to_string()], &opts).await?;
    let result = &report.results[0];

    let module = std::fs::read_to_string(temp_dir.path().join("public/fonts/Inter/Inter.ts"))?;
    assert!(module.contains("next/font/local"));
    assert!(module.contains("--font-inter"));
    assert_eq!(result.framework_snippet.as_deref(), Some(module.as_str()));

    let guide = std::fs::read_to_string(&report.guide_path)?;
    assert!(guide.contains("### Next.js"));
    assert!(guide.contains("href=\"/fonts/Inter/Inter-regular.woff2\""));
    Ok(())
}

#[tokio::test]
async fn test_fonts_processed_in_order_with_delay() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let catalog = Arc::new(MockCatalog::new(&["Lato", "Roboto", "Inter"]));
    let bundler = Bundler::new(catalog.clone(), temp_dir.path());

    let mut opts = options(Strategy::SelfHosted, &["regular"]);
    opts.delay = Duration::from_millis(20);

    let started = std::time::Instant::now();
    let names: Vec<String> = ["Lato", "Roboto", "Inter"].iter().map(|s| s.to_string()).collect();
    let report = bundler.bundle(&names, &opts).await?;

    assert!(started.elapsed() >= Duration::from_millis(40));
    let families: Vec<&str> = report.results.iter().map(|r| r.font_family.as_str()).collect();
    assert_eq!(families, vec!["Lato", "Roboto", "Inter"]);
    assert_eq!(
        *catalog.downloads.lock().unwrap(),
        vec![
            "https://fonts.example/Lato/regular.woff2",
            "https://fonts.example/Roboto/regular.woff2",
            "https://fonts.example/Inter/regular.woff2",
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_bundle_against_http_catalog() -> Result<()> {
    let server = MockServer::start().await;
    let css = format!(
        "/* latin */\n@font-face {{\n  font-family: 'Roboto';\n  font-style: normal;\n  font-weight: 400;\n  src: url({uri}/files/r400.woff2) format('woff2');\n}}\n/* latin */\n@font-face {{\n  font-family: 'Roboto';\n  font-style: normal;\n  font-weight: 700;\n  src: url({uri}/files/r700.woff2) format('woff2');\n}}\n",
        uri = server.uri()
    );
    Mock::given(method("GET"))
        .and(path("/webfonts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [{ "family": "Roboto", "variants": ["regular", "700"] }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/css2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(css))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/r400.woff2"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"regular".to_vec()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/r700.woff2"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new()?;
    let client = CatalogClient::with_endpoints(&server.uri(), &server.uri(), Some("k".into()))?;
    let bundler = Bundler::new(Arc::new(client), temp_dir.path());

    let report = bundler
        .bundle(
            &["roboto".to_string()],
            &options(Strategy::SelfHosted, &["regular", "700"]),
        )
        .await?;

    let result = &report.results[0];
    assert_eq!(result.font_family, "Roboto");
    let written: HashSet<String> = result
        .written_font_files
        .iter()
        .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .collect();
    assert_eq!(written, HashSet::from(["Roboto-regular.woff2".to_string()]));
    Ok(())
}
