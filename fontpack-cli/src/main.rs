//! fontpack - detect the fonts a project uses and bundle them for production
//!
//! Logs go to stderr so `--json` output on stdout stays machine-readable.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use fontpack_core::bundle::{BundleOptions, BundleReport, Bundler, Strategy};
use fontpack_core::catalog::CatalogClient;
use fontpack_core::config::{FontpackConfig, CONFIG_FILE};
use fontpack_core::detect::{DetectedFontReference, Detector};
use fontpack_core::framework::{infer_framework, Framework};
use fontpack_core::FontpackError;

mod catalog_cli;

/// Log levels
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "fontpack",
    about = "Detect the fonts a project uses and bundle them for production",
    version
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// Set log level
    #[clap(long, default_value = "info", global = true)]
    log_level: LogLevel,

    /// Emit logs as JSON lines
    #[clap(long, global = true)]
    log_json: bool,

    /// Override configuration file path
    #[clap(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
enum Command {
    /// Scan a project for the fonts it references
    Detect {
        /// Project root
        #[clap(long, default_value = ".")]
        root: PathBuf,

        /// Host UI font stack to include (e.g. "'Inter', sans-serif")
        #[clap(long)]
        ui_font: Option<String>,

        /// Output results as JSON
        #[clap(long)]
        json: bool,
    },

    /// Infer the project's framework and suggested font directory
    Framework {
        /// Project root
        #[clap(long, default_value = ".")]
        root: PathBuf,

        /// Output results as JSON
        #[clap(long)]
        json: bool,
    },

    /// Bundle fonts for production
    Bundle {
        /// Font families to bundle (detected from the project when omitted)
        fonts: Vec<String>,

        /// Project root
        #[clap(long, default_value = ".")]
        root: PathBuf,

        /// Delivery strategy: self-hosted, cdn or both
        #[clap(long)]
        strategy: Option<Strategy>,

        /// Target framework (inferred when omitted)
        #[clap(long)]
        framework: Option<Framework>,

        /// Project-relative output directory (inferred when omitted)
        #[clap(long)]
        output_dir: Option<PathBuf>,

        /// Variants to fetch (comma-separated, e.g. regular,700)
        #[clap(long, value_delimiter = ',')]
        variants: Option<Vec<String>>,

        /// Add preload hints to the guide
        #[clap(long, conflicts_with = "no_preload")]
        preload: bool,

        /// Leave preload hints out of the guide
        #[clap(long)]
        no_preload: bool,

        /// Pause between fonts in milliseconds
        #[clap(long)]
        delay_ms: Option<u64>,

        /// Output the report as JSON
        #[clap(long)]
        json: bool,
    },

    #[clap(flatten)]
    Catalog(catalog_cli::CatalogCommand),
}

/// Initialize tracing with CLI flags
fn initialize_tracing(log_level: &LogLevel, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_filter_directive()));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    initialize_tracing(&cli.log_level, cli.log_json);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(exit_code(&e));
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Command::Detect { root, ui_font, json } => {
            let config = load_config(&root, config_path)?;
            detect_command(&root, &config, ui_font, json).await
        }
        Command::Framework { root, json } => framework_command(&root, json),
        Command::Bundle {
            fonts,
            root,
            strategy,
            framework,
            output_dir,
            variants,
            preload,
            no_preload,
            delay_ms,
            json,
        } => {
            let config = load_config(&root, config_path)?;
            let overrides = BundleOverrides {
                strategy,
                framework,
                output_dir,
                variants,
                preload: match (preload, no_preload) {
                    (true, _) => Some(true),
                    (_, true) => Some(false),
                    _ => None,
                },
                delay_ms,
            };
            bundle_command(&root, &config, fonts, overrides, json).await
        }
        Command::Catalog(command) => command.execute(config_path).await,
    }
}

/// Map an error chain to the process exit code
fn exit_code(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<FontpackError>())
        .map(FontpackError::exit_code)
        .unwrap_or(1)
}

/// Global config location, used when neither `--config` nor a project config exists
fn global_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "fontpack").map(|dirs| dirs.config_dir().join("config.yaml"))
}

/// Load configuration: `--config`, then the project file, then the global file, then defaults
pub(crate) fn load_config(root: &Path, explicit: Option<&Path>) -> Result<FontpackConfig> {
    if explicit.is_none() && !root.join(CONFIG_FILE).exists() {
        if let Some(global) = global_config_path().filter(|p| p.exists()) {
            debug!("Using global config {}", global.display());
            return Ok(FontpackConfig::load_from_path(&global)?);
        }
    }
    Ok(FontpackConfig::load(root, explicit)?)
}

// Table row structure for detected fonts
#[derive(Tabled)]
struct DetectedRow {
    #[tabled(rename = "Font")]
    name: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Found in")]
    origin: String,
    #[tabled(rename = "Installed")]
    installed: String,
}

impl From<&DetectedFontReference> for DetectedRow {
    fn from(reference: &DetectedFontReference) -> Self {
        Self {
            name: reference.name.clone(),
            source: reference.source.to_string(),
            origin: reference
                .origin_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "-".to_string()),
            installed: match reference.known_installed {
                Some(true) => "yes".to_string(),
                _ => "-".to_string(),
            },
        }
    }
}

pub(crate) fn print_table<T: Tabled>(rows: &[T]) {
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .to_string();
    println!("{table}");
}

pub(crate) async fn detect_fonts(
    root: &Path,
    config: &FontpackConfig,
    ui_font: Option<String>,
) -> Result<Vec<DetectedFontReference>> {
    let mut detector = Detector::from_config(config);
    if let Some(stack) = ui_font {
        detector = detector.with_host_font_family(stack);
    }
    detector
        .detect(root, None)
        .await
        .with_context(|| format!("Failed to scan {}", root.display()))
}

async fn detect_command(
    root: &Path,
    config: &FontpackConfig,
    ui_font: Option<String>,
    json: bool,
) -> Result<()> {
    let references = detect_fonts(root, config, ui_font).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&references)?);
        return Ok(());
    }

    if references.is_empty() {
        println!("No fonts detected in {}", root.display());
        return Ok(());
    }

    println!("Detected {} font(s)\n", references.len());
    let rows: Vec<DetectedRow> = references.iter().map(DetectedRow::from).collect();
    print_table(&rows);
    Ok(())
}

fn framework_command(root: &Path, json: bool) -> Result<()> {
    let suggestion = infer_framework(root);

    if json {
        println!("{}", serde_json::to_string_pretty(&suggestion)?);
    } else {
        println!("Framework:  {}", suggestion.framework);
        println!("Font dir:   {}", suggestion.default_output_dir.display());
        println!(
            "Source:     {}",
            if suggestion.detected_from_manifest {
                "package.json"
            } else {
                "directory layout"
            }
        );
    }
    Ok(())
}

/// Per-invocation values that win over configuration
#[derive(Debug, Default)]
struct BundleOverrides {
    strategy: Option<Strategy>,
    framework: Option<Framework>,
    output_dir: Option<PathBuf>,
    variants: Option<Vec<String>>,
    preload: Option<bool>,
    delay_ms: Option<u64>,
}

/// Combine flags, configuration and inference into bundle options
fn resolve_bundle_options(
    root: &Path,
    config: &FontpackConfig,
    overrides: BundleOverrides,
) -> BundleOptions {
    let framework = overrides.framework.or(config.bundle.framework);
    let output_dir = overrides
        .output_dir
        .or_else(|| config.bundle.output_dir.clone());

    let (framework, output_dir) = match (framework, output_dir) {
        (Some(framework), Some(dir)) => (framework, dir),
        (framework, dir) => {
            let suggestion = infer_framework(root);
            debug!(
                "Inferred {} with font dir {}",
                suggestion.framework,
                suggestion.default_output_dir.display()
            );
            (
                framework.unwrap_or(suggestion.framework),
                dir.unwrap_or(suggestion.default_output_dir),
            )
        }
    };

    let mut options = BundleOptions::from_config(config, framework, output_dir);
    if let Some(strategy) = overrides.strategy {
        options.strategy = strategy;
    }
    if let Some(variants) = overrides.variants {
        options.variants = variants
            .into_iter()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect();
    }
    if let Some(preload) = overrides.preload {
        options.include_preload = preload;
    }
    if let Some(ms) = overrides.delay_ms {
        options.delay = std::time::Duration::from_millis(ms);
    }
    options
}

// Table row structure for bundle results
#[derive(Tabled)]
struct BundleRow {
    #[tabled(rename = "Font")]
    family: String,
    #[tabled(rename = "Files")]
    files: usize,
    #[tabled(rename = "Stylesheet")]
    css: String,
    #[tabled(rename = "Status")]
    status: String,
}

async fn bundle_command(
    root: &Path,
    config: &FontpackConfig,
    fonts: Vec<String>,
    overrides: BundleOverrides,
    json: bool,
) -> Result<()> {
    let options = resolve_bundle_options(root, config, overrides);
    options.validate()?;

    let fonts = if fonts.is_empty() {
        if !config.auto_detect {
            return Err(FontpackError::Config(
                "No fonts given and auto_detect is disabled".to_string(),
            )
            .into());
        }
        let detected = detect_fonts(root, config, None).await?;
        detected.into_iter().map(|r| r.name).collect::<Vec<_>>()
    } else {
        fonts
    };

    if fonts.is_empty() {
        println!("No fonts to bundle. Pass font names or add font-family declarations.");
        return Ok(());
    }

    info!("Bundling: {}", fonts.join(", "));
    let catalog = Arc::new(CatalogClient::from_config(config)?);
    let bundler = Bundler::new(catalog, root);
    let report = bundler.bundle(&fonts, &options).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_bundle_report(root, &report);
    }

    if !report.results.iter().any(|r| r.succeeded()) {
        return Err(FontpackError::DownloadFailed("No font could be bundled".to_string()).into());
    }
    Ok(())
}

fn print_bundle_report(root: &Path, report: &BundleReport) {
    let rows: Vec<BundleRow> = report
        .results
        .iter()
        .map(|r| BundleRow {
            family: r.font_family.clone(),
            files: r.written_font_files.len(),
            css: r
                .css_file
                .as_ref()
                .map(|p| p.strip_prefix(root).unwrap_or(p).display().to_string())
                .unwrap_or_else(|| "-".to_string()),
            status: match (&r.error, r.succeeded()) {
                (Some(error), _) => format!("failed: {error}"),
                (None, true) => "ok".to_string(),
                (None, false) => "no files".to_string(),
            },
        })
        .collect();

    print_table(&rows);
    println!(
        "\nIntegration guide: {}",
        report
            .guide_path
            .strip_prefix(root)
            .unwrap_or(&report.guide_path)
            .display()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use tempfile::TempDir;

    #[test]
    fn test_bundle_arguments_parse() {
        let cli = Cli::try_parse_from([
            "fontpack",
            "bundle",
            "Roboto",
            "Open Sans",
            "--strategy",
            "both",
            "--framework",
            "next",
            "--variants",
            "regular,700",
            "--delay-ms",
            "0",
        ])
        .unwrap();

        match cli.command {
            Command::Bundle {
                fonts,
                strategy,
                framework,
                variants,
                delay_ms,
                ..
            } => {
                assert_eq!(fonts, vec!["Roboto", "Open Sans"]);
                assert_eq!(strategy, Some(Strategy::Both));
                assert_eq!(framework, Some(Framework::NextJs));
                assert_eq!(variants, Some(vec!["regular".to_string(), "700".to_string()]));
                assert_eq!(delay_ms, Some(0));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_rejects_unknown_strategy() {
        let result = Cli::try_parse_from(["fontpack", "bundle", "--strategy", "ftp"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_preload_flags_conflict() {
        let result = Cli::try_parse_from(["fontpack", "bundle", "--preload", "--no-preload"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_catalog_commands_are_top_level() {
        let cli = Cli::try_parse_from(["fontpack", "install", "Inter", "--font-dir", "/tmp/f"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Catalog(catalog_cli::CatalogCommand::Install { .. })
        ));

        let cli = Cli::try_parse_from(["fontpack", "--log-level", "debug", "search", "Lato"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Catalog(catalog_cli::CatalogCommand::Search { .. })
        ));
    }

    #[test]
    fn test_exit_code_from_error_chain() {
        let err = anyhow::Error::from(FontpackError::FamilyNotFound("X".to_string()))
            .context("while installing");
        assert_eq!(exit_code(&err), 3);

        let err = anyhow::anyhow!("something else");
        assert_eq!(exit_code(&err), 1);

        let err = anyhow::Error::from(FontpackError::io(
            "fonts",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        ));
        assert_eq!(exit_code(&err), 5);
    }

    #[test]
    fn test_flags_override_config_and_inference() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("package.json"),
            r#"{"dependencies": {"next": "14.0.0"}}"#,
        )
        .unwrap();
        let config = FontpackConfig::default();

        let inferred = resolve_bundle_options(temp_dir.path(), &config, BundleOverrides::default());
        assert_eq!(inferred.framework, Framework::NextJs);
        assert_eq!(inferred.output_dir, PathBuf::from("public/fonts"));
        assert!(inferred.include_preload);

        let explicit = resolve_bundle_options(
            temp_dir.path(),
            &config,
            BundleOverrides {
                framework: Some(Framework::Vue),
                output_dir: Some(PathBuf::from("static/type")),
                preload: Some(false),
                variants: Some(vec![" 700 ".to_string(), String::new()]),
                ..Default::default()
            },
        );
        assert_eq!(explicit.framework, Framework::Vue);
        assert_eq!(explicit.output_dir, PathBuf::from("static/type"));
        assert!(!explicit.include_preload);
        assert_eq!(explicit.variants, vec!["700"]);
    }
}
