//! Catalog commands
//!
//! Look families up in the remote catalog, install them locally and check
//! which detected fonts the catalog actually carries.

use anyhow::Result;
use clap::Subcommand;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tabled::Tabled;

use fontpack_core::catalog::{CatalogClient, CatalogEntry, FontCatalog};
use fontpack_core::installer::FontInstaller;
use fontpack_core::FontpackError;

use crate::{detect_fonts, load_config, print_table};

#[derive(Subcommand, Debug)]
pub enum CatalogCommand {
    /// Look a family up in the catalog
    Search {
        /// Family name (case and spacing are ignored)
        family: String,

        /// Output as JSON
        #[clap(long)]
        json: bool,
    },

    /// Show catalog details for a family
    Show {
        /// Family name
        family: String,

        /// Output as JSON
        #[clap(long)]
        json: bool,
    },

    /// Install a family into the user font directory
    Install {
        /// Family name
        family: String,

        /// Install into this directory instead of the platform default
        #[clap(long)]
        font_dir: Option<PathBuf>,
    },

    /// Re-detect project fonts against a fresh catalog listing
    Refresh {
        /// Project root
        #[clap(long, default_value = ".")]
        root: PathBuf,

        /// Output as JSON
        #[clap(long)]
        json: bool,
    },
}

impl CatalogCommand {
    pub async fn execute(self, config_path: Option<&Path>) -> Result<()> {
        match self {
            CatalogCommand::Search { family, json } => {
                let client = client_for(Path::new("."), config_path)?;
                execute_search(&client, &family, json).await
            }
            CatalogCommand::Show { family, json } => {
                let client = client_for(Path::new("."), config_path)?;
                execute_show(&client, &family, json).await
            }
            CatalogCommand::Install { family, font_dir } => {
                execute_install(&family, font_dir, config_path).await
            }
            CatalogCommand::Refresh { root, json } => {
                execute_refresh(&root, config_path, json).await
            }
        }
    }
}

fn client_for(root: &Path, config_path: Option<&Path>) -> Result<CatalogClient> {
    let config = load_config(root, config_path)?;
    Ok(CatalogClient::from_config(&config)?)
}

async fn lookup(client: &CatalogClient, family: &str) -> Result<CatalogEntry> {
    Ok(client
        .search(family)
        .await?
        .ok_or_else(|| FontpackError::FamilyNotFound(family.to_string()))?)
}

async fn execute_search(client: &CatalogClient, family: &str, json: bool) -> Result<()> {
    let entry = lookup(client, family).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        println!(
            "{} ({} variant(s), {})",
            entry.family,
            entry.variants.len(),
            entry.category.as_deref().unwrap_or("uncategorized")
        );
    }
    Ok(())
}

async fn execute_show(client: &CatalogClient, family: &str, json: bool) -> Result<()> {
    let entry = lookup(client, family).await?;
    let stylesheet = client.stylesheet_url(&entry.family, &entry.variants);

    if json {
        let output = serde_json::json!({
            "entry": entry,
            "stylesheetUrl": stylesheet,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!();
    println!("Family:   {}", entry.family);
    if let Some(category) = &entry.category {
        println!("Category: {category}");
    }
    if let Some(version) = &entry.version {
        println!("Version:  {version}");
    }
    println!("Variants: {}", entry.variants.join(", "));
    println!("Subsets:  {}", entry.subsets.join(", "));
    println!();
    println!("Stylesheet:");
    println!("  {stylesheet}");
    println!();
    println!("Bundle it:");
    println!("  fontpack bundle \"{}\"", entry.family);
    Ok(())
}

async fn execute_install(
    family: &str,
    font_dir: Option<PathBuf>,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = load_config(Path::new("."), config_path)?;
    let catalog = Arc::new(CatalogClient::from_config(&config)?);

    let installer = match font_dir {
        Some(dir) => FontInstaller::with_font_dir(catalog, dir),
        None => FontInstaller::new(catalog)?,
    }
    .with_variant_cap(config.variant_cap);

    println!("Installing {family}...");
    let outcome = installer.install(family).await?;

    println!(
        "\nInstalled {} ({})",
        outcome.family,
        outcome.variants.join(", ")
    );
    println!("Location: {}", installer.font_dir().display());
    for file in &outcome.installed_files {
        println!("  {}", file.display());
    }
    Ok(())
}

// Table row structure for catalog availability
#[derive(Tabled, Serialize)]
#[serde(rename_all = "camelCase")]
struct AvailabilityRow {
    #[tabled(rename = "Font")]
    name: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "In catalog")]
    in_catalog: bool,
    #[tabled(rename = "Catalog name")]
    catalog_family: String,
}

async fn execute_refresh(root: &Path, config_path: Option<&Path>, json: bool) -> Result<()> {
    let config = load_config(root, config_path)?;
    let client = CatalogClient::from_config(&config)?;
    client.refresh().await;

    let references = detect_fonts(root, &config, None).await?;
    let mut rows = Vec::with_capacity(references.len());
    for reference in &references {
        let entry = client.search(&reference.name).await?;
        rows.push(AvailabilityRow {
            name: reference.name.clone(),
            source: reference.source.to_string(),
            in_catalog: entry.is_some(),
            catalog_family: entry.map(|e| e.family).unwrap_or_default(),
        });
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("No fonts detected in {}", root.display());
        return Ok(());
    }

    let available = rows.iter().filter(|r| r.in_catalog).count();
    println!("{available} of {} detected font(s) are in the catalog\n", rows.len());
    print_table(&rows);
    Ok(())
}
