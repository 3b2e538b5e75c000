//! The `pset init` command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use psetkit_core::catalog::{catalog_to_toml, scan_sources};
use psetkit_core::{Catalog, CatalogEntry};
use psetkit_tex::set_number_from_path;

pub fn execute(dir: PathBuf) -> Result<()> {
    let config_path = dir.join("pset.toml");
    if config_path.exists() {
        println!("{} already exists, skipping.", config_path.display());
    } else {
        std::fs::write(&config_path, SAMPLE_CONFIG)
            .with_context(|| format!("failed to write {}", config_path.display()))?;
        println!("Created {}", config_path.display());
    }

    let catalog_path = dir.join("catalog.toml");
    if catalog_path.exists() {
        println!("{} already exists, skipping.", catalog_path.display());
    } else {
        let catalog = scan_catalog(&dir)?;
        std::fs::write(&catalog_path, catalog_to_toml(&catalog)?)
            .with_context(|| format!("failed to write {}", catalog_path.display()))?;
        println!(
            "Created {} with {} problem set(s)",
            catalog_path.display(),
            catalog.entries.len()
        );
    }

    println!("\nNext steps:");
    println!("  1. Fill in titles and summaries in catalog.toml");
    println!("  2. Run: pset validate");
    println!("  3. Run: pset build && pset catalog --output README.md");

    Ok(())
}

/// A starter catalog with one entry per numbered `.tex` file in `dir`.
fn scan_catalog(dir: &Path) -> Result<Catalog> {
    let sources = scan_sources(dir)?;

    let entries = sources
        .iter()
        .filter_map(|path| Some((path, path.file_name()?.to_str()?)))
        .zip(1u32..)
        .map(|((path, file), ordinal)| {
            CatalogEntry::new(
                ordinal,
                format!("Problem Set {}", set_number_from_path(path)),
                file,
            )
        })
        .collect();

    Ok(Catalog {
        title: "Problem Sets".to_string(),
        description: String::new(),
        html_base_url: None,
        pdf_base_url: None,
        entries,
    })
}

const SAMPLE_CONFIG: &str = r#"# psetkit configuration

catalog = "catalog.toml"

[build]
source_dir = "."
output_dir = "."
parallelism = 4
mathjax_url = "https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"

[canvas]
access_token = "${CANVAS_ACCESS_TOKEN}"
timeout_secs = 60
max_retries = 2
retry_delay_ms = 1000
"#;
