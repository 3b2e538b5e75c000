//! The `pset upload` command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use psetkit_canvas::{publish, AssignmentRef, CanvasClient};
use psetkit_core::{load_catalog, load_config_from};

pub async fn execute(
    html_path: PathBuf,
    assignment_url: Option<String>,
    dry_run: bool,
    catalog: Option<PathBuf>,
    config: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config.as_deref())?;

    let url = match assignment_url {
        Some(url) => url,
        None => {
            let catalog_path = catalog.unwrap_or_else(|| config.catalog.clone());
            lookup_assignment_url(&html_path, &catalog_path)?
        }
    };
    let target = AssignmentRef::parse(&url)?;

    let html = std::fs::read_to_string(&html_path)
        .with_context(|| format!("could not read {}", html_path.display()))?;
    let client = CanvasClient::from_config(&config.canvas)?;

    let outcome = publish(&client, &target, &html, dry_run).await?;

    println!("Assignment: {}", outcome.assignment_name);
    if outcome.used_body {
        println!("Using <body> contents only.");
    }
    println!(
        "Replacing description with {} characters from {}",
        outcome.chars,
        html_path.display()
    );
    match outcome.updated_length {
        None => println!("Dry run: not updating."),
        Some(length) => {
            println!("Update successful.");
            println!("Updated description length: {length}");
        }
    }

    Ok(())
}

/// Find the assignment URL of the catalog entry whose source stem matches
/// the page's file stem.
fn lookup_assignment_url(html_path: &Path, catalog_path: &Path) -> Result<String> {
    let stem = html_path
        .file_stem()
        .and_then(|s| s.to_str())
        .with_context(|| format!("{} has no file stem", html_path.display()))?;
    let catalog = load_catalog(catalog_path).with_context(|| {
        format!(
            "no assignment URL given and the catalog {} could not be loaded",
            catalog_path.display()
        )
    })?;
    let entry = catalog
        .entry_by_stem(stem)
        .with_context(|| format!("no catalog entry has source `{stem}.tex`"))?;
    entry
        .assignment_url
        .clone()
        .with_context(|| format!("catalog entry {} has no assignment_url", entry.ordinal))
}
