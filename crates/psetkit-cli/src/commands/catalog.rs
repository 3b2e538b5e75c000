//! The `pset catalog` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use psetkit_core::{render_markdown, validate_catalog, Variant};

use super::Workspace;

pub fn execute(
    catalog: Option<PathBuf>,
    variant: Variant,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
) -> Result<()> {
    let workspace = Workspace::load(catalog, config)?;

    let errors = validate_catalog(&workspace.catalog, None)
        .iter()
        .filter(|issue| issue.is_error())
        .count();
    if errors > 0 {
        tracing::warn!("catalog has {errors} error(s); run `pset validate` for details");
    }

    let markdown = render_markdown(&workspace.catalog, variant);
    match output {
        Some(path) => {
            std::fs::write(&path, &markdown)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Wrote {} ({variant} listing)", path.display());
        }
        None => print!("{markdown}"),
    }

    Ok(())
}
