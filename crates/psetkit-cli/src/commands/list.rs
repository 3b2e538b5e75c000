//! The `pset list` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use super::Workspace;

pub fn execute(catalog: Option<PathBuf>, config: Option<PathBuf>) -> Result<()> {
    let workspace = Workspace::load(catalog, config)?;
    let source_dir = workspace.source_dir(None);
    let output_dir = workspace.output_dir(None);

    let mut entries: Vec<_> = workspace.catalog.entries.iter().collect();
    entries.sort_by_key(|e| e.ordinal);

    let mut table = Table::new();
    table.set_header(vec!["#", "Title", "Source", "Exists", "HTML", "Canvas"]);

    for entry in &entries {
        let exists = source_dir.join(&entry.source).is_file();
        let built = entry
            .stem()
            .is_some_and(|stem| output_dir.join(format!("{stem}.html")).is_file());
        table.add_row(vec![
            Cell::new(entry.ordinal),
            Cell::new(&entry.title),
            Cell::new(&entry.source),
            Cell::new(if exists { "yes" } else { "MISSING" }),
            Cell::new(if built { "built" } else { "-" }),
            Cell::new(if entry.assignment_url.is_some() { "linked" } else { "-" }),
        ]);
    }

    println!("{}", workspace.catalog.title);
    println!("{table}");
    println!("{} problem set(s)", entries.len());

    Ok(())
}
