//! The `pset validate` command.

use std::path::PathBuf;

use anyhow::Result;

use psetkit_canvas::AssignmentRef;
use psetkit_core::{validate_catalog, Severity, ValidationIssue};

use super::Workspace;

pub fn execute(
    catalog: Option<PathBuf>,
    source_dir: Option<PathBuf>,
    config: Option<PathBuf>,
) -> Result<()> {
    let workspace = Workspace::load(catalog, config)?;
    let source_dir = workspace.source_dir(source_dir);
    let catalog = &workspace.catalog;

    println!(
        "Catalog: {} ({} entries)",
        catalog.title,
        catalog.entries.len()
    );

    let mut issues = validate_catalog(catalog, Some(&source_dir));
    for entry in &catalog.entries {
        let Some(url) = &entry.assignment_url else {
            continue;
        };
        if let Err(e) = AssignmentRef::parse(url) {
            issues.push(ValidationIssue {
                ordinal: Some(entry.ordinal),
                severity: Severity::Warning,
                message: e.to_string(),
            });
        }
    }

    for issue in &issues {
        let prefix = issue
            .ordinal
            .map(|n| format!("  [#{n}]"))
            .unwrap_or_else(|| "  ".to_string());
        let level = match issue.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
        };
        println!("{prefix} {level}: {}", issue.message);
    }

    let errors = issues.iter().filter(|i| i.is_error()).count();
    let warnings = issues.len() - errors;
    anyhow::ensure!(
        errors == 0,
        "{errors} error(s) and {warnings} warning(s) found"
    );

    if warnings == 0 {
        println!("Catalog valid.");
    } else {
        println!("\n{warnings} warning(s) found.");
    }

    Ok(())
}
