//! Catalog loading, validation and README rendering.
//!
//! The catalog is authored as `catalog.toml`; the README listing is always
//! generated from it so the two README flavours never drift apart.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::model::{Catalog, CatalogEntry, RenderedLinks, Variant};

/// On-disk layout of `catalog.toml`.
#[derive(Debug, Serialize, Deserialize)]
struct TomlCatalogFile {
    catalog: TomlCatalogHeader,
    #[serde(default)]
    entries: Vec<CatalogEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TomlCatalogHeader {
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    html_base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pdf_base_url: Option<String>,
}

/// Load a catalog from a TOML file.
pub fn load_catalog(path: &Path) -> Result<Catalog, CatalogError> {
    let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_catalog_str(&content, path)
}

/// Parse a catalog from a TOML string. `source_path` is only used in errors.
pub fn parse_catalog_str(content: &str, source_path: &Path) -> Result<Catalog, CatalogError> {
    let parsed: TomlCatalogFile =
        toml::from_str(content).map_err(|source| CatalogError::Parse {
            path: source_path.to_path_buf(),
            source,
        })?;

    Ok(Catalog {
        title: parsed.catalog.title,
        description: parsed.catalog.description,
        html_base_url: parsed.catalog.html_base_url,
        pdf_base_url: parsed.catalog.pdf_base_url,
        entries: parsed.entries,
    })
}

/// Serialize a catalog back into the `catalog.toml` layout.
pub fn catalog_to_toml(catalog: &Catalog) -> Result<String, CatalogError> {
    let file = TomlCatalogFile {
        catalog: TomlCatalogHeader {
            title: catalog.title.clone(),
            description: catalog.description.clone(),
            html_base_url: catalog.html_base_url.clone(),
            pdf_base_url: catalog.pdf_base_url.clone(),
        },
        entries: catalog.entries.clone(),
    };
    Ok(toml::to_string(&file)?)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// How serious a validation finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// A finding from catalog validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// The entry ordinal (if applicable).
    pub ordinal: Option<u32>,
    pub severity: Severity,
    pub message: String,
}

impl ValidationIssue {
    fn error(ordinal: Option<u32>, message: impl Into<String>) -> Self {
        Self {
            ordinal,
            severity: Severity::Error,
            message: message.into(),
        }
    }

    fn warning(ordinal: Option<u32>, message: impl Into<String>) -> Self {
        Self {
            ordinal,
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Validate a catalog.
///
/// When `source_dir` is given, every entry's source file must exist there.
pub fn validate_catalog(catalog: &Catalog, source_dir: Option<&Path>) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if catalog.entries.is_empty() {
        issues.push(ValidationIssue::warning(None, "catalog has no entries"));
    }

    // Duplicate ordinals
    let mut seen_ordinals = HashSet::new();
    for entry in &catalog.entries {
        if !seen_ordinals.insert(entry.ordinal) {
            issues.push(ValidationIssue::error(
                Some(entry.ordinal),
                format!("duplicate ordinal: {}", entry.ordinal),
            ));
        }
    }

    // Ordinals must read 1, 2, 3, ... in listing order
    for (position, entry) in catalog.entries.iter().enumerate() {
        let expected = position as u32 + 1;
        if entry.ordinal != expected {
            issues.push(ValidationIssue::error(
                Some(entry.ordinal),
                format!(
                    "ordinal {} at position {}; ordinals must run 1..={} in order",
                    entry.ordinal,
                    expected,
                    catalog.entries.len()
                ),
            ));
        }
    }

    // Duplicate source filenames
    let mut seen_sources = HashSet::new();
    for entry in &catalog.entries {
        if !seen_sources.insert(entry.source.as_str()) {
            issues.push(ValidationIssue::error(
                Some(entry.ordinal),
                format!("duplicate source file: {}", entry.source),
            ));
        }
    }

    for entry in &catalog.entries {
        if entry.stem().is_none() {
            issues.push(ValidationIssue::error(
                Some(entry.ordinal),
                format!("source has no file stem: {:?}", entry.source),
            ));
            continue;
        }
        if !entry.source.ends_with(".tex") {
            issues.push(ValidationIssue::warning(
                Some(entry.ordinal),
                format!("source is not a .tex file: {}", entry.source),
            ));
        }
        if let Some(dir) = source_dir {
            if !dir.join(&entry.source).is_file() {
                issues.push(ValidationIssue::error(
                    Some(entry.ordinal),
                    format!("source file not found: {}", dir.join(&entry.source).display()),
                ));
            }
        }
    }

    for entry in &catalog.entries {
        if entry.title.trim().is_empty() {
            issues.push(ValidationIssue::warning(Some(entry.ordinal), "title is empty"));
        }
        if entry.summary.is_empty() {
            issues.push(ValidationIssue::warning(
                Some(entry.ordinal),
                "summary has no bullets",
            ));
        }
    }

    issues
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Rendered-output links for an entry, derived from its source stem.
///
/// Returns `None` when the entry opts out of rendered links or has no stem.
pub fn rendered_links(catalog: &Catalog, entry: &CatalogEntry) -> Option<RenderedLinks> {
    if !entry.rendered {
        return None;
    }
    let stem = entry.stem()?;
    Some(RenderedLinks {
        html: join_url(catalog.html_base_url.as_deref(), &format!("{stem}.html")),
        pdf: join_url(catalog.pdf_base_url.as_deref(), &format!("{stem}.pdf")),
    })
}

fn join_url(base: Option<&str>, file: &str) -> String {
    match base.map(str::trim) {
        Some(base) if !base.is_empty() => format!("{}/{}", base.trim_end_matches('/'), file),
        _ => file.to_string(),
    }
}

/// Render the catalog as the README listing.
pub fn render_markdown(catalog: &Catalog, variant: Variant) -> String {
    let mut md = String::new();

    md.push_str(&format!("# {}\n\n", catalog.title.trim()));
    if !catalog.description.trim().is_empty() {
        md.push_str(catalog.description.trim());
        md.push_str("\n\n");
    }

    let mut entries: Vec<&CatalogEntry> = catalog.entries.iter().collect();
    entries.sort_by_key(|e| e.ordinal);

    for entry in entries {
        md.push_str(&format!("## {}. {}\n\n", entry.ordinal, entry.title.trim()));

        if !entry.summary.is_empty() {
            for bullet in &entry.summary {
                md.push_str(&format!("- {}\n", bullet.trim()));
            }
            md.push('\n');
        }

        let mut links = vec![link_line("Source:", &entry.source, &entry.source)];
        if variant == Variant::Rendered {
            if let (Some(found), Some(stem)) = (rendered_links(catalog, entry), entry.stem()) {
                links.push(link_line("HTML:", &format!("{stem}.html"), &found.html));
                links.push(link_line("PDF:", &format!("{stem}.pdf"), &found.pdf));
            }
        }
        md.push_str(&links.join("  \n"));
        md.push_str("\n\n");
    }

    let trimmed = md.trim_end().len();
    md.truncate(trimmed);
    md.push('\n');
    md
}

fn link_line(label: &str, text: &str, target: &str) -> String {
    format!("{label} [{text}]({target})")
}

// ---------------------------------------------------------------------------
// Source discovery
// ---------------------------------------------------------------------------

/// List the problem-set sources in `dir`.
///
/// Only `.tex` files whose stem contains a digit are considered; they are
/// ordered by that number, then by name.
pub fn scan_sources(dir: &Path) -> Result<Vec<PathBuf>, CatalogError> {
    if !dir.is_dir() {
        return Err(CatalogError::NotADirectory(dir.to_path_buf()));
    }

    let read_dir = std::fs::read_dir(dir).map_err(|source| CatalogError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut found: Vec<(u64, PathBuf)> = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|source| CatalogError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if !path.is_file() || path.extension().is_none_or(|ext| ext != "tex") {
            continue;
        }
        let Some(number) = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(leading_number)
        else {
            tracing::debug!("skipping {}: no number in file name", path.display());
            continue;
        };
        found.push((number, path));
    }

    found.sort();
    Ok(found.into_iter().map(|(_, path)| path).collect())
}

/// First run of ASCII digits in `s`.
fn leading_number(s: &str) -> Option<u64> {
    let start = s.find(|c: char| c.is_ascii_digit())?;
    let digits: String = s[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}
