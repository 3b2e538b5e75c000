//! Core data model types for psetkit.
//!
//! A catalog is the index of a course's problem sets: one entry per set, each
//! pointing at the LaTeX source that holds the problems.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// One problem set as listed in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Position in the listing, starting at 1.
    pub ordinal: u32,
    /// Heading shown for this set.
    pub title: String,
    /// Short bullet points describing the set.
    #[serde(default)]
    pub summary: Vec<String>,
    /// Source document filename (e.g. "set01.tex").
    pub source: String,
    /// Whether rendered HTML/PDF links are listed for this entry.
    #[serde(default = "default_true")]
    pub rendered: bool,
    /// Canvas assignment that receives the rendered HTML.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignment_url: Option<String>,
}

impl CatalogEntry {
    /// Create an entry with no summary and rendered links enabled.
    pub fn new(ordinal: u32, title: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            ordinal,
            title: title.into(),
            summary: Vec::new(),
            source: source.into(),
            rendered: true,
            assignment_url: None,
        }
    }

    /// Filename stem of the source document (`set01.tex` -> `set01`).
    pub fn stem(&self) -> Option<&str> {
        Path::new(&self.source)
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
    }
}

/// Derived presentation links for one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedLinks {
    pub html: String,
    pub pdf: String,
}

/// The whole index document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Course title, used as the top-level heading.
    pub title: String,
    /// Introductory paragraph.
    #[serde(default)]
    pub description: String,
    /// Base URL under which `<stem>.html` files are published.
    #[serde(default)]
    pub html_base_url: Option<String>,
    /// Base URL under which `<stem>.pdf` files are published.
    #[serde(default)]
    pub pdf_base_url: Option<String>,
    /// Entries in listing order.
    #[serde(default)]
    pub entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Find the entry whose source stem matches `stem`.
    pub fn entry_by_stem(&self, stem: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.stem() == Some(stem))
    }
}

/// Which README flavour to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Source links only.
    Plain,
    /// Source links plus rendered HTML and PDF links.
    #[default]
    Rendered,
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Plain => write!(f, "plain"),
            Variant::Rendered => write!(f, "rendered"),
        }
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plain" | "source" => Ok(Variant::Plain),
            "rendered" | "full" => Ok(Variant::Rendered),
            other => Err(format!("unknown variant: {other}")),
        }
    }
}

fn default_true() -> bool {
    true
}

/// A Canvas assignment as far as psetkit cares about it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Assignment {
    /// Display name, with a placeholder when Canvas did not send one.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("(no name)")
    }
}
