//! psetkit-tex — LaTeX problem set to Canvas-ready HTML.
//!
//! The pipeline is: read and expand the source ([`source`]), lift out macro
//! definitions ([`macros`]), split the body into sections and problems
//! ([`document`]) and render a page whose every element is inline-styled
//! ([`html`]).

pub mod document;
pub mod html;
pub mod inline;
pub mod macros;
pub mod math;
mod scan;
pub mod source;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use psetkit_core::config::BuildConfig;

pub use document::{parse_document, Block, DocMeta, Document};
pub use html::{render_document, RenderOptions};
pub use source::{load_source, set_number_from_path};

impl From<&BuildConfig> for RenderOptions {
    fn from(config: &BuildConfig) -> Self {
        Self {
            mathjax_url: config.mathjax().map(str::to_string),
        }
    }
}

/// Options for a single conversion.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Overrides the number taken from the file name.
    pub set_number: Option<u32>,
    pub render: RenderOptions,
}

/// The result of converting one source.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub html: String,
    pub document: Document,
}

impl Conversion {
    pub fn problem_count(&self) -> usize {
        self.document.problem_count()
    }
}

/// Convert an already expanded source.
pub fn convert_str(tex: &str, set_number: u32, render: &RenderOptions) -> Conversion {
    let document = parse_document(tex, set_number);
    let html = render_document(&document, render);
    Conversion { html, document }
}

/// Read, expand and convert the source at `path`.
pub fn convert_file(path: &Path, options: &ConvertOptions) -> Result<Conversion> {
    let tex = load_source(path)?;
    let set_number = options
        .set_number
        .unwrap_or_else(|| set_number_from_path(path));
    let conversion = convert_str(&tex, set_number, &options.render);
    tracing::info!(
        problems = conversion.problem_count(),
        "converted {}",
        path.display()
    );
    Ok(conversion)
}

/// `set03.tex` becomes `set03.html` next to it.
pub fn default_output_path(source: &Path) -> PathBuf {
    source.with_extension("html")
}

/// Write a page, creating parent directories as needed.
pub fn write_html(html: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, html).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
