//! psetkit-core — catalog model, validation, rendering and configuration.
//!
//! The catalog is the single source of truth for which problem sets exist;
//! the README listing and the HTML build are both derived from it.

pub mod catalog;
pub mod config;
pub mod error;
pub mod model;

pub use catalog::{
    load_catalog, parse_catalog_str, render_markdown, rendered_links, validate_catalog,
    Severity, ValidationIssue,
};
pub use config::{load_config_from, PsetConfig};
pub use error::CatalogError;
pub use model::{Assignment, Catalog, CatalogEntry, RenderedLinks, Variant};
