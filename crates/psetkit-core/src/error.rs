//! Catalog error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading a catalog or scanning sources.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("failed to read catalog {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The catalog file is not valid TOML or is missing required fields.
    #[error("failed to parse catalog {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The catalog could not be serialized back to TOML.
    #[error("failed to serialize catalog: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A source directory was expected.
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// Listing a source directory failed.
    #[error("failed to read directory {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
