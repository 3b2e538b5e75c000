//! Subcommand implementations.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use psetkit_core::{load_catalog, load_config_from, Catalog, PsetConfig};

pub mod build;
pub mod catalog;
pub mod convert;
pub mod init;
pub mod list;
pub mod upload;
pub mod validate;

/// A loaded catalog together with the configuration it was found through.
pub(crate) struct Workspace {
    pub config: PsetConfig,
    pub catalog_path: PathBuf,
    pub catalog: Catalog,
}

impl Workspace {
    /// Load the config, then the catalog (`--catalog`, else the configured one).
    pub fn load(catalog: Option<PathBuf>, config: Option<PathBuf>) -> Result<Self> {
        let config = load_config_from(config.as_deref())?;
        let catalog_path = catalog.unwrap_or_else(|| config.catalog.clone());
        let catalog = load_catalog(&catalog_path)
            .with_context(|| format!("failed to load catalog {}", catalog_path.display()))?;
        Ok(Self {
            config,
            catalog_path,
            catalog,
        })
    }

    /// Directory the catalog lives in; relative source and output paths
    /// are resolved against it.
    pub fn root(&self) -> &Path {
        self.catalog_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
    }

    /// `--source-dir` if given, else `build.source_dir` under the root.
    pub fn source_dir(&self, arg: Option<PathBuf>) -> PathBuf {
        arg.unwrap_or_else(|| self.root().join(&self.config.build.source_dir))
    }

    /// `--output` if given, else `build.output_dir` under the root.
    pub fn output_dir(&self, arg: Option<PathBuf>) -> PathBuf {
        arg.unwrap_or_else(|| self.root().join(&self.config.build.output_dir))
    }
}
