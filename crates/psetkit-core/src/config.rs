//! psetkit configuration (`pset.toml`).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable that always wins over the configured Canvas token.
pub const TOKEN_ENV_VAR: &str = "CANVAS_ACCESS_TOKEN";

/// Default MathJax bundle loaded by generated pages.
pub const DEFAULT_MATHJAX_URL: &str = "https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js";

/// Top-level psetkit configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PsetConfig {
    /// Catalog file, relative to the working directory.
    #[serde(default = "default_catalog")]
    pub catalog: PathBuf,
    /// HTML build settings.
    #[serde(default)]
    pub build: BuildConfig,
    /// Canvas connection settings.
    #[serde(default)]
    pub canvas: CanvasConfig,
}

/// Settings for converting sources to HTML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Directory holding the `.tex` sources.
    #[serde(default = "default_dir")]
    pub source_dir: PathBuf,
    /// Directory receiving the generated `.html` files.
    #[serde(default = "default_dir")]
    pub output_dir: PathBuf,
    /// Max concurrent conversions.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    /// MathJax script URL; an empty string disables the script tag.
    #[serde(default = "default_mathjax_url")]
    pub mathjax_url: String,
}

/// Settings for the Canvas REST API.
///
/// Note: Custom Debug impl masks the access token to keep it out of logs.
#[derive(Clone, Serialize, Deserialize)]
pub struct CanvasConfig {
    /// Personal access token; `${VAR}` references are resolved.
    #[serde(default)]
    pub access_token: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Retries on transient failures (429, 5xx, network).
    #[serde(default = "default_retries")]
    pub max_retries: u32,
    /// Initial delay between retries in milliseconds.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
}

impl std::fmt::Debug for CanvasConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasConfig")
            .field("access_token", &"***")
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_delay_ms", &self.retry_delay_ms)
            .finish()
    }
}

fn default_catalog() -> PathBuf {
    PathBuf::from("catalog.toml")
}
fn default_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_parallelism() -> usize {
    4
}
fn default_mathjax_url() -> String {
    DEFAULT_MATHJAX_URL.to_string()
}
fn default_timeout() -> u64 {
    60
}
fn default_retries() -> u32 {
    2
}
fn default_retry_delay() -> u64 {
    1000
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            source_dir: default_dir(),
            output_dir: default_dir(),
            parallelism: default_parallelism(),
            mathjax_url: default_mathjax_url(),
        }
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
            retry_delay_ms: default_retry_delay(),
        }
    }
}

impl Default for PsetConfig {
    fn default() -> Self {
        Self {
            catalog: default_catalog(),
            build: BuildConfig::default(),
            canvas: CanvasConfig::default(),
        }
    }
}

impl BuildConfig {
    /// The MathJax URL, or `None` when disabled.
    pub fn mathjax(&self) -> Option<&str> {
        let url = self.mathjax_url.trim();
        (!url.is_empty()).then_some(url)
    }
}

impl CanvasConfig {
    /// The access token, or an error telling the user how to provide one.
    pub fn require_token(&self) -> Result<&str> {
        let token = self.access_token.trim();
        anyhow::ensure!(
            !token.is_empty(),
            "{TOKEN_ENV_VAR} is not set and no canvas.access_token is configured"
        );
        Ok(token)
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order without a path:
/// 1. `pset.toml` in the current directory
/// 2. `~/.config/pset/config.toml`
///
/// `CANVAS_ACCESS_TOKEN` overrides the configured token.
pub fn load_config_from(path: Option<&Path>) -> Result<PsetConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("pset.toml");
        if local.exists() {
            Some(local)
        } else {
            config_home()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => PsetConfig::default(),
    };

    if let Ok(token) = std::env::var(TOKEN_ENV_VAR) {
        if !token.trim().is_empty() {
            config.canvas.access_token = token;
        }
    }

    Ok(config)
}

/// Parse a config string and resolve `${VAR}` references.
pub fn parse_config_str(content: &str) -> Result<PsetConfig> {
    let mut config: PsetConfig = toml::from_str(content)?;
    config.canvas.access_token = resolve_env_vars(&config.canvas.access_token);
    config.build.mathjax_url = resolve_env_vars(&config.build.mathjax_url);
    Ok(config)
}

fn config_home() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("pset"))
}
