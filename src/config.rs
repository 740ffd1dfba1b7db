//! # Configuration Module
//!
//! Where the routes live and which URLs the client handles.
//!
//! Settings come from an optional TOML file, then environment variables
//! override individual fields:
//!
//! ```toml
//! routes_dir = "src/routes"
//! extensions = ".svelte .html"
//! base_url = "http://localhost:3000/"
//! ```
//!
//! ## Environment Variables
//!
//! - `FSROUTER_ROUTES_DIR`
//! - `FSROUTER_EXTENSIONS` (space-separated, e.g. `.svelte .svx`)
//! - `FSROUTER_BASE_URL`

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::manifest::{create_manifest_data, CompileError, ManifestData, DEFAULT_EXTENSIONS};
use crate::router::RouteTable;

/// Errors loading or applying a [`RouterConfig`]
#[derive(Debug)]
pub enum ConfigError {
    /// The config file could not be read
    Io { path: PathBuf, source: std::io::Error },
    /// The config file is not valid TOML for [`RouterConfig`]
    Parse { path: PathBuf, message: String },
    /// `base_url` is not an absolute URL
    InvalidBaseUrl { url: String, message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "Failed to read config {}: {}", path.display(), source)
            }
            ConfigError::Parse { path, message } => {
                write!(f, "Invalid config {}: {}", path.display(), message)
            }
            ConfigError::InvalidBaseUrl { url, message } => {
                write!(
                    f,
                    "Invalid base URL '{url}': {message}. Expected an absolute URL such as http://localhost:3000/"
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Router settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Directory holding the route files
    pub routes_dir: PathBuf,
    /// Space-separated page template extensions
    pub extensions: String,
    /// URL the client is mounted at
    pub base_url: String,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            routes_dir: PathBuf::from("src/routes"),
            extensions: DEFAULT_EXTENSIONS.to_string(),
            base_url: "http://localhost:3000/".to_string(),
        }
    }
}

impl RouterConfig {
    /// Read a TOML config file. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] or [`ConfigError::Parse`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        debug!(path = %path.display(), routes_dir = %config.routes_dir.display(), "Config loaded");
        Ok(config)
    }

    /// Defaults with environment overrides applied
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply `FSROUTER_*` environment overrides
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = lookup("FSROUTER_ROUTES_DIR") {
            self.routes_dir = PathBuf::from(dir);
        }
        if let Some(extensions) = lookup("FSROUTER_EXTENSIONS") {
            self.extensions = extensions;
        }
        if let Some(base_url) = lookup("FSROUTER_BASE_URL") {
            self.base_url = base_url;
        }
        self
    }

    /// The parsed base URL
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidBaseUrl`] if `base_url` is not absolute.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            message: e.to_string(),
        })?;
        if url.cannot_be_a_base() {
            return Err(ConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
                message: "cannot be a base".to_string(),
            });
        }
        Ok(url)
    }

    /// Compile the configured routes directory.
    ///
    /// # Errors
    ///
    /// Any [`CompileError`] of the routes tree.
    pub fn compile(&self) -> Result<ManifestData, CompileError> {
        create_manifest_data(&self.routes_dir, &self.extensions)
    }

    /// Route table for `manifest` under the configured base URL
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidBaseUrl`].
    pub fn route_table(&self, manifest: &ManifestData) -> Result<RouteTable, ConfigError> {
        Ok(RouteTable::from_manifest(manifest, &self.base_url()?))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = RouterConfig::default();
        assert_eq!(config.routes_dir, PathBuf::from("src/routes"));
        assert_eq!(config.extensions, ".svelte .html");
        assert_eq!(config.base_url().unwrap().as_str(), "http://localhost:3000/");
    }

    #[test]
    fn test_load_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fsrouter.toml");
        fs::write(&path, "routes_dir = \"app/routes\"\nbase_url = \"https://example.com/app/\"\n").unwrap();

        let config = RouterConfig::load(&path).unwrap();
        assert_eq!(config.routes_dir, PathBuf::from("app/routes"));
        assert_eq!(config.extensions, DEFAULT_EXTENSIONS);
        assert_eq!(config.base_url().unwrap().path(), "/app/");
    }

    #[test]
    fn test_load_errors() {
        let dir = TempDir::new().unwrap();
        let missing = RouterConfig::load(dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));

        let path = dir.path().join("bad.toml");
        fs::write(&path, "routes_dir = [").unwrap();
        let bad = RouterConfig::load(&path).unwrap_err();
        assert!(matches!(bad, ConfigError::Parse { .. }));
        assert!(bad.to_string().contains("bad.toml"));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("FSROUTER_ROUTES_DIR", "routes"),
            ("FSROUTER_EXTENSIONS", ".svx"),
        ]
        .into_iter()
        .collect();
        let config = RouterConfig::default()
            .with_overrides(|key| env.get(key).map(|v| (*v).to_string()));

        assert_eq!(config.routes_dir, PathBuf::from("routes"));
        assert_eq!(config.extensions, ".svx");
        assert_eq!(config.base_url, "http://localhost:3000/");
    }

    #[test]
    fn test_invalid_base_url() {
        let config = RouterConfig {
            base_url: "/relative".to_string(),
            ..RouterConfig::default()
        };
        let err = config.base_url().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }));

        let config = RouterConfig {
            base_url: "mailto:someone@example.com".to_string(),
            ..RouterConfig::default()
        };
        assert!(config.base_url().is_err());
    }

    #[test]
    fn test_compile_configured_dir() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.svx"), "").unwrap();
        fs::write(dir.path().join("about.html"), "").unwrap();

        let config = RouterConfig {
            routes_dir: dir.path().to_path_buf(),
            extensions: ".svx".to_string(),
            ..RouterConfig::default()
        };
        let manifest = config.compile().unwrap();
        assert_eq!(manifest.pages.len(), 1);
        // `.html` is not a template extension here, so about.html is a server route.
        assert_eq!(manifest.server_routes.len(), 1);

        let table = config.route_table(&manifest).unwrap();
        assert!(table.resolve("/").is_some());
    }
}
