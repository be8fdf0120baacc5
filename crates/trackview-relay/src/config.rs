//! Configuration loading for the relay server.
//!
//! The canonical configuration lives in `trackview.yaml`. This module
//! defines strongly-typed structs mirroring the YAML structure, a loader
//! that reads and validates the file, and environment overrides so a
//! deployment can set ports without editing the file.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use trackview_types::{FrameSchema, SchemaError};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration or descriptor file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An environment override carries an unparseable value.
    #[error("invalid environment override {name}: {value}")]
    InvalidEnv {
        /// The environment variable name.
        name: String,
        /// The value that failed to parse.
        value: String,
    },

    /// The schema descriptor failed validation.
    ///
    /// An unknown scalar type halts initialization; a field is never
    /// silently skipped.
    #[error("invalid frame schema: {source}")]
    Schema {
        /// The underlying schema error.
        #[from]
        source: SchemaError,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level relay configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RelayConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub http: HttpConfig,

    /// UDP ingest settings.
    #[serde(default)]
    pub udp: UdpConfig,

    /// Static asset settings.
    #[serde(default)]
    pub assets: AssetConfig,

    /// Frame schema settings.
    #[serde(default)]
    pub schema: SchemaConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HttpConfig {
    /// Host address to bind (e.g. `0.0.0.0`).
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port for the viewer endpoint and asset serving.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// UDP ingest configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UdpConfig {
    /// UDP port the upstream source sends datagrams to.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for UdpConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

/// Static asset configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AssetConfig {
    /// Directory the fallback route serves files from.
    #[serde(default = "default_asset_root")]
    pub root: PathBuf,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            root: default_asset_root(),
        }
    }
}

/// Frame schema configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SchemaConfig {
    /// Optional descriptor file replacing the deployed fixed layout.
    ///
    /// One field per line, `"<typecode> <fieldName>;"`. Validated once at
    /// startup; an unknown type code aborts initialization.
    #[serde(default)]
    pub descriptor_file: Option<PathBuf>,
}

impl RelayConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values afterwards:
    /// - `TRACKVIEW_HTTP_PORT` overrides `http.port`
    /// - `TRACKVIEW_UDP_PORT` overrides `udp.port`
    /// - `TRACKVIEW_ASSET_DIR` overrides `assets.root`
    /// - `TRACKVIEW_SCHEMA_FILE` overrides `schema.descriptor_file`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::InvalidEnv`] for a malformed override.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Override settings from environment variables when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] when a port variable does not
    /// parse as a number.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(port) = env_port("TRACKVIEW_HTTP_PORT")? {
            self.http.port = port;
        }
        if let Some(port) = env_port("TRACKVIEW_UDP_PORT")? {
            self.udp.port = port;
        }
        if let Ok(root) = std::env::var("TRACKVIEW_ASSET_DIR") {
            self.assets.root = PathBuf::from(root);
        }
        if let Ok(file) = std::env::var("TRACKVIEW_SCHEMA_FILE") {
            self.schema.descriptor_file = Some(PathBuf::from(file));
        }
        Ok(())
    }

    /// Load and validate the frame schema this relay carries.
    ///
    /// Uses the descriptor file when configured, the deployed fixed layout
    /// otherwise. Validation failures are startup-fatal.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the descriptor cannot be read and
    /// [`ConfigError::Schema`] if it fails validation.
    pub fn load_schema(&self) -> Result<FrameSchema, ConfigError> {
        match &self.schema.descriptor_file {
            Some(path) => {
                let text = std::fs::read_to_string(path)?;
                Ok(FrameSchema::parse_descriptor(&text)?)
            }
            None => Ok(FrameSchema::deployed()),
        }
    }
}

/// Read an optional port override from the environment.
fn env_port(name: &str) -> Result<Option<u16>, ConfigError> {
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|_e| ConfigError::InvalidEnv {
                name: name.to_owned(),
                value,
            }),
        Err(_) => Ok(None),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    50_000
}

fn default_asset_root() -> PathBuf {
    PathBuf::from("client")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_deployed_setup() {
        let config = RelayConfig::default();
        assert_eq!(config.http.port, 50_000);
        assert_eq!(config.udp.port, 50_000);
        assert_eq!(config.assets.root, PathBuf::from("client"));
        assert!(config.schema.descriptor_file.is_none());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r"
http:
  host: 127.0.0.1
  port: 8080
udp:
  port: 42069
assets:
  root: web
";
        let config = RelayConfig::parse(yaml).unwrap();
        assert_eq!(config.http.host, "127.0.0.1");
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.udp.port, 42_069);
        assert_eq!(config.assets.root, PathBuf::from("web"));
    }

    #[test]
    fn parse_minimal_yaml_uses_defaults() {
        let config = RelayConfig::parse("udp:\n  port: 9000\n").unwrap();
        assert_eq!(config.udp.port, 9000);
        assert_eq!(config.http.port, 50_000);
    }

    #[test]
    fn default_schema_is_the_deployed_layout() {
        let config = RelayConfig::default();
        let schema = config.load_schema().unwrap();
        assert_eq!(schema.datagram_len(), trackview_types::DATAGRAM_LEN);
    }
}
