//! Static server configuration.
//!
//! Built once at startup, then shared read-only by every connection.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;
use thiserror::Error;

use crate::http::parser::DEFAULT_MAX_LINE_LENGTH;

/// Name of the vhost used when `Host` is absent or unknown.
pub const DEFAULT_VHOST: &str = "default";

/// Environment variable naming the YAML configuration file.
pub const CONFIG_ENV: &str = "VHOSTD_CONFIG";

/// Environment variable overriding the listen address.
pub const LISTEN_ENV: &str = "LISTEN";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no vhost named \"default\" is configured")]
    MissingDefault,

    #[error("vhost \"{0}\" is configured twice")]
    Duplicate(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub vhosts: VhostTable,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Longest accepted request line, terminator included.
    pub max_line_length: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:9999".to_string(),
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }
}

/// Which handler serves a vhost, with its settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "handler", rename_all = "lowercase")]
pub enum HandlerConfig {
    /// Serve files below `root`.
    File { root: PathBuf },
    /// Answer every request with the same body.
    Text {
        body: String,
        #[serde(default = "default_text_content_type")]
        content_type: String,
    },
}

fn default_text_content_type() -> String {
    "text/plain".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VhostConfig {
    pub name: String,
    pub handler: HandlerConfig,
}

impl VhostConfig {
    pub fn new(name: impl Into<String>, handler: HandlerConfig) -> Self {
        Self {
            name: name.into(),
            handler,
        }
    }
}

/// The virtual-host table. Always holds a `default` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "HashMap<String, HandlerConfig>")]
pub struct VhostTable {
    default: VhostConfig,
    named: HashMap<String, VhostConfig>,
}

impl VhostTable {
    pub fn new(vhosts: impl IntoIterator<Item = VhostConfig>) -> Result<Self, ConfigError> {
        let mut default = None;
        let mut named = HashMap::new();

        for vhost in vhosts {
            if vhost.name == DEFAULT_VHOST {
                if default.replace(vhost).is_some() {
                    return Err(ConfigError::Duplicate(DEFAULT_VHOST.to_string()));
                }
            } else if let Some(prev) = named.insert(vhost.name.clone(), vhost) {
                return Err(ConfigError::Duplicate(prev.name));
            }
        }

        Ok(Self {
            default: default.ok_or(ConfigError::MissingDefault)?,
            named,
        })
    }

    /// Looks `host` up, falling back to the `default` entry.
    pub fn resolve(&self, host: &str) -> &VhostConfig {
        self.named.get(host).unwrap_or(&self.default)
    }

    /// Exact lookup without fallback.
    pub fn get(&self, host: &str) -> Option<&VhostConfig> {
        if host == DEFAULT_VHOST {
            return Some(&self.default);
        }
        self.named.get(host)
    }

    pub fn default_vhost(&self) -> &VhostConfig {
        &self.default
    }

    /// Number of vhosts, `default` included.
    pub fn len(&self) -> usize {
        self.named.len() + 1
    }

    /// Always false: a table cannot be built without its `default` entry.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl TryFrom<HashMap<String, HandlerConfig>> for VhostTable {
    type Error = ConfigError;

    fn try_from(map: HashMap<String, HandlerConfig>) -> Result<Self, Self::Error> {
        Self::new(map.into_iter().map(|(name, handler)| VhostConfig { name, handler }))
    }
}

impl Default for Config {
    fn default() -> Self {
        let default = VhostConfig::new(
            DEFAULT_VHOST,
            HandlerConfig::File {
                root: PathBuf::from("/tmp/test"),
            },
        );

        Self {
            server: ServerConfig::default(),
            vhosts: VhostTable {
                default,
                named: HashMap::new(),
            },
        }
    }
}

impl Config {
    /// Loads the configuration named by `VHOSTD_CONFIG`, or the built-in
    /// default when unset. `LISTEN` overrides the listen address either way.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => Self::default(),
        };

        if let Ok(addr) = std::env::var(LISTEN_ENV) {
            cfg.server.listen_addr = addr;
        }

        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&text)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_yaml_str(text: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(text).context("failed to parse YAML configuration")
    }
}
