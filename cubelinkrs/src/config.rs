//! Configuration for Cubelink connections.
//!
//! TOML-based, with global query defaults and named connection entries.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MdxError, Result};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CubelinkConfig {
    pub defaults: GlobalDefaults,
    /// Named connection entries, keyed by the name used in the
    /// [`ConnectionManager`](crate::connectors::ConnectionManager).
    #[serde(default)]
    pub connections: HashMap<String, ConnectionConfig>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GlobalDefaults {
    pub query: QueryConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Statement timeout in milliseconds (default: 30000).
    pub timeout_ms: u64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self { timeout_ms: 30_000 }
    }
}

/// One configured cube connection, by transport shape.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "transport", rename_all = "snake_case")]
pub enum ConnectionConfig {
    Xmla(XmlaConfig),
    OpenQuery(OpenQueryConfig),
}

/// Direct XMLA endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct XmlaConfig {
    /// URI of the XMLA endpoint.
    pub server: String,
    /// Basic-auth user name.
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Catalog the session is bound to.
    pub catalog: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    QueryConfig::default().timeout_ms
}

/// OPENQUERY bridge through a SQL Server linked server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OpenQueryConfig {
    /// Name under which the linked server is registered.
    pub linked_server: String,
    pub srvproduct: String,
    pub provider: String,
    /// OLAP server the linked server points at.
    pub datasrc: String,
    pub catalog: String,
}

impl Default for OpenQueryConfig {
    fn default() -> Self {
        Self {
            linked_server: "CUBELINK_OLAP".to_string(),
            srvproduct: String::new(),
            provider: "MSOLAP".to_string(),
            datasrc: String::new(),
            catalog: String::new(),
        }
    }
}

impl CubelinkConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| MdxError::Config(format!("failed to read config file: {e}")))?;
        Self::from_toml(&contents)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str)
            .map_err(|e| MdxError::Config(format!("failed to parse config: {e}")))
    }

    /// Load from default locations (env var, cwd, user config dir, or
    /// defaults).
    ///
    /// Search order:
    /// 1. `CUBELINK_CONFIG` environment variable
    /// 2. `./cubelink.toml` (current directory)
    /// 3. `~/.config/cubelink/config.toml` (user config dir)
    /// 4. Built-in defaults
    pub fn load_default() -> Self {
        if let Ok(path) = std::env::var("CUBELINK_CONFIG") {
            if let Ok(cfg) = Self::from_file(&path) {
                tracing::info!(path = %path, "loaded config from CUBELINK_CONFIG");
                return cfg;
            }
        }

        if let Ok(cfg) = Self::from_file("cubelink.toml") {
            tracing::info!("loaded config from ./cubelink.toml");
            return cfg;
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("cubelink").join("config.toml");
            if let Ok(cfg) = Self::from_file(&user_config) {
                tracing::info!(path = %user_config.display(), "loaded config from user config dir");
                return cfg;
            }
        }

        tracing::debug!("no config file found, using defaults");
        Self::default()
    }
}
