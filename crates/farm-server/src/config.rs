use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

/// Environment variable overriding `bind_addr`.
pub const BIND_ENV: &str = "FARM_BIND";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Browser origins allowed to call the API with credentials.
    pub cors_origins: Vec<String>,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_level: String,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub medicine: MedicineConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            cors_origins: Vec::new(),
            log_level: "info".into(),
            storage: StorageConfig::default(),
            auth: AuthConfig::default(),
            medicine: MedicineConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Read a TOML file. Missing keys take their defaults.
    pub fn load(path: impl AsRef<Path>) -> ServerResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> ServerResult<Self> {
        toml::from_str(raw).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn to_toml(&self) -> ServerResult<String> {
        toml::to_string_pretty(self).map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(self) -> Self {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup. Invalid values are logged and ignored.
    pub fn apply_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(raw) = lookup(BIND_ENV) {
            match raw.parse() {
                Ok(addr) => self.bind_addr = addr,
                Err(e) => tracing::warn!("Invalid {BIND_ENV} value {raw:?}: {e}"),
            }
        }
        self
    }
}

/// Where ledger collections are kept.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StorageConfig {
    #[default]
    Memory,
    Json {
        dir: PathBuf,
    },
}

/// How requests to protected routes are authenticated.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AuthConfig {
    #[default]
    AllowAll,
    Tokens {
        tokens: Vec<String>,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MedicineConfig {
    /// Answer `getAllMedicine` on an empty collection with 404 instead of `[]`.
    pub empty_list_not_found: bool,
}

impl Default for MedicineConfig {
    fn default() -> Self {
        Self {
            empty_list_not_found: true,
        }
    }
}
