//! Configuration system for the service.
//!
//! Typed sections are read from an optional file and then overridden by
//! `CATEGORY_`-prefixed environment variables, e.g. `CATEGORY_STORE__KEYSPACE`.

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Result, anyhow};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Environment variable naming the configuration file (without extension).
pub const CONFIG_PATH_ENV: &str = "CATEGORY_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "config";
const ENV_PREFIX: &str = "CATEGORY";

// ============================================================================
// Configurable Trait
// ============================================================================

/// Trait for types that can be loaded from a configuration section
///
/// # Example
///
/// ```ignore
/// #[derive(Debug, Deserialize)]
/// pub struct CacheConfig {
///     #[serde(default)]
///     pub ttl_secs: u64,
/// }
///
/// impl Configurable for CacheConfig {
///     const PREFIX: &'static str = "cache";
/// }
/// ```
pub trait Configurable: DeserializeOwned {
    /// Configuration section prefix
    ///
    /// If PREFIX is "store", values are read from the `[store]` section and
    /// from `CATEGORY_STORE__*` environment variables.
    const PREFIX: &'static str;
}

// ============================================================================
// Configuration Store
// ============================================================================

/// Layered configuration: file first, environment on top
pub struct ConfigStore {
    inner: Config,
}

impl ConfigStore {
    /// Load configuration from the file named by `CATEGORY_CONFIG` (if any)
    /// plus the process environment
    pub fn load() -> Result<Self> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::from_file(&path)
    }

    /// Load configuration from an optional file plus the process environment
    pub fn from_file(path: &str) -> Result<Self> {
        Self::layered(path, None)
    }

    /// File first, then `CATEGORY_*` variables from `env` (the process
    /// environment when `None`).
    ///
    /// Env values stay strings; typed fields convert them on deserialize, so
    /// an all-digit password is still a password.
    pub(crate) fn layered(path: &str, env: Option<config::Map<String, String>>) -> Result<Self> {
        debug!("Loading configuration from: {}", path);

        let inner = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .source(env),
            )
            .build()
            .map_err(|e| anyhow!("Failed to load configuration from '{}': {}", path, e))?;

        Ok(Self { inner })
    }

    /// Create a configuration store from a TOML string, ignoring the environment
    pub fn parse(content: &str) -> Result<Self> {
        let inner = Config::builder()
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()
            .map_err(|e| anyhow!("Failed to parse TOML: {}", e))?;
        Ok(Self { inner })
    }

    /// Get a typed configuration section
    ///
    /// A missing section deserializes from an empty table, so sections whose
    /// fields all have serde defaults always load.
    pub fn get<C: Configurable>(&self) -> Result<C> {
        debug!("Loading config section: {}", C::PREFIX);

        if self.has_section(C::PREFIX) {
            self.inner.get::<C>(C::PREFIX).map_err(|e| {
                anyhow!("Failed to deserialize config section '{}': {}", C::PREFIX, e)
            })
        } else {
            Config::builder()
                .build()
                .and_then(|empty| empty.try_deserialize::<C>())
                .map_err(|e| anyhow!("Missing config section '{}': {}", C::PREFIX, e))
        }
    }

    /// Check if a configuration section exists
    pub fn has_section(&self, prefix: &str) -> bool {
        self.inner.get_table(prefix).is_ok()
    }
}

// ============================================================================
// Service Configuration Types
// ============================================================================

/// HTTP listener section
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,

    #[serde(default = "default_server_port")]
    pub port: u16,
}

impl ServerConfig {
    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow!("Invalid listen address '{}:{}': {}", self.host, self.port, e))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

impl Configurable for ServerConfig {
    const PREFIX: &'static str = "server";
}

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8000
}

/// Store password. Never appears in `Debug` output.
#[derive(Clone, Deserialize)]
#[serde(transparent)]
pub struct Password(String);

impl Password {
    pub fn new(password: impl Into<String>) -> Self {
        Self(password.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

/// Storage session section
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_host")]
    pub host: String,

    #[serde(default = "default_store_port")]
    pub port: u16,

    pub username: String,

    pub password: Password,

    /// Namespace holding the `categories` table
    pub keyspace: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,

    /// Server-side statement timeout; unset leaves the store default
    #[serde(default)]
    pub statement_timeout_ms: Option<u64>,

    /// Create the `categories` table at startup if it is missing
    #[serde(default)]
    pub create_table: bool,
}

impl StoreConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

impl Configurable for StoreConfig {
    const PREFIX: &'static str = "store";
}

fn default_store_host() -> String {
    "127.0.0.1".to_string()
}

fn default_store_port() -> u16 {
    5432
}

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout_secs() -> u64 {
    5
}

/// Output format of the log subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging section
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl Configurable for LogConfig {
    const PREFIX: &'static str = "log";
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_sections_use_defaults() {
        let store = ConfigStore::parse("").unwrap();

        let server: ServerConfig = store.get().unwrap();
        assert_eq!(server.host, "0.0.0.0");
        assert_eq!(server.port, 8000);

        let log: LogConfig = store.get().unwrap();
        assert_eq!(log.level, "info");
        assert_eq!(log.format, LogFormat::Pretty);
    }

    #[test]
    fn test_store_section() {
        let toml = r#"
            [store]
            host = "db.internal"
            username = "cassie"
            password = "hunter2"
            keyspace = "catalog"
            statement_timeout_ms = 1500
        "#;

        let store = ConfigStore::parse(toml).unwrap();
        let config: StoreConfig = store.get().unwrap();
        assert_eq!(config.host, "db.internal");
        assert_eq!(config.port, 5432);
        assert_eq!(config.username, "cassie");
        assert_eq!(config.password.expose(), "hunter2");
        assert_eq!(config.keyspace, "catalog");
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.acquire_timeout(), Duration::from_secs(5));
        assert_eq!(config.statement_timeout_ms, Some(1500));
        assert!(!config.create_table);
    }

    #[test]
    fn test_store_requires_credentials_and_keyspace() {
        let toml = r#"
            [store]
            username = "cassie"
        "#;

        let store = ConfigStore::parse(toml).unwrap();
        assert!(store.get::<StoreConfig>().is_err());

        let empty = ConfigStore::parse("").unwrap();
        assert!(empty.get::<StoreConfig>().is_err());
    }

    #[test]
    fn test_password_is_redacted() {
        let toml = r#"
            [store]
            username = "cassie"
            password = "hunter2"
            keyspace = "catalog"
        "#;

        let config: StoreConfig = ConfigStore::parse(toml).unwrap().get().unwrap();
        let rendered = format!("{:?}", config);
        assert!(rendered.contains("cassie"));
        assert!(!rendered.contains("hunter2"));
    }

    fn env(vars: &[(&str, &str)]) -> Option<config::Map<String, String>> {
        Some(
            vars.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_env_store_section_with_numeric_credentials() {
        let vars = env(&[
            ("CATEGORY_STORE__USERNAME", "1001"),
            ("CATEGORY_STORE__PASSWORD", "123456"),
            ("CATEGORY_STORE__KEYSPACE", "catalog"),
            ("CATEGORY_STORE__PORT", "6543"),
            ("CATEGORY_STORE__CREATE_TABLE", "true"),
            ("CATEGORY_STORE__STATEMENT_TIMEOUT_MS", "250"),
        ]);

        let store = ConfigStore::layered("no-such-category-config", vars).unwrap();
        let config: StoreConfig = store.get().unwrap();
        assert_eq!(config.username, "1001");
        assert_eq!(config.password.expose(), "123456");
        assert_eq!(config.keyspace, "catalog");
        assert_eq!(config.port, 6543);
        assert!(config.create_table);
        assert_eq!(config.statement_timeout_ms, Some(250));
    }

    #[test]
    fn test_env_boolean_like_password_stays_text() {
        let vars = env(&[
            ("CATEGORY_STORE__USERNAME", "cassie"),
            ("CATEGORY_STORE__PASSWORD", "true"),
            ("CATEGORY_STORE__KEYSPACE", "catalog"),
            ("CATEGORY_SERVER__PORT", "9000"),
        ]);

        let store = ConfigStore::layered("no-such-category-config", vars).unwrap();
        let config: StoreConfig = store.get().unwrap();
        assert_eq!(config.password.expose(), "true");

        let server: ServerConfig = store.get().unwrap();
        assert_eq!(server.port, 9000);
    }

    #[test]
    fn test_has_section() {
        let toml = r#"
            [log]
            format = "json"
        "#;

        let store = ConfigStore::parse(toml).unwrap();
        assert!(store.has_section("log"));
        assert!(!store.has_section("server"));

        let log: LogConfig = store.get().unwrap();
        assert_eq!(log.format, LogFormat::Json);
    }

    #[test]
    fn test_server_addr() {
        let server = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 9090,
        };
        assert_eq!(server.addr().unwrap().port(), 9090);

        let bad = ServerConfig {
            host: "not a host".to_string(),
            port: 1,
        };
        assert!(bad.addr().is_err());
    }
}
