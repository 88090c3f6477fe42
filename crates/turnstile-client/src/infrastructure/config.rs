//! TOML configuration for the door reader client.
//!
//! The client reads a single local file (default `client.toml`,
//! overridable with `--config`) at startup:
//!
//! ```toml
//! [authority]
//! host = "127.0.0.1"
//! port = 5050
//!
//! [connection]
//! initial_attempts = 3
//! connect_timeout_secs = 5
//! retry_delay_secs = 2
//! reconnect_interval_secs = 60
//! response_timeout_secs = 5
//!
//! [reader]
//! poll_interval_ms = 200
//! debounce_secs = 2
//!
//! [store]
//! path = "local_badges.json"
//! ```
//!
//! Every field has a default matching the deployed reader, so a partial
//! file or no file at all yields a working config.  The durations are
//! plain integers in the file; accessors on [`ConnectionConfig`] and
//! [`ReaderConfig`] hand them out as [`Duration`]s.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level client configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ClientConfig {
    #[serde(default)]
    pub authority: AuthorityAddr,
    #[serde(default)]
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub reader: ReaderConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

/// Where the authority server lives.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthorityAddr {
    /// Host name or IP address of the authority.
    #[serde(default = "default_authority_host")]
    pub host: String,
    /// TCP port the authority listens on.
    #[serde(default = "default_authority_port")]
    pub port: u16,
}

/// Connection attempt and retry timing.
///
/// The values gate how eagerly the reader talks to the network; none of
/// them affect the decision rules.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectionConfig {
    /// Connection attempts made at startup before settling OFFLINE.
    #[serde(default = "default_initial_attempts")]
    pub initial_attempts: u32,
    /// Upper bound on a single TCP connect.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Pause between startup attempts.
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
    /// Minimum spacing between background reconnect attempts while
    /// OFFLINE.
    #[serde(default = "default_reconnect_interval_secs")]
    pub reconnect_interval_secs: u64,
    /// How long to wait for the authority's reply to one badge check.
    #[serde(default = "default_response_timeout_secs")]
    pub response_timeout_secs: u64,
}

/// Scan loop pacing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReaderConfig {
    /// Badge reader poll interval.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Pause after each decision so one physical presentation of a badge
    /// does not register twice.
    #[serde(default = "default_debounce_secs")]
    pub debounce_secs: u64,
}

/// Where the offline badge cache lives.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreConfig {
    /// Path of the cached badge list JSON file.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_authority_host() -> String {
    "127.0.0.1".to_string()
}
fn default_authority_port() -> u16 {
    5050
}
fn default_initial_attempts() -> u32 {
    3
}
fn default_connect_timeout_secs() -> u64 {
    5
}
fn default_retry_delay_secs() -> u64 {
    2
}
fn default_reconnect_interval_secs() -> u64 {
    60
}
fn default_response_timeout_secs() -> u64 {
    5
}
fn default_poll_interval_ms() -> u64 {
    200
}
fn default_debounce_secs() -> u64 {
    2
}
fn default_store_path() -> PathBuf {
    PathBuf::from("local_badges.json")
}

impl Default for AuthorityAddr {
    fn default() -> Self {
        Self {
            host: default_authority_host(),
            port: default_authority_port(),
        }
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            initial_attempts: default_initial_attempts(),
            connect_timeout_secs: default_connect_timeout_secs(),
            retry_delay_secs: default_retry_delay_secs(),
            reconnect_interval_secs: default_reconnect_interval_secs(),
            response_timeout_secs: default_response_timeout_secs(),
        }
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            debounce_secs: default_debounce_secs(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

impl AuthorityAddr {
    /// The address pair for `TcpStream::connect`; host names resolve
    /// through the system resolver.
    pub fn endpoint(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }

    /// The address in `host:port` form, for log lines.
    pub fn display(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl ConnectionConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_secs(self.reconnect_interval_secs)
    }

    pub fn response_timeout(&self) -> Duration {
        Duration::from_secs(self.response_timeout_secs)
    }
}

impl ReaderConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_secs(self.debounce_secs)
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Loads the config from `path`, returning defaults if the file does not
/// exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not
/// found", and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: &Path) -> Result<ClientConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let cfg: ClientConfig = toml::from_str(&content)?;
            Ok(cfg)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ClientConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_deployed_reader() {
        // Arrange / Act
        let cfg = ClientConfig::default();

        // Assert – the values the deployed reader runs with
        assert_eq!(cfg.authority.display(), "127.0.0.1:5050");
        assert_eq!(cfg.connection.initial_attempts, 3);
        assert_eq!(cfg.connection.connect_timeout(), Duration::from_secs(5));
        assert_eq!(cfg.connection.retry_delay(), Duration::from_secs(2));
        assert_eq!(
            cfg.connection.reconnect_interval(),
            Duration::from_secs(60)
        );
        assert_eq!(cfg.connection.response_timeout(), Duration::from_secs(5));
        assert_eq!(cfg.reader.poll_interval(), Duration::from_millis(200));
        assert_eq!(cfg.reader.debounce(), Duration::from_secs(2));
        assert_eq!(cfg.store.path, PathBuf::from("local_badges.json"));
    }

    #[test]
    fn test_full_config_round_trips_through_toml() {
        // Arrange
        let cfg = ClientConfig {
            authority: AuthorityAddr {
                host: "authority.plant.local".to_string(),
                port: 6000,
            },
            connection: ConnectionConfig {
                initial_attempts: 5,
                connect_timeout_secs: 2,
                retry_delay_secs: 1,
                reconnect_interval_secs: 30,
                response_timeout_secs: 3,
            },
            reader: ReaderConfig {
                poll_interval_ms: 100,
                debounce_secs: 1,
            },
            store: StoreConfig {
                path: PathBuf::from("/var/lib/turnstile/badges.json"),
            },
        };

        // Act
        let text = toml::to_string_pretty(&cfg).unwrap();
        let back: ClientConfig = toml::from_str(&text).unwrap();

        // Assert
        assert_eq!(back, cfg);
    }

    #[test]
    fn test_partial_toml_fills_in_defaults() {
        // Arrange – only the authority host is specified
        let text = r#"
            [authority]
            host = "10.1.2.3"
        "#;

        // Act
        let cfg: ClientConfig = toml::from_str(text).unwrap();

        // Assert – the named field sticks, the rest are defaults
        assert_eq!(cfg.authority.host, "10.1.2.3");
        assert_eq!(cfg.authority.port, 5050);
        assert_eq!(cfg.connection, ConnectionConfig::default());
        assert_eq!(cfg.reader, ReaderConfig::default());
    }

    #[test]
    fn test_load_config_returns_default_when_file_absent() {
        // Arrange – a path that certainly does not exist
        let path = std::env::temp_dir().join(format!(
            "turnstile_client_absent_{}.toml",
            uuid::Uuid::new_v4()
        ));

        // Act
        let cfg = load_config(&path).unwrap();

        // Assert
        assert_eq!(cfg, ClientConfig::default());
    }

    #[test]
    fn test_load_config_reads_a_real_file() {
        // Arrange
        let dir = std::env::temp_dir().join(format!(
            "turnstile_client_cfg_{}",
            uuid::Uuid::new_v4()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("client.toml");
        std::fs::write(
            &path,
            "[connection]\nreconnect_interval_secs = 15\n[store]\npath = \"cache.json\"\n",
        )
        .unwrap();

        // Act
        let cfg = load_config(&path).unwrap();

        // Assert
        assert_eq!(cfg.connection.reconnect_interval(), Duration::from_secs(15));
        assert_eq!(cfg.store.path, PathBuf::from("cache.json"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_config_surfaces_parse_errors() {
        let dir = std::env::temp_dir().join(format!(
            "turnstile_client_bad_{}",
            uuid::Uuid::new_v4()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("client.toml");
        std::fs::write(&path, "[authority\nhost =").unwrap();

        let result = load_config(&path);
        assert!(matches!(result, Err(ConfigError::Parse(_))));

        std::fs::remove_dir_all(&dir).ok();
    }
}
