//! TOML configuration for the authority server.
//!
//! The authority reads a single local file (default `authority.toml`,
//! overridable with `--config`) at startup:
//!
//! ```toml
//! [listen]
//! address = "0.0.0.0"
//! port = 5050
//!
//! [access]
//! badges = ["F39A370E", "20047935", "00220394", "72349395"]
//! lock_start = "22:00"   # optional
//! lock_end = "05:00"     # optional
//! ```
//!
//! Every field has a default, so a partial file or no file at all yields
//! a working config (an empty roster simply denies everyone until the
//! operator provides one).  The file is read once; runtime mutations
//! made through the console are never written back, a restart returns to
//! the configured state.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::state::LockBounds;
use turnstile_core::{BadgeId, TimeOfDay};

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

/// Top-level authority configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AuthorityConfig {
    #[serde(default)]
    pub listen: ListenConfig,
    #[serde(default)]
    pub access: AccessConfig,
}

/// Where the authority accepts reader connections.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListenConfig {
    /// IP address to bind.  `"0.0.0.0"` binds all interfaces.
    #[serde(default = "default_listen_address")]
    pub address: String,
    /// TCP port readers connect to.
    #[serde(default = "default_listen_port")]
    pub port: u16,
}

/// The initial access state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AccessConfig {
    /// Badges authorized at startup.
    #[serde(default)]
    pub badges: Vec<BadgeId>,
    /// Optional pre-set lock window start, `"HH:MM"`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub lock_start: Option<TimeOfDay>,
    /// Optional pre-set lock window end, `"HH:MM"`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub lock_end: Option<TimeOfDay>,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_listen_address() -> String {
    "0.0.0.0".to_string()
}
fn default_listen_port() -> u16 {
    5050
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            address: default_listen_address(),
            port: default_listen_port(),
        }
    }
}

impl ListenConfig {
    /// The bind address in `host:port` form.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

impl AccessConfig {
    /// The configured roster as a set.
    pub fn roster(&self) -> HashSet<BadgeId> {
        self.badges.iter().cloned().collect()
    }

    /// The configured lock bounds.
    pub fn lock_bounds(&self) -> LockBounds {
        LockBounds {
            start: self.lock_start,
            end: self.lock_end,
        }
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Loads the config from `path`, returning defaults if the file does not
/// exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not
/// found", and [`ConfigError::Parse`] if the TOML is malformed (which
/// includes an empty badge string or a bad `HH:MM` time).
pub fn load_config(path: &Path) -> Result<AuthorityConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let cfg: AuthorityConfig = toml::from_str(&content)?;
            Ok(cfg)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AuthorityConfig::default()),
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
    fn test_default_config_has_expected_listen_addr() {
        // Arrange / Act
        let cfg = AuthorityConfig::default();

        // Assert – the deployed authority's address and port
        assert_eq!(cfg.listen.address, "0.0.0.0");
        assert_eq!(cfg.listen.port, 5050);
        assert_eq!(cfg.listen.bind_addr(), "0.0.0.0:5050");
    }

    #[test]
    fn test_default_config_has_empty_deny_all_roster() {
        let cfg = AuthorityConfig::default();

        assert!(cfg.access.badges.is_empty());
        assert!(cfg.access.roster().is_empty());
        assert_eq!(cfg.access.lock_bounds(), LockBounds::default());
    }

    #[test]
    fn test_full_config_round_trips_through_toml() {
        // Arrange
        let cfg = AuthorityConfig {
            listen: ListenConfig {
                address: "127.0.0.1".to_string(),
                port: 6000,
            },
            access: AccessConfig {
                badges: vec![
                    BadgeId::new("F39A370E").unwrap(),
                    BadgeId::new("20047935").unwrap(),
                ],
                lock_start: Some(TimeOfDay::new(22, 0).unwrap()),
                lock_end: Some(TimeOfDay::new(5, 0).unwrap()),
            },
        };

        // Act
        let text = toml::to_string_pretty(&cfg).unwrap();
        let back: AuthorityConfig = toml::from_str(&text).unwrap();

        // Assert
        assert_eq!(back, cfg);
    }

    #[test]
    fn test_partial_toml_fills_in_defaults() {
        // Arrange – only the roster is specified
        let text = r#"
            [access]
            badges = ["F39A370E"]
        "#;

        // Act
        let cfg: AuthorityConfig = toml::from_str(text).unwrap();

        // Assert
        assert_eq!(cfg.listen, ListenConfig::default());
        assert_eq!(cfg.access.badges.len(), 1);
        assert_eq!(cfg.access.lock_start, None);
    }

    #[test]
    fn test_lock_bounds_parse_from_hh_mm_strings() {
        let text = r#"
            [access]
            lock_start = "22:00"
            lock_end = "05:00"
        "#;

        let cfg: AuthorityConfig = toml::from_str(text).unwrap();
        let bounds = cfg.access.lock_bounds();

        assert!(bounds.window().is_some());
        assert_eq!(bounds.start, Some(TimeOfDay::new(22, 0).unwrap()));
        assert_eq!(bounds.end, Some(TimeOfDay::new(5, 0).unwrap()));
    }

    #[test]
    fn test_empty_badge_string_is_a_parse_error() {
        // An empty ID can never match a scan; rejecting it at load time
        // surfaces the typo instead of silently carrying a dead entry.
        let text = r#"
            [access]
            badges = ["F39A370E", ""]
        "#;

        let result: Result<AuthorityConfig, _> = toml::from_str(text);
        assert!(result.is_err());
    }

    #[test]
    fn test_malformed_time_is_a_parse_error() {
        let text = r#"
            [access]
            lock_start = "25:99"
        "#;

        let result: Result<AuthorityConfig, _> = toml::from_str(text);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_returns_default_when_file_absent() {
        // Arrange – a path that certainly does not exist
        let path = std::env::temp_dir().join(format!(
            "turnstile_absent_{}.toml",
            uuid::Uuid::new_v4()
        ));

        // Act
        let cfg = load_config(&path).unwrap();

        // Assert
        assert_eq!(cfg, AuthorityConfig::default());
    }

    #[test]
    fn test_load_config_reads_a_real_file() {
        // Arrange
        let dir = std::env::temp_dir().join(format!("turnstile_cfg_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("authority.toml");
        std::fs::write(
            &path,
            "[listen]\naddress = \"127.0.0.1\"\nport = 7070\n",
        )
        .unwrap();

        // Act
        let cfg = load_config(&path).unwrap();

        // Assert
        assert_eq!(cfg.listen.bind_addr(), "127.0.0.1:7070");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_config_surfaces_parse_errors() {
        let dir = std::env::temp_dir().join(format!("turnstile_bad_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("authority.toml");
        std::fs::write(&path, "this is not toml [").unwrap();

        let result = load_config(&path);
        assert!(matches!(result, Err(ConfigError::Parse(_))));

        std::fs::remove_dir_all(&dir).ok();
    }
}
