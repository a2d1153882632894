//! Configuration schema for Handoff
//!
//! Configuration is stored at `~/.config/handoff/config.toml`, or at
//! `/etc/handoff/config.toml` when the platform has no user config directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Reserved account settings
    pub account: AccountConfig,

    /// Paths whose ownership is fixed at startup
    pub paths: PathsConfig,

    /// Process hand-off settings
    pub process: ProcessConfig,

    /// Cache storage settings
    pub cache: CacheConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Reserved account configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    /// User and group name
    pub name: String,

    /// Login shell for the created user
    pub shell: String,

    /// UID used when PUID is unset
    pub default_uid: u32,

    /// GID used when PGID is unset
    pub default_gid: u32,

    /// Directory holding the passwd and group databases
    pub etc_dir: PathBuf,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            name: "app".to_string(),
            shell: "/bin/sh".to_string(),
            default_uid: 1000,
            default_gid: 1000,
            etc_dir: PathBuf::from("/etc"),
        }
    }
}

/// Ownership targets
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Always chowned
    pub app_dir: PathBuf,

    /// Chowned only if present
    pub config_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            app_dir: PathBuf::from("/app"),
            config_dir: PathBuf::from("/config"),
        }
    }
}

/// How the target command replaces the entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandoffMode {
    /// Replace the process image
    #[default]
    Exec,
    /// Spawn, forward signals and mirror the exit status
    Supervise,
}

/// Process configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessConfig {
    /// File-creation mask, as an octal string
    pub umask: String,

    /// Hand-off mode
    pub mode: HandoffMode,

    /// Product name printed in the startup line
    pub product_name: String,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            umask: "0002".to_string(),
            mode: HandoffMode::Exec,
            product_name: "handoff".to_string(),
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Root directory; each subdirectory is one cache bucket
    pub root: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            root: dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("/var/cache"))
                .join("handoff"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[account]"));
        assert!(toml.contains("[process]"));
        assert!(toml.contains("mode = \"exec\""));
    }

    #[test]
    fn config_deserializes_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.account.name, "app");
        assert_eq!(config.account.default_uid, 1000);
        assert_eq!(config.paths.app_dir, PathBuf::from("/app"));
    }

    #[test]
    fn config_deserializes_partial() {
        let toml = r#"
            [account]
            name = "abc"

            [process]
            mode = "supervise"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.account.name, "abc");
        assert_eq!(config.account.shell, "/bin/sh"); // default preserved
        assert_eq!(config.process.mode, HandoffMode::Supervise);
        assert_eq!(config.process.umask, "0002");
    }
}
