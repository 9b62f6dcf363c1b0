//! Tool settings.
//!
//! Defaults can be overridden by a TOML file and then by command-line
//! flags. Every key is optional:
//!
//! ```toml
//! inventory = "config/devices.yml"
//! backup_dir = "backups"
//! log_dir = "logs"
//!
//! [ssh]
//! port = 22
//! timeout_secs = 30
//! host_key_verification = "accept-new"   # strict | accept-new | disabled
//! known_hosts = "/home/ops/.ssh/known_hosts"
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::debug;
use serde::Deserialize;

use crate::error::SettingsError;
use crate::session::SshOptions;
use crate::transport::HostKeyVerification;

/// Settings file read when none is given explicitly and it exists.
pub const DEFAULT_SETTINGS_FILE: &str = "netsnap.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub inventory: PathBuf,
    pub backup_dir: PathBuf,
    pub log_dir: PathBuf,
    pub ssh: SshSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            inventory: PathBuf::from("config/devices.yml"),
            backup_dir: PathBuf::from("backups"),
            log_dir: PathBuf::from("logs"),
            ssh: SshSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SshSettings {
    pub port: u16,
    pub timeout_secs: u64,
    pub host_key_verification: HostKeyVerification,
    pub known_hosts: Option<PathBuf>,
}

impl Default for SshSettings {
    fn default() -> Self {
        Self {
            port: 22,
            timeout_secs: 30,
            host_key_verification: HostKeyVerification::AcceptNew,
            known_hosts: None,
        }
    }
}

impl Settings {
    /// Load settings. An explicit `path` must exist; otherwise
    /// [`DEFAULT_SETTINGS_FILE`] is read when present.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let path = match path {
            Some(path) => path,
            None => {
                let default = Path::new(DEFAULT_SETTINGS_FILE);
                if !default.is_file() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let text = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loading settings from {}", path.display());
        Self::parse(&text, path)
    }

    /// Parse settings TOML. `path` is only used in error messages.
    pub fn parse(text: &str, path: &Path) -> Result<Self, SettingsError> {
        toml::from_str(text).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn ssh_options(&self) -> SshOptions {
        SshOptions {
            port: self.ssh.port,
            timeout: Duration::from_secs(self.ssh.timeout_secs),
            host_key_verification: self.ssh.host_key_verification,
            known_hosts_path: self.ssh.known_hosts.clone(),
        }
    }
}
