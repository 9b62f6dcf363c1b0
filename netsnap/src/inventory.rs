//! Device inventory loading.
//!
//! The inventory is a YAML file with a top-level `devices` list:
//!
//! ```yaml
//! devices:
//!   - host: 10.0.0.1
//!     device_type: cisco_ios
//!     username: admin
//!     password: admin
//!     secret: enable-secret
//!   - host: leaf1.lab
//!     device_type: arista_eos
//!     username: admin
//!     password: admin
//!     port: 2222
//! ```
//!
//! Entries are validated here so that a missing field fails the run at
//! startup instead of deep inside a session.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;

use log::info;
use secrecy::SecretString;
use serde::Deserialize;

use crate::error::InventoryError;
use crate::resolver::{DriverKind, resolve_driver};

/// Device type assumed when an entry has none.
pub const DEFAULT_DEVICE_TYPE: &str = "cisco_ios";

/// One validated inventory entry.
#[derive(Debug)]
pub struct Device {
    /// Hostname or address; unique within an inventory.
    pub host: String,

    /// Device-type tag, resolved to a driver with [`Device::driver`].
    pub device_type: String,

    pub username: String,

    pub password: SecretString,

    /// Enable secret. The password is used when absent.
    pub secret: Option<SecretString>,

    /// SSH port override.
    pub port: Option<u16>,
}

impl Device {
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            device_type: DEFAULT_DEVICE_TYPE.to_string(),
            username: username.into(),
            password: SecretString::from(password.into()),
            secret: None,
            port: None,
        }
    }

    pub fn with_device_type(mut self, device_type: impl Into<String>) -> Self {
        self.device_type = device_type.into();
        self
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(SecretString::from(secret.into()));
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Driver family for this device.
    pub fn driver(&self) -> DriverKind {
        resolve_driver(&self.device_type)
    }
}

#[derive(Deserialize)]
struct RawInventory {
    devices: Vec<RawDevice>,
}

#[derive(Deserialize)]
struct RawDevice {
    host: Option<String>,
    device_type: Option<String>,
    username: Option<String>,
    password: Option<String>,
    secret: Option<String>,
    port: Option<u16>,
}

impl RawDevice {
    fn validate(self, index: usize) -> Result<Device, InventoryError> {
        let invalid = |message: &str| InventoryError::InvalidDevice {
            index,
            message: message.to_string(),
        };

        let host = self
            .host
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .ok_or_else(|| invalid("missing required field 'host'"))?;
        // Host names a directory under the backup root
        if host.contains(['/', '\\']) || host.contains("..") {
            return Err(invalid(&format!(
                "host '{host}' must not contain '/', '\\' or '..'"
            )));
        }
        let username = self
            .username
            .ok_or_else(|| invalid("missing required field 'username'"))?;
        let password = self
            .password
            .ok_or_else(|| invalid("missing required field 'password'"))?;

        Ok(Device {
            host,
            device_type: self
                .device_type
                .unwrap_or_else(|| DEFAULT_DEVICE_TYPE.to_string()),
            username,
            password: SecretString::from(password),
            secret: self.secret.map(SecretString::from),
            port: self.port,
        })
    }
}

/// Load and validate the inventory at `path`.
pub fn load_inventory(path: &Path) -> Result<Vec<Device>, InventoryError> {
    let text = fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => InventoryError::NotFound {
            path: path.to_path_buf(),
        },
        _ => InventoryError::Read {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let devices = parse_inventory(&text, path)?;
    info!(
        "Successfully loaded {} devices from inventory {}",
        devices.len(),
        path.display()
    );
    Ok(devices)
}

/// Parse inventory YAML. `path` is only used in error messages.
pub fn parse_inventory(text: &str, path: &Path) -> Result<Vec<Device>, InventoryError> {
    let raw: RawInventory = serde_yml::from_str(text).map_err(|source| InventoryError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let mut seen = HashSet::new();
    let mut devices = Vec::with_capacity(raw.devices.len());

    for (index, entry) in raw.devices.into_iter().enumerate() {
        let device = entry.validate(index)?;
        if !seen.insert(device.host.clone()) {
            return Err(InventoryError::InvalidDevice {
                index,
                message: format!("duplicate host '{}'", device.host),
            });
        }
        devices.push(device);
    }

    Ok(devices)
}
