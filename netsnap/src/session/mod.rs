//! The device capability the pipelines are written against.
//!
//! A [`DeviceSession`] is one authenticated management session on one
//! device. The pipelines only ever see this trait; [`SshSession`] is the
//! implementation over the SSH driver, and tests substitute scripted
//! sessions through a [`SessionFactory`].
//!
//! Every successful `open()` must be matched by a `close()` (or
//! `disconnect()`), on error paths too.

pub mod getters;
mod ssh;

pub use ssh::{SshOptions, SshSession, SshSessionFactory};

use std::future::Future;

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::Result;
use crate::inventory::Device;

/// Device identity and metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Facts {
    pub hostname: Option<String>,
    pub vendor: String,
    pub model: Option<String>,
    pub os_version: Option<String>,
    pub serial_number: Option<String>,
    pub uptime: Option<String>,
    /// Filled from the interface table when a backup is assembled.
    pub interface_list: Vec<String>,
}

/// One row of the interface table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Interface {
    pub is_up: bool,
    pub is_enabled: bool,
    pub description: String,
    pub mac_address: Option<String>,
    pub mtu: Option<u32>,
    /// Speed in Mbit/s.
    pub speed: Option<u64>,
}

/// Interface table keyed by interface name, in device output order.
pub type Interfaces = IndexMap<String, Interface>;

/// Configuration text retrieved from a device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceConfig {
    pub running: String,
    /// `None` when the platform has no startup configuration or the
    /// device does not expose one.
    pub startup: Option<String>,
}

/// A management session on one device.
///
/// All operations are sequential; none may be called before `open()`.
pub trait DeviceSession: Send {
    /// Connect and authenticate.
    fn open(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Release the session. Closing a session that is not open is a no-op.
    fn close(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Identity facts; `interface_list` is left to the caller.
    fn get_facts(&mut self) -> impl Future<Output = Result<Facts>> + Send;

    fn get_config(&mut self) -> impl Future<Output = Result<DeviceConfig>> + Send;

    fn get_interfaces(&mut self) -> impl Future<Output = Result<Interfaces>> + Send;

    /// Enter privileged (enable) mode.
    fn enable(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Apply `commands` in order as one configuration change and return
    /// the device output.
    fn send_config_set(
        &mut self,
        commands: &[String],
    ) -> impl Future<Output = Result<String>> + Send;

    /// Persist the running configuration and return the device output.
    fn save_config(&mut self) -> impl Future<Output = Result<String>> + Send;

    /// Run one operational command and return its output.
    fn send_command(&mut self, command: &str) -> impl Future<Output = Result<String>> + Send;

    /// Alias of [`close`](Self::close).
    fn disconnect(&mut self) -> impl Future<Output = Result<()>> + Send {
        self.close()
    }
}

/// Builds an unopened session for a device.
pub trait SessionFactory {
    type Session: DeviceSession;

    fn session(&self, device: &Device) -> Result<Self::Session>;
}
