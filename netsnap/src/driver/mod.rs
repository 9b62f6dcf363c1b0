//! High-level driver for device interaction.
//!
//! The driver layer provides the API for sending commands and managing
//! privilege levels on a network device over one SSH shell.

mod builder;
mod generic;
mod privilege;
mod response;

pub use builder::DriverBuilder;
pub use generic::{GenericDriver, normalize_output};
pub use privilege::{PrivilegeManager, TransitionInfo};
pub use response::Response;

use std::future::Future;

use crate::error::Result;

/// Trait for device drivers.
pub trait Driver: Send {
    /// Open the connection to the device.
    fn open(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Close the connection. Closing a driver that is not open is a no-op.
    fn close(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Send a command and wait for the prompt.
    fn send_command(&mut self, command: &str) -> impl Future<Output = Result<Response>> + Send;

    /// Send commands in configuration mode.
    ///
    /// This method:
    /// 1. Acquires the configuration privilege level
    /// 2. Sends the commands in order, stopping at the first rejected one
    /// 3. Commits, on platforms that stage changes in a candidate
    /// 4. Returns to the previous privilege level
    ///
    /// A rejected command is returned as `DriverError::CommandFailed`;
    /// on commit-based platforms the candidate is discarded first.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use netsnap::driver::Driver;
    ///
    /// # async fn example(driver: &mut impl Driver) -> Result<(), netsnap::Error> {
    /// let responses = driver.send_config(&[
    ///     "interface GigabitEthernet0/1",
    ///     "description Uplink to Core",
    ///     "no shutdown",
    /// ]).await?;
    /// # Ok(())
    /// # }
    /// ```
    fn send_config(
        &mut self,
        commands: &[&str],
    ) -> impl Future<Output = Result<Vec<Response>>> + Send;

    /// Acquire a specific privilege level.
    fn acquire_privilege(&mut self, privilege: &str) -> impl Future<Output = Result<()>> + Send;

    /// Acquire the platform's default privilege level (enable mode on
    /// Cisco-style CLIs).
    fn acquire_default_privilege(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Check if the driver is connected.
    fn is_open(&self) -> bool;

    /// Get the current privilege level name.
    fn current_privilege(&self) -> Option<&str>;
}
