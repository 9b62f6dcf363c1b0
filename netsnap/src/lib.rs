//! # netsnap
//!
//! Configuration backup and push tools for network devices over SSH.
//!
//! Two binaries sit on top of this library:
//!
//! - `netsnap-backup` snapshots running/startup configuration, facts and
//!   interfaces of every inventory device into timestamped files.
//! - `netsnap-push` takes a pre-change backup and then applies a command
//!   file to every inventory device.
//!
//! Both walk the inventory sequentially and record a per-device
//! [`OperationResult`]; one device failing never stops the run.
//!
//! The device side is an async SSH CLI driver: a PTY shell over `russh`,
//! prompt detection with a tail-searching pattern buffer, and per-vendor
//! privilege graphs for Cisco IOS/IOS-XE, NX-OS, IOS-XR, Arista EOS and
//! Juniper JUNOS.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use netsnap::{ArtifactStore, BackupPipeline, SshSessionFactory, load_inventory};
//! use netsnap::session::SshOptions;
//!
//! # async fn example() -> Result<(), netsnap::Error> {
//! let devices = load_inventory(Path::new("config/devices.yml"))?;
//! let pipeline = BackupPipeline::new(
//!     SshSessionFactory::new(SshOptions::default()),
//!     ArtifactStore::new("backups"),
//! );
//!
//! for result in pipeline.run(&devices).await {
//!     println!("{}: {}", result.host, result.is_success());
//! }
//! # Ok(())
//! # }
//! ```

pub mod artifacts;
pub mod channel;
pub mod cli;
pub mod commands;
pub mod driver;
pub mod error;
pub mod inventory;
pub mod logging;
pub mod pipeline;
pub mod platform;
pub mod report;
pub mod resolver;
pub mod session;
pub mod settings;
pub mod transport;

// Re-export main types for convenience
pub use artifacts::ArtifactStore;
pub use commands::CommandList;
pub use driver::{Driver, DriverBuilder, GenericDriver, Response};
pub use error::Error;
pub use inventory::{Device, load_inventory};
pub use pipeline::{
    BackupPipeline, Confirmation, OperationResult, Outcome, PushPipeline, PushRun,
};
pub use platform::{PlatformDefinition, PrivilegeLevel};
pub use resolver::{DriverKind, resolve_driver};
pub use session::{DeviceSession, SessionFactory, SshSessionFactory};
pub use settings::Settings;
pub use transport::{AuthMethod, SshConfig};
