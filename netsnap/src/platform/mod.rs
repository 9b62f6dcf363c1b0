//! Platform definitions for multi-vendor support.
//!
//! Each supported driver family has a platform definition with its
//! prompt patterns, privilege graph and CLI conventions.

mod definition;
mod privilege_level;
pub mod vendors;

pub use definition::PlatformDefinition;
pub use privilege_level::PrivilegeLevel;
