//! Channel layer for pattern matching and PTY operations.
//!
//! This module handles the interactive shell session, including
//! pattern-based prompt detection and ANSI stripping.

mod buffer;
mod pty;
mod shell;

pub use buffer::PatternBuffer;
pub use pty::{PtyChannel, PtyConfig};
pub use shell::{Shell, SshShell};
