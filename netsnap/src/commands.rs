//! Configuration command lists.
//!
//! A command file holds one CLI command per line. Blank lines and lines
//! starting with `#` are skipped; everything else is sent to the device
//! verbatim (surrounding whitespace trimmed) and in file order.

use std::fs;
use std::io;
use std::path::Path;

use log::info;

use crate::error::CommandListError;

/// An ordered, non-empty list of configuration commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandList {
    commands: Vec<String>,
}

impl CommandList {
    /// Load commands from `path`. An unreadable file or one with no
    /// commands is an error.
    pub fn load(path: &Path) -> Result<Self, CommandListError> {
        let text = fs::read_to_string(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => CommandListError::NotFound {
                path: path.to_path_buf(),
            },
            _ => CommandListError::Read {
                path: path.to_path_buf(),
                source,
            },
        })?;

        let list = Self::parse(&text).ok_or_else(|| CommandListError::Empty {
            path: path.to_path_buf(),
        })?;
        info!("Loaded {} configuration commands", list.len());
        Ok(list)
    }

    /// Filter command text. Returns `None` when nothing is left.
    pub fn parse(text: &str) -> Option<Self> {
        let commands: Vec<String> = text
            .lines()
            .filter(|line| !line.starts_with('#'))
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        (!commands.is_empty()).then_some(Self { commands })
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.commands
    }
}
