//! Platform definition for vendor-specific CLI conventions.

use indexmap::IndexMap;

use super::privilege_level::PrivilegeLevel;

/// Everything the generic driver needs to know about one CLI dialect.
#[derive(Debug, Clone)]
pub struct PlatformDefinition {
    /// Platform name (e.g. "cisco_iosxe", "juniper_junos").
    pub name: String,

    /// Privilege levels in the order they are tried against a prompt.
    pub privilege_levels: IndexMap<String, PrivilegeLevel>,

    /// Level that `enable()` targets: where operational commands run.
    pub default_privilege: String,

    /// Level in which configuration commands are entered.
    pub configuration_privilege: String,

    /// Line prefixes that mark a command as rejected. Matched after
    /// leading whitespace only, never mid-line.
    pub failed_when_contains: Vec<String>,

    /// Commands to run once the session is open (paging, width).
    pub on_open_commands: Vec<String>,

    /// Command that activates the candidate configuration, for platforms
    /// where configuration changes only take effect on commit.
    pub commit_command: Option<String>,

    /// Command that throws away uncommitted candidate changes.
    pub discard_command: Option<String>,

    /// Terminal width for PTY.
    pub terminal_width: u32,

    /// Terminal height for PTY.
    pub terminal_height: u32,
}

impl PlatformDefinition {
    /// Create a new platform definition with minimal required fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            privilege_levels: IndexMap::new(),
            default_privilege: String::new(),
            configuration_privilege: String::new(),
            failed_when_contains: vec![],
            on_open_commands: vec![],
            commit_command: None,
            discard_command: None,
            terminal_width: 511,
            terminal_height: 24,
        }
    }

    pub fn with_privilege(mut self, level: PrivilegeLevel) -> Self {
        self.privilege_levels.insert(level.name.clone(), level);
        self
    }

    pub fn with_default_privilege(mut self, name: impl Into<String>) -> Self {
        self.default_privilege = name.into();
        self
    }

    pub fn with_configuration_privilege(mut self, name: impl Into<String>) -> Self {
        self.configuration_privilege = name.into();
        self
    }

    pub fn with_failure_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.failed_when_contains.push(pattern.into());
        self
    }

    pub fn with_on_open_command(mut self, command: impl Into<String>) -> Self {
        self.on_open_commands.push(command.into());
        self
    }

    /// Mark the platform as commit-based.
    pub fn with_commit(mut self, commit: impl Into<String>, discard: impl Into<String>) -> Self {
        self.commit_command = Some(commit.into());
        self.discard_command = Some(discard.into());
        self
    }

    pub fn with_terminal_size(mut self, width: u32, height: u32) -> Self {
        self.terminal_width = width;
        self.terminal_height = height;
        self
    }

    /// Get a privilege level by name.
    pub fn get_privilege(&self, name: &str) -> Option<&PrivilegeLevel> {
        self.privilege_levels.get(name)
    }

    /// Check that the named default and configuration levels exist.
    pub fn validate(&self) -> Result<(), String> {
        for name in [&self.default_privilege, &self.configuration_privilege] {
            if !self.privilege_levels.contains_key(name.as_str()) {
                return Err(format!(
                    "platform '{}' has no privilege level '{}'",
                    self.name, name
                ));
            }
        }
        Ok(())
    }
}
