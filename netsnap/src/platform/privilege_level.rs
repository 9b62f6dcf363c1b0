//! Privilege level definition.

use regex::bytes::Regex;

/// A privilege level on a network device.
///
/// Levels form a tree: each level names its parent (`previous_priv`) and
/// the commands that move between the two.
#[derive(Debug, Clone)]
pub struct PrivilegeLevel {
    /// Name of this level (e.g. "exec", "privilege_exec", "configuration").
    pub name: String,

    /// Regex matching the prompt at this level.
    pub pattern: Regex,

    /// Parent level name (None for the root level).
    pub previous_priv: Option<String>,

    /// Command that escalates TO this level from the parent.
    pub escalate_command: Option<String>,

    /// Command that de-escalates FROM this level to the parent.
    pub deescalate_command: Option<String>,

    /// Password prompt shown while escalating, if escalation may need a secret.
    pub escalate_prompt: Option<Regex>,

    /// Strings that must NOT appear in the prompt for this level to match.
    /// `#` ends both privileged and config prompts on Cisco-style CLIs.
    pub not_contains: Vec<String>,
}

impl PrivilegeLevel {
    /// Create a new privilege level with minimal required fields.
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            name: name.into(),
            pattern: Regex::new(pattern)?,
            previous_priv: None,
            escalate_command: None,
            deescalate_command: None,
            escalate_prompt: None,
            not_contains: vec![],
        })
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.previous_priv = Some(parent.into());
        self
    }

    pub fn with_escalate(mut self, command: impl Into<String>) -> Self {
        self.escalate_command = Some(command.into());
        self
    }

    pub fn with_deescalate(mut self, command: impl Into<String>) -> Self {
        self.deescalate_command = Some(command.into());
        self
    }

    /// Escalation may be answered with a password prompt matching `prompt_pattern`.
    pub fn with_auth(mut self, prompt_pattern: &str) -> Result<Self, regex::Error> {
        self.escalate_prompt = Some(Regex::new(prompt_pattern)?);
        Ok(self)
    }

    pub fn with_not_contains(mut self, pattern: impl Into<String>) -> Self {
        self.not_contains.push(pattern.into());
        self
    }

    /// Check if this privilege level matches a prompt.
    pub fn matches(&self, prompt: &str) -> bool {
        if self.not_contains.iter().any(|nc| prompt.contains(nc.as_str())) {
            return false;
        }
        self.pattern.is_match(prompt.as_bytes())
    }
}
