//! Generic driver implementation that works with any platform.

use std::time::Duration;

use log::{debug, warn};
use regex::bytes::Regex;
use secrecy::{ExposeSecret, SecretString};

use super::Driver;
use super::privilege::PrivilegeManager;
use super::response::Response;
use crate::channel::{PtyConfig, Shell, SshShell};
use crate::error::{ChannelError, DriverError, Result};
use crate::platform::PlatformDefinition;
use crate::transport::config::{AuthMethod, SshConfig};

/// Generic driver that works with any platform definition.
///
/// Handles:
/// - Shell lifetime (an SSH PTY unless another [`Shell`] is chosen)
/// - Command execution with prompt detection
/// - Privilege level navigation, including the enable-password prompt
/// - Configuration sets, with commit/discard on commit-based platforms
pub struct GenericDriver<S: Shell = SshShell> {
    ssh_config: SshConfig,

    platform: PlatformDefinition,

    /// Enable secret; falls back to the login password.
    secret: Option<SecretString>,

    /// Live shell (None when disconnected).
    connection: Option<S>,

    privilege_manager: PrivilegeManager,

    /// Default timeout for reads.
    timeout: Duration,

    /// Combined prompt pattern for all privilege levels.
    prompt_pattern: Regex,
}

impl<S: Shell> GenericDriver<S> {
    /// Create a new generic driver. Does not connect.
    pub fn new(
        ssh_config: SshConfig,
        platform: PlatformDefinition,
        secret: Option<SecretString>,
    ) -> Self {
        let timeout = ssh_config.timeout;
        let privilege_manager = PrivilegeManager::new(platform.privilege_levels.clone());
        let prompt_pattern = combined_prompt_pattern(&platform);

        Self {
            ssh_config,
            platform,
            secret,
            connection: None,
            privilege_manager,
            timeout,
            prompt_pattern,
        }
    }

    /// Host this driver connects to.
    pub fn host(&self) -> &str {
        &self.ssh_config.host
    }

    /// Get a reference to the platform definition.
    pub fn platform(&self) -> &PlatformDefinition {
        &self.platform
    }

    fn shell(&mut self) -> Result<&mut S> {
        Ok(self.connection.as_mut().ok_or(DriverError::NotConnected)?)
    }

    async fn read_until_prompt(&mut self) -> Result<String> {
        let shell = self.connection.as_mut().ok_or(DriverError::NotConnected)?;
        let data = shell.read_until(&self.prompt_pattern, self.timeout).await?;
        Ok(String::from_utf8_lossy(&data).into_owned())
    }

    /// Update the tracked privilege level from a prompt line.
    fn update_privilege(&mut self, prompt: &str) -> Option<String> {
        let name = self
            .privilege_manager
            .determine_from_prompt(prompt)
            .ok()?
            .name
            .clone();
        let _ = self.privilege_manager.set_current(&name);
        Some(name)
    }

    fn escalation_secret(&self) -> Option<&str> {
        match (&self.secret, &self.ssh_config.auth) {
            (Some(secret), _) => Some(secret.expose_secret()),
            (None, AuthMethod::Password(password)) => Some(password.expose_secret()),
            _ => None,
        }
    }

    /// Take over a connected shell: read the first prompt and run the
    /// on-open commands. The shell is closed again if that fails.
    async fn attach(&mut self, shell: S) -> Result<()> {
        self.connection = Some(shell);
        if let Err(e) = self.initialize().await {
            if let Some(shell) = self.connection.take() {
                let _ = shell.close().await;
            }
            return Err(e);
        }
        Ok(())
    }

    async fn initialize(&mut self) -> Result<()> {
        let banner = self.read_until_prompt().await?;
        let prompt = last_line(&banner);
        match self.update_privilege(&prompt) {
            Some(level) => debug!("{}: initial privilege '{}'", self.host(), level),
            None => warn!("{}: unrecognised initial prompt {:?}", self.host(), prompt),
        }

        for cmd in self.platform.on_open_commands.clone() {
            let response = self.send_command(&cmd).await?;
            if let Some(marker) = response.failure_message {
                warn!("{}: on-open command '{}' rejected: {}", self.host(), cmd, marker);
            }
        }

        Ok(())
    }

    /// Move one step along the privilege graph.
    async fn transition(&mut self, from: &str, to: &str) -> Result<()> {
        let transition = self
            .privilege_manager
            .get_transition(from, to)
            .ok_or_else(|| DriverError::NoPrivilegePath {
                from: from.to_string(),
                to: to.to_string(),
            })?;

        debug!("{}: {} -> {} via '{}'", self.host(), from, to, transition.command);

        let output = match transition.auth_prompt {
            Some(auth_prompt) => {
                let either = Regex::new(&format!(
                    "(?:{})|(?:{})",
                    auth_prompt.as_str(),
                    self.prompt_pattern.as_str()
                ))
                .map_err(ChannelError::InvalidPattern)?;

                let timeout = self.timeout;
                let shell = self.shell()?;
                shell.send(&transition.command).await?;
                let data = shell.read_until(&either, timeout).await?;
                let output = String::from_utf8_lossy(&data).into_owned();

                if auth_prompt.is_match(last_line(&output).as_bytes()) {
                    let secret = self
                        .escalation_secret()
                        .ok_or_else(|| DriverError::InvalidConfig {
                            message: format!("no secret available to acquire '{}'", to),
                        })?
                        .to_string();
                    self.shell()?.send(&secret).await?;
                    self.read_until_prompt().await?
                } else {
                    output
                }
            }
            None => {
                self.shell()?.send(&transition.command).await?;
                self.read_until_prompt().await?
            }
        };

        match self.update_privilege(&last_line(&output)) {
            Some(level) if level == to => Ok(()),
            _ => Err(DriverError::PrivilegeAcquisitionFailed {
                target: to.to_string(),
            }
            .into()),
        }
    }

    /// Leave configuration mode after a rejected command, discarding the
    /// candidate on commit-based platforms.
    async fn abandon_config(&mut self, original: &str) {
        if let Some(discard) = self.platform.discard_command.clone() {
            if let Err(e) = self.send_command(&discard).await {
                warn!("{}: '{}' failed: {}", self.host(), discard, e);
            }
        }
        if let Err(e) = self.acquire_privilege(original).await {
            warn!("{}: could not return to '{}': {}", self.host(), original, e);
        }
    }
}

impl<S: Shell> Driver for GenericDriver<S> {
    async fn open(&mut self) -> Result<()> {
        if self.connection.is_some() {
            return Err(DriverError::AlreadyConnected.into());
        }

        let shell = S::connect(&self.ssh_config, PtyConfig::default()).await?;
        self.attach(shell).await
    }

    async fn close(&mut self) -> Result<()> {
        match self.connection.take() {
            Some(shell) => {
                debug!("{}: closing session", self.host());
                shell.close().await
            }
            None => Ok(()),
        }
    }

    async fn send_command(&mut self, command: &str) -> Result<Response> {
        self.shell()?.send(command).await?;
        let raw_result = self.read_until_prompt().await?;
        self.update_privilege(&last_line(&raw_result));

        let result = normalize_output(&raw_result, command);
        debug!("{}: '{}' returned {} bytes", self.host(), command, result.len());

        let failure =
            find_failure(&self.platform.failed_when_contains, &result).map(str::to_string);
        let response = Response::new(result, raw_result);
        match failure {
            Some(marker) => Ok(response.with_failure(marker)),
            None => Ok(response),
        }
    }

    async fn send_config(&mut self, commands: &[&str]) -> Result<Vec<Response>> {
        let original = self
            .current_privilege()
            .unwrap_or(self.platform.default_privilege.as_str())
            .to_string();
        let config_level = self.platform.configuration_privilege.clone();

        self.acquire_privilege(&config_level).await?;

        let commit = self.platform.commit_command.clone();
        let mut responses = Vec::with_capacity(commands.len() + 1);

        for cmd in commands.iter().copied().chain(commit.as_deref()) {
            let response = self.send_command(cmd).await?;
            if let Some(marker) = &response.failure_message {
                let message = format!("'{}' rejected ({}): {}", cmd, marker, response.result.trim());
                self.abandon_config(&original).await;
                return Err(DriverError::CommandFailed { message }.into());
            }
            responses.push(response);
        }

        self.acquire_privilege(&original).await?;
        Ok(responses)
    }

    async fn acquire_privilege(&mut self, target: &str) -> Result<()> {
        if self.connection.is_none() {
            return Err(DriverError::NotConnected.into());
        }

        if self.current_privilege().is_none() {
            // Prompt was not recognised yet; ask for a fresh one
            self.send_command("").await?;
        }

        let current = self
            .current_privilege()
            .map(str::to_string)
            .unwrap_or_default();

        if current == target {
            return Ok(());
        }

        let path = self.privilege_manager.find_path(&current, target)?;
        for step in path.windows(2) {
            self.transition(&step[0], &step[1]).await?;
        }

        Ok(())
    }

    async fn acquire_default_privilege(&mut self) -> Result<()> {
        let target = self.platform.default_privilege.clone();
        self.acquire_privilege(&target).await
    }

    fn is_open(&self) -> bool {
        self.connection.is_some()
    }

    fn current_privilege(&self) -> Option<&str> {
        self.privilege_manager.current().map(|l| l.name.as_str())
    }
}

/// Build a combined regex pattern that matches any privilege level's prompt.
fn combined_prompt_pattern(platform: &PlatformDefinition) -> Regex {
    let patterns: Vec<String> = platform
        .privilege_levels
        .values()
        .map(|level| format!("(?:{})", level.pattern.as_str()))
        .collect();

    let combined = patterns.join("|");
    Regex::new(&combined).unwrap_or_else(|_| Regex::new(r"[$#>]\s*$").unwrap())
}

/// First failure marker that starts a line of `output`.
fn find_failure<'a>(markers: &'a [String], output: &str) -> Option<&'a str> {
    output.lines().map(str::trim_start).find_map(|line| {
        markers
            .iter()
            .find(|marker| line.starts_with(marker.as_str()))
            .map(String::as_str)
    })
}

/// Last non-empty line of `output`, trimmed. This is where the prompt sits.
fn last_line(output: &str) -> String {
    output
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// Lines JUNOS prints above its prompt: `[edit ...]`, `{master:0}`.
fn is_prompt_banner(line: &str) -> bool {
    let line = line.trim();
    (line.starts_with('{') && (line.ends_with('}') || line.ends_with(']')))
        || (line.starts_with("[edit") && line.ends_with(']'))
}

/// Strip the command echo and the trailing prompt from raw shell output.
pub fn normalize_output(raw: &str, command: &str) -> String {
    let text = raw.replace("\r\n", "\n").replace('\r', "");
    let mut lines: Vec<&str> = text.lines().collect();

    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }
    lines.pop();
    while lines.last().is_some_and(|line| is_prompt_banner(line)) {
        lines.pop();
    }

    let command = command.trim();
    if !command.is_empty()
        && lines
            .first()
            .is_some_and(|line| line.trim_end().ends_with(command))
    {
        lines.remove(0);
    }

    lines.join("\n").trim_end().to_string()
}
