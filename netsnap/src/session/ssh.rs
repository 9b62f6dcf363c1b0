//! [`DeviceSession`] over the SSH driver.

use std::path::PathBuf;
use std::time::Duration;

use log::debug;
use secrecy::{ExposeSecret, SecretString};

use super::getters::{parse_facts, parse_interfaces};
use super::{DeviceConfig, DeviceSession, Facts, Interfaces, SessionFactory};
use crate::driver::{Driver, DriverBuilder, GenericDriver, Response};
use crate::error::{DriverError, Result};
use crate::inventory::Device;
use crate::resolver::DriverKind;
use crate::transport::HostKeyVerification;

/// Connection options shared by every session of a run.
#[derive(Debug, Clone)]
pub struct SshOptions {
    /// Port used when the device entry has none.
    pub port: u16,
    pub timeout: Duration,
    pub host_key_verification: HostKeyVerification,
    pub known_hosts_path: Option<PathBuf>,
}

impl Default for SshOptions {
    fn default() -> Self {
        Self {
            port: 22,
            timeout: Duration::from_secs(30),
            host_key_verification: HostKeyVerification::default(),
            known_hosts_path: None,
        }
    }
}

/// Creates [`SshSession`]s from inventory entries.
#[derive(Debug, Clone, Default)]
pub struct SshSessionFactory {
    options: SshOptions,
}

impl SshSessionFactory {
    pub fn new(options: SshOptions) -> Self {
        Self { options }
    }
}

impl SessionFactory for SshSessionFactory {
    type Session = SshSession;

    fn session(&self, device: &Device) -> Result<SshSession> {
        let kind = device.driver();
        let secret = device.secret.as_ref().unwrap_or(&device.password);

        let mut builder = DriverBuilder::new(device.host.clone())
            .port(device.port.unwrap_or(self.options.port))
            .username(device.username.clone())
            .password_secret(copy_secret(&device.password))
            .secret(copy_secret(secret))
            .platform(kind.platform())
            .timeout(self.options.timeout)
            .host_key_verification(self.options.host_key_verification);
        if let Some(path) = &self.options.known_hosts_path {
            builder = builder.known_hosts_path(path.clone());
        }

        Ok(SshSession::new(builder.build()?, kind, device.host.clone()))
    }
}

/// First lines a device prints instead of a startup configuration.
const STARTUP_ABSENT: &[&str] = &[
    "startup-config is not present",
    "non-volatile configuration memory is not present",
];

fn startup_is_absent(output: &str) -> bool {
    let Some(first) = output.lines().map(str::trim).find(|l| !l.is_empty()) else {
        return true;
    };
    let first = first.trim_start_matches(['%', ' ']).to_ascii_lowercase();
    STARTUP_ABSENT.iter().any(|message| first.starts_with(message))
}

fn copy_secret(secret: &SecretString) -> SecretString {
    SecretString::from(secret.expose_secret().to_owned())
}

/// A device session driven by a [`Driver`].
pub struct SshSession<D: Driver = GenericDriver> {
    driver: D,
    kind: DriverKind,
    host: String,
}

impl<D: Driver> SshSession<D> {
    pub fn new(driver: D, kind: DriverKind, host: impl Into<String>) -> Self {
        Self {
            driver,
            kind,
            host: host.into(),
        }
    }

    pub fn kind(&self) -> DriverKind {
        self.kind
    }

    /// Run a command; a response carrying a failure marker is an error.
    async fn run(&mut self, command: &str) -> Result<Response> {
        let response = self.driver.send_command(command).await?;
        match &response.failure_message {
            Some(marker) => Err(DriverError::CommandFailed {
                message: format!("'{command}' rejected by {}: {marker}", self.host),
            }
            .into()),
            None => Ok(response),
        }
    }
}

impl<D: Driver> DeviceSession for SshSession<D> {
    async fn open(&mut self) -> Result<()> {
        debug!("Opening {} session to {}", self.kind, self.host);
        self.driver.open().await
    }

    async fn close(&mut self) -> Result<()> {
        self.driver.close().await
    }

    async fn get_facts(&mut self) -> Result<Facts> {
        let mut output = String::new();
        for command in self.kind.facts_commands() {
            output.push_str(&self.run(command).await?.result);
            output.push('\n');
        }

        Ok(parse_facts(self.kind, &output))
    }

    async fn get_config(&mut self) -> Result<DeviceConfig> {
        let running = self.run(self.kind.running_config_command()).await?.result;

        let startup = match self.kind.startup_config_command() {
            Some(command) => {
                let response = self.driver.send_command(command).await?;
                if !response.is_success() || startup_is_absent(&response.result) {
                    debug!("{} has no startup configuration", self.host);
                    None
                } else {
                    Some(response.result)
                }
            }
            None => None,
        };

        Ok(DeviceConfig { running, startup })
    }

    async fn get_interfaces(&mut self) -> Result<Interfaces> {
        let output = self.run(self.kind.interfaces_command()).await?.result;
        Ok(parse_interfaces(self.kind, &output))
    }

    async fn enable(&mut self) -> Result<()> {
        self.driver.acquire_default_privilege().await
    }

    async fn send_config_set(&mut self, commands: &[String]) -> Result<String> {
        let commands: Vec<&str> = commands.iter().map(String::as_str).collect();
        let responses = self.driver.send_config(&commands).await?;
        Ok(responses
            .iter()
            .map(|r| r.raw_result.trim_end())
            .collect::<Vec<_>>()
            .join("\n"))
    }

    async fn save_config(&mut self) -> Result<String> {
        match self.kind.save_command() {
            Some(command) => Ok(self.run(command).await?.raw_result),
            None => Ok("configuration committed".to_string()),
        }
    }

    async fn send_command(&mut self, command: &str) -> Result<String> {
        Ok(self.run(command).await?.result)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    /// Driver that answers commands from a fixed table.
    #[derive(Default)]
    struct ScriptedDriver {
        outputs: HashMap<String, Response>,
        open: bool,
        config_batches: Vec<Vec<String>>,
        privilege_requests: usize,
    }

    impl ScriptedDriver {
        fn answer(mut self, command: &str, output: &str) -> Self {
            self.outputs.insert(
                command.to_string(),
                Response::new(output, format!("{command}\n{output}\nr1#")),
            );
            self
        }

        fn reject(mut self, command: &str, marker: &str) -> Self {
            self.outputs.insert(
                command.to_string(),
                Response::new(marker, marker).with_failure(marker),
            );
            self
        }
    }

    impl Driver for ScriptedDriver {
        async fn open(&mut self) -> Result<()> {
            self.open = true;
            Ok(())
        }

        async fn close(&mut self) -> Result<()> {
            self.open = false;
            Ok(())
        }

        async fn send_command(&mut self, command: &str) -> Result<Response> {
            Ok(self
                .outputs
                .get(command)
                .cloned()
                .unwrap_or_else(|| Response::new("", "r1#")))
        }

        async fn send_config(&mut self, commands: &[&str]) -> Result<Vec<Response>> {
            self.config_batches
                .push(commands.iter().map(|c| c.to_string()).collect());
            Ok(commands
                .iter()
                .map(|c| Response::new("", format!("{c}\n")))
                .collect())
        }

        async fn acquire_privilege(&mut self, _privilege: &str) -> Result<()> {
            self.privilege_requests += 1;
            Ok(())
        }

        async fn acquire_default_privilege(&mut self) -> Result<()> {
            self.privilege_requests += 1;
            Ok(())
        }

        fn is_open(&self) -> bool {
            self.open
        }

        fn current_privilege(&self) -> Option<&str> {
            None
        }
    }

    #[tokio::test]
    async fn test_get_config_with_startup() {
        let driver = ScriptedDriver::default()
            .answer("show running-config", "hostname r1\n")
            .answer("show startup-config", "hostname r1-old\n");
        let mut session = SshSession::new(driver, DriverKind::Ios, "r1");

        let config = session.get_config().await.unwrap();
        assert_eq!(config.running, "hostname r1\n");
        assert_eq!(config.startup.as_deref(), Some("hostname r1-old\n"));
    }

    #[tokio::test]
    async fn test_absent_startup_config_is_none() {
        let driver = ScriptedDriver::default()
            .answer("show running-config", "hostname r1\n")
            .answer("show startup-config", "startup-config is not present");
        let mut session = SshSession::new(driver, DriverKind::Ios, "r1");
        assert!(session.get_config().await.unwrap().startup.is_none());

        let driver = ScriptedDriver::default()
            .answer("show running-config", "hostname r1\n")
            .reject("show startup-config", "% Invalid input");
        let mut session = SshSession::new(driver, DriverKind::Eos, "r1");
        assert!(session.get_config().await.unwrap().startup.is_none());
    }

    #[tokio::test]
    async fn test_absence_phrase_inside_startup_config_is_kept() {
        let startup = "hostname r1\ninterface Gi2\n description backup link not present at site B\n";
        let driver = ScriptedDriver::default()
            .answer("show running-config", "hostname r1\n")
            .answer("show startup-config", startup);
        let mut session = SshSession::new(driver, DriverKind::Ios, "r1");
        assert_eq!(session.get_config().await.unwrap().startup.as_deref(), Some(startup));
    }

    #[test]
    fn test_startup_absence_messages() {
        assert!(startup_is_absent(""));
        assert!(startup_is_absent("\n  \n"));
        assert!(startup_is_absent("\nstartup-config is not present\n"));
        assert!(startup_is_absent("%% Non-volatile configuration memory is not present"));
        assert!(!startup_is_absent("! startup-config is not present\nhostname r1\n"));
        assert!(!startup_is_absent("version 15.2\n! startup-config is not present\n"));
    }

    #[tokio::test]
    async fn test_commit_platform_skips_startup() {
        let driver = ScriptedDriver::default()
            .answer("show configuration", "system { host-name mx1; }")
            .answer("show startup-config", "should not be read");
        let mut session = SshSession::new(driver, DriverKind::Junos, "mx1");
        let config = session.get_config().await.unwrap();
        assert_eq!(config.running, "system { host-name mx1; }");
        assert!(config.startup.is_none());

        assert_eq!(session.save_config().await.unwrap(), "configuration committed");
    }

    #[tokio::test]
    async fn test_rejected_running_config_is_error() {
        let driver = ScriptedDriver::default().reject("show running-config", "% Authorization failed");
        let mut session = SshSession::new(driver, DriverKind::Ios, "r1");
        let err = session.get_config().await.unwrap_err();
        assert!(err.to_string().contains("Authorization failed"));
    }

    #[tokio::test]
    async fn test_facts_from_version_output() {
        let driver = ScriptedDriver::default()
            .answer("show version", "r1 uptime is 1 hour\nProcessor board ID ABC123\n");
        let mut session = SshSession::new(driver, DriverKind::Ios, "r1");

        let facts = session.get_facts().await.unwrap();
        assert_eq!(facts.hostname.as_deref(), Some("r1"));
        assert_eq!(facts.serial_number.as_deref(), Some("ABC123"));
        assert!(facts.interface_list.is_empty());
    }

    #[tokio::test]
    async fn test_config_set_is_one_batch() {
        let mut session = SshSession::new(ScriptedDriver::default(), DriverKind::Ios, "r1");
        let commands = vec!["vlan 100".to_string(), "name USERS".to_string()];

        let output = session.send_config_set(&commands).await.unwrap();
        assert_eq!(output, "vlan 100\nname USERS");
        assert_eq!(session.driver.config_batches, vec![commands]);
    }

    #[tokio::test]
    async fn test_enable_and_save() {
        let driver = ScriptedDriver::default().answer("write memory", "Building configuration...\n[OK]");
        let mut session = SshSession::new(driver, DriverKind::Ios, "r1");

        session.open().await.unwrap();
        session.enable().await.unwrap();
        assert_eq!(session.driver.privilege_requests, 1);
        assert!(session.save_config().await.unwrap().contains("[OK]"));
        session.disconnect().await.unwrap();
        assert!(!session.driver.is_open());
    }

    #[test]
    fn test_factory_builds_unopened_session() {
        let factory = SshSessionFactory::default();
        let device = Device::new("10.0.0.9", "admin", "pw")
            .with_device_type("arista_eos")
            .with_port(2222);
        let session = factory.session(&device).unwrap();
        assert_eq!(session.kind(), DriverKind::Eos);
        assert!(!session.driver.is_open());
    }
}
