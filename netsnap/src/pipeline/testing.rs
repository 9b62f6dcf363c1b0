//! Scripted in-memory sessions for pipeline tests.

use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use crate::artifacts::ArtifactStore;
use crate::error::{DriverError, Error, Result, TransportError};
use crate::inventory::Device;
use crate::session::{DeviceConfig, DeviceSession, Facts, Interface, Interfaces, SessionFactory};

/// Store whose clock is pinned to 2024-03-05 10:00:00.
pub fn fixed_store(root: &Path) -> ArtifactStore {
    ArtifactStore::with_clock(
        root,
        Arc::new(|| {
            NaiveDate::from_ymd_opt(2024, 3, 5)
                .and_then(|d| d.and_hms_opt(10, 0, 0))
                .unwrap()
        }),
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Open,
    Close,
    GetFacts,
    GetConfig,
    GetInterfaces,
    Enable,
    SendConfigSet(Vec<String>),
    SaveConfig,
    SendCommand(String),
}

/// How one scripted device behaves.
#[derive(Debug, Clone)]
pub struct DeviceScript {
    pub refuse_connection: bool,
    /// Operation names that return an error.
    pub fail_on: &'static [&'static str],
    pub running: String,
    pub startup: Option<String>,
}

impl Default for DeviceScript {
    fn default() -> Self {
        Self {
            refuse_connection: false,
            fail_on: &[],
            running: "hostname mock\n!\nend\n".to_string(),
            startup: None,
        }
    }
}

impl DeviceScript {
    pub fn refusing() -> Self {
        Self {
            refuse_connection: true,
            ..Self::default()
        }
    }
}

type CallLog = Arc<Mutex<Vec<(String, Call)>>>;

#[derive(Clone, Default)]
pub struct MockFactory {
    scripts: HashMap<String, DeviceScript>,
    log: CallLog,
    created: Arc<Mutex<usize>>,
}

impl MockFactory {
    pub fn script(mut self, host: &str, script: DeviceScript) -> Self {
        self.scripts.insert(host.to_string(), script);
        self
    }

    /// Calls made on sessions of `host`, in order.
    pub fn calls(&self, host: &str) -> Vec<Call> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|(h, _)| h == host)
            .map(|(_, call)| call.clone())
            .collect()
    }

    pub fn sessions_created(&self) -> usize {
        *self.created.lock().unwrap()
    }
}

impl SessionFactory for MockFactory {
    type Session = MockSession;

    fn session(&self, device: &Device) -> Result<MockSession> {
        *self.created.lock().unwrap() += 1;
        Ok(MockSession {
            host: device.host.clone(),
            script: self.scripts.get(&device.host).cloned().unwrap_or_default(),
            log: Arc::clone(&self.log),
        })
    }
}

pub struct MockSession {
    host: String,
    script: DeviceScript,
    log: CallLog,
}

impl MockSession {
    fn record(&self, name: &'static str, call: Call) -> Result<()> {
        self.log.lock().unwrap().push((self.host.clone(), call));
        if self.script.fail_on.contains(&name) {
            return Err(DriverError::CommandFailed {
                message: format!("{name} failed"),
            }
            .into());
        }
        Ok(())
    }
}

impl DeviceSession for MockSession {
    async fn open(&mut self) -> Result<()> {
        if self.script.refuse_connection {
            return Err(Error::Transport(TransportError::ConnectionFailed {
                host: self.host.clone(),
                port: 22,
                source: io::Error::new(io::ErrorKind::ConnectionRefused, "Connection refused"),
            }));
        }
        self.record("open", Call::Open)
    }

    async fn close(&mut self) -> Result<()> {
        self.record("close", Call::Close)
    }

    async fn get_facts(&mut self) -> Result<Facts> {
        self.record("get_facts", Call::GetFacts)?;
        Ok(Facts {
            hostname: Some(self.host.clone()),
            vendor: "Cisco".to_string(),
            ..Facts::default()
        })
    }

    async fn get_config(&mut self) -> Result<DeviceConfig> {
        self.record("get_config", Call::GetConfig)?;
        Ok(DeviceConfig {
            running: self.script.running.clone(),
            startup: self.script.startup.clone(),
        })
    }

    async fn get_interfaces(&mut self) -> Result<Interfaces> {
        self.record("get_interfaces", Call::GetInterfaces)?;
        let mut interfaces = Interfaces::new();
        interfaces.insert("Gi1".to_string(), Interface::default());
        interfaces.insert("Gi2".to_string(), Interface::default());
        Ok(interfaces)
    }

    async fn enable(&mut self) -> Result<()> {
        self.record("enable", Call::Enable)
    }

    async fn send_config_set(&mut self, commands: &[String]) -> Result<String> {
        self.record("send_config_set", Call::SendConfigSet(commands.to_vec()))?;
        Ok(commands.join("\n"))
    }

    async fn save_config(&mut self) -> Result<String> {
        self.record("save_config", Call::SaveConfig)?;
        Ok("[OK]".to_string())
    }

    async fn send_command(&mut self, command: &str) -> Result<String> {
        self.record("send_command", Call::SendCommand(command.to_string()))?;
        Ok(self.script.running.clone())
    }
}
