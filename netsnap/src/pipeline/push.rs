use std::path::PathBuf;

use log::{error, info, warn};

use super::OperationResult;
use crate::artifacts::ArtifactStore;
use crate::commands::CommandList;
use crate::error::Result;
use crate::inventory::Device;
use crate::session::{DeviceSession, SessionFactory};

/// Operator answer to "proceed?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

impl Confirmation {
    /// Only `yes` confirms, in any case. The line ending is not part of
    /// the answer; any other whitespace is.
    pub fn from_answer(answer: &str) -> Self {
        if answer
            .trim_end_matches(['\r', '\n'])
            .eq_ignore_ascii_case("yes")
        {
            Confirmation::Confirmed
        } else {
            Confirmation::Declined
        }
    }
}

/// Device output of a successful push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushOutput {
    /// Pre-change backup; `None` when it could not be taken.
    pub backup: Option<PathBuf>,
    pub config_output: String,
    pub save_output: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushRun {
    /// The operator declined; no device was contacted.
    Cancelled,
    Completed(Vec<OperationResult<PushOutput>>),
}

/// Applies one command list to every device, after a pre-change backup.
pub struct PushPipeline<F> {
    factory: F,
    store: ArtifactStore,
}

impl<F: SessionFactory> PushPipeline<F> {
    pub fn new(factory: F, store: ArtifactStore) -> Self {
        Self { factory, store }
    }

    pub async fn run(
        &self,
        devices: &[Device],
        commands: &CommandList,
        confirmation: Confirmation,
    ) -> PushRun {
        if confirmation == Confirmation::Declined {
            info!("Configuration cancelled by user");
            return PushRun::Cancelled;
        }

        let mut results = Vec::with_capacity(devices.len());
        for device in devices {
            results.push(self.push_device(device, commands).await);
        }
        PushRun::Completed(results)
    }

    pub async fn push_device(
        &self,
        device: &Device,
        commands: &CommandList,
    ) -> OperationResult<PushOutput> {
        info!("Processing device: {} ({} driver)", device.host, device.driver());

        // A failed pre-change backup does not block the push
        let backup = self.pre_change_backup(device).await;

        match self.apply(device, commands).await {
            Ok((config_output, save_output)) => {
                info!("Configuration applied to {}", device.host);
                OperationResult::success(
                    &device.host,
                    PushOutput {
                        backup,
                        config_output,
                        save_output,
                    },
                )
            }
            Err(e) => {
                error!(
                    "Failed to configure {}: {e} (pre-change backup: {})",
                    device.host,
                    backup
                        .as_ref()
                        .map_or_else(|| "none".to_string(), |p| p.display().to_string())
                );
                OperationResult::failed(&device.host, e.to_string())
            }
        }
    }

    async fn pre_change_backup(&self, device: &Device) -> Option<PathBuf> {
        match self.try_pre_change_backup(device).await {
            Ok(path) => {
                info!(
                    "Configuration of {} backed up to {}",
                    device.host,
                    path.display()
                );
                Some(path)
            }
            Err(e) => {
                warn!("Failed to backup configuration from {}: {e}", device.host);
                None
            }
        }
    }

    async fn try_pre_change_backup(&self, device: &Device) -> Result<PathBuf> {
        let command = device.driver().running_config_command();
        let mut session = self.factory.session(device)?;
        session.open().await?;

        let running = read_running(&mut session, command).await;
        if let Err(e) = session.disconnect().await {
            warn!("Failed to disconnect from {}: {e}", device.host);
        }
        let running = running?;

        let timestamp = self.store.timestamp();
        Ok(self
            .store
            .write_pre_change(&device.host, &timestamp, &running)?)
    }

    async fn apply(&self, device: &Device, commands: &CommandList) -> Result<(String, String)> {
        let mut session = self.factory.session(device)?;
        session.open().await?;

        let applied = apply_changes(&mut session, commands).await;
        if let Err(e) = session.disconnect().await {
            warn!("Failed to disconnect from {}: {e}", device.host);
        }
        applied
    }
}

async fn read_running<S: DeviceSession>(session: &mut S, command: &str) -> Result<String> {
    session.enable().await?;
    session.send_command(command).await
}

async fn apply_changes<S: DeviceSession>(
    session: &mut S,
    commands: &CommandList,
) -> Result<(String, String)> {
    session.enable().await?;
    let config_output = session.send_config_set(commands.as_slice()).await?;
    let save_output = session.save_config().await?;
    Ok((config_output, save_output))
}
