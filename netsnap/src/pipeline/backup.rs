use log::{error, info, warn};

use super::OperationResult;
use crate::artifacts::{ArtifactStore, BackupArtifacts, BackupData, ConfigDrift};
use crate::error::Result;
use crate::inventory::Device;
use crate::session::{DeviceSession, SessionFactory};

/// A persisted backup set and how it compares to the previous one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupOutput {
    pub artifacts: BackupArtifacts,
    /// `None` when the comparison itself failed.
    pub drift: Option<ConfigDrift>,
}

/// Snapshots facts, configuration and interfaces of every device.
pub struct BackupPipeline<F> {
    factory: F,
    store: ArtifactStore,
}

impl<F: SessionFactory> BackupPipeline<F> {
    pub fn new(factory: F, store: ArtifactStore) -> Self {
        Self { factory, store }
    }

    /// Back up `devices` in order. One result per device, same order.
    pub async fn run(&self, devices: &[Device]) -> Vec<OperationResult<BackupOutput>> {
        let mut results = Vec::with_capacity(devices.len());
        for device in devices {
            results.push(self.backup_device(device).await);
        }
        results
    }

    pub async fn backup_device(&self, device: &Device) -> OperationResult<BackupOutput> {
        info!(
            "Starting backup for {} ({} driver)",
            device.host,
            device.driver()
        );

        match self.try_backup(device).await {
            Ok(output) => {
                info!(
                    "Backup of {} completed: {}",
                    device.host,
                    output.artifacts.running.display()
                );
                OperationResult::success(&device.host, output)
            }
            Err(e) => {
                error!("Failed to backup {}: {e}", device.host);
                OperationResult::failed(&device.host, e.to_string())
            }
        }
    }

    async fn try_backup(&self, device: &Device) -> Result<BackupOutput> {
        let mut session = self.factory.session(device)?;
        session.open().await?;

        let gathered = gather(&mut session).await;
        if let Err(e) = session.close().await {
            warn!("Failed to close session to {}: {e}", device.host);
        }
        let data = gathered?;

        let timestamp = self.store.timestamp();
        let artifacts = self.store.write_backup(&device.host, &timestamp, &data)?;

        let drift = match self.store.check_drift(&device.host, &timestamp) {
            Ok(drift) => {
                match &drift {
                    ConfigDrift::Changed { previous } => warn!(
                        "Running configuration of {} changed since {}",
                        device.host,
                        previous.display()
                    ),
                    _ => info!("Running configuration of {}: {drift}", device.host),
                }
                Some(drift)
            }
            Err(e) => {
                warn!("Drift check failed for {}: {e}", device.host);
                None
            }
        };

        Ok(BackupOutput { artifacts, drift })
    }
}

/// Retrieve everything before anything is written.
async fn gather<S: DeviceSession>(session: &mut S) -> Result<BackupData> {
    let mut facts = session.get_facts().await?;
    let config = session.get_config().await?;
    let interfaces = session.get_interfaces().await?;
    facts.interface_list = interfaces.keys().cloned().collect();
    Ok(BackupData {
        config,
        facts,
        interfaces,
    })
}
