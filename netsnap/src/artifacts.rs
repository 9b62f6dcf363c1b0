//! Backup artifacts on the local filesystem.
//!
//! Layout under the backup root:
//!
//! ```text
//! backups/
//!   <host>/<host>_running_<ts>.cfg
//!   <host>/<host>_startup_<ts>.cfg      (when the device has one)
//!   <host>/<host>_facts_<ts>.json
//!   <host>/<host>_interfaces_<ts>.json
//!   <host>_<ts>.cfg                     (pre-change backups)
//! ```
//!
//! Every file is created write-once. A set whose writes do not all
//! succeed is removed again, so a timestamp either has a complete set or
//! nothing.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use log::{debug, warn};
use serde::Serialize;

use crate::error::ArtifactError;
use crate::session::{DeviceConfig, Facts, Interfaces};

/// Timestamp token shared by one backup set.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Source of the current local time.
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// Everything retrieved from one device for one backup.
#[derive(Debug, Clone)]
pub struct BackupData {
    pub config: DeviceConfig,
    pub facts: Facts,
    pub interfaces: Interfaces,
}

/// Paths of one persisted backup set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupArtifacts {
    pub timestamp: String,
    pub running: PathBuf,
    pub startup: Option<PathBuf>,
    pub facts: PathBuf,
    pub interfaces: PathBuf,
}

impl BackupArtifacts {
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        [Some(&self.running), self.startup.as_ref(), Some(&self.facts), Some(&self.interfaces)]
            .into_iter()
            .flatten()
            .map(PathBuf::as_path)
    }
}

/// Running-config comparison against the previous backup of a host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigDrift {
    NoPrevious,
    Unchanged { previous: PathBuf },
    Changed { previous: PathBuf },
}

impl fmt::Display for ConfigDrift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigDrift::NoPrevious => f.write_str("no previous backup"),
            ConfigDrift::Unchanged { .. } => f.write_str("unchanged"),
            ConfigDrift::Changed { .. } => f.write_str("changed"),
        }
    }
}

/// Writes backup artifacts under a root directory.
#[derive(Clone)]
pub struct ArtifactStore {
    root: PathBuf,
    clock: Clock,
}

impl fmt::Debug for ArtifactStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactStore")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl ArtifactStore {
    /// Store using the local wall clock.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_clock(root, Arc::new(|| Local::now().naive_local()))
    }

    pub fn with_clock(root: impl Into<PathBuf>, clock: Clock) -> Self {
        Self {
            root: root.into(),
            clock,
        }
    }

    /// Current timestamp token.
    pub fn timestamp(&self) -> String {
        (self.clock)().format(TIMESTAMP_FORMAT).to_string()
    }

    fn host_dir(&self, host: &str) -> PathBuf {
        self.root.join(host)
    }

    fn running_path(&self, host: &str, timestamp: &str) -> PathBuf {
        self.host_dir(host)
            .join(format!("{host}_running_{timestamp}.cfg"))
    }

    /// Persist a complete backup set under `timestamp`.
    pub fn write_backup(
        &self,
        host: &str,
        timestamp: &str,
        data: &BackupData,
    ) -> Result<BackupArtifacts, ArtifactError> {
        let dir = self.host_dir(host);
        create_dir(&dir)?;

        let facts = to_json("facts", &data.facts)?;
        let interfaces = to_json("interfaces", &data.interfaces)?;

        let mut set = ArtifactSet::default();
        let running = set.write(
            self.running_path(host, timestamp),
            data.config.running.as_bytes(),
        )?;
        let startup = match &data.config.startup {
            Some(text) => Some(set.write(
                dir.join(format!("{host}_startup_{timestamp}.cfg")),
                text.as_bytes(),
            )?),
            None => None,
        };
        let facts = set.write(dir.join(format!("{host}_facts_{timestamp}.json")), &facts)?;
        let interfaces = set.write(
            dir.join(format!("{host}_interfaces_{timestamp}.json")),
            &interfaces,
        )?;
        set.commit();

        Ok(BackupArtifacts {
            timestamp: timestamp.to_string(),
            running,
            startup,
            facts,
            interfaces,
        })
    }

    /// Persist a pre-change running-config snapshot.
    pub fn write_pre_change(
        &self,
        host: &str,
        timestamp: &str,
        running: &str,
    ) -> Result<PathBuf, ArtifactError> {
        create_dir(&self.root)?;
        let mut set = ArtifactSet::default();
        let path = set.write(
            self.root.join(format!("{host}_{timestamp}.cfg")),
            running.as_bytes(),
        )?;
        set.commit();
        Ok(path)
    }

    /// Compare the running config written for `timestamp` with the most
    /// recent earlier one of the same host.
    pub fn check_drift(&self, host: &str, timestamp: &str) -> Result<ConfigDrift, ArtifactError> {
        let current_path = self.running_path(host, timestamp);
        let Some(previous) = self.previous_running(host, timestamp)? else {
            return Ok(ConfigDrift::NoPrevious);
        };

        let current = read(&current_path)?;
        let before = read(&previous)?;
        debug!(
            "Comparing {} with {}",
            current_path.display(),
            previous.display()
        );

        Ok(if current == before {
            ConfigDrift::Unchanged { previous }
        } else {
            ConfigDrift::Changed { previous }
        })
    }

    fn previous_running(&self, host: &str, timestamp: &str) -> Result<Option<PathBuf>, ArtifactError> {
        let dir = self.host_dir(host);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(ArtifactError::Io { path: dir, source }),
        };

        let prefix = format!("{host}_running_");
        let mut latest: Option<(String, PathBuf)> = None;

        for entry in entries {
            let entry = entry.map_err(|source| ArtifactError::Io {
                path: dir.clone(),
                source,
            })?;
            let name = entry.file_name();
            let Some(token) = name
                .to_str()
                .and_then(|n| n.strip_prefix(&prefix))
                .and_then(|n| n.strip_suffix(".cfg"))
            else {
                continue;
            };

            // Tokens are fixed-width, so string order is time order
            if token < timestamp && latest.as_ref().is_none_or(|(best, _)| token > best.as_str()) {
                latest = Some((token.to_string(), entry.path()));
            }
        }

        Ok(latest.map(|(_, path)| path))
    }
}

/// Files written so far for one set; removed on drop unless committed.
#[derive(Default)]
struct ArtifactSet {
    written: Vec<PathBuf>,
    committed: bool,
}

impl ArtifactSet {
    fn write(&mut self, path: PathBuf, contents: &[u8]) -> Result<PathBuf, ArtifactError> {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|source| match source.kind() {
                io::ErrorKind::AlreadyExists => ArtifactError::AlreadyExists { path: path.clone() },
                _ => ArtifactError::Io {
                    path: path.clone(),
                    source,
                },
            })?;
        self.written.push(path.clone());

        file.write_all(contents)
            .and_then(|()| file.sync_all())
            .map_err(|source| ArtifactError::Io {
                path: path.clone(),
                source,
            })?;
        debug!("Wrote {}", path.display());
        Ok(path)
    }

    fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for ArtifactSet {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        for path in &self.written {
            if let Err(e) = fs::remove_file(path) {
                warn!("Failed to remove partial artifact {}: {e}", path.display());
            }
        }
    }
}

fn create_dir(path: &Path) -> Result<(), ArtifactError> {
    fs::create_dir_all(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read(path: &Path) -> Result<Vec<u8>, ArtifactError> {
    fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn to_json<T: Serialize>(what: &'static str, value: &T) -> Result<Vec<u8>, ArtifactError> {
    serde_json::to_vec_pretty(value).map_err(|source| ArtifactError::Serialize { what, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Interface;
    use chrono::NaiveDate;

    fn fixed_clock(h: u32, m: u32, s: u32) -> Clock {
        Arc::new(move || {
            NaiveDate::from_ymd_opt(2024, 3, 5)
                .and_then(|d| d.and_hms_opt(h, m, s))
                .unwrap()
        })
    }

    fn data(running: &str, startup: Option<&str>) -> BackupData {
        let mut interfaces = Interfaces::new();
        interfaces.insert(
            "Gi1".to_string(),
            Interface {
                is_up: true,
                is_enabled: true,
                ..Interface::default()
            },
        );
        BackupData {
            config: DeviceConfig {
                running: running.to_string(),
                startup: startup.map(str::to_string),
            },
            facts: Facts {
                hostname: Some("r1".to_string()),
                vendor: "Cisco".to_string(),
                interface_list: vec!["Gi1".to_string()],
                ..Facts::default()
            },
            interfaces,
        }
    }

    #[test]
    fn test_timestamp_format() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::with_clock(dir.path(), fixed_clock(9, 7, 3));
        assert_eq!(store.timestamp(), "20240305_090703");
    }

    #[test]
    fn test_backup_set_shares_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::with_clock(dir.path(), fixed_clock(10, 0, 0));
        let ts = store.timestamp();

        let artifacts = store
            .write_backup("10.0.0.1", &ts, &data("hostname r1\n", Some("hostname r1\n")))
            .unwrap();

        assert_eq!(
            artifacts.running,
            dir.path().join("10.0.0.1/10.0.0.1_running_20240305_100000.cfg")
        );
        assert_eq!(artifacts.paths().count(), 4);
        for path in artifacts.paths() {
            let name = path.file_name().unwrap().to_str().unwrap();
            assert!(name.contains("_20240305_100000."), "{name}");
            assert!(path.exists());
        }

        let facts: serde_json::Value =
            serde_json::from_slice(&fs::read(&artifacts.facts).unwrap()).unwrap();
        assert_eq!(facts["hostname"], "r1");
        assert_eq!(facts["interface_list"][0], "Gi1");
        let interfaces: serde_json::Value =
            serde_json::from_slice(&fs::read(&artifacts.interfaces).unwrap()).unwrap();
        assert_eq!(interfaces["Gi1"]["is_up"], true);
    }

    #[test]
    fn test_missing_startup_is_omitted() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::with_clock(dir.path(), fixed_clock(10, 0, 0));
        let artifacts = store
            .write_backup("r1", "20240305_100000", &data("x", None))
            .unwrap();
        assert!(artifacts.startup.is_none());
        assert_eq!(fs::read_dir(dir.path().join("r1")).unwrap().count(), 3);
    }

    #[test]
    fn test_collision_fails_and_keeps_original() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::with_clock(dir.path(), fixed_clock(10, 0, 0));
        store
            .write_backup("r1", "20240305_100000", &data("first", None))
            .unwrap();

        let err = store
            .write_backup("r1", "20240305_100000", &data("second", None))
            .unwrap_err();
        assert!(matches!(err, ArtifactError::AlreadyExists { .. }));

        let running = fs::read_to_string(dir.path().join("r1/r1_running_20240305_100000.cfg")).unwrap();
        assert_eq!(running, "first");
        assert_eq!(fs::read_dir(dir.path().join("r1")).unwrap().count(), 3);
    }

    #[test]
    fn test_partial_set_is_rolled_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::with_clock(dir.path(), fixed_clock(10, 0, 0));
        fs::create_dir_all(dir.path().join("r1")).unwrap();
        // Occupy the facts path so the third write fails
        fs::write(dir.path().join("r1/r1_facts_20240305_100000.json"), "{}").unwrap();

        let err = store
            .write_backup("r1", "20240305_100000", &data("cfg", Some("cfg")))
            .unwrap_err();
        assert!(matches!(err, ArtifactError::AlreadyExists { .. }));
        assert!(!dir.path().join("r1/r1_running_20240305_100000.cfg").exists());
        assert!(!dir.path().join("r1/r1_startup_20240305_100000.cfg").exists());
    }

    #[test]
    fn test_pre_change_path() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::with_clock(dir.path(), fixed_clock(10, 0, 0));
        let path = store.write_pre_change("r1", "20240305_100000", "hostname r1").unwrap();
        assert_eq!(path, dir.path().join("r1_20240305_100000.cfg"));
        assert_eq!(fs::read_to_string(path).unwrap(), "hostname r1");
    }

    #[test]
    fn test_drift_detection() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::with_clock(dir.path(), fixed_clock(10, 0, 0));

        store.write_backup("r1", "20240305_100000", &data("a", None)).unwrap();
        assert_eq!(store.check_drift("r1", "20240305_100000").unwrap(), ConfigDrift::NoPrevious);

        store.write_backup("r1", "20240305_110000", &data("a", None)).unwrap();
        let drift = store.check_drift("r1", "20240305_110000").unwrap();
        assert!(matches!(drift, ConfigDrift::Unchanged { .. }));

        store.write_backup("r1", "20240305_120000", &data("b", None)).unwrap();
        match store.check_drift("r1", "20240305_120000").unwrap() {
            ConfigDrift::Changed { previous } => {
                assert!(previous.ends_with("r1_running_20240305_110000.cfg"));
            }
            other => panic!("unexpected drift: {other}"),
        }
    }
}
