//! Sequential per-device orchestration.
//!
//! Both pipelines walk the inventory in order, one device at a time. A
//! device that fails is recorded as a [`Outcome::Failed`] and the run
//! moves on; nothing a single device does can abort the run.

mod backup;
mod push;
#[cfg(test)]
pub(crate) mod testing;

pub use backup::{BackupOutput, BackupPipeline};
pub use push::{Confirmation, PushOutput, PushPipeline, PushRun};

/// What happened to one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Success(T),
    Failed { error: String },
}

/// Per-device result of a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationResult<T> {
    pub host: String,
    pub outcome: Outcome<T>,
}

impl<T> OperationResult<T> {
    pub fn success(host: impl Into<String>, value: T) -> Self {
        Self {
            host: host.into(),
            outcome: Outcome::Success(value),
        }
    }

    pub fn failed(host: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            outcome: Outcome::Failed {
                error: error.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success(_))
    }

    pub fn value(&self) -> Option<&T> {
        match &self.outcome {
            Outcome::Success(value) => Some(value),
            Outcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Success(_) => None,
            Outcome::Failed { error } => Some(error),
        }
    }
}
