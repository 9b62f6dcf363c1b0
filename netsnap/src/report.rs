//! End-of-run summaries.

use std::fmt::Write;

use crate::pipeline::{BackupOutput, OperationResult, Outcome, PushOutput};

/// One-line description of a successful device outcome.
pub trait SuccessDetail {
    fn detail(&self) -> String;
}

impl SuccessDetail for BackupOutput {
    fn detail(&self) -> String {
        let location = self
            .artifacts
            .running
            .parent()
            .unwrap_or(self.artifacts.running.as_path());
        match &self.drift {
            Some(drift) => format!("Backed up to {} (config {drift})", location.display()),
            None => format!("Backed up to {}", location.display()),
        }
    }
}

impl SuccessDetail for PushOutput {
    fn detail(&self) -> String {
        match &self.backup {
            Some(path) => format!("Configured (backup: {})", path.display()),
            None => "Configured (backup: none)".to_string(),
        }
    }
}

/// Success/failure tally of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl Summary {
    pub fn from_results<T>(results: &[OperationResult<T>]) -> Self {
        let succeeded = results.iter().filter(|r| r.is_success()).count();
        Self {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
        }
    }

    /// Process exit status: non-zero iff a device failed.
    pub fn exit_code(&self) -> u8 {
        if self.failed > 0 { 1 } else { 0 }
    }
}

/// Wording of a rendered report.
#[derive(Debug, Clone, Copy)]
pub struct ReportLabels {
    pub title: &'static str,
    pub succeeded: &'static str,
    pub failed: &'static str,
}

impl ReportLabels {
    pub const BACKUP: ReportLabels = ReportLabels {
        title: "Backup Summary",
        succeeded: "Successful backups",
        failed: "Failed backups",
    };

    pub const PUSH: ReportLabels = ReportLabels {
        title: "Configuration Summary",
        succeeded: "Successful",
        failed: "Failed",
    };
}

/// Render the summary block printed at the end of a run.
pub fn render<T: SuccessDetail>(labels: ReportLabels, results: &[OperationResult<T>]) -> String {
    let summary = Summary::from_results(results);
    let rule = "=".repeat(50);
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(out, "{rule}\n{}\n{rule}", labels.title);
    let _ = writeln!(out, "Total devices: {}", summary.total);
    let _ = writeln!(out, "{}: {}", labels.succeeded, summary.succeeded);
    let _ = writeln!(out, "{}: {}", labels.failed, summary.failed);

    if summary.succeeded > 0 {
        let _ = writeln!(out, "\n{}:", labels.succeeded);
        for result in results {
            if let Outcome::Success(value) = &result.outcome {
                let _ = writeln!(out, "  - {}: {}", result.host, value.detail());
            }
        }
    }

    if summary.failed > 0 {
        let _ = writeln!(out, "\n{}:", labels.failed);
        for result in results {
            if let Outcome::Failed { error } = &result.outcome {
                let _ = writeln!(out, "  - {}: {error}", result.host);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::artifacts::{BackupArtifacts, ConfigDrift};

    fn backup_output(host: &str) -> BackupOutput {
        let dir = PathBuf::from("backups").join(host);
        BackupOutput {
            artifacts: BackupArtifacts {
                timestamp: "20240305_100000".to_string(),
                running: dir.join(format!("{host}_running_20240305_100000.cfg")),
                startup: None,
                facts: dir.join(format!("{host}_facts_20240305_100000.json")),
                interfaces: dir.join(format!("{host}_interfaces_20240305_100000.json")),
            },
            drift: Some(ConfigDrift::NoPrevious),
        }
    }

    #[test]
    fn test_summary_counts() {
        let results = vec![
            OperationResult::success("r1", ()),
            OperationResult::failed("r2", "boom"),
            OperationResult::success("r3", ()),
        ];
        let summary = Summary::from_results(&results);
        assert_eq!(summary, Summary { total: 3, succeeded: 2, failed: 1 });
        assert_eq!(summary.exit_code(), 1);
        assert_eq!(Summary::from_results::<()>(&[]).exit_code(), 0);
    }

    #[test]
    fn test_render_backup_report() {
        let results = vec![
            OperationResult::success("r1", backup_output("r1")),
            OperationResult::failed("r2", "Transport error: Connection failed to r2:22: Connection refused"),
        ];

        let expected = "\
==================================================
Backup Summary
==================================================
Total devices: 2
Successful backups: 1
Failed backups: 1

Successful backups:
  - r1: Backed up to backups/r1 (config no previous backup)

Failed backups:
  - r2: Transport error: Connection failed to r2:22: Connection refused
";
        assert_eq!(render(ReportLabels::BACKUP, &results), expected);
    }

    #[test]
    fn test_render_push_report_all_success() {
        let results = vec![OperationResult::success(
            "r1",
            PushOutput {
                backup: None,
                config_output: String::new(),
                save_output: String::new(),
            },
        )];

        let expected = "\
==================================================
Configuration Summary
==================================================
Total devices: 1
Successful: 1
Failed: 0

Successful:
  - r1: Configured (backup: none)
";
        assert_eq!(render(ReportLabels::PUSH, &results), expected);
    }
}
