//! Command-line flags shared by both binaries.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Args;

use crate::settings::Settings;
use crate::transport::HostKeyVerification;

#[derive(Args, Debug, Default)]
pub struct CommonArgs {
    /// Settings file (default: netsnap.toml when present).
    #[arg(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Device inventory YAML.
    #[arg(long, value_name = "FILE")]
    pub inventory: Option<PathBuf>,

    /// Directory backups are written to.
    #[arg(long, value_name = "DIR")]
    pub backup_dir: Option<PathBuf>,

    /// Directory the run log is appended to.
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// SSH connect and read timeout in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Do not verify SSH host keys.
    #[arg(long)]
    pub insecure: bool,
}

impl CommonArgs {
    /// Apply flags on top of loaded settings.
    pub fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(inventory) = &self.inventory {
            settings.inventory = inventory.clone();
        }
        if let Some(dir) = &self.backup_dir {
            settings.backup_dir = dir.clone();
        }
        if let Some(dir) = &self.log_dir {
            settings.log_dir = dir.clone();
        }
        if let Some(secs) = self.timeout {
            settings.ssh.timeout_secs = secs;
        }
        if self.insecure {
            settings.ssh.host_key_verification = HostKeyVerification::Disabled;
        }
        settings
    }
}

/// Print `question` and read one line of answer, without the newline.
/// End of input reads as an empty answer.
pub fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> io::Result<String> {
    write!(output, "{question}")?;
    output.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim_end_matches(['\r', '\n']).to_string())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        common: CommonArgs,
    }

    #[test]
    fn test_flags_override_settings() {
        let cli = TestCli::parse_from([
            "netsnap-backup",
            "--inventory",
            "lab.yml",
            "--timeout",
            "5",
            "--insecure",
        ]);
        let settings = cli.common.apply(Settings::default());
        assert_eq!(settings.inventory, PathBuf::from("lab.yml"));
        assert_eq!(settings.backup_dir, PathBuf::from("backups"));
        assert_eq!(settings.ssh.timeout_secs, 5);
        assert_eq!(settings.ssh.host_key_verification, HostKeyVerification::Disabled);
    }

    #[test]
    fn test_no_flags_keeps_settings() {
        let cli = TestCli::parse_from(["netsnap-push"]);
        assert_eq!(cli.common.apply(Settings::default()), Settings::default());
    }

    #[test]
    fn test_ask_reads_one_line() {
        let mut input = io::Cursor::new("config/vlan.txt\r\nyes\n");
        let mut output = Vec::new();
        let answer = ask(&mut input, &mut output, "File: ").unwrap();
        assert_eq!(answer, "config/vlan.txt");
        assert_eq!(output, b"File: ");
        assert_eq!(ask(&mut input, &mut output, "Proceed? ").unwrap(), "yes");
        assert_eq!(ask(&mut input, &mut output, "Again? ").unwrap(), "");
    }
}
