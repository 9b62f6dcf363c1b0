//! Back up every inventory device.

use std::process::ExitCode;

use clap::Parser;
use log::error;

use netsnap::cli::CommonArgs;
use netsnap::logging::LogContext;
use netsnap::report::{ReportLabels, Summary, render};
use netsnap::{ArtifactStore, BackupPipeline, Settings, SshSessionFactory, load_inventory};

#[derive(Parser, Debug)]
#[command(name = "netsnap-backup", version)]
#[command(about = "Back up network device configurations, facts and interfaces over SSH")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match Settings::load(cli.common.settings.as_deref()) {
        Ok(settings) => cli.common.apply(settings),
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let _log = match LogContext::init(&settings.log_dir, "netsnap_backup.log") {
        Ok(log) => log,
        Err(e) => {
            eprintln!("Failed to initialise logging in {}: {e}", settings.log_dir.display());
            return ExitCode::FAILURE;
        }
    };

    println!("\n=== Network Device Backup Tool ===");
    println!("Automated configuration backups over SSH\n");

    let devices = match load_inventory(&settings.inventory) {
        Ok(devices) => devices,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    println!("Loaded {} device(s) from inventory\n", devices.len());

    let pipeline = BackupPipeline::new(
        SshSessionFactory::new(settings.ssh_options()),
        ArtifactStore::new(&settings.backup_dir),
    );
    let results = pipeline.run(&devices).await;

    println!("\n{}", render(ReportLabels::BACKUP, &results));
    ExitCode::from(Summary::from_results(&results).exit_code())
}
