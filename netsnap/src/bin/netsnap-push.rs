//! Push a configuration command file to every inventory device.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use netsnap::cli::{CommonArgs, ask};
use netsnap::logging::LogContext;
use netsnap::report::{ReportLabels, Summary, render};
use netsnap::{
    ArtifactStore, CommandList, Confirmation, PushPipeline, PushRun, Settings, SshSessionFactory,
    load_inventory,
};

#[derive(Parser, Debug)]
#[command(name = "netsnap-push", version)]
#[command(about = "Apply configuration commands to network devices over SSH")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    /// Configuration command file; prompted for when omitted.
    #[arg(long, value_name = "FILE")]
    commands: Option<PathBuf>,

    /// Skip the confirmation prompt.
    #[arg(long)]
    yes: bool,
}

fn prompt(question: &str) -> String {
    // A closed or unreadable stdin answers nothing
    ask(&mut io::stdin().lock(), &mut io::stdout(), question).unwrap_or_default()
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

    let _log = match LogContext::init(&settings.log_dir, "netsnap_push.log") {
        Ok(log) => log,
        Err(e) => {
            eprintln!("Failed to initialise logging in {}: {e}", settings.log_dir.display());
            return ExitCode::FAILURE;
        }
    };

    println!("\n=== Network Device Configuration Tool ===");
    println!("Automated configuration deployment over SSH\n");

    let devices = match load_inventory(&settings.inventory) {
        Ok(devices) => devices,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let commands_path = cli.commands.unwrap_or_else(|| {
        PathBuf::from(
            prompt("Enter configuration file path (e.g., config/vlan_config.txt): ").trim(),
        )
    });
    let commands = match CommandList::load(&commands_path) {
        Ok(commands) => commands,
        Err(e) => {
            error!("{e}");
            error!("No configuration commands loaded. Exiting.");
            return ExitCode::FAILURE;
        }
    };

    println!(
        "\nReady to configure {} device(s) with {} command(s)",
        devices.len(),
        commands.len()
    );
    let confirmation = if cli.yes {
        info!("Confirmation prompt skipped (--yes)");
        Confirmation::Confirmed
    } else {
        Confirmation::from_answer(&prompt("Do you want to proceed? (yes/no): "))
    };

    let pipeline = PushPipeline::new(
        SshSessionFactory::new(settings.ssh_options()),
        ArtifactStore::new(&settings.backup_dir),
    );

    match pipeline.run(&devices, &commands, confirmation).await {
        PushRun::Cancelled => ExitCode::SUCCESS,
        PushRun::Completed(results) => {
            println!("\n{}", render(ReportLabels::PUSH, &results));
            ExitCode::from(Summary::from_results(&results).exit_code())
        }
    }
}
