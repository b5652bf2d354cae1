use std::path::PathBuf;

use clap::{Parser, Subcommand};
use resxsync_cli::{
    SourceArgs,
    inspect::run_inspect_command,
    sync::{SyncOptions, run_sync_command},
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    commands: Commands,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Copy translations from the table into the matching .resx files.
    Sync {
        #[command(flatten)]
        source: SourceArgs,

        /// Show what would change without writing any file
        #[arg(long)]
        dry_run: bool,

        /// Write a JSON report of the run to this path
        #[arg(long)]
        report_json: Option<PathBuf>,
    },

    /// Show the translation table and how resource files map onto its languages.
    Inspect {
        #[command(flatten)]
        source: SourceArgs,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    let result = match args.commands {
        Commands::Sync {
            source,
            dry_run,
            report_json,
        } => source.resolve().and_then(|config| {
            run_sync_command(SyncOptions {
                config,
                report_json,
                dry_run,
            })
        }),
        Commands::Inspect { source } => {
            source.resolve().and_then(|config| run_inspect_command(&config))
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
