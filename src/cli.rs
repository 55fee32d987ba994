// Augment Free CLI binary

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use augment_free_lib::constants::DEFAULT_KEYWORD;
use augment_free_lib::jobs::{self, Job};
use augment_free_lib::logging::setup_logging;
use augment_free_lib::{EditorFlavor, EditorProcess, PathLocator, StatusEvent, SystemPathLocator, SystemProcessControl};

#[derive(Parser)]
#[command(name = "augment-free")]
#[command(about = "Augment Free - clean the VS Code state database and rotate telemetry IDs", long_about = None)]
#[command(version)]
struct Cli {
    /// Echo debug logs to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Which VS Code build to target
    #[arg(long, value_enum, default_value_t = EditorFlavor::Code, global = true)]
    flavor: EditorFlavor,

    /// Explicit path to state.vscdb
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    /// Explicit path to storage.json
    #[arg(long, global = true)]
    storage_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Delete entries whose key contains the keyword from the state database
    CleanDb {
        /// Substring to match (case-insensitive)
        #[arg(short, long, default_value = DEFAULT_KEYWORD)]
        keyword: String,
        /// Proceed even if VS Code is running
        #[arg(long)]
        force: bool,
    },

    /// Replace machineId and devDeviceId in storage.json
    ModifyIds {
        /// Proceed even if VS Code is running
        #[arg(long)]
        force: bool,
    },

    /// Clean the database, then modify the IDs
    RunAll {
        /// Substring to match (case-insensitive)
        #[arg(short, long, default_value = DEFAULT_KEYWORD)]
        keyword: String,
        /// Close VS Code before touching its files
        #[arg(long)]
        close_editor: bool,
        /// Proceed without closing VS Code even if it is running
        #[arg(long)]
        force: bool,
    },

    /// Close running VS Code processes
    CloseEditor,

    /// Print the account login URL
    LoginUrl {
        /// Also open it in the default browser
        #[arg(long)]
        open: bool,
    },

    /// Show the resolved file locations
    Paths,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.log_file.as_deref()).context("Failed to initialize logging")?;

    let locator = SystemPathLocator::new(cli.flavor)
        .with_state_db(cli.db_path)
        .with_storage_json(cli.storage_path);
    let process = SystemProcessControl::new(cli.flavor);

    let job = match cli.command {
        Commands::CleanDb { keyword, force } => Job::CleanDatabase { keyword, force },
        Commands::ModifyIds { force } => Job::ModifyIds { force },
        Commands::RunAll {
            keyword,
            close_editor,
            force,
        } => Job::RunAll {
            keyword,
            close_editor,
            force,
        },
        Commands::CloseEditor => Job::CloseEditor,
        Commands::LoginUrl { open } => Job::Login { open_browser: open },
        Commands::Paths => return cmd_paths(&locator, &process),
    };

    let print = |event: StatusEvent| println!("{}", event);
    if !jobs::run_job(&job, &locator, &process, &print) {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_paths(locator: &dyn PathLocator, process: &dyn EditorProcess) -> Result<()> {
    let paths = locator.locate().context("Could not determine VS Code paths")?;

    let status = |p: &std::path::Path| if p.is_file() { "found" } else { "missing" };

    println!("State database: {} ({})", paths.state_db.display(), status(&paths.state_db));
    println!("Storage file:   {} ({})", paths.storage_json.display(), status(&paths.storage_json));
    println!(
        "VS Code:        {}",
        if process.is_running() { "running" } else { "not running" }
    );
    Ok(())
}
