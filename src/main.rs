use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use stacksnap::cli::{
    handle_history_command, handle_list_command, handle_prune_command, handle_run_command,
};
use stacksnap::config::{paths::SnapPaths, settings::Settings};

#[derive(Parser)]
#[command(
    name = "stacksnap",
    version,
    about = "Snapshot and retention tool for single-node container stacks",
    long_about = "stacksnap captures point-in-time snapshots of a container \
                  stack's database, persistent data volume, and configuration \
                  file, then trims each snapshot set to a configured \
                  retain-count. Intended to run from cron or a systemd timer."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a backup: capture snapshots, then enforce retention
    Run {
        /// Emit the run report as JSON instead of human output
        #[arg(long)]
        json: bool,

        /// Override the configured retain-count
        #[arg(long, env = "STACKSNAP_RETAIN")]
        retain: Option<u32>,

        /// Override the configured snapshot directory
        #[arg(long, env = "STACKSNAP_SNAPSHOT_DIR")]
        snapshot_dir: Option<PathBuf>,
    },

    /// List snapshots on disk, grouped by kind
    List {
        /// Show detailed information
        #[arg(short, long)]
        verbose: bool,

        /// Override the configured snapshot directory
        #[arg(long, env = "STACKSNAP_SNAPSHOT_DIR")]
        snapshot_dir: Option<PathBuf>,
    },

    /// Delete old snapshots according to the retention policy
    Prune {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,

        /// Override the configured retain-count
        #[arg(long, env = "STACKSNAP_RETAIN")]
        retain: Option<u32>,

        /// Override the configured snapshot directory
        #[arg(long, env = "STACKSNAP_SNAPSHOT_DIR")]
        snapshot_dir: Option<PathBuf>,
    },

    /// Show recent backup run reports
    History {
        /// Number of runs to show
        #[arg(short, long, default_value = "10")]
        count: usize,
    },

    /// Initialize the stacksnap data directory and default settings
    Init,

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize paths and settings
    let paths = SnapPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    match cli.command {
        Some(Commands::Run {
            json,
            retain,
            snapshot_dir,
        }) => {
            let settings = apply_overrides(settings, retain, snapshot_dir);
            handle_run_command(&paths, &settings, json)?;
        }
        Some(Commands::List {
            verbose,
            snapshot_dir,
        }) => {
            let settings = apply_overrides(settings, None, snapshot_dir);
            handle_list_command(&paths, &settings, verbose)?;
        }
        Some(Commands::Prune {
            force,
            retain,
            snapshot_dir,
        }) => {
            let settings = apply_overrides(settings, retain, snapshot_dir);
            handle_prune_command(&paths, &settings, force)?;
        }
        Some(Commands::History { count }) => {
            handle_history_command(&paths, count)?;
        }
        Some(Commands::Init) => {
            println!("Initializing stacksnap at: {}", paths.base_dir().display());
            paths.ensure_directories()?;
            settings.save(&paths)?;
            println!("Initialization complete!");
            println!();
            println!("Edit {} to point stacksnap at your stack:", paths.settings_file().display());
            println!("  - database.container: container running the database");
            println!("  - database.name / database.user: what to dump, and as whom");
            println!("  - volume.name: persistent volume to archive");
            println!("  - retain_count: snapshots to keep per kind (default 7)");
            println!();
            println!("Then run 'stacksnap run' to take the first snapshot.");
        }
        Some(Commands::Config) => {
            println!("stacksnap Configuration");
            println!("=======================");
            println!("Config directory:   {}", paths.config_dir().display());
            println!(
                "Snapshot directory: {}",
                settings.resolve_snapshot_dir(&paths).display()
            );
            println!("History log:        {}", paths.history_log().display());
            println!();
            println!("Settings:");
            println!("  Runtime:            {}", settings.runtime);
            println!("  Database container: {}", settings.database.container);
            println!("  Database name:      {}", settings.database.name);
            println!("  Database user:      {}", settings.database.user);
            println!("  Volume:             {}", settings.volume.name);
            println!("  Helper image:       {}", settings.helper_image);
            println!("  Retain count:       {}", settings.retain_count);
            match &settings.config_file {
                Some(path) => println!("  Config file:        {}", path.display()),
                None => println!("  Config file:        (not configured)"),
            }
        }
        None => {
            println!("stacksnap - Snapshot and retention for container stacks");
            println!();
            println!("Run 'stacksnap --help' for usage information.");
            println!("Run 'stacksnap init' to set up a new installation.");
        }
    }

    Ok(())
}

/// Fold flag/env overrides into the loaded settings
fn apply_overrides(
    mut settings: Settings,
    retain: Option<u32>,
    snapshot_dir: Option<PathBuf>,
) -> Settings {
    if let Some(retain) = retain {
        settings.retain_count = retain;
    }
    if let Some(dir) = snapshot_dir {
        settings.snapshot_dir = Some(dir);
    }
    settings
}
