//! Command-line definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tiffin food subscription platform
#[derive(Parser, Debug)]
#[command(name = "tiffin", version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// JSON snapshot file; overrides `storage.data_file`
    #[arg(long, global = true, env = "TIFFIN_DATA_FILE")]
    pub data_file: Option<PathBuf>,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP API
    Serve {
        /// Bind host; overrides `server.host`
        #[arg(long)]
        host: Option<String>,
        /// Bind port; overrides `server.port`
        #[arg(long)]
        port: Option<u16>,
    },
    /// Vendor assignment queue
    Queue {
        /// Queue action
        #[command(subcommand)]
        action: QueueAction,
    },
    /// Periodic housekeeping
    Maintenance {
        /// Maintenance action
        #[command(subcommand)]
        action: MaintenanceAction,
    },
    /// Configuration file management
    Config {
        /// Config action
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Queue subcommands.
#[derive(Subcommand, Debug)]
pub enum QueueAction {
    /// Print pending requests in processing order
    List {
        /// Requests to show
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    /// Approve pending requests with the best candidate vendor
    AutoAssign {
        /// Requests to process; `assignment.auto_assign_batch` when unset
        #[arg(long)]
        limit: Option<usize>,
        /// Recorded as the approver
        #[arg(long, default_value = "tiffin-cli")]
        processed_by: String,
    },
    /// Print queue counters
    Stats,
}

/// Maintenance subcommands.
#[derive(Subcommand, Debug)]
pub enum MaintenanceAction {
    /// Expire subscriptions whose end date has passed
    Expire,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved config file path
    Path,
    /// Print a value by dotted key, e.g. `server.port`
    Get {
        /// Dotted key
        key: String,
    },
    /// Set a value by dotted key in the config file
    Set {
        /// Dotted key
        key: String,
        /// New value; booleans and numbers are detected
        value: String,
    },
    /// Write a default config file
    Init {
        /// Target file; the default config path when unset
        #[arg(long)]
        file: Option<String>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the configuration as environment variables
    Export {
        /// Format as `--env KEY=value` for `docker run`
        #[arg(long)]
        docker_env: bool,
    },
}
