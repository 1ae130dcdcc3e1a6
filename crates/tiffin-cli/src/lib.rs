#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod config_handlers;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use tiffin_core::TiffinConfig;

pub use cli::{Cli, Command};

/// Dispatches a parsed command line.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let Cli {
        config: config_path,
        data_file,
        command,
    } = cli;

    let load = || -> anyhow::Result<TiffinConfig> {
        let mut config = TiffinConfig::load(config_path.as_deref())
            .context("Failed to load configuration")?;
        if let Some(path) = data_file.clone() {
            config.storage.data_file = Some(path);
        }
        init_tracing(&config.logging.level);
        Ok(config)
    };

    match command {
        Command::Serve { host, port } => {
            let mut config = load()?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            config.validate()?;
            commands::serve(&config).await
        }
        Command::Queue { action } => {
            let engine = commands::open_engine(&load()?)?;
            println!("{}", commands::queue(&engine, action)?);
            Ok(())
        }
        Command::Maintenance { action } => {
            let engine = commands::open_engine(&load()?)?;
            println!("{}", commands::maintenance(&engine, action)?);
            Ok(())
        }
        Command::Config { action } => {
            init_tracing("warn");
            let output = config_handlers::handle_config_command(config_path.as_deref(), action)?;
            println!("{output}");
            Ok(())
        }
    }
}

/// Installs the fmt subscriber. `RUST_LOG` wins over `default_level`.
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // Already installed when called twice in one process.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
