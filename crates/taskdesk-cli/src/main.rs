use clap::Parser;
use std::path::PathBuf;
use taskdesk_core::storage::config::Config;
use taskdesk_core::utils::logging::{LogTarget, init_logging};

mod cli;

use cli::dispatcher::Dispatcher;
use cli::main_types::Cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // The browser owns the terminal, so its logs go to a file
    let log_target = if cli.command.is_fullscreen() {
        LogTarget::default_file()
    } else {
        LogTarget::Terminal
    };
    init_logging(cli.verbose, &log_target);

    // Load Config
    let config_path = cli
        .config_dir
        .as_ref()
        .map(|dir| PathBuf::from(dir).join("config.toml"));

    let config = match Config::load(config_path.clone()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error loading config: {}", err);
            std::process::exit(1);
        }
    };

    if let Some(config_dir) = &cli.config_dir {
        log::debug!("Using config directory: {}", config_dir);
    }
    if cli.token.as_ref().is_some_and(|token| !token.is_empty()) {
        log::debug!("Using token provided via env or command line");
    }

    let dispatcher = Dispatcher::new(config, config_path, cli.server, cli.token);

    if let Err(e) = dispatcher.dispatch(cli.command).await {
        eprintln!("{} {}", e.severity().emoji(), e.display_friendly());
        if let Some(hint) = e.troubleshooting_hint() {
            eprintln!("   Hint: {}", hint);
        }
        log::debug!("error detail: {:?}", e);
        std::process::exit(1);
    }

    Ok(())
}
