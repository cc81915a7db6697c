//! spibind - drive SPI access token binding authorization from the terminal
//!
//! Watches an `SPIAccessTokenBinding` through the Kubernetes Watch API, opens
//! the OAuth page when the operator asks for it, and records the injected
//! secret once authorization succeeds.

use anyhow::Result;
use clap::{Parser, Subcommand};
use spibind::cli::{
    BindArgs, ConfigSubcommand, StatusArgs, WatchArgs, display_version, handle_bind,
    handle_config_command, handle_status, handle_watch, init_logging,
};

/// spibind - authorize SPI access token bindings from the terminal
#[derive(Parser, Debug)]
#[command(name = "spibind")]
#[command(about = "Watch SPI access token bindings and drive their OAuth authorization", long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(long, short = 'd', global = true)]
    debug: bool,

    /// Kubeconfig context to use
    #[arg(long, global = true)]
    context: Option<String>,

    #[command(subcommand)]
    command: Command,
}

/// Main commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Watch an existing binding until it is authorized
    Watch(WatchArgs),
    /// Create a binding for a repository and authorize it
    Bind(BindArgs),
    /// Show the current status of a binding
    Status(StatusArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_file = init_logging(args.debug);
    if let Some(ref log_path) = log_file {
        eprintln!(
            "Debug logging enabled. Logs written to: {}",
            log_path.display()
        );
        tracing::debug!("Debug logging enabled");
    }

    let context = args.context.as_deref();
    match args.command {
        Command::Watch(watch) => handle_watch(watch, context).await,
        Command::Bind(bind) => handle_bind(bind, context).await,
        Command::Status(status) => handle_status(status, context).await,
        Command::Config { subcommand } => handle_config_command(subcommand, context),
        Command::Version => {
            display_version();
            Ok(())
        }
    }
}
