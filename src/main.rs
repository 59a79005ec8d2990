//! odomon - Watch an odo component and report whether it is running
//!
//! This is the binary entry point. All logic lives in the library crates.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use tracing::{error, info};

use odomon_app::{
    load_settings, run_logs, run_push, run_status, stdout_reporter, MonitorOptions, OutputFormat,
};
use odomon_core::OdoContext;
use odomon_daemon::resolve_odo_binary;

/// odomon - Watch an odo component and report whether it is running
#[derive(Parser, Debug)]
#[command(name = "odomon")]
#[command(about = "Watch an odo component and report whether it is running", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// odo executable, or a directory containing it
    #[arg(long, value_name = "PATH", global = true)]
    odo: Option<PathBuf>,

    /// Component directory (defaults to the current directory)
    #[arg(long, value_name = "DIR", global = true)]
    context: Option<PathBuf>,

    /// Kubeconfig exported to odo as KUBECONFIG
    #[arg(long, value_name = "FILE", global = true)]
    kubeconfig: Option<PathBuf>,

    /// Print NDJSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Also print every decoded odo event
    #[arg(long, global = true)]
    debug_events: bool,
}

#[derive(Subcommand, Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Command {
    /// Follow component status (default)
    #[default]
    Status,
    /// Push the component and show odo's events
    Push,
    /// Echo the component's application log
    Log,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    odomon_core::logging::init()?;

    let context_path = match args.context {
        Some(path) => path,
        None => std::env::current_dir()?,
    };

    // CLI flags override .odomon/config.toml
    let mut settings = load_settings(&context_path);
    if args.json {
        settings.output.format = OutputFormat::Json;
    }
    if args.debug_events {
        settings.output.debug_events = true;
    }

    let odo_binary = resolve_odo_binary(args.odo.as_deref().or(settings.odo.binary.as_deref()));
    let kubeconfig = args.kubeconfig.or_else(|| settings.odo.kubeconfig.clone());
    let context = OdoContext::validated(odo_binary, context_path, kubeconfig)?;

    let command = args.command.unwrap_or_default();
    info!(
        "Running {:?} for {} with {} ({} output)",
        command,
        context.context_path().display(),
        context.odo_binary().display(),
        settings.output.format
    );

    let mut reporter = stdout_reporter(settings.output.format);
    let result = match command {
        Command::Status => {
            let options = MonitorOptions::from_settings(&settings);
            run_status(&context, &options, reporter.as_mut()).await
        }
        Command::Push => run_push(&context, reporter.as_mut()).await,
        Command::Log => run_logs(&context, reporter.as_mut()).await,
    };

    match result {
        Ok(summary) => {
            info!("Session finished: {:?}", summary);
            Ok(())
        }
        Err(e) => {
            error!("Session failed (fatal: {}): {}", e.is_fatal(), e);
            eprintln!(
                "See {} for the session log",
                odomon_core::logging::log_directory().display()
            );
            Err(e.into())
        }
    }
}
