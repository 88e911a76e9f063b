//! Mac Toolbox CLI
//!
//! Command-line entry point for the operator console. Without a subcommand
//! it opens the tool menu.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mtbx_core::{MtbxConfig, Toolbox};
use std::path::PathBuf;
use tracing::{error, info};

/// Mac Toolbox - menu-driven maintenance console
#[derive(Parser)]
#[command(name = "mtbx", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Subcommand to execute (defaults to the menu)
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Settings file (defaults to <config dir>/mtbx/config.toml)
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Show planned package updates without running them
    #[arg(long, global = true)]
    dry_run: bool,
}

/// Available commands
#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Open the interactive tool menu
    Menu,

    /// List discovered tools and registry diagnostics
    Tools,
}

fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        error!("Command failed: {:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing subscriber for structured logging.
///
/// Logs go to stderr so they never interleave with the menu on stdout.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = if verbose {
        EnvFilter::new("mtbx=debug,mtbx_core=debug")
    } else {
        EnvFilter::new("mtbx=warn,mtbx_core=warn")
    };

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let mut config = MtbxConfig::load(cli.config.as_deref()).context("Failed to load settings")?;
    if cli.dry_run {
        config.brew.dry_run = true;
    }

    let toolbox = Toolbox::new(config);

    match cli.command.unwrap_or(Commands::Menu) {
        Commands::Menu => {
            info!("Starting console");
            let summary = toolbox.run().context("Console session failed")?;
            info!(
                tools_run = summary.tools_run,
                tool_failures = summary.tool_failures,
                "Console closed"
            );
            Ok(())
        }
        Commands::Tools => list_tools(&toolbox),
    }
}

fn list_tools(toolbox: &Toolbox) -> Result<()> {
    let discovery = toolbox.discover().context("Tool discovery failed")?;

    for tool in &discovery.tools {
        let d = tool.descriptor();
        println!("{:>3} {} {} - {}", d.order, d.glyph, d.name, d.description);
    }
    for diagnostic in &discovery.diagnostics {
        println!("excluded: {}", diagnostic);
    }
    Ok(())
}
