//! Roadkill CLI - Command-line interface for Carmageddon resource files

pub mod commands;

use crate::formats::LoadOptions;
use clap::Parser;
use commands::Commands;

#[derive(Parser)]
#[command(name = "roadkill")]
#[command(about = "Roadkill: Carmageddon resource file tools", long_about = None)]
#[command(version)]
struct Cli {
    /// Show debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Files use the legacy encoding (fixed-point vertices, explicit pixelmap sizes)
    #[arg(long, global = true)]
    legacy: bool,

    /// Skip normal computation for loaded meshes
    #[arg(long, global = true)]
    no_normals: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Run the Roadkill CLI
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    } else {
        tracing_subscriber::fmt::init();
    }

    let mut options = LoadOptions::default().with_normals(!cli.no_normals);
    if cli.legacy {
        options = options.legacy();
    }
    cli.command.execute(&options)?;

    Ok(())
}
