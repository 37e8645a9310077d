//! Windfall - declarative Linux root filesystem builder.
//!
//! Builds a complete root filesystem from a TOML manifest: toolchain
//! packages first, then system packages, then static configuration and
//! bootloader artifacts.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

use windfall::config::Manifest;
use windfall::logging::{self, Logging};
use windfall::orchestrator::Orchestrator;

#[derive(Parser)]
#[command(name = "windfall")]
#[command(about = "Declarative Linux root filesystem builder")]
#[command(
    after_help = "QUICK START:\n  windfall build            Build from windfall.toml\n  windfall build my.toml    Build from a specific manifest\n  windfall show my.toml     Show the resolved configuration"
)]
struct Cli {
    /// Enable debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the distribution described by a manifest
    Build {
        /// Path to the build manifest
        #[arg(default_value = "windfall.toml")]
        config: PathBuf,
    },

    /// Show the resolved configuration
    Show {
        /// Path to the build manifest
        #[arg(default_value = "windfall.toml")]
        config: PathBuf,
    },
}

fn main() -> ExitCode {
    let logging = logging::init();

    // Load .env if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    match run(cli, &logging) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("build failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, logging: &Logging) -> Result<()> {
    match cli.command {
        Commands::Build { config } => {
            let manifest = Manifest::load(&config)?;
            logging.reconfigure(cli.verbose || manifest.debug);
            Orchestrator::new(manifest).build()
        }

        Commands::Show { config } => {
            let manifest = Manifest::load(&config)?;
            logging.reconfigure(cli.verbose || manifest.debug);
            show_config(&manifest);
            Ok(())
        }
    }
}

fn show_config(manifest: &Manifest) {
    println!("Distribution: {} {}", manifest.meta.name, manifest.meta.version);
    println!("Install root: {}", manifest.build.lfs_dir.display());
    println!("Source cache: {}", manifest.build.sources_dir.display());
    println!("Jobs:         {}", manifest.build.jobs);
    println!("Toolchain packages: {}", manifest.toolchain_packages.len());
    println!("System packages:    {}", manifest.packages.len());
    println!("System users:       {}", manifest.users.system.len());
}
