use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "personabot")]
#[command(about = "Consult simulated medical specialists with configurable personas")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Base URL of the configuration service
    #[arg(long)]
    pub api_url: Option<String>,

    /// Delay before a simulated reply, in milliseconds
    #[arg(long)]
    pub reply_delay_ms: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the interactive consultation interface
    Chat {
        /// Pre-select a specialist by id (repeatable)
        #[arg(short, long)]
        specialist: Vec<String>,

        /// Skip the tutorial on start
        #[arg(long)]
        no_tutorial: bool,
    },

    /// List available specialists
    Specialists {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// List persona setting categories and their values
    Settings {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Chat {
            specialist: Vec::new(),
            no_tutorial: false,
        }
    }
}
