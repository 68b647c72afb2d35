//! Troupe - Message-Passing Multi-Agent Runtime
//!
//! Main entry point for the CLI application.

use clap::{Parser, Subcommand};
use troupe::cli;
use troupe::Config;

/// Troupe - Message-Passing Multi-Agent Runtime
#[derive(Parser, Debug)]
#[command(name = "troupe")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Enable debug output
    #[arg(long, short = 'd', global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the video pipeline on one instruction
    Run {
        /// The user instruction to seed the planner with
        instruction: String,

        /// Planner model override
        #[arg(long)]
        planner_model: Option<String>,

        /// Describer model override
        #[arg(long)]
        describer_model: Option<String>,

        /// Stream tokens to stdout as they arrive
        #[arg(long, short = 's')]
        stream: bool,

        /// Skip the backend liveness probe
        #[arg(long)]
        no_preflight: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Write a default config file
    Init,
    /// Print the config file path
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = Config::load();

    if args.debug {
        config.runtime.debug = true;
    }

    match args.command {
        Command::Run {
            instruction,
            planner_model,
            describer_model,
            stream,
            no_preflight,
        } => {
            if let Some(model) = planner_model {
                config.planner.model = model;
            }
            if let Some(model) = describer_model {
                config.describer.model = model;
            }
            if stream {
                config.runtime.stream = true;
            }

            cli::run_pipeline(&config, &instruction, !no_preflight).await?;
        }

        Command::Config { action } => match action {
            ConfigAction::Show => cli::show_config(&config)?,
            ConfigAction::Init => cli::init_config()?,
            ConfigAction::Path => cli::config_path()?,
        },
    }

    Ok(())
}
