// src/main.rs

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries generated text
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Mk { io } => commands::cmd_mk(&io.input, io.output.as_deref()),
        Commands::Srcmk { io } => commands::cmd_srcmk(&io.input, io.output.as_deref()),
        Commands::Dockerfile { io, arch } => {
            commands::cmd_dockerfile(&io.input, io.output.as_deref(), &arch)
        }
        Commands::Check { input } => commands::cmd_check(&input),
        Commands::Functions => commands::cmd_functions(),
    }
}
