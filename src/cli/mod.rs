// src/cli/mod.rs
//! CLI definitions for pkgen
//!
//! This module contains the command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.
//!
//! - `mk` - Package-assembly makefile
//! - `srcmk` - Source-fetch makefile
//! - `dockerfile` - Build-environment image descriptor
//! - `check` - Validate a descriptor without generating anything
//! - `functions` - List the build-script template functions

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "pkgen")]
#[command(author = "pkgen Contributors")]
#[command(version)]
#[command(about = "Compile package build descriptors into build graphs", long_about = None)]
pub struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Input and output paths shared by the generating commands
#[derive(Args)]
pub struct IoArgs {
    /// Path to the descriptor file
    #[arg(short, long, value_name = "PATH")]
    pub input: String,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate the package-assembly makefile
    Mk {
        #[command(flatten)]
        io: IoArgs,
    },

    /// Generate the source-fetch makefile
    Srcmk {
        #[command(flatten)]
        io: IoArgs,
    },

    /// Generate the build-environment image descriptor
    Dockerfile {
        #[command(flatten)]
        io: IoArgs,

        /// Target architecture
        #[arg(long, default_value = "x86_64")]
        arch: String,
    },

    /// Validate a descriptor and print warnings
    Check {
        /// Path to the descriptor file
        #[arg(short, long, value_name = "PATH")]
        input: String,
    },

    /// List the template functions available to build scripts
    Functions,
}
