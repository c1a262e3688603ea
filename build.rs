// build.rs

use clap::{Arg, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: descriptor path
fn input_arg() -> Arg {
    Arg::new("input")
        .short('i')
        .long("input")
        .value_name("PATH")
        .required(true)
        .help("Path to the descriptor file")
}

/// Common argument: output path
fn output_arg() -> Arg {
    Arg::new("output")
        .short('o')
        .long("output")
        .value_name("PATH")
        .help("Output file (default: stdout)")
}

fn build_cli() -> Command {
    Command::new("pkgen")
        .version(env!("CARGO_PKG_VERSION"))
        .author("pkgen Contributors")
        .about("Compile package build descriptors into build graphs")
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(clap::ArgAction::SetTrue)
                .help("Enable debug logging (overridden by RUST_LOG)"),
        )
        .subcommand(
            Command::new("mk")
                .about("Generate the package-assembly makefile")
                .arg(input_arg())
                .arg(output_arg()),
        )
        .subcommand(
            Command::new("srcmk")
                .about("Generate the source-fetch makefile")
                .arg(input_arg())
                .arg(output_arg()),
        )
        .subcommand(
            Command::new("dockerfile")
                .about("Generate the build-environment image descriptor")
                .arg(input_arg())
                .arg(output_arg())
                .arg(
                    Arg::new("arch")
                        .long("arch")
                        .default_value("x86_64")
                        .help("Target architecture"),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Validate a descriptor and print warnings")
                .arg(input_arg()),
        )
        .subcommand(
            Command::new("functions").about("List the template functions available to build scripts"),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("pkgen.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
