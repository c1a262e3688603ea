// src/commands/mod.rs
//! Command handlers for the pkgen CLI

use anyhow::{Context, Result};
use pkgen::template::BUILD_FUNCTIONS;
use pkgen::{
    Descriptor, generate_assembly, generate_sources, parse_descriptor_file, render_dockerfile,
    validate_descriptor,
};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{info, warn};

/// Mode of written output files
#[cfg(unix)]
const OUTPUT_MODE: u32 = 0o644;

/// Load and validate a descriptor, logging any warnings
fn load_descriptor(input: &str) -> Result<Descriptor> {
    let path = Path::new(input);
    let descriptor = parse_descriptor_file(path)
        .with_context(|| format!("Failed to parse descriptor: {}", path.display()))?;

    let warnings = validate_descriptor(&descriptor)
        .with_context(|| format!("Descriptor validation failed: {}", path.display()))?;
    for warning in &warnings {
        warn!("{}", warning);
    }

    Ok(descriptor)
}

/// Write generated text to a file, or to stdout when no path is given
///
/// Files are written to a temporary sibling and renamed into place, so the
/// destination either holds the complete text or is left untouched.
fn write_output(output: Option<&str>, text: &str) -> Result<()> {
    let Some(output) = output else {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(text.as_bytes())
            .context("Failed to write to stdout")?;
        return stdout.flush().context("Failed to flush stdout");
    };

    let path = Path::new(output);
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create temporary file in {}", parent.display()))?;
    file.write_all(text.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;

    // Temporary files are created owner-only
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.as_file()
            .set_permissions(std::fs::Permissions::from_mode(OUTPUT_MODE))
            .with_context(|| format!("Failed to set permissions on {}", path.display()))?;
    }

    file.persist(path)
        .with_context(|| format!("Failed to move output into place: {}", path.display()))?;

    info!("Wrote {}", path.display());
    Ok(())
}

/// Generate the package-assembly makefile
pub fn cmd_mk(input: &str, output: Option<&str>) -> Result<()> {
    let descriptor = load_descriptor(input)?;
    let makefile = generate_assembly(&descriptor)
        .with_context(|| format!("Failed to generate assembly graph for {}", input))?;
    write_output(output, &makefile.render())
}

/// Generate the source-fetch makefile
pub fn cmd_srcmk(input: &str, output: Option<&str>) -> Result<()> {
    let descriptor = load_descriptor(input)?;
    let makefile = generate_sources(&descriptor)
        .with_context(|| format!("Failed to generate source graph for {}", input))?;
    write_output(output, &makefile.render())
}

/// Generate the build-environment image descriptor
pub fn cmd_dockerfile(input: &str, output: Option<&str>, arch: &str) -> Result<()> {
    let descriptor = load_descriptor(input)?;
    let text = render_dockerfile(&descriptor, arch)
        .with_context(|| format!("Failed to render image descriptor for {}", input))?;
    write_output(output, &text)
}

/// Validate a descriptor and report the result
pub fn cmd_check(input: &str) -> Result<()> {
    let path = Path::new(input);
    let descriptor = parse_descriptor_file(path)
        .with_context(|| format!("Failed to parse descriptor: {}", path.display()))?;

    let warnings = validate_descriptor(&descriptor).with_context(|| "Descriptor validation failed")?;
    for warning in &warnings {
        println!("Warning: {}", warning);
    }

    // Generation also checks the build script and every package's metadata
    generate_assembly(&descriptor).with_context(|| "Assembly graph check failed")?;
    generate_sources(&descriptor).with_context(|| "Source graph check failed")?;

    println!(
        "Descriptor: {} package(s), version {}",
        descriptor.packages.len(),
        descriptor.version
    );
    if warnings.is_empty() {
        println!("[OK] No issues found");
    } else {
        println!("[OK] {} warning(s)", warnings.len());
    }
    Ok(())
}

/// List the build-script template functions
pub fn cmd_functions() -> Result<()> {
    for function in BUILD_FUNCTIONS {
        println!("{:<10} {:<12} {}", function.name, function.arity.to_string(), function.summary);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_output_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Makefile");
        let path_str = path.to_str().unwrap();

        write_output(Some(path_str), "all:\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "all:\n");

        write_output(Some(path_str), "all: x\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "all: x\n");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_written_output_is_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Dockerfile");
        write_output(Some(path.to_str().unwrap()), "FROM x\n").unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, OUTPUT_MODE);
    }

    #[test]
    fn test_failed_generation_leaves_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("pkgen.yaml");
        let output = dir.path().join("Makefile");
        std::fs::write(
            &input,
            "version: 1.0.0\npackages:\n  p:\nscript:\n  - '{{bogus}}'\n",
        )
        .unwrap();

        let result = cmd_mk(input.to_str().unwrap(), Some(output.to_str().unwrap()));
        assert!(result.is_err());
        assert!(!output.exists());
    }

    #[test]
    fn test_cmd_dockerfile() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("pkgen.yaml");
        let output = dir.path().join("Dockerfile");
        std::fs::write(&input, "version: 1.0.0\nbuilddependencies: [gcc]\n").unwrap();

        cmd_dockerfile(input.to_str().unwrap(), Some(output.to_str().unwrap()), "x86_64").unwrap();
        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "FROM panux/builder:alpine-x86_64\n\nRUN /scripts/install.sh gcc\n"
        );
    }
}
