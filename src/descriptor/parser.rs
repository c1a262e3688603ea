// src/descriptor/parser.rs

//! Descriptor file parsing and validation

use crate::descriptor::format::Descriptor;
use crate::error::{Error, Result};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

/// Package names usable verbatim as build targets, paths and shell words
static PACKAGE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._+-]*$").unwrap());

/// Parse a descriptor from a YAML string
pub fn parse_descriptor(content: &str) -> Result<Descriptor> {
    serde_yaml::from_str(content).map_err(|e| Error::ParseError(format!("Invalid descriptor: {}", e)))
}

/// Parse a descriptor from a file
pub fn parse_descriptor_file(path: &Path) -> Result<Descriptor> {
    debug!("Reading descriptor {}", path.display());
    let content = std::fs::read_to_string(path)?;
    parse_descriptor(&content)
}

/// Check that a package name can be used as a build target and path segment
pub fn check_package_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidDescriptor("Package name cannot be empty".to_string()));
    }
    if !PACKAGE_NAME_RE.is_match(name) {
        return Err(Error::InvalidDescriptor(format!(
            "Package name '{}' must start with a letter or digit and contain only letters, digits, '.', '_', '+' or '-'",
            name
        )));
    }
    Ok(())
}

/// Validate a descriptor for completeness and correctness
///
/// Returns warnings for suspicious but usable descriptors and fails on
/// anything that would make generation impossible.
pub fn validate_descriptor(descriptor: &Descriptor) -> Result<Vec<String>> {
    let mut warnings = Vec::new();

    if descriptor.version.trim().is_empty() {
        return Err(Error::InvalidDescriptor("Descriptor version cannot be empty".to_string()));
    }
    descriptor.canonical_version()?;

    for (name, _) in descriptor.packages() {
        check_package_name(name)?;
    }

    if descriptor.packages.is_empty() {
        warnings.push("Descriptor defines no packages".to_string());
    }
    if descriptor.script.is_empty() {
        warnings.push("Build script is empty".to_string());
    }
    if descriptor.sources.is_empty() {
        warnings.push("No sources listed".to_string());
    }

    for (name, spec) in descriptor.packages() {
        if spec.dependencies.iter().any(|d| d == name) {
            warnings.push(format!("Package {} depends on itself", name));
        }
    }

    Ok(warnings)
}
