// src/pkginfo.rs

//! Package metadata records
//!
//! Every package archive carries a `.pkginfo` file describing the package.
//! The file is a block of shell variable assignments so an installer can
//! source it directly:
//!
//! ```text
//! NAME='zlib-dev'
//! VERSION='1.2.11'
//! DEPENDENCIES='zlib musl'
//! ```
//!
//! Values are single-quoted and dependencies are space separated in their
//! original order. Values that cannot survive this encoding unchanged (or
//! would be expanded by the build runner when embedded in a rule file) are
//! rejected rather than escaped.

use crate::error::{Error, Result};
use crate::version::PackageVersion;

/// Characters that may not appear in any encoded value
const FORBIDDEN_CHARS: &[char] = &['\'', '"', '$', '`', '\\'];

/// Metadata describing one built package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkgInfo {
    pub name: String,
    pub version: String,
    pub dependencies: Vec<String>,
}

impl PkgInfo {
    /// Build the record for a package of a descriptor
    pub fn new(name: &str, version: &PackageVersion, dependencies: &[String]) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            dependencies: dependencies.to_vec(),
        }
    }

    /// Encode as shell variable assignments
    pub fn to_shell(&self) -> Result<String> {
        check_value("name", &self.name)?;
        check_value("version", &self.version)?;
        for dep in &self.dependencies {
            check_value("dependency", dep)?;
        }

        Ok(format!(
            "NAME='{}'\nVERSION='{}'\nDEPENDENCIES='{}'",
            self.name,
            self.version,
            self.dependencies.join(" ")
        ))
    }

    /// Decode a block produced by [`PkgInfo::to_shell`]
    ///
    /// Values follow POSIX shell word rules, so any quoting a shell would
    /// accept for a single word is understood.
    pub fn from_shell(text: &str) -> Result<Self> {
        let mut name = None;
        let mut version = None;
        let mut dependencies = Vec::new();

        for line in text.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (key, raw) = line
                .split_once('=')
                .ok_or_else(|| Error::ParseError(format!("Not an assignment: {}", line)))?;
            let words = shlex::split(raw)
                .ok_or_else(|| Error::ParseError(format!("Unbalanced quoting for {}: {}", key, raw)))?;
            let value = match words.as_slice() {
                [] => String::new(),
                [word] => word.clone(),
                _ => {
                    return Err(Error::ParseError(format!(
                        "Value for {} is not a single shell word: {}",
                        key, raw
                    )));
                }
            };

            match key {
                "NAME" => name = Some(value),
                "VERSION" => version = Some(value),
                "DEPENDENCIES" => {
                    dependencies = value.split_whitespace().map(str::to_string).collect();
                }
                other => {
                    return Err(Error::ParseError(format!("Unknown pkginfo field: {}", other)));
                }
            }
        }

        Ok(Self {
            name: name.ok_or_else(|| Error::ParseError("pkginfo is missing NAME".to_string()))?,
            version: version
                .ok_or_else(|| Error::ParseError("pkginfo is missing VERSION".to_string()))?,
            dependencies,
        })
    }
}

fn check_value(field: &'static str, value: &str) -> Result<()> {
    let unsafe_char = |c: char| c.is_whitespace() || c.is_control() || FORBIDDEN_CHARS.contains(&c);
    if value.is_empty() || value.chars().any(unsafe_char) {
        return Err(Error::UnsafeValue {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}
