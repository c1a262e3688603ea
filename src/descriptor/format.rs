// src/descriptor/format.rs

//! Descriptor file format definitions
//!
//! Descriptors are YAML documents that describe one build: the packages it
//! produces, their shared version, the sources to fetch and the build script
//! that populates every package's output directory.

use crate::descriptor::value::AuxValue;
use crate::error::Result;
use crate::version::PackageVersion;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// Builder image used when the descriptor does not name one
pub const DEFAULT_BUILDER: &str = "alpine";

/// A complete package-build descriptor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Descriptor {
    /// Version shared by every package in this descriptor
    pub version: String,

    /// Packages produced by the build, in document order
    #[serde(default, deserialize_with = "deserialize_packages")]
    pub packages: IndexMap<String, PackageSpec>,

    /// Source locations (template text, expanded before fetching)
    #[serde(default)]
    pub sources: Vec<String>,

    /// Build script lines, in execution order, before template expansion
    #[serde(default)]
    pub script: Vec<String>,

    /// Packages installed into the build environment image
    #[serde(default, rename = "builddependencies", alias = "buildDependencies")]
    pub build_dependencies: Vec<String>,

    /// Builder image flavour
    #[serde(default)]
    pub builder: Option<String>,

    /// Auxiliary parameters consumed by template functions
    #[serde(default, rename = "data", alias = "auxData")]
    pub data: IndexMap<String, AuxValue>,
}

impl Descriptor {
    /// Parse the shared version into its canonical form
    pub fn canonical_version(&self) -> Result<PackageVersion> {
        PackageVersion::parse(&self.version)
    }

    /// Builder image flavour, defaulting to alpine
    pub fn builder(&self) -> &str {
        self.builder
            .as_deref()
            .filter(|b| !b.is_empty())
            .unwrap_or(DEFAULT_BUILDER)
    }

    /// Iterate packages in document order
    pub fn packages(&self) -> impl Iterator<Item = (&str, &PackageSpec)> {
        self.packages.iter().map(|(name, spec)| (name.as_str(), spec))
    }
}

/// One package produced by a descriptor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSpec {
    /// Install-time dependencies, in order
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl PackageSpec {
    /// Create a package with the given dependencies
    pub fn with_dependencies<I, S>(dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            dependencies: dependencies.into_iter().map(Into::into).collect(),
        }
    }
}

/// Accept `name:` with no body as a package without dependencies
fn deserialize_packages<'de, D>(deserializer: D) -> std::result::Result<IndexMap<String, PackageSpec>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<IndexMap<String, Option<PackageSpec>>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(name, spec)| (name, spec.unwrap_or_default()))
        .collect())
}
