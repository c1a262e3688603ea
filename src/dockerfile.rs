// src/dockerfile.rs

//! Build-environment image descriptor
//!
//! The build runs inside an image derived from the builder base image for
//! the target architecture, with the descriptor's build dependencies
//! installed on top.

use crate::descriptor::Descriptor;
use crate::error::{Error, Result};
use tracing::debug;

/// Architecture used when none is requested
pub const DEFAULT_ARCH: &str = "x86_64";

/// Repository of the builder base images
pub const BUILDER_IMAGE: &str = "panux/builder";

/// Image tag components may only hold these characters
fn check_tag_component(field: &'static str, value: &str) -> Result<()> {
    let valid = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));
    if valid {
        Ok(())
    } else {
        Err(Error::UnsafeValue {
            field,
            value: value.to_string(),
        })
    }
}

/// Render the image descriptor for a descriptor and target architecture
pub fn render_dockerfile(descriptor: &Descriptor, arch: &str) -> Result<String> {
    let builder = descriptor.builder();
    check_tag_component("builder", builder)?;
    check_tag_component("arch", arch)?;

    for dependency in &descriptor.build_dependencies {
        if dependency.is_empty() || dependency.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(Error::UnsafeValue {
                field: "build dependency",
                value: dependency.clone(),
            });
        }
    }

    debug!(
        "Builder image {}:{}-{} with {} build dependencies",
        BUILDER_IMAGE,
        builder,
        arch,
        descriptor.build_dependencies.len()
    );

    Ok(format!(
        "FROM {}:{}-{}\n\nRUN /scripts/install.sh {}\n",
        BUILDER_IMAGE,
        builder,
        arch,
        descriptor.build_dependencies.join(" ")
    ))
}
