// src/lib.rs

//! pkgen - package build descriptor compiler
//!
//! Turns a YAML package build descriptor into the artifacts a build runner
//! executes:
//!
//! - the package-assembly makefile (staging directories, metadata stamps,
//!   the expanded build script and one archive per package)
//! - the source-fetch makefile (one download rule per source)
//! - the build-environment image descriptor
//!
//! # Architecture
//!
//! - Single offline pass: parse, validate, generate in memory, render
//! - Deterministic: packages keep document order, output is byte-stable
//! - Fail-fast: any error aborts before output exists

pub mod descriptor;
pub mod dockerfile;
mod error;
pub mod makefile;
pub mod pkginfo;
pub mod template;
pub mod version;

pub use descriptor::{
    AuxValue, Descriptor, PackageSpec, parse_descriptor, parse_descriptor_file,
    validate_descriptor,
};
pub use dockerfile::render_dockerfile;
pub use error::{Error, Result};
pub use makefile::{Makefile, Rule, generate_assembly, generate_sources};
pub use pkginfo::PkgInfo;
pub use template::{Template, TemplateContext, expand_script, expand_text};
pub use version::PackageVersion;
