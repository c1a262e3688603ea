// src/descriptor/mod.rs

//! Package-build descriptors
//!
//! A descriptor lists the packages one build produces, the version they
//! share, where their sources come from and the script that builds them.
//!
//! # Example Descriptor
//!
//! ```yaml
//! version: 1.2.11
//! packages:
//!   zlib:
//!   zlib-dev:
//!     dependencies: [zlib]
//! sources:
//!   - https://zlib.net/zlib-{{.Version}}.tar.gz
//! builddependencies: [gcc, make]
//! script:
//!   - '{{extract "zlib" "gz"}}'
//!   - '{{configure "zlib"}}'
//!   - '{{make "zlib" "all" "install DESTDIR=$(shell pwd)/out/zlib"}}'
//!   - '{{pkmv "usr/include/" "zlib" "zlib-dev"}}'
//! data:
//!   configure: [--prefix=/usr]
//! ```
//!
//! The descriptor is loaded once and never mutated by the generators.

mod format;
pub mod parser;
mod value;

pub use format::{DEFAULT_BUILDER, Descriptor, PackageSpec};
pub use parser::{check_package_name, parse_descriptor, parse_descriptor_file, validate_descriptor};
pub use value::{AuxValue, string_list};
