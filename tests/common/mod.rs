// tests/common/mod.rs

//! Shared test utilities and fixture descriptors for integration tests.

#![allow(dead_code)]

use pkgen::{Descriptor, parse_descriptor};
use std::path::PathBuf;
use tempfile::TempDir;

/// A multi-package descriptor exercising every build function.
pub const ZLIB: &str = r#"
version: 1.2.11
sources:
  - https://zlib.net/zlib-{{.Version}}.tar.gz
  - git://git.example.org/zlib-patches.git?checkout=v1.2
builddependencies:
  - gcc
  - make
packages:
  zlib:
    dependencies: [musl]
  zlib-dev:
    dependencies: [zlib]
  zlib-man:
script:
  - '{{extract "zlib" "gz"}}'
  - '{{configure "zlib"}}'
  - '{{make "zlib" "all" "install"}}'
  - '{{pkmv "usr/include/" "zlib" "zlib-dev"}}'
  - '{{pkmv "usr/lib/libz.a" "zlib" "zlib-dev"}}'
  - '{{mvman "zlib"}}'
  - 'echo built for {{confarch}}'
data:
  configure:
    - --prefix=/usr
    - --shared
"#;

/// The smallest descriptor that produces an archive.
pub const MINIMAL: &str = "version: 1.0.0\npackages:\n  p:\n";

/// Parse a fixture, panicking on failure.
pub fn descriptor(yaml: &str) -> Descriptor {
    parse_descriptor(yaml).unwrap()
}

/// Write a descriptor fixture into a fresh temporary directory.
///
/// Returns (TempDir, path) - keep the TempDir alive to prevent cleanup.
pub fn write_descriptor(yaml: &str) -> (TempDir, PathBuf) {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("pkgen.yaml");
    std::fs::write(&path, yaml).unwrap();
    (temp_dir, path)
}
