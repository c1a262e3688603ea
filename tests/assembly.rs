// tests/assembly.rs

//! Integration tests for package-assembly graph generation.

mod common;

use common::{MINIMAL, ZLIB, descriptor, write_descriptor};
use pkgen::makefile::Entry;
use pkgen::makefile::assembly::{ANNOUNCEMENT, archive_path, stamp_path};
use pkgen::{
    Error, PkgInfo, generate_assembly, parse_descriptor_file, validate_descriptor,
};

#[test]
fn test_output_is_deterministic() {
    let first = generate_assembly(&descriptor(ZLIB)).unwrap().render();
    for _ in 0..5 {
        assert_eq!(generate_assembly(&descriptor(ZLIB)).unwrap().render(), first);
    }
}

#[test]
fn test_packages_keep_document_order() {
    let mk = generate_assembly(&descriptor(ZLIB)).unwrap();
    let mktars = mk.find_rule("mktars").unwrap();
    assert_eq!(
        mktars.prerequisites,
        vec!["tars/zlib.tar.gz", "tars/zlib-dev.tar.gz", "tars/zlib-man.tar.gz"]
    );
}

#[test]
fn test_one_stamp_and_archive_per_package() {
    let d = descriptor(ZLIB);
    let mk = generate_assembly(&d).unwrap();

    let pkis = mk.find_rule("pkis").unwrap();
    let mktars = mk.find_rule("mktars").unwrap();
    assert_eq!(pkis.prerequisites.len(), d.packages.len());
    assert_eq!(mktars.prerequisites.len(), d.packages.len());

    for (name, _) in d.packages() {
        assert_eq!(pkis.prerequisites.iter().filter(|p| **p == stamp_path(name)).count(), 1);
        assert_eq!(mktars.prerequisites.iter().filter(|p| **p == archive_path(name)).count(), 1);

        let archive = mk.find_rule(&archive_path(name)).unwrap();
        assert!(archive.prerequisites.contains(&"script".to_string()));
    }

    assert!(mk.dangling_prerequisites().is_empty());
}

#[test]
fn test_metadata_round_trips() {
    let d = descriptor(ZLIB);
    let mk = generate_assembly(&d).unwrap();

    let infos: Vec<PkgInfo> = mk
        .entries()
        .iter()
        .filter_map(|e| match e {
            Entry::Define { value, .. } => Some(PkgInfo::from_shell(value).unwrap()),
            _ => None,
        })
        .collect();

    assert_eq!(infos.len(), 3);
    for (info, (name, spec)) in infos.iter().zip(d.packages()) {
        assert_eq!(info.name, name);
        assert_eq!(info.version, "1.2.11");
        assert_eq!(info.dependencies, spec.dependencies);
    }
    assert!(infos[2].dependencies.is_empty());
}

#[test]
fn test_version_is_canonicalized() {
    let mk = generate_assembly(&descriptor(
        "version: v2.1\npackages:\n  p:\nscript:\n  - '{{extract \"p\" \"xz\"}}'\n",
    ))
    .unwrap();
    let text = mk.render();

    assert!(text.contains("VERSION='2.1.0'"));
    assert!(text.contains("\ttar -xf src/p-2.1.0.tar.xz\n\tmv p-2.1.0 p\n"));
}

#[test]
fn test_script_expansion() {
    let mk = generate_assembly(&descriptor(ZLIB)).unwrap();
    let script = mk.find_rule("script").unwrap();

    assert_eq!(
        script.recipe,
        vec![
            ANNOUNCEMENT,
            "tar -xf src/zlib-1.2.11.tar.gz",
            "mv zlib-1.2.11 zlib",
            "(cd zlib && ./configure --prefix=/usr --shared)",
            "$(MAKE) -C zlib all",
            "$(MAKE) -C zlib install",
            "mkdir -p out/zlib-dev/usr",
            "mv out/zlib/usr/include out/zlib-dev/usr",
            "mkdir -p out/zlib-dev/usr/lib",
            "mv out/zlib/usr/lib/libz.a out/zlib-dev/usr/lib",
            "mkdir -p out/zlib-man/usr/share",
            "mv out/zlib/usr/share/man out/zlib-man/usr/share/man",
            "echo built for $(shell uname -m)",
        ]
    );
    assert_eq!(script.prerequisites, vec!["pkis"]);
}

#[test]
fn test_oneshell_precedes_script() {
    let text = generate_assembly(&descriptor(MINIMAL)).unwrap().render();
    assert!(text.contains(".ONESHELL:\nscript: pkis\n\t@echo Running build script\n"));
}

#[test]
fn test_unknown_function_aborts() {
    let result = generate_assembly(&descriptor(
        "version: 1.0.0\npackages:\n  p:\nscript:\n  - echo start\n  - '{{frobnicate \"x\"}}'\n",
    ));
    assert!(matches!(
        result,
        Err(Error::UnknownFunction { ref name, line: 2 }) if name == "frobnicate"
    ));
}

#[test]
fn test_non_string_configure_flag_aborts() {
    let result = generate_assembly(&descriptor(
        "version: 1.0.0\npackages:\n  p:\nscript:\n  - '{{configure \"p\"}}'\ndata:\n  configure: [--shared, 3]\n",
    ));
    assert!(matches!(result, Err(Error::ConfigureFlag { index: 1, .. })));
}

#[test]
fn test_invalid_version_aborts() {
    let d = descriptor("version: latest\npackages:\n  p:\n");
    assert!(matches!(generate_assembly(&d), Err(Error::InvalidVersion { .. })));
    assert!(validate_descriptor(&d).is_err());
}

#[test]
fn test_descriptor_from_file() {
    let (_dir, path) = write_descriptor(ZLIB);
    let d = parse_descriptor_file(&path).unwrap();

    let warnings = validate_descriptor(&d).unwrap();
    assert!(warnings.is_empty(), "unexpected warnings: {:?}", warnings);
    assert_eq!(
        generate_assembly(&d).unwrap().render(),
        generate_assembly(&descriptor(ZLIB)).unwrap().render()
    );
}

#[test]
fn test_minimal_descriptor_warnings() {
    let warnings = validate_descriptor(&descriptor(MINIMAL)).unwrap();
    assert!(warnings.iter().any(|w| w.contains("script")));
    assert!(warnings.iter().any(|w| w.contains("sources")));
}
