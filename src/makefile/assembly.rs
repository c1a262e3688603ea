// src/makefile/assembly.rs

//! Package-assembly graph generation
//!
//! Produces the makefile that turns a finished build into one archive per
//! package:
//!
//! ```text
//! all: mktars
//!
//! out:
//! 	mkdir out
//! tars:
//! 	mkdir tars
//!
//! define _zlib_pkginfo =
//! NAME='zlib'
//! VERSION='1.2.11'
//! DEPENDENCIES='musl'
//! endef
//! export _zlib_pkginfo
//! out/zlib: out
//! 	mkdir out/zlib
//! out/zlib/.pkginfo: out/zlib
//! 	echo "$$_zlib_pkginfo" > out/zlib/.pkginfo
//! tars/zlib.tar.gz: tars script
//! 	tar -czf tars/zlib.tar.gz -C out/zlib .
//!
//! pkis: out/zlib/.pkginfo
//!
//! .ONESHELL:
//! script: pkis
//! 	@echo Running build script
//! 	...expanded build script...
//!
//! mktars: tars/zlib.tar.gz
//! ```
//!
//! Archives depend on `script` rather than on their own stamp: the script
//! populates every staging directory and runs after all stamps exist.
//! Packages are emitted in descriptor order, so output is byte-stable for a
//! given descriptor.

use crate::descriptor::{Descriptor, check_package_name};
use crate::error::{Error, Result};
use crate::makefile::{Makefile, Rule};
use crate::pkginfo::PkgInfo;
use crate::template::{TemplateContext, expand_script};
use std::collections::HashMap;
use tracing::{debug, info};

/// First recipe line of the `script` rule
pub const ANNOUNCEMENT: &str = "@echo Running build script";

/// Metadata stamp file written into each staging directory
pub const PKGINFO_FILE: &str = ".pkginfo";

/// Staging root holding one directory per package
pub const OUT_DIR: &str = "out";

/// Directory receiving the package archives
pub const TARS_DIR: &str = "tars";

/// Aggregate of every metadata stamp
pub const PKIS_TARGET: &str = "pkis";

/// Aggregate of every archive
pub const MKTARS_TARGET: &str = "mktars";

/// Rule running the build script
pub const SCRIPT_TARGET: &str = "script";

/// Exported variable carrying a package's metadata
///
/// Characters that cannot appear in a shell identifier become `_`.
pub fn pkginfo_variable(package: &str) -> String {
    let ident: String = package
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    format!("_{}_pkginfo", ident)
}

/// Staging directory of a package
pub fn package_dir(package: &str) -> String {
    format!("{}/{}", OUT_DIR, package)
}

/// Metadata stamp path of a package
pub fn stamp_path(package: &str) -> String {
    format!("{}/{}/{}", OUT_DIR, package, PKGINFO_FILE)
}

/// Archive path of a package
pub fn archive_path(package: &str) -> String {
    format!("{}/{}.tar.gz", TARS_DIR, package)
}

/// Generate the package-assembly graph for a descriptor
///
/// Fails without producing anything on an invalid version, unsafe package
/// name or metadata value, or a malformed build script.
pub fn generate_assembly(descriptor: &Descriptor) -> Result<Makefile> {
    let version = descriptor.canonical_version()?;
    info!(
        "Generating assembly graph for {} package(s) at version {}",
        descriptor.packages.len(),
        version
    );

    let mut variables: HashMap<String, &str> = HashMap::new();
    for (name, _) in descriptor.packages() {
        check_package_name(name)?;
        if let Some(other) = variables.insert(pkginfo_variable(name), name) {
            return Err(Error::InvalidDescriptor(format!(
                "Packages {} and {} map to the same metadata variable",
                other, name
            )));
        }
    }

    // Expand the script before emitting anything so template errors abort
    // generation with no graph at all
    let ctx = TemplateContext::new(descriptor, &version);
    let script = expand_script(&descriptor.script, &ctx)?;
    debug!(
        "Build script expanded from {} to {} line(s)",
        descriptor.script.len(),
        script.len()
    );

    let mut mk = Makefile::new();
    mk.rule(Rule::new("all").depends_on(MKTARS_TARGET))
        .blank()
        .rule(Rule::new(OUT_DIR).run(format!("mkdir {}", OUT_DIR)))
        .rule(Rule::new(TARS_DIR).run(format!("mkdir {}", TARS_DIR)))
        .blank();

    let mut stamps = Vec::with_capacity(descriptor.packages.len());
    let mut archives = Vec::with_capacity(descriptor.packages.len());

    for (name, spec) in descriptor.packages() {
        debug!("Emitting rules for {} ({} dependencies)", name, spec.dependencies.len());

        let variable = pkginfo_variable(name);
        let info = PkgInfo::new(name, &version, &spec.dependencies).to_shell()?;
        let dir = package_dir(name);
        let stamp = stamp_path(name);
        let archive = archive_path(name);

        mk.define(&variable, info)
            .export(&variable)
            .rule(
                Rule::new(&dir)
                    .depends_on(OUT_DIR)
                    .run(format!("mkdir {}", dir)),
            )
            .rule(
                Rule::new(&stamp)
                    .depends_on(&dir)
                    .run(format!("echo \"$${}\" > {}", variable, stamp)),
            )
            .rule(
                Rule::new(&archive)
                    .depends_on(TARS_DIR)
                    .depends_on(SCRIPT_TARGET)
                    .run(format!("tar -czf {} -C {} .", archive, dir)),
            )
            .blank();

        stamps.push(stamp);
        archives.push(archive);
    }

    mk.rule(Rule::new(PKIS_TARGET).depends_on_all(stamps))
        .blank()
        .directive(".ONESHELL")
        .rule(
            Rule::new(SCRIPT_TARGET)
                .depends_on(PKIS_TARGET)
                .run(ANNOUNCEMENT)
                .run_all(script),
        )
        .blank()
        .rule(Rule::new(MKTARS_TARGET).depends_on_all(archives));

    Ok(mk)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{PackageSpec, parse_descriptor};

    fn single(version: &str, script: &[&str]) -> Descriptor {
        let mut descriptor = Descriptor {
            version: version.to_string(),
            script: script.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        };
        descriptor.packages.insert("p".to_string(), PackageSpec::default());
        descriptor
    }

    #[test]
    fn test_pkginfo_variable() {
        assert_eq!(pkginfo_variable("zlib"), "_zlib_pkginfo");
        assert_eq!(pkginfo_variable("zlib-dev"), "_zlib_dev_pkginfo");
        assert_eq!(pkginfo_variable("libstdc++"), "_libstdc___pkginfo");
    }

    #[test]
    fn test_single_package_empty_script() {
        let mk = generate_assembly(&single("1.0.0", &[])).unwrap();
        let text = mk.render();

        assert!(text.starts_with("all: mktars\n"));
        assert!(text.contains("tars/p.tar.gz: tars script\n"));
        assert!(text.contains("out/p/.pkginfo: out/p\n\techo \"$$_p_pkginfo\" > out/p/.pkginfo\n"));
        assert!(text.contains(".ONESHELL:\nscript: pkis\n\t@echo Running build script\n\n"));
        assert!(text.ends_with("mktars: tars/p.tar.gz\n"));

        let script = mk.find_rule("script").unwrap();
        assert_eq!(script.recipe, vec![ANNOUNCEMENT]);
    }

    #[test]
    fn test_exact_output() {
        let mut descriptor = single("1.0", &["{{configure \"p\"}}"]);
        descriptor
            .packages
            .insert("p-dev".to_string(), PackageSpec::with_dependencies(["p"]));

        let expected = "\
all: mktars

out:
\tmkdir out
tars:
\tmkdir tars

define _p_pkginfo =
NAME='p'
VERSION='1.0.0'
DEPENDENCIES=''
endef
export _p_pkginfo
out/p: out
\tmkdir out/p
out/p/.pkginfo: out/p
\techo \"$$_p_pkginfo\" > out/p/.pkginfo
tars/p.tar.gz: tars script
\ttar -czf tars/p.tar.gz -C out/p .

define _p_dev_pkginfo =
NAME='p-dev'
VERSION='1.0.0'
DEPENDENCIES='p'
endef
export _p_dev_pkginfo
out/p-dev: out
\tmkdir out/p-dev
out/p-dev/.pkginfo: out/p-dev
\techo \"$$_p_dev_pkginfo\" > out/p-dev/.pkginfo
tars/p-dev.tar.gz: tars script
\ttar -czf tars/p-dev.tar.gz -C out/p-dev .

pkis: out/p/.pkginfo out/p-dev/.pkginfo

.ONESHELL:
script: pkis
\t@echo Running build script
\t(cd p && ./configure)

mktars: tars/p.tar.gz tars/p-dev.tar.gz
";
        assert_eq!(generate_assembly(&descriptor).unwrap().render(), expected);
    }

    #[test]
    fn test_no_dangling_prerequisites() {
        let descriptor = parse_descriptor(
            "version: 2.0.0\npackages:\n  a:\n  b:\n    dependencies: [a, external]\n  c:\n",
        )
        .unwrap();
        let mk = generate_assembly(&descriptor).unwrap();
        assert!(mk.dangling_prerequisites().is_empty());
    }

    #[test]
    fn test_invalid_version() {
        assert!(matches!(
            generate_assembly(&single("one.two", &[])),
            Err(Error::InvalidVersion { .. })
        ));
    }

    #[test]
    fn test_unknown_function() {
        assert!(matches!(
            generate_assembly(&single("1.0.0", &["{{bogus}}"])),
            Err(Error::UnknownFunction { .. })
        ));
    }

    #[test]
    fn test_non_string_configure_flag() {
        let mut descriptor = single("1.0.0", &["{{configure \".\"}}"]);
        descriptor.data.insert(
            "configure".to_string(),
            crate::descriptor::AuxValue::List(vec![crate::descriptor::AuxValue::Integer(1)]),
        );
        assert!(matches!(
            generate_assembly(&descriptor),
            Err(Error::ConfigureFlag { index: 0, .. })
        ));
    }

    #[test]
    fn test_unsafe_dependency() {
        let mut descriptor = single("1.0.0", &[]);
        descriptor
            .packages
            .insert("q".to_string(), PackageSpec::with_dependencies(["$(evil)"]));
        assert!(matches!(
            generate_assembly(&descriptor),
            Err(Error::UnsafeValue { .. })
        ));
    }

    #[test]
    fn test_variable_collision() {
        let mut descriptor = single("1.0.0", &[]);
        descriptor.packages.insert("a-b".to_string(), PackageSpec::default());
        descriptor.packages.insert("a.b".to_string(), PackageSpec::default());
        assert!(matches!(
            generate_assembly(&descriptor),
            Err(Error::InvalidDescriptor(_))
        ));
    }

    #[test]
    fn test_unsafe_package_name() {
        let mut descriptor = single("1.0.0", &[]);
        descriptor.packages.insert("a b".to_string(), PackageSpec::default());
        assert!(generate_assembly(&descriptor).is_err());
    }

    #[test]
    fn test_redirect_and_archive_member_names_rejected() {
        for name in ["a>b", "a(b)"] {
            let mut descriptor = single("1.0.0", &[]);
            descriptor.packages.insert(name.to_string(), PackageSpec::default());
            assert!(matches!(
                generate_assembly(&descriptor),
                Err(Error::InvalidDescriptor(_))
            ));
        }
    }
}
