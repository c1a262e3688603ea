// src/template/functions.rs

//! Build-script template functions
//!
//! Each function expands to one or more shell lines that run inside the
//! generated `script` rule. Paths are relative to the build directory,
//! where `src/` holds fetched sources and `out/<package>/` is the staging
//! root of each package.
//!
//! | Function | Expansion |
//! |---|---|
//! | `make dir args...` | `$(MAKE) -C dir arg` per argument |
//! | `extract name ext` | unpack `src/name-version.tar.ext`, rename to `name` |
//! | `pkmv file src dest` | move `file` from package `src` to package `dest` |
//! | `mvman pkg` | split `usr/share/man` into `pkg-man` |
//! | `configure dir` | run `./configure` in `dir` with `data.configure` flags |
//! | `confarch` | host architecture, resolved when the rule runs |

use crate::descriptor::{check_package_name, string_list};
use crate::error::{Error, Result};
use crate::template::TemplateContext;
use std::fmt;

/// Expansion handler: evaluated arguments in, shell lines out
pub type Handler = fn(&TemplateContext<'_>, &[String]) -> Result<Vec<String>>;

/// A set of functions available to a template
pub type FunctionTable = &'static [TemplateFunction];

/// Number of arguments a function accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
}

impl Arity {
    fn accepts(self, count: usize) -> bool {
        match self {
            Self::Exact(n) => count == n,
            Self::AtLeast(n) => count >= n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(n) => write!(f, "{}", n),
            Self::AtLeast(n) => write!(f, "at least {}", n),
        }
    }
}

/// A named template function
#[derive(Debug)]
pub struct TemplateFunction {
    pub name: &'static str,
    pub arity: Arity,
    pub summary: &'static str,
    handler: Handler,
}

impl TemplateFunction {
    pub(crate) fn check_arity(&self, count: usize) -> Result<()> {
        if self.arity.accepts(count) {
            Ok(())
        } else {
            Err(Error::Arity {
                name: self.name,
                expected: self.arity.to_string(),
                found: count,
            })
        }
    }

    /// Expand a call with already-evaluated arguments
    pub fn expand(&self, ctx: &TemplateContext<'_>, args: &[String]) -> Result<Vec<String>> {
        self.check_arity(args.len())?;
        (self.handler)(ctx, args)
    }
}

/// Functions available to build scripts
pub static BUILD_FUNCTIONS: &[TemplateFunction] = &[
    TemplateFunction {
        name: "make",
        arity: Arity::AtLeast(1),
        summary: "run make in a directory once per target",
        handler: make,
    },
    TemplateFunction {
        name: "extract",
        arity: Arity::Exact(2),
        summary: "unpack a versioned source tarball",
        handler: extract,
    },
    TemplateFunction {
        name: "pkmv",
        arity: Arity::Exact(3),
        summary: "move a file between package staging roots",
        handler: pkmv,
    },
    TemplateFunction {
        name: "mvman",
        arity: Arity::Exact(1),
        summary: "split man pages into a -man package",
        handler: mvman,
    },
    TemplateFunction {
        name: "configure",
        arity: Arity::Exact(1),
        summary: "run ./configure with the descriptor's flags",
        handler: configure,
    },
    TemplateFunction {
        name: "confarch",
        arity: Arity::Exact(0),
        summary: "host architecture, resolved at build time",
        handler: confarch,
    },
];

/// No functions; used for source URLs
pub static NO_FUNCTIONS: &[TemplateFunction] = &[];

/// Look up a function by name
pub fn lookup(table: FunctionTable, name: &str) -> Option<&'static TemplateFunction> {
    table.iter().find(|f| f.name == name)
}

fn make(_ctx: &TemplateContext<'_>, args: &[String]) -> Result<Vec<String>> {
    let (dir, targets) = args.split_first().ok_or_else(|| Error::Arity {
        name: "make",
        expected: Arity::AtLeast(1).to_string(),
        found: 0,
    })?;
    Ok(targets
        .iter()
        .map(|target| format!("$(MAKE) -C {} {}", dir, target))
        .collect())
}

fn extract(ctx: &TemplateContext<'_>, args: &[String]) -> Result<Vec<String>> {
    let (name, ext) = (&args[0], &args[1]);
    let version = ctx.canonical_version;
    Ok(vec![
        format!("tar -xf src/{}-{}.tar.{}", name, version, ext),
        format!("mv {}-{} {}", name, version, name),
    ])
}

fn pkmv(_ctx: &TemplateContext<'_>, args: &[String]) -> Result<Vec<String>> {
    let (file, src, dest) = (&args[0], &args[1], &args[2]);
    check_package_name(src)?;
    check_package_name(dest)?;

    // Exactly one trailing separator names the directory itself
    let file = file.strip_suffix('/').unwrap_or(file);
    let parts = relative_components(file)?;
    let (base, dir) = parts
        .split_last()
        .ok_or_else(|| Error::InvalidDescriptor(format!("pkmv path '{}' is empty", file)))?;

    let from = format!("out/{}/{}", src, join(dir, base));
    if dir.is_empty() {
        return Ok(vec![format!("mv {} out/{}", from, dest)]);
    }

    let to = format!("out/{}/{}", dest, dir.join("/"));
    Ok(vec![format!("mkdir -p {}", to), format!("mv {} {}", from, to)])
}

fn mvman(_ctx: &TemplateContext<'_>, args: &[String]) -> Result<Vec<String>> {
    let pkg = &args[0];
    check_package_name(pkg)?;
    Ok(vec![
        format!("mkdir -p out/{}-man/usr/share", pkg),
        format!("mv out/{}/usr/share/man out/{}-man/usr/share/man", pkg, pkg),
    ])
}

fn configure(ctx: &TemplateContext<'_>, args: &[String]) -> Result<Vec<String>> {
    let dir = &args[0];
    let flags = string_list(ctx.data.get("configure"), "configure")?;
    let line = if flags.is_empty() {
        format!("(cd {} && ./configure)", dir)
    } else {
        format!("(cd {} && ./configure {})", dir, flags.join(" "))
    };
    Ok(vec![line])
}

fn confarch(_ctx: &TemplateContext<'_>, _args: &[String]) -> Result<Vec<String>> {
    Ok(vec!["$(shell uname -m)".to_string()])
}

/// Split a package-relative path into normal components
///
/// Leading slashes and `.` components are dropped; `..` is rejected so a
/// move can never leave the staging root.
fn relative_components(path: &str) -> Result<Vec<&str>> {
    let mut parts = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                return Err(Error::InvalidDescriptor(format!(
                    "pkmv path '{}' escapes the package directory",
                    path
                )));
            }
            normal => parts.push(normal),
        }
    }
    Ok(parts)
}

fn join(dir: &[&str], base: &str) -> String {
    if dir.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", dir.join("/"), base)
    }
}
