// src/makefile/mod.rs

//! Build graphs rendered as makefile text
//!
//! Generators first assemble a [`Makefile`] value (rules, variable
//! definitions and directives in emission order) and render it in one step.
//! Nothing is written until generation has fully succeeded.
//!
//! Two graphs are produced from a descriptor:
//!
//! - the package-assembly graph ([`assembly`]): staging directories,
//!   metadata stamps, the build script and one archive per package
//! - the source-fetch graph ([`sources`]): one download rule per source

pub mod assembly;
pub mod sources;

pub use assembly::generate_assembly;
pub use sources::generate_sources;

use std::collections::HashSet;
use std::fmt;

/// A rule: target, prerequisites and recipe lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub target: String,
    pub prerequisites: Vec<String>,
    pub recipe: Vec<String>,
}

impl Rule {
    /// Create a rule with no prerequisites or recipe
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            prerequisites: Vec::new(),
            recipe: Vec::new(),
        }
    }

    /// Add a prerequisite
    pub fn depends_on(mut self, prerequisite: impl Into<String>) -> Self {
        self.prerequisites.push(prerequisite.into());
        self
    }

    /// Add several prerequisites
    pub fn depends_on_all<I, S>(mut self, prerequisites: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prerequisites
            .extend(prerequisites.into_iter().map(Into::into));
        self
    }

    /// Append a recipe line
    pub fn run(mut self, line: impl Into<String>) -> Self {
        self.recipe.push(line.into());
        self
    }

    /// Append several recipe lines
    pub fn run_all<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.recipe.extend(lines.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.target)?;
        for prerequisite in &self.prerequisites {
            write!(f, " {}", prerequisite)?;
        }
        writeln!(f)?;
        for line in &self.recipe {
            writeln!(f, "\t{}", line)?;
        }
        Ok(())
    }
}

/// One element of a makefile, in emission order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// A rule
    Rule(Rule),
    /// A multi-line variable (`define NAME =` ... `endef`)
    Define { name: String, value: String },
    /// Export a variable to recipe environments
    Export(String),
    /// A special target with no prerequisites, e.g. `.ONESHELL`
    Directive(String),
    /// An empty separator line
    Blank,
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rule(rule) => fmt::Display::fmt(rule, f),
            Self::Define { name, value } => {
                writeln!(f, "define {} =", name)?;
                writeln!(f, "{}", value)?;
                writeln!(f, "endef")
            }
            Self::Export(name) => writeln!(f, "export {}", name),
            Self::Directive(name) => writeln!(f, "{}:", name),
            Self::Blank => writeln!(f),
        }
    }
}

/// An in-memory makefile
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Makefile {
    entries: Vec<Entry>,
}

impl Makefile {
    /// Create an empty makefile
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule
    pub fn rule(&mut self, rule: Rule) -> &mut Self {
        self.entries.push(Entry::Rule(rule));
        self
    }

    /// Append a `define` block
    pub fn define(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.entries.push(Entry::Define {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Append an `export` line
    pub fn export(&mut self, name: impl Into<String>) -> &mut Self {
        self.entries.push(Entry::Export(name.into()));
        self
    }

    /// Append a special-target directive
    pub fn directive(&mut self, name: impl Into<String>) -> &mut Self {
        self.entries.push(Entry::Directive(name.into()));
        self
    }

    /// Append a blank line
    pub fn blank(&mut self) -> &mut Self {
        self.entries.push(Entry::Blank);
        self
    }

    /// All entries in emission order
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// All rules in emission order
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.entries.iter().filter_map(|e| match e {
            Entry::Rule(rule) => Some(rule),
            _ => None,
        })
    }

    /// Find the rule for a target
    pub fn find_rule(&self, target: &str) -> Option<&Rule> {
        self.rules().find(|r| r.target == target)
    }

    /// Prerequisites that no rule in this makefile declares
    ///
    /// Every prerequisite of a generated graph should be a declared target;
    /// anything returned here would make the build runner fail.
    pub fn dangling_prerequisites(&self) -> Vec<&str> {
        let targets: HashSet<&str> = self.rules().map(|r| r.target.as_str()).collect();
        let mut seen = HashSet::new();
        self.rules()
            .flat_map(|r| r.prerequisites.iter())
            .map(String::as_str)
            .filter(|p| !targets.contains(p) && seen.insert(*p))
            .collect()
    }

    /// Render the makefile as text
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Makefile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            fmt::Display::fmt(entry, f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_rule() {
        let rule = Rule::new("out/p").depends_on("out").run("mkdir out/p");
        assert_eq!(rule.to_string(), "out/p: out\n\tmkdir out/p\n");
    }

    #[test]
    fn test_render_rule_without_prerequisites() {
        assert_eq!(Rule::new("out").run("mkdir out").to_string(), "out:\n\tmkdir out\n");
        assert_eq!(Rule::new("pkis").to_string(), "pkis:\n");
    }

    #[test]
    fn test_render_entries() {
        let mut mk = Makefile::new();
        mk.define("_p_pkginfo", "NAME='p'")
            .export("_p_pkginfo")
            .blank()
            .directive(".ONESHELL")
            .rule(Rule::new("all").depends_on_all(["a", "b"]));

        assert_eq!(
            mk.render(),
            "define _p_pkginfo =\nNAME='p'\nendef\nexport _p_pkginfo\n\n.ONESHELL:\nall: a b\n"
        );
    }

    #[test]
    fn test_dangling_prerequisites() {
        let mut mk = Makefile::new();
        mk.rule(Rule::new("all").depends_on("mktars"))
            .rule(Rule::new("mktars").depends_on_all(["tars/a.tar.gz", "tars/b.tar.gz"]))
            .rule(Rule::new("tars/a.tar.gz").depends_on("script"))
            .rule(Rule::new("tars/b.tar.gz").depends_on("script"));

        assert_eq!(mk.dangling_prerequisites(), vec!["script"]);

        mk.rule(Rule::new("script"));
        assert!(mk.dangling_prerequisites().is_empty());
    }

    #[test]
    fn test_find_rule() {
        let mut mk = Makefile::new();
        mk.rule(Rule::new("a").run("true")).blank();
        assert_eq!(mk.find_rule("a").unwrap().recipe, vec!["true"]);
        assert!(mk.find_rule("b").is_none());
        assert_eq!(mk.entries().len(), 2);
    }
}
