// src/template/mod.rs

//! Template expansion for build scripts and source locations
//!
//! Descriptor text may contain `{{ ... }}` actions in a small subset of the
//! Go template syntax:
//!
//! - `{{.Version}}` prints the descriptor version as written
//! - `{{.Data.key}}` prints a string entry of the descriptor's `data` map
//! - `{{"text"}}` prints a literal
//! - `{{name "arg" ...}}` calls a registered function
//! - `{{/* comment */}}` prints nothing
//!
//! `{{-` and `-}}` trim whitespace on the respective side. Expansion is
//! purely textual and never touches the filesystem. The whole template is
//! parsed before anything is rendered, so an unknown function aborts the
//! run before any output exists.

pub mod functions;
mod parser;

pub use functions::{Arity, BUILD_FUNCTIONS, FunctionTable, NO_FUNCTIONS, TemplateFunction};

use crate::descriptor::{AuxValue, Descriptor};
use crate::error::{Error, Result};
use crate::version::PackageVersion;
use indexmap::IndexMap;
use parser::{Arg, Node};
use tracing::debug;

/// Values visible to template actions
#[derive(Debug, Clone, Copy)]
pub struct TemplateContext<'a> {
    /// Version as written in the descriptor
    pub version: &'a str,
    /// Canonical form of the version
    pub canonical_version: &'a PackageVersion,
    /// Auxiliary descriptor data
    pub data: &'a IndexMap<String, AuxValue>,
}

impl<'a> TemplateContext<'a> {
    /// Context for a descriptor whose version has already been canonicalised
    pub fn new(descriptor: &'a Descriptor, canonical_version: &'a PackageVersion) -> Self {
        Self {
            version: &descriptor.version,
            canonical_version,
            data: &descriptor.data,
        }
    }

    fn field(&self, path: &[String], line: usize) -> Result<String> {
        match path {
            [name] if name == "Version" => Ok(self.version.to_string()),
            [data, key] if data == "Data" => {
                let value = self.data.get(key).ok_or_else(|| Error::Template {
                    line,
                    message: format!("no data entry named '{}'", key),
                })?;
                Ok(value.as_str(key)?.to_string())
            }
            _ => Err(Error::Template {
                line,
                message: format!("can't evaluate field .{}", path.join(".")),
            }),
        }
    }

    fn eval(&self, arg: &Arg, line: usize) -> Result<String> {
        match arg {
            Arg::Literal(s) => Ok(s.clone()),
            Arg::Field(path) => self.field(path, line),
        }
    }
}

/// A parsed template
#[derive(Debug, Clone)]
pub struct Template {
    nodes: Vec<Node>,
}

impl Template {
    /// Parse template text, resolving function names against `functions`
    pub fn parse(text: &str, functions: FunctionTable) -> Result<Self> {
        Ok(Self {
            nodes: parser::parse(text, functions)?,
        })
    }

    /// Render the template against a context
    pub fn render(&self, ctx: &TemplateContext<'_>) -> Result<String> {
        let mut out = String::new();
        for node in &self.nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Value { arg, line } => out.push_str(&ctx.eval(arg, *line)?),
                Node::Call {
                    function,
                    args,
                    line,
                } => {
                    let args = args
                        .iter()
                        .map(|arg| ctx.eval(arg, *line))
                        .collect::<Result<Vec<_>>>()?;
                    let lines = function.expand(ctx, &args)?;
                    debug!("{} on line {} expanded to {} line(s)", function.name, line, lines.len());
                    out.push_str(&lines.join("\n"));
                }
            }
        }
        Ok(out)
    }
}

/// Expand a build script into shell lines
///
/// Script lines are joined, expanded with the build functions and split
/// again, so one function call may produce several lines.
pub fn expand_script(script: &[String], ctx: &TemplateContext<'_>) -> Result<Vec<String>> {
    let template = Template::parse(&script.join("\n"), BUILD_FUNCTIONS)?;
    let text = template.render(ctx)?;
    Ok(text.lines().map(str::to_string).collect())
}

/// Expand a single line of text without any functions
pub fn expand_text(text: &str, ctx: &TemplateContext<'_>) -> Result<String> {
    Template::parse(text, NO_FUNCTIONS)?.render(ctx)
}
