// src/makefile/sources.rs

//! Source-fetch graph generation
//!
//! One rule per source location, chosen by URL scheme:
//!
//! - `https://` / `http://` - download with `wget`
//! - `git://` - clone, optionally at the ref given by `?checkout=<ref>`
//! - `file://` - copy from the local filesystem
//!
//! Source locations are template text, so `{{.Version}}` can appear in them.

use crate::descriptor::Descriptor;
use crate::error::{Error, Result};
use crate::makefile::{Makefile, Rule};
use crate::template::{TemplateContext, expand_text};
use tracing::{debug, info};
use url::Url;

/// Aggregate target of every fetched source
pub const SOURCES_TARGET: &str = "sources";

/// How a single source is fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetch {
    Download { url: String },
    GitClone { url: String, checkout: Option<String> },
    Copy { path: String },
}

/// A resolved source location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    /// File or directory name the source is fetched to
    pub name: String,
    pub fetch: Fetch,
}

impl Source {
    /// Resolve an expanded source location
    pub fn parse(location: &str) -> Result<Self> {
        let mut url = Url::parse(location)
            .map_err(|e| Error::ParseError(format!("Invalid source URL '{}': {}", location, e)))?;

        let file_name = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                Error::ParseError(format!("Source URL '{}' does not name a file", location))
            })?;

        let source = match url.scheme() {
            "https" | "http" => Self {
                name: file_name,
                fetch: Fetch::Download {
                    url: url.to_string(),
                },
            },
            "git" => {
                let name = file_name
                    .strip_suffix(".git")
                    .unwrap_or(&file_name)
                    .to_string();
                let checkout = url
                    .query_pairs()
                    .find(|(key, _)| key == "checkout")
                    .map(|(_, value)| value.into_owned())
                    .filter(|value| !value.is_empty());
                if checkout.is_some() {
                    url.set_query(None);
                }
                Self {
                    name,
                    fetch: Fetch::GitClone {
                        url: url.to_string(),
                        checkout,
                    },
                }
            }
            "file" => {
                let path = url.to_file_path().map_err(|()| {
                    Error::ParseError(format!("Source URL '{}' is not a local path", location))
                })?;
                Self {
                    name: file_name,
                    fetch: Fetch::Copy {
                        path: path.display().to_string(),
                    },
                }
            }
            other => return Err(Error::UnsupportedScheme(other.to_string())),
        };

        Ok(source)
    }

    /// The rule fetching this source
    pub fn rule(&self) -> Rule {
        let recipe = match &self.fetch {
            Fetch::Download { url } => format!("wget {} -O {}", url, self.name),
            Fetch::GitClone {
                url,
                checkout: Some(checkout),
            } => format!("git clone -b {} {} {}", checkout, url, self.name),
            Fetch::GitClone { url, checkout: None } => format!("git clone {} {}", url, self.name),
            Fetch::Copy { path } => format!("cp -r {} {}", path, self.name),
        };
        Rule::new(&self.name).run(recipe)
    }
}

/// Generate the source-fetch graph for a descriptor
pub fn generate_sources(descriptor: &Descriptor) -> Result<Makefile> {
    let version = descriptor.canonical_version()?;
    let ctx = TemplateContext::new(descriptor, &version);
    info!("Generating source graph for {} source(s)", descriptor.sources.len());

    let mut mk = Makefile::new();
    mk.rule(Rule::new("all").depends_on(SOURCES_TARGET)).blank();

    let mut names = Vec::with_capacity(descriptor.sources.len());
    for location in &descriptor.sources {
        let expanded = expand_text(location, &ctx)?;
        let source = Source::parse(&expanded)?;
        debug!("Source {} -> {}", expanded, source.name);

        if names.contains(&source.name) {
            return Err(Error::InvalidDescriptor(format!(
                "Two sources fetch to the same name: {}",
                source.name
            )));
        }
        mk.rule(source.rule());
        names.push(source.name);
    }

    mk.rule(Rule::new(SOURCES_TARGET).depends_on_all(names));
    Ok(mk)
}
