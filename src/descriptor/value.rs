// src/descriptor/value.rs

//! Free-form auxiliary data attached to a descriptor
//!
//! The `data` section of a descriptor is an open map consumed only by
//! template functions. Values keep their YAML shape and are projected to
//! the type a consumer needs through fallible accessors.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A structured auxiliary value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuxValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<AuxValue>),
    Map(IndexMap<String, AuxValue>),
}

impl AuxValue {
    /// Human-readable name of the value's shape, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "a boolean",
            Self::Integer(_) => "an integer",
            Self::Float(_) => "a float",
            Self::String(_) => "a string",
            Self::List(_) => "a list",
            Self::Map(_) => "a map",
        }
    }

    /// Project to a string slice
    pub fn as_str(&self, key: &str) -> Result<&str> {
        match self {
            Self::String(s) => Ok(s),
            other => Err(Error::AuxType {
                key: key.to_string(),
                expected: "a string",
                found: other.kind(),
            }),
        }
    }

    /// Project to a list of values
    ///
    /// `Null` projects to an empty list, matching an absent YAML entry.
    pub fn as_list(&self, key: &str) -> Result<&[AuxValue]> {
        match self {
            Self::List(items) => Ok(items),
            Self::Null => Ok(&[]),
            other => Err(Error::AuxType {
                key: key.to_string(),
                expected: "a list",
                found: other.kind(),
            }),
        }
    }

    /// Render a scalar for diagnostics
    pub fn describe(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Bool(b) => format!("boolean {}", b),
            Self::Integer(i) => format!("integer {}", i),
            Self::Float(x) => format!("float {}", x),
            Self::String(s) => format!("string '{}'", s),
            Self::List(items) => format!("list of {} item(s)", items.len()),
            Self::Map(map) => format!("map of {} entr(ies)", map.len()),
        }
    }
}

/// Project an optional entry to a list of strings
///
/// A missing entry yields an empty list. Any non-string element fails with
/// the element's index so the offending flag can be located.
pub fn string_list<'a>(value: Option<&'a AuxValue>, key: &str) -> Result<Vec<&'a str>> {
    let Some(value) = value else {
        return Ok(Vec::new());
    };

    value
        .as_list(key)?
        .iter()
        .enumerate()
        .map(|(index, item)| match item {
            AuxValue::String(s) => Ok(s.as_str()),
            other => Err(Error::ConfigureFlag {
                index,
                found: other.describe(),
            }),
        })
        .collect()
}
