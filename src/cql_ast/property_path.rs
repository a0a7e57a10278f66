use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::LiteralError;

/// A dotted reference to a property of the target type, e.g. `address.street.number`.
///
/// Always holds at least one segment and never an empty one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PropertyPath {
    segments: Vec<String>,
}

impl PropertyPath {
    pub fn new<S: Into<String>>(segments: impl IntoIterator<Item = S>) -> Result<Self, LiteralError> {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(LiteralError::EmptyPropertyPath);
        }
        if segments.iter().any(|s| s.trim().is_empty()) {
            return Err(LiteralError::EmptyPathSegment {
                path: segments.join("."),
            });
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Paths are never empty; provided for clippy's `len_without_is_empty`.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn is_compound(&self) -> bool {
        self.segments.len() > 1
    }

    pub fn last(&self) -> &str {
        // Non-empty by construction
        &self.segments[self.segments.len() - 1]
    }

    /// All segments except the last one (empty for a single-segment path).
    pub fn parent_segments(&self) -> &[String] {
        &self.segments[..self.segments.len() - 1]
    }
}

impl FromStr for PropertyPath {
    type Err = LiteralError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(LiteralError::EmptyPropertyPath);
        }
        Self::new(trimmed.split('.').map(str::trim))
    }
}

impl TryFrom<String> for PropertyPath {
    type Error = LiteralError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PropertyPath> for String {
    fn from(path: PropertyPath) -> Self {
        path.to_string()
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}
