//! Error types for building AST pieces (property paths, literals).
//!
//! These errors are raised while an AST is being assembled, before any
//! compilation starts.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum LiteralError {
    #[error("Property path is empty")]
    EmptyPropertyPath,

    #[error("Property path `{path}` contains an empty segment")]
    EmptyPathSegment { path: String },

    #[error("Invalid ISO-8601 duration `{text}`")]
    InvalidDuration { text: String },

    #[error("Duration component `{component}` is out of range in `{text}`")]
    DurationOutOfRange { text: String, component: &'static str },

    #[error("Node {id} referenced by node {parent} does not exist (AST has {len} nodes)")]
    DanglingNode { id: usize, parent: usize, len: usize },
}
