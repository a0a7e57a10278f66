//! Property types of the filtered objects, and the resolver contract the
//! predicate compiler consumes.
//!
//! The compiler never inspects types itself: it asks a `PropertyTypeResolver`
//! what a property path resolves to and to coerce literal text into that
//! type. `TypeCatalog` is the resolver shipped with the crate, built from a
//! YAML description of entity types.

pub mod catalog;
pub mod coercion;
pub mod errors;

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::cql_ast::PropertyPath;

pub use catalog::{EntityType, TypeCatalog};
pub use coercion::{coerce_literal, parse_instant};
pub use errors::{CatalogError, ResolveError};

/// Declared type of a property.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    Text,
    Integer,
    Float,
    Boolean,
    Timestamp,
    /// Association to another entity type. Only valid as a non-terminal path segment.
    Entity(String),
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyType::Text => write!(f, "text"),
            PropertyType::Integer => write!(f, "integer"),
            PropertyType::Float => write!(f, "float"),
            PropertyType::Boolean => write!(f, "boolean"),
            PropertyType::Timestamp => write!(f, "timestamp"),
            PropertyType::Entity(name) => write!(f, "entity {}", name),
        }
    }
}

/// A literal after coercion into its property's type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum TypedValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Timestamp(NaiveDateTime),
}

impl TypedValue {
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            TypedValue::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
            TypedValue::Integer(i) => write!(f, "{}", i),
            TypedValue::Float(x) => write!(f, "{}", x),
            TypedValue::Boolean(b) => write!(f, "{}", b),
            TypedValue::Timestamp(ts) => write!(f, "'{}'", ts.format("%Y-%m-%dT%H:%M:%S")),
        }
    }
}

/// Resolves property paths against a target type and coerces literals.
///
/// Implementations must be read-only: one resolver is shared by every
/// compilation, possibly from several threads.
#[cfg_attr(test, mockall::automock)]
pub trait PropertyTypeResolver: Send + Sync {
    /// Declared type of `path` on `root_type`, or `ResolveError::UnknownProperty`.
    fn resolve_path_type(&self, root_type: &str, path: &PropertyPath) -> Result<PropertyType, ResolveError>;

    /// Coerce literal text into `property_type`.
    fn coerce(&self, text: &str, property_type: &PropertyType) -> Result<TypedValue, ResolveError> {
        coerce_literal(text, property_type)
    }
}
