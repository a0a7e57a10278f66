//! # Type Catalog Error Types
//!
//! Two families live here:
//!
//! - **`ResolveError`**: raised through the `PropertyTypeResolver` contract
//!   while a predicate is being compiled (unknown property, literal that does
//!   not fit the property type).
//! - **`CatalogError`**: raised while loading or validating a catalog
//!   description (file I/O, YAML, dangling entity references).

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ResolveError {
    #[error("Unknown property `{path}` on type `{root_type}`")]
    UnknownProperty { root_type: String, path: String },

    #[error("Cannot coerce `{text}` to {expected}: {reason}")]
    TypeCoercion {
        text: String,
        expected: String,
        reason: String,
    },
}

impl ResolveError {
    pub fn coercion(text: &str, expected: impl ToString, reason: impl ToString) -> Self {
        ResolveError::TypeCoercion {
            text: text.to_string(),
            expected: expected.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogError {
    #[error("Failed to read catalog file: {error}")]
    ConfigReadError { error: String },

    #[error("Failed to parse catalog: {error}")]
    ConfigParseError { error: String },

    #[error("Property `{entity}.{property}` references undeclared entity `{target}`")]
    UnknownEntityReference {
        entity: String,
        property: String,
        target: String,
    },

    #[error("Entity `{entity}` declares an empty property name")]
    EmptyPropertyName { entity: String },
}
