//! CQL Criteria - predicate compiler for CQL filter expressions
//!
//! This crate turns a parsed CQL expression into a backend-independent
//! filter tree through:
//! - Property type resolution against a type catalog
//! - Literal coercion driven by the property's declared type
//! - Alias allocation for compound property paths
//! - Temporal interval computation for `during`, `before` and `after`

pub mod config;
pub mod cql_ast;
pub mod predicate_builder;
pub mod type_catalog;

pub use config::{CompilerConfig, DurationToPolicy};
pub use cql_ast::{Ast, AstBuilder, Node, NodeId, PropertyPath};
pub use predicate_builder::{compile, CompileError, Criteria, Predicate, PredicateBuilder};
pub use type_catalog::{PropertyType, PropertyTypeResolver, TypeCatalog, TypedValue};
