//! Error types for predicate compilation.
//!
//! Every variant is fatal: compilation stops at the first error and no
//! partial predicate is returned.

use thiserror::Error;

use crate::type_catalog::ResolveError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CompileError {
    #[error("Unknown property `{path}` on type `{root_type}`")]
    UnknownProperty { root_type: String, path: String },

    #[error("Cannot coerce `{text}` to {expected}: {reason}")]
    TypeCoercion {
        text: String,
        expected: String,
        reason: String,
    },

    #[error("Unsupported literal form: {0}")]
    UnsupportedLiteralForm(String),

    #[error("Malformed AST at node {node}: {message}")]
    MalformedAst { node: usize, message: String },

    #[error("Expression nesting exceeds the configured limit of {limit}")]
    ExpressionTooDeep { limit: u32 },
}

impl From<ResolveError> for CompileError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::UnknownProperty { root_type, path } => {
                CompileError::UnknownProperty { root_type, path }
            }
            ResolveError::TypeCoercion {
                text,
                expected,
                reason,
            } => CompileError::TypeCoercion {
                text,
                expected,
                reason,
            },
        }
    }
}

impl CompileError {
    pub(crate) fn malformed(node: crate::cql_ast::NodeId, message: impl Into<String>) -> Self {
        CompileError::MalformedAst {
            node: node.index(),
            message: message.into(),
        }
    }
}
