//! The compiler's output: an immutable, backend-independent filter tree.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cql_ast::{ComparisonOp, PropertyPath};
use crate::type_catalog::TypedValue;

/// A property as the predicate sees it: the logical path plus the
/// backend reference produced by alias resolution (`address01.city`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyRef {
    pub path: PropertyPath,
    pub reference: String,
}

impl PropertyRef {
    pub fn new(path: PropertyPath, reference: impl Into<String>) -> Self {
        Self {
            path,
            reference: reference.into(),
        }
    }
}

/// What an `Exists` predicate probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExistenceCheck {
    /// `exists` / `does not exist`: is the property defined on the type at all.
    PropertyDefined,
    /// `is not null` / `is null`: does the property hold a value.
    NotNull,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Predicate {
    And {
        left: Arc<Predicate>,
        right: Arc<Predicate>,
    },
    Or {
        left: Arc<Predicate>,
        right: Arc<Predicate>,
    },
    Not {
        inner: Arc<Predicate>,
    },
    Compare {
        op: ComparisonOp,
        property: PropertyRef,
        value: TypedValue,
    },
    Pattern {
        property: PropertyRef,
        pattern: String,
        case_insensitive: bool,
        requires_escape_clause: bool,
        negated: bool,
    },
    Exists {
        property: PropertyRef,
        check: ExistenceCheck,
        negated: bool,
    },
    /// Value strictly between the bounds; an absent bound leaves that side open.
    Range {
        property: PropertyRef,
        lower_exclusive: Option<TypedValue>,
        upper_exclusive: Option<TypedValue>,
    },
}

impl Predicate {
    pub fn and(left: Arc<Predicate>, right: Arc<Predicate>) -> Self {
        Predicate::And { left, right }
    }

    pub fn or(left: Arc<Predicate>, right: Arc<Predicate>) -> Self {
        Predicate::Or { left, right }
    }

    pub fn not(inner: Arc<Predicate>) -> Self {
        Predicate::Not { inner }
    }

    /// Property targeted by a leaf predicate, `None` for combinators.
    pub fn property(&self) -> Option<&PropertyRef> {
        match self {
            Predicate::And { .. } | Predicate::Or { .. } | Predicate::Not { .. } => None,
            Predicate::Compare { property, .. }
            | Predicate::Pattern { property, .. }
            | Predicate::Exists { property, .. }
            | Predicate::Range { property, .. } => Some(property),
        }
    }

    /// Number of leaf predicates in the tree (shared subtrees count once per use).
    pub fn leaf_count(&self) -> usize {
        match self {
            Predicate::And { left, right } | Predicate::Or { left, right } => {
                left.leaf_count() + right.leaf_count()
            }
            Predicate::Not { inner } => inner.leaf_count(),
            _ => 1,
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::And { left, right } => write!(f, "({} AND {})", left, right),
            Predicate::Or { left, right } => write!(f, "({} OR {})", left, right),
            Predicate::Not { inner } => write!(f, "NOT {}", inner),
            Predicate::Compare {
                op,
                property,
                value,
            } => write!(f, "{} {} {}", property.reference, op.symbol(), value),
            Predicate::Pattern {
                property,
                pattern,
                case_insensitive,
                requires_escape_clause,
                negated,
            } => {
                write!(f, "{}", property.reference)?;
                if *negated {
                    write!(f, " NOT")?;
                }
                let keyword = if *case_insensitive { "ILIKE" } else { "LIKE" };
                write!(f, " {} '{}'", keyword, pattern.replace('\'', "''"))?;
                if *requires_escape_clause {
                    write!(f, " ESCAPE '\\'")?;
                }
                Ok(())
            }
            Predicate::Exists {
                property,
                check,
                negated,
            } => match (check, negated) {
                (ExistenceCheck::PropertyDefined, false) => write!(f, "{} EXISTS", property.reference),
                (ExistenceCheck::PropertyDefined, true) => {
                    write!(f, "{} DOES-NOT-EXIST", property.reference)
                }
                (ExistenceCheck::NotNull, false) => write!(f, "{} IS NOT NULL", property.reference),
                (ExistenceCheck::NotNull, true) => write!(f, "{} IS NULL", property.reference),
            },
            Predicate::Range {
                property,
                lower_exclusive,
                upper_exclusive,
            } => match (lower_exclusive, upper_exclusive) {
                (Some(lo), Some(hi)) => write!(
                    f,
                    "({} > {} AND {} < {})",
                    property.reference, lo, property.reference, hi
                ),
                (Some(lo), None) => write!(f, "{} > {}", property.reference, lo),
                (None, Some(hi)) => write!(f, "{} < {}", property.reference, hi),
                (None, None) => write!(f, "TRUE"),
            },
        }
    }
}
