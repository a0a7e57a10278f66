//! Predicate Builder
//!
//! Walks a CQL `Ast` depth-first (children before parents, left before
//! right) and produces one `Predicate` bound to a target type.
//!
//! Per node kind:
//! - and / or / not → combinator over the translated children
//! - comparison → `Compare`, literal coerced through the *property's* type
//! - like / ilike and their negations → `Pattern`, negations wrapped in `Not`
//! - exists / is null and their negations → `Exists`
//! - before / after → `Compare` against a parsed instant (`<` / `>`)
//! - during → `Range` with exclusive bounds
//!
//! Compound property paths go through `AliasScope`, so `a.b.x` and `a.b.y`
//! in the same expression share the alias created for `a.b`. Any error aborts
//! the whole compilation.

pub mod alias_scope;
pub mod errors;
pub mod interval;
pub mod pattern;
pub mod predicate;
pub mod translation_cache;

use std::borrow::Cow;
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::config::{CompilerConfig, DurationToPolicy};
use crate::cql_ast::{
    Ast, CalendarDuration, ComparisonOp, ExistenceKind, LikeKind, LiteralValue, Node, NodeId,
    PropertyPath, TemporalKind, TimespanForm,
};
use crate::type_catalog::{parse_instant, PropertyType, PropertyTypeResolver, TypedValue};

pub use alias_scope::{AliasDefinition, AliasScope, AliasSink};
pub use errors::CompileError;
pub use pattern::{escape_like_pattern, EscapedPattern, ESCAPE_CHAR};
pub use predicate::{ExistenceCheck, Predicate, PropertyRef};
pub use translation_cache::TranslationCache;

/// Result type for predicate builder operations
pub type CompileResult<T> = Result<T, CompileError>;

/// A compiled filter: everything a backend adapter needs to build its query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criteria {
    pub root_type: String,
    /// Alias creations in the order they were requested (outer before inner).
    pub aliases: Vec<AliasDefinition>,
    pub predicate: Arc<Predicate>,
}

/// Compile `ast` for objects of `root_type`, collecting aliases into the result.
pub fn compile(
    ast: &Ast,
    root_type: &str,
    resolver: &dyn PropertyTypeResolver,
    config: &CompilerConfig,
) -> CompileResult<Criteria> {
    let mut aliases: Vec<AliasDefinition> = Vec::new();
    let predicate = PredicateBuilder::new(root_type, resolver, &mut aliases)
        .with_config(config)
        .build(ast)?;

    log::info!(
        "Compiled CQL filter for `{}`: {} ({} aliases)",
        root_type,
        predicate,
        aliases.len()
    );
    Ok(Criteria {
        root_type: root_type.to_string(),
        aliases,
        predicate,
    })
}

/// Single-use tree walker. `build` consumes it, so its alias scope and
/// translation cache never outlive one compilation.
pub struct PredicateBuilder<'a> {
    root_type: &'a str,
    resolver: &'a dyn PropertyTypeResolver,
    sink: &'a mut dyn AliasSink,
    max_depth: u32,
    duration_to_policy: DurationToPolicy,
    aliases: AliasScope,
    cache: TranslationCache,
}

impl<'a> PredicateBuilder<'a> {
    pub fn new(
        root_type: &'a str,
        resolver: &'a dyn PropertyTypeResolver,
        sink: &'a mut dyn AliasSink,
    ) -> Self {
        let defaults = CompilerConfig::default();
        Self {
            root_type,
            resolver,
            sink,
            max_depth: defaults.max_expression_depth,
            duration_to_policy: defaults.duration_to_policy,
            aliases: AliasScope::new(),
            cache: TranslationCache::new(),
        }
    }

    pub fn with_config(mut self, config: &CompilerConfig) -> Self {
        self.max_depth = config.max_expression_depth;
        self.duration_to_policy = config.duration_to_policy;
        self
    }

    pub fn build(mut self, ast: &Ast) -> CompileResult<Arc<Predicate>> {
        log::debug!(
            "PredicateBuilder: compiling {} nodes for `{}`",
            ast.len(),
            self.root_type
        );
        let predicate = self.translate(ast, ast.root(), 1)?;
        log::debug!(
            "PredicateBuilder: done, {} aliases, {} cache hits",
            self.aliases.len(),
            self.cache.hits()
        );
        Ok(predicate)
    }

    fn translate(&mut self, ast: &Ast, id: NodeId, depth: u32) -> CompileResult<Arc<Predicate>> {
        if depth > self.max_depth {
            return Err(CompileError::ExpressionTooDeep {
                limit: self.max_depth,
            });
        }
        if let Some(done) = self.cache.predicate(id) {
            return Ok(done);
        }

        let node = node_at(ast, id)?;
        let predicate = match node {
            Node::And { left, right } => {
                let left = self.translate(ast, *left, depth + 1)?;
                let right = self.translate(ast, *right, depth + 1)?;
                Predicate::and(left, right)
            }
            Node::Or { left, right } => {
                let left = self.translate(ast, *left, depth + 1)?;
                let right = self.translate(ast, *right, depth + 1)?;
                Predicate::or(left, right)
            }
            Node::Not { inner } => Predicate::not(self.translate(ast, *inner, depth + 1)?),
            Node::Comparison { op, attr, literal } => self.comparison(ast, *op, *attr, *literal)?,
            Node::Like { like, attr, literal } => self.pattern(ast, *like, *attr, *literal)?,
            Node::Existence { check, attr } => self.existence(ast, *check, *attr)?,
            Node::Temporal {
                temporal,
                attr,
                instant,
            } => self.temporal(ast, *temporal, *attr, *instant)?,
            Node::During { attr, timespan } => self.during(ast, *attr, *timespan)?,
            Node::Attribute { .. } | Node::Literal { .. } | Node::Timespan { .. } => {
                return Err(CompileError::malformed(
                    id,
                    format!("a {} node is not a boolean expression", node.kind_name()),
                ));
            }
        };

        log::trace!("PredicateBuilder: node {} → {}", id, predicate);
        Ok(self.cache.store_predicate(id, Arc::new(predicate)))
    }

    fn comparison(
        &mut self,
        ast: &Ast,
        op: ComparisonOp,
        attr: NodeId,
        literal: NodeId,
    ) -> CompileResult<Predicate> {
        let (property, property_type) = self.known_property(ast, attr)?;
        let value = self.coerced_literal(ast, literal, &property_type)?;
        Ok(Predicate::Compare {
            op,
            property,
            value,
        })
    }

    fn pattern(&mut self, ast: &Ast, like: LikeKind, attr: NodeId, literal: NodeId) -> CompileResult<Predicate> {
        let property = self.known_property(ast, attr)?.0;
        let raw = literal_at(ast, literal)?.text();
        let escaped = escape_like_pattern(&raw);
        let pattern = Predicate::Pattern {
            property,
            pattern: escaped.pattern,
            case_insensitive: like.is_case_insensitive(),
            requires_escape_clause: escaped.requires_escape_clause,
            negated: false,
        };
        if like.is_negated() {
            Ok(Predicate::not(Arc::new(pattern)))
        } else {
            Ok(pattern)
        }
    }

    fn temporal(
        &mut self,
        ast: &Ast,
        temporal: TemporalKind,
        attr: NodeId,
        instant: NodeId,
    ) -> CompileResult<Predicate> {
        let property = self.known_property(ast, attr)?.0;
        let instant = self.instant(ast, instant)?;
        let op = match temporal {
            TemporalKind::Before => ComparisonOp::Lt,
            TemporalKind::After => ComparisonOp::Gt,
        };
        Ok(Predicate::Compare {
            op,
            property,
            value: TypedValue::Timestamp(instant),
        })
    }

    fn existence(&mut self, ast: &Ast, check: ExistenceKind, attr: NodeId) -> CompileResult<Predicate> {
        let (check, negated) = match check {
            ExistenceKind::Exists => (ExistenceCheck::PropertyDefined, false),
            ExistenceKind::DoesNotExist => (ExistenceCheck::PropertyDefined, true),
            ExistenceKind::IsNotNull => (ExistenceCheck::NotNull, false),
            ExistenceKind::IsNull => (ExistenceCheck::NotNull, true),
        };
        // Asking whether a property is defined must not fail when it is not.
        let property = match check {
            ExistenceCheck::PropertyDefined => {
                let path = attribute_at(ast, attr)?;
                self.property_ref(path)
            }
            ExistenceCheck::NotNull => self.known_property(ast, attr)?.0,
        };
        Ok(Predicate::Exists {
            property,
            check,
            negated,
        })
    }

    fn during(&mut self, ast: &Ast, attr: NodeId, timespan: NodeId) -> CompileResult<Predicate> {
        let property = self.known_property(ast, attr)?.0;
        let form = match node_at(ast, timespan)? {
            Node::Timespan { form } => *form,
            other => {
                return Err(CompileError::malformed(
                    timespan,
                    format!("expected a timespan, found a {} node", other.kind_name()),
                ));
            }
        };

        let (lower, upper) = match form {
            TimespanForm::FromTo { from, to } => (self.instant(ast, from)?, self.instant(ast, to)?),
            TimespanForm::FromDuration { from, duration } => {
                let lower = self.instant(ast, from)?;
                let duration = duration_at(ast, duration)?;
                let upper = interval::add_duration(lower, &duration)
                    .ok_or_else(|| out_of_range(lower, '+', &duration))?;
                (lower, upper)
            }
            TimespanForm::DurationTo { duration, to } => {
                if self.duration_to_policy == DurationToPolicy::Reject {
                    return Err(CompileError::UnsupportedLiteralForm(
                        "`duration D to Y` timespans are disabled by configuration".to_string(),
                    ));
                }
                let upper = self.instant(ast, to)?;
                let duration = duration_at(ast, duration)?;
                let lower = interval::subtract_duration(upper, &duration)
                    .ok_or_else(|| out_of_range(upper, '-', &duration))?;
                (lower, upper)
            }
        };

        log::debug!(
            "PredicateBuilder: during {} → ({}, {})",
            property.reference,
            lower,
            upper
        );
        Ok(Predicate::Range {
            property,
            lower_exclusive: Some(TypedValue::Timestamp(lower)),
            upper_exclusive: Some(TypedValue::Timestamp(upper)),
        })
    }

    /// Resolve the attribute's declared type (failing on unknown paths), then its backend reference.
    fn known_property(&mut self, ast: &Ast, attr: NodeId) -> CompileResult<(PropertyRef, PropertyType)> {
        let path = attribute_at(ast, attr)?;
        let property_type = self.resolver.resolve_path_type(self.root_type, path)?;
        Ok((self.property_ref(path), property_type))
    }

    fn property_ref(&mut self, path: &PropertyPath) -> PropertyRef {
        let reference = self.aliases.resolve(path, &mut *self.sink);
        PropertyRef::new(path.clone(), reference)
    }

    fn coerced_literal(
        &mut self,
        ast: &Ast,
        literal: NodeId,
        property_type: &PropertyType,
    ) -> CompileResult<TypedValue> {
        if let Some(value) = self.cache.value(literal, property_type) {
            return Ok(value);
        }
        let text = match literal_at(ast, literal)? {
            LiteralValue::Duration(duration) => {
                return Err(CompileError::UnsupportedLiteralForm(format!(
                    "duration `{}` at node {} cannot be compared against a {} property",
                    duration, literal, property_type
                )));
            }
            LiteralValue::Text(quoted) => Cow::Owned(quoted.replace("''", "'")),
            other => other.text(),
        };
        let value = self.resolver.coerce(&text, property_type)?;
        Ok(self.cache.store_value(literal, property_type.clone(), value))
    }

    fn instant(&mut self, ast: &Ast, literal: NodeId) -> CompileResult<NaiveDateTime> {
        if let Some(TypedValue::Timestamp(ts)) = self.cache.value(literal, &PropertyType::Timestamp) {
            return Ok(ts);
        }
        let ts = match literal_at(ast, literal)? {
            LiteralValue::DateTime(text) | LiteralValue::Text(text) => parse_instant(text)?,
            other => {
                return Err(CompileError::UnsupportedLiteralForm(format!(
                    "expected a date/time literal at node {}, found {}",
                    literal,
                    other.kind_name()
                )));
            }
        };
        self.cache
            .store_value(literal, PropertyType::Timestamp, TypedValue::Timestamp(ts));
        Ok(ts)
    }
}

fn node_at(ast: &Ast, id: NodeId) -> CompileResult<&Node> {
    ast.get(id)
        .ok_or_else(|| CompileError::malformed(id, format!("no such node (AST has {} nodes)", ast.len())))
}

fn attribute_at(ast: &Ast, id: NodeId) -> CompileResult<&PropertyPath> {
    match node_at(ast, id)? {
        Node::Attribute { path } => Ok(path),
        other => Err(CompileError::malformed(
            id,
            format!("expected an attribute, found a {} node", other.kind_name()),
        )),
    }
}

fn literal_at(ast: &Ast, id: NodeId) -> CompileResult<&LiteralValue> {
    match node_at(ast, id)? {
        Node::Literal { value } => Ok(value),
        other => Err(CompileError::malformed(
            id,
            format!("expected a literal, found a {} node", other.kind_name()),
        )),
    }
}

fn duration_at(ast: &Ast, id: NodeId) -> CompileResult<CalendarDuration> {
    match literal_at(ast, id)? {
        LiteralValue::Duration(duration) => Ok(*duration),
        other => Err(CompileError::UnsupportedLiteralForm(format!(
            "expected a duration literal at node {}, found {}",
            id,
            other.kind_name()
        ))),
    }
}

fn out_of_range(base: NaiveDateTime, sign: char, duration: &CalendarDuration) -> CompileError {
    CompileError::TypeCoercion {
        text: format!("{} {} {}", base, sign, duration),
        expected: PropertyType::Timestamp.to_string(),
        reason: "result is outside the supported calendar range".to_string(),
    }
}
