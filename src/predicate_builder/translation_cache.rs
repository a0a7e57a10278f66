//! Per-compilation memo of translated nodes.
//!
//! Keyed by `NodeId`, so a node reached through several parents (a DAG
//! rather than a tree) is translated once. Literal values are keyed by node
//! *and* target type: the same literal node compared against two properties
//! of different types is coerced once per type.

use std::collections::HashMap;
use std::sync::Arc;

use super::predicate::Predicate;
use crate::cql_ast::NodeId;
use crate::type_catalog::{PropertyType, TypedValue};

#[derive(Debug, Default)]
pub struct TranslationCache {
    predicates: HashMap<NodeId, Arc<Predicate>>,
    values: HashMap<(NodeId, PropertyType), TypedValue>,
    hits: usize,
}

impl TranslationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn predicate(&mut self, node: NodeId) -> Option<Arc<Predicate>> {
        let found = self.predicates.get(&node).cloned();
        if found.is_some() {
            self.hits += 1;
            log::trace!("TranslationCache: predicate hit for node {}", node);
        }
        found
    }

    pub fn store_predicate(&mut self, node: NodeId, predicate: Arc<Predicate>) -> Arc<Predicate> {
        self.predicates.insert(node, Arc::clone(&predicate));
        predicate
    }

    pub fn value(&mut self, node: NodeId, property_type: &PropertyType) -> Option<TypedValue> {
        // Tuple keys cannot be borrowed piecewise, hence the clone.
        let found = self.values.get(&(node, property_type.clone())).cloned();
        if found.is_some() {
            self.hits += 1;
            log::trace!("TranslationCache: value hit for node {} as {}", node, property_type);
        }
        found
    }

    pub fn store_value(&mut self, node: NodeId, property_type: PropertyType, value: TypedValue) -> TypedValue {
        self.values.insert((node, property_type), value.clone());
        value
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn len(&self) -> usize {
        self.predicates.len() + self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_keyed_by_type() {
        let mut cache = TranslationCache::new();
        cache.store_value(NodeId(1), PropertyType::Integer, TypedValue::Integer(5));

        assert_eq!(
            cache.value(NodeId(1), &PropertyType::Integer),
            Some(TypedValue::Integer(5))
        );
        assert_eq!(cache.value(NodeId(1), &PropertyType::Text), None);
        assert_eq!(cache.hits(), 1);
    }

    #[test]
    fn test_predicate_hit_shares_allocation() {
        let mut cache = TranslationCache::new();
        let stored = cache.store_predicate(
            NodeId(0),
            Arc::new(Predicate::Exists {
                property: crate::predicate_builder::PropertyRef::new("x".parse().unwrap(), "x"),
                check: crate::predicate_builder::ExistenceCheck::NotNull,
                negated: false,
            }),
        );
        let hit = cache.predicate(NodeId(0)).unwrap();
        assert!(Arc::ptr_eq(&stored, &hit));
        assert!(cache.predicate(NodeId(9)).is_none());
        assert_eq!(cache.len(), 1);
    }
}
