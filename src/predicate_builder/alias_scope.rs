//! Alias allocation for compound property paths.
//!
//! A compound path such as `address.street.number` cannot be addressed
//! directly by most backends: every intermediate association needs an alias
//! (a join). `AliasScope` creates one alias per path prefix, outer-to-inner,
//! and hands the same alias back to every later path sharing that prefix.
//!
//! ## Naming Convention
//! Format: `{parent_alias}{segment}{counter:02}`
//! - the counter is scoped to one `AliasScope`, starting at 1
//! - the parent alias is empty for the outermost segment
//!
//! Examples (fresh scope):
//! - `name` → `name` (no alias)
//! - `address.city` → alias `address01`, reference `address01.city`
//! - then `address.street.number` → reuses `address01`, creates
//!   `address01street02`, reference `address01street02.number`

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::cql_ast::PropertyPath;

/// Backend side of alias creation, invoked once per new alias.
pub trait AliasSink {
    /// `association_path` is `<parent_alias>.<segment>`, or just `<segment>`
    /// for the outermost association.
    fn create_alias(&mut self, association_path: &str, alias: &str);
}

/// One recorded alias creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasDefinition {
    pub association_path: String,
    pub alias: String,
}

impl AliasSink for Vec<AliasDefinition> {
    fn create_alias(&mut self, association_path: &str, alias: &str) {
        self.push(AliasDefinition {
            association_path: association_path.to_string(),
            alias: alias.to_string(),
        });
    }
}

/// Prefix → alias map for a single compilation.
#[derive(Debug, Default)]
pub struct AliasScope {
    aliases: HashMap<Vec<String>, String>,
    counter: usize,
}

impl AliasScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend reference for `path`, creating any missing prefix aliases.
    pub fn resolve(&mut self, path: &PropertyPath, sink: &mut dyn AliasSink) -> String {
        if !path.is_compound() {
            return path.last().to_string();
        }

        let parents = path.parent_segments();
        let mut current_alias = String::new();
        for depth in 1..=parents.len() {
            let prefix = &parents[..depth];
            if let Some(existing) = self.aliases.get(prefix) {
                current_alias = existing.clone();
                continue;
            }

            let segment = &prefix[depth - 1];
            let association_path = if current_alias.is_empty() {
                segment.clone()
            } else {
                format!("{}.{}", current_alias, segment)
            };
            self.counter += 1;
            let alias = format!("{}{}{:02}", current_alias, segment, self.counter);

            log::debug!(
                "AliasScope: {} → alias {} (for prefix {})",
                association_path,
                alias,
                prefix.join(".")
            );
            sink.create_alias(&association_path, &alias);
            self.aliases.insert(prefix.to_vec(), alias.clone());
            current_alias = alias;
        }

        format!("{}.{}", current_alias, path.last())
    }

    /// Alias already assigned to `prefix`, if any.
    pub fn alias_for(&self, prefix: &[String]) -> Option<&str> {
        self.aliases.get(prefix).map(String::as_str)
    }

    /// Number of aliases created so far.
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}
