//! YAML-backed entity catalog.
//!
//! ```yaml
//! entities:
//!   Person:
//!     properties:
//!       name: text
//!       age: integer
//!       address: { entity: Address }
//!   Address:
//!     properties:
//!       city: text
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::{CatalogError, ResolveError};
use super::{PropertyType, PropertyTypeResolver};
use crate::cql_ast::PropertyPath;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeCatalogConfig {
    #[serde(default)]
    pub entities: HashMap<String, EntityConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityConfig {
    #[serde(default)]
    pub properties: HashMap<String, PropertyTypeConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyTypeConfig {
    Scalar(ScalarType),
    Association { entity: String },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarType {
    #[serde(alias = "string")]
    Text,
    #[serde(alias = "int", alias = "long")]
    Integer,
    #[serde(alias = "double", alias = "decimal")]
    Float,
    #[serde(alias = "bool")]
    Boolean,
    #[serde(alias = "date", alias = "datetime")]
    Timestamp,
}

impl From<&PropertyTypeConfig> for PropertyType {
    fn from(config: &PropertyTypeConfig) -> Self {
        match config {
            PropertyTypeConfig::Scalar(ScalarType::Text) => PropertyType::Text,
            PropertyTypeConfig::Scalar(ScalarType::Integer) => PropertyType::Integer,
            PropertyTypeConfig::Scalar(ScalarType::Float) => PropertyType::Float,
            PropertyTypeConfig::Scalar(ScalarType::Boolean) => PropertyType::Boolean,
            PropertyTypeConfig::Scalar(ScalarType::Timestamp) => PropertyType::Timestamp,
            PropertyTypeConfig::Association { entity } => PropertyType::Entity(entity.clone()),
        }
    }
}

/// One filterable entity type and its declared properties.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityType {
    pub name: String,
    pub properties: HashMap<String, PropertyType>,
}

impl EntityType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: HashMap::new(),
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, property_type: PropertyType) -> Self {
        self.properties.insert(name.into(), property_type);
        self
    }
}

/// Read-only map of entity types, usable as a `PropertyTypeResolver`.
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    entities: HashMap<String, EntityType>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entity(mut self, entity: EntityType) -> Self {
        self.entities.insert(entity.name.clone(), entity);
        self
    }

    pub fn entity(&self, name: &str) -> Option<&EntityType> {
        self.entities.get(name)
    }

    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let contents =
            std::fs::read_to_string(path.as_ref()).map_err(|e| CatalogError::ConfigReadError {
                error: format!("{}: {}", path.as_ref().display(), e),
            })?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        let config: TypeCatalogConfig =
            serde_yaml::from_str(yaml).map_err(|e| CatalogError::ConfigParseError {
                error: e.to_string(),
            })?;
        Self::from_config(&config)
    }

    pub fn from_config(config: &TypeCatalogConfig) -> Result<Self, CatalogError> {
        let mut catalog = TypeCatalog::new();
        for (entity_name, entity_config) in &config.entities {
            let mut entity = EntityType::new(entity_name.clone());
            for (property, type_config) in &entity_config.properties {
                entity.properties.insert(property.clone(), type_config.into());
            }
            catalog.entities.insert(entity_name.clone(), entity);
        }
        catalog.validate()?;
        log::debug!(
            "TypeCatalog loaded with {} entities",
            catalog.entities.len()
        );
        Ok(catalog)
    }

    /// Check that property names are non-empty and associations point at declared entities.
    pub fn validate(&self) -> Result<(), CatalogError> {
        for entity in self.entities.values() {
            for (property, property_type) in &entity.properties {
                if property.trim().is_empty() {
                    return Err(CatalogError::EmptyPropertyName {
                        entity: entity.name.clone(),
                    });
                }
                if let PropertyType::Entity(target) = property_type {
                    if !self.entities.contains_key(target) {
                        return Err(CatalogError::UnknownEntityReference {
                            entity: entity.name.clone(),
                            property: property.clone(),
                            target: target.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

impl PropertyTypeResolver for TypeCatalog {
    fn resolve_path_type(&self, root_type: &str, path: &PropertyPath) -> Result<PropertyType, ResolveError> {
        let unknown = || ResolveError::UnknownProperty {
            root_type: root_type.to_string(),
            path: path.to_string(),
        };

        let mut entity = self.entity(root_type).ok_or_else(unknown)?;
        for segment in path.parent_segments() {
            match entity.properties.get(segment) {
                Some(PropertyType::Entity(target)) => {
                    entity = self.entity(target).ok_or_else(unknown)?;
                }
                _ => {
                    log::debug!(
                        "TypeCatalog: segment `{}` of `{}` is not an association on `{}`",
                        segment,
                        path,
                        entity.name
                    );
                    return Err(unknown());
                }
            }
        }

        entity.properties.get(path.last()).cloned().ok_or_else(unknown)
    }
}
