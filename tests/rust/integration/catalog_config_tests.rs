//! Integration tests for type catalog and compiler configuration loading

#[cfg(test)]
mod catalog_config_integration_tests {
    use std::io::Write;

    use cql_criteria::config::{CompilerConfig, DurationToPolicy};
    use cql_criteria::type_catalog::{CatalogError, ResolveError};
    use cql_criteria::{PropertyPath, PropertyType, PropertyTypeResolver, TypeCatalog};
    use tempfile::NamedTempFile;

    const PEOPLE_YAML: &str = r#"
entities:
  Person:
    properties:
      name: text
      age: integer
      height: double
      active: bool
      born: date
      address: { entity: Address }
  Address:
    properties:
      city: string
      street: { entity: Street }
  Street:
    properties:
      number: int
"#;

    fn path(s: &str) -> PropertyPath {
        s.parse().unwrap()
    }

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("create temp file");
        file.write_all(content.as_bytes()).expect("write temp file");
        file
    }

    #[test]
    fn test_catalog_from_yaml_file() -> anyhow::Result<()> {
        let file = write_temp(PEOPLE_YAML);
        let catalog = TypeCatalog::from_yaml_file(file.path())?;

        let mut names: Vec<&str> = catalog.entity_names().collect();
        names.sort();
        assert_eq!(names, vec!["Address", "Person", "Street"]);

        assert_eq!(catalog.resolve_path_type("Person", &path("age"))?, PropertyType::Integer);
        assert_eq!(catalog.resolve_path_type("Person", &path("height"))?, PropertyType::Float);
        assert_eq!(catalog.resolve_path_type("Person", &path("born"))?, PropertyType::Timestamp);
        assert_eq!(
            catalog.resolve_path_type("Person", &path("address.street.number"))?,
            PropertyType::Integer
        );
        assert_eq!(
            catalog.resolve_path_type("Person", &path("address"))?,
            PropertyType::Entity("Address".into())
        );
        Ok(())
    }

    #[test]
    fn test_path_through_scalar_is_unknown() {
        let catalog = TypeCatalog::from_yaml_str(PEOPLE_YAML).unwrap();
        let err = catalog
            .resolve_path_type("Person", &path("name.first"))
            .unwrap_err();
        assert_eq!(
            err,
            ResolveError::UnknownProperty {
                root_type: "Person".into(),
                path: "name.first".into(),
            }
        );
        assert!(catalog.resolve_path_type("Robot", &path("name")).is_err());
    }

    #[test]
    fn test_dangling_entity_reference_rejected() {
        let yaml = r#"
entities:
  Person:
    properties:
      employer: { entity: Company }
"#;
        let err = TypeCatalog::from_yaml_str(yaml).unwrap_err();
        assert_eq!(
            err,
            CatalogError::UnknownEntityReference {
                entity: "Person".into(),
                property: "employer".into(),
                target: "Company".into(),
            }
        );
    }

    #[test]
    fn test_unknown_scalar_type_is_parse_error() {
        let yaml = r#"
entities:
  Person:
    properties:
      name: varchar
"#;
        assert!(matches!(
            TypeCatalog::from_yaml_str(yaml),
            Err(CatalogError::ConfigParseError { .. })
        ));
    }

    #[test]
    fn test_missing_catalog_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");
        assert!(matches!(
            TypeCatalog::from_yaml_file(&missing),
            Err(CatalogError::ConfigReadError { .. })
        ));
    }

    #[test]
    fn test_compiler_config_from_yaml_file() -> anyhow::Result<()> {
        let file = write_temp("max_expression_depth: 12\nduration_to_policy: reject\n");
        let config = CompilerConfig::from_yaml_file(file.path())?;
        assert_eq!(config.max_expression_depth, 12);
        assert_eq!(config.duration_to_policy, DurationToPolicy::Reject);
        Ok(())
    }

    #[test]
    fn test_compiler_config_yaml_defaults_missing_fields() -> anyhow::Result<()> {
        let file = write_temp("max_expression_depth: 40\n");
        let config = CompilerConfig::from_yaml_file(file.path())?;
        assert_eq!(config.max_expression_depth, 40);
        assert_eq!(config.duration_to_policy, DurationToPolicy::Subtract);
        Ok(())
    }

    #[test]
    fn test_compiler_config_yaml_out_of_range() {
        let file = write_temp("max_expression_depth: 0\n");
        assert!(CompilerConfig::from_yaml_file(file.path()).is_err());
    }
}
