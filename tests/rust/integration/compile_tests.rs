//! End-to-end compilation tests: JSON AST + YAML catalog → Criteria

#[cfg(test)]
mod compile_integration_tests {
    use cql_criteria::cql_ast::{ComparisonOp, ExistenceKind, LikeKind, TimespanForm};
    use cql_criteria::predicate_builder::{AliasDefinition, ExistenceCheck};
    use cql_criteria::{
        compile, Ast, AstBuilder, CompileError, CompilerConfig, Predicate, TypeCatalog,
    };

    const CATALOG_YAML: &str = r#"
entities:
  Event:
    properties:
      title: text
      priority: integer
      score: float
      public: boolean
      starts: timestamp
      venue: { entity: Venue }
  Venue:
    properties:
      name: text
      capacity: integer
      city: { entity: City }
  City:
    properties:
      name: text
      population: integer
"#;

    fn catalog() -> TypeCatalog {
        TypeCatalog::from_yaml_str(CATALOG_YAML).expect("valid catalog")
    }

    fn compile_event(ast: &Ast) -> Result<cql_criteria::Criteria, CompileError> {
        compile(ast, "Event", &catalog(), &CompilerConfig::default())
    }

    #[test]
    fn test_compile_from_json_ast() {
        // priority >= 3 and venue.city.name ilike 'new%'
        let json = r#"{
            "nodes": [
                {"kind": "attribute", "path": "priority"},
                {"kind": "literal", "value": {"type": "number", "value": "3"}},
                {"kind": "comparison", "op": "gte", "attr": 0, "literal": 1},
                {"kind": "attribute", "path": "venue.city.name"},
                {"kind": "literal", "value": {"type": "text", "value": "new%"}},
                {"kind": "like", "like": "ilike", "attr": 3, "literal": 4},
                {"kind": "and", "left": 2, "right": 5}
            ],
            "root": 6
        }"#;
        let ast = Ast::from_json(json).unwrap();
        let criteria = compile_event(&ast).unwrap();

        assert_eq!(criteria.root_type, "Event");
        assert_eq!(
            criteria.aliases,
            vec![
                AliasDefinition {
                    association_path: "venue".into(),
                    alias: "venue01".into(),
                },
                AliasDefinition {
                    association_path: "venue01.city".into(),
                    alias: "venue01city02".into(),
                },
            ]
        );
        assert_eq!(
            criteria.predicate.to_string(),
            "(priority >= 3 AND venue01city02.name ILIKE 'new%')"
        );
    }

    #[test]
    fn test_criteria_json_output() {
        let mut b = AstBuilder::new();
        let root = b.existence(ExistenceKind::IsNull, "venue.name").unwrap();
        let criteria = compile_event(&b.finish(root).unwrap()).unwrap();

        let json = serde_json::to_value(&criteria).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "root_type": "Event",
                "aliases": [{"association_path": "venue", "alias": "venue01"}],
                "predicate": {
                    "type": "exists",
                    "property": {"path": "venue.name", "reference": "venue01.name"},
                    "check": "not_null",
                    "negated": true
                }
            })
        );
    }

    #[test]
    fn test_aliases_shared_across_branches_and_kinds() {
        // venue.city.population > 1000 or (venue.city.name like 'A%' and venue.capacity < 50)
        let mut b = AstBuilder::new();
        let thousand = b.number("1000");
        let pop = b.compare(ComparisonOp::Gt, "venue.city.population", thousand).unwrap();
        let name = b.like(LikeKind::Like, "venue.city.name", "A%").unwrap();
        let fifty = b.number("50");
        let cap = b.compare(ComparisonOp::Lt, "venue.capacity", fifty).unwrap();
        let inner = b.and(name, cap);
        let root = b.or(pop, inner);
        let criteria = compile_event(&b.finish(root).unwrap()).unwrap();

        assert_eq!(criteria.aliases.len(), 2);
        assert_eq!(
            criteria.predicate.to_string(),
            "(venue01city02.population > 1000 OR (venue01city02.name LIKE 'A%' AND venue01.capacity < 50))"
        );
        assert_eq!(criteria.predicate.leaf_count(), 3);
    }

    #[test]
    fn test_boolean_and_float_coercion() {
        let mut b = AstBuilder::new();
        let yes = b.text("TRUE");
        let public = b.compare(ComparisonOp::Eq, "public", yes).unwrap();
        let score = b.number("4.5");
        let high = b.compare(ComparisonOp::Gt, "score", score).unwrap();
        let root = b.and(public, high);
        let criteria = compile_event(&b.finish(root).unwrap()).unwrap();
        assert_eq!(criteria.predicate.to_string(), "(public = true AND score > 4.5)");
    }

    #[test]
    fn test_during_month_end_range() {
        let mut b = AstBuilder::new();
        let from = b.date_time("2020-01-31");
        let duration = b.duration("P1M").unwrap();
        let root = b
            .during("starts", TimespanForm::FromDuration { from, duration })
            .unwrap();
        let criteria = compile_event(&b.finish(root).unwrap()).unwrap();

        match &*criteria.predicate {
            Predicate::Range {
                property,
                lower_exclusive,
                upper_exclusive,
            } => {
                assert_eq!(property.reference, "starts");
                let lo = lower_exclusive.as_ref().and_then(|v| v.as_timestamp()).unwrap();
                let hi = upper_exclusive.as_ref().and_then(|v| v.as_timestamp()).unwrap();
                assert_eq!(lo.to_string(), "2020-01-31 00:00:00");
                assert_eq!(hi.to_string(), "2020-02-29 00:00:00");
            }
            other => panic!("expected Range, got {:?}", other),
        }
    }

    #[test]
    fn test_during_rfc3339_instants_normalized_to_utc() {
        let mut b = AstBuilder::new();
        let from = b.date_time("2021-06-01T02:00:00+02:00");
        let to = b.date_time("2021-06-30T23:59:59Z");
        let root = b.during("starts", TimespanForm::FromTo { from, to }).unwrap();
        let criteria = compile_event(&b.finish(root).unwrap()).unwrap();
        assert_eq!(
            criteria.predicate.to_string(),
            "(starts > '2021-06-01T00:00:00' AND starts < '2021-06-30T23:59:59')"
        );
    }

    #[test]
    fn test_does_not_exist_on_nested_undeclared_property() {
        let mut b = AstBuilder::new();
        let root = b.existence(ExistenceKind::DoesNotExist, "venue.parking").unwrap();
        let criteria = compile_event(&b.finish(root).unwrap()).unwrap();
        assert_eq!(criteria.aliases.len(), 1);
        assert!(matches!(
            &*criteria.predicate,
            Predicate::Exists {
                check: ExistenceCheck::PropertyDefined,
                negated: true,
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_nested_property_yields_no_criteria() {
        let mut b = AstBuilder::new();
        let one = b.number("1");
        let root = b.compare(ComparisonOp::Gt, "venue.city.altitude", one).unwrap();
        let err = compile_event(&b.finish(root).unwrap()).unwrap_err();
        assert_eq!(
            err,
            CompileError::UnknownProperty {
                root_type: "Event".into(),
                path: "venue.city.altitude".into(),
            }
        );
    }

    #[test]
    fn test_dangling_reference_from_json_is_malformed() {
        let json = r#"{
            "nodes": [
                {"kind": "not", "inner": 5}
            ],
            "root": 0
        }"#;
        let ast = Ast::from_json(json).unwrap();
        let err = compile_event(&ast).unwrap_err();
        assert!(matches!(err, CompileError::MalformedAst { node: 5, .. }));
    }

    #[test]
    fn test_catalog_shared_across_threads() {
        let catalog = catalog();
        let config = CompilerConfig::default();
        let references: Vec<String> = std::thread::scope(|s| {
            let handles: Vec<_> = ["venue.name", "venue.city.name", "title"]
                .into_iter()
                .map(|path| {
                    let (catalog, config) = (&catalog, &config);
                    s.spawn(move || {
                        let mut b = AstBuilder::new();
                        let root = b.like(LikeKind::Like, path, "x%").unwrap();
                        let ast = b.finish(root).unwrap();
                        let criteria = compile(&ast, "Event", catalog, config).unwrap();
                        criteria.predicate.property().unwrap().reference.clone()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        // Each compilation has its own alias counter.
        assert_eq!(references, vec!["venue01.name", "venue01city02.name", "title"]);
    }

    #[test]
    fn test_deep_nesting_respects_configured_limit() {
        let mut b = AstBuilder::new();
        let mut current = b.existence(ExistenceKind::IsNotNull, "title").unwrap();
        for _ in 0..20 {
            current = b.not(current);
        }
        let ast = b.finish(current).unwrap();

        let shallow = CompilerConfig {
            max_expression_depth: 10,
            ..Default::default()
        };
        assert_eq!(
            compile(&ast, "Event", &catalog(), &shallow).unwrap_err(),
            CompileError::ExpressionTooDeep { limit: 10 }
        );
        assert!(compile(&ast, "Event", &catalog(), &CompilerConfig::default()).is_ok());
    }
}
