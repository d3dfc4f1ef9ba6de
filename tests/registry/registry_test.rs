use semquery::model::{Aggregation, Dimension, Measure, SemanticQuery, TimeWindow};
use semquery::registry::{parse_dataset, DatasetRegistry, DocumentOptions, RegistrationError};
use semquery::validation::ValidationError;
use std::sync::Arc;

fn v1() -> (Vec<Measure>, Vec<Dimension>) {
    (
        vec![Measure::new("revenue", Aggregation::Sum, "SUM(amount)")],
        vec![Dimension::new("region", "region")],
    )
}

fn v2() -> (Vec<Measure>, Vec<Dimension>) {
    (
        vec![
            Measure::new("orders", Aggregation::Count, "COUNT(*)"),
            Measure::new("avg_amount", Aggregation::Avg, "AVG(amount)"),
        ],
        vec![
            Dimension::new("channel", "channel"),
            Dimension::time("sold_at", "sold_at"),
        ],
    )
}

#[test]
fn test_last_write_wins() {
    let registry = DatasetRegistry::new();

    let (m, d) = v1();
    assert!(!registry.register("sales", m, d));
    let (m, d) = v2();
    assert!(registry.register("sales", m, d));

    let measures = registry.lookup_measures("sales").unwrap();
    let names: Vec<_> = measures.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["orders", "avg_amount"]);

    // No merge with the first definition.
    let dims = registry.lookup_dimensions("sales").unwrap();
    assert!(dims.iter().all(|d| d.name != "region"));
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_lookup_absent() {
    let registry = DatasetRegistry::new();
    assert!(registry.lookup_measures("missing").is_none());
    assert!(registry.lookup_dimensions("missing").is_none());
    assert!(registry.get("missing").is_none());
    assert!(registry.is_empty());
}

#[test]
fn test_snapshot_survives_reregistration() {
    let registry = DatasetRegistry::new();
    let (m, d) = v1();
    registry.register("sales", m, d);

    let snapshot = registry.get("sales").unwrap();
    let (m, d) = v2();
    registry.register("sales", m, d);

    assert_eq!(snapshot.measures[0].name, "revenue");
    assert_eq!(registry.get("sales").unwrap().measures[0].name, "orders");
}

#[test]
fn test_remove_and_names() {
    let registry = DatasetRegistry::new();
    let (m, d) = v1();
    registry.register("zeta", m.clone(), d.clone());
    registry.register("alpha", m, d);

    assert_eq!(registry.names(), vec!["alpha".to_string(), "zeta".to_string()]);
    assert!(registry.remove("zeta").is_some());
    assert!(!registry.contains("zeta"));
    assert!(registry.remove("zeta").is_none());
}

#[test]
fn test_registry_validate_phase_order() {
    let registry = DatasetRegistry::new();
    let (m, d) = v2();
    registry.register("sales", m, d);

    let query = SemanticQuery::new("sales")
        .with_measures(&["profit"])
        .with_dimensions(&["city"]);
    assert_eq!(
        registry.validate(&query).unwrap_err(),
        ValidationError::UnknownMeasure {
            name: "profit".into(),
            dataset: "sales".into()
        }
    );

    let query = SemanticQuery::new("sales")
        .with_measures(&["orders"])
        .with_time_window(TimeWindow::new("shipped_at"));
    assert_eq!(
        registry.validate(&query).unwrap_err().to_string(),
        "Time dimension 'shipped_at' not found in dataset 'sales'"
    );

    let query = SemanticQuery::new("other").with_measures(&["orders"]);
    assert!(matches!(
        registry.validate(&query),
        Err(ValidationError::UnknownDataset { .. })
    ));
}

#[test]
fn test_concurrent_readers_never_see_a_mix() {
    let registry = Arc::new(DatasetRegistry::new());
    let (m, d) = v1();
    registry.register("sales", m, d);

    std::thread::scope(|s| {
        let writer = &registry;
        s.spawn(move || {
            for i in 0..500 {
                let (m, d) = if i % 2 == 0 { v2() } else { v1() };
                writer.register("sales", m, d);
            }
        });

        for _ in 0..4 {
            let reader = &registry;
            s.spawn(move || {
                for _ in 0..500 {
                    let snapshot = reader.get("sales").unwrap();
                    let shape = (snapshot.measures.len(), snapshot.dimensions.len());
                    match snapshot.measures[0].name.as_str() {
                        "revenue" => {
                            assert_eq!(shape, (1, 1));
                            assert_eq!(snapshot.dimensions[0].name, "region");
                        }
                        "orders" => {
                            assert_eq!(shape, (2, 2));
                            assert_eq!(snapshot.dimensions[0].name, "channel");
                        }
                        other => panic!("unexpected measure {other}"),
                    }
                }
            });
        }
    });
}

// ============================================================================
// Registration documents
// ============================================================================

#[test]
fn test_parse_document() {
    let dataset = parse_dataset(
        "orders_ds",
        r#"{
            "measures": [
                {"name": "total_revenue", "sql": "SUM(order_amount)"},
                {"name": "order_count", "type": "count", "sql": "COUNT(*)"}
            ],
            "dimensions": [{"name": "customer_id", "sql": "customer_id"}],
            "time_dimensions": [{"name": "order_date", "sql": "order_date"}]
        }"#,
        DocumentOptions::default(),
    )
    .unwrap();

    assert_eq!(dataset.name, "orders_ds");
    assert_eq!(dataset.measures[0].aggregation, Aggregation::Sum);
    assert_eq!(dataset.measures[1].aggregation, Aggregation::Count);

    let dims: Vec<_> = dataset
        .dimensions
        .iter()
        .map(|d| (d.name.as_str(), d.is_time()))
        .collect();
    assert_eq!(dims, vec![("customer_id", false), ("order_date", true)]);
}

#[test]
fn test_document_rejects_unknown_aggregation() {
    let err = parse_dataset(
        "d",
        r#"{"measures": [{"name": "m", "type": "median", "sql": "MEDIAN(x)"}]}"#,
        DocumentOptions::default(),
    )
    .unwrap_err();
    assert_eq!(
        err,
        RegistrationError::UnknownAggregation {
            measure: "m".into(),
            kind: "median".into()
        }
    );
}

#[test]
fn test_document_rejects_stacked_statements() {
    let doc = r#"{"measures": [{"name": "m", "sql": "SUM(x) FROM t; DROP TABLE t"}]}"#;

    let err = parse_dataset("d", doc, DocumentOptions::default()).unwrap_err();
    assert!(matches!(err, RegistrationError::InvalidExpression { ref name, .. } if name == "m"));

    // Accepted verbatim when checking is disabled.
    let dataset =
        parse_dataset("d", doc, DocumentOptions::default().with_check_expressions(false)).unwrap();
    assert_eq!(dataset.measures[0].expression, "SUM(x) FROM t; DROP TABLE t");
}
