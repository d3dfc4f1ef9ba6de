use insta::assert_snapshot;
use semquery::compile::CompileError;
use semquery::engine::{EngineError, EngineOptions, QueryResponse, SemanticEngine};
use semquery::parser::ParseError;
use semquery::registry::RegistrationError;
use semquery::sql::LiteralMode;
use semquery::validation::ValidationError;

const ORDERS: &str = r#"{
    "measures": [
        {"name": "total_revenue", "sql": "SUM(order_amount)"},
        {"name": "order_count", "type": "count", "sql": "COUNT(*)"}
    ],
    "dimensions": [
        {"name": "customer_id", "sql": "customer_id"},
        {"name": "product_category", "sql": "product_category"}
    ],
    "time_dimensions": [{"name": "order_date", "sql": "order_date"}]
}"#;

const SALES: &str = r#"{
    "measures": [{"name": "revenue", "sql": "SUM(sales_amount)"}],
    "dimensions": [{"name": "region", "sql": "region"}],
    "time_dimensions": [{"name": "sale_date", "sql": "sale_date"}]
}"#;

fn engine() -> SemanticEngine {
    let engine = SemanticEngine::default();
    engine.register_dataset("orders_ds", ORDERS).unwrap();
    engine.register_dataset("sales_ds", SALES).unwrap();
    engine
}

#[test]
fn test_registration_message() {
    let engine = SemanticEngine::default();
    let summary = engine.register_dataset("orders_ds", ORDERS).unwrap();
    assert_eq!(summary.to_string(), "Dataset 'orders_ds' registered successfully");
    assert!(!summary.replaced);

    let summary = engine.register_dataset("orders_ds", SALES).unwrap();
    assert!(summary.replaced);
    assert!(engine.registry().get("orders_ds").unwrap().measure("revenue").is_some());
}

#[test]
fn test_explain_returns_sql() {
    let response = engine()
        .semantic_query(
            r#"{"dataset": "orders_ds", "measures": ["total_revenue"], "dimensions": ["customer_id"]}"#,
            true,
        )
        .unwrap();
    let QueryResponse::Explain { sql } = response else {
        panic!("expected explain response");
    };
    assert_snapshot!(sql, @"SELECT SUM(order_amount) AS total_revenue, customer_id AS customer_id FROM orders_ds GROUP BY customer_id");
}

#[test]
fn test_response_json_shapes() {
    let query = r#"{"dataset": "sales_ds", "measures": ["revenue"]}"#;
    let engine = engine();

    let explain = serde_json::to_value(engine.semantic_query(query, true).unwrap()).unwrap();
    assert_eq!(
        explain,
        serde_json::json!({"sql": "SELECT SUM(sales_amount) AS revenue FROM sales_ds"})
    );

    let compiled = serde_json::to_value(engine.semantic_query(query, false).unwrap()).unwrap();
    assert_eq!(
        compiled,
        serde_json::json!({
            "sql": "SELECT SUM(sales_amount) AS revenue FROM sales_ds",
            "schema": [{"name": "revenue", "role": "measure", "value_type": "number"}],
            "params": []
        })
    );
}

#[test]
fn test_compiled_response_carries_schema() {
    let response = engine()
        .semantic_query(
            r#"{"dataset": "sales_ds", "measures": ["revenue"], "dimensions": ["region"]}"#,
            false,
        )
        .unwrap();
    let QueryResponse::Compiled(output) = response else {
        panic!("expected compiled response");
    };
    assert_snapshot!(output.sql, @"SELECT SUM(sales_amount) AS revenue, region AS region FROM sales_ds GROUP BY region");
    assert_eq!(output.schema.len(), 2);
}

#[test]
fn test_datasets_coexist() {
    let engine = engine();
    assert!(engine
        .compile_query(r#"{"dataset": "orders_ds", "measures": ["total_revenue"]}"#)
        .is_ok());
    assert!(engine
        .compile_query(r#"{"dataset": "sales_ds", "measures": ["revenue"]}"#)
        .is_ok());
    // Names do not leak across datasets.
    assert!(matches!(
        engine.compile_query(r#"{"dataset": "sales_ds", "measures": ["total_revenue"]}"#),
        Err(EngineError::Validation(ValidationError::UnknownMeasure { .. }))
    ));
}

#[test]
fn test_error_kinds() {
    let engine = engine();

    assert!(matches!(
        engine.compile_query("invalid json"),
        Err(EngineError::Parse(ParseError::Malformed(_)))
    ));

    let err = engine
        .compile_query(r#"{"dataset": "nonexistent_ds", "measures": ["some_measure"]}"#)
        .unwrap_err();
    assert!(err.to_string().contains("not found in registry"));

    let err = engine
        .compile_query(r#"{"dataset": "orders_ds", "dimensions": ["invalid_dimension"]}"#)
        .unwrap_err();
    assert!(err.to_string().contains("not found in dataset"));

    let err = engine.compile_query(r#"{"dataset": "orders_ds"}"#).unwrap_err();
    assert_eq!(err, EngineError::Compile(CompileError::EmptySelection));
    assert!(err.to_string().contains("No valid measures or dimensions"));

    assert!(matches!(
        engine.register_dataset("broken", r#"{"measures": [{"name": "m"}]}"#),
        Err(EngineError::Registration(RegistrationError::Malformed(_)))
    ));
    assert!(!engine.registry().contains("broken"));
}

#[test]
fn test_options_flow_through() {
    let mut options = EngineOptions::default();
    options.compile = options
        .compile
        .with_literal_mode(LiteralMode::Bind)
        .with_strict(true);
    options.validate = options.validate.with_strict_references(true);

    let engine = SemanticEngine::new(options);
    engine.register_dataset("orders_ds", ORDERS).unwrap();

    let output = engine
        .compile_query(
            r#"{
                "dataset": "orders_ds",
                "measures": ["total_revenue"],
                "filters": [{"dimension": "customer_id", "operator": "equals", "values": ["123"]}]
            }"#,
        )
        .unwrap();
    assert_eq!(output.params, vec!["123"]);

    assert!(matches!(
        engine.compile_query(
            r#"{
                "dataset": "orders_ds",
                "measures": ["total_revenue"],
                "filters": [{"dimension": "customer_id", "operator": "contains", "values": ["1"]}]
            }"#,
        ),
        Err(EngineError::Compile(CompileError::UnknownOperator { .. }))
    ));

    assert!(matches!(
        engine.compile_query(
            r#"{"dataset": "orders_ds", "measures": ["total_revenue"], "order": [{"id": "rank"}]}"#,
        ),
        Err(EngineError::Validation(ValidationError::UnknownOrderKey { .. }))
    ));
}

#[test]
fn test_concurrent_compiles_and_registrations() {
    let engine = engine();

    std::thread::scope(|s| {
        let writer = &engine;
        s.spawn(move || {
            for _ in 0..200 {
                writer.register_dataset("orders_ds", ORDERS).unwrap();
            }
        });

        for _ in 0..4 {
            let reader = &engine;
            s.spawn(move || {
                for _ in 0..200 {
                    let output = reader
                        .compile_query(r#"{"dataset": "orders_ds", "measures": ["order_count"]}"#)
                        .unwrap();
                    assert_eq!(output.sql, "SELECT COUNT(*) AS order_count FROM orders_ds");
                }
            });
        }
    });
}
