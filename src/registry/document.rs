//! Dataset registration documents.
//!
//! ```json
//! {
//!   "measures": [{"name": "total_revenue", "type": "sum", "sql": "SUM(order_amount)"}],
//!   "dimensions": [{"name": "customer_id", "sql": "customer_id"}],
//!   "time_dimensions": [{"name": "order_date", "sql": "order_date"}]
//! }
//! ```
//!
//! `time_dimensions` are folded into the dataset's dimension list typed as
//! dates.

use serde::Deserialize;
use sqlparser::dialect::DuckDbDialect;
use sqlparser::parser::Parser;
use sqlparser::tokenizer::Token;

use crate::model::{Aggregation, Dataset, Dimension, Measure, ValueType};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistrationError {
    #[error("Invalid JSON in dataset definition: {0}")]
    Malformed(String),

    #[error("Unknown aggregation type '{kind}' for measure '{measure}'")]
    UnknownAggregation { measure: String, kind: String },

    #[error("Unknown value type '{kind}' for dimension '{dimension}'")]
    UnknownValueType { dimension: String, kind: String },

    #[error("Invalid SQL expression for '{name}': {reason}")]
    InvalidExpression { name: String, reason: String },
}

/// Options for decoding registration documents.
#[derive(Debug, Clone, Copy)]
pub struct DocumentOptions {
    /// Require every `sql` fragment to parse as exactly one SQL expression.
    pub check_expressions: bool,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            check_expressions: true,
        }
    }
}

impl DocumentOptions {
    pub fn with_check_expressions(mut self, check: bool) -> Self {
        self.check_expressions = check;
        self
    }
}

#[derive(Debug, Deserialize)]
struct DatasetDocument {
    #[serde(default)]
    measures: Vec<MeasureEntry>,
    #[serde(default)]
    dimensions: Vec<DimensionEntry>,
    #[serde(default)]
    time_dimensions: Vec<DimensionEntry>,
}

#[derive(Debug, Deserialize)]
struct MeasureEntry {
    name: String,
    #[serde(rename = "type")]
    kind: Option<String>,
    sql: String,
}

#[derive(Debug, Deserialize)]
struct DimensionEntry {
    name: String,
    sql: String,
    #[serde(rename = "type")]
    kind: Option<String>,
}

/// Decode a registration document into a dataset named `name`.
pub fn parse_dataset(
    name: &str,
    text: &str,
    options: DocumentOptions,
) -> Result<Dataset, RegistrationError> {
    let doc: DatasetDocument =
        serde_json::from_str(text).map_err(|e| RegistrationError::Malformed(e.to_string()))?;

    let mut dataset = Dataset::new(name);

    for entry in doc.measures {
        let aggregation = match &entry.kind {
            None => Aggregation::default(),
            Some(kind) => Aggregation::from_str(kind).ok_or_else(|| {
                RegistrationError::UnknownAggregation {
                    measure: entry.name.clone(),
                    kind: kind.clone(),
                }
            })?,
        };
        if options.check_expressions {
            check_expression(&entry.name, &entry.sql)?;
        }
        dataset
            .measures
            .push(Measure::new(&entry.name, aggregation, &entry.sql));
    }

    for (entry, time) in doc
        .dimensions
        .into_iter()
        .map(|e| (e, false))
        .chain(doc.time_dimensions.into_iter().map(|e| (e, true)))
    {
        let value_type = match &entry.kind {
            None if time => ValueType::Date,
            None => ValueType::String,
            // Time dimensions only take a temporal type.
            Some(kind) => ValueType::from_str(kind)
                .filter(|t| !time || t.is_temporal())
                .ok_or_else(|| RegistrationError::UnknownValueType {
                    dimension: entry.name.clone(),
                    kind: kind.clone(),
                })?,
        };
        if options.check_expressions {
            check_expression(&entry.name, &entry.sql)?;
        }
        dataset
            .dimensions
            .push(Dimension::new(&entry.name, &entry.sql).with_type(value_type));
    }

    Ok(dataset)
}

/// Check that `sql` is a single expression with nothing trailing.
fn check_expression(name: &str, sql: &str) -> Result<(), RegistrationError> {
    let invalid = |reason: String| RegistrationError::InvalidExpression {
        name: name.to_string(),
        reason,
    };

    let dialect = DuckDbDialect {};
    let mut parser = Parser::new(&dialect)
        .try_with_sql(sql)
        .map_err(|e| invalid(e.to_string()))?;
    parser.parse_expr().map_err(|e| invalid(e.to_string()))?;

    let next = parser.peek_token();
    if next.token != Token::EOF {
        return Err(invalid(format!("unexpected trailing input at '{}'", next.token)));
    }
    Ok(())
}
