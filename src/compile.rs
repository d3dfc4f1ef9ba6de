//! Compilation from a validated semantic query to SQL.
//!
//! ```text
//! SemanticQuery + Dataset → Query (SQL AST) → SQL text + output schema
//! ```
//!
//! # Example
//!
//! ```ignore
//! use semquery::compile::{compile, CompileOptions};
//! use semquery::model::{Aggregation, Dataset, Dimension, Measure, SemanticQuery};
//!
//! let dataset = Dataset::new("orders_ds")
//!     .with_measure(Measure::new("total_revenue", Aggregation::Sum, "SUM(order_amount)"))
//!     .with_dimension(Dimension::new("customer_id", "customer_id"));
//!
//! let query = SemanticQuery::new("orders_ds")
//!     .with_measures(&["total_revenue"])
//!     .with_dimensions(&["customer_id"]);
//!
//! let output = compile(&query, &dataset, CompileOptions::default())?;
//! assert_eq!(
//!     output.sql,
//!     "SELECT SUM(order_amount) AS total_revenue, customer_id AS customer_id \
//!      FROM orders_ds GROUP BY customer_id"
//! );
//! ```

use serde::Serialize;

use crate::model::{
    Dataset, Dimension, Filter, FilterOperator, Granularity, Measure, SemanticQuery, TimeWindow,
    ValueType,
};
use crate::sql::query::{
    CompareOp, Expr, LiteralMode, OrderByExpr, Predicate, Query, SelectExpr,
};
use crate::validation::ValidationError;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during compilation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error("No valid measures or dimensions specified")]
    EmptySelection,

    #[error("Unknown filter operator '{operator}' on dimension '{dimension}'")]
    UnknownOperator { operator: String, dimension: String },

    #[error("Unknown granularity '{granularity}' for time dimension '{dimension}'")]
    UnknownGranularity {
        granularity: String,
        dimension: String,
    },

    #[error("Filter on dimension '{dimension}' has no values")]
    EmptyFilterValues { dimension: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

pub type CompileResult<T> = Result<T, CompileError>;

// ============================================================================
// Options
// ============================================================================

/// Options for compilation.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompileOptions {
    pub literal_mode: LiteralMode,

    /// Report unknown operators, unknown granularities and empty filters
    /// instead of skipping them.
    pub strict: bool,
}

impl CompileOptions {
    pub fn with_literal_mode(mut self, mode: LiteralMode) -> Self {
        self.literal_mode = mode;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

// ============================================================================
// Result Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnRole {
    Measure,
    Dimension,
    Time,
}

/// One column of the result set, in select-list order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputColumn {
    pub name: String,
    pub role: ColumnRole,
    pub value_type: ValueType,
}

/// Result of compiling a query to SQL.
#[derive(Debug, Clone, Serialize)]
pub struct CompileOutput {
    /// The generated SQL string.
    pub sql: String,

    /// Result-set shape.
    pub schema: Vec<OutputColumn>,

    /// Bind values for `$n` placeholders; empty for inline literals.
    pub params: Vec<String>,

    /// The SQL query AST.
    #[serde(skip)]
    pub query: Query,
}

// ============================================================================
// Compilation Functions
// ============================================================================

/// Compile a validated query against its dataset definition.
pub fn compile(
    query: &SemanticQuery,
    dataset: &Dataset,
    options: CompileOptions,
) -> CompileResult<CompileOutput> {
    let (sql_query, schema) = build_query(query, dataset, options)?;
    let rendered = sql_query.render(options.literal_mode);

    tracing::debug!(
        dataset = %query.dataset,
        columns = schema.len(),
        params = rendered.params.len(),
        sql = %rendered.sql,
        "compiled semantic query"
    );

    Ok(CompileOutput {
        sql: rendered.sql,
        schema,
        params: rendered.params,
        query: sql_query,
    })
}

/// Build the SQL AST and output schema without rendering.
pub fn build_query(
    query: &SemanticQuery,
    dataset: &Dataset,
    options: CompileOptions,
) -> CompileResult<(Query, Vec<OutputColumn>)> {
    let mut select = Vec::new();
    let mut schema = Vec::new();

    for name in &query.measures {
        let measure = resolve_measure(query, dataset, name)?;
        select.push(SelectExpr::new(Expr::raw(&measure.expression)).with_alias(&measure.name));
        schema.push(OutputColumn {
            name: measure.name.clone(),
            role: ColumnRole::Measure,
            value_type: ValueType::Number,
        });
    }

    for name in &query.dimensions {
        let dimension = resolve_dimension(query, dataset, name)?;
        select.push(
            SelectExpr::new(Expr::raw(&dimension.expression)).with_alias(&dimension.name),
        );
        schema.push(OutputColumn {
            name: dimension.name.clone(),
            role: ColumnRole::Dimension,
            value_type: dimension.value_type,
        });
    }

    for window in &query.time_windows {
        let dimension = dataset.dimension(&window.dimension).ok_or_else(|| {
            ValidationError::UnknownTimeDimension {
                name: window.dimension.clone(),
                dataset: query.dataset.clone(),
            }
        })?;
        select.push(SelectExpr::new(time_expr(window, dimension, options)?).with_alias(&window.dimension));
        schema.push(OutputColumn {
            name: window.dimension.clone(),
            role: ColumnRole::Time,
            value_type: if dimension.value_type.is_temporal() {
                dimension.value_type
            } else {
                ValueType::Date
            },
        });
    }

    if select.is_empty() {
        return Err(CompileError::EmptySelection);
    }

    let mut sql_query = Query::new().select(select).from(&query.dataset);

    for filter in &query.filters {
        if let Some(predicate) = filter_predicate(filter, options)? {
            sql_query = sql_query.filter(predicate);
        }
    }

    for window in &query.time_windows {
        if let Some(range) = &window.date_range {
            sql_query = sql_query
                .filter(Predicate::compare(
                    Expr::reference(&window.dimension),
                    CompareOp::Gte,
                    Expr::value(&range.start),
                ))
                .filter(Predicate::compare(
                    Expr::reference(&window.dimension),
                    CompareOp::Lte,
                    Expr::value(&range.end),
                ));
        }
    }

    if !query.measures.is_empty() {
        let group_by: Vec<Expr> = query
            .dimensions
            .iter()
            .chain(query.time_windows.iter().map(|w| &w.dimension))
            .map(|name| Expr::alias(name))
            .collect();
        sql_query = sql_query.group_by(group_by);
    }

    sql_query = sql_query.order_by(
        query
            .order
            .iter()
            .map(|term| {
                // Keys naming a select alias must not split on '.'.
                let key = if schema.iter().any(|column| column.name == term.key) {
                    Expr::alias(&term.key)
                } else {
                    Expr::reference(&term.key)
                };
                if term.descending {
                    OrderByExpr::desc(key)
                } else {
                    OrderByExpr::asc(key)
                }
            })
            .collect(),
    );

    if let Some(limit) = query.effective_limit() {
        sql_query = sql_query.limit(limit);
    }

    if let Some(tz) = &query.time_zone {
        tracing::debug!(time_zone = %tz, "time_zone is carried but not applied to SQL");
    }

    Ok((sql_query, schema))
}

// ============================================================================
// Helper Functions
// ============================================================================

fn resolve_measure<'a>(
    query: &SemanticQuery,
    dataset: &'a Dataset,
    name: &str,
) -> CompileResult<&'a Measure> {
    dataset.measure(name).ok_or_else(|| {
        ValidationError::UnknownMeasure {
            name: name.to_string(),
            dataset: query.dataset.clone(),
        }
        .into()
    })
}

fn resolve_dimension<'a>(
    query: &SemanticQuery,
    dataset: &'a Dataset,
    name: &str,
) -> CompileResult<&'a Dimension> {
    dataset.dimension(name).ok_or_else(|| {
        ValidationError::UnknownDimension {
            name: name.to_string(),
            dataset: query.dataset.clone(),
        }
        .into()
    })
}

/// Select expression for a time window: truncated when a known granularity
/// is given, the raw dimension expression otherwise.
fn time_expr(
    window: &TimeWindow,
    dimension: &Dimension,
    options: CompileOptions,
) -> CompileResult<Expr> {
    let raw = Expr::raw(&dimension.expression);
    let Some(granularity) = &window.granularity else {
        return Ok(raw);
    };

    match granularity {
        Granularity::Unrecognized(text) => {
            if options.strict {
                return Err(CompileError::UnknownGranularity {
                    granularity: text.clone(),
                    dimension: window.dimension.clone(),
                });
            }
            tracing::warn!(
                dimension = %window.dimension,
                granularity = %text,
                "ignoring unrecognized granularity"
            );
            Ok(raw)
        }
        known => Ok(match known.date_part() {
            Some(part) => Expr::date_trunc(part, raw),
            None => raw,
        }),
    }
}

fn filter_predicate(filter: &Filter, options: CompileOptions) -> CompileResult<Option<Predicate>> {
    let negated = match &filter.operator {
        FilterOperator::Equals => false,
        FilterOperator::NotEquals => true,
        FilterOperator::Unrecognized(operator) => {
            if options.strict {
                return Err(CompileError::UnknownOperator {
                    operator: operator.clone(),
                    dimension: filter.dimension.clone(),
                });
            }
            tracing::warn!(
                dimension = %filter.dimension,
                operator = %operator,
                "skipping filter with unrecognized operator"
            );
            return Ok(None);
        }
    };

    let column = Expr::reference(&filter.dimension);
    let predicate = match filter.values.as_slice() {
        [] => {
            if options.strict {
                return Err(CompileError::EmptyFilterValues {
                    dimension: filter.dimension.clone(),
                });
            }
            tracing::warn!(dimension = %filter.dimension, "skipping filter with no values");
            return Ok(None);
        }
        [value] => {
            let op = if negated { CompareOp::Ne } else { CompareOp::Eq };
            Predicate::compare(column, op, Expr::value(value))
        }
        values => {
            let list = values.iter().map(|v| Expr::value(v)).collect();
            if negated {
                Predicate::not_in_list(column, list)
            } else {
                Predicate::in_list(column, list)
            }
        }
    };

    Ok(Some(predicate))
}

// ============================================================================
// Tests
// ============================================================================
