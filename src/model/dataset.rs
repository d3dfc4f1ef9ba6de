// src/model/dataset.rs
use serde::{Deserialize, Serialize};

/// Aggregation applied by a measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    #[default]
    Sum,
    Count,
    Avg,
    Min,
    Max,
}

impl Aggregation {
    /// Parse an aggregation kind from its registration-document spelling.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "sum" => Some(Aggregation::Sum),
            "count" => Some(Aggregation::Count),
            "avg" => Some(Aggregation::Avg),
            "min" => Some(Aggregation::Min),
            "max" => Some(Aggregation::Max),
            _ => None,
        }
    }
}

/// Declared type of a dimension's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    #[default]
    String,
    Number,
    Boolean,
    Date,
    Timestamp,
}

impl ValueType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "string" => Some(ValueType::String),
            "number" => Some(ValueType::Number),
            "boolean" => Some(ValueType::Boolean),
            "date" => Some(ValueType::Date),
            "timestamp" => Some(ValueType::Timestamp),
            _ => None,
        }
    }

    /// Date and timestamp dimensions take part in granularity truncation.
    pub fn is_temporal(&self) -> bool {
        matches!(self, ValueType::Date | ValueType::Timestamp)
    }
}

/// A named aggregate quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    pub name: String,
    pub aggregation: Aggregation,
    /// SQL expression over the dataset's base rows, e.g. `SUM(order_amount)`.
    pub expression: String,
}

impl Measure {
    pub fn new(name: &str, aggregation: Aggregation, expression: &str) -> Self {
        Self {
            name: name.into(),
            aggregation,
            expression: expression.into(),
        }
    }
}

/// A groupable, filterable attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    pub name: String,
    pub expression: String,
    pub value_type: ValueType,
}

impl Dimension {
    pub fn new(name: &str, expression: &str) -> Self {
        Self {
            name: name.into(),
            expression: expression.into(),
            value_type: ValueType::String,
        }
    }

    /// A date-typed dimension.
    pub fn time(name: &str, expression: &str) -> Self {
        Self::new(name, expression).with_type(ValueType::Date)
    }

    pub fn with_type(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }

    pub fn is_time(&self) -> bool {
        self.value_type.is_temporal()
    }
}

/// A registered dataset: ordered measures and dimensions over one base table.
///
/// Time dimensions live in `dimensions` alongside the others and are told
/// apart by their [`ValueType`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Dataset {
    pub name: String,
    pub measures: Vec<Measure>,
    pub dimensions: Vec<Dimension>,
}

impl Dataset {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_measure(mut self, measure: Measure) -> Self {
        self.measures.push(measure);
        self
    }

    pub fn with_dimension(mut self, dimension: Dimension) -> Self {
        self.dimensions.push(dimension);
        self
    }

    /// First measure with the given name, in declaration order.
    pub fn measure(&self, name: &str) -> Option<&Measure> {
        self.measures.iter().find(|m| m.name == name)
    }

    /// First dimension with the given name, in declaration order.
    pub fn dimension(&self, name: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.name == name)
    }
}
