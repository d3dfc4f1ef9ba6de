// src/model/query.rs
use serde::Serialize;

/// Comparison applied by a filter.
///
/// Unknown operator text is kept so the compiler can decide whether to
/// skip it or report it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    Equals,
    NotEquals,
    Unrecognized(String),
}

impl FilterOperator {
    pub fn parse(s: &str) -> Self {
        match s {
            "equals" => FilterOperator::Equals,
            "not_equals" => FilterOperator::NotEquals,
            other => FilterOperator::Unrecognized(other.to_string()),
        }
    }
}

/// Truncation unit for a time window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Day,
    Month,
    Year,
    Unrecognized(String),
}

impl Granularity {
    pub fn parse(s: &str) -> Self {
        match s {
            "day" => Granularity::Day,
            "month" => Granularity::Month,
            "year" => Granularity::Year,
            other => Granularity::Unrecognized(other.to_string()),
        }
    }

    /// The `DATE_TRUNC` part name, if this is a recognised unit.
    pub fn date_part(&self) -> Option<&'static str> {
        match self {
            Granularity::Day => Some("day"),
            Granularity::Month => Some("month"),
            Granularity::Year => Some("year"),
            Granularity::Unrecognized(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Filter {
    pub dimension: String,
    pub operator: FilterOperator,
    pub values: Vec<String>,
}

impl Filter {
    pub fn equals(dimension: &str, values: &[&str]) -> Self {
        Self {
            dimension: dimension.into(),
            operator: FilterOperator::Equals,
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    pub fn not_equals(dimension: &str, values: &[&str]) -> Self {
        Self {
            operator: FilterOperator::NotEquals,
            ..Self::equals(dimension, values)
        }
    }
}

/// Inclusive date bounds. Ordering of `start` and `end` is not checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    pub dimension: String,
    pub granularity: Option<Granularity>,
    pub date_range: Option<DateRange>,
}

impl TimeWindow {
    pub fn new(dimension: &str) -> Self {
        Self {
            dimension: dimension.into(),
            granularity: None,
            date_range: None,
        }
    }

    pub fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = Some(granularity);
        self
    }

    pub fn with_range(mut self, start: &str, end: &str) -> Self {
        self.date_range = Some(DateRange {
            start: start.into(),
            end: end.into(),
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderTerm {
    /// Measure, dimension or time-window alias.
    pub key: String,
    pub descending: bool,
}

impl OrderTerm {
    pub fn asc(key: &str) -> Self {
        Self {
            key: key.into(),
            descending: false,
        }
    }

    pub fn desc(key: &str) -> Self {
        Self {
            key: key.into(),
            descending: true,
        }
    }
}

/// A parsed semantic query against a single dataset.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SemanticQuery {
    pub dataset: String,
    pub measures: Vec<String>,
    pub dimensions: Vec<String>,
    pub filters: Vec<Filter>,
    pub time_windows: Vec<TimeWindow>,
    pub order: Vec<OrderTerm>,
    /// Only a strictly positive value limits the result.
    pub limit: Option<i64>,
    /// Carried through; SQL generation does not apply it.
    pub time_zone: Option<String>,
}

impl SemanticQuery {
    pub fn new(dataset: &str) -> Self {
        Self {
            dataset: dataset.into(),
            ..Default::default()
        }
    }

    pub fn with_measures(mut self, names: &[&str]) -> Self {
        self.measures.extend(names.iter().map(|n| n.to_string()));
        self
    }

    pub fn with_dimensions(mut self, names: &[&str]) -> Self {
        self.dimensions.extend(names.iter().map(|n| n.to_string()));
        self
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_time_window(mut self, window: TimeWindow) -> Self {
        self.time_windows.push(window);
        self
    }

    pub fn with_order(mut self, term: OrderTerm) -> Self {
        self.order.push(term);
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// The limit to emit, if any.
    pub fn effective_limit(&self) -> Option<u64> {
        self.limit.filter(|l| *l > 0).map(|l| l as u64)
    }
}
