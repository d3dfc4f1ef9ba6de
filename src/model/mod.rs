//! Semantic query and dataset types.
//!
//! Plain data: the registry, validator and compiler give these meaning.

pub mod dataset;
pub mod query;

pub use dataset::{Aggregation, Dataset, Dimension, Measure, ValueType};
pub use query::{
    DateRange, Filter, FilterOperator, Granularity, OrderTerm, SemanticQuery, TimeWindow,
};
