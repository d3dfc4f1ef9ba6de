//! # semquery
//!
//! A semantic-query compiler: JSON queries over registered datasets become
//! single-table SQL aggregations.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │            Dataset registration (JSON document)          │
//! │          (measures, dimensions, time dimensions)         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [registry]
//! ┌─────────────────────────────────────────────────────────┐
//! │        DatasetRegistry (name → Arc<Dataset> snapshot)    │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!   semantic query JSON ──▶│ [parser] → [validation]
//!                          ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │           SemanticQuery resolved against Dataset         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [compile]
//! ┌─────────────────────────────────────────────────────────┐
//! │        SQL text + output schema + bind parameters        │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! [`engine::SemanticEngine`] wires the stages together.

pub mod compile;
pub mod config;
pub mod engine;
pub mod model;
pub mod parser;
pub mod registry;
pub mod sql;
pub mod validation;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::compile::{
        compile, ColumnRole, CompileError, CompileOptions, CompileOutput, OutputColumn,
    };
    pub use crate::engine::{
        EngineError, EngineOptions, QueryResponse, RegistrationSummary, SemanticEngine,
    };
    pub use crate::model::{
        Aggregation, DateRange, Dataset, Dimension, Filter, FilterOperator, Granularity, Measure,
        OrderTerm, SemanticQuery, TimeWindow, ValueType,
    };
    pub use crate::parser::{parse, ParseError, ParseOptions};
    pub use crate::registry::{DatasetRegistry, RegistrationError};
    pub use crate::sql::LiteralMode;
    pub use crate::validation::{validate, ValidateOptions, ValidationError};
}

pub use engine::SemanticEngine;
pub use registry::DatasetRegistry;
