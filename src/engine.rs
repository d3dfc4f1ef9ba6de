//! Engine facade over the registry, parser, validator and compiler.
//!
//! ```text
//! register_dataset(name, json) → registry::document → DatasetRegistry
//! semantic_query(json, explain) → parser → snapshot → validation → compile
//! ```

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::compile::{self, CompileError, CompileOptions, CompileOutput};
use crate::model::Dataset;
use crate::parser::{self, ParseError, ParseOptions};
use crate::registry::{parse_dataset, DatasetRegistry, DocumentOptions, RegistrationError};
use crate::validation::{self, ValidateOptions, ValidationError};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Registration(#[from] RegistrationError),
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Per-stage options, usually built from [`crate::config::Settings`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineOptions {
    pub parse: ParseOptions,
    pub validate: ValidateOptions,
    pub compile: CompileOptions,
    pub document: DocumentOptions,
}

/// Outcome of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationSummary {
    pub dataset: String,
    pub measures: usize,
    pub dimensions: usize,
    pub replaced: bool,
}

impl fmt::Display for RegistrationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dataset '{}' registered successfully", self.dataset)
    }
}

/// Response to a semantic query request.
///
/// Serializes as `{"sql"}` for explain and `{"sql", "schema", "params"}` otherwise.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum QueryResponse {
    /// Explain mode: the SQL that would run.
    Explain { sql: String },
    Compiled(CompileOutput),
}

impl QueryResponse {
    pub fn sql(&self) -> &str {
        match self {
            QueryResponse::Explain { sql } => sql,
            QueryResponse::Compiled(output) => &output.sql,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SemanticEngine {
    registry: Arc<DatasetRegistry>,
    options: EngineOptions,
}

impl SemanticEngine {
    pub fn new(options: EngineOptions) -> Self {
        Self {
            registry: Arc::new(DatasetRegistry::new()),
            options,
        }
    }

    /// Build an engine over an existing shared registry.
    pub fn with_registry(registry: Arc<DatasetRegistry>, options: EngineOptions) -> Self {
        Self { registry, options }
    }

    pub fn registry(&self) -> &Arc<DatasetRegistry> {
        &self.registry
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Decode a registration document and register it under `name`.
    ///
    /// The registry is untouched when decoding fails.
    pub fn register_dataset(&self, name: &str, text: &str) -> EngineResult<RegistrationSummary> {
        let dataset = parse_dataset(name, text, self.options.document)?;
        Ok(self.register(dataset))
    }

    pub fn register(&self, dataset: Dataset) -> RegistrationSummary {
        let dataset_name = dataset.name.clone();
        let (measures, dimensions) = (dataset.measures.len(), dataset.dimensions.len());
        let replaced = self.registry.insert(dataset);
        RegistrationSummary {
            dataset: dataset_name,
            measures,
            dimensions,
            replaced,
        }
    }

    /// Parse, validate and compile a query document.
    pub fn compile_query(&self, text: &str) -> EngineResult<CompileOutput> {
        let query = parser::parse_with(text, self.options.parse)?;

        // One snapshot serves both validation and compilation.
        let snapshot = self.registry.get(&query.dataset);
        validation::validate(&query, snapshot.as_deref(), self.options.validate)?;
        let dataset = snapshot.ok_or_else(|| ValidationError::UnknownDataset {
            dataset: query.dataset.clone(),
        })?;

        Ok(compile::compile(&query, &dataset, self.options.compile)?)
    }

    pub fn semantic_query(&self, text: &str, explain: bool) -> EngineResult<QueryResponse> {
        let output = self.compile_query(text)?;
        if explain {
            Ok(QueryResponse::Explain { sql: output.sql })
        } else {
            Ok(QueryResponse::Compiled(output))
        }
    }
}
