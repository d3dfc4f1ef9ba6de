//! Validation of semantic queries against a dataset definition.
//!
//! Phases run in a fixed order and the first failure wins:
//!
//! 1. dataset
//! 2. measures
//! 3. dimensions
//! 4. time dimensions
//! 5. filter dimensions (strict references only)
//! 6. order keys (strict references only)

use crate::model::{Dataset, SemanticQuery};

/// Validation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Dataset '{dataset}' not found in registry")]
    UnknownDataset { dataset: String },

    #[error("Measure '{name}' not found in dataset '{dataset}'")]
    UnknownMeasure { name: String, dataset: String },

    #[error("Dimension '{name}' not found in dataset '{dataset}'")]
    UnknownDimension { name: String, dataset: String },

    #[error("Time dimension '{name}' not found in dataset '{dataset}'")]
    UnknownTimeDimension { name: String, dataset: String },

    #[error("Filter dimension '{name}' not found in dataset '{dataset}'")]
    UnknownFilterDimension { name: String, dataset: String },

    #[error("Order key '{name}' not found in dataset '{dataset}'")]
    UnknownOrderKey { name: String, dataset: String },
}

impl ValidationError {
    /// The name that failed to resolve.
    pub fn name(&self) -> &str {
        match self {
            ValidationError::UnknownDataset { dataset } => dataset,
            ValidationError::UnknownMeasure { name, .. }
            | ValidationError::UnknownDimension { name, .. }
            | ValidationError::UnknownTimeDimension { name, .. }
            | ValidationError::UnknownFilterDimension { name, .. }
            | ValidationError::UnknownOrderKey { name, .. } => name,
        }
    }
}

/// Options for validation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidateOptions {
    /// Also resolve filter dimensions and order keys.
    pub strict_references: bool,
}

impl ValidateOptions {
    pub fn with_strict_references(mut self, strict: bool) -> Self {
        self.strict_references = strict;
        self
    }
}

/// Validate a query against the dataset it names.
///
/// `dataset` is the registry lookup result for `query.dataset`; `None`
/// fails with [`ValidationError::UnknownDataset`].
pub fn validate(
    query: &SemanticQuery,
    dataset: Option<&Dataset>,
    options: ValidateOptions,
) -> Result<(), ValidationError> {
    let dataset = dataset.ok_or_else(|| ValidationError::UnknownDataset {
        dataset: query.dataset.clone(),
    })?;

    for name in &query.measures {
        if dataset.measure(name).is_none() {
            return Err(ValidationError::UnknownMeasure {
                name: name.clone(),
                dataset: query.dataset.clone(),
            });
        }
    }

    for name in &query.dimensions {
        if dataset.dimension(name).is_none() {
            return Err(ValidationError::UnknownDimension {
                name: name.clone(),
                dataset: query.dataset.clone(),
            });
        }
    }

    for window in &query.time_windows {
        if dataset.dimension(&window.dimension).is_none() {
            return Err(ValidationError::UnknownTimeDimension {
                name: window.dimension.clone(),
                dataset: query.dataset.clone(),
            });
        }
    }

    if options.strict_references {
        validate_references(query, dataset)?;
    }

    Ok(())
}

fn validate_references(query: &SemanticQuery, dataset: &Dataset) -> Result<(), ValidationError> {
    for filter in &query.filters {
        if dataset.dimension(&filter.dimension).is_none() {
            return Err(ValidationError::UnknownFilterDimension {
                name: filter.dimension.clone(),
                dataset: query.dataset.clone(),
            });
        }
    }

    for term in &query.order {
        let known = dataset.measure(&term.key).is_some()
            || dataset.dimension(&term.key).is_some()
            || query.time_windows.iter().any(|w| w.dimension == term.key);
        if !known {
            return Err(ValidationError::UnknownOrderKey {
                name: term.key.clone(),
                dataset: query.dataset.clone(),
            });
        }
    }

    Ok(())
}
