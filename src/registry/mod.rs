//! Dataset registry.
//!
//! Maps dataset names to immutable [`Dataset`] snapshots. Registration
//! swaps the whole `Arc` for a name, so a reader holding a snapshot sees
//! one complete definition for the rest of its request.
//!
//! The registry is an explicit object: share it with `Arc<DatasetRegistry>`
//! between request handlers.

pub mod document;

pub use document::{parse_dataset, DocumentOptions, RegistrationError};

use std::sync::Arc;

use dashmap::DashMap;

use crate::model::{Dataset, Dimension, Measure, SemanticQuery};
use crate::validation::{self, ValidateOptions, ValidationError};

#[derive(Debug, Default)]
pub struct DatasetRegistry {
    datasets: DashMap<String, Arc<Dataset>>,
}

impl DatasetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a dataset, fully replacing any prior definition for `name`.
    ///
    /// Returns `true` when an existing definition was replaced.
    pub fn register(&self, name: &str, measures: Vec<Measure>, dimensions: Vec<Dimension>) -> bool {
        self.insert(Dataset {
            name: name.to_string(),
            measures,
            dimensions,
        })
    }

    /// Register a prepared dataset under its own name.
    pub fn insert(&self, dataset: Dataset) -> bool {
        let name = dataset.name.clone();
        let (measures, dimensions) = (dataset.measures.len(), dataset.dimensions.len());
        let replaced = self.datasets.insert(name.clone(), Arc::new(dataset)).is_some();

        tracing::info!(
            dataset = %name,
            measures,
            dimensions,
            replaced,
            "registered dataset"
        );
        replaced
    }

    /// Snapshot of a dataset definition.
    pub fn get(&self, name: &str) -> Option<Arc<Dataset>> {
        self.datasets.get(name).map(|entry| Arc::clone(entry.value()))
    }

    pub fn lookup_measures(&self, name: &str) -> Option<Vec<Measure>> {
        self.get(name).map(|ds| ds.measures.clone())
    }

    pub fn lookup_dimensions(&self, name: &str) -> Option<Vec<Dimension>> {
        self.get(name).map(|ds| ds.dimensions.clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.datasets.contains_key(name)
    }

    pub fn remove(&self, name: &str) -> Option<Arc<Dataset>> {
        self.datasets.remove(name).map(|(_, ds)| ds)
    }

    /// Registered dataset names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.datasets.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    /// Validate a query against the dataset it names.
    pub fn validate(&self, query: &SemanticQuery) -> Result<(), ValidationError> {
        self.validate_with(query, ValidateOptions::default())
    }

    pub fn validate_with(
        &self,
        query: &SemanticQuery,
        options: ValidateOptions,
    ) -> Result<(), ValidationError> {
        let dataset = self.get(&query.dataset);
        validation::validate(query, dataset.as_deref(), options)
    }
}
