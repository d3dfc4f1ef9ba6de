//! Semantic query documents.
//!
//! Decodes the JSON query contract into a [`SemanticQuery`]. Only shape is
//! checked here; name resolution belongs to [`crate::validation`].

use serde::Deserialize;

use crate::model::{
    DateRange, Filter, FilterOperator, Granularity, OrderTerm, SemanticQuery, TimeWindow,
};

/// Default cap on query document size.
pub const DEFAULT_MAX_DOCUMENT_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Invalid JSON in semantic query: {0}")]
    Malformed(String),

    #[error("Semantic query document is {size} bytes, limit is {max}")]
    DocumentTooLarge { size: usize, max: usize },
}

/// Options for parsing.
#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    pub max_document_bytes: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
        }
    }
}

impl ParseOptions {
    pub fn with_max_document_bytes(mut self, max: usize) -> Self {
        self.max_document_bytes = max;
        self
    }
}

#[derive(Debug, Deserialize)]
struct QueryDocument {
    #[serde(default)]
    dataset: String,
    #[serde(default)]
    measures: Vec<String>,
    #[serde(default)]
    dimensions: Vec<String>,
    #[serde(default)]
    filters: Vec<FilterEntry>,
    #[serde(default)]
    time_dimensions: Vec<TimeDimensionEntry>,
    #[serde(default)]
    order: Vec<OrderEntry>,
    limit: Option<i64>,
    time_zone: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FilterEntry {
    dimension: String,
    operator: String,
    values: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TimeDimensionEntry {
    dimension: String,
    granularity: Option<String>,
    date_range: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct OrderEntry {
    id: String,
    #[serde(default)]
    desc: bool,
}

/// Parse a query document with default options.
pub fn parse(text: &str) -> Result<SemanticQuery, ParseError> {
    parse_with(text, ParseOptions::default())
}

pub fn parse_with(text: &str, options: ParseOptions) -> Result<SemanticQuery, ParseError> {
    if text.len() > options.max_document_bytes {
        return Err(ParseError::DocumentTooLarge {
            size: text.len(),
            max: options.max_document_bytes,
        });
    }

    let doc: QueryDocument =
        serde_json::from_str(text).map_err(|e| ParseError::Malformed(e.to_string()))?;

    let time_windows = doc
        .time_dimensions
        .into_iter()
        .map(time_window)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SemanticQuery {
        dataset: doc.dataset,
        measures: doc.measures,
        dimensions: doc.dimensions,
        filters: doc
            .filters
            .into_iter()
            .map(|f| Filter {
                dimension: f.dimension,
                operator: FilterOperator::parse(&f.operator),
                values: f.values,
            })
            .collect(),
        time_windows,
        order: doc
            .order
            .into_iter()
            .map(|o| OrderTerm {
                key: o.id,
                descending: o.desc,
            })
            .collect(),
        limit: doc.limit,
        time_zone: doc.time_zone,
    })
}

fn time_window(entry: TimeDimensionEntry) -> Result<TimeWindow, ParseError> {
    let date_range = match entry.date_range {
        None => None,
        Some(bounds) => match <[String; 2]>::try_from(bounds) {
            Ok([start, end]) => Some(DateRange { start, end }),
            Err(bounds) => {
                return Err(ParseError::Malformed(format!(
                    "date_range for '{}' must have exactly 2 entries, got {}",
                    entry.dimension,
                    bounds.len()
                )))
            }
        },
    };

    Ok(TimeWindow {
        granularity: entry.granularity.as_deref().map(Granularity::parse),
        dimension: entry.dimension,
        date_range,
    })
}
