//! TOML-based configuration for semquery.
//!
//! Supports a config file (semquery.toml) with environment variable expansion
//! in dataset paths.
//!
//! Example configuration:
//! ```toml
//! [parser]
//! max_document_bytes = 1048576
//!
//! [compiler]
//! literal_mode = "bind"
//! strict = true
//!
//! [validation]
//! strict_references = true
//!
//! [registry]
//! check_expressions = true
//!
//! [logging]
//! filter = "semquery=debug"
//!
//! [datasets]
//! orders_ds = "${DATA_DIR}/orders_ds.json"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::compile::CompileOptions;
use crate::engine::{EngineError, EngineOptions, RegistrationSummary, SemanticEngine};
use crate::parser::{ParseOptions, DEFAULT_MAX_DOCUMENT_BYTES};
use crate::registry::DocumentOptions;
use crate::sql::LiteralMode;
use crate::validation::ValidateOptions;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Failed to read dataset '{name}' from {path}: {source}")]
    DatasetFile {
        name: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to register dataset '{name}': {source}")]
    DatasetRegistration {
        name: String,
        #[source]
        source: EngineError,
    },
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub parser: ParserSettings,
    pub compiler: CompilerSettings,
    pub validation: ValidationSettings,
    pub registry: RegistrySettings,
    pub logging: LoggingSettings,

    /// Dataset name to registration document path (supports ${ENV_VAR}).
    pub datasets: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ParserSettings {
    /// Largest accepted query document, in bytes.
    pub max_document_bytes: usize,
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CompilerSettings {
    /// "inline" or "bind".
    pub literal_mode: LiteralMode,

    /// Reject unknown operators, unknown granularities and empty filters.
    pub strict: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ValidationSettings {
    /// Resolve filter dimensions and order keys as well.
    pub strict_references: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RegistrySettings {
    /// Parse every registered `sql` fragment before accepting it.
    pub check_expressions: bool,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            check_expressions: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing` filter directive, used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `SEMQUERY_CONFIG`
    /// 2. `./semquery.toml`
    /// 3. `~/.config/semquery/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("SEMQUERY_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("semquery.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("semquery").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            parse: ParseOptions::default().with_max_document_bytes(self.parser.max_document_bytes),
            validate: ValidateOptions::default()
                .with_strict_references(self.validation.strict_references),
            compile: CompileOptions::default()
                .with_literal_mode(self.compiler.literal_mode)
                .with_strict(self.compiler.strict),
            document: DocumentOptions::default()
                .with_check_expressions(self.registry.check_expressions),
        }
    }

    /// Register every configured dataset with `engine`, in name order.
    pub fn preload(&self, engine: &SemanticEngine) -> Result<Vec<RegistrationSummary>, SettingsError> {
        let mut summaries = Vec::with_capacity(self.datasets.len());
        for (name, raw) in &self.datasets {
            let path = PathBuf::from(expand_env_vars(raw)?);
            let text = fs::read_to_string(&path).map_err(|source| SettingsError::DatasetFile {
                name: name.clone(),
                path: path.clone(),
                source,
            })?;
            let summary = engine.register_dataset(name, &text).map_err(|source| {
                SettingsError::DatasetRegistration {
                    name: name.clone(),
                    source,
                }
            })?;
            summaries.push(summary);
        }
        Ok(summaries)
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let braced = chars.next_if_eq(&'{').is_some();
        let var_name: String = if braced {
            let name: String = std::iter::from_fn(|| chars.next_if(|&ch| ch != '}')).collect();
            chars.next(); // '}'
            name
        } else {
            std::iter::from_fn(|| chars.next_if(|&ch| ch.is_alphanumeric() || ch == '_')).collect()
        };

        if var_name.is_empty() {
            if braced {
                return Err(SettingsError::MissingEnvVar(var_name));
            }
            // Lone $
            result.push('$');
            continue;
        }

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
