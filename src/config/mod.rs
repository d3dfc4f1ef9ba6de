//! Configuration module for semquery.
//!
//! Handles the TOML settings file and environment variable expansion.

mod settings;

pub use settings::{
    expand_env_vars, CompilerSettings, LoggingSettings, ParserSettings, RegistrySettings,
    Settings, SettingsError, ValidationSettings,
};
