//! Error types for the view engine.

use std::path::PathBuf;

use almanac_dispatch::{HookError, SerializeError};
use almanac_render::RenderError;
use thiserror::Error;

/// Errors raised while loading or persisting user settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to access settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Errors raised while loading the engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Errors raised while serving a request.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Hook(#[from] HookError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Serialize(#[from] SerializeError),
    /// A query-args filter returned something that is not a query.
    #[error("query arguments rejected: {0}")]
    QueryArgs(#[source] serde_json::Error),
    /// The event source failed.
    #[error("event query failed: {0:#}")]
    Query(anyhow::Error),
}
