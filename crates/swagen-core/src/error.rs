use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported OpenAPI version: {0}")]
    UnsupportedVersion(String),
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("circular reference detected: {0}")]
    CircularRef(String),

    #[error("invalid reference format: {0}")]
    InvalidRefFormat(String),

    #[error("reference target not found: {0}")]
    RefTargetNotFound(String),
}

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveError),
}

/// Errors raised while resolving a derived run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no generator selected for run `{input}`; set `generatorName` in the base config")]
    MissingGenerator { input: String },

    #[error("malformed run descriptor: {0}")]
    MalformedRun(String),

    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },
}

/// Errors raised by a generator variant.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("unknown generator `{0}`")]
    UnknownVariant(String),

    #[error("generator `{variant}` does not support library `{library}` (supported: {supported})")]
    UnsupportedLibrary {
        variant: String,
        library: String,
        supported: String,
    },

    #[error("`{value}` is an invalid value for option `{key}`. Please choose from: {allowed}")]
    InvalidOption {
        key: String,
        value: String,
        allowed: String,
    },

    #[error("transform failed: {0}")]
    Transform(#[from] TransformError),

    #[error("render failed: {0}")]
    Render(String),
}

/// Errors raised while executing a generation task.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("refusing to delete {0}: the output directory equals a project directory")]
    UnsafeOutputDir(PathBuf),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Generator(#[from] GeneratorError),
}
