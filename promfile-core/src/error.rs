use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for promfile.
#[derive(Error, Debug)]
pub enum ExporterError {
    #[error("Need to specify {0}")]
    MissingEnv(&'static str),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Invalid JSON document: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Field not found in document: {path}")]
    MissingField { path: String },

    #[error("Field is not a number: {path}")]
    NotANumber { path: String },

    #[error("Duplicate metric name: {0}")]
    DuplicateMetric(String),

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Encode error: {0}")]
    Encode(String),
}

/// Coarse error classes, used for logging only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Acquisition,
    Schema,
    Write,
}

impl ExporterError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExporterError::MissingEnv(_) | ExporterError::Config(_) => ErrorKind::Configuration,
            ExporterError::Spawn { .. }
            | ExporterError::CommandFailed { .. }
            | ExporterError::Http(_)
            | ExporterError::Decode(_) => ErrorKind::Acquisition,
            ExporterError::MissingField { .. }
            | ExporterError::NotANumber { .. }
            | ExporterError::DuplicateMetric(_) => ErrorKind::Schema,
            ExporterError::Write { .. } | ExporterError::Encode(_) => ErrorKind::Write,
        }
    }

    /// Process exit status. Only success/failure is distinguished.
    pub fn exit_code(&self) -> u8 {
        1
    }
}

impl From<figment::Error> for ExporterError {
    fn from(e: figment::Error) -> Self {
        ExporterError::Config(e.to_string())
    }
}
