// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Startup configuration problems. Raised before any file is read or written.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {var} is not set")]
    MissingApiKey { var: &'static str },

    #[error("environment variable {var} still holds a placeholder value; set a real API key")]
    PlaceholderApiKey { var: &'static str },

    #[error("invalid setting {name}: {reason}")]
    InvalidSetting { name: &'static str, reason: String },
}

/// Failures while loading the input CSV.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("input file {0} does not exist")]
    FileNotFound(PathBuf),

    #[error("failed reading {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("malformed input {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },
}

impl IngestError {
    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        IngestError::Malformed {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("invalid batch plan: {0}")]
    InvalidConfig(String),
}

/// A failed model call. `Display` is the bare message that gets embedded in
/// the `Answer` column, so it carries no prefix of its own.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("timeout")]
    Timeout,

    #[error("{0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("response contained no candidate text")]
    EmptyResponse,
}

impl From<reqwest::Error> for ModelError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ModelError::Timeout
        } else {
            ModelError::Transport(e.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("creating output {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("writing output {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("flushing output {path}: {source}")]
    Flush {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Anything that aborts a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error("batch task in group {group} failed: {source}")]
    Task {
        group: usize,
        #[source]
        source: tokio::task::JoinError,
    },

    #[error(transparent)]
    Output(#[from] OutputError),
}
