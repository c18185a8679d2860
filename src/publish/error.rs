//! Publish pipeline errors

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Failures of the build/publish pipeline
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Content directory not found: {0:?}")]
    MissingContent(PathBuf),

    #[error("Publishing target {target:?} overlaps {other:?}")]
    UnsafeTarget { target: PathBuf, other: PathBuf },

    #[error("Generator executable not found: {0}")]
    GeneratorNotFound(String),

    #[error("Failed to start generator `{command}`: {source}")]
    GeneratorSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Generator `{command}` failed with {status}")]
    GeneratorFailed { command: String, status: ExitStatus },

    #[error("Build output {0:?} is missing or contains no files")]
    EmptyOutput(PathBuf),

    #[error("Staged site differs from build output: {0}")]
    ManifestMismatch(String),

    #[error("Invalid preserve pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}

impl PublishError {
    /// Attach a path to an IO error
    pub fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| PublishError::Io { path, source }
    }
}

pub type PublishResult<T> = Result<T, PublishError>;
