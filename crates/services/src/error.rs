//! Shared error types for the services crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors emitted by `QuestionProvider` implementations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProviderError {
    #[error("unknown subject: {0}")]
    UnknownSubject(String),
    #[error("failed to read question bank {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed question bank {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors emitted by `QuizController`.
///
/// Invalid quiz actions are not errors; they leave the session unchanged.
/// This only reports that the controller's event loop is gone.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ControllerError {
    #[error("quiz controller has shut down")]
    Closed,
}

/// Why a quiz could not be started.
///
/// The presentation layer shows a single "failed to load" condition for every
/// variant; the cause is kept for logs.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadFailure {
    #[error("no questions available for the request")]
    Empty,
    #[error(transparent)]
    Provider(#[from] ProviderError),
}
