//! Shared error types for the services crate.

use thiserror::Error;

use assess_core::model::QuestionSetError;
use storage::StorageError;
use storage::sqlite::SqliteInitError;

use crate::session::SessionState;

/// Errors emitted by the HTTP backend client.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BackendError {
    #[error("invalid backend url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("backend request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("invalid document: {0}")]
    InvalidDocument(String),
    #[error("failed to read document: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors emitted by `AppState`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppStateError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

/// Errors emitted by the assessment session.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("failed to load questions: {0}")]
    LoadFailed(#[source] BackendError),
    #[error(transparent)]
    QuestionSet(#[from] QuestionSetError),
    #[error("operation not allowed while session is {0:?}")]
    InvalidState(SessionState),
    #[error("option {index} is out of range for this question")]
    InvalidOption { index: usize },
    #[error("no signed-in user to attribute the submission to")]
    NotSignedIn,
    #[error("failed to submit test: {0}")]
    SubmitFailed(#[source] BackendError),
}

/// Errors emitted by `HistoryService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HistoryError {
    #[error("no signed-in user")]
    NotSignedIn,
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    AppState(#[from] AppStateError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}
