//! Shared error types for the services crate.

use thiserror::Error;

use care_core::model::{
    AppointmentError, AppointmentId, CheckupError, DoctorError, SessionError, StoryError,
    TaskError,
};
use care_core::progress::CalendarError;
use care_core::wizard::WizardError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors raised by the backend and ML clients.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("request failed with status {status}: {}", message.as_deref().unwrap_or("no message"))]
    HttpStatus {
        status: reqwest::StatusCode,
        message: Option<String>,
    },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("cannot build request url: {0}")]
    Url(String),
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

impl ApiError {
    /// Message sent back by the server, if the failure carried one.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::HttpStatus { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

/// Errors raised while reading `ServiceConfig` from the environment.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("{var} is not a valid url: {value}")]
    InvalidUrl { var: &'static str, value: String },
    #[error("{var} must be a positive integer, got {value}")]
    InvalidNumber { var: &'static str, value: String },
}

/// Errors emitted by `TrackerService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TrackerError {
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error(transparent)]
    Calendar(#[from] CalendarError),
    #[error("failed to load progress history: {0}")]
    History(#[source] ApiError),
    #[error("failed to record today's completion: {0}")]
    Completion(#[source] ApiError),
}

/// Errors emitted by `WizardFormController::submit`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] WizardError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors emitted by `CommunityFeed`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FeedError {
    #[error(transparent)]
    Access(#[from] SessionError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors emitted by `ChatService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChatError {
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors emitted by `CheckupService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CheckupServiceError {
    #[error(transparent)]
    Validation(#[from] CheckupError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors emitted by `AppointmentService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppointmentServiceError {
    #[error(transparent)]
    Validation(#[from] AppointmentError),
    #[error("appointment {0} not found")]
    NotFound(AppointmentId),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors emitted by `StoryService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoryServiceError {
    #[error(transparent)]
    Validation(#[from] StoryError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors emitted by `SessionService` and `DoctorService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] DoctorError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Api(#[from] ApiError),
}
