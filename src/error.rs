use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("You already have an active or approved request.")]
    DuplicateActiveRequest,

    #[error("Course not found or its capacity is full.")]
    CourseUnavailable,

    #[error("Request not found.")]
    RequestNotFound,

    #[error("This request has already been decided.")]
    AlreadyDecided,

    #[error("Your supervision capacity is full.")]
    CapacityExhausted,

    #[error("Invalid action.")]
    InvalidAction,

    #[error("You do not have an approved thesis course.")]
    NoApprovedCourse,

    #[error("At least 3 months must have passed since your course approval date.")]
    WaitingPeriodNotElapsed,

    #[error("{0} examiner not found or their capacity is full.")]
    ExaminerUnavailable(&'static str),

    #[error("Professor not found.")]
    ProfessorNotFound,

    #[error("User not found.")]
    UserNotFound,

    #[error("Invalid credentials.")]
    InvalidCredentials,

    #[error("Passwords do not match.")]
    PasswordMismatch,

    #[error("Thesis not found.")]
    ThesisNotFound,

    #[error("You are not an examiner of this thesis.")]
    NotAnExaminer,

    #[error("This thesis has already been graded.")]
    ThesisClosed,

    #[error("Score must be between 0 and 100, got {0}.")]
    InvalidScore(u32),

    #[error("Storage error: {0}")]
    PersistenceUnavailable(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::PersistenceUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::PersistenceUnavailable(err.to_string())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::PersistenceUnavailable(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::PersistenceUnavailable(err.to_string())
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::RequestNotFound
            | AppError::ThesisNotFound
            | AppError::ProfessorNotFound
            | AppError::UserNotFound => StatusCode::NOT_FOUND,
            AppError::DuplicateActiveRequest
            | AppError::CourseUnavailable
            | AppError::AlreadyDecided
            | AppError::CapacityExhausted
            | AppError::ExaminerUnavailable(_)
            | AppError::ThesisClosed => StatusCode::CONFLICT,
            AppError::InvalidAction
            | AppError::NoApprovedCourse
            | AppError::WaitingPeriodNotElapsed
            | AppError::InvalidScore(_)
            | AppError::PasswordMismatch => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::NotAnExaminer => StatusCode::FORBIDDEN,
            AppError::PersistenceUnavailable(_) | AppError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// The (success flag, message) pair every operation resolves to at its boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub success: bool,
    pub message: String,
}

impl Outcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self { success: true, message: message.into() }
    }
}

impl From<&AppError> for Outcome {
    fn from(err: &AppError) -> Self {
        Self { success: false, message: err.to_string() }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let outcome = match &self {
            AppError::PersistenceUnavailable(e) | AppError::Config(e) => {
                error!("storage error: {}", e);
                Outcome {
                    success: false,
                    message: "Storage error occurred".to_string(),
                }
            }
            other => Outcome::from(other),
        };

        let body = Json(ErrorResponse {
            error: status.to_string(),
            outcome,
        });

        (status, body).into_response()
    }
}
