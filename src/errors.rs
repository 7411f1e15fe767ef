use std::collections::BTreeMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use redis::RedisError;
use serde_json::json;
use thiserror::Error;

/// Per-field validation messages keyed by the wire name of the field.
pub type FieldErrors = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Validation,
    NotFound,
    Conflict,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Redis pool error: {0}")]
    RedisPoolError(String),

    #[error("Redis command error: {0}")]
    RedisCommandError(#[from] RedisError),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Record store request failed: {0}")]
    NetworkFailure(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Validation failed")]
    Validation(FieldErrors),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Env error: {0}")]
    EnvError(String),

    #[error("Review already liked")]
    AlreadyLiked,

    #[error("A like for this review is already being submitted")]
    LikeInFlight,

    #[error("Not found")]
    NotFound(String),

    #[error("SMTP credentials not set")]
    MailerUnavailable,

    #[error("Mail error: {0}")]
    MailError(String),
}

impl AppError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::RedisPoolError(_)
            | AppError::RedisCommandError(_)
            | AppError::DatabaseError(_)
            | AppError::NetworkFailure(_)
            | AppError::Serialization(_)
            | AppError::Deserialization(_)
            | AppError::EnvError(_)
            | AppError::MailerUnavailable
            | AppError::MailError(_) => ErrorCategory::Network,
            AppError::Validation(_) | AppError::BadRequest(_) => ErrorCategory::Validation,
            AppError::AlreadyLiked | AppError::LikeInFlight => ErrorCategory::Conflict,
            AppError::NotFound(_) => ErrorCategory::NotFound,
        }
    }

    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), message.into());
        AppError::Validation(errors)
    }

    pub fn to_response(&self) -> (StatusCode, String) {
        match self {
            AppError::RedisPoolError(e) => (StatusCode::BAD_GATEWAY, e.clone()),
            AppError::RedisCommandError(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
            AppError::DatabaseError(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            AppError::NetworkFailure(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            AppError::Serialization(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            AppError::Deserialization(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            AppError::Validation(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Please fill in all required fields.".into(),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::EnvError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            AppError::AlreadyLiked => (
                StatusCode::CONFLICT,
                "You have already marked this review as helpful".into(),
            ),
            AppError::LikeInFlight => (
                StatusCode::CONFLICT,
                "Your like is still being submitted".into(),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::MailerUnavailable => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "SMTP credentials not set".into(),
            ),
            AppError::MailError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.to_response();

        let body = match self {
            AppError::Validation(fields) => json!({ "error": message, "fields": fields }),
            _ => json!({ "error": message }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::AlreadyLiked
            }
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            _ => AppError::DatabaseError(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AppError::Deserialization(err.to_string())
        } else {
            AppError::NetworkFailure(err.to_string())
        }
    }
}

impl From<bb8::RunError<RedisError>> for AppError {
    fn from(err: bb8::RunError<RedisError>) -> Self {
        match err {
            bb8::RunError::User(err) => AppError::RedisCommandError(err),
            bb8::RunError::TimedOut => {
                AppError::RedisPoolError("Redis connection timed out".into())
            }
        }
    }
}
