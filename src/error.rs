//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the
//! application. Every failure a handler can hit is constructed at the point
//! of detection and propagated unmodified with `?` up to the single
//! `ResponseError` implementation, which shapes the uniform
//! `{statusCode, message, success: false}` envelope.
//!
//! Note the deliberate conflation in `NotFound`: "entity does not exist" and
//! "entity exists but belongs to someone else" are reported identically so
//! that probing requests cannot learn whether an id is taken.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Missing, expired or invalid credentials (HTTP 401).
    Unauthorized(String),
    /// Malformed or invalid request (HTTP 400).
    BadRequest(String),
    /// Entity absent, or present but not owned by the caller (HTTP 404).
    /// The two cases are never distinguished to the client.
    NotFound(String),
    /// Uniqueness violation, e.g. registering an existing email (HTTP 409).
    Conflict(String),
    /// Failed input validation from the `validator` crate (HTTP 400).
    ValidationError(String),
    /// Error from the database layer (HTTP 500, generic message).
    DatabaseError(String),
    /// Any other unexpected server-side failure (HTTP 500).
    InternalServerError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

impl AppError {
    /// The message shown to the client. Server-side detail for 500-class
    /// errors stays in the logs only.
    fn client_message(&self) -> &str {
        match self {
            AppError::Unauthorized(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::ValidationError(msg) => msg,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                "Internal server error"
            }
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{}", self);
        }
        HttpResponse::build(status).json(json!({
            "statusCode": status.as_u16(),
            "message": self.client_message(),
            "success": false
        }))
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `RowNotFound` becomes `NotFound`; everything else is a database error
/// and is shown to the client only as a generic 500.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

/// JWT processing failures (bad signature, expiry, garbage input) all
/// surface as 401.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        AppError::Unauthorized(error.to_string())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        let cases = [
            (AppError::Unauthorized("no token".into()), 401),
            (AppError::BadRequest("bad input".into()), 400),
            (AppError::ValidationError("title too long".into()), 400),
            (AppError::NotFound("missing".into()), 404),
            (AppError::Conflict("email taken".into()), 409),
            (AppError::DatabaseError("pool gone".into()), 500),
            (AppError::InternalServerError("boom".into()), 500),
        ];
        for (error, expected) in cases {
            assert_eq!(error.error_response().status().as_u16(), expected);
        }
    }

    #[test]
    fn test_error_envelope_shape() {
        let error = AppError::NotFound("Task not found or unauthorized".into());
        let response = error.error_response();
        assert_eq!(response.status(), 404);

        let body = actix_web::body::to_bytes(response.into_body());
        let body = futures::executor::block_on(body).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["statusCode"], 404);
        assert_eq!(json["message"], "Task not found or unauthorized");
        assert_eq!(json["success"], false);
    }

    #[test]
    fn test_server_errors_hide_detail() {
        let error = AppError::DatabaseError("connection refused at 10.0.0.3".into());
        let response = error.error_response();
        let body = actix_web::body::to_bytes(response.into_body());
        let body = futures::executor::block_on(body).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "Internal server error");
    }

    #[test]
    fn test_row_not_found_maps_to_404() {
        let error: AppError = sqlx::Error::RowNotFound.into();
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
    }
}
