use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    InternalServerError(String),
    DatabaseError(String),
}

#[derive(Serialize)]
struct ErrorResponse<'a> {
    error: &'a str,
}

impl AppError {
    fn message(&self) -> &str {
        match self {
            AppError::NotFound(msg)
            | AppError::BadRequest(msg)
            | AppError::Conflict(msg)
            | AppError::InternalServerError(msg)
            | AppError::DatabaseError(msg) => msg,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            AppError::NotFound(_) => "Not Found",
            AppError::BadRequest(_) => "Bad Request",
            AppError::Conflict(_) => "Conflict",
            AppError::InternalServerError(_) => "Internal Server Error",
            AppError::DatabaseError(_) => "Database Error",
        };
        write!(f, "{}: {}", kind, self.message())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse { error: self.message() })
    }
}

/// Failure reported by a store collaborator.
///
/// `Conflict` and `Rejected` describe the data being refused; the import
/// pipeline records them against the offending row and moves on.
/// `Unavailable` means the store itself could not be reached.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    Conflict(String),
    Rejected(String),
    Unavailable(String),
}

impl StoreError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Conflict(msg) | StoreError::Rejected(msg) | StoreError::Unavailable(msg) => {
                write!(f, "{}", msg)
            }
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                StoreError::Conflict(db_err.message().to_string())
            }
            sqlx::Error::Database(db_err) => StoreError::Rejected(db_err.message().to_string()),
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => StoreError::Unavailable(err.to_string()),
            other => StoreError::Rejected(other.to_string()),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => AppError::Conflict(msg),
            StoreError::Rejected(msg) => AppError::BadRequest(msg),
            StoreError::Unavailable(msg) => AppError::DatabaseError(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_errors_map_to_status_codes() {
        assert_eq!(AppError::NotFound("x".into()).error_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::BadRequest("x".into()).error_response().status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Conflict("x".into()).error_response().status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::DatabaseError("x".into()).error_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn store_errors_keep_their_message_and_tier() {
        let conflict: AppError = StoreError::Conflict("duplicate stt".into()).into();
        assert!(matches!(conflict, AppError::Conflict(ref msg) if msg == "duplicate stt"));

        let rejected: AppError = StoreError::Rejected("bad gender".into()).into();
        assert!(matches!(rejected, AppError::BadRequest(_)));

        let down = StoreError::from(sqlx::Error::PoolTimedOut);
        assert!(down.is_unavailable());
        assert!(matches!(AppError::from(down), AppError::DatabaseError(_)));
    }

    #[test]
    fn row_not_found_is_not_an_outage() {
        let err = StoreError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Rejected(_)));
    }
}
