//! Error types for the lending server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::models::enums::BookStatus;

/// Numeric error codes returned to API clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    DbFailure = 3,
    NoSuchData = 5,
    BookNotAvailable = 7,
    BadValue = 18,
    VisitorInDebt = 22,
    NoActiveLoan = 23,
    BadDate = 24,
    BookStatusLocked = 25,
}

/// Library rule violations.
///
/// Every variant reflects an invalid request or a business-rule conflict, never
/// a transient fault, so callers must not retry them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LibraryError {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    #[error("Visitor {visitor_id} cannot borrow books due to unpaid debt of {debt}")]
    DebtBlocksLoan { visitor_id: i32, debt: Decimal },

    #[error("Can't borrow a book on {borrow_date}, before its addition to the library on {date_added}")]
    LoanBeforeAcquisition {
        borrow_date: NaiveDate,
        date_added: NaiveDate,
    },

    #[error("{}", .0.unavailable_reason())]
    BookUnavailable(BookStatus),

    #[error("No active borrow transaction found for book {book_id} and visitor {visitor_id}")]
    NoActiveLoan { visitor_id: i32, book_id: i32 },

    #[error("Return date {return_date} can't be earlier than borrow date {borrow_date}")]
    ReturnBeforeBorrow {
        return_date: NaiveDate,
        borrow_date: NaiveDate,
    },

    #[error("Book is already {0}")]
    RedundantStatusChange(BookStatus),

    #[error("Book is already {0} and its status can't be changed")]
    TerminalState(BookStatus),

    #[error("Unknown damage rate: {0}")]
    UnknownDamageRate(i16),

    #[error("Fine amount must be greater than zero, got {0}")]
    InvalidFineAmount(Decimal),

    #[error("Start date {start} cannot be later than end date {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
}

impl LibraryError {
    pub fn book_not_found(id: i32) -> Self {
        LibraryError::NotFound { entity: "Book", id }
    }

    pub fn visitor_not_found(id: i32) -> Self {
        LibraryError::NotFound { entity: "Visitor", id }
    }

    pub fn loan_event_not_found(id: i32) -> Self {
        LibraryError::NotFound { entity: "Loan event", id }
    }

    fn status_and_code(&self) -> (StatusCode, ErrorCode) {
        match self {
            LibraryError::NotFound { .. } => (StatusCode::NOT_FOUND, ErrorCode::NoSuchData),
            LibraryError::DebtBlocksLoan { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::VisitorInDebt)
            }
            LibraryError::BookUnavailable(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::BookNotAvailable)
            }
            LibraryError::NoActiveLoan { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::NoActiveLoan)
            }
            LibraryError::LoanBeforeAcquisition { .. }
            | LibraryError::ReturnBeforeBorrow { .. }
            | LibraryError::InvalidRange { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::BadDate)
            }
            LibraryError::RedundantStatusChange(_) | LibraryError::TerminalState(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::BookStatusLocked)
            }
            LibraryError::UnknownDamageRate(_) | LibraryError::InvalidFineAmount(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::BadValue)
            }
        }
    }
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Library rule violation: {0}")]
    Library(#[from] LibraryError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// The domain rule behind this error, if it is one
    pub fn library(&self) -> Option<&LibraryError> {
        match self {
            AppError::Library(e) => Some(e),
            _ => None,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        AppError::Internal(format!("Migration failed: {}", e))
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Library(rule) => {
                let (status, code) = rule.status_and_code();
                (status, code, rule.to_string())
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DbFailure,
                    "Database error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
