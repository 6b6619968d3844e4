//! Loan endpoints: borrowing, returns and the loan event log

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::{damage::DamageInput, loan_event::LoanEventQuery, LoanEvent},
    services::loans::ReturnOutcome,
    AppState,
};

/// Borrow request
#[derive(Deserialize, ToSchema)]
pub struct BorrowRequest {
    pub visitor_id: i32,
    pub book_id: i32,
    pub borrow_date: NaiveDate,
}

/// Return request
#[derive(Deserialize, ToSchema)]
pub struct ReturnRequest {
    pub visitor_id: i32,
    pub book_id: i32,
    pub return_date: NaiveDate,
    /// Damages found on the returned book
    #[serde(default)]
    pub damages: Vec<DamageInput>,
}

/// List loan events, optionally within a date range
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    params(LoanEventQuery),
    responses(
        (status = 200, description = "Loan events", body = Vec<LoanEvent>),
        (status = 400, description = "Only one bound of the range given", body = crate::error::ErrorResponse),
        (status = 422, description = "Start date after end date", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_loan_events(
    State(state): State<AppState>,
    Query(query): Query<LoanEventQuery>,
) -> AppResult<Json<Vec<LoanEvent>>> {
    let events = match (query.start, query.end) {
        (None, None) => state.services.loans.list_loan_events().await?,
        (Some(start), Some(end)) => {
            state
                .services
                .loans
                .loan_events_by_date_range(start, end)
                .await?
        }
        _ => {
            return Err(AppError::BadRequest(
                "Both start and end are required to filter by date".to_string(),
            ))
        }
    };
    Ok(Json(events))
}

/// Get a loan event by ID
#[utoipa::path(
    get,
    path = "/loans/{id}",
    tag = "loans",
    params(
        ("id" = i32, Path, description = "Loan event ID")
    ),
    responses(
        (status = 200, description = "Loan event", body = LoanEvent),
        (status = 404, description = "Loan event not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_loan_event(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<LoanEvent>> {
    let event = state.services.loans.get_loan_event(id).await?;
    Ok(Json(event))
}

/// Lend a book to a visitor
#[utoipa::path(
    post,
    path = "/borrows",
    tag = "loans",
    request_body = BorrowRequest,
    responses(
        (status = 201, description = "Book borrowed", body = LoanEvent),
        (status = 404, description = "Visitor or book not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Visitor in debt, book unavailable or bad date", body = crate::error::ErrorResponse)
    )
)]
pub async fn borrow_book(
    State(state): State<AppState>,
    Json(request): Json<BorrowRequest>,
) -> AppResult<(StatusCode, Json<LoanEvent>)> {
    let event = state
        .services
        .loans
        .borrow_book(request.visitor_id, request.book_id, request.borrow_date)
        .await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// Take a book back, assessing overdue and damage fines
#[utoipa::path(
    post,
    path = "/returns",
    tag = "loans",
    request_body = ReturnRequest,
    responses(
        (status = 200, description = "Book returned", body = ReturnOutcome),
        (status = 404, description = "Visitor or book not found", body = crate::error::ErrorResponse),
        (status = 422, description = "No active loan, bad date or unknown damage rate", body = crate::error::ErrorResponse)
    )
)]
pub async fn return_book(
    State(state): State<AppState>,
    Json(request): Json<ReturnRequest>,
) -> AppResult<Json<ReturnOutcome>> {
    let outcome = state
        .services
        .loans
        .return_book(
            request.visitor_id,
            request.book_id,
            request.return_date,
            request.damages,
        )
        .await?;
    Ok(Json(outcome))
}
