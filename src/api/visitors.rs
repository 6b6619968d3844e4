//! Visitor endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        visitor::{CreateVisitor, UpdateVisitor},
        Visitor,
    },
    AppState,
};

/// List visitors with their loan history
#[utoipa::path(
    get,
    path = "/visitors",
    tag = "visitors",
    responses(
        (status = 200, description = "List of visitors", body = Vec<Visitor>)
    )
)]
pub async fn list_visitors(State(state): State<AppState>) -> AppResult<Json<Vec<Visitor>>> {
    let visitors = state.services.visitors.list().await?;
    Ok(Json(visitors))
}

/// Get a visitor by ID
#[utoipa::path(
    get,
    path = "/visitors/{id}",
    tag = "visitors",
    params(
        ("id" = i32, Path, description = "Visitor ID")
    ),
    responses(
        (status = 200, description = "Visitor details", body = Visitor),
        (status = 404, description = "Visitor not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_visitor(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Visitor>> {
    let visitor = state.services.visitors.get(id).await?;
    Ok(Json(visitor))
}

/// Register a visitor
#[utoipa::path(
    post,
    path = "/visitors",
    tag = "visitors",
    request_body = CreateVisitor,
    responses(
        (status = 201, description = "Visitor created", body = Visitor),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_visitor(
    State(state): State<AppState>,
    Json(data): Json<CreateVisitor>,
) -> AppResult<(StatusCode, Json<Visitor>)> {
    let created = state.services.visitors.create(data).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a visitor's contact details
#[utoipa::path(
    put,
    path = "/visitors/{id}",
    tag = "visitors",
    params(
        ("id" = i32, Path, description = "Visitor ID")
    ),
    request_body = CreateVisitor,
    responses(
        (status = 200, description = "Visitor updated", body = Visitor),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "Visitor not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_visitor(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(data): Json<UpdateVisitor>,
) -> AppResult<Json<Visitor>> {
    let updated = state.services.visitors.update(id, data).await?;
    Ok(Json(updated))
}

/// Delete a visitor
#[utoipa::path(
    delete,
    path = "/visitors/{id}",
    tag = "visitors",
    params(
        ("id" = i32, Path, description = "Visitor ID")
    ),
    responses(
        (status = 204, description = "Visitor deleted"),
        (status = 404, description = "Visitor not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_visitor(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.visitors.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Pay off a visitor's whole debt
#[utoipa::path(
    post,
    path = "/visitors/{id}/pay-off-debt",
    tag = "visitors",
    params(
        ("id" = i32, Path, description = "Visitor ID")
    ),
    responses(
        (status = 200, description = "Debt cleared", body = Visitor),
        (status = 404, description = "Visitor not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn pay_off_debt(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Visitor>> {
    let visitor = state.services.visitors.settle_debt(id).await?;
    Ok(Json(visitor))
}
