//! API handlers for the lending REST endpoints

pub mod books;
pub mod health;
pub mod loans;
pub mod openapi;
pub mod visitors;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route(
            "/books/:id",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        .route("/books/:id/damages", get(books::list_damages))
        // Visitors
        .route("/visitors", get(visitors::list_visitors).post(visitors::create_visitor))
        .route(
            "/visitors/:id",
            get(visitors::get_visitor)
                .put(visitors::update_visitor)
                .delete(visitors::delete_visitor),
        )
        .route("/visitors/:id/pay-off-debt", post(visitors::pay_off_debt))
        // Loans
        .route("/loans", get(loans::list_loan_events))
        .route("/loans/:id", get(loans::get_loan_event))
        .route("/borrows", post(loans::borrow_book))
        .route("/returns", post(loans::return_book))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
