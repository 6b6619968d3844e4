//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, health, loans, visitors};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Library Lending API",
        version = "0.1.0",
        description = "Book loans, returns, damage and fine assessment"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        books::list_damages,
        // Visitors
        visitors::list_visitors,
        visitors::get_visitor,
        visitors::create_visitor,
        visitors::update_visitor,
        visitors::delete_visitor,
        visitors::pay_off_debt,
        // Loans
        loans::list_loan_events,
        loans::get_loan_event,
        loans::borrow_book,
        loans::return_book,
    ),
    components(
        schemas(
            // Books
            crate::models::Book,
            crate::models::Author,
            crate::models::BookStatus,
            crate::models::book::CreateBook,
            crate::models::DamageReport,
            crate::models::DamageRate,
            crate::models::damage::DamageInput,
            // Visitors
            crate::models::Visitor,
            crate::models::visitor::CreateVisitor,
            // Loans
            crate::models::LoanEvent,
            crate::models::LoanStatus,
            loans::BorrowRequest,
            loans::ReturnRequest,
            crate::services::loans::ReturnOutcome,
            crate::services::loans::ReturnDisposition,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "books", description = "Book catalog management"),
        (name = "visitors", description = "Visitors and their debt"),
        (name = "loans", description = "Borrowing and returns")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
