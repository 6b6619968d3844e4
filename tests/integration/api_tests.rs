//! API integration tests, run in-process against the in-memory store

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::ServiceExt;

use library_lending::{api, repository::Repository, AppConfig, AppState};

fn app() -> Router {
    api::router(AppState::new(AppConfig::default(), Repository::in_memory()))
}

fn day(offset: i64) -> NaiveDate {
    Utc::now().date_naive() + Duration::days(offset)
}

/// Send a request and return the status and JSON body (`Null` when empty)
async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(format!("/api/v1{}", uri));
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn decimal(value: &Value) -> Decimal {
    value.as_str().expect("decimals are serialized as strings").parse().unwrap()
}

async fn create_book(app: &Router) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/books",
        Some(json!({
            "title": "Solaris",
            "genre": "Science fiction",
            "publish_date": "1961-01-01",
            "author": { "name": "Stanislaw", "surname": "Lem" },
            "price": "300"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["id"].as_i64().unwrap()
}

async fn create_visitor(app: &Router) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/visitors",
        Some(json!({
            "name": "Kris",
            "surname": "Kelvin",
            "email": "kelvin@example.org"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["id"].as_i64().unwrap()
}

async fn borrow(
    app: &Router,
    visitor_id: i64,
    book_id: i64,
    date: NaiveDate,
) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        "/borrows",
        Some(json!({
            "visitor_id": visitor_id,
            "book_id": book_id,
            "borrow_date": date
        })),
    )
    .await
}

async fn give_back(
    app: &Router,
    visitor_id: i64,
    book_id: i64,
    date: NaiveDate,
    damages: Value,
) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        "/returns",
        Some(json!({
            "visitor_id": visitor_id,
            "book_id": book_id,
            "return_date": date,
            "damages": damages
        })),
    )
    .await
}

#[tokio::test]
async fn test_health_check() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_book_crud() {
    let app = app();
    let id = create_book(&app).await;

    let (status, body) = send(&app, Method::GET, &format!("/books/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Available");
    assert_eq!(body["date_added"], json!(day(0)));

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/books/{}", id),
        Some(json!({
            "title": "Solaris",
            "genre": "Classic",
            "publish_date": "1961-01-01",
            "author": { "name": "Stanislaw", "surname": "Lem" },
            "price": "320"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["genre"], "Classic");
    assert_eq!(decimal(&body["price"]), Decimal::new(320, 0));

    let (status, body) = send(
        &app,
        Method::GET,
        "/books?author_name=Stanislaw&author_surname=Lem",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, Method::GET, "/books?author_name=Stanislaw", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::DELETE, &format!("/books/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, Method::GET, &format!("/books/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NoSuchData");
}

#[tokio::test]
async fn test_invalid_book_rejected() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/books",
        Some(json!({
            "title": "Free book",
            "genre": "Novel",
            "publish_date": "2000-01-01",
            "author": { "name": "Anon", "surname": "Ymous" },
            "price": "0"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");

    let (status, body) = send(
        &app,
        Method::POST,
        "/books",
        Some(json!({
            "title": "Priceless",
            "genre": "Novel",
            "publish_date": "2000-01-01",
            "author": { "name": "Anon", "surname": "Ymous" },
            "price": "50000000000000000000000000000"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");
}

#[tokio::test]
async fn test_borrow_and_late_return() {
    let app = app();
    let book_id = create_book(&app).await;
    let visitor_id = create_visitor(&app).await;

    let (status, event) = borrow(&app, visitor_id, book_id, day(0)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(event["status"], "Borrowed");

    let (_, book) = send(&app, Method::GET, &format!("/books/{}", book_id), None).await;
    assert_eq!(book["status"], "NotAvailable");

    let (status, outcome) = give_back(&app, visitor_id, book_id, day(20), json!([])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(&outcome["total_fine"]), Decimal::new(3, 0));
    assert_eq!(outcome["disposition"], "shelved");
    assert!(outcome["replacement"].is_null());

    let (_, visitor) = send(&app, Method::GET, &format!("/visitors/{}", visitor_id), None).await;
    assert_eq!(decimal(&visitor["debt"]), Decimal::new(3, 0));
    assert_eq!(visitor["loan_events"].as_array().unwrap().len(), 2);

    // debt blocks the next loan until it is paid off
    let (status, body) = borrow(&app, visitor_id, book_id, day(21)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "VisitorInDebt");

    let (status, visitor) = send(
        &app,
        Method::POST,
        &format!("/visitors/{}/pay-off-debt", visitor_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(&visitor["debt"]), Decimal::ZERO);

    let (status, _) = borrow(&app, visitor_id, book_id, day(21)).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_borrow_unavailable_book() {
    let app = app();
    let book_id = create_book(&app).await;
    let first = create_visitor(&app).await;
    let second = create_visitor(&app).await;

    borrow(&app, first, book_id, day(0)).await;
    let (status, body) = borrow(&app, second, book_id, day(0)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "BookNotAvailable");
    assert_eq!(body["message"], "The book is currently unavailable");
}

#[tokio::test]
async fn test_lost_book_is_replaced() {
    let app = app();
    let book_id = create_book(&app).await;
    let visitor_id = create_visitor(&app).await;
    borrow(&app, visitor_id, book_id, day(0)).await;

    let (status, outcome) = give_back(
        &app,
        visitor_id,
        book_id,
        day(3),
        json!([{ "description": "Left on a train", "rate": 3 }]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(&outcome["total_fine"]), Decimal::new(300, 0));
    assert_eq!(outcome["disposition"], "lost");
    assert_eq!(outcome["replacement"]["status"], "Available");

    let (_, old) = send(&app, Method::GET, &format!("/books/{}", book_id), None).await;
    assert_eq!(old["status"], "Lost");

    let (_, books) = send(&app, Method::GET, "/books", None).await;
    assert_eq!(books.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_damaged_return_is_recorded() {
    let app = app();
    let book_id = create_book(&app).await;
    let visitor_id = create_visitor(&app).await;
    borrow(&app, visitor_id, book_id, day(0)).await;

    let (status, outcome) = give_back(
        &app,
        visitor_id,
        book_id,
        day(1),
        json!([{ "description": "Coffee stain", "rate": 0 }]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(&outcome["total_fine"]), Decimal::new(30, 0));

    let (status, damages) =
        send(&app, Method::GET, &format!("/books/{}/damages", book_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(damages[0]["rate"], "Light");
    assert_eq!(damages[0]["description"], "Coffee stain");
}

#[tokio::test]
async fn test_return_errors() {
    let app = app();
    let book_id = create_book(&app).await;
    let visitor_id = create_visitor(&app).await;

    let (status, body) = give_back(&app, visitor_id, book_id, day(1), json!([])).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "NoActiveLoan");

    borrow(&app, visitor_id, book_id, day(2)).await;

    let (status, body) = give_back(&app, visitor_id, book_id, day(1), json!([])).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "BadDate");

    let (status, body) = give_back(
        &app,
        visitor_id,
        book_id,
        day(3),
        json!([{ "description": "Unknown", "rate": 9 }]),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "BadValue");

    // neither failure left a trace
    let (_, visitor) = send(&app, Method::GET, &format!("/visitors/{}", visitor_id), None).await;
    assert_eq!(visitor["loan_events"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_loan_event_queries() {
    let app = app();
    let book_id = create_book(&app).await;
    let visitor_id = create_visitor(&app).await;
    let (_, borrowed) = borrow(&app, visitor_id, book_id, day(0)).await;
    give_back(&app, visitor_id, book_id, day(4), json!([])).await;

    let (status, all) = send(&app, Method::GET, "/loans", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 2);

    let uri = format!("/loans/{}", borrowed["id"]);
    let (status, event) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(event, borrowed);

    let uri = format!("/loans?start={}&end={}", day(4), day(4));
    let (status, events) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(events.as_array().unwrap().len(), 1);
    assert_eq!(events[0]["status"], "Returned");

    let uri = format!("/loans?start={}&end={}", day(4), day(0));
    let (status, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "BadDate");

    let uri = format!("/loans?start={}", day(0));
    let (status, _) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::GET, "/loans/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
