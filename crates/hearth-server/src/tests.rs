//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;

fn setup_test_app() -> Router {
    create_router(ReportConfig::default(), ServerConfig::default())
}

fn batch() -> serde_json::Value {
    json!([
        {
            "id": "p1", "date": "2024-01-05", "amount": 1000.0, "kind": "income",
            "category": "Rent",
            "payment": {"monthly_rent": {"id": "mr1", "rental": {
                "id": "r1", "label": "Ana Pérez",
                "property": {"id": "prop1", "name": "Depto 101",
                    "building": {"id": "b1", "name": "Torre Norte"}}
            }}}
        },
        {
            "id": "p2", "date": "2024-02-05", "amount": 1000.0, "kind": "income",
            "category": "Rent",
            "payment": {"monthly_rent": {"id": "mr2", "rental": {
                "id": "r1", "label": "Ana Pérez",
                "property": {"id": "prop1", "name": "Depto 101",
                    "building": {"id": "b1", "name": "Torre Norte"}}
            }}}
        },
        {
            "id": "e1", "date": "2024-01-20", "amount": 300.0, "kind": "expense",
            "category": "Maintenance", "description": "Elevator service",
            "building": {"id": "b1", "name": "Torre Norte"}
        },
        {
            "id": "e2", "date": "2024-02-11", "amount": 2500.0, "kind": "expense",
            "category": "Repairs", "description": "Roof repair",
            "building": {"id": "b2", "name": "Torre Sur"}
        },
        {
            "id": "e3", "date": "2024-02-12", "amount": 900.0, "kind": "expense",
            "description": "Voided duplicate", "state": "voided",
            "building": {"id": "b2", "name": "Torre Sur"}
        }
    ])
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    let body = body.to_string();
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("content-length", body.len())
        .body(Body::from(body))
        .unwrap()
}

async fn get_body_bytes(response: axum::response::Response) -> Vec<u8> {
    let body = response.into_body();
    body.collect().await.unwrap().to_bytes().to_vec()
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    serde_json::from_slice(&get_body_bytes(response).await).unwrap()
}

fn header_str<'a>(response: &'a axum::response::Response, name: &str) -> &'a str {
    response.headers().get(name).unwrap().to_str().unwrap()
}

// ========== Health ==========

#[tokio::test]
async fn test_health() {
    let app = setup_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["status"], "ok");
}

// ========== Report API Tests ==========

#[tokio::test]
async fn test_profit_loss_report() {
    let app = setup_test_app();

    let response = app
        .oneshot(post_json(
            "/api/reports/profit-loss",
            json!({"from": "2024-01-01", "to": "2024-02-29", "transactions": batch()}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_str(&response, "content-type"), "application/json");
    assert_eq!(
        header_str(&response, "content-disposition"),
        "attachment; filename=\"Profit_and_Loss_Statement_2024-01-01_2024-02-29.json\""
    );
    let pages: usize = header_str(&response, "x-page-count").parse().unwrap();

    let document = get_body_json(response).await;
    assert_eq!(document["title"], "Profit and Loss Statement");
    assert_eq!(document["pages"].as_array().unwrap().len(), pages);
}

#[tokio::test]
async fn test_general_expense_text_format() {
    let app = setup_test_app();

    let response = app
        .oneshot(post_json(
            "/api/reports/general-expense",
            json!({
                "from": "2024-01-01",
                "to": "2024-02-29",
                "transactions": batch(),
                "format": "text"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(header_str(&response, "content-disposition").ends_with(".txt\""));

    let text = String::from_utf8(get_body_bytes(response).await).unwrap();
    assert!(text.contains("Subtotal Torre Sur"));
    assert!(text.contains("Grand total"));
    assert!(!text.contains("Voided duplicate"));
}

#[tokio::test]
async fn test_rental_statement_filename() {
    let app = setup_test_app();

    let response = app
        .oneshot(post_json(
            "/api/reports/rental/r1",
            json!({"from": "2024-01-01", "to": "2024-02-29", "transactions": batch()}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header_str(&response, "content-disposition"),
        "attachment; filename=\"Rental_Statement_Ana_Perez_2024-01-01_2024-02-29.json\""
    );
}

#[tokio::test]
async fn test_rental_statement_without_payments_in_range() {
    let app = setup_test_app();

    let mut transactions = batch();
    transactions.as_array_mut().unwrap().push(json!({
        "id": "e4", "date": "2024-03-15", "amount": 120.0, "kind": "expense",
        "category": "Repairs", "description": "Faucet",
        "property": {"id": "prop1", "name": "Depto 101",
            "building": {"id": "b1", "name": "Torre Norte"}}
    }));

    // Both rent payments for r1 fall before March
    let response = app
        .oneshot(post_json(
            "/api/reports/rental/r1",
            json!({"from": "2024-03-01", "to": "2024-03-31", "transactions": transactions}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header_str(&response, "content-disposition"),
        "attachment; filename=\"Rental_Statement_Ana_Perez_2024-03-01_2024-03-31.json\""
    );
    let text = String::from_utf8(get_body_bytes(response).await).unwrap();
    assert!(text.contains("Faucet"));
    assert!(!text.contains("1,000.00"));
}

#[tokio::test]
async fn test_unknown_rental_is_not_found() {
    let app = setup_test_app();

    let response = app
        .oneshot(post_json(
            "/api/reports/rental/r99",
            json!({"from": "2024-01-01", "to": "2024-02-29", "transactions": batch()}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_date_is_bad_request() {
    let app = setup_test_app();

    let response = app
        .oneshot(post_json(
            "/api/reports/profit-loss",
            json!({"from": "2024-01-01", "transactions": batch()}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("Validation"));
}

#[tokio::test]
async fn test_reversed_range_is_bad_request() {
    let app = setup_test_app();

    let response = app
        .oneshot(post_json(
            "/api/reports/general-expense",
            json!({"from": "2024-03-01", "to": "2024-01-01", "transactions": []}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_date_format_is_bad_request() {
    let app = setup_test_app();

    let response = app
        .oneshot(post_json(
            "/api/reports/profit-loss",
            json!({"from": "01/01/2024", "to": "2024-02-29", "transactions": []}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(response).await;
    assert_eq!(
        json["error"],
        "Invalid from date format (use YYYY-MM-DD)"
    );
}

#[tokio::test]
async fn test_body_limit() {
    let app = create_router(
        ReportConfig::default(),
        ServerConfig {
            max_body_bytes: 64,
            ..Default::default()
        },
    );

    let response = app
        .oneshot(post_json(
            "/api/reports/profit-loss",
            json!({"from": "2024-01-01", "to": "2024-02-29", "transactions": batch()}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

// ========== Config / Errors ==========

#[test]
fn test_parse_origins() {
    assert!(parse_origins("").is_empty());
    assert_eq!(
        parse_origins("https://a.example, ,https://b.example"),
        vec!["https://a.example", "https://b.example"]
    );
}

#[test]
fn test_app_error_mapping() {
    let err = AppError::from_report(hearth_core::Error::Validation("missing to".into()));
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);

    let err = AppError::from_report(hearth_core::Error::NotFound("rental r9".into()));
    assert_eq!(err.status(), StatusCode::NOT_FOUND);

    let err = AppError::from_report(hearth_core::Error::Render("broken".into()));
    assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
