use super::common::*;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::response::IntoResponse;
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::middleware::{with_request_tracing, REQUEST_ID_HEADER};
use crate::properties::router::{create_handler, property_router};
use crate::properties::service::{ErrorKind, PropertyService};

fn build_router() -> Router {
    let (service, _) = memory_service();
    with_request_tracing(property_router(Arc::new(service)))
}

fn post_json(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/properties")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

#[tokio::test]
async fn post_then_search_returns_comparisons_and_pagination() {
    let router = build_router();

    for (address, price) in [("1 A St", 100), ("2 B St", 300)] {
        let response = router
            .clone()
            .oneshot(post_json(json!({
                "address": address,
                "suburb": "X",
                "salePrice": price,
                "description": ""
            })))
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = router
        .oneshot(get("/properties?suburb=x"))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::OK);

    let payload = json_body(response).await;
    assert_eq!(
        payload["pagination"],
        json!({ "page": 1, "limit": 50, "total": 2, "totalPages": 1 })
    );
    let properties = payload["properties"].as_array().expect("properties array");
    assert_eq!(properties.len(), 2);
    assert_eq!(properties[0]["suburbAvg"], 200.0);
    assert_eq!(properties[0]["comparison"], "below");
    assert_eq!(properties[1]["comparison"], "above");
}

#[tokio::test]
async fn post_returns_normalized_record() {
    let response = build_router()
        .oneshot(post_json(json!({
            "address": "1 Test St",
            "suburb": "Test",
            "state": "nsw",
            "postcode": "2000",
            "salePrice": 100000
        })))
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = json_body(response).await;
    assert_eq!(payload["state"], "NSW");
    assert_eq!(payload["suburb"], "test");
    assert!(payload["id"].is_string());
    assert!(payload["createdAt"].is_string());
    assert!(payload.get("description").is_none());
}

#[tokio::test]
async fn query_pagination_is_applied() {
    let router = build_router();
    for i in 1..=5 {
        router
            .clone()
            .oneshot(post_json(json!({
                "address": format!("{i} St"),
                "suburb": "Pagination",
                "salePrice": 100 * i
            })))
            .await
            .expect("router dispatch");
    }

    let response = router
        .oneshot(get("/properties?suburb=pagination&page=1&limit=2"))
        .await
        .expect("router dispatch");

    let payload = json_body(response).await;
    assert_eq!(payload["properties"].as_array().map(Vec::len), Some(2));
    assert_eq!(payload["pagination"]["total"], 5);
    assert_eq!(payload["pagination"]["totalPages"], 3);
}

#[tokio::test]
async fn invalid_body_returns_details_and_request_id() {
    let response = build_router()
        .oneshot(post_json(json!({ "invalid": "data" })))
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.headers().get(REQUEST_ID_HEADER).is_some());

    let payload = json_body(response).await;
    assert_eq!(payload["status"], "error");
    assert_eq!(payload["message"], "Validation failed");
    assert!(payload["requestId"].is_string());
    assert_ne!(payload["requestId"], "unknown");
    assert!(payload["timestamp"].is_string());
    let fields: Vec<&str> = payload["details"]
        .as_array()
        .expect("details array")
        .iter()
        .filter_map(|detail| detail["field"].as_str())
        .collect();
    assert_eq!(fields, vec!["address", "suburb", "salePrice"]);
}

#[tokio::test]
async fn empty_address_and_negative_price_are_rejected() {
    let router = build_router();

    for body in [
        json!({ "address": "", "suburb": "Test", "salePrice": 100 }),
        json!({ "address": "Test", "suburb": "Test", "salePrice": -100 }),
    ] {
        let response = router
            .clone()
            .oneshot(post_json(body))
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn malformed_json_is_a_validation_error() {
    let request = Request::builder()
        .method("POST")
        .uri("/properties")
        .header("content-type", "application/json")
        .header(REQUEST_ID_HEADER, "req-malformed")
        .body(Body::from("{not json"))
        .expect("request");

    let response = build_router()
        .oneshot(request)
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = json_body(response).await;
    assert_eq!(payload["requestId"], "req-malformed");
    assert_eq!(payload["details"][0]["field"], "body");
}

#[tokio::test]
async fn invalid_pagination_returns_bad_request() {
    let router = build_router();

    for uri in [
        "/properties?page=0",
        "/properties?limit=0",
        "/properties?limit=101",
        "/properties?page=abc",
    ] {
        let response = router.clone().oneshot(get(uri)).await.expect("router dispatch");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
    }
}

#[tokio::test]
async fn unknown_suburb_returns_empty_list() {
    let response = build_router()
        .oneshot(get("/properties?suburb=nonexistent"))
        .await
        .expect("router dispatch");

    let payload = json_body(response).await;
    assert_eq!(payload["properties"], json!([]));
    assert_eq!(payload["pagination"]["total"], 0);
    assert_eq!(payload["pagination"]["totalPages"], 0);
}

#[tokio::test]
async fn storage_failure_returns_internal_error() {
    let service = Arc::new(PropertyService::new(Arc::new(UnavailableRepository)));
    let mut headers = HeaderMap::new();
    headers.insert(REQUEST_ID_HEADER, "req-500".parse().expect("header value"));

    let error = create_handler::<UnavailableRepository>(
        State(service),
        headers,
        Ok(axum::Json(json!({ "address": "1 St", "suburb": "Bondi", "salePrice": 1 }))),
    )
    .await
    .expect_err("storage is offline");

    assert_eq!(error.kind(), ErrorKind::Storage);
    let response = error.into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let payload = json_body(response).await;
    assert_eq!(payload["requestId"], "req-500");
    assert_eq!(payload["message"], "storage unavailable: database offline");
}
