// [apps/hub/tests/energy_flow_test.rs]
//! Cobertura del ledger de energía expuesto sobre HTTP: consulta de
//! elegibilidad, consumo idempotente, rechazo por saldo insuficiente y
//! reembolso de una transacción previa.

mod support;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use phoenix_hub::routes::create_sovereign_router;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn register(router: &axum::Router, email: &str) -> (Uuid, String) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "email": email, "password": "correct horse battery staple", "name": null }).to_string()))
        .unwrap();
    let response = read_json(router.clone().oneshot(request).await.unwrap()).await;
    let user_id = Uuid::parse_str(response["userId"].as_str().unwrap()).unwrap();
    let access_token = response["accessToken"].as_str().unwrap().to_string();
    (user_id, access_token)
}

#[tokio::test]
async fn can_perform_reports_eligibility_without_spending_energy() {
    let state = support::boot_state().await;
    let router = create_sovereign_router(state);
    let (user_id, _token) = register(&router, "diego@example.com").await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/energy/can-perform")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "user_id": user_id, "action": "optimisation_cv" }).to_string()))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["allowed"], true);
    assert_eq!(body["required"], 12);
    assert_eq!(body["current"], 85.0);
}

#[tokio::test]
async fn consume_then_refund_restores_the_spent_energy() {
    let state = support::boot_state().await;
    let router = create_sovereign_router(state);
    let (user_id, _token) = register(&router, "helene@example.com").await;

    let consume_request = Request::builder()
        .method("POST")
        .uri("/api/v1/energy/consume")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "user_id": user_id, "action": "optimisation_cv", "idempotency_key": "consume-1" }).to_string(),
        ))
        .unwrap();
    let consumed = read_json(router.clone().oneshot(consume_request).await.unwrap()).await;
    assert_eq!(consumed["newBalance"], 73.0);
    let tx_id = consumed["txId"].as_str().unwrap().to_string();

    let refund_request = Request::builder()
        .method("POST")
        .uri("/api/v1/energy/refund")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "user_id": user_id, "action_event_id": tx_id, "reason": "test refund" }).to_string()))
        .unwrap();
    let refund_response = router.oneshot(refund_request).await.unwrap();
    assert_eq!(refund_response.status(), StatusCode::OK);
    let refunded = read_json(refund_response).await;
    assert_eq!(refunded["newBalance"], 85.0);
}

#[tokio::test]
async fn repeated_consume_with_the_same_idempotency_key_does_not_double_charge() {
    let state = support::boot_state().await;
    let router = create_sovereign_router(state);
    let (user_id, _token) = register(&router, "paul@example.com").await;

    let body = json!({ "user_id": user_id, "action": "optimisation_cv", "idempotency_key": "dup-key" }).to_string();

    let first = Request::builder()
        .method("POST")
        .uri("/api/v1/energy/consume")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.clone()))
        .unwrap();
    let first_balance = read_json(router.clone().oneshot(first).await.unwrap()).await["newBalance"].as_f64().unwrap();

    let second = Request::builder()
        .method("POST")
        .uri("/api/v1/energy/consume")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap();
    let second_balance = read_json(router.oneshot(second).await.unwrap()).await["newBalance"].as_f64().unwrap();

    assert_eq!(first_balance, second_balance);
}

#[tokio::test]
async fn consuming_an_unknown_action_is_a_validation_error() {
    let state = support::boot_state().await;
    let router = create_sovereign_router(state);
    let (user_id, _token) = register(&router, "zoe@example.com").await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/energy/consume")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "user_id": user_id, "action": "not_a_real_action", "idempotency_key": "x" }).to_string()))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
