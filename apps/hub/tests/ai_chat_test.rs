// [apps/hub/tests/ai_chat_test.rs]
//! Cobertura del pipeline conversacional: clasificación, verificación de
//! saldo, construcción de contexto y consumo de energía tras una
//! respuesta exitosa del proveedor de IA simulado.

mod support;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use phoenix_hub::routes::create_sovereign_router;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn register(router: &axum::Router, email: &str) -> String {
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "email": email, "password": "correct horse battery staple", "name": null }).to_string()))
        .unwrap();
    let response = read_json(router.clone().oneshot(request).await.unwrap()).await;
    response["accessToken"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn chat_classifies_the_action_and_consumes_the_matching_cost() {
    let ai_base_url = support::spawn_mock_ai_server("Voici ton CV optimise.").await;
    let state = support::boot_state_with_providers(ai_base_url, "http://127.0.0.1:1".to_string()).await;
    let router = create_sovereign_router(state);
    let access_token = register(&router, "cv-chat@example.com").await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/ai/chat")
        .header(header::AUTHORIZATION, format!("Bearer {access_token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "message": "Peux-tu optimiser mon cv pour ce poste ?" }).to_string()))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["message"], "Voici ton CV optimise.");
    assert_eq!(body["action"], "optimisation_cv");
    assert_eq!(body["energyConsumed"], 12);
    assert_eq!(body["newBalance"], 73.0);
}

#[tokio::test]
async fn plain_conversation_is_free_and_still_reaches_the_provider() {
    let ai_base_url = support::spawn_mock_ai_server("Bonjour, comment puis-je aider ?").await;
    let state = support::boot_state_with_providers(ai_base_url, "http://127.0.0.1:1".to_string()).await;
    let router = create_sovereign_router(state);
    let access_token = register(&router, "greeting-chat@example.com").await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/ai/chat")
        .header(header::AUTHORIZATION, format!("Bearer {access_token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "message": "bonjour, comment ca va ?" }).to_string()))
        .unwrap();
    let body = read_json(router.oneshot(request).await.unwrap()).await;
    assert_eq!(body["action"], "conversation");
    assert_eq!(body["energyConsumed"], 0);
    assert_eq!(body["newBalance"], 85.0);
}

#[tokio::test]
async fn chat_without_a_bearer_token_is_unauthorized() {
    let ai_base_url = support::spawn_mock_ai_server("unused").await;
    let state = support::boot_state_with_providers(ai_base_url, "http://127.0.0.1:1".to_string()).await;
    let router = create_sovereign_router(state);

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/ai/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "message": "bonjour" }).to_string()))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
