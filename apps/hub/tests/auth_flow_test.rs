// [apps/hub/tests/auth_flow_test.rs]
//! Cobertura de extremo a extremo del flujo de identidad: registro, login
//! con credenciales erróneas, perfil autenticado y rotación de refresh.

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

#[tokio::test]
async fn register_then_login_then_me_round_trips_identity() {
    let state = support::boot_state().await;
    let router = create_sovereign_router(state);

    let register_request = Request::builder()
        .method("POST")
        .uri("/api/v1/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "email": "amelie@example.com", "password": "correct horse battery staple", "name": "Amelie" })
                .to_string(),
        ))
        .unwrap();

    let register_response = router.clone().oneshot(register_request).await.unwrap();
    assert_eq!(register_response.status(), StatusCode::OK);
    let registered = read_json(register_response).await;
    let access_token = registered["accessToken"].as_str().unwrap().to_string();

    let login_request = Request::builder()
        .method("POST")
        .uri("/api/v1/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "email": "amelie@example.com", "password": "correct horse battery staple" }).to_string()))
        .unwrap();
    let login_response = router.clone().oneshot(login_request).await.unwrap();
    assert_eq!(login_response.status(), StatusCode::OK);

    let me_request = Request::builder()
        .method("GET")
        .uri("/api/v1/auth/me")
        .header(header::AUTHORIZATION, format!("Bearer {access_token}"))
        .body(Body::empty())
        .unwrap();
    let me_response = router.clone().oneshot(me_request).await.unwrap();
    assert_eq!(me_response.status(), StatusCode::OK);
    let profile = read_json(me_response).await;
    assert_eq!(profile["email"], "amelie@example.com");
    assert_eq!(profile["currentEnergy"], 85.0);
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let state = support::boot_state().await;
    let router = create_sovereign_router(state);

    let register_request = Request::builder()
        .method("POST")
        .uri("/api/v1/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "email": "noe@example.com", "password": "whatever-strong", "name": null }).to_string()))
        .unwrap();
    router.clone().oneshot(register_request).await.unwrap();

    let login_request = Request::builder()
        .method("POST")
        .uri("/api/v1/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "email": "noe@example.com", "password": "totally-wrong" }).to_string()))
        .unwrap();
    let login_response = router.oneshot(login_request).await.unwrap();
    assert_eq!(login_response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn protected_route_without_a_token_is_rejected() {
    let state = support::boot_state().await;
    let router = create_sovereign_router(state);

    let request = Request::builder().method("GET").uri("/api/v1/auth/me").body(Body::empty()).unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_token_rotates_into_a_new_access_token() {
    let state = support::boot_state().await;
    let router = create_sovereign_router(state);

    let register_request = Request::builder()
        .method("POST")
        .uri("/api/v1/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "email": "romy@example.com", "password": "another-strong-pass", "name": null }).to_string()))
        .unwrap();
    let registered = read_json(router.clone().oneshot(register_request).await.unwrap()).await;
    let refresh_token = registered["refreshToken"].as_str().unwrap().to_string();

    let refresh_request = Request::builder()
        .method("POST")
        .uri("/api/v1/auth/refresh")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "refreshToken": refresh_token }).to_string()))
        .unwrap();
    let refresh_response = router.oneshot(refresh_request).await.unwrap();
    assert_eq!(refresh_response.status(), StatusCode::OK);
    let rotated = read_json(refresh_response).await;
    assert!(rotated["accessToken"].as_str().is_some());
    assert_ne!(rotated["refreshToken"].as_str().unwrap(), refresh_token);
}
