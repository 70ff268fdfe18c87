// [apps/hub/tests/support/mod.rs]
//! Arneses compartidos por las pruebas de integración del Hub: construye
//! un `AppState` real sobre una base de datos libSQL en memoria y, cuando
//! un flujo cruza un proveedor externo (IA, pagos), levanta un servidor
//! axum mínimo en loopback que responde el contrato HTTP esperado por
//! `hub-infra-providers` sin tocar ningún servicio de terceros real.

use axum::{routing::post, Json, Router};
use phoenix_hub::config::HubConfig;
use phoenix_hub::state::AppState;
use serde_json::{json, Value};
use std::time::Duration;
use uuid::Uuid;

pub async fn memory_config(ai_provider_base_url: String, payment_provider_base_url: String) -> HubConfig {
    HubConfig {
        database_url: format!(":memory:?unique={}", Uuid::new_v4()),
        database_auth_token: None,
        redis_url: None,
        jwt_secret: "test-secret-key-not-for-production".to_string(),
        port: 0,
        ai_provider_base_url,
        ai_provider_api_key: "test-ai-key".to_string(),
        payment_provider_base_url,
        payment_provider_api_key: "test-payment-key".to_string(),
        db_call_timeout: Duration::from_secs(5),
        db_max_retries: 2,
        provider_call_timeout: Duration::from_secs(5),
        provider_max_retries: 1,
        cache_fallback_max_entries: 1_000,
    }
}

/// Cablea un `AppState` completo contra una base de datos libSQL aislada.
/// `ai_provider_base_url`/`payment_provider_base_url` por defecto apuntan a
/// un puerto cerrado: las pruebas que no ejercitan IA o facturación nunca
/// disparan una llamada de red real.
pub async fn boot_state() -> AppState {
    let config = memory_config("http://127.0.0.1:1".to_string(), "http://127.0.0.1:1".to_string()).await;
    let db = hub_infra_db::client::HubDbClient::connect(&config.database_url, config.database_auth_token.clone())
        .await
        .expect("in-memory database must connect");
    AppState::new(&config, db).await
}

pub async fn boot_state_with_providers(ai_base_url: String, payment_base_url: String) -> AppState {
    let config = memory_config(ai_base_url, payment_base_url).await;
    let db = hub_infra_db::client::HubDbClient::connect(&config.database_url, config.database_auth_token.clone())
        .await
        .expect("in-memory database must connect");
    AppState::new(&config, db).await
}

/// Servidor de IA simulado: responde siempre el mismo texto, sin importar
/// el prompt recibido, sobre `/v1/generate`.
pub async fn spawn_mock_ai_server(reply_text: &'static str) -> String {
    let app = Router::new().route(
        "/v1/generate",
        post(move |Json(_body): Json<Value>| async move { Json(json!({ "text": reply_text })) }),
    );
    spawn_loopback(app).await
}

/// Servidor de pagos simulado: acepta cualquier intención y la confirma
/// siempre con el mismo `amount_minor_units`, para que el llamador pueda
/// elegir con qué pack del catálogo hacerla coincidir.
pub async fn spawn_mock_payment_server(amount_minor_units: u32) -> String {
    let app = Router::new()
        .route(
            "/v1/payment_intents",
            post(move |Json(_body): Json<Value>| async move {
                Json(json!({
                    "intent_id": format!("pi_{}", Uuid::new_v4()),
                    "client_secret": format!("secret_{}", Uuid::new_v4()),
                    "amount_minor_units": amount_minor_units,
                    "currency": "eur",
                    "status": "requires_confirmation",
                }))
            }),
        )
        .route(
            "/v1/payment_intents/confirm",
            post(move |Json(_body): Json<Value>| async move {
                Json(json!({
                    "intent_id": format!("pi_{}", Uuid::new_v4()),
                    "client_secret": format!("secret_{}", Uuid::new_v4()),
                    "amount_minor_units": amount_minor_units,
                    "currency": "eur",
                    "status": "succeeded",
                }))
            }),
        )
        .route(
            "/v1/refunds",
            post(move |Json(_body): Json<Value>| async move {
                Json(json!({
                    "refund_id": format!("re_{}", Uuid::new_v4()),
                    "amount_minor_units": amount_minor_units,
                }))
            }),
        );
    spawn_loopback(app).await
}

async fn spawn_loopback(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("mock server must bind");
    let address = listener.local_addr().expect("mock server must have a local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    format!("http://{address}")
}
