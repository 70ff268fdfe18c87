// [apps/hub/src/routes.rs]
/*!
 * APARATO: SOVEREIGN ROUTING MATRIX (ESTRATO L3)
 * RESPONSABILIDAD: TOPOLOGÍA HTTP DEL HUB: AUTH, LEDGER, IA Y FACTURACIÓN
 *
 * Las rutas de escritura sensible (auth, ledger, chat de IA) viven detrás
 * de `auth_guard`; `health`/`monitoring` quedan públicas para que los
 * balanceadores de carga y los paneles de operaciones puedan sondearlas
 * sin portar un token.
 */

use crate::handlers::{ai, auth, billing, energy, events, health, monitoring};
use crate::middleware::{auth_guard, health_guard};
use crate::state::AppState;
use axum::{
    http::{header, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

pub fn create_sovereign_router(application_shared_state: AppState) -> Router {
    let network_security_shield = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));

    // Sin autenticación: el usuario aún no porta un token de acceso.
    let public_auth_stratum =
        Router::new().route("/register", post(auth::register)).route("/login", post(auth::login)).route(
            "/refresh",
            post(auth::refresh),
        );

    let energy_stratum = Router::new()
        .route("/can-perform", post(energy::can_perform))
        .route("/consume", post(energy::consume))
        .route("/refund", post(energy::refund));

    let billing_stratum = Router::new()
        .route("/create-intent", post(billing::create_intent))
        .route("/confirm", post(billing::confirm_payment))
        .route("/refund", post(billing::refund_energy));

    let ai_stratum = Router::new().route("/chat", post(ai::chat));

    let monitoring_stratum = Router::new()
        .route("/cache", get(monitoring::cache))
        .route("/pool", get(monitoring::pool))
        .route("/ratelimit", get(monitoring::rate_limit))
        .route("/keys", get(monitoring::keys))
        .route("/alerts", get(monitoring::alerts));

    // Tras `auth_guard`: requieren `Authorization: Bearer <token>`.
    let protected_api_stratum = Router::new()
        .route("/auth/me", get(auth::me))
        .nest("/energy", energy_stratum)
        .nest("/billing", billing_stratum)
        .nest("/ai", ai_stratum)
        .route("/events", get(events::list_events))
        .layer(middleware::from_fn_with_state(application_shared_state.clone(), auth_guard));

    Router::new()
        .route("/health", get(health::health))
        .nest("/monitoring", monitoring_stratum)
        .nest("/api/v1", Router::new().nest("/auth", public_auth_stratum).merge(protected_api_stratum))
        .layer(middleware::from_fn_with_state(application_shared_state.clone(), health_guard))
        .layer(network_security_shield)
        .with_state(application_shared_state)
}
