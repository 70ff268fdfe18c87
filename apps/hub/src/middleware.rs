// [apps/hub/src/middleware.rs]
/*!
 * APARATO: PERIMETER GUARDS (ESTRATO L4)
 * RESPONSABILIDAD: AUTENTICACIÓN BEARER, LÍMITE DE TASA Y SALUD DEL SISTEMA
 */

use crate::errors::HubApiError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use hub_domain_models::ratelimit::{rule_for_scope, RateLimitVerdict};
use tracing::{debug, warn};
use uuid::Uuid;

/// Identidad autenticada inyectada en las extensiones de la petición tras
/// `auth_guard`; los handlers la leen vía `Extension<AuthenticatedUser>`.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser(pub Uuid);

pub async fn health_guard(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if let Err(reason) = state.is_operational() {
        warn!("⛔ [ACCESS_DENIED]: Hub degraded: {}", reason);
        return HubApiError::CircuitOpen.into_response();
    }
    next.run(req).await
}

/// Valida el `Authorization: Bearer <token>` y resuelve el `user_id` contra
/// el emisor de tokens; cualquier fallo de verificación es un 401 uniforme,
/// sin distinguir firma inválida de expiración para no filtrar detalles.
pub async fn auth_guard(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    let token = match token {
        Some(token) => token,
        None => return HubApiError::Unauthorized.into_response(),
    };

    match state.tokens.verify_access_token(token) {
        Ok(claims) => {
            debug!("👤 [AUTH]: request authenticated for user {}", claims.sub);
            req.extensions_mut().insert(AuthenticatedUser(claims.sub));
            next.run(req).await
        }
        Err(_) => HubApiError::Unauthorized.into_response(),
    }
}

/// Invocado directamente por los handlers sensibles (login, consumo de
/// energía, chat de IA) en lugar de vivir como capa global: cada uno
/// conoce mejor qué `scope`/clave de partición usar. Una regla
/// desconocida en `RATE_LIMIT_RULES` se trata como "sin límite".
pub async fn enforce_rate_limit(state: &AppState, scope: &'static str, key: &str) -> Result<(), HubApiError> {
    let Some(rule) = rule_for_scope(scope) else {
        return Ok(());
    };

    let decision = state.rate_limiter.evaluate(key, rule).await;
    match decision.verdict {
        RateLimitVerdict::Allowed => Ok(()),
        RateLimitVerdict::Limited | RateLimitVerdict::Blocked => {
            let retry_after = decision
                .blocked_until
                .map(|until| (until - chrono::Utc::now()).num_seconds().max(0) as u64)
                .unwrap_or(rule.block_duration_seconds);
            Err(HubApiError::RateLimited { retry_after_seconds: retry_after })
        }
    }
}
