// [libs/domain/models/src/session.rs]
/*!
 * APARATO: SESSION MODEL (L2)
 * RESPONSABILIDAD: FORMA DE LA FAMILIA DE REFRESH TOKENS ROTATIVOS
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use typeshare::typeshare;
use uuid::Uuid;

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub refresh_token_hash: String,
    pub device_fingerprint: Option<String>,
    pub family_id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
}

impl Session {
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && self.expires_at > now
    }
}

/// Claims incluidos en el access token (JWT, HMAC-SHA256).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub sub: Uuid,
    pub exp: i64,
    pub iat: i64,
    pub aud: String,
    #[serde(rename = "type")]
    pub token_type: String,
}

pub const ACCESS_TOKEN_AUDIENCE: &str = "phoenix-hub";
pub const ACCESS_TOKEN_TYPE: &str = "access";
pub const ACCESS_TOKEN_TTL_SECONDS: i64 = 3600;
pub const REFRESH_TOKEN_TTL_SECONDS: i64 = 60 * 60 * 24 * 30;
