// [libs/infra/auth/src/tokens.rs]
/*!
 * APARATO: BEARER TOKEN ISSUER (L3)
 * RESPONSABILIDAD: EMISIÓN Y VERIFICACIÓN DE ACCESS TOKENS HMAC-SHA256
 *
 * Claims y constantes (`ACCESS_TOKEN_AUDIENCE`, `ACCESS_TOKEN_TTL_SECONDS`)
 * viven en `hub-domain-models::session`; este módulo solo firma/verifica.
 */

use crate::errors::AuthError;
use chrono::Utc;
use hub_domain_models::session::{
    AccessTokenClaims, ACCESS_TOKEN_AUDIENCE, ACCESS_TOKEN_TTL_SECONDS, ACCESS_TOKEN_TYPE,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenIssuer {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn issue_access_token(&self, user_id: Uuid) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = AccessTokenClaims {
            sub: user_id,
            exp: now + ACCESS_TOKEN_TTL_SECONDS,
            iat: now,
            aud: ACCESS_TOKEN_AUDIENCE.to_string(),
            token_type: ACCESS_TOKEN_TYPE.to_string(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|err| AuthError::InvalidToken(err.to_string()))
    }

    pub fn verify_access_token(&self, token: &str) -> Result<AccessTokenClaims, AuthError> {
        let mut validation = Validation::default();
        validation.set_audience(&[ACCESS_TOKEN_AUDIENCE]);
        let data = decode::<AccessTokenClaims>(token, &self.decoding_key, &validation)
            .map_err(|err| AuthError::InvalidToken(err.to_string()))?;

        if data.claims.token_type != ACCESS_TOKEN_TYPE {
            return Err(AuthError::InvalidToken("wrong token type".to_string()));
        }
        Ok(data.claims)
    }
}
