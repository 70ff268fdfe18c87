// [libs/infra/auth/src/sessions.rs]
/*!
 * APARATO: REFRESH TOKEN ROTATION (L3)
 * RESPONSABILIDAD: ROTACIÓN DE SESIONES Y REVOCACIÓN DE FAMILIA
 *
 * `hub-infra-auth` no sabe cómo se persiste una `Session`; solo conoce
 * `SessionStore`. `hub-infra-db` lo implementa contra la tabla `sessions`.
 * Reutilizar un refresh token ya revocado es la señal canónica de robo de
 * token; la respuesta es revocar toda la familia.
 */

use crate::errors::AuthError;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use hub_domain_models::session::{Session, REFRESH_TOKEN_TTL_SECONDS};
use rand::RngCore;
use sha2::{Digest, Sha256};
use uuid::Uuid;

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert(&self, session: Session) -> Result<(), AuthError>;
    async fn find_by_hash(&self, refresh_token_hash: &str) -> Result<Option<Session>, AuthError>;
    async fn revoke(&self, session_id: Uuid) -> Result<(), AuthError>;
    async fn revoke_family(&self, family_id: Uuid) -> Result<(), AuthError>;
}

pub struct RotationOutcome {
    pub session: Session,
    pub raw_refresh_token: String,
}

pub struct SessionRotator<S: SessionStore> {
    store: S,
}

fn generate_raw_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn hash_token(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}

impl<S: SessionStore> SessionRotator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// First issuance for a brand-new login/registration: starts a fresh
    /// refresh-token family.
    pub async fn issue(
        &self,
        user_id: Uuid,
        device_fingerprint: Option<String>,
    ) -> Result<RotationOutcome, AuthError> {
        self.issue_in_family(user_id, Uuid::new_v4(), device_fingerprint).await
    }

    async fn issue_in_family(
        &self,
        user_id: Uuid,
        family_id: Uuid,
        device_fingerprint: Option<String>,
    ) -> Result<RotationOutcome, AuthError> {
        let raw = generate_raw_token();
        let now = Utc::now();
        let session = Session {
            session_id: Uuid::new_v4(),
            user_id,
            refresh_token_hash: hash_token(&raw),
            device_fingerprint,
            family_id,
            issued_at: now,
            expires_at: now + Duration::seconds(REFRESH_TOKEN_TTL_SECONDS),
            revoked: false,
        };
        self.store.insert(session.clone()).await?;
        Ok(RotationOutcome { session, raw_refresh_token: raw })
    }

    /// Consumes `raw_refresh_token`, revoking it and issuing a successor in
    /// the same family. Presenting an already-revoked token revokes the
    /// entire family (breach response) and fails closed.
    pub async fn rotate(&self, raw_refresh_token: &str) -> Result<RotationOutcome, AuthError> {
        let hash = hash_token(raw_refresh_token);
        let existing = self.store.find_by_hash(&hash).await?.ok_or(AuthError::SessionNotFound)?;

        if existing.revoked {
            self.store.revoke_family(existing.family_id).await?;
            return Err(AuthError::SessionReuseDetected(existing.family_id));
        }
        if !existing.is_usable(Utc::now()) {
            return Err(AuthError::SessionNotFound);
        }

        self.store.revoke(existing.session_id).await?;
        self.issue_in_family(existing.user_id, existing.family_id, existing.device_fingerprint.clone())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct InMemoryStore {
        sessions: Mutex<Vec<Session>>,
    }

    impl InMemoryStore {
        fn new() -> Self {
            Self { sessions: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl SessionStore for InMemoryStore {
        async fn insert(&self, session: Session) -> Result<(), AuthError> {
            self.sessions.lock().unwrap().push(session);
            Ok(())
        }

        async fn find_by_hash(&self, refresh_token_hash: &str) -> Result<Option<Session>, AuthError> {
            Ok(self
                .sessions
                .lock()
                .unwrap()
                .iter()
                .find(|s| s.refresh_token_hash == refresh_token_hash)
                .cloned())
        }

        async fn revoke(&self, session_id: Uuid) -> Result<(), AuthError> {
            let mut sessions = self.sessions.lock().unwrap();
            if let Some(session) = sessions.iter_mut().find(|s| s.session_id == session_id) {
                session.revoked = true;
            }
            Ok(())
        }

        async fn revoke_family(&self, family_id: Uuid) -> Result<(), AuthError> {
            let mut sessions = self.sessions.lock().unwrap();
            for session in sessions.iter_mut().filter(|s| s.family_id == family_id) {
                session.revoked = true;
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn rotate_issues_a_new_token_in_the_same_family() {
        let rotator = SessionRotator::new(InMemoryStore::new());
        let issued = rotator.issue(Uuid::new_v4(), None).await.unwrap();

        let rotated = rotator.rotate(&issued.raw_refresh_token).await.unwrap();
        assert_eq!(rotated.session.family_id, issued.session.family_id);
        assert_ne!(rotated.raw_refresh_token, issued.raw_refresh_token);
    }

    #[tokio::test]
    async fn replaying_a_revoked_token_revokes_the_whole_family() {
        let rotator = SessionRotator::new(InMemoryStore::new());
        let issued = rotator.issue(Uuid::new_v4(), None).await.unwrap();
        let _ = rotator.rotate(&issued.raw_refresh_token).await.unwrap();

        let replay = rotator.rotate(&issued.raw_refresh_token).await;
        assert!(matches!(replay, Err(AuthError::SessionReuseDetected(_))));

        let after_breach = rotator.rotate(&issued.raw_refresh_token).await;
        assert!(after_breach.is_err());
    }
}
