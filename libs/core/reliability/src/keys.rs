// [libs/core/reliability/src/keys.rs]
/*!
 * APARATO: KEY MANAGER (L1)
 * RESPONSABILIDAD: CUSTODIA Y ROTACIÓN DE SECRETOS DE PROVEEDORES
 *
 * Los secretos viven fuera de proceso (variables de entorno / vault);
 * este componente nunca los persiste ni los loguea, solo guarda un
 * prefijo de hash SHA-256 para auditoría ("¿cuál secreto se usó?")
 * sin poder reconstruirlo.
 */

use crate::errors::KeyManagerError;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::RwLock;

const FINGERPRINT_PREFIX_LEN: usize = 12;

#[derive(Debug, Clone)]
struct ProviderSecret {
    secret: String,
    fingerprint: String,
    registered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct KeyStatus {
    pub provider: String,
    pub fingerprint: String,
    pub registered_at: DateTime<Utc>,
}

fn fingerprint(secret: &str) -> String {
    let digest = Sha256::digest(secret.as_bytes());
    hex::encode(digest)[..FINGERPRINT_PREFIX_LEN].to_string()
}

/// Registry of live provider credentials (AI provider, payment provider,
/// JWT signing secret), keyed by a stable provider name.
pub struct KeyManager {
    secrets: RwLock<HashMap<String, ProviderSecret>>,
}

impl KeyManager {
    pub fn new() -> Self {
        Self { secrets: RwLock::new(HashMap::new()) }
    }

    pub fn register(&self, provider: impl Into<String>, secret: impl Into<String>) {
        let secret = secret.into();
        let fingerprint = fingerprint(&secret);
        self.secrets.write().expect("key manager poisoned").insert(
            provider.into(),
            ProviderSecret { secret, fingerprint, registered_at: Utc::now() },
        );
    }

    /// Rotates a provider's secret in place, returning the prior
    /// fingerprint so the caller can log the transition without ever
    /// logging either secret value.
    pub fn rotate(&self, provider: &str, new_secret: impl Into<String>) -> Result<String, KeyManagerError> {
        let mut guard = self.secrets.write().expect("key manager poisoned");
        let entry = guard
            .get_mut(provider)
            .ok_or_else(|| KeyManagerError::UnknownProvider(provider.to_string()))?;
        let previous_fingerprint = entry.fingerprint.clone();
        entry.secret = new_secret.into();
        entry.fingerprint = fingerprint(&entry.secret);
        entry.registered_at = Utc::now();
        Ok(previous_fingerprint)
    }

    pub fn secret(&self, provider: &str) -> Result<String, KeyManagerError> {
        self.secrets
            .read()
            .expect("key manager poisoned")
            .get(provider)
            .map(|entry| entry.secret.clone())
            .ok_or_else(|| KeyManagerError::SecretMissing(provider.to_string()))
    }

    pub fn status(&self) -> Vec<KeyStatus> {
        self.secrets
            .read()
            .expect("key manager poisoned")
            .iter()
            .map(|(provider, entry)| KeyStatus {
                provider: provider.clone(),
                fingerprint: entry.fingerprint.clone(),
                registered_at: entry.registered_at,
            })
            .collect()
    }
}

impl Default for KeyManager {
    fn default() -> Self {
        Self::new()
    }
}
