// [libs/core/reliability/src/cache.rs]
/*!
 * =================================================================
 * APARATO: TWO-LEVEL CACHE TIER (V1.0 - GROUND ZERO)
 * CLASIFICACIÓN: RELIABILITY SUBSTRATE (ESTRATO L1)
 * RESPONSABILIDAD: LECTURA/ESCRITURA TOLERANTE A FALLOS CON TTL OBLIGATORIO
 *
 * # Mathematical Proof (Bounded Staleness):
 * Toda escritura exitosa en cualquiera de los dos niveles lleva un TTL.
 * Por construcción, ninguna lectura puede observar un valor con más de
 * `ttl` segundos de antigüedad respecto al último `set` para la misma
 * clave, ya que ambos niveles purgan al expirar (Redis nativamente,
 * el fallback en cada acceso).
 * =================================================================
 */

use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub errors: u64,
    pub fallback_uses: u64,
    pub bytes: u64,
}

#[derive(Default)]
struct CacheCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    errors: AtomicU64,
    fallback_uses: AtomicU64,
    bytes: AtomicU64,
}

struct FallbackEntry {
    value: Vec<u8>,
    expires_at: Instant,
    last_used: Instant,
}

/// LRU+TTL en memoria de proceso. Usado cuando el primario (Redis) no
/// responde, o cuando no se configuró ninguno (modo desarrollo/tests).
struct LruFallback {
    entries: HashMap<String, FallbackEntry>,
    max_entries: usize,
}

impl LruFallback {
    fn new(max_entries: usize) -> Self {
        Self { entries: HashMap::new(), max_entries }
    }

    fn get(&mut self, key: &str) -> Option<Vec<u8>> {
        let now = Instant::now();
        let expired = self
            .entries
            .get(key)
            .map(|entry| entry.expires_at <= now)
            .unwrap_or(false);
        if expired {
            self.entries.remove(key);
            return None;
        }
        if let Some(entry) = self.entries.get_mut(key) {
            entry.last_used = now;
            return Some(entry.value.clone());
        }
        None
    }

    fn set(&mut self, key: String, value: Vec<u8>, ttl: Duration) {
        let now = Instant::now();
        if self.entries.len() >= self.max_entries && !self.entries.contains_key(&key) {
            if let Some(stale_key) = self
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(key, _)| key.clone())
            {
                self.entries.remove(&stale_key);
            }
        }
        self.entries.insert(
            key,
            FallbackEntry { value, expires_at: now + ttl, last_used: now },
        );
    }

    fn delete(&mut self, key: &str) {
        self.entries.remove(key);
    }

    fn invalidate_prefix(&mut self, prefix: &str) {
        self.entries.retain(|key, _| !key.starts_with(prefix));
    }
}

/// Mapa de TTL por defecto por namespace, en segundos.
fn default_ttl_seconds(namespace: &str) -> u64 {
    match namespace {
        "energy" => 60,
        "context" => 900,
        "ratelimit" => 120,
        _ => 300,
    }
}

pub struct CacheTier {
    primary: Option<Mutex<ConnectionManager>>,
    fallback: Mutex<LruFallback>,
    counters: CacheCounters,
}

impl CacheTier {
    pub fn new(primary: Option<ConnectionManager>, fallback_max_entries: usize) -> Self {
        Self {
            primary: primary.map(Mutex::new),
            fallback: Mutex::new(LruFallback::new(fallback_max_entries)),
            counters: CacheCounters::default(),
        }
    }

    pub async fn connect_primary(redis_url: &str) -> Option<ConnectionManager> {
        match redis::Client::open(redis_url) {
            Ok(client) => match ConnectionManager::new(client).await {
                Ok(manager) => Some(manager),
                Err(error) => {
                    warn!("⚠️ [CACHE]: Primary Redis unreachable at startup: {}", error);
                    None
                }
            },
            Err(error) => {
                warn!("⚠️ [CACHE]: Invalid Redis URL: {}", error);
                None
            }
        }
    }

    fn compose_key(namespace: &str, key: &str) -> String {
        format!("{}:{}", namespace, key)
    }

    #[instrument(skip(self, value), fields(namespace = %namespace))]
    pub async fn set(&self, namespace: &str, key: &str, value: &[u8], ttl: Option<Duration>) {
        let ttl = ttl.unwrap_or_else(|| Duration::from_secs(default_ttl_seconds(namespace)));
        let composed = Self::compose_key(namespace, key);
        self.counters.bytes.fetch_add(value.len() as u64, Ordering::Relaxed);

        let mut wrote_primary = false;
        if let Some(primary) = &self.primary {
            let mut connection = primary.lock().expect("cache primary mutex poisoned");
            match connection
                .set_ex::<_, _, ()>(&composed, value, ttl.as_secs().max(1))
                .await
            {
                Ok(()) => wrote_primary = true,
                Err(error) => {
                    self.counters.errors.fetch_add(1, Ordering::Relaxed);
                    debug!("⚠️ [CACHE]: Primary write failed, falling back: {}", error);
                }
            }
        }

        if !wrote_primary {
            self.counters.fallback_uses.fetch_add(1, Ordering::Relaxed);
        }
        self.fallback
            .lock()
            .expect("cache fallback mutex poisoned")
            .set(composed, value.to_vec(), ttl);
    }

    #[instrument(skip(self), fields(namespace = %namespace))]
    pub async fn get(&self, namespace: &str, key: &str) -> Option<Vec<u8>> {
        let composed = Self::compose_key(namespace, key);

        if let Some(primary) = &self.primary {
            let result = {
                let mut connection = primary.lock().expect("cache primary mutex poisoned");
                connection.get::<_, Option<Vec<u8>>>(&composed).await
            };
            match result {
                Ok(Some(value)) => {
                    self.counters.hits.fetch_add(1, Ordering::Relaxed);
                    return Some(value);
                }
                Ok(None) => {}
                Err(error) => {
                    self.counters.errors.fetch_add(1, Ordering::Relaxed);
                    debug!("⚠️ [CACHE]: Primary read failed, consulting fallback: {}", error);
                }
            }
        }

        self.counters.fallback_uses.fetch_add(1, Ordering::Relaxed);
        let fallback_hit = self
            .fallback
            .lock()
            .expect("cache fallback mutex poisoned")
            .get(&composed);

        if fallback_hit.is_some() {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.counters.misses.fetch_add(1, Ordering::Relaxed);
        }
        fallback_hit
    }

    #[instrument(skip(self), fields(namespace = %namespace))]
    pub async fn delete(&self, namespace: &str, key: &str) {
        let composed = Self::compose_key(namespace, key);
        if let Some(primary) = &self.primary {
            let mut connection = primary.lock().expect("cache primary mutex poisoned");
            if let Err(error) = connection.del::<_, ()>(&composed).await {
                self.counters.errors.fetch_add(1, Ordering::Relaxed);
                debug!("⚠️ [CACHE]: Primary delete failed: {}", error);
            }
        }
        self.fallback
            .lock()
            .expect("cache fallback mutex poisoned")
            .delete(&composed);
    }

    #[instrument(skip(self), fields(namespace = %namespace))]
    pub async fn invalidate_prefix(&self, namespace: &str, prefix: &str) {
        let composed_prefix = Self::compose_key(namespace, prefix);
        if let Some(primary) = &self.primary {
            let keys: Result<Vec<String>, _> = {
                let mut connection = primary.lock().expect("cache primary mutex poisoned");
                connection.keys(format!("{}*", composed_prefix)).await
            };
            match keys {
                Ok(matched) if !matched.is_empty() => {
                    let mut connection = primary.lock().expect("cache primary mutex poisoned");
                    if let Err(error) = connection.del::<_, ()>(matched).await {
                        self.counters.errors.fetch_add(1, Ordering::Relaxed);
                        debug!("⚠️ [CACHE]: Primary prefix invalidation failed: {}", error);
                    }
                }
                Ok(_) => {}
                Err(error) => {
                    self.counters.errors.fetch_add(1, Ordering::Relaxed);
                    debug!("⚠️ [CACHE]: Primary KEYS scan failed: {}", error);
                }
            }
        }
        self.fallback
            .lock()
            .expect("cache fallback mutex poisoned")
            .invalidate_prefix(&composed_prefix);
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            errors: self.counters.errors.load(Ordering::Relaxed),
            fallback_uses: self.counters.fallback_uses.load(Ordering::Relaxed),
            bytes: self.counters.bytes.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fallback_only_tier_serves_writes_it_has_seen() {
        let tier = CacheTier::new(None, 16);
        tier.set("context", "user-1", b"packet", None).await;
        let value = tier.get("context", "user-1").await;
        assert_eq!(value, Some(b"packet".to_vec()));
        assert_eq!(tier.stats().fallback_uses, 2);
    }

    #[tokio::test]
    async fn miss_on_unknown_key_never_raises() {
        let tier = CacheTier::new(None, 16);
        let value = tier.get("energy", "no-such-user").await;
        assert_eq!(value, None);
        assert_eq!(tier.stats().misses, 1);
    }

    #[tokio::test]
    async fn delete_removes_the_fallback_entry() {
        let tier = CacheTier::new(None, 16);
        tier.set("energy", "user-2", b"100", None).await;
        tier.delete("energy", "user-2").await;
        assert_eq!(tier.get("energy", "user-2").await, None);
    }

    #[tokio::test]
    async fn invalidate_prefix_clears_only_matching_keys() {
        let tier = CacheTier::new(None, 16);
        tier.set("context", "user-a", b"1", None).await;
        tier.set("context", "user-b", b"2", None).await;
        tier.invalidate_prefix("context", "user-a").await;
        assert_eq!(tier.get("context", "user-a").await, None);
        assert_eq!(tier.get("context", "user-b").await, Some(b"2".to_vec()));
    }

    #[tokio::test]
    async fn fallback_evicts_least_recently_used_entry_at_capacity() {
        let tier = CacheTier::new(None, 2);
        tier.set("context", "a", b"1", None).await;
        tier.set("context", "b", b"2", None).await;
        // touch "a" so "b" becomes the least recently used entry
        let _ = tier.get("context", "a").await;
        tier.set("context", "c", b"3", None).await;

        assert_eq!(tier.get("context", "b").await, None);
        assert_eq!(tier.get("context", "a").await, Some(b"1".to_vec()));
        assert_eq!(tier.get("context", "c").await, Some(b"3".to_vec()));
    }
}
