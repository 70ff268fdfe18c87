// [libs/core/reliability/src/ratelimit.rs]
/*!
 * =================================================================
 * APARATO: RATE LIMITER (V1.0 - GROUND ZERO)
 * CLASIFICACIÓN: RELIABILITY SUBSTRATE (ESTRATO L1)
 * RESPONSABILIDAD: EVALUACIÓN ATÓMICA DE CUOTAS POR VENTANA/TOKEN
 *
 * Cada algoritmo se evalúa en un único script Lua del lado del
 * servidor Redis para evitar la condición de carrera leer-modificar-
 * escribir entre réplicas del hub. Cuando no hay Redis disponible, un
 * evaluador en memoria de proceso (por instancia, no distribuido)
 * mantiene el servicio degradado en vez de abierto. Rebasar la cuota
 * arma un bloqueo explícito de `block_duration_seconds`: mientras esté
 * vigente, toda llamada siguiente se rechaza sin reevaluar el
 * algoritmo, reflejando la tabla `rate_limit_blocks`.
 * =================================================================
 */

use chrono::{DateTime, TimeZone, Utc};
use hub_domain_models::ratelimit::{
    RateLimitAlgorithm, RateLimitDecision, RateLimitRule, RateLimitVerdict,
};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Script};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

fn millis_to_datetime(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis).single().unwrap_or_else(Utc::now)
}

/// `KEYS[1]` = bucket key. `ARGV[1]` = window size (ms). `ARGV[2]` = limit.
/// `ARGV[3]` = now (ms). Resets the counter at the start of each fixed
/// window and returns `{allowed, remaining, reset_at_ms}`.
const FIXED_WINDOW_SCRIPT: &str = r#"
local window_ms = tonumber(ARGV[1])
local limit = tonumber(ARGV[2])
local now = tonumber(ARGV[3])
local window_start = now - (now % window_ms)
local bucket_key = KEYS[1] .. ":" .. window_start

local current = redis.call("INCR", bucket_key)
if current == 1 then
    redis.call("PEXPIRE", bucket_key, window_ms)
end

local allowed = 1
if current > limit then
    allowed = 0
end
local remaining = limit - current
if remaining < 0 then remaining = 0 end
return {allowed, remaining, window_start + window_ms}
"#;

/// Sliding window approximated via two adjacent fixed windows, weighted by
/// elapsed fraction of the current window (Cloudflare-style estimate).
const SLIDING_WINDOW_SCRIPT: &str = r#"
local window_ms = tonumber(ARGV[1])
local limit = tonumber(ARGV[2])
local now = tonumber(ARGV[3])
local current_start = now - (now % window_ms)
local previous_start = current_start - window_ms
local current_key = KEYS[1] .. ":" .. current_start
local previous_key = KEYS[1] .. ":" .. previous_start

local current_count = tonumber(redis.call("GET", current_key) or "0")
local previous_count = tonumber(redis.call("GET", previous_key) or "0")
local elapsed_fraction = (now - current_start) / window_ms
local estimate = (previous_count * (1 - elapsed_fraction)) + current_count

local allowed = 1
if estimate >= limit then
    allowed = 0
else
    redis.call("INCR", current_key)
    redis.call("PEXPIRE", current_key, window_ms * 2)
end

local remaining = limit - estimate
if remaining < 0 then remaining = 0 end
return {allowed, math.floor(remaining), current_start + window_ms}
"#;

/// Token bucket: `ARGV[1]` = capacity, `ARGV[2]` = refill rate per ms,
/// `ARGV[3]` = now (ms), `ARGV[4]` = cost.
const TOKEN_BUCKET_SCRIPT: &str = r#"
local capacity = tonumber(ARGV[1])
local refill_rate = tonumber(ARGV[2])
local now = tonumber(ARGV[3])
local cost = tonumber(ARGV[4])

local state = redis.call("HMGET", KEYS[1], "tokens", "updated_at")
local tokens = tonumber(state[1])
local updated_at = tonumber(state[2])
if tokens == nil then
    tokens = capacity
    updated_at = now
end

local elapsed = math.max(0, now - updated_at)
tokens = math.min(capacity, tokens + (elapsed * refill_rate))

local allowed = 0
if tokens >= cost then
    allowed = 1
    tokens = tokens - cost
end

redis.call("HMSET", KEYS[1], "tokens", tokens, "updated_at", now)
redis.call("PEXPIRE", KEYS[1], 3600000)
return {allowed, math.floor(tokens), now}
"#;

/// Leaky bucket: queue depth drains at `ARGV[2]` (leak rate per ms);
/// overflow beyond `ARGV[1]` (capacity) rejects the request.
const LEAKY_BUCKET_SCRIPT: &str = r#"
local capacity = tonumber(ARGV[1])
local leak_rate = tonumber(ARGV[2])
local now = tonumber(ARGV[3])

local state = redis.call("HMGET", KEYS[1], "level", "updated_at")
local level = tonumber(state[1])
local updated_at = tonumber(state[2])
if level == nil then
    level = 0
    updated_at = now
end

local elapsed = math.max(0, now - updated_at)
level = math.max(0, level - (elapsed * leak_rate))

local allowed = 0
if level < capacity then
    allowed = 1
    level = level + 1
end

redis.call("HMSET", KEYS[1], "level", level, "updated_at", now)
redis.call("PEXPIRE", KEYS[1], 3600000)
return {allowed, math.floor(capacity - level), now}
"#;

struct InMemoryWindow {
    count: u32,
    window_start_ms: i64,
}

/// Single-process fallback evaluator, used only when Redis is unreachable.
/// Degrades to per-instance accounting rather than refusing all traffic.
struct InProcessLimiter {
    windows: HashMap<String, InMemoryWindow>,
    blocks: HashMap<String, i64>,
}

impl InProcessLimiter {
    fn new() -> Self {
        Self { windows: HashMap::new(), blocks: HashMap::new() }
    }

    fn evaluate(&mut self, key: &str, rule: &RateLimitRule) -> RateLimitDecision {
        let now = now_millis();

        if let Some(&blocked_until) = self.blocks.get(key) {
            if blocked_until > now {
                return RateLimitDecision {
                    verdict: RateLimitVerdict::Blocked,
                    remaining: 0,
                    reset_at: millis_to_datetime(blocked_until),
                    blocked_until: Some(millis_to_datetime(blocked_until)),
                };
            }
            self.blocks.remove(key);
        }

        let window_ms = (rule.window_seconds.max(1) * 1000) as i64;
        let window_start = now - (now % window_ms);

        let entry = self.windows.entry(key.to_string()).or_insert(InMemoryWindow {
            count: 0,
            window_start_ms: window_start,
        });
        if entry.window_start_ms != window_start {
            entry.window_start_ms = window_start;
            entry.count = 0;
        }
        entry.count += 1;

        let limit = rule.requests_per_window + rule.burst_size;
        let reset_at_ms = window_start + window_ms;
        if entry.count <= limit {
            return RateLimitDecision {
                verdict: RateLimitVerdict::Allowed,
                remaining: (limit - entry.count) as i64,
                reset_at: millis_to_datetime(reset_at_ms),
                blocked_until: None,
            };
        }

        let blocked_until = now + (rule.block_duration_seconds as i64 * 1000);
        self.blocks.insert(key.to_string(), blocked_until);
        RateLimitDecision {
            verdict: RateLimitVerdict::Limited,
            remaining: 0,
            reset_at: millis_to_datetime(reset_at_ms),
            blocked_until: Some(millis_to_datetime(blocked_until)),
        }
    }
}

pub struct RateLimiter {
    primary: Option<Mutex<ConnectionManager>>,
    fallback: Mutex<InProcessLimiter>,
}

impl RateLimiter {
    pub fn new(primary: Option<ConnectionManager>) -> Self {
        Self {
            primary: primary.map(Mutex::new),
            fallback: Mutex::new(InProcessLimiter::new()),
        }
    }

    /// Whether requests are currently served against the Redis primary,
    /// exposed for the monitoring surface.
    pub fn uses_primary(&self) -> bool {
        self.primary.is_some()
    }

    fn script_for(algorithm: RateLimitAlgorithm) -> &'static str {
        match algorithm {
            RateLimitAlgorithm::FixedWindow => FIXED_WINDOW_SCRIPT,
            RateLimitAlgorithm::SlidingWindow => SLIDING_WINDOW_SCRIPT,
            RateLimitAlgorithm::TokenBucket => TOKEN_BUCKET_SCRIPT,
            RateLimitAlgorithm::LeakyBucket => LEAKY_BUCKET_SCRIPT,
        }
    }

    /// `key` identifies the caller within the rule's scope (user id, IP,
    /// or the literal scope name for global rules). Never returns an
    /// error: an unreachable Redis degrades to the in-process evaluator
    /// rather than failing the request open or closed unpredictably.
    pub async fn evaluate(&self, key: &str, rule: &RateLimitRule) -> RateLimitDecision {
        if !rule.enabled {
            return RateLimitDecision {
                verdict: RateLimitVerdict::Allowed,
                remaining: i64::from(rule.requests_per_window),
                reset_at: Utc::now(),
                blocked_until: None,
            };
        }

        let bucket_key = format!("ratelimit:{}:{}", rule.scope, key);

        if let Some(primary) = &self.primary {
            if let Some(decision) = self.evaluate_via_redis(primary, &bucket_key, rule).await {
                return decision;
            }
        }

        self.fallback
            .lock()
            .expect("ratelimit fallback mutex poisoned")
            .evaluate(&bucket_key, rule)
    }

    async fn evaluate_via_redis(
        &self,
        primary: &Mutex<ConnectionManager>,
        bucket_key: &str,
        rule: &RateLimitRule,
    ) -> Option<RateLimitDecision> {
        let block_key = format!("{}:blocked", bucket_key);
        let now = now_millis();

        let already_blocked: Result<Option<i64>, _> = {
            let mut connection = primary.lock().expect("ratelimit primary mutex poisoned");
            connection.get(&block_key).await
        };
        if let Ok(Some(blocked_until)) = already_blocked {
            if blocked_until > now {
                return Some(RateLimitDecision {
                    verdict: RateLimitVerdict::Blocked,
                    remaining: 0,
                    reset_at: millis_to_datetime(blocked_until),
                    blocked_until: Some(millis_to_datetime(blocked_until)),
                });
            }
        }

        let script = Script::new(Self::script_for(rule.algorithm));
        let limit = rule.requests_per_window + rule.burst_size;
        let invocation = {
            let mut connection = primary.lock().expect("ratelimit primary mutex poisoned");
            match rule.algorithm {
                RateLimitAlgorithm::FixedWindow | RateLimitAlgorithm::SlidingWindow => {
                    script
                        .key(bucket_key)
                        .arg((rule.window_seconds * 1000) as i64)
                        .arg(limit)
                        .arg(now)
                        .invoke_async::<_, (i64, i64, i64)>(&mut *connection)
                        .await
                }
                RateLimitAlgorithm::TokenBucket => {
                    let refill_rate = limit as f64 / (rule.window_seconds.max(1) * 1000) as f64;
                    script
                        .key(bucket_key)
                        .arg(limit)
                        .arg(refill_rate)
                        .arg(now)
                        .arg(1)
                        .invoke_async::<_, (i64, i64, i64)>(&mut *connection)
                        .await
                }
                RateLimitAlgorithm::LeakyBucket => {
                    let leak_rate = limit as f64 / (rule.window_seconds.max(1) * 1000) as f64;
                    script
                        .key(bucket_key)
                        .arg(limit)
                        .arg(leak_rate)
                        .arg(now)
                        .invoke_async::<_, (i64, i64, i64)>(&mut *connection)
                        .await
                }
            }
        };

        match invocation {
            Ok((allowed, remaining, reset_at_ms)) if allowed == 1 => Some(RateLimitDecision {
                verdict: RateLimitVerdict::Allowed,
                remaining: remaining.max(0),
                reset_at: millis_to_datetime(reset_at_ms),
                blocked_until: None,
            }),
            Ok((_, _, reset_at_ms)) => {
                let blocked_until = now + (rule.block_duration_seconds as i64 * 1000);
                let mut connection = primary.lock().expect("ratelimit primary mutex poisoned");
                let _: Result<(), _> = connection
                    .set_ex(&block_key, blocked_until, rule.block_duration_seconds.max(1))
                    .await;
                Some(RateLimitDecision {
                    verdict: RateLimitVerdict::Limited,
                    remaining: 0,
                    reset_at: millis_to_datetime(reset_at_ms),
                    blocked_until: Some(millis_to_datetime(blocked_until)),
                })
            }
            Err(error) => {
                debug!("⚠️ [RATELIMIT]: Redis script failed, using in-process fallback: {}", error);
                None
            }
        }
    }
}
