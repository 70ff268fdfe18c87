// [libs/core/reliability/src/pool.rs]
/*!
 * =================================================================
 * APARATO: CONNECTION POOL + CIRCUIT BREAKER (V1.0 - GROUND ZERO)
 * CLASIFICACIÓN: RELIABILITY SUBSTRATE (ESTRATO L1)
 * RESPONSABILIDAD: AISLAMIENTO DE FALLOS EN DEPENDENCIAS EXTERNAS
 *
 * Closed -> Open -> HalfOpen -> {Closed, Open}. Un solo fallo en
 * HalfOpen reabre el circuito inmediatamente; éxitos consecutivos en
 * HalfOpen hasta `half_open_success_threshold` lo cierran.
 * =================================================================
 */

use crate::errors::PoolError;
use backoff::backoff::Backoff;
use backoff::ExponentialBackoffBuilder;
use std::fmt;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Clone)]
pub struct BreakerConfig {
    pub failure_threshold: u32,
    pub cooldown: Duration,
    pub half_open_max_calls: u32,
    pub half_open_success_threshold: u32,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            cooldown: Duration::from_secs(30),
            half_open_max_calls: 3,
            half_open_success_threshold: 2,
        }
    }
}

struct BreakerInner {
    state: BreakerState,
    opened_at: Option<Instant>,
    half_open_inflight: u32,
    half_open_successes: u32,
}

/// A single named circuit, guarding one upstream dependency (a database
/// shard, an AI provider, a payment provider).
pub struct CircuitBreaker {
    name: String,
    config: BreakerConfig,
    inner: Mutex<BreakerInner>,
    consecutive_failures: AtomicU32,
    trips: AtomicU64,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, config: BreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            inner: Mutex::new(BreakerInner {
                state: BreakerState::Closed,
                opened_at: None,
                half_open_inflight: 0,
                half_open_successes: 0,
            }),
            consecutive_failures: AtomicU32::new(0),
            trips: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> BreakerState {
        let mut guard = self.inner.lock().expect("breaker mutex poisoned");
        if guard.state == BreakerState::Open {
            if let Some(opened_at) = guard.opened_at {
                if opened_at.elapsed() >= self.config.cooldown {
                    guard.state = BreakerState::HalfOpen;
                    guard.half_open_inflight = 0;
                    guard.half_open_successes = 0;
                }
            }
        }
        guard.state
    }

    /// Returns `true` when a caller may attempt the guarded call right now.
    fn admit(&self) -> bool {
        match self.state() {
            BreakerState::Closed => true,
            BreakerState::Open => false,
            BreakerState::HalfOpen => {
                let mut guard = self.inner.lock().expect("breaker mutex poisoned");
                if guard.half_open_inflight < self.config.half_open_max_calls {
                    guard.half_open_inflight += 1;
                    true
                } else {
                    false
                }
            }
        }
    }

    fn record_success(&self) {
        self.consecutive_failures.store(0, Ordering::Relaxed);
        let mut guard = self.inner.lock().expect("breaker mutex poisoned");
        match guard.state {
            BreakerState::HalfOpen => {
                guard.half_open_successes += 1;
                if guard.half_open_successes >= self.config.half_open_success_threshold {
                    guard.state = BreakerState::Closed;
                    guard.opened_at = None;
                }
            }
            BreakerState::Closed | BreakerState::Open => {}
        }
    }

    fn record_failure(&self) {
        let mut guard = self.inner.lock().expect("breaker mutex poisoned");
        match guard.state {
            BreakerState::HalfOpen => {
                guard.state = BreakerState::Open;
                guard.opened_at = Some(Instant::now());
                self.trips.fetch_add(1, Ordering::Relaxed);
            }
            BreakerState::Closed => {
                let failures = self.consecutive_failures.fetch_add(1, Ordering::Relaxed) + 1;
                if failures >= self.config.failure_threshold {
                    guard.state = BreakerState::Open;
                    guard.opened_at = Some(Instant::now());
                    self.trips.fetch_add(1, Ordering::Relaxed);
                    warn!(circuit = %self.name, "🔴 [POOL]: circuit tripped open");
                }
            }
            BreakerState::Open => {}
        }
    }

    pub fn trip_count(&self) -> u64 {
        self.trips.load(Ordering::Relaxed)
    }
}

/// Wraps an upstream operation with breaker admission, a per-call deadline
/// and bounded exponential-backoff retries. Generic over the upstream's own
/// error type `E` so both the database layer and provider clients can share
/// one substrate.
pub struct ConnectionPool {
    breaker: CircuitBreaker,
    call_timeout: Duration,
    max_retries: u32,
}

impl ConnectionPool {
    pub fn new(name: impl Into<String>, breaker_config: BreakerConfig, call_timeout: Duration, max_retries: u32) -> Self {
        Self {
            breaker: CircuitBreaker::new(name, breaker_config),
            call_timeout,
            max_retries,
        }
    }

    pub fn breaker_state(&self) -> BreakerState {
        self.breaker.state()
    }

    #[instrument(skip(self, operation))]
    pub async fn execute<T, E, F, Fut>(&self, mut operation: F) -> Result<T, PoolError<E>>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
        E: fmt::Display + fmt::Debug,
    {
        if !self.breaker.admit() {
            return Err(PoolError::CircuitOpen);
        }

        let mut backoff = ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(50))
            .with_multiplier(2.0)
            .with_max_interval(Duration::from_secs(2))
            .with_max_elapsed_time(Some(self.call_timeout))
            .build();

        let mut attempt = 0u32;
        loop {
            let outcome = tokio::time::timeout(self.call_timeout, operation()).await;
            match outcome {
                Ok(Ok(value)) => {
                    self.breaker.record_success();
                    return Ok(value);
                }
                Ok(Err(error)) => {
                    attempt += 1;
                    if attempt > self.max_retries {
                        self.breaker.record_failure();
                        return Err(PoolError::Upstream(error));
                    }
                    match backoff.next_backoff() {
                        Some(delay) => tokio::time::sleep(delay).await,
                        None => {
                            self.breaker.record_failure();
                            return Err(PoolError::Upstream(error));
                        }
                    }
                }
                Err(_elapsed) => {
                    self.breaker.record_failure();
                    return Err(PoolError::Timeout);
                }
            }
        }
    }
}
