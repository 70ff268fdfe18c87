// [libs/domain/models/src/ratelimit.rs]
/*!
 * APARATO: RATE LIMIT RULE MODEL (L2)
 * RESPONSABILIDAD: FORMA DE LA CONFIGURACIÓN Y VEREDICTO DEL LIMITADOR
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use typeshare::typeshare;

#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RateLimitAlgorithm {
    FixedWindow,
    SlidingWindow,
    TokenBucket,
    LeakyBucket,
}

#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum RulePriority {
    Standard,
    Critical,
}

/// Configuración compile-time de una regla por `scope`.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitRule {
    pub scope: &'static str,
    pub algorithm: RateLimitAlgorithm,
    pub requests_per_window: u32,
    pub window_seconds: u64,
    pub block_duration_seconds: u64,
    pub burst_size: u32,
    pub enabled: bool,
    pub priority: RulePriority,
}

#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RateLimitVerdict {
    Allowed,
    Limited,
    Blocked,
}

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitDecision {
    pub verdict: RateLimitVerdict,
    pub remaining: i64,
    pub reset_at: DateTime<Utc>,
    pub blocked_until: Option<DateTime<Utc>>,
}

/// Tabla compile-time de reglas por scope.
pub const RATE_LIMIT_RULES: &[RateLimitRule] = &[
    RateLimitRule {
        scope: "auth.login",
        algorithm: RateLimitAlgorithm::FixedWindow,
        requests_per_window: 5,
        window_seconds: 300,
        block_duration_seconds: 900,
        burst_size: 0,
        enabled: true,
        priority: RulePriority::Critical,
    },
    RateLimitRule {
        scope: "api.general",
        algorithm: RateLimitAlgorithm::SlidingWindow,
        requests_per_window: 120,
        window_seconds: 60,
        block_duration_seconds: 60,
        burst_size: 0,
        enabled: true,
        priority: RulePriority::Standard,
    },
    RateLimitRule {
        scope: "api.energy",
        algorithm: RateLimitAlgorithm::TokenBucket,
        requests_per_window: 60,
        window_seconds: 60,
        block_duration_seconds: 30,
        burst_size: 10,
        enabled: true,
        priority: RulePriority::Standard,
    },
    RateLimitRule {
        scope: "global.ddos",
        algorithm: RateLimitAlgorithm::LeakyBucket,
        requests_per_window: 5000,
        window_seconds: 60,
        block_duration_seconds: 120,
        burst_size: 200,
        enabled: true,
        priority: RulePriority::Critical,
    },
    RateLimitRule {
        scope: "ip.general",
        algorithm: RateLimitAlgorithm::SlidingWindow,
        requests_per_window: 300,
        window_seconds: 60,
        block_duration_seconds: 60,
        burst_size: 0,
        enabled: true,
        priority: RulePriority::Standard,
    },
];

pub fn rule_for_scope(scope: &str) -> Option<&'static RateLimitRule> {
    RATE_LIMIT_RULES.iter().find(|rule| rule.scope == scope)
}
