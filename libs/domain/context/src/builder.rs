// [libs/domain/context/src/builder.rs]
/*!
 * =================================================================
 * APARATO: NARRATIVE CONTEXT BUILDER (V1.0 - GROUND ZERO)
 * CLASIFICACIÓN: DOMAIN SERVICE (ESTRATO L2)
 * RESPONSABILIDAD: AGREGACIÓN DE USO/PROGRESO/SENTIMIENTO/CONFIANZA
 *
 * Tres capas de caché, de la más rápida a la más lenta:
 *   L0: HashMap en memoria de proceso, TTL corto (`L0_TTL`) — absorbe
 *       ráfagas de peticiones del mismo turno de conversación.
 *   L1: `hub_core_reliability::CacheTier` (Redis + LRU), TTL largo
 *       (`L1_TTL`) — compartido entre réplicas del Hub.
 *   L2: Reconstrucción por "fold" sobre el event store + snapshot de
 *       energía — la fuente de verdad, siempre correcta pero la más cara.
 *
 * `build` nunca retorna `Err`: cualquier fallo aguas abajo degrada a
 * `ContextPacket::empty`.
 * =================================================================
 */

use crate::sentiment;
use crate::source::ContextSource;
use chrono::{Duration, Utc};
use hub_core_reliability::cache::CacheTier;
use hub_domain_models::context::{ContextPacket, EnergyLevel, MetricProgress, TrendLabel, UsageSummary};
use hub_domain_models::event::DomainEvent;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::time::{Duration as StdDuration, Instant};
use tracing::{instrument, warn};
use uuid::Uuid;

const L0_TTL: StdDuration = StdDuration::from_secs(20);
const L1_TTL: StdDuration = StdDuration::from_secs(900);
const NARRATIVE_WINDOW_DAYS: i64 = 30;

struct L0Entry {
    packet: ContextPacket,
    expires_at: Instant,
}

pub struct ContextBuilder<S: ContextSource> {
    source: S,
    cache: CacheTier,
    l0: Mutex<HashMap<Uuid, L0Entry>>,
}

impl<S: ContextSource> ContextBuilder<S> {
    pub fn new(source: S, cache: CacheTier) -> Self {
        Self { source, cache, l0: Mutex::new(HashMap::new()) }
    }

    /// Stats of the L1 cache tier, exposed for the monitoring surface.
    pub fn cache_stats(&self) -> hub_core_reliability::cache::CacheStats {
        self.cache.stats()
    }

    #[instrument(skip(self))]
    pub async fn build(&self, user_id: Uuid) -> ContextPacket {
        if let Some(packet) = self.read_l0(user_id) {
            return packet;
        }

        if let Some(bytes) = self.cache.get("context", &user_id.to_string()).await {
            if let Ok(packet) = serde_json::from_slice::<ContextPacket>(&bytes) {
                self.write_l0(user_id, packet.clone());
                return packet;
            }
        }

        let packet = self.fold(user_id).await;
        self.write_l0(user_id, packet.clone());
        if let Ok(bytes) = serde_json::to_vec(&packet) {
            self.cache.set("context", &user_id.to_string(), &bytes, Some(L1_TTL)).await;
        }
        packet
    }

    /// Drops both cache layers for `user_id`, forcing the next `build` call
    /// to fold fresh from the event store. Called after any energy
    /// movement or newly recorded event that should be reflected promptly.
    pub async fn invalidate(&self, user_id: Uuid) {
        self.l0.lock().expect("context L0 mutex poisoned").remove(&user_id);
        self.cache.delete("context", &user_id.to_string()).await;
    }

    fn read_l0(&self, user_id: Uuid) -> Option<ContextPacket> {
        let mut guard = self.l0.lock().expect("context L0 mutex poisoned");
        match guard.get(&user_id) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.packet.clone()),
            Some(_) => {
                guard.remove(&user_id);
                None
            }
            None => None,
        }
    }

    fn write_l0(&self, user_id: Uuid, packet: ContextPacket) {
        self.l0
            .lock()
            .expect("context L0 mutex poisoned")
            .insert(user_id, L0Entry { packet, expires_at: Instant::now() + L0_TTL });
    }

    async fn fold(&self, user_id: Uuid) -> ContextPacket {
        let window = Duration::days(NARRATIVE_WINDOW_DAYS);

        let events = match self.source.recent_events(user_id, window).await {
            Ok(events) => events,
            Err(error) => {
                warn!("⚠️ [CONTEXT]: event source unavailable, returning empty packet: {}", error);
                return ContextPacket::empty(user_id);
            }
        };
        let energy = match self.source.energy(user_id).await {
            Ok(energy) => energy,
            Err(error) => {
                warn!("⚠️ [CONTEXT]: energy source unavailable, returning empty packet: {}", error);
                return ContextPacket::empty(user_id);
            }
        };
        let account_age_days = self.source.account_age_days(user_id).await.unwrap_or(0);
        let plan = self.source.plan_name(user_id).await.unwrap_or_else(|_| "standard".to_string());

        let usage = Self::usage_summary(&events);
        let progress = Self::progress_metrics(&events);
        let sentiment_category = sentiment::scan(&events);
        let energy_level = Self::energy_level(energy.current_energy, energy.max_energy);
        let confidence = Self::confidence(events.len());

        ContextPacket {
            user_id,
            account_age_days,
            plan,
            usage,
            progress,
            sentiment: sentiment_category,
            energy_level,
            confidence,
            generated_at: Utc::now(),
        }
    }

    fn usage_summary(events: &[DomainEvent]) -> UsageSummary {
        let seven_days_ago = Utc::now() - Duration::days(7);
        let sessions_last_7_days =
            events.iter().filter(|event| event.event_type.is_session_kind() && event.created_at >= seven_days_ago).count() as u32;

        let mut app_mix: Vec<String> = events
            .iter()
            .filter_map(|event| event.metadata.get("app_source").and_then(|v| v.as_str()))
            .map(|s| s.to_string())
            .collect();
        app_mix.sort();
        app_mix.dedup();

        let mut action_counts: BTreeMap<String, u32> = BTreeMap::new();
        for event in events {
            if let Some(action) = event.payload.get("action").and_then(|v| v.as_str()) {
                *action_counts.entry(action.to_string()).or_insert(0) += 1;
            }
        }

        UsageSummary { sessions_last_7_days, app_mix, action_counts }
    }

    /// One progress metric: conversational engagement, measured as session
    /// events per day over the 1/7/30-day trailing windows.
    fn progress_metrics(events: &[DomainEvent]) -> Vec<MetricProgress> {
        let now = Utc::now();
        let count_since = |days: i64| {
            let cutoff = now - Duration::days(days);
            events.iter().filter(|event| event.event_type.is_session_kind() && event.created_at >= cutoff).count() as f64
        };

        let latest_value = count_since(1);
        let delta_7d = count_since(7);
        let delta_30d = count_since(30);

        let trend = if delta_30d == 0.0 {
            TrendLabel::Stagnant
        } else if latest_value > delta_7d / 7.0 * 1.5 {
            TrendLabel::Breakthrough
        } else if latest_value > delta_7d / 7.0 {
            TrendLabel::Rising
        } else if latest_value < delta_7d / 7.0 * 0.5 {
            TrendLabel::Declining
        } else {
            TrendLabel::Stable
        };

        vec![MetricProgress {
            metric: "engagement_sessions_per_day".to_string(),
            latest_value,
            previous_value: None,
            delta_1d: latest_value,
            delta_7d,
            delta_30d,
            trend,
        }]
    }

    fn energy_level(current: f64, max: f64) -> EnergyLevel {
        if max <= 0.0 {
            return EnergyLevel::Medium;
        }
        let ratio = current / max;
        if ratio >= 0.66 {
            EnergyLevel::High
        } else if ratio >= 0.33 {
            EnergyLevel::Medium
        } else {
            EnergyLevel::Low
        }
    }

    /// More observed events raise confidence in the aggregate, capped at
    /// 1.0 and floored at 0.2 once at least one event is present.
    fn confidence(event_count: usize) -> f64 {
        if event_count == 0 {
            return 0.2;
        }
        (event_count as f64 / 50.0).min(1.0).max(0.2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ContextSourceError;
    use async_trait::async_trait;
    use hub_domain_models::energy::{DEFAULT_MAX_ENERGY, SubscriptionType};
    use hub_domain_models::event::EventType;

    struct StubSource {
        events: Vec<DomainEvent>,
        energy: hub_domain_models::energy::Energy,
    }

    #[async_trait]
    impl ContextSource for StubSource {
        async fn recent_events(&self, _user_id: Uuid, _window: Duration) -> Result<Vec<DomainEvent>, ContextSourceError> {
            Ok(self.events.clone())
        }
        async fn energy(&self, _user_id: Uuid) -> Result<hub_domain_models::energy::Energy, ContextSourceError> {
            Ok(self.energy.clone())
        }
        async fn account_age_days(&self, _user_id: Uuid) -> Result<i64, ContextSourceError> {
            Ok(42)
        }
        async fn plan_name(&self, _user_id: Uuid) -> Result<String, ContextSourceError> {
            Ok("standard".to_string())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl ContextSource for FailingSource {
        async fn recent_events(&self, _user_id: Uuid, _window: Duration) -> Result<Vec<DomainEvent>, ContextSourceError> {
            Err(ContextSourceError::Unavailable("db down".to_string()))
        }
        async fn energy(&self, _user_id: Uuid) -> Result<hub_domain_models::energy::Energy, ContextSourceError> {
            Err(ContextSourceError::Unavailable("db down".to_string()))
        }
        async fn account_age_days(&self, _user_id: Uuid) -> Result<i64, ContextSourceError> {
            Err(ContextSourceError::Unavailable("db down".to_string()))
        }
        async fn plan_name(&self, _user_id: Uuid) -> Result<String, ContextSourceError> {
            Err(ContextSourceError::Unavailable("db down".to_string()))
        }
    }

    fn sample_energy(current: f64) -> hub_domain_models::energy::Energy {
        hub_domain_models::energy::Energy {
            user_id: Uuid::new_v4(),
            current_energy: current,
            max_energy: DEFAULT_MAX_ENERGY,
            total_purchased: 0.0,
            total_consumed: 0.0,
            last_recharge_at: None,
            subscription_type: SubscriptionType::Standard,
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn build_degrades_to_empty_packet_on_source_failure() {
        let builder = ContextBuilder::new(FailingSource, CacheTier::new(None, 16));
        let packet = builder.build(Uuid::new_v4()).await;
        assert_eq!(packet.confidence, 0.1);
    }

    #[tokio::test]
    async fn build_computes_high_energy_level_near_max() {
        let source = StubSource { events: vec![], energy: sample_energy(90.0) };
        let builder = ContextBuilder::new(source, CacheTier::new(None, 16));
        let packet = builder.build(Uuid::new_v4()).await;
        assert_eq!(packet.energy_level, EnergyLevel::High);
    }

    #[tokio::test]
    async fn build_serves_subsequent_calls_from_l0_cache() {
        let source = StubSource { events: vec![], energy: sample_energy(10.0) };
        let builder = ContextBuilder::new(source, CacheTier::new(None, 16));
        let user_id = Uuid::new_v4();

        let first = builder.build(user_id).await;
        let second = builder.build(user_id).await;
        assert_eq!(first.generated_at, second.generated_at);
    }

    #[tokio::test]
    async fn invalidate_forces_a_fresh_fold() {
        let source = StubSource { events: vec![], energy: sample_energy(10.0) };
        let builder = ContextBuilder::new(source, CacheTier::new(None, 16));
        let user_id = Uuid::new_v4();

        let first = builder.build(user_id).await;
        builder.invalidate(user_id).await;
        let second = builder.build(user_id).await;
        assert!(second.generated_at >= first.generated_at);
    }

    #[tokio::test]
    async fn confidence_grows_with_event_volume() {
        let many_events: Vec<DomainEvent> = (0..30)
            .map(|_| DomainEvent {
                event_id: Uuid::new_v4(),
                event_type: EventType::ActionPerformed,
                actor_user_id: Uuid::new_v4(),
                payload: serde_json::json!({}),
                metadata: serde_json::json!({}),
                created_at: Utc::now(),
            })
            .collect();
        let source = StubSource { events: many_events, energy: sample_energy(50.0) };
        let builder = ContextBuilder::new(source, CacheTier::new(None, 16));
        let packet = builder.build(Uuid::new_v4()).await;
        assert!(packet.confidence > 0.2);
    }
}
