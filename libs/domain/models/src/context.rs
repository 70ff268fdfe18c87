// [libs/domain/models/src/context.rs]
/*!
 * APARATO: CONTEXT PACKET MODEL (L2)
 * RESPONSABILIDAD: FORMA DEL AGREGADO NARRATIVO CACHEADO POR USUARIO
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use typeshare::typeshare;
use uuid::Uuid;

#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SentimentCategory {
    Motivated,
    Anxious,
    Factual,
    Curious,
    Neutral,
}

#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EnergyLevel {
    High,
    Medium,
    Low,
}

#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TrendLabel {
    Breakthrough,
    Rising,
    Stable,
    Declining,
    Stagnant,
}

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSummary {
    pub sessions_last_7_days: u32,
    pub app_mix: Vec<String>,
    pub action_counts: std::collections::BTreeMap<String, u32>,
}

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricProgress {
    pub metric: String,
    pub latest_value: f64,
    pub previous_value: Option<f64>,
    pub delta_1d: f64,
    pub delta_7d: f64,
    pub delta_30d: f64,
    pub trend: TrendLabel,
}

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextPacket {
    pub user_id: Uuid,
    pub account_age_days: i64,
    pub plan: String,
    pub usage: UsageSummary,
    pub progress: Vec<MetricProgress>,
    pub sentiment: SentimentCategory,
    pub energy_level: EnergyLevel,
    pub confidence: f64,
    pub generated_at: DateTime<Utc>,
}

impl ContextPacket {
    /// Paquete vacío emitido cuando la construcción falla aguas abajo; nunca
    /// debe propagar el error al llamador.
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            account_age_days: 0,
            plan: "standard".to_string(),
            usage: UsageSummary {
                sessions_last_7_days: 0,
                app_mix: Vec::new(),
                action_counts: std::collections::BTreeMap::new(),
            },
            progress: Vec::new(),
            sentiment: SentimentCategory::Neutral,
            energy_level: EnergyLevel::Medium,
            confidence: 0.1,
            generated_at: Utc::now(),
        }
    }
}
