// [libs/domain/models/src/event.rs]
/*!
 * APARATO: DOMAIN EVENT MODEL (L2)
 * RESPONSABILIDAD: FORMA DEL FLUJO INMUTABLE DE EVENTOS DE DOMINIO
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use typeshare::typeshare;
use uuid::Uuid;

#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "PascalCase")]
pub enum EventType {
    UserRegistered,
    LoginSucceeded,
    LoginFailed,
    EnergyConsumed,
    EnergyRefunded,
    EnergyPurchased,
    ActionPerformed,
    AiResponseGenerated,
    AiResponseFailed,
    AlertTriggered,
}

impl EventType {
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::UserRegistered => "UserRegistered",
            EventType::LoginSucceeded => "LoginSucceeded",
            EventType::LoginFailed => "LoginFailed",
            EventType::EnergyConsumed => "EnergyConsumed",
            EventType::EnergyRefunded => "EnergyRefunded",
            EventType::EnergyPurchased => "EnergyPurchased",
            EventType::ActionPerformed => "ActionPerformed",
            EventType::AiResponseGenerated => "AIResponseGenerated",
            EventType::AiResponseFailed => "AIResponseFailed",
            EventType::AlertTriggered => "AlertTriggered",
        }
    }

    /// Prefijo usado por el constructor de contexto para detectar eventos
    /// de tipo "sesión" al calcular la métrica de uso de 7 días.
    pub fn is_session_kind(self) -> bool {
        matches!(
            self,
            EventType::LoginSucceeded | EventType::ActionPerformed | EventType::AiResponseGenerated
        )
    }
}

/// Evento de dominio append-only. El orden total es por usuario, no global.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainEvent {
    pub event_id: Uuid,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub actor_user_id: Uuid,
    pub payload: serde_json::Value,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Conjunto de claves de payload cuyo valor se enmascara antes de persistir.
/// Configurable; el valor por defecto cubre los campos que aparecen en los
/// payloads de registro/login del Hub.
pub const DEFAULT_PII_KEYS: &[&str] = &["email", "password", "display_name", "ip_address"];

/// Enmascara en el lugar los valores de las claves dadas dentro de un objeto
/// JSON de nivel superior, dejando `<primeros-2-caracteres>***`.
pub fn mask_pii(payload: &mut serde_json::Value, keys: &[&str]) {
    if let serde_json::Value::Object(map) = payload {
        for key in keys {
            if let Some(value) = map.get_mut(*key) {
                if let serde_json::Value::String(raw) = value {
                    let prefix: String = raw.chars().take(2).collect();
                    *value = serde_json::Value::String(format!("{}***", prefix));
                }
            }
        }
    }
}

#[typeshare]
#[derive(Debug, Deserialize)]
pub struct EventQuery {
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub types: Vec<EventType>,
}

pub const DEFAULT_EVENT_WINDOW_DAYS: i64 = 30;
pub const MAX_EVENTS_PER_PAGE: usize = 1000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_pii_preserves_first_two_chars() {
        let mut payload = serde_json::json!({ "email": "alice@example.com", "kept": "visible" });
        mask_pii(&mut payload, DEFAULT_PII_KEYS);
        assert_eq!(payload["email"], serde_json::json!("al***"));
        assert_eq!(payload["kept"], serde_json::json!("visible"));
    }

    #[test]
    fn mask_pii_is_a_no_op_for_missing_keys() {
        let mut payload = serde_json::json!({ "action": "consume" });
        mask_pii(&mut payload, DEFAULT_PII_KEYS);
        assert_eq!(payload["action"], serde_json::json!("consume"));
    }
}
