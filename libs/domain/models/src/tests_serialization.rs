// [libs/domain/models/src/tests_serialization.rs]
//! APARATO: MODELS SERIALIZATION CERTIFICATION
//! RESPONSABILIDAD: GARANTIZAR LA ESTABILIDAD DEL CONTRATO JSON DE BORDE

use chrono::Utc;
use hub_domain_models::energy::{CanPerformResponse, Energy, SubscriptionType};
use hub_domain_models::event::{mask_pii, DomainEvent, EventType, DEFAULT_PII_KEYS};
use uuid::Uuid;

#[test]
fn energy_row_round_trips_through_json() {
    let energy = Energy::new_for_registration(Uuid::new_v4());
    let encoded = serde_json::to_string(&energy).expect("serializable");
    let decoded: Energy = serde_json::from_str(&encoded).expect("deserializable");
    assert_eq!(decoded.current_energy, energy.current_energy);
    assert!(matches!(decoded.subscription_type, SubscriptionType::Standard));
}

#[test]
fn can_perform_response_uses_camel_case_keys() {
    let response = CanPerformResponse {
        allowed: true,
        required: 5,
        current: 80.0,
        deficit: 0.0,
        is_unlimited: false,
    };
    let encoded = serde_json::to_value(&response).unwrap();
    assert_eq!(encoded["isUnlimited"], serde_json::json!(false));
}

#[test]
fn domain_event_masks_configured_keys_before_being_considered_persisted() {
    let mut payload = serde_json::json!({ "email": "bob@example.com" });
    mask_pii(&mut payload, DEFAULT_PII_KEYS);

    let event = DomainEvent {
        event_id: Uuid::new_v4(),
        event_type: EventType::UserRegistered,
        actor_user_id: Uuid::new_v4(),
        payload,
        metadata: serde_json::json!({}),
        created_at: Utc::now(),
    };

    let encoded = serde_json::to_value(&event).unwrap();
    assert_eq!(encoded["payload"]["email"], serde_json::json!("bo***"));
    assert_eq!(encoded["type"], serde_json::json!("UserRegistered"));
}
