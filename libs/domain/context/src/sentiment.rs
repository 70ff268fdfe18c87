// [libs/domain/context/src/sentiment.rs]
/*!
 * APARATO: SENTIMENT KEYWORD SCANNER (L2)
 * RESPONSABILIDAD: HEURÍSTICA DE TONO A PARTIR DE PAYLOADS DE EVENTOS
 *
 * Tabla de palabras clave propia de esta implementación; ver DESIGN.md,
 * Open Question "sentiment keyword table".
 */

use hub_domain_models::context::SentimentCategory;
use hub_domain_models::event::DomainEvent;

const MOTIVATED_KEYWORDS: &[&str] = &["excited", "ready", "confident", "motiv", "determined", "hopeful"];
const ANXIOUS_KEYWORDS: &[&str] = &["worried", "anxious", "stressed", "nervous", "overwhelmed", "afraid"];
const CURIOUS_KEYWORDS: &[&str] = &["curious", "wondering", "explore", "how does", "what if", "learn"];
const FACTUAL_KEYWORDS: &[&str] = &["salary", "deadline", "requirement", "statistics", "figures", "data"];

fn collect_strings(value: &serde_json::Value, out: &mut Vec<String>) {
    match value {
        serde_json::Value::String(s) => out.push(s.to_lowercase()),
        serde_json::Value::Array(items) => items.iter().for_each(|item| collect_strings(item, out)),
        serde_json::Value::Object(map) => map.values().for_each(|item| collect_strings(item, out)),
        _ => {}
    }
}

/// Scans every string leaf in each event's payload for keyword hits, tallies
/// by category and returns the category with the most hits. Ties and the
/// absence of any hit both resolve to `Neutral`.
pub fn scan(events: &[DomainEvent]) -> SentimentCategory {
    let mut strings = Vec::new();
    for event in events {
        collect_strings(&event.payload, &mut strings);
    }

    let mut motivated = 0usize;
    let mut anxious = 0usize;
    let mut curious = 0usize;
    let mut factual = 0usize;

    for text in &strings {
        motivated += MOTIVATED_KEYWORDS.iter().filter(|kw| text.contains(**kw)).count();
        anxious += ANXIOUS_KEYWORDS.iter().filter(|kw| text.contains(**kw)).count();
        curious += CURIOUS_KEYWORDS.iter().filter(|kw| text.contains(**kw)).count();
        factual += FACTUAL_KEYWORDS.iter().filter(|kw| text.contains(**kw)).count();
    }

    let scores = [
        (SentimentCategory::Motivated, motivated),
        (SentimentCategory::Anxious, anxious),
        (SentimentCategory::Curious, curious),
        (SentimentCategory::Factual, factual),
    ];

    match scores.iter().max_by_key(|(_, score)| *score) {
        Some((category, score)) if *score > 0 => *category,
        _ => SentimentCategory::Neutral,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use hub_domain_models::event::EventType;
    use uuid::Uuid;

    fn event_with(text: &str) -> DomainEvent {
        DomainEvent {
            event_id: Uuid::new_v4(),
            event_type: EventType::ActionPerformed,
            actor_user_id: Uuid::new_v4(),
            payload: serde_json::json!({ "message": text }),
            metadata: serde_json::json!({}),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn no_events_yields_neutral() {
        assert_eq!(scan(&[]), SentimentCategory::Neutral);
    }

    #[test]
    fn motivated_keywords_win_when_dominant() {
        let events = vec![event_with("I feel so motivated and ready today")];
        assert_eq!(scan(&events), SentimentCategory::Motivated);
    }

    #[test]
    fn anxious_keywords_are_detected() {
        let events = vec![event_with("I'm really worried and overwhelmed about this interview")];
        assert_eq!(scan(&events), SentimentCategory::Anxious);
    }

    #[test]
    fn no_keyword_hits_yields_neutral() {
        let events = vec![event_with("plain text with no signal words")];
        assert_eq!(scan(&events), SentimentCategory::Neutral);
    }
}
