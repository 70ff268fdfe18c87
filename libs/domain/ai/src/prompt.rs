// [libs/domain/ai/src/prompt.rs]
/*!
 * APARATO: PROMPT ASSEMBLY (L2)
 * RESPONSABILIDAD: COMPOSICIÓN DE system+user PROMPT DESDE EL CONTEXT PACKET
 */

use hub_domain_models::context::{ContextPacket, EnergyLevel, SentimentCategory};

const PERSONALITY_PROMPT: &str = "Tu es Luna, coach carrière bienveillante et directe. \
Réponds de façon concrète, jamais condescendante.";

fn sentiment_hint(sentiment: SentimentCategory) -> &'static str {
    match sentiment {
        SentimentCategory::Motivated => "L'utilisateur semble motivé: encourage l'élan sans minimiser l'effort restant.",
        SentimentCategory::Anxious => "L'utilisateur semble anxieux: rassure avant de conseiller, évite le ton alarmiste.",
        SentimentCategory::Factual => "L'utilisateur veut des faits: reste concis, évite le remplissage émotionnel.",
        SentimentCategory::Curious => "L'utilisateur explore des options: propose des pistes plutôt qu'une réponse unique.",
        SentimentCategory::Neutral => "Adopte un ton neutre et professionnel.",
    }
}

fn energy_hint(level: EnergyLevel) -> &'static str {
    match level {
        EnergyLevel::High => "L'utilisateur a de la marge d'énergie: tu peux proposer une action plus ambitieuse.",
        EnergyLevel::Medium => "Propose une prochaine étape raisonnable, sans surcharger.",
        EnergyLevel::Low => "L'énergie restante est faible: privilégie une réponse courte et à fort impact.",
    }
}

fn packet_summary(packet: &ContextPacket) -> String {
    format!(
        "Profil: {} jours d'ancienneté, plan {}. Sessions sur 7 jours: {}. {} {}",
        packet.account_age_days,
        packet.plan,
        packet.usage.sessions_last_7_days,
        sentiment_hint(packet.sentiment),
        energy_hint(packet.energy_level),
    )
}

/// Ensambla el prompt completo: personalidad + resumen del Context Packet +
/// mensaje del usuario, en ese orden exacto.
pub fn assemble(packet: &ContextPacket, message: &str) -> String {
    format!("{PERSONALITY_PROMPT}\n\n{}\n\nMessage utilisateur: {message}", packet_summary(packet))
}
