// [libs/domain/ai/src/classifier.rs]
/*!
 * APARATO: CHAT INTENT CLASSIFIER (L2)
 * RESPONSABILIDAD: RESOLUCIÓN DETERMINISTA DE `Action` DESDE TEXTO LIBRE
 *
 * Tabla keyword/intent heurística; el orden de desempate es
 * `Action::PRECEDENCE_ORDER` (ver DESIGN.md, Open Question "classifier
 * precedence" en `hub-domain-models::action_costs`), no un orden inventado
 * aquí. Cuando ninguna palabra clave coincide, cae a `Action::Conversation`
 * (costo 0), el trato conversacional gratuito del Hub.
 */

use hub_domain_models::action_costs::Action;

fn keywords_for(action: Action) -> &'static [&'static str] {
    match action {
        Action::AuditCompletProfil => &["audit complet", "audit de profil", "bilan complet"],
        Action::PlanReconversion => &["plan de reconversion", "reconversion professionnelle"],
        Action::SimulationEntretien => &["simulation d'entretien", "entrainement entretien", "mock interview"],
        Action::TransitionCarriere => &["transition de carriere", "changer de carriere"],
        Action::StrategieCandidature => &["strategie de candidature", "strategie de recherche"],
        Action::AnalyseCvComplete => &["analyse complete du cv", "audit de mon cv"],
        Action::MirrorMatch => &["mirror match", "comparer mon profil a l'offre"],
        Action::SalaryAnalysis => &["analyse salariale", "negociation salariale", "salaire"],
        Action::LettreMotivation => &["lettre de motivation", "ecrire une lettre"],
        Action::OptimisationCv => &["optimise mon cv", "optimisation cv", "ameliore mon cv"],
        Action::AnalyseOffre => &["analyse cette offre", "analyser l'offre d'emploi"],
        Action::FormatLettre => &["formate ma lettre", "mise en forme de la lettre"],
        Action::CorrectionPonctuelle => &["corrige", "correction", "relis ce paragraphe"],
        Action::ConseilRapide => &["conseil rapide", "un conseil", "petite question"],
        Action::VerificationFormat => &["verifie le format", "verification de mise en page"],
        Action::Conversation => &[],
    }
}

/// Clasifica un mensaje libre en la acción con mayor precedencia cuyas
/// palabras clave aparecen en el texto (insensible a mayúsculas). Devuelve
/// `Action::Conversation` si ninguna coincide.
pub fn classify(message: &str) -> Action {
    let normalized = message.to_lowercase();
    for action in Action::PRECEDENCE_ORDER {
        if *action == Action::Conversation {
            continue;
        }
        if keywords_for(*action).iter().any(|kw| normalized.contains(kw)) {
            return *action;
        }
    }
    Action::Conversation
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_greeting_classifies_as_conversation() {
        assert_eq!(classify("bonjour, comment ca va ?"), Action::Conversation);
    }

    #[test]
    fn cv_optimization_request_is_recognized() {
        assert_eq!(classify("Peux-tu optimiser mon cv pour ce poste ?"), Action::OptimisationCv);
    }

    #[test]
    fn cover_letter_request_is_recognized() {
        assert_eq!(classify("Ecris-moi une lettre de motivation pour ce poste."), Action::LettreMotivation);
    }

    #[test]
    fn overlapping_keywords_resolve_to_the_higher_precedence_action() {
        let message = "je veux un audit complet et optimiser mon cv";
        assert_eq!(classify(message), Action::AuditCompletProfil);
    }
}
