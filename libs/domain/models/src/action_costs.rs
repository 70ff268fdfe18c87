// [libs/domain/models/src/action_costs.rs]
/*!
 * APARATO: ACTION COST TABLE (L2)
 * RESPONSABILIDAD: GRAMÁTICA DETERMINISTA DE COSTO POR ACCIÓN
 *
 * Tabla compile-time `action_name -> costo entero`, valores comerciales
 * vigentes del catálogo de acciones facturables.
 */

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Acciones reconocidas por el Hub. El orden de esta lista es la precedencia
/// usada por el clasificador conversacional en `hub-domain-ai` quando dos
/// categorías se solapan (ver DESIGN.md, Open Question "classifier
/// precedence").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ConseilRapide,
    CorrectionPonctuelle,
    FormatLettre,
    VerificationFormat,
    LettreMotivation,
    OptimisationCv,
    AnalyseOffre,
    AnalyseCvComplete,
    MirrorMatch,
    SalaryAnalysis,
    TransitionCarriere,
    StrategieCandidature,
    AuditCompletProfil,
    PlanReconversion,
    SimulationEntretien,
    Conversation,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::ConseilRapide => "conseil_rapide",
            Action::CorrectionPonctuelle => "correction_ponctuelle",
            Action::FormatLettre => "format_lettre",
            Action::VerificationFormat => "verification_format",
            Action::LettreMotivation => "lettre_motivation",
            Action::OptimisationCv => "optimisation_cv",
            Action::AnalyseOffre => "analyse_offre",
            Action::AnalyseCvComplete => "analyse_cv_complete",
            Action::MirrorMatch => "mirror_match",
            Action::SalaryAnalysis => "salary_analysis",
            Action::TransitionCarriere => "transition_carriere",
            Action::StrategieCandidature => "strategie_candidature",
            Action::AuditCompletProfil => "audit_complet_profil",
            Action::PlanReconversion => "plan_reconversion",
            Action::SimulationEntretien => "simulation_entretien",
            Action::Conversation => "conversation",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        ACTION_BY_NAME.get(value).copied()
    }

    /// Lista ordenada por precedencia decreciente, para el clasificador
    /// heurístico de `hub-domain-ai`. Las acciones listadas primero ganan
    /// cuando el mensaje del usuario coincide con más de una categoría.
    pub const PRECEDENCE_ORDER: &'static [Action] = &[
        Action::AuditCompletProfil,
        Action::PlanReconversion,
        Action::SimulationEntretien,
        Action::TransitionCarriere,
        Action::StrategieCandidature,
        Action::AnalyseCvComplete,
        Action::MirrorMatch,
        Action::SalaryAnalysis,
        Action::LettreMotivation,
        Action::OptimisationCv,
        Action::AnalyseOffre,
        Action::FormatLettre,
        Action::CorrectionPonctuelle,
        Action::ConseilRapide,
        Action::VerificationFormat,
        Action::Conversation,
    ];
}

static ACTION_BY_NAME: Lazy<HashMap<&'static str, Action>> = Lazy::new(|| {
    Action::PRECEDENCE_ORDER
        .iter()
        .copied()
        .map(|action| (action.as_str(), action))
        .collect()
});

/// Costos de energía por acción, tomados 1:1 de `ENERGY_COSTS` en el
/// original Python. `conversation` cuesta 0 (trato conversacional gratuito).
static ACTION_COSTS: Lazy<HashMap<Action, i64>> = Lazy::new(|| {
    use Action::*;
    HashMap::from([
        (ConseilRapide, 5),
        (CorrectionPonctuelle, 5),
        (FormatLettre, 8),
        (VerificationFormat, 3),
        (LettreMotivation, 15),
        (OptimisationCv, 12),
        (AnalyseOffre, 10),
        (AnalyseCvComplete, 25),
        (MirrorMatch, 30),
        (SalaryAnalysis, 20),
        (TransitionCarriere, 35),
        (StrategieCandidature, 35),
        (AuditCompletProfil, 45),
        (PlanReconversion, 50),
        (SimulationEntretien, 40),
        (Conversation, 0),
    ])
});

/// Resuelve el costo entero de una acción reconocida. `None` para acciones
/// desconocidas — el llamador debe tratar esto como `ErrorKind::UnknownAction`.
pub fn action_cost(action: Action) -> i64 {
    *ACTION_COSTS
        .get(&action)
        .expect("every Action variant must have a cost entry")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_action_round_trips_through_its_name() {
        for action in Action::PRECEDENCE_ORDER {
            let parsed = Action::from_str(action.as_str());
            assert_eq!(parsed, Some(*action));
        }
    }

    #[test]
    fn unknown_action_name_resolves_to_none() {
        assert_eq!(Action::from_str("not_a_real_action"), None);
    }

    #[test]
    fn conversation_is_free() {
        assert_eq!(action_cost(Action::Conversation), 0);
    }
}
