//! Narrative composition.

use crate::{age_years, PatientRecord, RiskFlag, Summary, SummaryConfig};

const PREVENTIVE_MARKER: &str = "🔍";
const TREATMENT_MARKER: &str = "📋";

const NAME_NOT_PROVIDED: &str = "Nome não informado";
const SCREENING_RECOMMENDATION: &str =
    "Recomendação: acompanhamento médico regular e exames preventivos conforme faixa etária.";
const ONCOLOGY_TREATMENT_NOTE: &str =
    "Paciente com histórico de tratamento oncológico. Manter acompanhamento periódico.";
const MONITORING_RECOMMENDATION: &str =
    "Monitoramento: dados indicam possível necessidade de diagnóstico precoce e acompanhamento preventivo.";

/// Builds the summary for `record` from the flags already evaluated for it.
///
/// The output depends only on the inputs and `config.reference_date()`, so
/// pinning `config.as_of` makes the result reproducible.
pub fn compose(record: &PatientRecord, flags: Vec<RiskFlag>, config: &SummaryConfig) -> Summary {
    let mut lines = Vec::new();

    let name = record.full_name.trim();
    lines.push(format!(
        "Paciente: {}",
        if name.is_empty() {
            NAME_NOT_PROVIDED
        } else {
            name
        }
    ));

    if let Some(birth_date) = record.birth_date {
        let age = age_years(birth_date, config.reference_date());
        if age >= 0 {
            lines.push(format!("Idade: {age} anos"));
        } else {
            tracing::warn!(
                account_id = %record.account_id,
                %birth_date,
                "birth date is after the reference date, omitting age"
            );
        }
    }

    let family_history = record.family_cancer_history.present;
    if family_history {
        lines.push(format!("{PREVENTIVE_MARKER} {SCREENING_RECOMMENDATION}"));
    }

    if record.prior_surgeries {
        lines.push("Possui histórico de cirurgias".to_string());
    }

    if record.prior_hospitalizations {
        lines.push("Possui histórico de internações".to_string());
    }

    if !record.birth_complications.is_none() {
        lines.push(format!(
            "Problemas no nascimento: {}",
            record.birth_complications.describe()
        ));
    }

    if !record.ongoing_treatments.is_none() {
        lines.push(format!(
            "Em tratamento: {}",
            record.ongoing_treatments.describe()
        ));
        if record
            .ongoing_treatments
            .mentions_any(&config.oncology_treatment_keywords)
        {
            lines.push(format!("{TREATMENT_MARKER} {ONCOLOGY_TREATMENT_NOTE}"));
        }
    }

    let history = record.health_history.trim();
    if !crate::is_none_sentinel(history) {
        lines.push(format!("Histórico de saúde: {history}"));
    }

    if family_history || !record.chronic_conditions.is_none() {
        lines.push(format!("{PREVENTIVE_MARKER} {MONITORING_RECOMMENDATION}"));
    }

    Summary {
        flags,
        narrative_lines: lines,
        contacts: record.emergency_contacts.clone(),
    }
}
