//! Risk flag evaluation.
//!
//! Rules run in a fixed order and flags keep insertion order; stored
//! summaries depend on it.

use crate::{FamilyCancerHistory, FlagKind, PatientRecord, RiskFlag, Severity, SummaryConfig};

const CRITICAL_MARKER: &str = "🚨";
const IMPORTANT_MARKER: &str = "⚠️";
const CONTACT_MARKER: &str = "📞";

const UNSPECIFIED_CANCER_TYPE: &str = "Tipo não especificado";
const ONCOLOGY_RISK_TEXT: &str =
    "Condições que podem aumentar risco oncológico. Avaliação preventiva recomendada.";

/// Evaluates a record with the default configuration.
pub fn evaluate(record: &PatientRecord) -> Vec<RiskFlag> {
    evaluate_with(record, &SummaryConfig::default())
}

/// Evaluates a record and returns its flags in rule order.
pub fn evaluate_with(record: &PatientRecord, config: &SummaryConfig) -> Vec<RiskFlag> {
    let mut flags = Vec::new();

    if let Some(blood_type) = record.blood_type {
        flags.push(flag(
            FlagKind::BloodType,
            Severity::Critical,
            format!("{IMPORTANT_MARKER} TIPO SANGUÍNEO: {}", blood_type.as_str()),
        ));
    }

    if !record.allergies.is_none() {
        flags.push(flag(
            FlagKind::Allergies,
            Severity::Critical,
            format!("{CRITICAL_MARKER} ALERGIAS: {}", record.allergies.describe()),
        ));
    }

    if !record.chronic_conditions.is_none() {
        flags.push(flag(
            FlagKind::ChronicConditions,
            Severity::Important,
            format!(
                "{IMPORTANT_MARKER} DOENÇAS CRÔNICAS: {}",
                record.chronic_conditions.describe()
            ),
        ));
    }

    if !record.medications_in_use.is_none() {
        flags.push(flag(
            FlagKind::Medications,
            Severity::Important,
            format!(
                "{IMPORTANT_MARKER} MEDICAMENTOS: {}",
                record.medications_in_use.describe()
            ),
        ));
    }

    let family = &record.family_cancer_history;
    if family.present {
        flags.push(flag(
            FlagKind::FamilyCancerHistory,
            Severity::Important,
            format!(
                "{IMPORTANT_MARKER} HISTÓRICO FAMILIAR DE CÂNCER: {}",
                cancer_type_label(family)
            ),
        ));
    }

    if record
        .chronic_conditions
        .mentions_any(&config.oncology_risk_keywords)
    {
        flags.push(flag(
            FlagKind::OncologyRisk,
            Severity::Important,
            format!("{IMPORTANT_MARKER} {ONCOLOGY_RISK_TEXT}"),
        ));
    }

    if !record.emergency_contacts.is_empty() {
        let listing = record
            .emergency_contacts
            .iter()
            .map(|contact| format!("{}: {}", contact.name, contact.phone))
            .collect::<Vec<_>>()
            .join("\n");
        flags.push(flag(
            FlagKind::EmergencyContacts,
            Severity::Critical,
            format!("{CONTACT_MARKER} CONTATOS DE EMERGÊNCIA:\n{listing}"),
        ));
    }

    tracing::debug!(
        account_id = %record.account_id,
        flags = flags.len(),
        "risk flags evaluated"
    );

    flags
}

fn flag(kind: FlagKind, severity: Severity, text: String) -> RiskFlag {
    RiskFlag {
        kind,
        severity,
        text,
    }
}

fn cancer_type_label(family: &FamilyCancerHistory) -> String {
    let cancer_type = family
        .cancer_type
        .as_deref()
        .map(str::trim)
        .filter(|value| !crate::is_none_sentinel(value));

    match cancer_type {
        Some(value) if crate::is_other_sentinel(value) => family
            .other_detail
            .as_deref()
            .map(str::trim)
            .filter(|detail| !detail.is_empty())
            .unwrap_or(value)
            .to_string(),
        Some(value) => value.to_string(),
        None => UNSPECIFIED_CANCER_TYPE.to_string(),
    }
}
