//! Raw patient JSON to `Summary` pipeline.
//!
//! Accepts the request body shapes seen in the wild: flat client camelCase
//! keys, the nested `personalData`/`medicalHistory`/`familyHistory` groups and
//! their Portuguese legacy names (`dadosPessoais`, `historicoMedico`,
//! `historicoFamiliar`).

use chrono::{DateTime, NaiveDate};
use prontuario_core::{
    compose, evaluate_with, is_none_sentinel, BloodType, CategoryField, EmergencyContact,
    FamilyCancerHistory, IntakeWarning, PatientRecord, Summary, SummaryConfig, SummaryError,
};
use serde_json::Value;

const PERSONAL_GROUPS: [&str; 2] = ["personalData", "dadosPessoais"];
const MEDICAL_GROUPS: [&str; 2] = ["medicalHistory", "historicoMedico"];
const FAMILY_GROUPS: [&str; 2] = ["familyHistory", "historicoFamiliar"];

const ACCOUNT_KEYS: [&str; 5] = [
    "accountId",
    "userId",
    "usuario_id",
    "usuarioId",
    "ID_UsuarioSistema",
];

/// Summarize a patient from a JSON string.
pub fn summarize_record_str(
    record_json: &str,
    config: &SummaryConfig,
) -> Result<Summary, SummaryError> {
    let value: Value =
        serde_json::from_str(record_json).map_err(|err| SummaryError::Parse(err.to_string()))?;
    summarize_record_value(&value, config)
}

/// Summarize a patient from a `serde_json::Value`.
pub fn summarize_record_value(raw: &Value, config: &SummaryConfig) -> Result<Summary, SummaryError> {
    let record = normalize(raw)?;
    let flags = evaluate_with(&record, config);
    let summary = compose(&record, flags, config);

    tracing::debug!(
        account_id = %record.account_id,
        flags = summary.flags.len(),
        lines = summary.narrative_lines.len(),
        "summary composed"
    );

    Ok(summary)
}

/// Maps a raw request body onto the canonical record, logging absorbed anomalies.
pub fn normalize(raw: &Value) -> Result<PatientRecord, SummaryError> {
    let (record, warnings) = normalize_with_warnings(raw)?;
    for warning in &warnings {
        match warning {
            IntakeWarning::MalformedDate { field, value } => {
                tracing::warn!(account_id = %record.account_id, %field, %value, "malformed date ignored");
            }
            IntakeWarning::UnknownBloodType { value } => {
                tracing::warn!(account_id = %record.account_id, %value, "unknown blood type ignored");
            }
        }
    }
    Ok(record)
}

/// Same as [`normalize`], returning the warnings instead of logging them.
pub fn normalize_with_warnings(
    raw: &Value,
) -> Result<(PatientRecord, Vec<IntakeWarning>), SummaryError> {
    let account_id = ACCOUNT_KEYS
        .iter()
        .filter_map(|key| raw.get(*key))
        .find_map(identifier_text)
        .ok_or(SummaryError::MissingAccountId)?;

    let mut warnings = Vec::new();
    let mut record = PatientRecord::new(account_id);

    let personal = RawGroup::new(raw, &PERSONAL_GROUPS);
    let medical = RawGroup::new(raw, &MEDICAL_GROUPS);
    let family = RawGroup::new(raw, &FAMILY_GROUPS);

    record.full_name = personal
        .text(&["fullName", "nomeCompleto", "NomeCompleto"])
        .unwrap_or_default();

    if let Some((key, value)) =
        personal.keyed_text(&["birthDate", "dataNascimento", "DataNascimento"])
    {
        match parse_date(&value) {
            Some(date) => record.birth_date = Some(date),
            None => warnings.push(IntakeWarning::MalformedDate {
                field: key.to_string(),
                value,
            }),
        }
    }

    // The legacy form stored the blood type under both groups.
    let blood_type = personal
        .text(&["bloodType", "tipoSanguineo", "TipoSanguineo"])
        .or_else(|| medical.text(&["bloodType", "tipoSanguineo", "TipoSanguineo"]));
    if let Some(value) = blood_type {
        match BloodType::parse(&value) {
            Some(parsed) => record.blood_type = Some(parsed),
            None => warnings.push(IntakeWarning::UnknownBloodType { value }),
        }
    }

    record.allergies = medical.category(&["allergies", "alergias", "Alergias"], "alergiasOutro");
    record.chronic_conditions = medical.category(
        &["chronicConditions", "doencasCronicas", "DoencasCronicas"],
        "doencasCronicasOutro",
    );
    record.medications_in_use = medical.category(
        &[
            "medicationsInUse",
            "medicamentos",
            "medicamentosEmUso",
            "MedicamentosEmUso",
        ],
        "medicamentosOutro",
    );
    record.birth_complications = medical.category(
        &[
            "birthComplications",
            "problemasNascimento",
            "ProblemasNascimento",
        ],
        "problemasNascimentoOutro",
    );
    record.ongoing_treatments = medical.category(
        &[
            "ongoingTreatments",
            "tratamentos",
            "tratamentosAtuais",
            "TratamentosAtuais",
        ],
        "tratamentosOutro",
    );

    record.prior_surgeries = medical.flag(&[
        "priorSurgeries",
        "cirurgias",
        "cirurgiasPrevias",
        "CirurgiasPrevias",
    ]);
    record.prior_hospitalizations = medical.flag(&[
        "priorHospitalizations",
        "internacoes",
        "internacoesPrevias",
        "InternacoesPrevias",
    ]);
    record.health_history = medical
        .text(&["healthHistory", "historicoSaude", "HistoricoSaude"])
        .unwrap_or_default();

    record.family_cancer_history = family_cancer_history(&family);
    record.emergency_contacts = emergency_contacts(raw);

    Ok((record, warnings))
}

/// Field lookup over the top level of the body and its named groups.
struct RawGroup<'a> {
    scopes: Vec<&'a Value>,
}

impl<'a> RawGroup<'a> {
    fn new(raw: &'a Value, group_names: &[&str]) -> Self {
        let mut scopes = vec![raw];
        scopes.extend(
            group_names
                .iter()
                .filter_map(|name| raw.get(*name))
                .filter(|value| value.is_object()),
        );
        Self { scopes }
    }

    /// First non-null value under any of `keys`, with the key that held it.
    fn entry<'k>(&self, keys: &[&'k str]) -> Option<(&'k str, &'a Value)> {
        self.scopes
            .iter()
            .copied()
            .flat_map(|scope| {
                keys.iter()
                    .filter_map(move |key| scope.get(*key).map(|value| (*key, value)))
            })
            .find(|(_, value)| !value.is_null())
    }

    fn value(&self, keys: &[&str]) -> Option<&'a Value> {
        self.entry(keys).map(|(_, value)| value)
    }

    fn text(&self, keys: &[&str]) -> Option<String> {
        self.value(keys).and_then(scalar_text)
    }

    fn keyed_text<'k>(&self, keys: &[&'k str]) -> Option<(&'k str, String)> {
        self.entry(keys)
            .and_then(|(key, value)| scalar_text(value).map(|text| (key, text)))
    }

    fn flag(&self, keys: &[&str]) -> bool {
        self.value(keys).map(is_affirmative).unwrap_or(false)
    }

    /// Reads a category either as `{ category, otherDetail }` or as a plain
    /// string with its detail in a sibling `<name>Outro` field.
    fn category(&self, keys: &[&str], legacy_detail_key: &str) -> CategoryField {
        let Some(value) = self.value(keys) else {
            return CategoryField::default();
        };

        if value.is_object() {
            let category = ["category", "categoria"]
                .iter()
                .filter_map(|key| value.get(*key))
                .find_map(scalar_text)
                .unwrap_or_default();
            let detail = ["otherDetail", "outro", "detail"]
                .iter()
                .filter_map(|key| value.get(*key))
                .find_map(scalar_text);
            return CategoryField::new(category, detail);
        }

        let category = scalar_text(value).unwrap_or_default();
        CategoryField::new(category, self.text(&[legacy_detail_key]))
    }
}

fn family_cancer_history(family: &RawGroup<'_>) -> FamilyCancerHistory {
    if let Some(nested) = family
        .value(&["familyCancerHistory"])
        .filter(|value| value.is_object())
    {
        return FamilyCancerHistory {
            present: nested.get("present").map(is_affirmative).unwrap_or(false),
            cancer_type: nested
                .get("cancerType")
                .and_then(scalar_text)
                .filter(|value| !is_none_sentinel(value)),
            other_detail: nested.get("otherDetail").and_then(scalar_text),
        };
    }

    FamilyCancerHistory {
        present: family.flag(&[
            "familyCancerHistory",
            "possuiCancer",
            "historicoFamiliarCancer",
            "HistoricoFamiliarCancer",
        ]),
        cancer_type: family
            .text(&[
                "cancerType",
                "tipoCancer",
                "historicoFamiliarTipoCancer",
                "HistoricoFamiliarTipoCancer",
            ])
            .filter(|value| !is_none_sentinel(value)),
        other_detail: family.text(&["cancerTypeOther", "tipoCancerOutro"]),
    }
}

fn emergency_contacts(raw: &Value) -> Vec<EmergencyContact> {
    let Some(entries) = ["emergencyContacts", "contatosEmergencia", "ContatosEmergencia"]
        .iter()
        .filter_map(|key| raw.get(*key))
        .find_map(Value::as_array)
    else {
        return Vec::new();
    };

    entries
        .iter()
        .map(|entry| EmergencyContact {
            name: first_text(entry, &["name", "nome", "Nome"]).unwrap_or_default(),
            phone: first_text(entry, &["phone", "telefone", "Telefone"]).unwrap_or_default(),
        })
        .filter(|contact| !(contact.name.is_empty() && contact.phone.is_empty()))
        .collect()
}

fn first_text(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| value.get(*key))
        .find_map(scalar_text)
}

fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(text) => text.trim().to_string(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        _ => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn identifier_text(value: &Value) -> Option<String> {
    match value {
        Value::String(_) | Value::Number(_) => scalar_text(value),
        _ => None,
    }
}

fn is_affirmative(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::String(text) => matches!(
            text.trim().to_lowercase().as_str(),
            "sim" | "yes" | "true" | "s"
        ),
        _ => false,
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%d/%m/%Y"))
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .map(|dt| dt.date_naive())
                .ok()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use prontuario_core::CATEGORY_NONE;
    use serde_json::json;

    #[test]
    fn missing_account_id_is_rejected() {
        assert!(matches!(
            normalize(&json!({})),
            Err(SummaryError::MissingAccountId)
        ));
        assert!(matches!(
            normalize(&json!({ "accountId": "   " })),
            Err(SummaryError::MissingAccountId)
        ));
        assert!(matches!(
            normalize(&json!(["accountId"])),
            Err(SummaryError::MissingAccountId)
        ));
    }

    #[test]
    fn bare_account_id_yields_defaults() {
        let record = normalize(&json!({ "accountId": "u1" })).expect("valid record");
        assert_eq!(record.account_id, "u1");
        assert_eq!(record.full_name, "");
        assert_eq!(record.birth_date, None);
        assert_eq!(record.blood_type, None);
        for field in [
            &record.allergies,
            &record.chronic_conditions,
            &record.medications_in_use,
            &record.birth_complications,
            &record.ongoing_treatments,
        ] {
            assert_eq!(field.category, CATEGORY_NONE);
            assert_eq!(field.other_detail, None);
        }
        assert!(!record.family_cancer_history.present);
        assert!(record.emergency_contacts.is_empty());
    }

    #[test]
    fn legacy_identifier_keys_are_accepted() {
        let record = normalize(&json!({ "usuario_id": "abc" })).expect("valid record");
        assert_eq!(record.account_id, "abc");
        let record = normalize(&json!({ "userId": 42 })).expect("valid record");
        assert_eq!(record.account_id, "42");
    }

    #[test]
    fn flat_client_shape() {
        let record = normalize(&json!({
            "accountId": "u1",
            "fullName": "Maria Silva",
            "birthDate": "1990-05-01",
            "bloodType": "o+",
            "allergies": { "category": "medications" },
            "familyCancerHistory": { "present": true, "cancerType": "mama" }
        }))
        .expect("valid record");

        assert_eq!(record.full_name, "Maria Silva");
        assert_eq!(record.birth_date, NaiveDate::from_ymd_opt(1990, 5, 1));
        assert_eq!(record.blood_type, Some(BloodType::OPositive));
        assert_eq!(record.allergies.category, "medications");
        assert!(record.family_cancer_history.present);
        assert_eq!(
            record.family_cancer_history.cancer_type.as_deref(),
            Some("mama")
        );
    }

    #[test]
    fn nested_legacy_shape() {
        let record = normalize(&json!({
            "usuario_id": "u2",
            "dadosPessoais": {
                "nomeCompleto": "João Souza",
                "dataNascimento": "15/03/2000",
                "tipoSanguineo": "ab-"
            },
            "historicoMedico": {
                "alergias": "outro",
                "alergiasOutro": "látex",
                "cirurgias": "sim",
                "internacoes": "nenhum",
                "doencasCronicas": "nenhum"
            },
            "historicoFamiliar": { "possuiCancer": "sim", "tipoCancer": "outro", "tipoCancerOutro": "tireoide" },
            "contatosEmergencia": [
                { "id": 1, "nome": "", "telefone": "" },
                { "id": 2, "nome": "Ana", "telefone": "11 99999-0000" }
            ]
        }))
        .expect("valid record");

        assert_eq!(record.full_name, "João Souza");
        assert_eq!(record.birth_date, NaiveDate::from_ymd_opt(2000, 3, 15));
        assert_eq!(record.blood_type, Some(BloodType::AbNegative));
        assert_eq!(record.allergies.describe(), "outro - látex");
        assert!(record.prior_surgeries);
        assert!(!record.prior_hospitalizations);
        assert!(record.chronic_conditions.is_none());
        assert_eq!(
            record.family_cancer_history.other_detail.as_deref(),
            Some("tireoide")
        );
        assert_eq!(
            record.emergency_contacts,
            vec![EmergencyContact {
                name: "Ana".into(),
                phone: "11 99999-0000".into()
            }]
        );
    }

    #[test]
    fn malformed_date_and_blood_type_become_warnings() {
        let (record, warnings) = normalize_with_warnings(&json!({
            "accountId": "u1",
            "birthDate": "ontem",
            "bloodType": "Z+"
        }))
        .expect("valid record");

        assert_eq!(record.birth_date, None);
        assert_eq!(record.blood_type, None);
        assert_eq!(
            warnings,
            vec![
                IntakeWarning::MalformedDate {
                    field: "birthDate".into(),
                    value: "ontem".into()
                },
                IntakeWarning::UnknownBloodType {
                    value: "Z+".into()
                },
            ]
        );
    }

    #[test]
    fn malformed_date_warning_names_the_key_that_was_read() {
        let (record, warnings) = normalize_with_warnings(&json!({
            "usuario_id": "u",
            "dadosPessoais": { "dataNascimento": "ontem" }
        }))
        .expect("valid record");

        assert_eq!(record.birth_date, None);
        assert_eq!(
            warnings,
            vec![IntakeWarning::MalformedDate {
                field: "dataNascimento".into(),
                value: "ontem".into()
            }]
        );
    }

    #[test]
    fn rfc3339_birth_date_uses_date_part() {
        let record = normalize(&json!({
            "accountId": "u1",
            "birthDate": "1985-07-20T00:00:00Z"
        }))
        .expect("valid record");
        assert_eq!(record.birth_date, NaiveDate::from_ymd_opt(1985, 7, 20));
    }

    #[test]
    fn unparsable_json_string_is_a_parse_error() {
        let result = summarize_record_str("{ not json", &SummaryConfig::default());
        assert!(matches!(result, Err(SummaryError::Parse(_))));
    }
}
