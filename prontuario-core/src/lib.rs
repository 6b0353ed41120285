//! Core types and logic for generating the prontuário summary of a patient.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub mod age;
pub mod flags;
pub mod legacy;
pub mod summary;

pub use age::{age_today, age_years};
pub use flags::{evaluate, evaluate_with};
pub use legacy::{classify_line, classify_text, render_legacy_text, LineStyle};
pub use summary::compose;

/// Canonical value for a category field that carries no information.
pub const CATEGORY_NONE: &str = "none";

/// Tuning knobs for flag evaluation and narrative composition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SummaryConfig {
    /// Reference date for the age line. `None` means today (UTC).
    pub as_of: Option<NaiveDate>,
    /// Chronic condition keywords associated with raised oncological risk.
    pub oncology_risk_keywords: Vec<String>,
    /// Treatment keywords that indicate a past oncological treatment.
    pub oncology_treatment_keywords: Vec<String>,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            as_of: None,
            oncology_risk_keywords: vec![
                "hormonal".to_string(),
                "hepática".to_string(),
                "intestinal".to_string(),
            ],
            oncology_treatment_keywords: vec![
                "radioterapia".to_string(),
                "quimioterapia".to_string(),
            ],
        }
    }
}

impl SummaryConfig {
    /// Date used for age computation.
    pub fn reference_date(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Utc::now().date_naive())
    }

    /// Same configuration pinned to a fixed reference date.
    pub fn pinned(mut self, as_of: NaiveDate) -> Self {
        self.as_of = Some(as_of);
        self
    }
}

/// ABO/Rh blood group.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum BloodType {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
}

impl BloodType {
    /// Parses a blood type ignoring case and surrounding whitespace.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "A+" => Some(Self::APositive),
            "A-" => Some(Self::ANegative),
            "B+" => Some(Self::BPositive),
            "B-" => Some(Self::BNegative),
            "AB+" => Some(Self::AbPositive),
            "AB-" => Some(Self::AbNegative),
            "O+" => Some(Self::OPositive),
            "O-" => Some(Self::ONegative),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::APositive => "A+",
            Self::ANegative => "A-",
            Self::BPositive => "B+",
            Self::BNegative => "B-",
            Self::AbPositive => "AB+",
            Self::AbNegative => "AB-",
            Self::OPositive => "O+",
            Self::ONegative => "O-",
        }
    }
}

/// Constrained-vocabulary answer with an optional free-text detail.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryField {
    pub category: String,
    pub other_detail: Option<String>,
}

impl Default for CategoryField {
    fn default() -> Self {
        Self {
            category: CATEGORY_NONE.to_string(),
            other_detail: None,
        }
    }
}

impl CategoryField {
    /// Builds a field, folding blank and legacy sentinels into `"none"`.
    pub fn new(category: impl Into<String>, other_detail: Option<String>) -> Self {
        let category = category.into();
        let category = if is_none_sentinel(&category) {
            CATEGORY_NONE.to_string()
        } else {
            category.trim().to_string()
        };
        let other_detail = other_detail
            .map(|detail| detail.trim().to_string())
            .filter(|detail| !detail.is_empty());
        Self {
            category,
            other_detail,
        }
    }

    pub fn is_none(&self) -> bool {
        is_none_sentinel(&self.category)
    }

    pub fn is_other(&self) -> bool {
        is_other_sentinel(&self.category)
    }

    /// Category label, followed by ` - <detail>` when the answer is "other".
    pub fn describe(&self) -> String {
        match (&self.other_detail, self.is_other()) {
            (Some(detail), true) => format!("{} - {detail}", self.category),
            _ => self.category.clone(),
        }
    }

    /// Lowercased category plus detail, for keyword matching.
    fn search_text(&self) -> String {
        let mut text = self.category.to_lowercase();
        if let Some(detail) = &self.other_detail {
            text.push(' ');
            text.push_str(&detail.to_lowercase());
        }
        text
    }

    /// Whether any keyword occurs in the category or its detail.
    pub fn mentions_any(&self, keywords: &[String]) -> bool {
        if self.is_none() {
            return false;
        }
        let haystack = self.search_text();
        keywords
            .iter()
            .map(|keyword| keyword.trim().to_lowercase())
            .filter(|keyword| !keyword.is_empty())
            .any(|keyword| haystack.contains(&keyword))
    }
}

/// Whether a raw answer means "nothing to report".
pub fn is_none_sentinel(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "" | "none" | "nenhum" | "nenhuma"
    )
}

/// Whether a raw answer is the "other, see detail" option.
pub fn is_other_sentinel(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "other" | "outro" | "outra"
    )
}

/// Family history of cancer.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct FamilyCancerHistory {
    pub present: bool,
    pub cancer_type: Option<String>,
    pub other_detail: Option<String>,
}

/// Person to call in an emergency.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct EmergencyContact {
    pub name: String,
    pub phone: String,
}

/// Canonical in-memory representation of one patient's self-reported data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientRecord {
    pub account_id: String,
    pub full_name: String,
    pub birth_date: Option<NaiveDate>,
    pub blood_type: Option<BloodType>,
    pub allergies: CategoryField,
    pub chronic_conditions: CategoryField,
    pub medications_in_use: CategoryField,
    pub birth_complications: CategoryField,
    pub ongoing_treatments: CategoryField,
    pub family_cancer_history: FamilyCancerHistory,
    pub emergency_contacts: Vec<EmergencyContact>,
    pub prior_surgeries: bool,
    pub prior_hospitalizations: bool,
    pub health_history: String,
}

impl PatientRecord {
    /// Record with every optional field at its default.
    pub fn new(account_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            full_name: String::new(),
            birth_date: None,
            blood_type: None,
            allergies: CategoryField::default(),
            chronic_conditions: CategoryField::default(),
            medications_in_use: CategoryField::default(),
            birth_complications: CategoryField::default(),
            ongoing_treatments: CategoryField::default(),
            family_cancer_history: FamilyCancerHistory::default(),
            emergency_contacts: Vec::new(),
            prior_surgeries: false,
            prior_hospitalizations: false,
            health_history: String::new(),
        }
    }
}

/// Severity class of a flag, as styled by the consuming UI.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    Important,
    Preventive,
}

/// Rule that produced a flag.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FlagKind {
    BloodType,
    Allergies,
    ChronicConditions,
    Medications,
    FamilyCancerHistory,
    OncologyRisk,
    EmergencyContacts,
}

/// Short clinically relevant alert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RiskFlag {
    pub kind: FlagKind,
    pub severity: Severity,
    pub text: String,
}

/// Full result for one patient, regenerated on every create/update.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Summary {
    pub flags: Vec<RiskFlag>,
    pub narrative_lines: Vec<String>,
    #[serde(default)]
    pub contacts: Vec<EmergencyContact>,
}

impl Summary {
    /// Flags that describe a clinical risk, without the contact listing.
    pub fn clinical_flags(&self) -> impl Iterator<Item = &RiskFlag> {
        self.flags
            .iter()
            .filter(|flag| flag.kind != FlagKind::EmergencyContacts)
    }

    /// Legacy text blob stored in the `ResumoGeralSaude` column.
    pub fn text(&self) -> String {
        render_legacy_text(self)
    }
}

/// Non-fatal anomalies absorbed while normalizing input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntakeWarning {
    MalformedDate { field: String, value: String },
    UnknownBloodType { value: String },
}

/// Errors raised by the summary pipeline.
#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    #[error("Identificador da conta ausente")]
    MissingAccountId,
    #[error("Não foi possível ler os dados: {0}")]
    Parse(String),
    #[error("Configuração inválida: {0}")]
    Config(String),
}
