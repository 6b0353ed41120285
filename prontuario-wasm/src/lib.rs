//! WASM <-> JavaScript bridge for the prontuário summary.

use chrono::NaiveDate;
use prontuario_core::{
    classify_line, EmergencyContact, RiskFlag, Summary, SummaryConfig, SummaryError,
};
use serde::{Deserialize, Serialize};
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

#[derive(Deserialize)]
struct JsSummaryConfig {
    #[serde(default)]
    as_of: Option<String>,
    #[serde(default)]
    oncology_risk_keywords: Option<Vec<String>>,
    #[serde(default)]
    oncology_treatment_keywords: Option<Vec<String>>,
}

impl TryFrom<JsSummaryConfig> for SummaryConfig {
    type Error = SummaryError;

    fn try_from(cfg: JsSummaryConfig) -> Result<Self, Self::Error> {
        let mut base = SummaryConfig::default();
        if let Some(as_of) = cfg.as_of {
            let date = NaiveDate::parse_from_str(&as_of, "%Y-%m-%d")
                .map_err(|err| SummaryError::Config(format!("as_of {as_of:?}: {err}")))?;
            base.as_of = Some(date);
        }
        if let Some(keywords) = cfg.oncology_risk_keywords {
            base.oncology_risk_keywords = keywords;
        }
        if let Some(keywords) = cfg.oncology_treatment_keywords {
            base.oncology_treatment_keywords = keywords;
        }
        Ok(base)
    }
}

/// Summary as handed to JavaScript: a plain object with the stored text alongside.
#[derive(Debug, Serialize)]
struct JsSummary {
    flags: Vec<RiskFlag>,
    narrative_lines: Vec<String>,
    contacts: Vec<EmergencyContact>,
    text: String,
}

impl From<Summary> for JsSummary {
    fn from(summary: Summary) -> Self {
        let text = summary.text();
        Self {
            flags: summary.flags,
            narrative_lines: summary.narrative_lines,
            contacts: summary.contacts,
            text,
        }
    }
}

/// Summarizes a patient record, returning the structured summary and its text.
#[wasm_bindgen]
pub fn summarize_record(input: JsValue, config: Option<JsValue>) -> Result<JsValue, JsValue> {
    let payload = JsSummary::from(run_pipeline(input, config)?);

    to_value(&payload).map_err(|err| JsValue::from_str(&format!("Falha ao serializar o resumo: {err}")))
}

/// Summarizes a patient record into the text stored as `ResumoGeralSaude`.
#[wasm_bindgen]
pub fn render_summary_text(input: JsValue, config: Option<JsValue>) -> Result<String, JsValue> {
    run_pipeline(input, config).map(|summary| summary.text())
}

/// Style name of one line of a stored summary.
#[wasm_bindgen]
pub fn classify_summary_line(line: &str) -> String {
    classify_line(line).as_str().to_string()
}

fn run_pipeline(input: JsValue, config: Option<JsValue>) -> Result<Summary, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let raw = from_value::<serde_json::Value>(input)
        .map_err(|err| JsValue::from_str(&format!("Não foi possível ler o JSON do paciente: {err}")))?;

    let cfg = match config {
        Some(js_cfg) if !js_cfg.is_undefined() && !js_cfg.is_null() => {
            let cfg: JsSummaryConfig = from_value(js_cfg).map_err(|err| {
                JsValue::from_str(&format!("Não foi possível ler a configuração: {err}"))
            })?;
            SummaryConfig::try_from(cfg).map_err(|err| JsValue::from_str(&format_summary_error(err)))?
        }
        _ => SummaryConfig::default(),
    };

    summarize_raw(&raw, &cfg).map_err(|err| JsValue::from_str(&format_summary_error(err)))
}

fn summarize_raw(raw: &serde_json::Value, cfg: &SummaryConfig) -> Result<Summary, SummaryError> {
    prontuario_intake::summarize_record_value(raw, cfg)
}

fn format_summary_error(err: SummaryError) -> String {
    format!("Erro no prontuário: {err}")
}
