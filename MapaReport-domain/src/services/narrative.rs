//! Optional AI narrative for a study, with the deterministic interpretation as fallback

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use crate::entities::{Patient, Sex, Statement, StudyAnalysis, StudyMeasurement};
use super::analysis::analyze;
use super::interpreter::interpret_analysis;

pub const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "anthropic/claude-sonnet-4";
const DEFAULT_TIMEOUT_SECONDS: u64 = 60;
const TEMPERATURE: f32 = 0.3;
const MAX_TOKENS: u32 = 2000;

const SYSTEM_PROMPT: &str = "Eres un cardiólogo especialista en hipertensión arterial y monitorización \
ambulatoria de presión arterial (MAPA). Proporciona análisis médicos precisos y profesionales basados \
en las guías internacionales más actuales.";

/// Narrative service errors. All of them are recovered by falling back to the deterministic interpretation.
#[derive(Debug, Error)]
pub enum NarrativeError {
    /// No API key configured
    #[error("Narrative service is not configured")]
    NotConfigured,

    #[error("Narrative request timed out")]
    Timeout,

    #[error("Narrative request failed: {0}")]
    Transport(String),

    /// Non-2xx response
    #[error("Narrative service returned status {0}")]
    Status(u16),

    #[error("Malformed narrative response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for NarrativeError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            NarrativeError::Timeout
        } else if error.is_decode() {
            NarrativeError::MalformedResponse(error.to_string())
        } else {
            NarrativeError::Transport(error.to_string())
        }
    }
}

/// Narrative client configuration
#[derive(Debug, Clone)]
pub struct NarrativeConfig {
    pub api_key: Option<String>,
    pub api_url: String,
    pub model: String,
    pub timeout_seconds: u64,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

impl NarrativeConfig {
    /// Read OPENROUTER_API_KEY, NARRATIVE_API_URL, NARRATIVE_MODEL and NARRATIVE_TIMEOUT_SECONDS
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let api_key = env::var("OPENROUTER_API_KEY").ok().filter(|k| !k.trim().is_empty());
        if api_key.is_none() {
            info!("OPENROUTER_API_KEY not set, narrative analysis will use the deterministic interpretation");
        }

        Self {
            api_key,
            api_url: env::var("NARRATIVE_API_URL").unwrap_or(defaults.api_url),
            model: env::var("NARRATIVE_MODEL").unwrap_or(defaults.model),
            timeout_seconds: env::var("NARRATIVE_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(defaults.timeout_seconds),
        }
    }
}

/// Remote text generation
#[async_trait]
pub trait NarrativeServiceTrait {
    async fn generate_narrative(&self, prompt: &str) -> Result<String, NarrativeError>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Chat-completion client for OpenRouter-compatible endpoints
#[derive(Debug, Clone)]
pub struct OpenRouterNarrativeClient {
    config: NarrativeConfig,
    client: Client,
}

impl OpenRouterNarrativeClient {
    pub fn new(config: NarrativeConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to build narrative HTTP client with timeout ({}), using defaults", e);
                Client::new()
            });

        Self { config, client }
    }

    pub fn from_env() -> Self {
        Self::new(NarrativeConfig::from_env())
    }
}

#[async_trait]
impl NarrativeServiceTrait for OpenRouterNarrativeClient {
    async fn generate_narrative(&self, prompt: &str) -> Result<String, NarrativeError> {
        let api_key = self.config.api_key.as_deref().ok_or(NarrativeError::NotConfigured)?;

        let body = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage { role: "system", content: SYSTEM_PROMPT },
                ChatMessage { role: "user", content: prompt },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        debug!("Requesting narrative from {} with model {}", self.config.api_url, self.config.model);

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(NarrativeError::Status(response.status().as_u16()));
        }

        let completion: ChatCompletionResponse = response.json().await?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| NarrativeError::MalformedResponse("response has no message content".to_string()))
    }
}

/// Result of asking for a study analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    /// Text produced by the narrative service
    Narrative { text: String },
    /// Deterministic interpretation used because the narrative was unavailable
    Deterministic {
        analysis: StudyAnalysis,
        statements: Vec<Statement>,
        reason: String,
    },
}

/// Pick the narrative when it succeeded, otherwise interpret the study
pub fn resolve_analysis(narrative: Result<String, NarrativeError>, study: &StudyMeasurement) -> AnalysisOutcome {
    match narrative {
        Ok(text) => AnalysisOutcome::Narrative { text },
        Err(e) => {
            warn!("Narrative analysis unavailable, using deterministic interpretation: {}", e);
            let analysis = analyze(study);
            let statements = interpret_analysis(&analysis);
            AnalysisOutcome::Deterministic {
                analysis,
                statements,
                reason: e.to_string(),
            }
        }
    }
}

fn sex_label(sex: Sex) -> &'static str {
    match sex {
        Sex::Male => "Masculino",
        Sex::Female => "Femenino",
        Sex::Other => "Otro",
    }
}

fn number(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "no registrado".to_string())
}

/// Prompt describing the patient and study for the narrative service
pub fn build_narrative_prompt(patient: &Patient, study: &StudyMeasurement) -> String {
    format!(
        "Analiza los siguientes datos de monitorización ambulatoria de presión arterial (MAPA) de 24 horas:

DATOS DEL PACIENTE:
- Nombre: {name}
- Edad: {age} años
- Sexo: {sex}
- Enfermedades: {diseases}
- Medicamentos: {medications}

DATOS DEL ESTUDIO MAPA:
- Promedio 24h: {s24}/{d24} mmHg
- Promedio diurno: {sday}/{dday} mmHg
- Promedio nocturno: {snight}/{dnight} mmHg
- Dipping sistólico: {dip_s}%
- Dipping diastólico: {dip_d}%
- Carga hipertensiva sistólica: {load_s}%
- Carga hipertensiva diastólica: {load_d}%
- Presión de pulso: {pp} mmHg
- Frecuencia cardíaca promedio: {hr} lpm

CRITERIOS DIAGNÓSTICOS:
- Normal 24h: <130/80 mmHg
- Normal diurno: <135/85 mmHg
- Normal nocturno: <120/70 mmHg
- Dipping normal: 10-20%
- Presión de pulso normal: <50 mmHg

Proporciona un análisis médico detallado que incluya:
1. Clasificación diagnóstica según criterios internacionales
2. Evaluación del patrón circadiano
3. Análisis de riesgo cardiovascular
4. Recomendaciones terapéuticas
5. Seguimiento sugerido

Responde en español con terminología médica apropiada para un informe profesional.",
        name = patient.full_name,
        age = patient.age,
        sex = sex_label(patient.sex),
        diseases = patient.diseases.as_deref().unwrap_or("No reportadas"),
        medications = patient.medications.as_deref().unwrap_or("No reportados"),
        s24 = study.avg_24h_systolic,
        d24 = study.avg_24h_diastolic,
        sday = study.avg_day_systolic,
        dday = study.avg_day_diastolic,
        snight = study.avg_night_systolic,
        dnight = study.avg_night_diastolic,
        dip_s = number(study.dipping_systolic),
        dip_d = number(study.dipping_diastolic),
        load_s = number(study.load_systolic),
        load_d = number(study.load_diastolic),
        pp = number(study.pulse_pressure),
        hr = number(study.avg_heart_rate),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Finding, MeasurementPeriod, StudyMeasurementBuilder};
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn patient() -> Patient {
        Patient {
            id: Uuid::new_v4(),
            full_name: "Lucía Herrera".to_string(),
            age: 47,
            identity_number: "7.654.321-6".to_string(),
            sex: Sex::Female,
            phone: None,
            email: None,
            diseases: None,
            medications: Some("Amlodipino 5 mg".to_string()),
            registered_at: Utc::now(),
        }
    }

    fn study() -> StudyMeasurement {
        StudyMeasurementBuilder::new()
            .study_date(NaiveDate::from_ymd_opt(2024, 8, 1).unwrap())
            .averages(MeasurementPeriod::TwentyFourHour, 120.0, 75.0)
            .averages(MeasurementPeriod::Day, 125.0, 80.0)
            .averages(MeasurementPeriod::Night, 105.0, 60.0)
            .dipping(15.0, 12.5)
            .pulse_pressure(45.0)
            .build()
            .unwrap()
    }

    #[test]
    fn test_prompt_contains_patient_and_study_data() {
        let prompt = build_narrative_prompt(&patient(), &study());

        assert!(prompt.contains("- Nombre: Lucía Herrera"));
        assert!(prompt.contains("- Sexo: Femenino"));
        assert!(prompt.contains("- Enfermedades: No reportadas"));
        assert!(prompt.contains("- Medicamentos: Amlodipino 5 mg"));
        assert!(prompt.contains("- Promedio nocturno: 105/60 mmHg"));
        assert!(prompt.contains("- Dipping diastólico: 12.5%"));
        assert!(prompt.contains("- Carga hipertensiva sistólica: no registrado%"));
        assert!(prompt.contains("5. Seguimiento sugerido"));
    }

    #[test]
    fn test_unconfigured_client_reports_not_configured() {
        let client = OpenRouterNarrativeClient::new(NarrativeConfig::default());
        let result = tokio_test::block_on(client.generate_narrative("prompt"));
        assert!(matches!(result, Err(NarrativeError::NotConfigured)));
    }

    #[test]
    fn test_resolve_prefers_narrative() {
        let outcome = resolve_analysis(Ok("Informe narrativo".to_string()), &study());
        assert_eq!(outcome, AnalysisOutcome::Narrative { text: "Informe narrativo".to_string() });
    }

    #[test]
    fn test_resolve_falls_back_on_any_error() {
        for error in [
            NarrativeError::NotConfigured,
            NarrativeError::Timeout,
            NarrativeError::Status(502),
            NarrativeError::MalformedResponse("empty".to_string()),
        ] {
            match resolve_analysis(Err(error), &study()) {
                AnalysisOutcome::Deterministic { statements, reason, .. } => {
                    assert_eq!(statements[0].finding, Finding::NormalBloodPressure);
                    assert!(!reason.is_empty());
                }
                other => panic!("expected deterministic outcome, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_outcome_serialization_is_tagged() {
        let json = serde_json::to_value(AnalysisOutcome::Narrative { text: "x".to_string() }).unwrap();
        assert_eq!(json, serde_json::json!({ "source": "narrative", "text": "x" }));
    }
}
