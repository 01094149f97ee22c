pub mod engine;
mod parse;
mod prompt;

pub use engine::{LlmEngine, TextGenerator};
pub use parse::{parse_diagnosis, sanitize_response, ResponseError};
pub use prompt::build_prompt;

use healthguard_core::{AiSettings, DiagnosisRequest, DiagnosisResult};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiagnoseError {
    /// Missing or invalid credentials or provider. Raised before any network call.
    #[error("{0}")]
    Configuration(String),
    #[error("Gagal menghubungi layanan AI: {0}")]
    Transport(String),
    #[error("Gagal mengurai diagnosis: {0}")]
    Parse(String),
    #[error("Gagal mengurai diagnosis: {0}")]
    Schema(String),
}

impl DiagnoseError {
    /// Variant name, safe to log.
    pub fn kind(&self) -> &'static str {
        match self {
            DiagnoseError::Configuration(_) => "configuration",
            DiagnoseError::Transport(_) => "transport",
            DiagnoseError::Parse(_) => "parse",
            DiagnoseError::Schema(_) => "schema",
        }
    }
}

impl From<ResponseError> for DiagnoseError {
    fn from(e: ResponseError) -> Self {
        match e {
            ResponseError::Parse(msg) => DiagnoseError::Parse(msg),
            ResponseError::Schema(msg) => DiagnoseError::Schema(msg),
        }
    }
}

/// Run one submission against the configured provider.
pub async fn diagnose(
    request: &DiagnosisRequest,
    settings: &AiSettings,
) -> Result<DiagnosisResult, DiagnoseError> {
    let engine = LlmEngine::from_settings(settings)?;
    tracing::info!(provider = %settings.provider, model = %settings.model, "requesting diagnosis");
    diagnose_with(&engine, request).await
}

/// Prompt, generate, parse. No retries.
pub async fn diagnose_with<G>(
    generator: &G,
    request: &DiagnosisRequest,
) -> Result<DiagnosisResult, DiagnoseError>
where
    G: TextGenerator + ?Sized,
{
    let prompt = build_prompt(request);
    tracing::debug!(
        prompt_len = prompt.len(),
        symptoms = request.symptoms().len(),
        "built diagnosis prompt"
    );

    let raw = generator.generate(&prompt).await?;
    tracing::debug!(response_len = raw.len(), "received model reply");

    Ok(parse_diagnosis(&raw)?)
}
