use std::time::Duration;

use async_trait::async_trait;
use llm::builder::{LLMBackend, LLMBuilder};
use llm::chat::ChatMessage;
use llm::LLMProvider;

use healthguard_core::{ai_configured, AiSettings};

use crate::DiagnoseError;

/// Anything that can turn a prompt into raw model text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, DiagnoseError>;
}

fn map_backend(provider: &str) -> Result<LLMBackend, DiagnoseError> {
    match provider {
        "openai" => Ok(LLMBackend::OpenAI),
        "anthropic" => Ok(LLMBackend::Anthropic),
        "google" => Ok(LLMBackend::Google),
        "ollama" => Ok(LLMBackend::Ollama),
        "groq" => Ok(LLMBackend::Groq),
        "mistral" => Ok(LLMBackend::Mistral),
        "deepseek" => Ok(LLMBackend::DeepSeek),
        other => Err(DiagnoseError::Configuration(format!(
            "Provider AI tidak dikenal: {other}"
        ))),
    }
}

/// Check settings without touching the network.
pub fn validate_settings(settings: &AiSettings) -> Result<LLMBackend, DiagnoseError> {
    let backend = map_backend(&settings.provider)?;
    if !ai_configured(settings) {
        return Err(DiagnoseError::Configuration(format!(
            "API key tidak dikonfigurasi untuk provider '{}'. Pastikan environment variable \
             GEMINI_API_KEY telah diatur atau jalankan `healthguard config set --api-key`.",
            settings.provider
        )));
    }
    Ok(backend)
}

/// Remote text generation through the `llm` crate.
pub struct LlmEngine {
    provider: Box<dyn LLMProvider>,
    timeout: Duration,
    label: String,
}

impl LlmEngine {
    pub fn from_settings(settings: &AiSettings) -> Result<Self, DiagnoseError> {
        let backend = validate_settings(settings)?;

        let mut builder = LLMBuilder::new().backend(backend).model(&settings.model);

        if !settings.api_key.is_empty() {
            builder = builder.api_key(&settings.api_key);
        }

        let provider = builder
            .build()
            .map_err(|e| DiagnoseError::Configuration(format!("Gagal menginisialisasi AI: {e}")))?;

        Ok(Self {
            provider,
            timeout: Duration::from_secs(settings.timeout_secs.max(1)),
            label: format!("{} ({})", settings.provider, settings.model),
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

#[async_trait]
impl TextGenerator for LlmEngine {
    async fn generate(&self, prompt: &str) -> Result<String, DiagnoseError> {
        let messages = vec![ChatMessage::user().content(prompt).build()];

        let response = tokio::time::timeout(self.timeout, self.provider.chat(&messages))
            .await
            .map_err(|_| {
                DiagnoseError::Transport(format!(
                    "tidak ada jawaban dari {} dalam {} detik",
                    self.label,
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| DiagnoseError::Transport(format!("chat: {e}")))?;

        // An empty body is passed on; the parser reports it.
        response.text().ok_or_else(|| {
            DiagnoseError::Transport("layanan AI tidak mengembalikan teks".to_string())
        })
    }
}
