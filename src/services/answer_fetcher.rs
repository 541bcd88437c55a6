use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::question::{QuestionChoice, QuestionType};
use crate::services::extraction::{self, ExtractedAnswerKey};
use crate::services::prompt_builder;
use crate::services::text_gen::{GeminiBackend, OpenRouterBackend, TextGenBackend};
use reqwest::Client;
use std::sync::Arc;

/// Produces the answer key for one question by prompting a text-generation
/// backend and salvaging structured output from its reply.
///
/// The model list is ordered: the first entry is primary, the rest are
/// fallbacks. A fallback is tried only when the failure looks
/// model/endpoint-specific; when every model fails, the error reported is
/// the first one encountered, so the failure reflects the primary attempt.
pub struct CorrectAnswerFetcher {
    backend: Arc<dyn TextGenBackend>,
    models: Vec<String>,
}

impl std::fmt::Debug for CorrectAnswerFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CorrectAnswerFetcher")
            .field("models", &self.models)
            .finish_non_exhaustive()
    }
}

impl CorrectAnswerFetcher {
    pub fn new(backend: Arc<dyn TextGenBackend>, models: Vec<String>) -> Self {
        Self { backend, models }
    }

    /// Picks the configured provider: OpenRouter when its key is present,
    /// otherwise Gemini. No key at all is a configuration error, not
    /// something to retry.
    pub fn from_config(config: &Config, client: Client) -> Result<Self> {
        if let Some(key) = &config.openrouter_api_key {
            Ok(Self::new(
                Arc::new(OpenRouterBackend::new(key.clone(), client)),
                config.openrouter_models.clone(),
            ))
        } else if let Some(key) = &config.gemini_api_key {
            Ok(Self::new(
                Arc::new(GeminiBackend::new(key.clone(), client)),
                config.gemini_models.clone(),
            ))
        } else {
            Err(Error::MissingCredential(
                "OPENROUTER_API_KEY or GEMINI_API_KEY".to_string(),
            ))
        }
    }

    pub async fn fetch(
        &self,
        question_body: &str,
        choices: &[QuestionChoice],
        question_type: QuestionType,
    ) -> Result<ExtractedAnswerKey> {
        let prompt = prompt_builder::build_answer_key_prompt(question_body, choices, question_type);

        let mut first_error: Option<Error> = None;
        for (attempt, model) in self.models.iter().enumerate() {
            match self.try_model(model, &prompt, question_type).await {
                Ok(key) => return Ok(key),
                Err(err) => {
                    // The primary attempt falls through only on failures that
                    // look model/endpoint-specific; any later model that also
                    // fails to produce a usable reply is simply skipped.
                    let retry = if attempt == 0 {
                        err.is_model_specific()
                    } else {
                        matches!(err, Error::InvalidResponse(_))
                    };
                    if !retry {
                        return Err(err);
                    }
                    tracing::warn!(model = %model, error = %err, "Answer fetch failed, trying next model");
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                }
            }
        }

        Err(first_error
            .unwrap_or_else(|| Error::Config("No answer-key models configured".to_string())))
    }

    async fn try_model(
        &self,
        model: &str,
        prompt: &str,
        question_type: QuestionType,
    ) -> Result<ExtractedAnswerKey> {
        let raw = self.backend.generate(model, prompt).await?;
        extraction::extract_answer_key(&raw, question_type)
    }
}
