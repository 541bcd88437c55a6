use crate::error::{Error, Result};
use reqwest::Client;
use serde_json::{json, Value};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// A text-generation backend the answer-key fetcher can call. One
/// implementation per provider API; the model identifier selects within the
/// provider. Replies are free text and treated as untrusted.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TextGenBackend: Send + Sync {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String>;
}

/// Google Gemini `generateContent` (non-streaming).
pub struct GeminiBackend {
    client: Client,
    api_key: String,
}

impl GeminiBackend {
    pub fn new(api_key: String, client: Client) -> Self {
        Self { client, api_key }
    }

    fn generation_config(model: &str) -> Value {
        let mut config = json!({
            "temperature": 0.1,
            "maxOutputTokens": 2048
        });
        // gemini-3: enable thinking config.
        if model.contains("gemini-3") {
            config["thinkingConfig"] = json!({ "thinkingLevel": "HIGH" });
        }
        if model.contains("1.5") {
            config["responseMimeType"] = json!("application/json");
        }
        config
    }
}

#[async_trait::async_trait]
impl TextGenBackend for GeminiBackend {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String> {
        let url = format!("{}/{}:generateContent", GEMINI_API_BASE, model);
        let body = json!({
            "contents": [
                {
                    "role": "user",
                    "parts": [{ "text": prompt }]
                }
            ],
            "generationConfig": Self::generation_config(model)
        });

        let res = self
            .client
            .post(format!("{}?key={}", url, self.api_key))
            .json(&body)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(Error::InvalidResponse(format!(
                "API {}: {}",
                status,
                parse_error_body(&body)
            )));
        }

        let data: Value = res.json().await?;
        let candidate = match data.get("candidates").and_then(|c| c.get(0)) {
            Some(candidate) => candidate.clone(),
            None => {
                let feedback = data
                    .pointer("/promptFeedback/blockReason")
                    .or_else(|| data.pointer("/promptFeedback/blockReasonMessage"))
                    .and_then(|v| v.as_str());
                let suffix = feedback.map(|f| format!(" ({})", f)).unwrap_or_default();
                return Err(Error::InvalidResponse(format!(
                    "No candidate returned by model{}",
                    suffix
                )));
            }
        };

        // Some Gemini models return multiple parts (e.g. "thinking" + JSON).
        let joined = candidate
            .pointer("/content/parts")
            .and_then(|p| p.as_array())
            .map(|parts| {
                parts
                    .iter()
                    .map(|p| p.get("text").and_then(|t| t.as_str()).unwrap_or(""))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default();

        let text = joined.trim();
        if text.is_empty() {
            return Err(Error::InvalidResponse("Empty response".to_string()));
        }
        Ok(text.to_string())
    }
}

/// OpenRouter Chat Completions.
pub struct OpenRouterBackend {
    client: Client,
    api_key: String,
}

impl OpenRouterBackend {
    pub fn new(api_key: String, client: Client) -> Self {
        Self { client, api_key }
    }
}

#[async_trait::async_trait]
impl TextGenBackend for OpenRouterBackend {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String> {
        let body = json!({
            "model": model,
            "messages": [
                { "role": "user", "content": prompt }
            ]
        });

        let res = self
            .client
            .post(OPENROUTER_API_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(Error::InvalidResponse(format!(
                "API {}: {}",
                status,
                parse_error_body(&body)
            )));
        }

        let data: Value = res.json().await?;
        let text = data
            .pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .unwrap_or("");

        if text.is_empty() {
            return Err(Error::InvalidResponse("Empty response".to_string()));
        }
        Ok(text.to_string())
    }
}

/// Pulls a human-readable message out of a provider error body, falling back
/// to a truncated raw dump.
fn parse_error_body(body: &str) -> String {
    let truncate = || body.chars().take(200).collect::<String>();
    if body.is_empty() {
        return String::new();
    }
    let Ok(data) = serde_json::from_str::<Value>(body) else {
        return truncate();
    };
    data.pointer("/error/message")
        .or_else(|| data.pointer("/error/status"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .unwrap_or_else(truncate)
}
