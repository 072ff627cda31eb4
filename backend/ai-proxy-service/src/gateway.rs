//! Hosted model gateway client
//!
//! One blocking round trip per call: no retries, no streaming, no circuit
//! breaking. Upstream failures map to the service error taxonomy: billing
//! and quota statuses surface distinctly, everything else is a generic
//! internal error.

use reqwest::multipart;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::config::Config;
use crate::error::AppError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, Serialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

impl ChatTurn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImageGenerationResponse {
    data: Vec<ImageDatum>,
}

#[derive(Debug, Deserialize)]
struct ImageDatum {
    b64_json: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

pub struct ModelGateway {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    chat_model: String,
    image_model: String,
    speech_api_key: Option<String>,
    speech_model: String,
}

impl ModelGateway {
    pub fn new(config: &Config) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http,
            base_url: config.gateway_base_url.trim_end_matches('/').to_string(),
            api_key: config.gateway_api_key.clone(),
            chat_model: config.chat_model.clone(),
            image_model: config.image_model.clone(),
            speech_api_key: config.speech_api_key.clone(),
            speech_model: config.speech_model.clone(),
        }
    }

    /// Map an upstream HTTP status to the service taxonomy.
    fn map_status(status: u16, body: &str) -> AppError {
        match status {
            402 => AppError::Billing,
            429 => AppError::RateLimited,
            other => AppError::Upstream(format!("gateway returned {other}: {body}")),
        }
    }

    async fn post_json(&self, path: &str, body: Value) -> Result<Value, AppError> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("gateway request failed: {e}")))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| AppError::Upstream(format!("gateway body read failed: {e}")))?;

        if !(200..300).contains(&status) {
            return Err(Self::map_status(status, &text));
        }

        serde_json::from_str(&text)
            .map_err(|e| AppError::Upstream(format!("gateway returned malformed JSON: {e}")))
    }

    /// One chat completion. `turns` must already include the system prompt.
    pub async fn chat_completion(&self, turns: &[ChatTurn]) -> Result<String, AppError> {
        let body = serde_json::json!({
            "model": self.chat_model,
            "messages": turns,
        });
        let value = self.post_json("/v1/chat/completions", body).await?;
        let parsed: ChatCompletionResponse = serde_json::from_value(value)
            .map_err(|e| AppError::Upstream(format!("unexpected completion shape: {e}")))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AppError::Upstream("completion had no content".into()))
    }

    /// Convenience wrapper: system prompt plus a single user turn.
    pub async fn complete(&self, system: &str, prompt: &str) -> Result<String, AppError> {
        self.chat_completion(&[ChatTurn::system(system), ChatTurn::user(prompt)])
            .await
    }

    /// Generate one image and return it as a data URL.
    pub async fn generate_image(&self, prompt: &str, size: &str) -> Result<String, AppError> {
        let body = serde_json::json!({
            "model": self.image_model,
            "prompt": prompt,
            "size": size,
            "response_format": "b64_json",
        });
        let value = self.post_json("/v1/images/generations", body).await?;
        let parsed: ImageGenerationResponse = serde_json::from_value(value)
            .map_err(|e| AppError::Upstream(format!("unexpected image shape: {e}")))?;
        let b64 = parsed
            .data
            .into_iter()
            .next()
            .and_then(|d| d.b64_json)
            .ok_or_else(|| AppError::Upstream("image response had no data".into()))?;
        Ok(format!("data:image/png;base64,{b64}"))
    }

    /// Forward an audio blob to the transcription endpoint.
    pub async fn transcribe(
        &self,
        audio: Vec<u8>,
        filename: String,
        mime: String,
    ) -> Result<String, AppError> {
        let key = self
            .speech_api_key
            .as_deref()
            .ok_or_else(|| AppError::Config("SPEECH_API_KEY not configured".into()))?;

        let part = multipart::Part::bytes(audio)
            .file_name(filename)
            .mime_str(&mime)
            .map_err(|e| AppError::BadRequest(format!("invalid audio mime type: {e}")))?;
        let form = multipart::Form::new()
            .text("model", self.speech_model.clone())
            .part("file", part);

        let url = format!("{}/v1/audio/transcriptions", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("transcription request failed: {e}")))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| AppError::Upstream(format!("transcription body read failed: {e}")))?;

        if !(200..300).contains(&status) {
            return Err(Self::map_status(status, &text));
        }

        let parsed: TranscriptionResponse = serde_json::from_str(&text)
            .map_err(|e| AppError::Upstream(format!("unexpected transcription shape: {e}")))?;
        Ok(parsed.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn billing_status_maps_to_billing_error() {
        assert!(matches!(
            ModelGateway::map_status(402, "quota"),
            AppError::Billing
        ));
    }

    #[test]
    fn quota_status_maps_to_rate_limited() {
        assert!(matches!(
            ModelGateway::map_status(429, "slow down"),
            AppError::RateLimited
        ));
    }

    #[test]
    fn other_statuses_map_to_upstream() {
        assert!(matches!(
            ModelGateway::map_status(503, "down"),
            AppError::Upstream(_)
        ));
    }
}
