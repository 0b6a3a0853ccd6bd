// src/api/client.rs

use super::{config, errors::ApiError};
use crate::models::request::{GenerationRequest, ImageInput, RefinementRequest};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

/// Upstream model call. Returns the raw response text, empty when the
/// model produced none.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ApiError>;
    async fn refine(&self, request: &RefinementRequest) -> Result<String, ApiError>;
}

/// Settings for [`GeminiApi`].
#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub timeout: Duration,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        GeminiSettings {
            base_url: config::BASE_URL.to_string(),
            model: config::DEFAULT_MODEL.to_string(),
            temperature: 0.2,
            max_output_tokens: config::DEFAULT_MAX_OUTPUT_TOKENS,
            timeout: Duration::from_secs(300),
        }
    }
}

/// API client for the Gemini `generateContent` endpoint.
pub struct GeminiApi {
    client: Client,
    settings: GeminiSettings,
}

impl GeminiApi {
    /// Creates a new `GeminiApi` instance.
    pub fn new(settings: GeminiSettings) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self { client, settings })
    }

    fn endpoint(&self) -> String {
        let model = self.settings.model.trim();
        let model_path = if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{}", model)
        };
        format!(
            "{}/{}:generateContent",
            self.settings.base_url.trim_end_matches('/'),
            model_path
        )
    }

    /// Builds the request body: inline images first, then the text prompt.
    fn request_body(&self, images: &[ImageInput], prompt: &str) -> Value {
        let mut parts: Vec<Value> = images.iter().map(image_part).collect();
        parts.push(json!({ "text": prompt }));

        json!({
            "contents": [{ "parts": parts }],
            "generationConfig": {
                "responseMimeType": config::RESPONSE_MIME_TYPE,
                "maxOutputTokens": self.settings.max_output_tokens,
                "temperature": self.settings.temperature,
            },
        })
    }

    /// Sends a request to the Gemini API.
    async fn send_request(&self, body: Value, api_key: &str) -> Result<String, ApiError> {
        log::debug!("POST {}", self.endpoint());

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            log::error!("Gemini call failed with {}: {}", status, error_text);
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let raw_response = response.text().await?;
        let json_response: Value = serde_json::from_str(&raw_response)?;
        let text = extract_text(&json_response)?;

        log::info!("Gemini responded with {} characters", text.len());
        Ok(text)
    }
}

#[async_trait]
impl ModelClient for GeminiApi {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ApiError> {
        let names: Vec<&str> = request.images.iter().map(|i| i.name.as_str()).collect();
        log::debug!("Calling Gemini generation with sketches {:?}", names);
        let body = self.request_body(&request.images, &request.instructions);
        self.send_request(body, request.credential.expose()).await
    }

    async fn refine(&self, request: &RefinementRequest) -> Result<String, ApiError> {
        log::debug!(
            "Calling Gemini refinement over {} file(s): {}",
            request.current_files.len(),
            request.instruction
        );
        let body = self.request_body(&[], &request.prompt);
        self.send_request(body, request.credential.expose()).await
    }
}

fn image_part(image: &ImageInput) -> Value {
    json!({
        "inlineData": {
            "mimeType": image.mime_type,
            "data": BASE64.encode(&image.data),
        }
    })
}

/// Concatenates the text parts of the first candidate.
fn extract_text(envelope: &Value) -> Result<String, ApiError> {
    if let Some(error) = envelope.get("error") {
        return Err(ApiError::Upstream(error.to_string()));
    }

    let parts = envelope
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    Ok(parts
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect::<Vec<_>>()
        .concat())
}
