//! Ollama (local model) provider.

use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use cognitex_core::traits::{
    structured_system_prompt, GenerateRequest, GenerateResponse, TextGenerator, TokenUsage,
};

use crate::error::ProviderError;
use crate::http;

const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_TIMEOUT_SECS: u64 = 300; // Local models are slower

/// Ollama local model provider.
///
/// Passes the output schema as Ollama's `format` so decoding is constrained
/// to it.
pub struct OllamaProvider {
    base_url: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let base = if base_url.is_empty() {
            DEFAULT_BASE_URL
        } else {
            base_url.trim_end_matches('/')
        };

        Ok(Self {
            base_url: base.to_string(),
            client: http::build_client(DEFAULT_TIMEOUT_SECS)?,
        })
    }
}

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaMessage>,
    stream: bool,
    format: &'a serde_json::Value,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f64,
    num_predict: u32,
}

#[derive(Deserialize)]
struct OllamaResponse {
    message: OllamaResponseMessage,
    model: String,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Deserialize)]
struct OllamaResponseMessage {
    content: String,
}

fn ollama_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()?
        .get("error")?
        .as_str()
        .map(str::to_string)
}

#[async_trait]
impl TextGenerator for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    #[instrument(skip(self, request), fields(model = %request.model, template = %request.template_id))]
    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        let start = Instant::now();

        let body = OllamaRequest {
            model: &request.model,
            messages: vec![
                OllamaMessage {
                    role: "system",
                    content: structured_system_prompt(&request.output_schema),
                },
                OllamaMessage {
                    role: "user",
                    content: request.rendered_prompt.clone(),
                },
            ],
            stream: false,
            format: &request.output_schema,
            options: OllamaOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    ProviderError::NetworkError(format!(
                        "Ollama not reachable at {}. Is it running? Start with: ollama serve",
                        self.base_url
                    ))
                } else {
                    http::send_error(e, DEFAULT_TIMEOUT_SECS)
                }
            })?;
        let response = http::check_status(response, &request.model, ollama_error_message).await?;

        let api_response: OllamaResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status: 0,
                message: format!("failed to parse response: {e}"),
            })?;

        if api_response.message.content.trim().is_empty() {
            return Err(ProviderError::EmptyResponse.into());
        }

        let prompt_tokens = api_response.prompt_eval_count.unwrap_or(0);
        let completion_tokens = api_response.eval_count.unwrap_or(0);

        Ok(GenerateResponse {
            content: api_response.message.content,
            model: api_response.model,
            token_usage: TokenUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
            },
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request(model: &str) -> GenerateRequest {
        GenerateRequest {
            template_id: "provideMoodBasedInsights".into(),
            rendered_prompt: "Mood: Sad".into(),
            output_schema: serde_json::json!({
                "type": "object",
                "properties": {"insight": {"type": "string"}},
                "required": ["insight"]
            }),
            model: model.into(),
            max_tokens: 512,
            temperature: 0.2,
        }
    }

    #[tokio::test]
    async fn successful_generation() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(serde_json::json!({
                "stream": false,
                "format": {"required": ["insight"]},
                "options": {"temperature": 0.2, "num_predict": 512}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": {"role": "assistant", "content": "{\"insight\": \"Be gentle with yourself.\"}"},
                "model": "llama3.2",
                "prompt_eval_count": 30,
                "eval_count": 12
            })))
            .mount(&server)
            .await;

        let provider = OllamaProvider::new(&server.uri()).unwrap();
        let response = provider.generate(&request("llama3.2")).await.unwrap();

        assert!(response.content.contains("Be gentle"));
        assert_eq!(response.model, "llama3.2");
        assert_eq!(response.token_usage.total_tokens, 42);
    }

    #[tokio::test]
    async fn missing_model_reports_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error": "model \"nope\" not found, try pulling it first"
            })))
            .mount(&server)
            .await;

        let provider = OllamaProvider::new(&server.uri()).unwrap();
        let err = provider.generate(&request("nope")).await.unwrap_err();
        assert_eq!(err.to_string(), "model not found: nope");
    }

    #[tokio::test]
    async fn server_error_message_is_extracted() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "error": "out of memory"
            })))
            .mount(&server)
            .await;

        let provider = OllamaProvider::new(&format!("{}/", server.uri())).unwrap();
        let err = provider.generate(&request("llama3.2")).await.unwrap_err();
        assert_eq!(err.to_string(), "API error (HTTP 500): out of memory");
    }

    #[tokio::test]
    async fn unreachable_server() {
        // Port 1 is never an Ollama server.
        let provider = OllamaProvider::new("http://127.0.0.1:1").unwrap();
        let err = provider.generate(&request("llama3.2")).await.unwrap_err();
        assert!(err.to_string().contains("not reachable"));
    }

    #[test]
    fn empty_base_url_uses_default() {
        let provider = OllamaProvider::new("").unwrap();
        assert_eq!(provider.base_url, DEFAULT_BASE_URL);
    }
}
