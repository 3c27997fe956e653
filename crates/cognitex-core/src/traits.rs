//! The generative-text service seam.
//!
//! [`TextGenerator`] is implemented by the `cognitex-providers` crate for each
//! hosted or local model backend. The core never talks HTTP itself.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Generative-text service trait
// ---------------------------------------------------------------------------

/// A backend that turns a rendered prompt into a structured JSON document.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Human-readable backend name (e.g. "openai").
    fn name(&self) -> &str;

    /// Submit a rendered prompt and return the raw model output.
    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse>;
}

/// Request sent to the generative-text service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Contract name the prompt was rendered from.
    pub template_id: String,
    /// Fully rendered prompt text.
    pub rendered_prompt: String,
    /// JSON Schema the response must conform to.
    pub output_schema: serde_json::Value,
    /// Model identifier.
    pub model: String,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
}

/// Raw response from the generative-text service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// Text content as returned by the model.
    pub content: String,
    /// Model that actually generated the response.
    pub model: String,
    /// Token usage.
    #[serde(default)]
    pub token_usage: TokenUsage,
    /// Latency in milliseconds.
    pub latency_ms: u64,
}

/// Token accounting reported by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

// ---------------------------------------------------------------------------
// Shared instructions
// ---------------------------------------------------------------------------

/// System prompt asking for a single JSON document matching `output_schema`.
pub fn structured_system_prompt(output_schema: &serde_json::Value) -> String {
    format!(
        "You are the structured-output engine of a student learning companion. \
         Respond ONLY with a single JSON document that conforms to this JSON Schema. \
         Do not wrap it in markdown and do not add explanations.\n\n{output_schema}"
    )
}

// ---------------------------------------------------------------------------
// JSON payload extraction
// ---------------------------------------------------------------------------

/// Extract the JSON document from a model response.
///
/// Handles:
/// - ```json fenced blocks (the first one wins)
/// - Bare ``` fenced blocks (if no json-tagged block is found)
/// - Prose around an unfenced object (the outermost `{...}` span)
/// - A clean JSON document (returned trimmed)
pub fn extract_json_payload(response: &str) -> String {
    let mut json_block: Option<String> = None;
    let mut generic_block: Option<String> = None;
    let mut in_block = false;
    let mut is_json_block = false;
    let mut is_generic_block = false;
    let mut current = String::new();

    for line in response.lines() {
        let trimmed = line.trim();

        if !in_block && trimmed.starts_with("```") {
            in_block = true;
            let lang = trimmed.trim_start_matches('`').trim().to_lowercase();
            is_json_block = lang == "json";
            is_generic_block = lang.is_empty();
            current.clear();
            continue;
        }

        if in_block && trimmed == "```" {
            in_block = false;
            if is_json_block && json_block.is_none() {
                json_block = Some(current.clone());
            } else if is_generic_block && generic_block.is_none() {
                generic_block = Some(current.clone());
            }
            continue;
        }

        if in_block {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
        }
    }

    // Truncated (unclosed) fence: keep what arrived
    if in_block && !current.is_empty() {
        if is_json_block && json_block.is_none() {
            json_block = Some(current);
        } else if is_generic_block && generic_block.is_none() {
            generic_block = Some(current);
        }
    }

    if let Some(block) = json_block.or(generic_block) {
        return block.trim().to_string();
    }

    let trimmed = response.trim();
    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => trimmed[start..=end].to_string(),
        _ => trimmed.to_string(),
    }
}
