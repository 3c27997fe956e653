//! Offline provider with canned replies.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use cognitex_core::traits::{GenerateRequest, GenerateResponse, TextGenerator, TokenUsage};

/// A generator that never leaves the process.
///
/// Replies are looked up by the request's contract name; requests for other
/// contracts get the default reply.
pub struct MockProvider {
    /// Map of contract name → reply text.
    responses: HashMap<String, String>,
    /// Reply if no contract name matches.
    default_response: String,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Last request received.
    last_request: Mutex<Option<GenerateRequest>>,
}

impl MockProvider {
    /// Create a mock with the given contract→reply mappings.
    pub fn new(responses: HashMap<String, String>) -> Self {
        Self {
            responses,
            default_response: "{}".to_string(),
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Create a mock that always returns the same reply.
    pub fn with_fixed_response(response: &str) -> Self {
        let mut mock = Self::new(HashMap::new());
        mock.default_response = response.to_string();
        mock
    }

    /// A mock that answers each built-in flow with a valid document.
    ///
    /// Entries in `overrides` replace the canned reply for that contract.
    pub fn canned(overrides: HashMap<String, String>) -> Self {
        let mut responses: HashMap<String, String> = CANNED
            .iter()
            .map(|(id, reply)| (id.to_string(), reply.to_string()))
            .collect();
        responses.extend(overrides);
        Self::new(responses)
    }

    /// Get the number of calls made to this provider.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last request made to this provider.
    pub fn last_request(&self) -> Option<GenerateRequest> {
        self.last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl TextGenerator for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self
            .last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(request.clone());

        let content = self
            .responses
            .get(&request.template_id)
            .unwrap_or(&self.default_response)
            .clone();

        // Rough estimate, four characters per token
        let prompt_tokens = (request.rendered_prompt.len() / 4) as u32;
        let completion_tokens = (content.len() / 4) as u32;

        Ok(GenerateResponse {
            content,
            model: request.model.clone(),
            token_usage: TokenUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
            },
            latency_ms: 1,
        })
    }
}

const CANNED: [(&str, &str); 4] = [
    (
        "provideMotivationalSupport",
        r#"{"message": "Every small step counts. Take a breath and try one more card!"}"#,
    ),
    (
        "generateFlashcardBattle",
        r#"{"flashcards": [
            {"question": "2 + 2", "answer": "4"},
            {"question": "8 / 2", "answer": "4"},
            {"question": "Square root of 16", "answer": "4"},
            {"question": "Number of sides of a square", "answer": "4"},
            {"question": "1 + 3", "answer": "4"}
        ]}"#,
    ),
    (
        "provideMoodBasedInsights",
        r#"{"insight": "Your energy follows your rest.", "suggestedActivity": "Review five flashcards, then take a short walk.", "motivationStateAnalysis": "Steady, with room to grow."}"#,
    ),
    (
        "calculateMotivationScore",
        r#"{"motivationScore": 84, "insights": "A five-day streak shows real commitment."}"#,
    ),
];
