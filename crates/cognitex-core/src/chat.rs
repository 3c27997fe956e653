//! Cogni, the motivational chat assistant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::flows::{fallback_support_message, SupportInput, SupportOutput};
use crate::invoker::{PromptContract, PromptInvoker};
use crate::model::Locale;

/// Activity summary sent with every chat message.
pub const CHAT_RECENT_ACTIVITY: &str = "Interacting with Cogni Assistant";
/// Learning goal sent with every chat message.
pub const CHAT_LEARNING_GOAL: &str = "General Support";

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub sender: Sender,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

impl ChatMessage {
    fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
            text: text.into(),
            sent_at: Utc::now(),
        }
    }
}

/// An in-memory conversation with the assistant.
#[derive(Debug, Clone)]
pub struct ChatSession {
    locale: Locale,
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    /// A conversation seeded with the assistant's greeting.
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            messages: vec![ChatMessage::new(Sender::Assistant, greeting(locale))],
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Send `text` and wait for the reply.
    ///
    /// Blank input is ignored and returns `None`. Any invoke failure is
    /// answered with an apology instead of an error.
    pub async fn send(
        &mut self,
        invoker: &PromptInvoker,
        contract: &PromptContract,
        text: &str,
    ) -> Option<&ChatMessage> {
        if text.trim().is_empty() {
            return None;
        }
        self.messages.push(ChatMessage::new(Sender::User, text));

        let input = SupportInput {
            mood: text.to_string(),
            recent_activity: CHAT_RECENT_ACTIVITY.to_string(),
            learning_goal: CHAT_LEARNING_GOAL.to_string(),
        };
        let reply = match invoker.invoke::<_, SupportOutput>(contract, &input).await {
            Ok(output) => output.message,
            Err(e) => {
                tracing::warn!(error = %e, "assistant reply unavailable, using fallback");
                fallback_support_message(self.locale).to_string()
            }
        };

        self.messages.push(ChatMessage::new(Sender::Assistant, reply));
        self.messages.last()
    }
}

fn greeting(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "Hello! I'm Cogni. How can I help you learn or feel better today? You can say things like 'I'm feeling stressed' or 'give me a quote'.",
        Locale::Vi => "Xin chào! Mình là Cogni. Hôm nay mình có thể giúp bạn học tập hoặc cảm thấy tốt hơn như thế nào? Bạn có thể nói 'Mình đang căng thẳng' hoặc 'cho mình một câu trích dẫn'.",
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::flows::FlowKind;
    use crate::invoker::testing::ScriptedGenerator;
    use crate::invoker::InvokerSettings;

    fn invoker(generator: Arc<ScriptedGenerator>) -> PromptInvoker {
        PromptInvoker::new(generator, InvokerSettings::default())
    }

    #[test]
    fn new_session_starts_with_greeting() {
        let chat = ChatSession::new(Locale::En);
        assert_eq!(chat.messages().len(), 1);
        assert_eq!(chat.messages()[0].sender, Sender::Assistant);
        assert!(chat.messages()[0].text.starts_with("Hello! I'm Cogni."));
    }

    #[tokio::test]
    async fn reply_is_appended_after_user_message() {
        let generator = Arc::new(ScriptedGenerator::replying(
            r#"{"message": "You've got this, one step at a time."}"#,
        ));
        let contract = FlowKind::MotivationalSupport.contract(Locale::En);
        let mut chat = ChatSession::new(Locale::En);

        let reply = chat
            .send(&invoker(generator.clone()), &contract, "I'm feeling stressed")
            .await
            .unwrap()
            .clone();

        assert_eq!(reply.sender, Sender::Assistant);
        assert_eq!(reply.text, "You've got this, one step at a time.");
        assert_eq!(chat.messages().len(), 3);
        assert_eq!(chat.messages()[1].text, "I'm feeling stressed");

        let requests = generator.requests.lock().unwrap();
        assert!(requests[0].rendered_prompt.contains("feeling I'm feeling stressed"));
        assert!(requests[0].rendered_prompt.contains(CHAT_RECENT_ACTIVITY));
    }

    #[tokio::test]
    async fn blank_message_is_ignored() {
        let generator = Arc::new(ScriptedGenerator::replying("{}"));
        let contract = FlowKind::MotivationalSupport.contract(Locale::En);
        let mut chat = ChatSession::new(Locale::En);

        assert!(chat.send(&invoker(generator.clone()), &contract, "   ").await.is_none());
        assert_eq!(chat.messages().len(), 1);
        assert_eq!(generator.request_count(), 0);
    }

    #[tokio::test]
    async fn failure_produces_localized_apology() {
        let generator = Arc::new(ScriptedGenerator::failing("timeout"));
        let contract = FlowKind::MotivationalSupport.contract(Locale::Vi);
        let mut chat = ChatSession::new(Locale::Vi);

        let reply = chat
            .send(&invoker(generator), &contract, "mệt quá")
            .await
            .unwrap();

        assert_eq!(reply.text, fallback_support_message(Locale::Vi));
    }
}
