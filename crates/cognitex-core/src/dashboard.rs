//! Dashboard motivation score and the MindMirror mood check-in.

use serde::Serialize;

use crate::error::InvokeError;
use crate::flows::{
    fallback_score_insight, MoodInput, MoodInsights, ScoreInput, ScoreOutput,
    FALLBACK_MOTIVATION_SCORE,
};
use crate::invoker::{PromptContract, PromptInvoker};
use crate::model::{Locale, Mood, ProgressData};

/// Mood assumed when the dashboard loads without a check-in.
pub const DEFAULT_DASHBOARD_MOOD: &str = "focused";

/// What the dashboard shows in its motivation card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MotivationScore {
    pub score: f64,
    pub insights: String,
    /// Set when the flow failed and placeholder values are shown.
    pub is_fallback: bool,
}

impl MotivationScore {
    pub fn fallback(locale: Locale) -> Self {
        Self {
            score: FALLBACK_MOTIVATION_SCORE,
            insights: fallback_score_insight(locale).to_string(),
            is_fallback: true,
        }
    }
}

/// Ask the motivation-score flow about `mood` and `progress`.
///
/// Never fails: any invoke error is logged and replaced by the placeholder
/// score.
pub async fn motivation_score(
    invoker: &PromptInvoker,
    contract: &PromptContract,
    locale: Locale,
    mood: &str,
    progress: &ProgressData,
) -> MotivationScore {
    let progress_data = match serde_json::to_string(progress) {
        Ok(json) => json,
        Err(e) => {
            tracing::warn!(error = %e, "could not serialize progress data");
            return MotivationScore::fallback(locale);
        }
    };
    let input = ScoreInput {
        mood: mood.to_string(),
        progress_data,
    };

    match invoker.invoke::<_, ScoreOutput>(contract, &input).await {
        Ok(output) => MotivationScore {
            score: output.motivation_score,
            insights: output.insights,
            is_fallback: false,
        },
        Err(e) => {
            tracing::warn!(error = %e, "motivation score unavailable, using fallback");
            MotivationScore::fallback(locale)
        }
    }
}

/// Ask the mood-insights flow about a MindMirror check-in.
pub async fn mood_insights(
    invoker: &PromptInvoker,
    contract: &PromptContract,
    mood: Mood,
) -> Result<MoodInsights, InvokeError> {
    let input = MoodInput {
        mood: mood.to_string(),
    };
    invoker.invoke(contract, &input).await
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

    #[tokio::test]
    async fn score_comes_from_the_flow() {
        let generator = Arc::new(ScriptedGenerator::replying(
            r#"{"motivationScore": 91, "insights": "Five-day streak!"}"#,
        ));
        let contract = FlowKind::MotivationScore.contract(Locale::En);

        let score = motivation_score(
            &invoker(generator.clone()),
            &contract,
            Locale::En,
            DEFAULT_DASHBOARD_MOOD,
            &ProgressData::default(),
        )
        .await;

        assert_eq!(score.score, 91.0);
        assert_eq!(score.insights, "Five-day streak!");
        assert!(!score.is_fallback);

        let requests = generator.requests.lock().unwrap();
        assert!(requests[0].rendered_prompt.contains("\"streak\":5"));
        assert!(requests[0].rendered_prompt.contains("Mood: focused"));
    }

    #[tokio::test]
    async fn failure_falls_back_to_placeholder() {
        let generator = Arc::new(ScriptedGenerator::replying(r#"{"motivationScore": "high"}"#));
        let contract = FlowKind::MotivationScore.contract(Locale::En);

        let score = motivation_score(
            &invoker(generator),
            &contract,
            Locale::En,
            "tired",
            &ProgressData::default(),
        )
        .await;

        assert_eq!(score, MotivationScore::fallback(Locale::En));
        assert_eq!(score.score, 78.0);
        assert_eq!(score.insights, "Keep up the great work! Your consistency is paying off.");
    }

    #[tokio::test]
    async fn mood_insights_are_typed() {
        let generator = Arc::new(ScriptedGenerator::replying(
            r#"{"insight": "Deadlines pile up.", "suggestedActivity": "Take a short walk.", "motivationStateAnalysis": "Low but recoverable."}"#,
        ));
        let contract = FlowKind::MoodInsights.contract(Locale::En);

        let insights = mood_insights(&invoker(generator.clone()), &contract, Mood::Stressed)
            .await
            .unwrap();

        assert_eq!(insights.suggested_activity, "Take a short walk.");
        let requests = generator.requests.lock().unwrap();
        assert!(requests[0].rendered_prompt.ends_with("Mood: Stressed"));
    }

    #[tokio::test]
    async fn mood_insights_surface_upstream_errors() {
        let generator = Arc::new(ScriptedGenerator::failing("network unreachable"));
        let contract = FlowKind::MoodInsights.contract(Locale::Vi);

        let err = mood_insights(&invoker(generator), &contract, Mood::Sad)
            .await
            .unwrap_err();

        assert!(matches!(err, InvokeError::Upstream { .. }));
    }
}
