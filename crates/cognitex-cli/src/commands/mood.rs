//! The `cognitex mood` command.

use anyhow::Result;

use cognitex_core::dashboard::mood_insights;
use cognitex_core::flows::FlowKind;
use cognitex_core::model::Mood;

use super::Runtime;
use crate::ServiceArgs;

pub async fn execute(mood: Mood, service: ServiceArgs) -> Result<()> {
    let runtime = Runtime::load(&service)?;
    let contract = runtime.catalog.get(FlowKind::MoodInsights);

    let insights = mood_insights(&runtime.invoker, contract, mood).await?;

    println!("Mood: {mood}");
    println!();
    println!("Insight:             {}", insights.insight);
    println!("Try this:            {}", insights.suggested_activity);
    println!("Motivation analysis: {}", insights.motivation_state_analysis);
    Ok(())
}
