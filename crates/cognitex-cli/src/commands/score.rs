//! The `cognitex score` command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use cognitex_core::dashboard::{motivation_score, DEFAULT_DASHBOARD_MOOD};
use cognitex_core::flows::FlowKind;
use cognitex_core::model::ProgressData;

use super::Runtime;
use crate::ServiceArgs;

pub async fn execute(
    mood: Option<String>,
    progress_path: Option<PathBuf>,
    service: ServiceArgs,
) -> Result<()> {
    let progress = match progress_path {
        Some(path) => load_progress(&path)?,
        None => ProgressData::default(),
    };
    let mood = mood.unwrap_or_else(|| DEFAULT_DASHBOARD_MOOD.to_string());

    let runtime = Runtime::load(&service)?;
    let contract = runtime.catalog.get(FlowKind::MotivationScore);

    let score = motivation_score(&runtime.invoker, contract, runtime.locale, &mood, &progress).await;

    println!(
        "Streak: {} days | Time spent: {}h | Skill growth: {}% | Tasks: {}",
        progress.streak, progress.time_spent, progress.skill_growth, progress.completed_tasks
    );
    println!("Motivation score: {:.0}", score.score);
    println!("{}", score.insights);
    if score.is_fallback {
        println!("(offline estimate, the motivation service was unavailable)");
    }
    Ok(())
}

fn load_progress(path: &Path) -> Result<ProgressData> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read progress file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse progress file: {}", path.display()))
}
