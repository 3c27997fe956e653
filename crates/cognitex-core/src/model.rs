//! Core data model types for cognitex.
//!
//! Flashcards, locales, moods, and the progress snapshot the dashboard feeds
//! into the motivation-score flow.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A question/answer pair used as ammunition in a battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    /// The prompt shown to the player.
    pub question: String,
    /// The expected answer.
    pub answer: String,
}

impl Flashcard {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }

    /// Case-insensitive, whitespace-trimmed comparison against the answer.
    pub fn is_correct(&self, attempt: &str) -> bool {
        attempt.trim().to_lowercase() == self.answer.trim().to_lowercase()
    }
}

/// Language used for prompt templates and user-facing messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Vi,
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::En => write!(f, "en"),
            Locale::Vi => write!(f, "vi"),
        }
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "en" | "english" => Ok(Locale::En),
            "vi" | "vietnamese" | "tieng-viet" => Ok(Locale::Vi),
            other => Err(format!("unknown locale: {other}")),
        }
    }
}

/// Moods offered by the MindMirror check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mood {
    Happy,
    Excited,
    Tired,
    Stressed,
    Sad,
}

impl Mood {
    pub const ALL: [Mood; 5] = [
        Mood::Happy,
        Mood::Excited,
        Mood::Tired,
        Mood::Stressed,
        Mood::Sad,
    ];
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mood::Happy => "Happy",
            Mood::Excited => "Excited",
            Mood::Tired => "Tired",
            Mood::Stressed => "Stressed",
            Mood::Sad => "Sad",
        };
        f.write_str(name)
    }
}

impl FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "happy" => Ok(Mood::Happy),
            "excited" => Ok(Mood::Excited),
            "tired" => Ok(Mood::Tired),
            "stressed" | "stress" => Ok(Mood::Stressed),
            "sad" => Ok(Mood::Sad),
            other => {
                let expected: Vec<String> = Mood::ALL.iter().map(Mood::to_string).collect();
                Err(format!(
                    "unknown mood: {other} (expected one of {})",
                    expected.join(", ")
                ))
            }
        }
    }
}

/// Learning progress summary passed to the motivation-score flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressData {
    /// Consecutive days with activity.
    #[serde(default)]
    pub streak: u32,
    /// Hours spent learning.
    #[serde(default)]
    pub time_spent: f64,
    /// Skill growth in percent.
    #[serde(default)]
    pub skill_growth: f64,
    #[serde(default)]
    pub completed_tasks: u32,
}

impl Default for ProgressData {
    /// The dashboard's placeholder progress.
    fn default() -> Self {
        Self {
            streak: 5,
            time_spent: 4.5,
            skill_growth: 15.0,
            completed_tasks: 25,
        }
    }
}
