//! TOML flashcard decks.
//!
//! Decks let a battle be played without the generative service, and let a
//! generated set be saved and replayed later.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::Flashcard;

/// A named, ordered set of flashcards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    pub name: String,
    /// Subject the cards were generated for, if any.
    pub subject: Option<String>,
    pub flashcards: Vec<Flashcard>,
}

/// On-disk layout of a deck file.
#[derive(Debug, Serialize, Deserialize)]
struct TomlDeckFile {
    deck: TomlDeckHeader,
    #[serde(default)]
    flashcards: Vec<Flashcard>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TomlDeckHeader {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    subject: Option<String>,
}

impl Deck {
    pub fn new(name: impl Into<String>, subject: Option<String>, flashcards: Vec<Flashcard>) -> Self {
        Self {
            name: name.into(),
            subject,
            flashcards,
        }
    }

    /// Serialize in the format [`parse_deck_str`] reads.
    pub fn to_toml(&self) -> Result<String> {
        let file = TomlDeckFile {
            deck: TomlDeckHeader {
                name: self.name.clone(),
                subject: self.subject.clone(),
            },
            flashcards: self.flashcards.clone(),
        };
        toml::to_string(&file).context("failed to serialize deck")
    }

    /// Write the deck to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml()?)
            .with_context(|| format!("failed to write deck to {}", path.display()))
    }
}

/// Parse a single deck file.
pub fn parse_deck(path: &Path) -> Result<Deck> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read deck file: {}", path.display()))?;

    parse_deck_str(&content, path)
}

/// Parse deck TOML; `source_path` is only used in error messages.
pub fn parse_deck_str(content: &str, source_path: &Path) -> Result<Deck> {
    let parsed: TomlDeckFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    Ok(Deck {
        name: parsed.deck.name,
        subject: parsed.deck.subject,
        flashcards: parsed.flashcards,
    })
}

/// Load a deck file, or every `.toml` deck under a directory (recursively).
/// Unparseable files inside a directory are skipped with a warning.
pub fn load_decks(path: &Path) -> Result<Vec<Deck>> {
    if !path.is_dir() {
        return Ok(vec![parse_deck(path)?]);
    }

    let mut decks = Vec::new();
    let mut entries: Vec<_> = std::fs::read_dir(path)
        .with_context(|| format!("failed to read directory: {}", path.display()))?
        .collect::<std::io::Result<_>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let entry_path = entry.path();
        if entry_path.is_dir() {
            decks.extend(load_decks(&entry_path)?);
        } else if entry_path.extension().is_some_and(|ext| ext == "toml") {
            match parse_deck(&entry_path) {
                Ok(deck) => decks.push(deck),
                Err(e) => tracing::warn!("skipping {}: {e:#}", entry_path.display()),
            }
        }
    }

    Ok(decks)
}

/// A problem found in a deck.
#[derive(Debug, Clone)]
pub struct DeckWarning {
    /// Zero-based card index, if the warning concerns one card.
    pub card: Option<usize>,
    pub message: String,
}

/// Check a deck for problems that would spoil a battle.
pub fn validate_deck(deck: &Deck) -> Vec<DeckWarning> {
    let mut warnings = Vec::new();

    if deck.flashcards.is_empty() {
        warnings.push(DeckWarning {
            card: None,
            message: "deck has no flashcards".into(),
        });
    }

    let mut seen = HashSet::new();
    for (i, card) in deck.flashcards.iter().enumerate() {
        if card.question.trim().is_empty() {
            warnings.push(DeckWarning {
                card: Some(i),
                message: "question is empty".into(),
            });
        }
        if card.answer.trim().is_empty() {
            warnings.push(DeckWarning {
                card: Some(i),
                message: "answer is empty".into(),
            });
        }
        if !seen.insert(card.question.trim().to_lowercase()) {
            warnings.push(DeckWarning {
                card: Some(i),
                message: format!("duplicate question: {}", card.question),
            });
        }
    }

    warnings
}
