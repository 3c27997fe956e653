//! The `cognitex play` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use cognitex_core::battle::BattleSession;
use cognitex_core::deck::parse_deck;
use cognitex_core::model::Locale;

use super::arena;

pub fn execute(deck_path: PathBuf, locale: Option<Locale>) -> Result<()> {
    let deck = parse_deck(&deck_path)?;
    println!("Deck: {} ({} cards)", deck.name, deck.flashcards.len());

    let mut session = BattleSession::new(locale.unwrap_or_default());
    session
        .start_battle(deck.flashcards)
        .with_context(|| format!("cannot battle with deck {}", deck_path.display()))?;

    let stdin = std::io::stdin();
    arena::run(&mut session, stdin.lock(), &mut std::io::stdout())
}
