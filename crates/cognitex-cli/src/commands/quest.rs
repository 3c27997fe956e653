//! The `cognitex quest` command.

use std::path::PathBuf;

use anyhow::Result;

use cognitex_core::battle::BattleSession;
use cognitex_core::deck::Deck;
use cognitex_core::flows::FlowKind;
use cognitex_core::quest::start_quest;

use super::{arena, Runtime};
use crate::ServiceArgs;

pub async fn execute(subject: String, save_deck: Option<PathBuf>, service: ServiceArgs) -> Result<()> {
    let runtime = Runtime::load(&service)?;
    let contract = runtime.catalog.get(FlowKind::FlashcardBattle);

    println!("Summoning flashcards for \"{subject}\"...");
    let mut session = BattleSession::new(runtime.locale);
    start_quest(&mut session, &runtime.invoker, contract, &subject).await?;
    println!("{} cards ready. Answer to strike!", session.flashcards().len());

    if let Some(path) = save_deck {
        let deck = Deck::new(subject.clone(), Some(subject), session.flashcards().to_vec());
        deck.save(&path)?;
        println!("Saved deck to {}", path.display());
    }

    let stdin = std::io::stdin();
    arena::run(&mut session, stdin.lock(), &mut std::io::stdout())
}
