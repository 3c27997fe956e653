//! Generate a flashcard set for a subject and start a battle with it.

use crate::battle::{BattleSession, SessionUpdate};
use crate::error::QuestError;
use crate::flows::{FlashcardInput, FlashcardOutput};
use crate::invoker::{PromptContract, PromptInvoker};

/// Move `session` through loading into play using cards generated by the
/// flashcard-battle `contract`.
///
/// The session stays in loading while the request is in flight and returns to
/// idle if generation fails or yields no cards.
pub async fn start_quest(
    session: &mut BattleSession,
    invoker: &PromptInvoker,
    contract: &PromptContract,
    subject: &str,
) -> Result<SessionUpdate, QuestError> {
    session.begin_loading()?;

    let input = FlashcardInput {
        subject: subject.to_string(),
    };
    let generated: FlashcardOutput = match invoker.invoke(contract, &input).await {
        Ok(output) => output,
        Err(e) => {
            tracing::warn!(subject, error = %e, "flashcard generation failed");
            session.abort_loading()?;
            return Err(e.into());
        }
    };

    tracing::info!(subject, cards = generated.flashcards.len(), "flashcards generated");
    Ok(session.start_battle(generated.flashcards)?)
}
