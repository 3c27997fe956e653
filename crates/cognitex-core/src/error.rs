//! Error taxonomy for the battle engine and the prompt invoker.
//!
//! Engine errors never mutate the session they were raised against, and
//! invoker errors are split by whether the network was touched: input
//! problems are reported before any request is sent.

use thiserror::Error;

use crate::battle::{Phase, Turn};

/// Errors raised by [`BattleSession`](crate::battle::BattleSession) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BattleError {
    /// Generation produced no usable flashcards.
    #[error("no flashcards were generated; try another subject")]
    EmptyContent,

    /// An operation was called outside the state it is valid in.
    #[error("`{operation}` is not valid during phase {phase} on the {turn} turn")]
    InvalidTurn {
        operation: &'static str,
        phase: Phase,
        turn: Turn,
    },
}

/// Errors raised by [`PromptInvoker`](crate::invoker::PromptInvoker).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvokeError {
    /// Caller input does not satisfy the contract's input schema.
    #[error("invalid input for `{contract}`: {reason}")]
    SchemaValidation { contract: String, reason: String },

    /// The generative service failed or returned output that does not
    /// satisfy the contract's output schema.
    #[error("upstream failure for `{contract}`: {reason}")]
    Upstream { contract: String, reason: String },
}

impl InvokeError {
    /// Returns `true` if the request never left the process.
    pub fn is_input_error(&self) -> bool {
        matches!(self, InvokeError::SchemaValidation { .. })
    }
}

/// Errors from generating a flashcard set and starting a battle with it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuestError {
    #[error(transparent)]
    Invoke(#[from] InvokeError),

    #[error(transparent)]
    Battle(#[from] BattleError),
}
