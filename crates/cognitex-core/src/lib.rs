//! cognitex-core — Flashcard battle engine, prompt contracts, and study flows.
//!
//! This crate holds the game rules, the contract layer in front of the
//! generative-text service, and the small services built on top of them.
//! It performs no I/O of its own beyond reading and writing deck files.

pub mod battle;
pub mod chat;
pub mod dashboard;
pub mod deck;
pub mod error;
pub mod flows;
pub mod invoker;
pub mod model;
pub mod quest;
pub mod schema;
pub mod template;
pub mod traits;

pub use battle::{BattleSession, Phase, SessionUpdate, Turn};
pub use error::{BattleError, InvokeError, QuestError};
pub use flows::{FlowCatalog, FlowKind};
pub use invoker::{InvokerSettings, PromptContract, PromptInvoker};
pub use model::{Flashcard, Locale, Mood, ProgressData};
