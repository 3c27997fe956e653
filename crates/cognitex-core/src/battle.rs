//! Turn-based flashcard battle engine.
//!
//! A [`BattleSession`] is the aggregate root of one play-through. The player
//! answers the current card, the opponent's turn is a pacing gate that must be
//! explicitly [`advance`](BattleSession::advance)d, and the game ends at the
//! first advance that sees a depleted health bar.
//!
//! ```text
//! Idle --begin_loading--> Loading --start_battle--> Playing --advance (a health == 0)--> Ended
//!   \________________start_battle_________________/    ^  |                                |
//!                                                      |  submit_answer / advance          |
//!                                                      +--+                                |
//! Idle <--------------------------------- reset -------------------------------------------+
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::BattleError;
use crate::model::{Flashcard, Locale};

/// Health both parties start with.
pub const MAX_HEALTH: u32 = 100;
/// Damage dealt to the opponent by a correct answer.
pub const PLAYER_DAMAGE: u32 = 25;
/// Damage dealt to the player by a wrong answer.
pub const OPPONENT_DAMAGE: u32 = 20;
/// Experience awarded per correct answer.
pub const XP_PER_CORRECT: u32 = 10;

/// Lifecycle of a whole session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Loading,
    Playing,
    Ended,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => write!(f, "idle"),
            Phase::Loading => write!(f, "loading"),
            Phase::Playing => write!(f, "playing"),
            Phase::Ended => write!(f, "ended"),
        }
    }
}

/// Whose move it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Turn {
    Player,
    Opponent,
}

impl fmt::Display for Turn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Turn::Player => write!(f, "player"),
            Turn::Opponent => write!(f, "opponent"),
        }
    }
}

/// How a finished battle went for the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BattleResult {
    Victory,
    Defeat,
}

/// Judgement of the most recent answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub message: String,
}

/// What a successful operation changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionUpdate {
    Started {
        card_count: usize,
    },
    Answered {
        outcome: AnswerOutcome,
        player_health: u32,
        opponent_health: u32,
        experience: u32,
    },
    NextQuestion {
        cursor: usize,
    },
    Ended {
        result: BattleResult,
        experience: u32,
    },
}

/// One play-through of the flashcard combat game.
///
/// Serializable for display and logging only; sessions are built through
/// [`start_battle`](Self::start_battle) so their counters stay consistent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BattleSession {
    id: Uuid,
    locale: Locale,
    flashcards: Vec<Flashcard>,
    cursor: usize,
    player_health: u32,
    opponent_health: u32,
    turn: Turn,
    phase: Phase,
    experience: u32,
    last_outcome: Option<AnswerOutcome>,
}

impl Default for BattleSession {
    fn default() -> Self {
        Self::new(Locale::default())
    }
}

impl BattleSession {
    /// An idle session with zeroed counters.
    pub fn new(locale: Locale) -> Self {
        Self {
            id: Uuid::new_v4(),
            locale,
            flashcards: Vec::new(),
            cursor: 0,
            player_health: 0,
            opponent_health: 0,
            turn: Turn::Player,
            phase: Phase::Idle,
            experience: 0,
            last_outcome: None,
        }
    }

    /// Start a fresh battle over `flashcards`.
    pub fn start(flashcards: Vec<Flashcard>) -> Result<Self, BattleError> {
        let mut session = Self::default();
        session.start_battle(flashcards)?;
        Ok(session)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn flashcards(&self) -> &[Flashcard] {
        &self.flashcards
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn player_health(&self) -> u32 {
        self.player_health
    }

    pub fn opponent_health(&self) -> u32 {
        self.opponent_health
    }

    pub fn turn(&self) -> Turn {
        self.turn
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn experience(&self) -> u32 {
        self.experience
    }

    pub fn last_outcome(&self) -> Option<&AnswerOutcome> {
        self.last_outcome.as_ref()
    }

    /// The card the player is facing, if a battle is underway.
    pub fn current_card(&self) -> Option<&Flashcard> {
        match self.phase {
            Phase::Playing => self.flashcards.get(self.cursor),
            _ => None,
        }
    }

    /// The result of an ended battle. The player wins whenever they still
    /// have health left at the ending check.
    pub fn result(&self) -> Option<BattleResult> {
        match self.phase {
            Phase::Ended if self.player_health > 0 => Some(BattleResult::Victory),
            Phase::Ended => Some(BattleResult::Defeat),
            _ => None,
        }
    }

    /// Mark the session as waiting for generated flashcards.
    pub fn begin_loading(&mut self) -> Result<(), BattleError> {
        if self.phase != Phase::Idle {
            return Err(self.reject("begin_loading"));
        }
        self.phase = Phase::Loading;
        Ok(())
    }

    /// Return a loading session to idle after a failed generation.
    pub fn abort_loading(&mut self) -> Result<(), BattleError> {
        if self.phase != Phase::Loading {
            return Err(self.reject("abort_loading"));
        }
        self.phase = Phase::Idle;
        Ok(())
    }

    /// Begin playing over `flashcards`, from either idle or loading.
    ///
    /// An empty set fails with [`BattleError::EmptyContent`] and leaves the
    /// session idle with its counters untouched.
    pub fn start_battle(&mut self, flashcards: Vec<Flashcard>) -> Result<SessionUpdate, BattleError> {
        if !matches!(self.phase, Phase::Idle | Phase::Loading) {
            return Err(self.reject("start"));
        }
        if flashcards.is_empty() {
            self.phase = Phase::Idle;
            return Err(BattleError::EmptyContent);
        }

        let card_count = flashcards.len();
        self.flashcards = flashcards;
        self.cursor = 0;
        self.player_health = MAX_HEALTH;
        self.opponent_health = MAX_HEALTH;
        self.experience = 0;
        self.turn = Turn::Player;
        self.last_outcome = None;
        self.phase = Phase::Playing;

        tracing::debug!(session = %self.id, card_count, "battle started");
        Ok(SessionUpdate::Started { card_count })
    }

    /// Judge the player's answer to the current card and hand the turn to
    /// the opponent.
    ///
    /// Termination is not checked here; a depleted health bar only ends the
    /// game on the following [`advance`](Self::advance).
    pub fn submit_answer(&mut self, answer: &str) -> Result<SessionUpdate, BattleError> {
        if self.phase != Phase::Playing || self.turn != Turn::Player {
            return Err(self.reject("submit_answer"));
        }
        let Some(card) = self.flashcards.get(self.cursor) else {
            return Err(self.reject("submit_answer"));
        };

        let outcome = if card.is_correct(answer) {
            self.opponent_health = self.opponent_health.saturating_sub(PLAYER_DAMAGE);
            self.experience += XP_PER_CORRECT;
            AnswerOutcome {
                correct: true,
                message: correct_message(self.locale),
            }
        } else {
            let message = incorrect_message(self.locale, &card.answer);
            self.player_health = self.player_health.saturating_sub(OPPONENT_DAMAGE);
            AnswerOutcome {
                correct: false,
                message,
            }
        };

        self.turn = Turn::Opponent;
        self.last_outcome = Some(outcome.clone());

        Ok(SessionUpdate::Answered {
            outcome,
            player_health: self.player_health,
            opponent_health: self.opponent_health,
            experience: self.experience,
        })
    }

    /// Finish the opponent's turn: end the game if either side is out of
    /// health, otherwise move to the next card (wrapping around).
    pub fn advance(&mut self) -> Result<SessionUpdate, BattleError> {
        if self.phase != Phase::Playing || self.turn != Turn::Opponent || self.flashcards.is_empty() {
            return Err(self.reject("advance"));
        }

        if self.player_health == 0 || self.opponent_health == 0 {
            self.phase = Phase::Ended;
            let result = if self.player_health > 0 {
                BattleResult::Victory
            } else {
                BattleResult::Defeat
            };
            tracing::debug!(session = %self.id, ?result, experience = self.experience, "battle ended");
            return Ok(SessionUpdate::Ended {
                result,
                experience: self.experience,
            });
        }

        self.last_outcome = None;
        self.cursor = (self.cursor + 1) % self.flashcards.len();
        self.turn = Turn::Player;
        Ok(SessionUpdate::NextQuestion {
            cursor: self.cursor,
        })
    }

    /// Discard the battle and return to idle with zeroed counters.
    pub fn reset(&mut self) {
        *self = Self::new(self.locale);
    }

    fn reject(&self, operation: &'static str) -> BattleError {
        tracing::warn!(
            session = %self.id,
            operation,
            phase = %self.phase,
            turn = %self.turn,
            "rejected out-of-turn battle operation"
        );
        BattleError::InvalidTurn {
            operation,
            phase: self.phase,
            turn: self.turn,
        }
    }
}

fn correct_message(locale: Locale) -> String {
    match locale {
        Locale::En => format!("Correct! You dealt {PLAYER_DAMAGE} damage."),
        Locale::Vi => format!("Chính xác! Bạn gây {PLAYER_DAMAGE} sát thương."),
    }
}

fn incorrect_message(locale: Locale, answer: &str) -> String {
    match locale {
        Locale::En => format!("Not quite. The correct answer is: {answer}"),
        Locale::Vi => format!("Chưa đúng. Đáp án đúng là: {answer}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deck(n: usize) -> Vec<Flashcard> {
        (0..n)
            .map(|i| Flashcard::new(format!("q{i}"), format!("a{i}")))
            .collect()
    }

    fn arithmetic() -> Vec<Flashcard> {
        vec![Flashcard::new("2+2", "4")]
    }

    #[test]
    fn start_initializes_counters_for_any_deck_size() {
        for n in 1..=7 {
            let session = BattleSession::start(deck(n)).unwrap();
            assert_eq!(session.player_health(), MAX_HEALTH);
            assert_eq!(session.opponent_health(), MAX_HEALTH);
            assert_eq!(session.cursor(), 0);
            assert_eq!(session.turn(), Turn::Player);
            assert_eq!(session.phase(), Phase::Playing);
            assert_eq!(session.experience(), 0);
            assert_eq!(session.flashcards().len(), n);
        }
    }

    #[test]
    fn start_with_empty_deck_fails() {
        let err = BattleSession::start(vec![]).unwrap_err();
        assert_eq!(err, BattleError::EmptyContent);
    }

    #[test]
    fn empty_generation_returns_loading_session_to_idle() {
        let mut session = BattleSession::default();
        session.begin_loading().unwrap();
        assert_eq!(session.phase(), Phase::Loading);

        let err = session.start_battle(vec![]).unwrap_err();
        assert_eq!(err, BattleError::EmptyContent);
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.player_health(), 0);
        assert_eq!(session.experience(), 0);
    }

    #[test]
    fn loading_transitions_are_guarded() {
        let mut session = BattleSession::default();
        assert!(session.abort_loading().is_err());
        session.begin_loading().unwrap();
        assert!(session.begin_loading().is_err());
        session.abort_loading().unwrap();
        assert_eq!(session.phase(), Phase::Idle);

        session.begin_loading().unwrap();
        session.start_battle(deck(2)).unwrap();
        assert_eq!(session.phase(), Phase::Playing);
        assert!(matches!(
            session.begin_loading(),
            Err(BattleError::InvalidTurn { operation: "begin_loading", .. })
        ));
    }

    #[test]
    fn start_is_rejected_mid_battle() {
        let mut session = BattleSession::start(deck(2)).unwrap();
        let before = session.clone();
        let err = session.start_battle(deck(3)).unwrap_err();
        assert!(matches!(err, BattleError::InvalidTurn { operation: "start", .. }));
        assert_eq!(session, before);
    }

    #[test]
    fn correct_answer_damages_opponent_and_awards_xp() {
        let mut session = BattleSession::start(deck(3)).unwrap();
        let update = session.submit_answer("  A0 ").unwrap();

        assert_eq!(session.opponent_health(), MAX_HEALTH - PLAYER_DAMAGE);
        assert_eq!(session.player_health(), MAX_HEALTH);
        assert_eq!(session.experience(), XP_PER_CORRECT);
        assert_eq!(session.turn(), Turn::Opponent);
        assert!(session.last_outcome().unwrap().correct);
        match update {
            SessionUpdate::Answered { outcome, opponent_health, .. } => {
                assert_eq!(outcome.message, "Correct! You dealt 25 damage.");
                assert_eq!(opponent_health, 75);
            }
            other => panic!("unexpected update: {other:?}"),
        }
    }

    #[test]
    fn wrong_answer_damages_player_and_reveals_answer() {
        let mut session = BattleSession::start(deck(3)).unwrap();
        session.submit_answer("nope").unwrap();

        assert_eq!(session.player_health(), MAX_HEALTH - OPPONENT_DAMAGE);
        assert_eq!(session.opponent_health(), MAX_HEALTH);
        assert_eq!(session.experience(), 0);
        assert_eq!(session.turn(), Turn::Opponent);
        let outcome = session.last_outcome().unwrap();
        assert!(!outcome.correct);
        assert!(outcome.message.ends_with("a0"));
    }

    #[test]
    fn outcome_messages_follow_locale() {
        let mut session = BattleSession::new(Locale::Vi);
        session.start_battle(arithmetic()).unwrap();
        session.submit_answer("5").unwrap();
        assert_eq!(
            session.last_outcome().unwrap().message,
            "Chưa đúng. Đáp án đúng là: 4"
        );
    }

    #[test]
    fn advance_moves_to_next_card_and_clears_outcome() {
        let mut session = BattleSession::start(deck(3)).unwrap();
        session.submit_answer("a0").unwrap();
        let update = session.advance().unwrap();

        assert_eq!(update, SessionUpdate::NextQuestion { cursor: 1 });
        assert_eq!(session.turn(), Turn::Player);
        assert!(session.last_outcome().is_none());
        assert_eq!(session.current_card().unwrap().question, "q1");
    }

    #[test]
    fn cursor_wraps_around_without_reshuffling() {
        let mut session = BattleSession::start(deck(2)).unwrap();
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(session.current_card().unwrap().question.clone());
            session.submit_answer("skip").unwrap();
            if session.player_health() == 0 {
                break;
            }
            session.advance().unwrap();
        }
        assert_eq!(seen, vec!["q0", "q1", "q0", "q1"]);
    }

    #[test]
    fn out_of_turn_operations_leave_session_unchanged() {
        let mut session = BattleSession::start(deck(2)).unwrap();
        let before = session.clone();
        let err = session.advance().unwrap_err();
        assert_eq!(
            err,
            BattleError::InvalidTurn {
                operation: "advance",
                phase: Phase::Playing,
                turn: Turn::Player,
            }
        );
        assert_eq!(session, before);

        session.submit_answer("a0").unwrap();
        let before = session.clone();
        let err = session.submit_answer("a0").unwrap_err();
        assert!(matches!(err, BattleError::InvalidTurn { operation: "submit_answer", .. }));
        assert_eq!(session, before);
    }

    #[test]
    fn idle_session_rejects_answers() {
        let mut session = BattleSession::default();
        let before = session.clone();
        assert!(session.submit_answer("x").is_err());
        assert!(session.advance().is_err());
        assert_eq!(session, before);
    }

    #[test]
    fn health_is_clamped_at_zero() {
        let mut session = BattleSession::start(arithmetic()).unwrap();
        for _ in 0..5 {
            session.submit_answer("wrong").unwrap();
            if session.player_health() == 0 {
                break;
            }
            session.advance().unwrap();
        }
        assert_eq!(session.player_health(), 0);

        let mut session = BattleSession::start(arithmetic()).unwrap();
        for _ in 0..4 {
            session.submit_answer("4").unwrap();
            if session.opponent_health() == 0 {
                break;
            }
            session.advance().unwrap();
        }
        assert_eq!(session.opponent_health(), 0);
        assert_eq!(session.experience(), 40);
    }

    #[test]
    fn defeated_opponent_still_takes_its_turn() {
        let mut session = BattleSession::start(arithmetic()).unwrap();
        for _ in 0..3 {
            session.submit_answer("4").unwrap();
            session.advance().unwrap();
        }
        session.submit_answer("4").unwrap();
        assert_eq!(session.opponent_health(), 0);
        assert_eq!(session.phase(), Phase::Playing);
        assert_eq!(session.turn(), Turn::Opponent);

        let cursor = session.cursor();
        let update = session.advance().unwrap();
        assert_eq!(
            update,
            SessionUpdate::Ended {
                result: BattleResult::Victory,
                experience: 40,
            }
        );
        assert_eq!(session.phase(), Phase::Ended);
        assert_eq!(session.cursor(), cursor);
        assert_eq!(session.result(), Some(BattleResult::Victory));
        assert!(session.current_card().is_none());
    }

    #[test]
    fn scripted_play_through() {
        let mut session = BattleSession::start(arithmetic()).unwrap();

        session.submit_answer("4").unwrap();
        assert_eq!(session.opponent_health(), 75);
        assert_eq!(session.experience(), 10);
        assert_eq!(session.turn(), Turn::Opponent);

        session.advance().unwrap();
        assert_eq!(session.turn(), Turn::Player);
        assert_eq!(session.cursor(), 0);

        session.submit_answer("wrong").unwrap();
        assert_eq!(session.player_health(), 80);
        assert_eq!(session.turn(), Turn::Opponent);

        session.advance().unwrap();
        assert_eq!(session.cursor(), 0);
        assert_eq!(session.turn(), Turn::Player);

        for i in 0..4 {
            session.submit_answer("wrong").unwrap();
            if i < 3 {
                session.advance().unwrap();
            }
        }
        assert_eq!(session.player_health(), 0);
        assert_eq!(session.phase(), Phase::Playing);

        let update = session.advance().unwrap();
        assert!(matches!(
            update,
            SessionUpdate::Ended {
                result: BattleResult::Defeat,
                ..
            }
        ));
        assert_eq!(session.phase(), Phase::Ended);

        assert!(session.submit_answer("4").is_err());
        assert!(session.advance().is_err());
    }

    #[test]
    fn reset_zeroes_everything_and_allows_a_fresh_start() {
        let mut session = BattleSession::new(Locale::Vi);
        session.start_battle(arithmetic()).unwrap();
        session.submit_answer("4").unwrap();
        session.reset();

        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.player_health(), 0);
        assert_eq!(session.opponent_health(), 0);
        assert_eq!(session.experience(), 0);
        assert!(session.flashcards().is_empty());
        assert!(session.last_outcome().is_none());
        assert_eq!(session.locale(), Locale::Vi);

        session.start_battle(deck(3)).unwrap();
        assert_eq!(session.player_health(), MAX_HEALTH);
        assert_eq!(session.opponent_health(), MAX_HEALTH);
        assert_eq!(session.cursor(), 0);
        assert_eq!(session.turn(), Turn::Player);
    }

    #[test]
    fn advance_without_cards_is_rejected() {
        let mut session = BattleSession {
            phase: Phase::Playing,
            turn: Turn::Opponent,
            player_health: MAX_HEALTH,
            opponent_health: MAX_HEALTH,
            ..BattleSession::default()
        };
        let before = session.clone();

        let err = session.advance().unwrap_err();

        assert!(matches!(err, BattleError::InvalidTurn { operation: "advance", .. }));
        assert_eq!(session, before);
    }

    #[test]
    fn session_update_serializes_with_event_tag() {
        let json = serde_json::to_value(SessionUpdate::NextQuestion { cursor: 2 }).unwrap();
        assert_eq!(json["event"], "next_question");
        assert_eq!(json["cursor"], 2);
    }
}
