//! Terminal front end for a battle in progress.

use std::io::{BufRead, Write};

use anyhow::Result;

use cognitex_core::battle::{BattleResult, BattleSession, Phase, SessionUpdate, MAX_HEALTH};

/// Play `session` to the end, reading one answer per line from `input`.
///
/// Stops early, leaving the session in play, if `input` runs out.
pub fn run<R: BufRead, W: Write>(session: &mut BattleSession, mut input: R, out: &mut W) -> Result<()> {
    while session.phase() == Phase::Playing {
        let Some(card) = session.current_card() else {
            break;
        };
        writeln!(out)?;
        writeln!(
            out,
            "You {}   Opponent {}   XP {}",
            health_bar(session.player_health()),
            health_bar(session.opponent_health()),
            session.experience()
        )?;
        writeln!(out, "Q{}: {}", session.cursor() + 1, card.question)?;
        write!(out, "> ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            writeln!(out, "Battle abandoned.")?;
            return Ok(());
        }

        if let SessionUpdate::Answered { outcome, .. } = session.submit_answer(line.trim_end())? {
            writeln!(out, "{}", outcome.message)?;
        }

        if let SessionUpdate::Ended { result, experience } = session.advance()? {
            writeln!(out)?;
            match result {
                BattleResult::Victory => writeln!(out, "Victory! You earned {experience} XP.")?,
                BattleResult::Defeat => writeln!(out, "Defeat! You earned {experience} XP.")?,
            }
        }
    }
    Ok(())
}

fn health_bar(health: u32) -> String {
    const WIDTH: u32 = 10;
    let filled = (health * WIDTH).div_ceil(MAX_HEALTH);
    format!(
        "[{}{}] {health:>3}",
        "#".repeat(filled as usize),
        "-".repeat((WIDTH - filled) as usize)
    )
}
