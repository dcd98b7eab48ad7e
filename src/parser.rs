//! Decoder for the engine's positional stdout schema.
//!
//! The engine prints, in order: `N` player name echoes, one replay/seed line
//! (first token is the replay path), `N` result lines of the form
//! `"<rank> <1-based player index>"`, one whitespace-separated timeout line,
//! then arbitrary trailing lines. There are no field names and no schema
//! version; every offset below is derived from the player count alone, and
//! any token that fails integer conversion is a fatal
//! [`Error::MalformedOutput`], never a skip.

use crate::error::{Error, Result};
use crate::match_runner::MatchOutcome;

// Line offsets of the schema, all derived from the player count.
const fn replay_line(num_players: usize) -> usize {
    num_players
}

const fn first_result_line(num_players: usize) -> usize {
    num_players + 1
}

const fn timeout_line(num_players: usize) -> usize {
    2 * num_players + 1
}

const fn min_line_count(num_players: usize) -> usize {
    2 + 2 * num_players
}

/// Decode raw engine stdout into a [`MatchOutcome`].
///
/// The returned ranking has exactly one entry per participant (duplicates and
/// gaps are schema violations). Lines beyond the timeout line are ignored for
/// forward compatibility. The outcome's `exit_code` is left at zero; the
/// caller owns the process status.
pub fn parse_match_output(raw: &str, num_players: usize) -> Result<MatchOutcome> {
    let lines: Vec<&str> = raw.split('\n').collect();
    if lines.len() < min_line_count(num_players) {
        return Err(Error::MalformedOutput(format!(
            "expected at least {} lines for {num_players} players, got {}",
            min_line_count(num_players),
            lines.len()
        )));
    }

    // lines [0, num_players) are name echoes, nothing to decode there
    let replay_file = lines[replay_line(num_players)]
        .split_whitespace()
        .next()
        .ok_or_else(|| Error::MalformedOutput("replay line has no tokens".to_string()))?
        .to_string();

    let mut ranking: Vec<Option<u32>> = vec![None; num_players];
    for offset in 0..num_players {
        let line = lines[first_result_line(num_players) + offset];
        let (rank, player) = parse_result_line(line)?;
        let index = player.checked_sub(1).filter(|i| *i < num_players).ok_or_else(|| {
            Error::MalformedOutput(format!(
                "player index {player} out of range 1..={num_players} in result line '{line}'"
            ))
        })?;
        if ranking[index].replace(rank).is_some() {
            return Err(Error::MalformedOutput(format!(
                "player {player} ranked twice in engine output"
            )));
        }
    }
    let ranking = ranking
        .into_iter()
        .enumerate()
        .map(|(index, rank)| {
            rank.ok_or_else(|| {
                Error::MalformedOutput(format!("no rank reported for player {}", index + 1))
            })
        })
        .collect::<Result<Vec<u32>>>()?;

    let timeouts = lines[timeout_line(num_players)]
        .split_whitespace()
        .map(str::to_string)
        .collect();

    Ok(MatchOutcome {
        ranking,
        replay_file,
        timeouts,
        exit_code: 0,
    })
}

/// Decode one `"<rank> <1-based player index>"` result line.
fn parse_result_line(line: &str) -> Result<(u32, usize)> {
    let malformed = || Error::MalformedOutput(format!("invalid result line '{line}'"));
    let mut tokens = line.split_whitespace();
    let rank = tokens
        .next()
        .and_then(|t| t.parse().ok())
        .ok_or_else(malformed)?;
    let player = tokens
        .next()
        .and_then(|t| t.parse().ok())
        .ok_or_else(malformed)?;
    Ok((rank, player))
}
