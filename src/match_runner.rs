//! One match from parameters to outcome.
//!
//! [`run_match`] is the unit of work of the whole manager: it launches the
//! engine through [`crate::engine`], decodes its stdout through
//! [`crate::parser`], and moves the replay artifact into the archive
//! directory. It performs no persistence; the caller decides what to do with
//! the returned [`MatchOutcome`].
//!
//! Replay collision policy: an existing archive entry with the same file name
//! is overwritten, matching the engine manager's historical unconditional
//! move.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::time::Duration;

use tracing::{debug, instrument};

use crate::engine;
use crate::error::{Error, Result};
use crate::parser;

/// Immutable configuration for one engine invocation.
///
/// Participant order is significant: it defines the 0-based player index that
/// [`MatchOutcome::ranking`] is keyed on.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchParameters {
    /// Executable references, in player-index order (2..N).
    pub participants: Vec<String>,
    /// Board width, in cells.
    pub width: u32,
    /// Board height, in cells.
    pub height: u32,
    /// Engine map seed, for reproducibility only.
    pub seed: u64,
    /// Wall-clock budget for the whole invocation. `None` means no limit.
    pub time_limit: Option<Duration>,
}

impl MatchParameters {
    /// Create parameters with the standard derived time limit
    /// (see [`MatchParameters::default_time_limit`]).
    pub fn new(participants: Vec<String>, width: u32, height: u32, seed: u64) -> Self {
        let time_limit = Some(Self::default_time_limit(participants.len(), width, height));
        MatchParameters {
            participants,
            width,
            height,
            seed,
            time_limit,
        }
    }

    /// Replace the time limit (`None` disables it).
    pub fn with_time_limit(mut self, time_limit: Option<Duration>) -> Self {
        self.time_limit = time_limit;
        self
    }

    /// Number of players in this match.
    pub fn num_players(&self) -> usize {
        self.participants.len()
    }

    /// Standard budget: `2 × players × sqrt(width × height)` seconds.
    pub fn default_time_limit(num_players: usize, width: u32, height: u32) -> Duration {
        let area = f64::from(width) * f64::from(height);
        Duration::from_secs_f64(2.0 * num_players as f64 * area.sqrt())
    }
}

/// Structured result of one completed invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    /// Rank per participant, indexed by 0-based player index (1 = best).
    /// Always exactly one entry per participant.
    pub ranking: Vec<u32>,
    /// Replay artifact location. After archival this is the archive path.
    pub replay_file: String,
    /// Raw timeout/misbehavior tokens reported by the engine.
    pub timeouts: Vec<String>,
    /// Raw engine exit status.
    pub exit_code: i32,
}

/// Run one full match: invoke the engine, decode its output, archive the
/// replay.
///
/// # Errors
///
/// - [`Error::EngineTimeout`] if the time budget elapses (hard failure),
/// - [`Error::EngineExecution`] if the engine exits non-zero,
/// - [`Error::MalformedOutput`] if stdout violates the line schema,
/// - [`Error::ReplayArchival`] if the replay cannot be moved; the match is
///   considered failed in that case, even though the engine adjudicated it.
#[instrument(skip_all, fields(seed = params.seed, players = params.num_players()))]
pub fn run_match(
    engine_binary: impl AsRef<Path>,
    params: &MatchParameters,
    replay_dir: impl AsRef<Path>,
) -> Result<MatchOutcome> {
    let output = engine::invoke(engine_binary.as_ref(), params)?;
    if output.exit_code != 0 {
        return Err(Error::EngineExecution {
            code: output.exit_code,
        });
    }

    let mut outcome = parser::parse_match_output(&output.stdout, params.num_players())?;
    outcome.exit_code = output.exit_code;
    outcome.replay_file = archive_replay(&outcome.replay_file, replay_dir.as_ref())?;
    debug!(replay = %outcome.replay_file, ranking = ?outcome.ranking);
    Ok(outcome)
}

/// Human-readable match report. Pure formatting, no side effects.
pub fn summarize(params: &MatchParameters, outcome: &MatchOutcome) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "Match between {}", params.participants.join(", "));
    let _ = writeln!(text, "dimensions = {}, {}", params.width, params.height);
    for (index, rank) in outcome.ranking.iter().enumerate() {
        let _ = writeln!(text, "player {}: rank {}", index + 1, rank);
    }
    let _ = writeln!(text, "replay: {}", outcome.replay_file);
    text
}

/// Move the replay named by the engine into `archive`, overwriting any
/// existing entry with the same name. Returns the archived path.
fn archive_replay(replay: &str, archive: &Path) -> Result<String> {
    let archival_error = |source| Error::ReplayArchival {
        replay: replay.into(),
        source,
    };

    let file_name = Path::new(replay).file_name().ok_or_else(|| {
        archival_error(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "replay path has no file name",
        ))
    })?;
    let destination = archive.join(file_name);

    if fs::rename(replay, &destination).is_err() {
        // rename cannot cross filesystems
        fs::copy(replay, &destination)
            .and_then(|_| fs::remove_file(replay))
            .map_err(archival_error)?;
    }
    Ok(destination.to_string_lossy().into_owned())
}
