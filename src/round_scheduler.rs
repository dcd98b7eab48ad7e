//! Round scheduling: who plays whom, on what map, and what gets recorded.
//!
//! Each round pulls the active player set from the [`Registry`], draws a
//! participant subset and a square map, runs one match to completion, and
//! persists the validated outcome. Matches run strictly back-to-back; there
//! is no concurrency at this level.
//!
//! Failure policy: a failed match (crash, timeout, malformed output, replay
//! loss) abandons that round only — it is logged and the run continues with
//! the next round. Set [`Configuration::with_abort_on_error`] to abort the
//! whole run instead. Fewer than two active players is always fatal to the
//! run, and is detected before any subprocess is spawned.

use std::ops::Range;
use std::path::PathBuf;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{info, instrument, trace, warn};

use crate::configuration::Configuration;
use crate::error::{Error, Result};
use crate::logger::init_logger;
use crate::match_runner::{run_match, summarize, MatchParameters};
use crate::registry::{Player, Registry};

/// A match needs at least this many participants.
pub const MIN_PLAYERS_PER_MATCH: usize = 2;

/// Map sides are drawn in buckets of this many cells.
const MAP_GRANULARITY: u32 = 5;

/// Engine seed range; the value only matters for engine-level
/// reproducibility.
const SEED_RANGE: Range<u64> = 10_000..2_073_741_824;

/// Tally of a finished run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RoundReport {
    /// Rounds whose outcome was recorded.
    pub completed: u32,
    /// Rounds abandoned because their match failed.
    pub failed: u32,
}

/// Runs rounds of engine matches over the registered player pool.
pub struct RoundScheduler {
    engine_binary: PathBuf,
    config: Configuration,
}

impl RoundScheduler {
    /// Create a scheduler driving the engine at `engine_binary`.
    pub fn new(engine_binary: impl Into<PathBuf>, config: Configuration) -> RoundScheduler {
        if config.log {
            init_logger();
        }
        trace!(?config);
        RoundScheduler {
            engine_binary: engine_binary.into(),
            config,
        }
    }

    /// Run the configured number of rounds, recording each completed match
    /// through `registry`.
    ///
    /// The round counter advances exactly once per iteration whether or not
    /// the match succeeded (unless aborting on error).
    ///
    /// # Errors
    /// [`Error::InsufficientPlayers`] if fewer than two active players are
    /// registered when a round starts; storage errors; any match error when
    /// `abort_on_error` is set.
    #[instrument(skip_all, fields(rounds = self.config.rounds))]
    pub fn run_rounds(&self, registry: &mut Registry) -> Result<RoundReport> {
        std::fs::create_dir_all(&self.config.replay_dir)?;

        let mut report = RoundReport::default();
        let mut rng = rand::thread_rng();
        for round in 0..self.config.rounds {
            let active = registry.list_active_players()?;
            if active.len() < MIN_PLAYERS_PER_MATCH {
                return Err(Error::InsufficientPlayers {
                    available: active.len(),
                    required: MIN_PLAYERS_PER_MATCH,
                });
            }

            let params = self.next_match(&mut rng, &active);
            info!(round, participants = ?params.participants, width = params.width, seed = params.seed);

            match run_match(&self.engine_binary, &params, &self.config.replay_dir) {
                Ok(outcome) => {
                    let record = registry.record_game(&params, &outcome)?;
                    trace!(game_id = record.id);
                    if self.config.verbose {
                        println!("{}", summarize(&params, &outcome));
                    }
                    report.completed += 1;
                }
                Err(e) if self.config.abort_on_error => return Err(e),
                Err(e) => {
                    warn!(round, "match abandoned: {e}");
                    report.failed += 1;
                }
            }
        }
        Ok(report)
    }

    /// Draw the next round's parameters from the active pool.
    fn next_match(&self, rng: &mut impl Rng, active: &[Player]) -> MatchParameters {
        let count = rng.gen_range(MIN_PLAYERS_PER_MATCH..=active.len());
        let picked =
            pick_players(rng, active.len(), count).expect("count is bounded by the pool size");
        let participants = picked.iter().map(|&i| active[i].path.clone()).collect();

        let side = pick_map_size(rng, self.config.size_min, self.config.size_max);
        let seed = rng.gen_range(SEED_RANGE);
        MatchParameters::new(participants, side, side, seed)
    }
}

/// Uniformly sample `num` distinct player indices out of `available`, as a
/// random permutation prefix.
///
/// # Errors
/// [`Error::InsufficientPlayers`] unless
/// `MIN_PLAYERS_PER_MATCH <= num <= available`.
pub fn pick_players(rng: &mut impl Rng, available: usize, num: usize) -> Result<Vec<usize>> {
    if num < MIN_PLAYERS_PER_MATCH || num > available {
        return Err(Error::InsufficientPlayers {
            available,
            required: num.max(MIN_PLAYERS_PER_MATCH),
        });
    }
    let mut indices: Vec<usize> = (0..available).collect();
    let (picked, _rest) = indices.partial_shuffle(rng, num);
    Ok(picked.to_vec())
}

/// Square map side: a bucket drawn uniformly from
/// `[size_min / 5, size_max / 5]`, times 5. Degenerate bounds are clamped to
/// the smallest legal bucket so the side never reaches zero.
fn pick_map_size(rng: &mut impl Rng, size_min: u32, size_max: u32) -> u32 {
    let low = (size_min / MAP_GRANULARITY).max(1);
    let high = (size_max / MAP_GRANULARITY).max(low);
    rng.gen_range(low..=high) * MAP_GRANULARITY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picked_players_are_distinct_and_in_range() {
        let mut rng = rand::thread_rng();
        let available = 5;
        for num in MIN_PLAYERS_PER_MATCH..=available {
            let picked = pick_players(&mut rng, available, num).unwrap();
            assert_eq!(picked.len(), num);
            assert!(picked.iter().all(|&i| i < available));
            let mut sorted = picked.clone();
            sorted.sort_unstable();
            sorted.dedup();
            assert_eq!(sorted.len(), num, "duplicate index in {picked:?}");
        }
    }

    #[test]
    fn picking_more_players_than_available_fails() {
        let mut rng = rand::thread_rng();
        let result = pick_players(&mut rng, 5, 6);
        assert!(matches!(
            result,
            Err(Error::InsufficientPlayers { available: 5, required: 6 })
        ));
    }

    #[test]
    fn picking_fewer_than_a_pair_fails() {
        let mut rng = rand::thread_rng();
        assert!(pick_players(&mut rng, 5, 1).is_err());
        assert!(pick_players(&mut rng, 5, 0).is_err());
    }

    #[test]
    fn single_bucket_always_yields_the_same_side() {
        let mut rng = rand::thread_rng();
        for _ in 0..20 {
            assert_eq!(pick_map_size(&mut rng, 20, 20), 20);
        }
    }

    #[test]
    fn sides_stay_on_the_granularity_grid() {
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            let side = pick_map_size(&mut rng, 20, 50);
            assert_eq!(side % MAP_GRANULARITY, 0);
            assert!((20..=50).contains(&side));
        }
    }

    #[test]
    fn degenerate_bounds_are_clamped() {
        let mut rng = rand::thread_rng();
        assert_eq!(pick_map_size(&mut rng, 0, 0), MAP_GRANULARITY);
        assert_eq!(pick_map_size(&mut rng, 7, 3), MAP_GRANULARITY);
    }
}
