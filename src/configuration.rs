//! Config for the round scheduler behaviors.
//!
//! Configuration can be created programmatically using [`Configuration::new()`]
//! or by reading environment variables using [`Configuration::from_env()`].
//!
//! # Environment Variables
//!
//! All values are optional. Flags are enabled by setting the value to
//! `"true"` (case-insensitive); numbers that do not parse fall back to the
//! default.
//!
//! - `MANAGER_VERBOSE` — Print match summaries to stdout (default: `true`)
//! - `MANAGER_LOG` — Enable logging to a file (default: `false`)
//! - `MANAGER_ABORT_ON_ERROR` — Abort the run on the first failed match
//!   instead of logging and continuing (default: `false`)
//! - `MANAGER_ROUNDS` — Number of rounds to run (default: `1`)
//! - `MANAGER_SIZE_MIN` / `MANAGER_SIZE_MAX` — Map side bounds, in cells;
//!   sides are drawn on a granularity of 5 (defaults: `20` / `50`)
//! - `MANAGER_REPLAY_DIR` — Replay archive directory (default: `replays`)

use std::path::PathBuf;

/// Configuration for scheduler behaviors.
#[derive(Debug, Clone)]
pub struct Configuration {
    pub(crate) verbose: bool,
    pub(crate) log: bool,
    pub(crate) abort_on_error: bool,
    pub(crate) rounds: u32,
    pub(crate) size_min: u32,
    pub(crate) size_max: u32,
    pub(crate) replay_dir: PathBuf,
}

impl Configuration {
    /// Create a new configuration with default parameters.
    ///
    /// By default:
    /// - Match summaries are printed to stdout.
    /// - Logging to file is disabled.
    /// - A failed match is logged and the run continues.
    /// - One round is run per invocation.
    /// - Map sides are drawn from 20 to 50 cells.
    /// - Replays are archived under `replays/`.
    pub fn new() -> Self {
        Self {
            verbose: true,
            log: false,
            abort_on_error: false,
            rounds: 1,
            size_min: 20,
            size_max: 50,
            replay_dir: PathBuf::from("replays"),
        }
    }

    /// Create configuration from environment variables (see module docs).
    /// Unset or unparsable variables use the default value for each field.
    pub fn from_env() -> Self {
        fn get_env_flag(var: &str, default: bool) -> bool {
            match std::env::var(var) {
                Ok(val) => val.eq_ignore_ascii_case("true"),
                Err(_) => default,
            }
        }
        fn get_env_number(var: &str, default: u32) -> u32 {
            std::env::var(var)
                .ok()
                .and_then(|val| val.parse().ok())
                .unwrap_or(default)
        }

        let defaults = Self::new();
        Self {
            verbose: get_env_flag("MANAGER_VERBOSE", defaults.verbose),
            log: get_env_flag("MANAGER_LOG", defaults.log),
            abort_on_error: get_env_flag("MANAGER_ABORT_ON_ERROR", defaults.abort_on_error),
            rounds: get_env_number("MANAGER_ROUNDS", defaults.rounds),
            size_min: get_env_number("MANAGER_SIZE_MIN", defaults.size_min),
            size_max: get_env_number("MANAGER_SIZE_MAX", defaults.size_max),
            replay_dir: std::env::var("MANAGER_REPLAY_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.replay_dir),
        }
    }

    /// Enable or disable match summaries on stdout.
    pub fn with_verbose(mut self, value: bool) -> Self {
        self.verbose = value;
        self
    }

    /// Enable or disable logging to file.
    pub fn with_log(mut self, value: bool) -> Self {
        self.log = value;
        self
    }

    /// Abort the whole run on the first failed match, instead of logging the
    /// failure and moving on to the next round.
    pub fn with_abort_on_error(mut self, value: bool) -> Self {
        self.abort_on_error = value;
        self
    }

    /// Number of rounds to run back-to-back.
    pub fn with_rounds(mut self, value: u32) -> Self {
        self.rounds = value;
        self
    }

    /// Inclusive map side bounds, in cells. Sides are drawn square, on a
    /// granularity of 5 cells.
    pub fn with_map_sizes(mut self, min: u32, max: u32) -> Self {
        self.size_min = min;
        self.size_max = max;
        self
    }

    /// Directory replays are archived into.
    pub fn with_replay_dir(mut self, value: impl Into<PathBuf>) -> Self {
        self.replay_dir = value.into();
        self
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}
