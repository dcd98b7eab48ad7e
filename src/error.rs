use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Everything that can go wrong while running, parsing or recording a match.
///
/// Per-match failures (`EngineExecution`, `EngineTimeout`, `MalformedOutput`,
/// `ReplayArchival`) abandon the current round only; registry and selection
/// failures (`InsufficientPlayers`, `DuplicateName`) are surfaced directly to
/// the caller. Nothing is retried automatically.
#[derive(Debug, Error)]
pub enum Error {
    /// The engine exited with a non-zero status.
    #[error("engine exited with status {code}")]
    EngineExecution {
        /// Raw process exit code.
        code: i32,
    },

    /// The engine did not finish within its wall-clock budget. The process
    /// has been killed and reaped; no partial output is reported.
    #[error("engine exceeded its time budget of {limit:?}")]
    EngineTimeout {
        /// The budget that was exceeded.
        limit: Duration,
    },

    /// The engine stdout did not follow the expected line schema.
    #[error("malformed engine output: {0}")]
    MalformedOutput(String),

    /// Not enough active players are registered to fill a match.
    #[error("{available} active player(s) available, at least {required} required")]
    InsufficientPlayers {
        /// Number of active players found in the registry.
        available: usize,
        /// Minimum required to run a match.
        required: usize,
    },

    /// A player with this name is already registered.
    #[error("player '{0}' is already registered")]
    DuplicateName(String),

    /// The replay named by the engine could not be moved into the archive.
    #[error("could not archive replay {replay:?}")]
    ReplayArchival {
        /// Replay path as reported by the engine.
        replay: PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: std::io::Error,
    },

    /// Underlying SQLite failure in the registry.
    #[error("registry error")]
    Storage(#[from] rusqlite::Error),

    /// I/O failure while spawning or waiting on the engine process.
    #[error("engine process i/o error")]
    Io(#[from] std::io::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
