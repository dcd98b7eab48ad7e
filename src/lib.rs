//! # Halite Manager
//!
//! A match manager for the external Halite game engine: it runs scheduled
//! rounds of matches between registered agents, parses the engine's textual
//! output into structured outcomes, archives replays, and keeps a persistent
//! SQLite registry of players and completed games.
//!
//! It provides:
//! - Engine invocation with a wall-clock budget ([`engine`])
//! - A strict decoder for the engine's positional stdout schema ([`parser`])
//! - Single-match orchestration and replay archival ([`match_runner`])
//! - Random round scheduling over the active player pool ([`round_scheduler`])
//! - A durable player/game store ([`registry`])
//!
//! Matches run strictly sequentially: one engine subprocess at a time, run to
//! completion (or killed at its deadline) before the next round starts.
//!
//! # Documentation Overview
//!
//! - For the engine CLI grammar and stdout schema, see [`engine`] and
//!   [`parser`].
//! - For configuring round counts, map sizes, and failure policy, see
//!   [`Configuration`](crate::configuration::Configuration).
//! - For the store schema and operator-level operations (add, delete, list
//!   players), see [`Registry`](crate::registry::Registry).
//!
//! # Usage Example
//!
//! ```no_run
//! use halite_manager::prelude::*;
//!
//! fn main() -> halite_manager::Result<()> {
//!     let mut registry = Registry::open("manager.db")?;
//!     registry.add_player("orchid", "./orchid")?;
//!     registry.add_player("tulip", "./tulip")?;
//!
//!     let config = Configuration::new()
//!         .with_rounds(10)
//!         .with_map_sizes(20, 50)
//!         .with_replay_dir("replays");
//!
//!     let scheduler = RoundScheduler::new("./halite", config);
//!     let report = scheduler.run_rounds(&mut registry)?;
//!     println!("{} rounds recorded, {} abandoned", report.completed, report.failed);
//!
//!     for player in registry.list_all_players()? {
//!         println!("{}: skill {}", player.name, player.skill);
//!     }
//!     registry.close();
//!     Ok(())
//! }
//! ```
//!
//! The rating columns (`rank`, `skill`, `mu`, `sigma`, `gamesPlayed`) are
//! stored with defaults but never updated by the manager; they are reserved
//! for an external rating tool.
#![warn(missing_docs)]

pub mod configuration;
pub mod engine;
mod error;
mod logger;
pub mod match_runner;
pub mod parser;
pub mod registry;
pub mod round_scheduler;

pub use error::{Error, Result};

/// Commonly used types for quick access.
///
/// ```rust
/// use halite_manager::prelude::*;
/// ```
pub mod prelude {
    pub use crate::configuration::Configuration;
    pub use crate::match_runner::{MatchOutcome, MatchParameters};
    pub use crate::registry::{GameRecord, Player, Registry};
    pub use crate::round_scheduler::{RoundReport, RoundScheduler};
    pub use crate::{Error, Result};
}
