//! Durable store for player records and completed games.
//!
//! One SQLite connection, owned by [`Registry`], opened once and kept for the
//! whole run. The round scheduler is the sole writer and runs sequentially,
//! so no write ever races another; game writes are still transactional so an
//! interrupted round commits nothing.
//!
//! Schema creation is explicit and idempotent (`CREATE TABLE IF NOT EXISTS`);
//! close errors are logged, never swallowed.

use std::path::Path;

use rusqlite::{params, Connection, Row};
use tracing::{error, info, instrument};

use crate::error::{Error, Result};
use crate::match_runner::{MatchOutcome, MatchParameters};

/// Rating-field defaults for a freshly registered player. These are reserved
/// fields: the manager stores them but never updates them.
const DEFAULT_RANK: i64 = 1000;
const DEFAULT_SKILL: f64 = 0.0;
const DEFAULT_MU: f64 = 50.0;
const DEFAULT_SIGMA: f64 = 50.0 / 3.0;

/// The game id counter starts here on an empty store; the first recorded game
/// gets `SEED_GAME_ID + 1`.
const SEED_GAME_ID: i64 = 1;

const PLAYER_COLUMNS: &str =
    "id, name, path, lastSeen, rank, skill, mu, sigma, gamesPlayed, active";

/// A registered competing agent.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    /// Row id.
    pub id: i64,
    /// Unique registry name.
    pub name: String,
    /// Executable path/command used to launch the agent. May be stale; the
    /// manager does not validate it.
    pub path: String,
    /// Unix timestamp of the last registration or update.
    pub last_seen: i64,
    /// Reserved rating field.
    pub rank: i64,
    /// Reserved rating field; display ordering key.
    pub skill: f64,
    /// Reserved rating field.
    pub mu: f64,
    /// Reserved rating field.
    pub sigma: f64,
    /// Reserved counter field.
    pub games_played: i64,
    /// Only active players are eligible for round selection.
    pub active: bool,
}

impl Player {
    /// Typed row decoding; the single place where column order matters.
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Player> {
        Ok(Player {
            id: row.get(0)?,
            name: row.get(1)?,
            path: row.get(2)?,
            last_seen: row.get(3)?,
            rank: row.get(4)?,
            skill: row.get(5)?,
            mu: row.get(6)?,
            sigma: row.get(7)?,
            games_played: row.get(8)?,
            active: row.get::<_, i64>(9)? > 0,
        })
    }
}

/// One completed round, as persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRecord {
    /// Monotonic synthetic id.
    pub id: i64,
    /// Participant path list, comma-joined in player order.
    pub players: String,
    /// Engine map seed of the match.
    pub map_seed: u64,
    /// Unix completion timestamp.
    pub completed_at: i64,
    /// Reserved field, always 0 for now.
    pub turns: i64,
}

/// Persistent player and game store backed by SQLite.
pub struct Registry {
    conn: Connection,
    last_game_id: i64,
}

impl Registry {
    /// Open (or create) the store at `path`.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Registry> {
        Self::from_connection(Connection::open(path)?)
    }

    /// In-memory store, mainly for tests.
    pub fn open_in_memory() -> Result<Registry> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Registry> {
        create_schema(&conn)?;
        let last_game_id = conn.query_row(
            "SELECT COALESCE(MAX(id), ?1) FROM games",
            [SEED_GAME_ID],
            |row| row.get(0),
        )?;
        info!(last_game_id);
        Ok(Registry { conn, last_game_id })
    }

    /// Register a new player with rating defaults.
    ///
    /// # Errors
    /// [`Error::DuplicateName`] if the name is already taken; nothing is
    /// written in that case.
    pub fn add_player(&mut self, name: &str, path: &str) -> Result<()> {
        let taken: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM players WHERE name = ?1)",
            [name],
            |row| row.get(0),
        )?;
        if taken {
            return Err(Error::DuplicateName(name.to_string()));
        }
        self.conn.execute(
            "INSERT INTO players (name, path, lastSeen, rank, skill, mu, sigma, gamesPlayed, active)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 1)",
            params![
                name,
                path,
                unix_now(),
                DEFAULT_RANK,
                DEFAULT_SKILL,
                DEFAULT_MU,
                DEFAULT_SIGMA,
                0i64,
            ],
        )?;
        Ok(())
    }

    /// Remove a player by name. Removing an absent name is a no-op.
    pub fn delete_player(&mut self, name: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM players WHERE name = ?1", [name])?;
        Ok(())
    }

    /// All players whose name matches any of `names`.
    pub fn find_players(&self, names: &[&str]) -> Result<Vec<Player>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; names.len()].join(", ");
        let sql =
            format!("SELECT {PLAYER_COLUMNS} FROM players WHERE name IN ({placeholders})");
        let mut stmt = self.conn.prepare(&sql)?;
        let players = stmt
            .query_map(rusqlite::params_from_iter(names), Player::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(players)
    }

    /// Players eligible for round selection.
    pub fn list_active_players(&self) -> Result<Vec<Player>> {
        self.select_players(&format!(
            "SELECT {PLAYER_COLUMNS} FROM players WHERE active > 0"
        ))
    }

    /// Every registered player, best skill first. Display tooling only.
    pub fn list_all_players(&self) -> Result<Vec<Player>> {
        self.select_players(&format!(
            "SELECT {PLAYER_COLUMNS} FROM players ORDER BY skill DESC"
        ))
    }

    fn select_players(&self, sql: &str) -> Result<Vec<Player>> {
        let mut stmt = self.conn.prepare(sql)?;
        let players = stmt
            .query_map([], Player::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(players)
    }

    /// Persist one completed round and advance the id counter.
    ///
    /// All-or-nothing: the insert runs in a transaction and the counter only
    /// advances after commit.
    pub fn record_game(
        &mut self,
        params: &MatchParameters,
        _outcome: &MatchOutcome,
    ) -> Result<GameRecord> {
        let record = GameRecord {
            id: self.last_game_id + 1,
            players: params.participants.join(", "),
            map_seed: params.seed,
            completed_at: unix_now(),
            turns: 0,
        };
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO games (id, players, mapSeed, completedAt, turns)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.id,
                record.players,
                record.map_seed as i64,
                record.completed_at,
                record.turns,
            ],
        )?;
        tx.commit()?;
        self.last_game_id = record.id;
        Ok(record)
    }

    /// Highest game id seen by this store (the seed value on an empty store).
    pub fn last_game_id(&self) -> i64 {
        self.last_game_id
    }

    /// Close the connection explicitly; a failure is logged rather than lost.
    /// Dropping the registry also closes the connection, but silently.
    pub fn close(self) {
        if let Err((_conn, e)) = self.conn.close() {
            error!("registry close failed: {e}");
        }
    }
}

fn create_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS players (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT    NOT NULL UNIQUE,
            path        TEXT    NOT NULL,
            lastSeen    INTEGER NOT NULL,
            rank        INTEGER NOT NULL DEFAULT 1000,
            skill       REAL    NOT NULL DEFAULT 0.0,
            mu          REAL    NOT NULL DEFAULT 50.0,
            sigma       REAL    NOT NULL DEFAULT 16.666666666666668,
            gamesPlayed INTEGER NOT NULL DEFAULT 0,
            active      INTEGER NOT NULL DEFAULT 1
        );
        CREATE TABLE IF NOT EXISTS games (
            id          INTEGER NOT NULL,
            players     TEXT    NOT NULL,
            mapSeed     INTEGER NOT NULL,
            completedAt INTEGER NOT NULL,
            turns       INTEGER NOT NULL DEFAULT 0
        );",
    )
}

fn unix_now() -> i64 {
    time::OffsetDateTime::now_utc().unix_timestamp()
}
