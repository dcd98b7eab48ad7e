//! End-to-end rounds against a shell-script stand-in for the engine binary.
#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use halite_manager::match_runner::run_match;
use halite_manager::prelude::*;

/// Fresh scratch directory for one test.
fn workspace(test: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("halite-manager-{test}-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_script(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("engine.sh");
    fs::write(&path, body).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Prints the two-player schema and drops a replay file next to itself.
/// Args are: "-d <w> <h>" -q "-s <seed>" <p1> <p2>
fn fake_engine(dir: &Path) -> PathBuf {
    write_script(
        dir,
        r#"#!/bin/sh
dir=$(dirname "$0")
echo "$4"
echo "$5"
replay="$dir/replay-$$.hlt"
: > "$replay"
echo "$replay $3"
echo "1 2"
echo "2 1"
echo ""
"#,
    )
}

fn registry_with_players(names: &[&str]) -> Registry {
    let mut registry = Registry::open_in_memory().unwrap();
    for name in names {
        registry.add_player(name, &format!("./{name}")).unwrap();
    }
    registry
}

#[test]
fn rounds_run_and_are_recorded() {
    let dir = workspace("rounds");
    let engine = fake_engine(&dir);
    let mut registry = registry_with_players(&["orchid", "tulip"]);

    let config = Configuration::new()
        .with_verbose(false)
        .with_rounds(3)
        .with_map_sizes(20, 20)
        .with_replay_dir(dir.join("replays"));
    let scheduler = RoundScheduler::new(&engine, config);

    let report = scheduler.run_rounds(&mut registry).unwrap();
    assert_eq!(report, RoundReport { completed: 3, failed: 0 });
    // store seeds at 1, so three games end at id 4
    assert_eq!(registry.last_game_id(), 4);

    let archived = fs::read_dir(dir.join("replays")).unwrap().count();
    assert_eq!(archived, 3);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn one_active_player_fails_before_any_spawn() {
    let dir = workspace("lonely");
    let mut registry = registry_with_players(&["orchid"]);

    let config = Configuration::new()
        .with_verbose(false)
        .with_replay_dir(dir.join("replays"));
    // binary that does not exist: it must never be reached
    let scheduler = RoundScheduler::new(dir.join("no-such-engine"), config);

    let result = scheduler.run_rounds(&mut registry);
    assert!(matches!(
        result,
        Err(Error::InsufficientPlayers { available: 1, required: 2 })
    ));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn failed_matches_are_logged_and_skipped() {
    let dir = workspace("skip");
    let engine = write_script(&dir, "#!/bin/sh\nexit 3\n");
    let mut registry = registry_with_players(&["orchid", "tulip"]);

    let config = Configuration::new()
        .with_verbose(false)
        .with_rounds(2)
        .with_replay_dir(dir.join("replays"));
    let scheduler = RoundScheduler::new(&engine, config);

    let report = scheduler.run_rounds(&mut registry).unwrap();
    assert_eq!(report, RoundReport { completed: 0, failed: 2 });
    assert_eq!(registry.last_game_id(), 1, "no game may be recorded");

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn abort_on_error_stops_the_run() {
    let dir = workspace("abort");
    let engine = write_script(&dir, "#!/bin/sh\nexit 3\n");
    let mut registry = registry_with_players(&["orchid", "tulip"]);

    let config = Configuration::new()
        .with_verbose(false)
        .with_rounds(5)
        .with_abort_on_error(true)
        .with_replay_dir(dir.join("replays"));
    let scheduler = RoundScheduler::new(&engine, config);

    let result = scheduler.run_rounds(&mut registry);
    assert!(matches!(result, Err(Error::EngineExecution { code: 3 })));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn stuck_engine_hits_the_time_budget() {
    let dir = workspace("stuck");
    let engine = write_script(&dir, "#!/bin/sh\nsleep 10\n");

    let params = MatchParameters::new(
        vec!["./orchid".to_string(), "./tulip".to_string()],
        20,
        20,
        4242,
    )
    .with_time_limit(Some(Duration::from_millis(100)));

    let result = run_match(&engine, &params, dir.join("replays"));
    assert!(matches!(result, Err(Error::EngineTimeout { .. })));

    fs::remove_dir_all(&dir).unwrap();
}
