use halite_manager::prelude::*;

fn sample_params(paths: &[&str]) -> MatchParameters {
    MatchParameters::new(paths.iter().map(|p| p.to_string()).collect(), 30, 30, 777)
}

fn sample_outcome(num_players: usize) -> MatchOutcome {
    MatchOutcome {
        ranking: (1..=num_players as u32).collect(),
        replay_file: "replays/777.hlt".to_string(),
        timeouts: vec![],
        exit_code: 0,
    }
}

#[test]
fn game_ids_are_monotonic_from_an_empty_store() -> anyhow::Result<()> {
    let mut registry = Registry::open_in_memory()?;
    assert_eq!(registry.last_game_id(), 1);

    let params = sample_params(&["./orchid", "./tulip"]);
    let outcome = sample_outcome(2);
    for expected_id in 2..=5 {
        let record = registry.record_game(&params, &outcome)?;
        assert_eq!(record.id, expected_id);
        assert_eq!(record.turns, 0);
    }
    assert_eq!(registry.last_game_id(), 5);
    Ok(())
}

#[test]
fn game_id_counter_survives_a_reopen() -> anyhow::Result<()> {
    let db = std::env::temp_dir().join(format!("halite-manager-reopen-{}.db", std::process::id()));
    let _ = std::fs::remove_file(&db);

    let params = sample_params(&["./orchid", "./tulip"]);
    let outcome = sample_outcome(2);
    {
        let mut registry = Registry::open(&db)?;
        registry.record_game(&params, &outcome)?;
        registry.record_game(&params, &outcome)?;
        registry.close();
    }

    let mut registry = Registry::open(&db)?;
    assert_eq!(registry.last_game_id(), 3);
    let record = registry.record_game(&params, &outcome)?;
    assert_eq!(record.id, 4);

    registry.close();
    std::fs::remove_file(&db)?;
    Ok(())
}

#[test]
fn duplicate_names_are_rejected_without_a_partial_write() -> anyhow::Result<()> {
    let mut registry = Registry::open_in_memory()?;
    registry.add_player("orchid", "./orchid")?;

    let second = registry.add_player("orchid", "./elsewhere/orchid");
    assert!(matches!(second, Err(Error::DuplicateName(name)) if name == "orchid"));

    let rows = registry.list_all_players()?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].path, "./orchid");
    Ok(())
}

#[test]
fn deleting_an_absent_player_is_a_no_op() -> anyhow::Result<()> {
    let mut registry = Registry::open_in_memory()?;
    registry.add_player("orchid", "./orchid")?;

    registry.delete_player("nobody")?;
    assert_eq!(registry.list_all_players()?.len(), 1);

    registry.delete_player("orchid")?;
    assert!(registry.list_all_players()?.is_empty());
    Ok(())
}

#[test]
fn find_players_matches_any_given_name() -> anyhow::Result<()> {
    let mut registry = Registry::open_in_memory()?;
    registry.add_player("orchid", "./orchid")?;
    registry.add_player("tulip", "./tulip")?;
    registry.add_player("fern", "./fern")?;

    let mut found: Vec<String> = registry
        .find_players(&["orchid", "fern", "nobody"])?
        .into_iter()
        .map(|p| p.name)
        .collect();
    found.sort();
    assert_eq!(found, ["fern", "orchid"]);

    assert!(registry.find_players(&[])?.is_empty());
    Ok(())
}
