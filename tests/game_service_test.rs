//! End-to-end tests for the game service against a real SQLite file.

use std::time::Duration;

use tempfile::NamedTempFile;

use tictactoe_backend::{
    Cell, GameError, GameRepository, GameService, GameStatus, GameUpdate, Mark, MoveError,
    NewMove,
};

fn setup_service() -> (NamedTempFile, GameService) {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();
    let repo =
        GameRepository::open(db_path, Duration::from_secs(5)).expect("Failed to open repository");
    (db_file, GameService::new(repo))
}

fn play_all(service: &GameService, game_id: i32, positions: &[i32]) -> tictactoe_backend::GameState {
    let mut state = service.get_game(game_id).expect("Game missing");
    for &position in positions {
        state = service
            .submit_move(game_id, position, None)
            .unwrap_or_else(|e| panic!("Move at {} failed: {}", position, e));
    }
    state
}

#[test]
fn test_new_game_is_empty_and_in_progress() {
    let (_db, service) = setup_service();
    let game = service.create_game(None, None).expect("Create failed");
    assert!(game.board().cells().iter().all(|c| c.is_empty()));
    assert_eq!(*game.status(), GameStatus::InProgress);
    assert!(game.winner().is_none());
    assert!(game.finished_at().is_none());
}

#[test]
fn test_moves_without_a_line_stay_in_progress() {
    let (_db, service) = setup_service();
    let game = service.create_game(None, None).expect("Create failed");
    let state = play_all(&service, *game.id(), &[0, 4, 1, 2, 8]);

    assert_eq!(*state.status(), GameStatus::InProgress);
    assert!(state.winner().is_none());
    for pos in [3, 5, 6, 7] {
        assert_eq!(state.board().get(pos), Some(Cell::Empty));
    }
    assert_eq!(state.board().get(8), Some(Cell::Marked(Mark::X)));
    assert_eq!(state.board().get(2), Some(Cell::Marked(Mark::O)));
}

#[test]
fn test_top_row_wins_and_locks_game() {
    let (_db, service) = setup_service();
    let game = service.create_game(None, None).expect("Create failed");
    let id = *game.id();
    let state = play_all(&service, id, &[0, 3, 1, 4, 2]);

    assert_eq!(*state.status(), GameStatus::Won(Mark::X));
    assert_eq!(state.winner(), Some(Mark::X));
    assert!(state.finished_at().is_some());

    let err = service
        .submit_move(id, 8, None)
        .expect_err("Finished game must refuse moves");
    assert!(matches!(err, GameError::Move(MoveError::GameNotInProgress)));
    assert_eq!(service.history(id).expect("History failed").len(), 5);
}

#[test]
fn test_full_board_without_line_is_draw() {
    let (_db, service) = setup_service();
    let game = service.create_game(None, None).expect("Create failed");
    // Ends as XOX/XOO/OXX.
    let state = play_all(&service, *game.id(), &[0, 1, 2, 4, 3, 5, 7, 6, 8]);
    assert_eq!(*state.status(), GameStatus::Draw);
    assert!(state.winner().is_none());
    assert!(state.finished_at().is_some());
}

#[test]
fn test_occupied_cell_leaves_game_unchanged() {
    let (_db, service) = setup_service();
    let game = service.create_game(None, None).expect("Create failed");
    let id = *game.id();
    let before = play_all(&service, id, &[4]);

    let err = service
        .submit_move(id, 4, None)
        .expect_err("Occupied cell must be refused");
    assert!(matches!(err, GameError::Move(MoveError::CellOccupied(4))));

    let after = service.get_game(id).expect("Game missing");
    assert_eq!(after.board(), before.board());
    assert_eq!(service.history(id).expect("History failed").len(), 1);
}

#[test]
fn test_out_of_range_position_is_rejected() {
    let (_db, service) = setup_service();
    let game = service.create_game(None, None).expect("Create failed");
    for position in [-1, 9] {
        let err = service
            .submit_move(*game.id(), position, None)
            .expect_err("Out of range must be refused");
        assert!(matches!(
            err,
            GameError::Move(MoveError::PositionOutOfRange(p)) if p == position
        ));
    }
}

#[test]
fn test_unknown_game_is_not_found() {
    let (_db, service) = setup_service();
    assert!(matches!(
        service.submit_move(404, 0, None),
        Err(GameError::GameNotFound(404))
    ));
    assert!(matches!(service.get_game(404), Err(GameError::GameNotFound(404))));
    assert!(matches!(service.history(404), Err(GameError::GameNotFound(404))));
}

#[test]
fn test_wrong_turn_is_enforced_for_assigned_slots() {
    let (_db, service) = setup_service();
    let alice = service
        .create_player("alice".to_string(), None)
        .expect("Create failed");
    let bob = service
        .create_player("bob".to_string(), None)
        .expect("Create failed");
    let game = service
        .create_game(Some(*alice.id()), Some(*bob.id()))
        .expect("Create failed");
    let id = *game.id();

    let err = service
        .submit_move(id, 0, Some(*bob.id()))
        .expect_err("Bob does not hold X");
    assert!(matches!(err, GameError::Move(MoveError::WrongTurn(Mark::X))));

    service
        .submit_move(id, 0, Some(*alice.id()))
        .expect("Alice holds X");
    // Anonymous moves are accepted even when slots are assigned.
    let state = service.submit_move(id, 4, None).expect("Anonymous move");
    assert_eq!(state.board().get(4), Some(Cell::Marked(Mark::O)));
}

#[test]
fn test_unassigned_slot_accepts_any_player() {
    let (_db, service) = setup_service();
    let alice = service
        .create_player("alice".to_string(), None)
        .expect("Create failed");
    let carol = service
        .create_player("carol".to_string(), None)
        .expect("Create failed");
    let game = service
        .create_game(Some(*alice.id()), None)
        .expect("Create failed");
    let id = *game.id();

    service
        .submit_move(id, 0, Some(*alice.id()))
        .expect("Alice holds X");
    let state = service
        .submit_move(id, 1, Some(*carol.id()))
        .expect("O slot is open");
    assert_eq!(state.board().get(1), Some(Cell::Marked(Mark::O)));

    let history = service.history(id).expect("History failed");
    assert_eq!(*history[1].player_id(), Some(*carol.id()));
}

#[test]
fn test_unknown_acting_player_is_not_found() {
    let (_db, service) = setup_service();
    let game = service.create_game(None, None).expect("Create failed");
    let err = service
        .submit_move(*game.id(), 0, Some(999))
        .expect_err("Unknown player must be refused");
    assert!(matches!(err, GameError::PlayerNotFound(999)));
    assert!(
        service
            .history(*game.id())
            .expect("History failed")
            .is_empty()
    );
}

#[test]
fn test_history_is_oldest_first() {
    let (_db, service) = setup_service();
    let game = service.create_game(None, None).expect("Create failed");
    play_all(&service, *game.id(), &[8, 0, 6]);

    let history = service.history(*game.id()).expect("History failed");
    let entries: Vec<(i32, &str)> = history
        .iter()
        .map(|m| (*m.position(), m.mark().as_str()))
        .collect();
    assert_eq!(entries, [(8, "X"), (0, "O"), (6, "X")]);
}

#[test]
fn test_stale_commit_is_a_conflict() {
    let (_db, service) = setup_service();
    let game = service.create_game(None, None).expect("Create failed");
    let id = *game.id();
    let empty = "         ";

    // Simulates a second writer that validated against the empty board.
    service.submit_move(id, 0, None).expect("First move");
    let err = service
        .repository()
        .commit_move(
            id,
            empty,
            GameUpdate::new("X        ".to_string(), "in_progress".to_string(), None, None),
            NewMove::new(id, None, 0, "X".to_string()),
        )
        .expect_err("Stale writer must lose");
    assert!(err.is_conflict());
    assert_eq!(service.history(id).expect("History failed").len(), 1);
}

#[test]
fn test_concurrent_moves_place_one_mark_per_turn() {
    let (_db, service) = setup_service();
    let game = service.create_game(None, None).expect("Create failed");
    let id = *game.id();

    let handles: Vec<_> = (0..4)
        .map(|position| {
            let service = service.clone();
            std::thread::spawn(move || service.submit_move(id, position, None))
        })
        .collect();
    let results: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("Thread panicked"))
        .collect();

    for result in &results {
        if let Err(e) = result {
            assert!(
                matches!(e, GameError::PersistenceConflict(_)),
                "Unexpected error: {}",
                e
            );
        }
    }

    let state = service.get_game(id).expect("Game missing");
    let x = state.board().count(Mark::X);
    let o = state.board().count(Mark::O);
    assert!(x == o || x == o + 1);
    assert_eq!(
        service.history(id).expect("History failed").len(),
        x + o
    );
}

#[test]
fn test_username_taken() {
    let (_db, service) = setup_service();
    service
        .create_player("dave".to_string(), Some("Dave".to_string()))
        .expect("Create failed");
    let err = service
        .create_player("dave".to_string(), None)
        .expect_err("Duplicate must fail");
    assert!(matches!(err, GameError::UsernameTaken(name) if name == "dave"));
}

#[test]
fn test_username_length_is_validated() {
    let (_db, service) = setup_service();
    assert!(matches!(
        service.create_player(String::new(), None),
        Err(GameError::InvalidInput(_))
    ));
    assert!(matches!(
        service.create_player("x".repeat(51), None),
        Err(GameError::InvalidInput(_))
    ));
    assert!(matches!(
        service.create_player("ok".to_string(), Some("y".repeat(101))),
        Err(GameError::InvalidInput(_))
    ));
    service
        .create_player("x".repeat(50), None)
        .expect("Fifty characters is allowed");
}

#[test]
fn test_create_game_with_unknown_player() {
    let (_db, service) = setup_service();
    let err = service
        .create_game(None, Some(31))
        .expect_err("Unknown player must fail");
    assert!(matches!(err, GameError::PlayerNotFound(31)));
}

#[test]
fn test_same_player_may_hold_both_slots() {
    let (_db, service) = setup_service();
    let solo = service
        .create_player("solo".to_string(), None)
        .expect("Create failed");
    let game = service
        .create_game(Some(*solo.id()), Some(*solo.id()))
        .expect("Create failed");
    service
        .submit_move(*game.id(), 0, Some(*solo.id()))
        .expect("X move");
    service
        .submit_move(*game.id(), 1, Some(*solo.id()))
        .expect("O move");
}

#[test]
fn test_delete_player() {
    let (_db, service) = setup_service();
    let erin = service
        .create_player("erin".to_string(), None)
        .expect("Create failed");
    let game = service
        .create_game(Some(*erin.id()), None)
        .expect("Create failed");

    service.delete_player(*erin.id()).expect("Delete failed");
    assert!(matches!(
        service.get_player(*erin.id()),
        Err(GameError::PlayerNotFound(_))
    ));
    assert!(matches!(
        service.delete_player(*erin.id()),
        Err(GameError::PlayerNotFound(_))
    ));
    assert!(
        service
            .get_game(*game.id())
            .expect("Game missing")
            .player_x_id()
            .is_none()
    );
}

#[test]
fn test_list_games_newest_first() {
    let (_db, service) = setup_service();
    let first = service.create_game(None, None).expect("Create failed");
    let second = service.create_game(None, None).expect("Create failed");
    let games = service.list_games(10, 0).expect("List failed");
    assert_eq!(*games[0].id(), *second.id());
    assert_eq!(*games[1].id(), *first.id());
}

fn corrupt(db: &NamedTempFile, sql: &str) {
    use diesel::{Connection, RunQueryDsl, SqliteConnection};
    let path = db.path().to_str().expect("Invalid path");
    let mut conn = SqliteConnection::establish(path).expect("Failed to connect");
    diesel::sql_query(sql).execute(&mut conn).expect("Update failed");
}

#[test]
fn test_corrupt_board_is_internal_error() {
    let (db, service) = setup_service();
    let game = service.create_game(None, None).expect("Create failed");
    corrupt(&db, &format!("UPDATE games SET board = 'XX' WHERE id = {}", game.id()));

    let err = service.get_game(*game.id()).expect_err("Corrupt board must fail");
    assert!(matches!(err, GameError::MalformedBoard { .. }));
    assert!(err.is_internal());
}

#[test]
fn test_status_disagreeing_with_board_is_internal_error() {
    let (db, service) = setup_service();
    let game = service.create_game(None, None).expect("Create failed");
    corrupt(
        &db,
        &format!("UPDATE games SET status = 'draw' WHERE id = {}", game.id()),
    );

    let err = service
        .submit_move(*game.id(), 0, None)
        .expect_err("Inconsistent game must fail");
    assert!(matches!(err, GameError::InconsistentState(_)));
    assert!(err.is_internal());
}
