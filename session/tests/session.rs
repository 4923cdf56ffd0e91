use palefiz_core::{
    CellCoord, CellState, DieRoll, Event, FigureId, GridError, Rejection, StartError,
    MAX_GRID_SIZE,
};
use palefiz_session::{ConfigError, GameSession, SessionConfig, SessionError, SessionReport};
use palefiz_system_builder::EditMode;
use palefiz_system_movement::{ScriptedDie, TurnOutcome};
use palefiz_world::query;

fn session(size: u32, rolls: &[u8]) -> GameSession<ScriptedDie> {
    let config = SessionConfig {
        grid_size: size,
        ..SessionConfig::default()
    };
    let die = ScriptedDie::new(
        rolls
            .iter()
            .map(|value| DieRoll::new(*value).expect("valid roll"))
            .collect(),
    );
    GameSession::with_die(config, die).expect("valid config")
}

fn state(session: &GameSession<ScriptedDie>, column: u32, row: u32) -> CellState {
    query::state_at(session.world(), CellCoord::new(column, row)).expect("cell on board")
}

fn rejected(events: &[Event]) -> Option<Rejection> {
    events.iter().find_map(|event| match event {
        Event::CommandRejected { reason } => Some(*reason),
        _ => None,
    })
}

#[test]
fn clicks_place_figures_with_sequential_ids() {
    let mut session = session(5, &[1]);

    let first = session.click(CellCoord::new(0, 0));
    let second = session.click(CellCoord::new(3, 1));

    assert_eq!(
        first,
        vec![Event::FigurePlaced {
            figure: FigureId::new(1),
            cell: CellCoord::new(0, 0),
        }]
    );
    assert_eq!(
        second,
        vec![Event::FigurePlaced {
            figure: FigureId::new(2),
            cell: CellCoord::new(3, 1),
        }]
    );
    assert_eq!(state(&session, 3, 1), CellState::Occupied(FigureId::new(2)));
}

#[test]
fn fifth_figure_is_rejected() {
    let mut session = session(5, &[1]);
    for column in 0..4 {
        let events = session.click(CellCoord::new(column, 0));
        assert_eq!(rejected(&events), None);
    }

    let events = session.click(CellCoord::new(4, 0));

    assert_eq!(
        rejected(&events),
        Some(Rejection::Grid(GridError::FigureLimitReached { limit: 4 }))
    );
    assert_eq!(state(&session, 4, 0), CellState::Empty);
}

#[test]
fn block_mode_clicks_toggle_cells() {
    let mut session = session(5, &[1]);
    let _ = session.toggle_block_mode();
    assert_eq!(session.edit_mode(), EditMode::Block);

    let blocked = session.click(CellCoord::new(2, 2));
    assert_eq!(
        blocked,
        vec![Event::CellBlocked {
            cell: CellCoord::new(2, 2),
        }]
    );
    assert_eq!(state(&session, 2, 2), CellState::Blocked);

    let cleared = session.click(CellCoord::new(2, 2));
    assert_eq!(
        cleared,
        vec![Event::CellCleared {
            cell: CellCoord::new(2, 2),
        }]
    );
    assert_eq!(state(&session, 2, 2), CellState::Empty);
}

#[test]
fn target_can_only_be_set_once() {
    let mut session = session(5, &[1]);

    let first = session.set_target(CellCoord::new(4, 4));
    let second = session.set_target(CellCoord::new(1, 1));

    assert_eq!(
        first,
        vec![Event::TargetSet {
            cell: CellCoord::new(4, 4),
        }]
    );
    assert_eq!(
        rejected(&second),
        Some(Rejection::Grid(GridError::TargetAlreadySet {
            existing: CellCoord::new(4, 4),
        }))
    );
    assert_eq!(state(&session, 1, 1), CellState::Empty);
}

#[test]
fn advance_without_target_stays_in_setup() {
    let mut session = session(5, &[1]);
    let _ = session.click(CellCoord::new(0, 0));

    let report = session.advance();

    assert_eq!(
        report,
        SessionReport::Rejected(SessionError::Start(StartError::MissingTarget))
    );
    assert!(!session.is_simulating());
    assert_eq!(session.status_line(), "Setup mode (placement).");
}

#[test]
fn advance_without_figures_stays_in_setup() {
    let mut session = session(5, &[1]);
    let _ = session.set_target(CellCoord::new(4, 4));

    assert_eq!(
        session.advance(),
        SessionReport::Rejected(SessionError::Start(StartError::NoFigures))
    );
    assert!(!session.is_simulating());
}

#[test]
fn step_before_start_is_rejected() {
    let mut session = session(5, &[1]);
    assert!(session.step().is_err());
}

#[test]
fn corner_to_corner_game_moves_three_cells() {
    let mut session = session(5, &[3]);
    let _ = session.click(CellCoord::new(0, 0));
    let _ = session.set_target(CellCoord::new(4, 4));

    assert_eq!(session.advance(), SessionReport::Started { figures: 1 });
    assert_eq!(session.status_line(), "Simulation mode.");

    let SessionReport::Turn(TurnOutcome::Moved { from, to, .. }) = session.advance() else {
        panic!("expected the figure to move");
    };

    assert_eq!(from, CellCoord::new(0, 0));
    assert_eq!(to.manhattan_distance(from), 3);
    assert_eq!(state(&session, 0, 0), CellState::Empty);
    assert_eq!(
        query::state_at(session.world(), to),
        Ok(CellState::Occupied(FigureId::new(1)))
    );
}

#[test]
fn wall_with_single_gap_is_crossed_through_the_gap() {
    let mut session = session(5, &[2, 2]);
    let _ = session.toggle_block_mode();
    for row in [0, 1, 3, 4] {
        let _ = session.click(CellCoord::new(2, row));
    }
    let _ = session.toggle_block_mode();
    let _ = session.click(CellCoord::new(0, 2));
    let _ = session.set_target(CellCoord::new(4, 2));
    let _ = session.advance();

    let first = session.advance();
    assert_eq!(
        first,
        SessionReport::Turn(TurnOutcome::Moved {
            figure: FigureId::new(1),
            from: CellCoord::new(0, 2),
            to: CellCoord::new(2, 2),
            roll: DieRoll::new(2).expect("valid roll"),
        })
    );

    let _ = session.advance();
    assert_eq!(
        state(&session, 4, 2),
        CellState::Occupied(FigureId::new(1))
    );
}

#[test]
fn figure_dropped_on_target_stays_put() {
    let mut session = session(5, &[5]);
    let _ = session.click(CellCoord::new(1, 0));
    let _ = session.set_target(CellCoord::new(0, 0));

    let picked = session.click(CellCoord::new(1, 0));
    assert!(picked.is_empty());
    assert_eq!(session.carried_figure(), Some(FigureId::new(1)));
    assert_eq!(
        session.status_line(),
        "Setup mode (placement). Carrying figure #1."
    );

    let dropped = session.click(CellCoord::new(0, 0));
    assert_eq!(
        dropped,
        vec![Event::FigureMoved {
            figure: FigureId::new(1),
            from: CellCoord::new(1, 0),
            to: CellCoord::new(0, 0),
        }]
    );

    let _ = session.advance();
    assert_eq!(
        session.advance(),
        SessionReport::Turn(TurnOutcome::AtTarget {
            figure: FigureId::new(1),
        })
    );
    assert_eq!(state(&session, 0, 0), CellState::Occupied(FigureId::new(1)));
    assert_eq!(
        session.status_line(),
        "Simulation mode. Current figure: #1 lives: 10 position: (0, 0)"
    );
}

#[test]
fn clicks_are_ignored_during_simulation() {
    let mut session = session(5, &[1]);
    let _ = session.click(CellCoord::new(0, 0));
    let _ = session.set_target(CellCoord::new(4, 4));
    let _ = session.advance();

    assert!(session.click(CellCoord::new(3, 3)).is_empty());
    assert!(session.toggle_block_mode().is_empty());
    assert_eq!(session.edit_mode(), EditMode::Place);
    assert_eq!(state(&session, 3, 3), CellState::Empty);
}

#[test]
fn figures_rotate_across_advances() {
    let mut session = session(6, &[1]);
    let _ = session.click(CellCoord::new(0, 0));
    let _ = session.click(CellCoord::new(5, 5));
    let _ = session.set_target(CellCoord::new(0, 5));
    let _ = session.advance();

    let figures: Vec<u32> = (0..4)
        .map(|_| match session.advance() {
            SessionReport::Turn(outcome) => outcome.figure().get(),
            other => panic!("unexpected report {other:?}"),
        })
        .collect();

    assert_eq!(figures, vec![1, 2, 1, 2]);
    assert_eq!(
        session.current_figure().map(|figure| figure.id),
        Some(FigureId::new(2))
    );
}

#[test]
fn seeded_sessions_replay_identically() {
    let play = || {
        let config = SessionConfig {
            grid_size: 8,
            rng_seed: 1234,
            ..SessionConfig::default()
        };
        let mut session = GameSession::new(config).expect("valid config");
        let _ = session.click(CellCoord::new(0, 0));
        let _ = session.click(CellCoord::new(7, 0));
        let _ = session.set_target(CellCoord::new(7, 7));
        (0..10).map(|_| session.advance()).collect::<Vec<_>>()
    };

    assert_eq!(play(), play());
}

#[test]
fn zero_sized_board_is_refused() {
    let config = SessionConfig {
        grid_size: 0,
        ..SessionConfig::default()
    };
    assert_eq!(
        GameSession::new(config).err(),
        Some(ConfigError::EmptyGrid)
    );
}

#[test]
fn oversized_board_is_refused() {
    let config = SessionConfig {
        grid_size: 200_000,
        ..SessionConfig::default()
    };
    assert_eq!(
        GameSession::new(config).err(),
        Some(ConfigError::GridTooLarge {
            size: 200_000,
            max: MAX_GRID_SIZE,
        })
    );
}

#[test]
fn config_deserializes_from_toml_with_defaults() {
    let config: SessionConfig = toml::from_str("grid_size = 6\n").expect("valid toml");
    assert_eq!(config.grid_size, 6);
    assert_eq!(config.max_figures, SessionConfig::default().max_figures);
    assert_eq!(config.rng_seed, SessionConfig::default().rng_seed);

    assert!(toml::from_str::<SessionConfig>("board = 3\n").is_err());
}
