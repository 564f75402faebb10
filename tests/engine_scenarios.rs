//! Whole-engine scenarios driven through the public API with synthetic time

use proptest::prelude::*;
use ratatui::style::Color;
use stackdrop::kicks;
use stackdrop::placement::{self, path_clear};
use stackdrop::{
    Action, Board, Cell, EngineConfig, Game, GameEvent, GameState, Palette, Phase, Piece,
    RotationDirection, TetrominoType, BOARD_HEIGHT, BOARD_WIDTH,
};
use std::time::Duration;

const FRAME: Duration = Duration::from_millis(16);
const SECOND: Duration = Duration::from_secs(1);

fn engine(animations: bool) -> Game {
    Game::with_config(EngineConfig {
        animations,
        seed: Some(2024),
        ..EngineConfig::default()
    })
}

/// Put a piece of `kind`, turned clockwise `turns` times, at `(x, y)`
fn place(game: &mut Game, kind: TetrominoType, turns: usize, x: i32, y: i32) {
    let piece = Piece::new(kind, game.config().palette);
    let mut shape = piece.shape.clone();
    for _ in 0..turns {
        shape = shape.rotate_cw();
    }
    game.current_piece = Some(piece.placed(shape, x, y));
}

fn fill_row_except(board: &mut Board, y: i32, holes: &[i32]) {
    for x in 0..BOARD_WIDTH as i32 {
        if !holes.contains(&x) {
            board.set(x, y, Cell::Filled(Color::Gray));
        }
    }
}

fn run_until_idle(game: &mut Game) -> usize {
    let mut frames = 0;
    while game.is_animating() {
        game.tick(FRAME);
        frames += 1;
        assert!(frames < 1000, "animation never finished");
    }
    frames
}

#[test]
fn test_o_hard_drop_without_animation_lands_on_floor() {
    let mut game = engine(false);
    place(&mut game, TetrominoType::O, 0, 4, 0);
    assert!(game.process_action(Action::HardDrop));

    // Resolved within the call, no frames needed
    assert_eq!(game.phase(), &Phase::Active);
    let floor = BOARD_HEIGHT as i32 - 2;
    let events = game.drain_events();
    assert_eq!(
        events[0],
        GameEvent::Locked {
            cells: vec![(4, floor), (5, floor), (4, floor + 1), (5, floor + 1)]
        }
    );
    assert_eq!(game.score.points, 2 * floor as u64);
}

#[test]
fn test_hard_drop_animation_follows_moves() {
    let mut game = engine(true);
    for y in 10..BOARD_HEIGHT as i32 {
        game.board.set(3, y, Cell::Filled(Color::Gray));
        game.board.set(4, y, Cell::Filled(Color::Gray));
    }
    place(&mut game, TetrominoType::O, 0, 5, 0);
    assert_eq!(game.ghost_y(), Some(18));
    assert!(game.process_action(Action::HardDrop));

    game.tick(FRAME);
    assert!(game.process_action(Action::MoveLeft));
    assert!(game.process_action(Action::MoveLeft));
    assert_eq!(game.ghost_y(), Some(8));

    let frames = run_until_idle(&mut game);
    assert!(frames <= 16);
    assert!(game.board.is_filled(3, 8));
    assert!(game.board.is_filled(4, 9));
    assert!(!game.board.is_filled(5, 19));
}

#[test]
fn test_hard_drop_scores_the_rows_actually_fallen() {
    let mut game = engine(true);
    for y in 4..BOARD_HEIGHT as i32 {
        game.board.set(3, y, Cell::Filled(Color::Gray));
        game.board.set(4, y, Cell::Filled(Color::Gray));
    }
    place(&mut game, TetrominoType::O, 0, 5, 0);
    assert!(game.process_action(Action::HardDrop));
    assert_eq!(game.score.points, 0);

    // Steered onto the tall columns, it only falls two rows
    game.tick(FRAME);
    assert!(game.process_action(Action::MoveLeft));
    assert!(game.process_action(Action::MoveLeft));
    run_until_idle(&mut game);

    assert!(game.board.is_filled(3, 2));
    assert!(game.board.is_filled(4, 3));
    assert_eq!(game.score.points, 2 * 2);
}

#[test]
fn test_non_adjacent_rows_clear_together() {
    let mut game = engine(false);
    let bottom = BOARD_HEIGHT as i32 - 1;
    fill_row_except(&mut game.board, bottom, &[0]);
    fill_row_except(&mut game.board, bottom - 1, &[0, 5]);
    fill_row_except(&mut game.board, bottom - 2, &[0]);
    fill_row_except(&mut game.board, bottom - 3, &[0, 7, 8]);
    let kept_lower = *game.board.rows().nth(bottom as usize - 1).unwrap();
    let kept_upper = *game.board.rows().nth(bottom as usize - 3).unwrap();

    // Upright bar down the left wall completes rows 19 and 17
    place(&mut game, TetrominoType::I, 1, 0, 0);
    assert!(game.process_action(Action::HardDrop));

    let events = game.drain_events();
    assert!(events.contains(&GameEvent::LinesCleared {
        count: 2,
        rows: vec![bottom as usize, bottom as usize - 2],
    }));

    let rows: Vec<_> = game.board.rows().copied().collect();
    let mut expected_lower = kept_lower;
    expected_lower[0] = rows[bottom as usize][0];
    let mut expected_upper = kept_upper;
    expected_upper[0] = rows[bottom as usize - 1][0];
    assert_eq!(rows[bottom as usize], expected_lower);
    assert_eq!(rows[bottom as usize - 1], expected_upper);
    assert!(rows[bottom as usize][0].is_filled());
    assert!(rows[..bottom as usize - 1].iter().all(|row| row.iter().all(|c| c.is_empty())));
}

#[test]
fn test_line_clear_blocks_input_until_done() {
    let mut game = engine(true);
    let bottom = BOARD_HEIGHT as i32 - 1;
    fill_row_except(&mut game.board, bottom, &[4, 5]);
    place(&mut game, TetrominoType::O, 0, 4, bottom - 1);
    // Grounded flat on the floor: the first gravity step locks it
    game.tick(SECOND);
    assert!(matches!(game.phase(), Phase::LineClear(_)));
    assert!(game.current_piece.is_none());
    assert!(!game.process_action(Action::HardDrop));

    run_until_idle(&mut game);
    assert!(game.current_piece.is_some());
    let events = game.drain_events();
    let locked = events
        .iter()
        .position(|e| matches!(e, GameEvent::Locked { .. }));
    let cleared = events
        .iter()
        .position(|e| matches!(e, GameEvent::LinesCleared { .. }));
    assert!(locked < cleared);
}

#[test]
fn test_rotation_never_crosses_a_wall() {
    let mut game = engine(true);
    let y = 10;
    // Flat bar at x=3 turning clockwise wants column 6, but column 8 stops
    // the sweep; the in-place turn and the reachable kicks are blocked too
    place(&mut game, TetrominoType::I, 0, 3, y);
    for (x, y) in [(8, y), (3, y + 1), (4, y + 2), (5, y + 2)] {
        game.board.set(x, y, Cell::Filled(Color::Gray));
    }
    let before = game.current_piece.clone();
    assert!(!game.process_action(Action::RotateCW));
    assert_eq!(game.current_piece, before);
    assert!(game.drain_events().is_empty());
}

#[test]
fn test_level_landing_locks_without_delay() {
    let mut game = engine(true);
    let bottom = BOARD_HEIGHT as i32 - 1;
    fill_row_except(&mut game.board, bottom, &[0]);
    // Flat bar lands on a level stack with lots of room either side
    place(&mut game, TetrominoType::I, 0, 3, bottom - 2);
    game.tick(SECOND);
    assert_eq!(game.current_piece.as_ref().map(|p| p.y), Some(bottom - 1));
    game.tick(SECOND);
    assert!(!game.is_lock_pending());
    assert!(game.board.is_filled(3, bottom - 1));
}

#[test]
fn test_partial_gap_fix_does_not_reset_lock_delay() {
    let mut game = engine(true);
    let bottom = BOARD_HEIGHT as i32 - 1;
    fill_row_except(&mut game.board, bottom, &[]);
    fill_row_except(&mut game.board, bottom - 1, &[4, 5, 6, 7]);
    // Resting on column 3 over three holes; one step right would let it fall
    place(&mut game, TetrominoType::I, 0, 3, bottom - 2);

    game.tick(SECOND);
    assert!(game.is_lock_pending());

    // Moving left leaves two of the three holes
    game.tick(SECOND / 2);
    assert!(game.process_action(Action::MoveLeft));
    assert!(game.is_lock_pending());

    // Half a second later the original timer runs out
    game.tick(SECOND / 2 + Duration::from_millis(1));
    assert!(game.board.is_filled(4, bottom - 2));
}

#[test]
fn test_rescue_by_sliding_over_a_well() {
    let mut game = engine(true);
    let bottom = BOARD_HEIGHT as i32 - 1;
    fill_row_except(&mut game.board, bottom, &[4, 5]);
    fill_row_except(&mut game.board, bottom - 1, &[4, 5]);
    place(&mut game, TetrominoType::O, 0, 3, bottom - 3);

    game.tick(SECOND);
    assert!(game.is_lock_pending());
    assert!(game.process_action(Action::MoveRight));
    assert!(!game.is_lock_pending());

    game.tick(SECOND);
    game.tick(SECOND);
    assert_eq!(game.current_piece.as_ref().map(|p| (p.x, p.y)), Some((4, bottom - 1)));
    assert_eq!(game.score.lines, 0);

    // Locks level in the well and clears both rows
    game.tick(SECOND);
    run_until_idle(&mut game);
    assert_eq!(game.score.lines, 2);
    assert!(game.board.is_empty());
}

#[test]
fn test_rotation_rescues_piece_over_a_well() {
    let mut game = engine(false);
    let bottom = BOARD_HEIGHT as i32 - 1;
    for y in bottom - 3..=bottom {
        fill_row_except(&mut game.board, y, &[6]);
    }
    // Flat bar bridging a four-deep well in column 6
    place(&mut game, TetrominoType::I, 0, 3, bottom - 4);
    game.tick(SECOND);
    assert!(game.is_lock_pending());

    assert!(game.process_action(Action::RotateCW));
    assert!(!game.is_lock_pending());
    assert_eq!(game.current_piece.as_ref().map(|p| p.x), Some(6));

    game.tick(SECOND);
    game.tick(SECOND);
    assert_eq!(game.score.lines, 4);
    assert!(game.board.is_empty());
}

#[test]
fn test_tenth_line_raises_the_level() {
    let mut game = engine(false);
    let bottom = BOARD_HEIGHT as i32 - 1;
    for _ in 0..3 {
        for y in bottom - 3..=bottom {
            fill_row_except(&mut game.board, y, &[0]);
        }
        place(&mut game, TetrominoType::I, 1, 0, 0);
        assert!(game.process_action(Action::HardDrop));
    }

    assert_eq!(game.score.lines, 12);
    assert_eq!(game.score.level, 2);
    let levels: Vec<_> = game
        .drain_events()
        .into_iter()
        .filter_map(|e| match e {
            GameEvent::LevelChanged { level, drop_time } => Some((level, drop_time)),
            _ => None,
        })
        .collect();
    assert_eq!(levels, vec![(2, game.drop_time())]);
    assert!(game.drop_time() < SECOND);
}

#[test]
fn test_palette_switch_leaves_stack_alone() {
    let mut game = engine(false);
    place(&mut game, TetrominoType::T, 0, 3, 0);
    assert!(game.process_action(Action::HardDrop));
    let frozen = TetrominoType::T.color(Palette::Classic);

    game.set_palette(Palette::Pastel);
    let bottom = BOARD_HEIGHT as i32 - 1;
    for x in 3..6 {
        assert_eq!(game.board.get(x, bottom), Some(Cell::Filled(frozen)));
    }
    let active = game.current_piece.as_ref().unwrap();
    assert_eq!(active.color, active.kind.color(Palette::Pastel));
}

#[test]
fn test_stacking_ends_in_single_game_over() {
    let mut game = engine(false);
    let mut drops = 0;
    while game.state == GameState::Playing {
        assert!(game.process_action(Action::HardDrop));
        // Pieces left hanging over a hole still need their lock delay
        for _ in 0..3 {
            game.tick(SECOND);
        }
        drops += 1;
        assert!(drops < 200, "never topped out");
    }
    let events = game.drain_events();
    let overs = events.iter().filter(|e| **e == GameEvent::GameOver).count();
    assert_eq!(overs, 1);
    assert_eq!(game.state, GameState::GameOver);
    assert!(game.current_piece.is_none());

    let now = game.now();
    game.tick(SECOND);
    assert_eq!(game.now(), now);
    assert!(!game.process_action(Action::HardDrop));
}

#[test]
fn test_reset_replays_same_sequence() {
    let mut game = engine(false);
    let first: Vec<_> = (0..6)
        .map(|_| {
            let kind = game.current_piece.as_ref().unwrap().kind;
            game.process_action(Action::HardDrop);
            kind
        })
        .collect();
    assert!(game.process_action(Action::Reset));
    assert!(game.board.is_empty());
    assert_eq!(game.score.points, 0);
    let again: Vec<_> = (0..6)
        .map(|_| {
            let kind = game.current_piece.as_ref().unwrap().kind;
            game.process_action(Action::HardDrop);
            kind
        })
        .collect();
    assert_eq!(first, again);
}

#[test]
fn test_unseeded_reset_replays_same_sequence() {
    let mut game = Game::with_config(EngineConfig {
        animations: false,
        ..EngineConfig::default()
    });
    let kinds = |game: &mut Game| -> Vec<TetrominoType> {
        (0..4)
            .map(|_| {
                let kind = game.current_piece.as_ref().unwrap().kind;
                game.process_action(Action::HardDrop);
                kind
            })
            .collect()
    };
    let first = kinds(&mut game);
    assert!(game.process_action(Action::Reset));
    assert_eq!(game.config().seed, None);
    assert_eq!(kinds(&mut game), first);
}

#[test]
fn test_paused_game_ignores_time() {
    let mut game = engine(true);
    let y = game.current_piece.as_ref().unwrap().y;
    assert!(game.process_action(Action::Pause));
    for _ in 0..100 {
        game.tick(SECOND);
    }
    assert!(game.process_action(Action::Pause));
    assert_eq!(game.current_piece.as_ref().unwrap().y, y);
    game.tick(SECOND);
    assert_eq!(game.current_piece.as_ref().unwrap().y, y + 1);
}

fn board_from(cells: &[bool]) -> Board {
    let mut board = Board::new();
    for (i, &filled) in cells.iter().enumerate() {
        if filled {
            let (x, y) = ((i % BOARD_WIDTH) as i32, (i / BOARD_WIDTH) as i32);
            board.set(x, y, Cell::Filled(Color::Indexed(i as u8)));
        }
    }
    board
}

proptest! {
    #[test]
    fn prop_clear_keeps_survivors_in_order(
        cells in prop::collection::vec(any::<bool>(), BOARD_WIDTH * BOARD_HEIGHT),
        rows in prop::collection::vec(0..BOARD_HEIGHT, 0..6),
    ) {
        let mut board = board_from(&cells);
        let before: Vec<_> = board.rows().copied().collect();

        let cleared = board.clear_lines(&rows);

        let survivors: Vec<_> = before
            .iter()
            .enumerate()
            .filter(|(i, _)| !rows.contains(i))
            .map(|(_, row)| *row)
            .collect();
        prop_assert_eq!(cleared, BOARD_HEIGHT - survivors.len());

        let after: Vec<_> = board.rows().copied().collect();
        prop_assert!(after[..cleared].iter().all(|row| row.iter().all(|c| c.is_empty())));
        prop_assert_eq!(&after[cleared..], survivors.as_slice());
    }

    #[test]
    fn prop_rotation_lands_legally_and_reachably(
        cells in prop::collection::vec(prop::bool::weighted(0.25), BOARD_WIDTH * BOARD_HEIGHT),
        kind in 0..7usize,
        turns in 0..4usize,
        x in 0..BOARD_WIDTH as i32,
        y in -2..BOARD_HEIGHT as i32,
        clockwise in any::<bool>(),
    ) {
        let board = board_from(&cells);
        let kind = TetrominoType::all()[kind];
        let mut piece = Piece::new(kind, Palette::Classic);
        for _ in 0..turns {
            piece.shape = piece.shape.rotate_cw();
        }
        piece.x = x;
        piece.y = y;
        prop_assume!(board.can_place(&piece, 0, 0, None));

        let direction = if clockwise {
            RotationDirection::Clockwise
        } else {
            RotationDirection::CounterClockwise
        };
        match placement::resolve_rotation(&board, &piece, direction) {
            Some(result) => {
                prop_assert!(kind != TetrominoType::O);
                prop_assert_eq!(result.y, piece.y);
                prop_assert_eq!(&result.shape, &piece.shape.rotated(direction));
                prop_assert!(board.can_place(&piece, result.x - piece.x, 0, Some(&result.shape)));
                let exempt = kicks::skips_path_check(kind, &piece, &piece.shape, &result.shape);
                if (result.x - piece.x).abs() > 1 && !exempt {
                    prop_assert!(path_clear(&board, &piece, result.x));
                }
            }
            None => {
                // Nothing changes on a failed rotation, and a free turn in place is never refused
                if kind != TetrominoType::O {
                    let rotated = piece.shape.rotated(direction);
                    prop_assert!(!board.can_place(&piece, 0, 0, Some(&rotated)));
                }
            }
        }
    }
}
