//! Stuck detection for a piece that can no longer fall
//!
//! A grounded piece is either given a grace period (lock pending) or locked
//! on the spot. It gets the grace period only while some sideways move or
//! rotation could still do it good.

use crate::board::Board;
use crate::piece::Piece;
use crate::placement;
use crate::tetromino::RotationDirection;

pub fn can_fall(board: &Board, piece: &Piece) -> bool {
    board.can_place(piece, 0, 1, None)
}

/// Count the empty cells under the piece that would end up as holes
///
/// Each bottom cell of the shape looks at the board cell right below it.
/// Gaps on the floor row never count. Otherwise an empty cell counts when
/// it sits on something solid or when both its sides are closed by the
/// board, a wall, or the piece itself. The cell right above a gap is always
/// the piece, so it never decides anything on its own.
pub fn problematic_gaps(board: &Board, piece: &Piece) -> usize {
    let floor = board.height() as i32 - 1;
    let covers = |x: i32, y: i32| piece.cells().any(|cell| cell == (x, y));
    let closed = |x: i32, y: i32| board.is_blocked(x, y) || covers(x, y);

    piece
        .shape
        .bottom_cells()
        .map(|(col, row)| (piece.x + col, piece.y + row + 1))
        .filter(|&(x, y)| (0..floor).contains(&y) && !board.is_blocked(x, y))
        .filter(|&(x, y)| {
            board.is_blocked(x, y + 1) || (closed(x - 1, y) && closed(x + 1, y))
        })
        .count()
}

/// Every bottom cell rests directly on the floor or the stack
pub fn is_fully_supported(board: &Board, piece: &Piece) -> bool {
    piece
        .shape
        .bottom_cells()
        .all(|(col, row)| board.is_blocked(piece.x + col, piece.y + row + 1))
}

/// Every legal position one sideways step or one rotation away
pub fn escape_candidates(board: &Board, piece: &Piece) -> Vec<Piece> {
    let shifts = [-1, 1]
        .into_iter()
        .filter(|&dx| board.can_place(piece, dx, 0, None))
        .map(|dx| piece.shifted(dx, 0));

    let turns = [RotationDirection::Clockwise, RotationDirection::CounterClockwise]
        .into_iter()
        .filter_map(|dir| placement::resolve_rotation(board, piece, dir))
        .map(|p| piece.placed(p.shape, p.x, p.y));

    shifts.chain(turns).collect()
}

/// Whether moving from `before` to `after` rescues a grounded piece
///
/// Either it can fall again, or it had holes under it and now has none.
/// Fewer holes is not enough.
pub fn is_rescue(board: &Board, before: &Piece, after: &Piece) -> bool {
    if can_fall(board, after) {
        return true;
    }
    problematic_gaps(board, before) > 0 && problematic_gaps(board, after) == 0
}

/// Whether a grounded piece should lock right away instead of waiting
pub fn is_completely_stuck(board: &Board, piece: &Piece) -> bool {
    let candidates = escape_candidates(board, piece);
    if problematic_gaps(board, piece) == 0 {
        is_fully_supported(board, piece) || candidates.is_empty()
    } else {
        !candidates
            .iter()
            .any(|candidate| is_rescue(board, piece, candidate))
    }
}
