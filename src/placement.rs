//! Rotation placement: where a rotated piece ends up, if anywhere
//!
//! A rotation keeps the piece anchored on one edge instead of re-centring it,
//! falls back to the current column, then to a small nearest-first search.
//! Any placement more than one column away must be reachable by sliding the
//! unrotated piece through open cells, so a turn can never carry a piece
//! across a wall or a stack it could not physically pass.

use crate::board::Board;
use crate::kicks;
use crate::piece::Piece;
use crate::tetromino::{RotationDirection, Shape};
use tracing::trace;

/// Accepted rotation result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub shape: Shape,
    pub x: i32,
    pub y: i32,
}

/// Column that keeps the anchored edge where it was before the turn
///
/// Clockwise keeps the right edge, counter-clockwise keeps the left edge.
pub fn preferred_x(piece: &Piece, rotated: &Shape, direction: RotationDirection) -> i32 {
    match direction {
        RotationDirection::Clockwise => piece.right() - (rotated.width() as i32 - 1),
        RotationDirection::CounterClockwise => piece.left(),
    }
}

/// Whether the unrotated piece can slide from its column to `to_x`
///
/// Only the columns strictly between are checked; moves of at most one
/// column have nothing in between.
pub fn path_clear(board: &Board, piece: &Piece, to_x: i32) -> bool {
    let (lo, hi) = if to_x < piece.x {
        (to_x, piece.x)
    } else {
        (piece.x, to_x)
    };
    ((lo + 1)..hi).all(|x| board.can_place(piece, x - piece.x, 0, None))
}

/// Find where `piece` lands after turning in `direction`, `None` if nowhere
pub fn resolve_rotation(
    board: &Board,
    piece: &Piece,
    direction: RotationDirection,
) -> Option<Placement> {
    if piece.kind.is_rotation_invariant() {
        return None;
    }

    let rotated = piece.shape.rotated(direction);
    let target = preferred_x(piece, &rotated, direction);
    let exempt = kicks::skips_path_check(piece.kind, piece, &piece.shape, &rotated);

    let fits = |x: i32| board.can_place(piece, x - piece.x, 0, Some(&rotated));
    let reachable = |x: i32| exempt || (x - piece.x).abs() <= 1 || path_clear(board, piece, x);

    let x = if fits(target) && reachable(target) {
        Some(target)
    } else if target != piece.x && fits(piece.x) {
        Some(piece.x)
    } else {
        kicks::kick_offsets(piece.kind, piece)
            .iter()
            .map(|offset| target + offset)
            .find(|&x| fits(x) && reachable(x))
    };

    match x {
        Some(x) => Some(Placement {
            shape: rotated,
            x,
            y: piece.y,
        }),
        None => {
            trace!(kind = ?piece.kind, ?direction, x = piece.x, y = piece.y, "no placement for rotation");
            None
        }
    }
}
