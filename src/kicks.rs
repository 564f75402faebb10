//! Per-kind kick data
//!
//! When a rotation does not fit where it wants to go, the placement resolver
//! tries these horizontal offsets around the preferred column, nearest first.

use crate::board::BOARD_WIDTH;
use crate::piece::Piece;
use crate::tetromino::{Shape, TetrominoType};

/// How close to a wall (in cells) counts as "at the edge"
pub const EDGE_MARGIN: i32 = 2;

const LOCAL_OFFSETS: [i32; 5] = [0, 1, -1, 2, -2];

/// A vertical bar hugging the right wall needs three cells to lie down
const LONG_RIGHT_EDGE_OFFSETS: [i32; 6] = [0, 1, -1, 2, -2, -3];

/// Offsets to try around the preferred column
pub fn kick_offsets(kind: TetrominoType, piece: &Piece) -> &'static [i32] {
    match kind {
        TetrominoType::I if near_right_edge(piece) => &LONG_RIGHT_EDGE_OFFSETS,
        _ => &LOCAL_OFFSETS,
    }
}

/// Whether a rotation from `from` to `to` may skip the sweep check
///
/// Only the long piece turning between flat and upright next to a wall;
/// everything else has to sweep through open cells.
pub fn skips_path_check(kind: TetrominoType, piece: &Piece, from: &Shape, to: &Shape) -> bool {
    match kind {
        TetrominoType::I => {
            let flips = from.is_line() && to.is_line() && from.width() != to.width();
            flips && (near_left_edge(piece) || near_right_edge(piece))
        }
        _ => false,
    }
}

fn near_left_edge(piece: &Piece) -> bool {
    piece.left() <= EDGE_MARGIN
}

fn near_right_edge(piece: &Piece) -> bool {
    piece.right() >= BOARD_WIDTH as i32 - 1 - EDGE_MARGIN
}
