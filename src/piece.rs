//! The active falling piece

use crate::board::BOARD_WIDTH;
use crate::tetromino::{Palette, Shape, TetrominoType};
use ratatui::style::Color;

/// A piece on (or about to enter) the field
///
/// `(x, y)` is the top-left corner of the shape's bounding box in grid
/// coordinates; `y` grows downward and may be negative above the field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    pub kind: TetrominoType,
    pub shape: Shape,
    pub x: i32,
    pub y: i32,
    pub color: Color,
}

impl Piece {
    /// Create a new piece at its spawn position
    pub fn new(kind: TetrominoType, palette: Palette) -> Self {
        let shape = kind.shape();
        let (x, y) = Self::spawn_position(&shape);
        Self {
            kind,
            shape,
            x,
            y,
            color: kind.color(palette),
        }
    }

    /// Horizontally centred on the top row
    pub fn spawn_position(shape: &Shape) -> (i32, i32) {
        let x = (BOARD_WIDTH as i32 - shape.width() as i32) / 2;
        (x, 0)
    }

    /// Absolute `(x, y)` of every filled cell
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.shape
            .filled()
            .map(|(dx, dy)| (self.x + dx, self.y + dy))
    }

    /// Same piece translated by `(dx, dy)`
    pub fn shifted(&self, dx: i32, dy: i32) -> Piece {
        Piece {
            x: self.x + dx,
            y: self.y + dy,
            ..self.clone()
        }
    }

    /// Same piece with a new shape at a new position
    pub fn placed(&self, shape: Shape, x: i32, y: i32) -> Piece {
        Piece {
            shape,
            x,
            y,
            ..self.clone()
        }
    }

    /// Leftmost occupied column
    pub fn left(&self) -> i32 {
        self.x
    }

    /// Rightmost occupied column
    pub fn right(&self) -> i32 {
        self.x + self.shape.width() as i32 - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_position() {
        let piece = Piece::new(TetrominoType::T, Palette::Classic);
        // 3 wide on a 10 wide field
        assert_eq!((piece.x, piece.y), (3, 0));

        let piece = Piece::new(TetrominoType::O, Palette::Classic);
        assert_eq!((piece.x, piece.y), (4, 0));

        let piece = Piece::new(TetrominoType::I, Palette::Classic);
        assert_eq!((piece.x, piece.y), (3, 0));
    }

    #[test]
    fn test_cells_are_translated() {
        let piece = Piece::new(TetrominoType::O, Palette::Classic).shifted(1, 5);
        let cells: Vec<_> = piece.cells().collect();
        assert_eq!(cells, vec![(5, 5), (6, 5), (5, 6), (6, 6)]);
    }

    #[test]
    fn test_edges() {
        let piece = Piece::new(TetrominoType::I, Palette::Classic);
        assert_eq!(piece.left(), 3);
        assert_eq!(piece.right(), 6);
    }

    #[test]
    fn test_palette_sets_color() {
        let classic = Piece::new(TetrominoType::S, Palette::Classic);
        let pastel = Piece::new(TetrominoType::S, Palette::Pastel);
        assert_ne!(classic.color, pastel.color);
    }
}
