//! Tetromino catalog and shape rotation
//!
//! Every piece is a tight boolean matrix: rows and columns change with each
//! quarter turn, so a horizontal I is `1x4` and a vertical I is `4x1`.

use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// The 7 tetromino types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TetrominoType {
    I, // long bar
    O, // square
    T,
    S,
    Z,
    J,
    L,
}

/// Colour scheme used for pieces that have not been locked yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Palette {
    #[default]
    Classic,
    Pastel,
}

impl Palette {
    pub fn next(self) -> Palette {
        match self {
            Palette::Classic => Palette::Pastel,
            Palette::Pastel => Palette::Classic,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Palette::Classic => "Classic",
            Palette::Pastel => "Pastel",
        }
    }
}

const I_ROWS: &[&[u8]] = &[&[1, 1, 1, 1]];
const O_ROWS: &[&[u8]] = &[&[1, 1], &[1, 1]];
const T_ROWS: &[&[u8]] = &[&[0, 1, 0], &[1, 1, 1]];
const S_ROWS: &[&[u8]] = &[&[0, 1, 1], &[1, 1, 0]];
const Z_ROWS: &[&[u8]] = &[&[1, 1, 0], &[0, 1, 1]];
const J_ROWS: &[&[u8]] = &[&[1, 0, 0], &[1, 1, 1]];
const L_ROWS: &[&[u8]] = &[&[0, 0, 1], &[1, 1, 1]];

impl TetrominoType {
    /// Colour of a fresh piece under the given palette
    pub fn color(&self, palette: Palette) -> Color {
        match palette {
            Palette::Classic => match self {
                TetrominoType::I => Color::Cyan,
                TetrominoType::O => Color::Yellow,
                TetrominoType::T => Color::Magenta,
                TetrominoType::S => Color::Green,
                TetrominoType::Z => Color::Red,
                TetrominoType::J => Color::Blue,
                TetrominoType::L => Color::Rgb(255, 165, 0), // Orange
            },
            Palette::Pastel => match self {
                TetrominoType::I => Color::Rgb(160, 225, 235),
                TetrominoType::O => Color::Rgb(250, 235, 160),
                TetrominoType::T => Color::Rgb(210, 175, 235),
                TetrominoType::S => Color::Rgb(175, 230, 175),
                TetrominoType::Z => Color::Rgb(245, 170, 170),
                TetrominoType::J => Color::Rgb(165, 185, 240),
                TetrominoType::L => Color::Rgb(250, 200, 150),
            },
        }
    }

    pub fn all() -> [TetrominoType; 7] {
        [
            TetrominoType::I,
            TetrominoType::O,
            TetrominoType::T,
            TetrominoType::S,
            TetrominoType::Z,
            TetrominoType::J,
            TetrominoType::L,
        ]
    }

    /// Spawn orientation of this tetromino
    pub fn shape(&self) -> Shape {
        let rows = match self {
            TetrominoType::I => I_ROWS,
            TetrominoType::O => O_ROWS,
            TetrominoType::T => T_ROWS,
            TetrominoType::S => S_ROWS,
            TetrominoType::Z => Z_ROWS,
            TetrominoType::J => J_ROWS,
            TetrominoType::L => L_ROWS,
        };
        Shape::from_rows(rows)
    }

    /// The square looks the same after every quarter turn
    pub fn is_rotation_invariant(&self) -> bool {
        matches!(self, TetrominoType::O)
    }
}

/// Direction for rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationDirection {
    Clockwise,
    CounterClockwise,
}

/// Rectangular boolean matrix, indexed `[row][col]`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shape {
    cells: Vec<Vec<bool>>,
}

impl Shape {
    pub fn from_rows(rows: &[&[u8]]) -> Self {
        Self {
            cells: rows
                .iter()
                .map(|row| row.iter().map(|&v| v != 0).collect())
                .collect(),
        }
    }

    pub fn height(&self) -> usize {
        self.cells.len()
    }

    pub fn width(&self) -> usize {
        self.cells.first().map_or(0, |row| row.len())
    }

    /// Out-of-range lookups read as empty
    pub fn is_filled(&self, col: usize, row: usize) -> bool {
        self.cells
            .get(row)
            .and_then(|r| r.get(col))
            .copied()
            .unwrap_or(false)
    }

    /// `(col, row)` offsets of every filled cell, row by row
    pub fn filled(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.cells.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter(|(_, filled)| **filled)
                .map(move |(col, _)| (col as i32, row as i32))
        })
    }

    /// Filled cells that have no filled cell of the same shape directly below
    pub fn bottom_cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.filled()
            .filter(|&(col, row)| !self.is_filled(col as usize, row as usize + 1))
    }

    /// A single row or a single column, i.e. the long piece in either orientation
    pub fn is_line(&self) -> bool {
        self.height() == 1 || self.width() == 1
    }

    pub fn rotated(&self, direction: RotationDirection) -> Shape {
        match direction {
            RotationDirection::Clockwise => self.rotate_cw(),
            RotationDirection::CounterClockwise => self.rotate_ccw(),
        }
    }

    /// `R x C` becomes `C x R` with `result[x][R-1-y] = shape[y][x]`
    pub fn rotate_cw(&self) -> Shape {
        let (r, c) = (self.height(), self.width());
        let mut cells = vec![vec![false; r]; c];
        for (y, row) in self.cells.iter().enumerate() {
            for (x, &filled) in row.iter().enumerate() {
                cells[x][r - 1 - y] = filled;
            }
        }
        Shape { cells }
    }

    /// `R x C` becomes `C x R` with `result[C-1-x][y] = shape[y][x]`
    pub fn rotate_ccw(&self) -> Shape {
        let (r, c) = (self.height(), self.width());
        let mut cells = vec![vec![false; r]; c];
        for (y, row) in self.cells.iter().enumerate() {
            for (x, &filled) in row.iter().enumerate() {
                cells[c - 1 - x][y] = filled;
            }
        }
        Shape { cells }
    }
}
