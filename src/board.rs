//! Playing field: cell storage, collision queries, locking and line clears

use crate::piece::Piece;
use crate::tetromino::Shape;
use ratatui::style::Color;

/// Standard field dimensions
pub const BOARD_WIDTH: usize = 10;
pub const BOARD_HEIGHT: usize = 20;

/// A cell on the board - either empty or filled with a color
///
/// The colour is copied in when a piece locks and never looked up again,
/// so later palette changes leave the stack alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Filled(Color),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn is_filled(&self) -> bool {
        matches!(self, Cell::Filled(_))
    }
}

/// The game board
///
/// Stored as `[row][col]`, row 0 at the top. Coordinates above the field
/// (`y < 0`) are open space, everything else outside the grid is solid.
#[derive(Debug, Clone)]
pub struct Board {
    cells: [[Cell; BOARD_WIDTH]; BOARD_HEIGHT],
    /// Set on every grid mutation, cleared by the renderer
    dirty: bool,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Self {
            cells: [[Cell::Empty; BOARD_WIDTH]; BOARD_HEIGHT],
            dirty: true,
        }
    }

    pub fn width(&self) -> usize {
        BOARD_WIDTH
    }

    pub fn height(&self) -> usize {
        BOARD_HEIGHT
    }

    /// Get the cell at `(x, y)`, `None` outside the grid
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        if x < 0 || y < 0 {
            return None;
        }
        self.cells
            .get(y as usize)
            .and_then(|row| row.get(x as usize))
            .copied()
    }

    /// Set a cell, returns false if out of bounds
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) -> bool {
        if x < 0 || y < 0 {
            return false;
        }
        let Some(slot) = self
            .cells
            .get_mut(y as usize)
            .and_then(|row| row.get_mut(x as usize))
        else {
            return false;
        };
        *slot = cell;
        self.dirty = true;
        true
    }

    /// True for filled cells inside the grid only
    pub fn is_filled(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_some_and(|cell| cell.is_filled())
    }

    /// Whether a piece cell may not occupy `(x, y)`
    ///
    /// Walls and the floor are solid, the space above the field is open.
    pub fn is_blocked(&self, x: i32, y: i32) -> bool {
        if x < 0 || x >= BOARD_WIDTH as i32 || y >= BOARD_HEIGHT as i32 {
            return true;
        }
        if y < 0 {
            return false;
        }
        self.is_filled(x, y)
    }

    /// Whether `piece` (or `shape` in its place) fits after moving by `(dx, dy)`
    pub fn can_place(&self, piece: &Piece, dx: i32, dy: i32, shape: Option<&Shape>) -> bool {
        let shape = shape.unwrap_or(&piece.shape);
        let (x, y) = (piece.x + dx, piece.y + dy);
        shape
            .filled()
            .all(|(cx, cy)| !self.is_blocked(x + cx, y + cy))
    }

    /// Deepest row `piece` can reach by falling straight down
    pub fn landing_y(&self, piece: &Piece) -> i32 {
        let mut dy = 0;
        while self.can_place(piece, 0, dy + 1, None) {
            dy += 1;
        }
        piece.y + dy
    }

    /// Write the piece's colour into every cell it covers
    ///
    /// Callers check legality first; cells outside the grid are dropped.
    pub fn lock(&mut self, piece: &Piece) {
        for (x, y) in piece.cells() {
            self.set(x, y, Cell::Filled(piece.color));
        }
        self.dirty = true;
    }

    /// Indices of completely filled rows, bottom to top
    pub fn full_lines(&self) -> Vec<usize> {
        (0..BOARD_HEIGHT)
            .rev()
            .filter(|&row| self.is_line_full(row))
            .collect()
    }

    /// Remove `rows` in one compaction pass and return how many went
    ///
    /// Surviving rows keep their order and slide down; empty rows fill the top.
    pub fn clear_lines(&mut self, rows: &[usize]) -> usize {
        let mut doomed = [false; BOARD_HEIGHT];
        for &row in rows {
            if let Some(slot) = doomed.get_mut(row) {
                *slot = true;
            }
        }
        let cleared = doomed.iter().filter(|&&d| d).count();
        if cleared == 0 {
            return 0;
        }

        let kept: Vec<[Cell; BOARD_WIDTH]> = self
            .cells
            .iter()
            .zip(doomed)
            .filter(|(_, doomed)| !doomed)
            .map(|(row, _)| *row)
            .collect();

        let mut compacted = [[Cell::Empty; BOARD_WIDTH]; BOARD_HEIGHT];
        compacted[cleared..].copy_from_slice(&kept);
        self.cells = compacted;
        self.dirty = true;
        cleared
    }

    /// Check if a spawned piece is already blocked
    pub fn is_game_over(&self, spawn: &Piece) -> bool {
        !self.can_place(spawn, 0, 0, None)
    }

    /// Check if a line is completely filled
    fn is_line_full(&self, row: usize) -> bool {
        self.cells[row].iter().all(|cell| cell.is_filled())
    }

    pub fn is_empty(&self) -> bool {
        self.cells
            .iter()
            .all(|row| row.iter().all(|cell| cell.is_empty()))
    }

    /// Rows from top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Cell; BOARD_WIDTH]> {
        self.cells.iter()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Read and reset the redraw flag
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
