//! Stackdrop - a falling-block puzzle rules engine
//!
//! The library owns the grid, the active piece, rotation and lock rules and
//! the timing of drops and clears. Front ends feed it actions and elapsed
//! time, and read back state plus a queue of [`GameEvent`]s.

pub mod animator;
pub mod board;
pub mod game;
pub mod kicks;
pub mod lock;
pub mod piece;
pub mod placement;
pub mod randomizer;
pub mod score;
pub mod settings;
pub mod tetromino;

pub use board::{Board, Cell, BOARD_HEIGHT, BOARD_WIDTH};
pub use game::{Action, EngineConfig, Game, GameEvent, GameState, Phase};
pub use piece::Piece;
pub use settings::Settings;
pub use tetromino::{Palette, RotationDirection, Shape, TetrominoType};
