//! Core game state and logic
//!
//! `Game` owns the grid and the active piece and is driven from outside by
//! two calls: `process_action` for player input and `tick` for the passage of
//! time. Time is an engine-local clock that only moves while playing, so the
//! whole state machine can be stepped with synthetic deltas.

use crate::animator::{DropStep, HardDropAnimation};
use crate::board::Board;
use crate::lock;
use crate::piece::Piece;
use crate::placement;
use crate::randomizer::Randomizer;
use crate::score::Score;
use crate::tetromino::{Palette, RotationDirection};
use std::time::Duration;
use tracing::debug;

/// How long full rows stay on screen before they are removed
pub const LINE_CLEAR_DURATION: Duration = Duration::from_millis(300);

/// Soft drop keeps gravity boosted for this long after the last press
pub const SOFT_DROP_BOOST: Duration = Duration::from_millis(150);

const SOFT_DROP_DIVISOR: u32 = 20;

/// Game state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Playing,
    Paused,
    GameOver,
}

/// Input actions the game can process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    SoftDrop,
    HardDrop,
    RotateCW,
    RotateCCW,
    Pause,
    Reset,
}

/// Something that happened, for renderers and sound to react to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    Moved,
    Rotated,
    Locked { cells: Vec<(i32, i32)> },
    LinesCleared { count: usize, rows: Vec<usize> },
    LevelChanged { level: u32, drop_time: Duration },
    GameOver,
}

/// Engine knobs the front end decides on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Play out hard drops and line clears over several frames
    pub animations: bool,
    pub palette: Palette,
    pub starting_level: u32,
    /// Fixed seed for the piece sequence; random when `None`
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            animations: true,
            palette: Palette::Classic,
            starting_level: 1,
            seed: None,
        }
    }
}

/// Full rows waiting to be removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearBatch {
    /// Row indices, bottom to top
    pub rows: Vec<usize>,
    pub started_at: Duration,
    pub duration: Duration,
}

impl ClearBatch {
    pub fn is_done(&self, now: Duration) -> bool {
        now.saturating_sub(self.started_at) >= self.duration
    }

    /// 0.0 when the batch starts, 1.0 when the rows go
    pub fn progress(&self, now: Duration) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.started_at);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }
}

/// What the engine is busy with while playing
///
/// Either animation suppresses gravity and lock checks until it finishes.
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Active,
    HardDrop(HardDropAnimation),
    LineClear(ClearBatch),
}

/// The main game struct
pub struct Game {
    /// The game board
    pub board: Board,
    /// Current falling piece
    pub current_piece: Option<Piece>,
    /// The piece that spawns after this one
    pub next_piece: Piece,
    /// Score tracking
    pub score: Score,
    /// Current game state
    pub state: GameState,
    phase: Phase,
    config: EngineConfig,
    randomizer: Randomizer,
    /// Engine clock
    now: Duration,
    /// Last gravity step
    last_drop: Duration,
    /// When the piece got stuck on something, `None` while it can fall
    lock_since: Option<Duration>,
    boost_until: Option<Duration>,
    /// Soft drop distance this piece (for scoring)
    soft_drop_distance: u32,
    events: Vec<GameEvent>,
}

impl Game {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let mut randomizer = Randomizer::new(config.seed);
        let first = Piece::new(randomizer.next(), config.palette);
        let next_piece = Piece::new(randomizer.next(), config.palette);
        debug!(seed = randomizer.seed(), first = ?first.kind, "new game");

        Self {
            board: Board::new(),
            current_piece: Some(first),
            next_piece,
            score: Score::new(config.starting_level),
            state: GameState::Playing,
            phase: Phase::Active,
            config,
            randomizer,
            now: Duration::ZERO,
            last_drop: Duration::ZERO,
            lock_since: None,
            boost_until: None,
            soft_drop_distance: 0,
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// A hard drop or line clear is playing out
    pub fn is_animating(&self) -> bool {
        !matches!(self.phase, Phase::Active)
    }

    /// The piece can't fall and is waiting out its lock delay
    pub fn is_lock_pending(&self) -> bool {
        self.lock_since.is_some()
    }

    /// Rows currently flashing and how far along the flash is
    pub fn line_clear(&self) -> Option<(&[usize], f64)> {
        match &self.phase {
            Phase::LineClear(batch) => Some((&batch.rows, batch.progress(self.now))),
            _ => None,
        }
    }

    /// Time between gravity steps, shortened while soft drop is held
    pub fn drop_time(&self) -> Duration {
        let base = self.score.drop_time();
        match self.boost_until {
            Some(until) if self.now < until => base / SOFT_DROP_DIVISOR,
            _ => base,
        }
    }

    /// Row the active piece would land on
    pub fn ghost_y(&self) -> Option<i32> {
        self.current_piece
            .as_ref()
            .map(|piece| self.board.landing_y(piece))
    }

    pub fn set_animations(&mut self, enabled: bool) {
        self.config.animations = enabled;
    }

    /// Recolour the pieces still in play; locked cells keep their colour
    pub fn set_palette(&mut self, palette: Palette) {
        self.config.palette = palette;
        if let Some(piece) = &mut self.current_piece {
            piece.color = piece.kind.color(palette);
        }
        self.next_piece.color = self.next_piece.kind.color(palette);
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Process an action, returns false if it was rejected
    pub fn process_action(&mut self, action: Action) -> bool {
        match (self.state, action) {
            (_, Action::Reset) => {
                self.reset();
                true
            }
            (GameState::Paused, Action::Pause) => {
                self.state = GameState::Playing;
                true
            }
            (GameState::Playing, Action::Pause) => {
                self.state = GameState::Paused;
                true
            }
            (GameState::Playing, _) => {
                if matches!(self.phase, Phase::LineClear(_)) {
                    return false;
                }
                let falling = matches!(self.phase, Phase::HardDrop(_));
                match action {
                    Action::MoveLeft => self.shift(-1),
                    Action::MoveRight => self.shift(1),
                    Action::RotateCW => self.rotate(RotationDirection::Clockwise),
                    Action::RotateCCW => self.rotate(RotationDirection::CounterClockwise),
                    Action::SoftDrop if !falling => self.soft_drop(),
                    Action::HardDrop if !falling => self.hard_drop(),
                    _ => false,
                }
            }
            _ => false,
        }
    }

    /// Advance the engine clock by `dt`
    ///
    /// A running animation takes the whole tick. Otherwise at most one
    /// gravity step happens, then at most one lock delay expiry.
    pub fn tick(&mut self, dt: Duration) {
        if self.state != GameState::Playing {
            return;
        }
        self.now += dt;

        match &self.phase {
            Phase::HardDrop(_) => {
                self.step_hard_drop(dt);
                return;
            }
            Phase::LineClear(batch) => {
                if batch.is_done(self.now) {
                    if let Phase::LineClear(batch) =
                        std::mem::replace(&mut self.phase, Phase::Active)
                    {
                        self.finish_line_clear(batch.rows);
                    }
                }
                return;
            }
            Phase::Active => {}
        }

        self.step_gravity();
        self.check_lock_expiry();
    }

    fn reset(&mut self) {
        let config = self.config;
        let seed = self.randomizer.seed();
        debug!(seed, "reset");
        *self = Self::with_config(EngineConfig {
            seed: Some(seed),
            ..config
        });
        self.config = config;
    }

    fn shift(&mut self, dx: i32) -> bool {
        let Some(piece) = &self.current_piece else {
            return false;
        };
        if !self.board.can_place(piece, dx, 0, None) {
            return false;
        }
        let moved = piece.shifted(dx, 0);
        self.apply_move(moved, GameEvent::Moved);
        true
    }

    fn rotate(&mut self, direction: RotationDirection) -> bool {
        let Some(piece) = &self.current_piece else {
            return false;
        };
        let Some(placement) = placement::resolve_rotation(&self.board, piece, direction) else {
            return false;
        };
        let rotated = piece.placed(placement.shape, placement.x, placement.y);
        self.apply_move(rotated, GameEvent::Rotated);
        true
    }

    /// Swap in a moved piece; a pending lock survives unless it was a rescue
    fn apply_move(&mut self, after: Piece, event: GameEvent) {
        if self.lock_since.is_some() {
            if let Some(before) = &self.current_piece {
                if lock::is_rescue(&self.board, before, &after) {
                    self.lock_since = None;
                }
            }
        }
        self.current_piece = Some(after);
        self.events.push(event);
    }

    fn soft_drop(&mut self) -> bool {
        self.boost_until = Some(self.now + SOFT_DROP_BOOST);
        let Some(piece) = &mut self.current_piece else {
            return false;
        };
        if !self.board.can_place(piece, 0, 1, None) {
            return false;
        }
        piece.y += 1;
        self.soft_drop_distance += 1;
        self.last_drop = self.now;
        self.lock_since = None;
        self.events.push(GameEvent::Moved);
        true
    }

    fn hard_drop(&mut self) -> bool {
        let Some(piece) = &mut self.current_piece else {
            return false;
        };
        let target = self.board.landing_y(piece);
        let distance = target - piece.y;

        // An animated drop is scored where it actually lands
        if self.config.animations && distance > 0 {
            self.phase = Phase::HardDrop(HardDropAnimation::new(piece.y));
        } else {
            self.score.add_hard_drop(distance as u32);
            piece.y = target;
            self.last_drop = self.now;
            self.settle();
        }
        true
    }

    fn step_hard_drop(&mut self, dt: Duration) {
        let Phase::HardDrop(anim) = &mut self.phase else {
            return;
        };
        let Some(piece) = &mut self.current_piece else {
            self.phase = Phase::Active;
            return;
        };
        let target = self.board.landing_y(piece);
        match anim.advance(dt, target) {
            DropStep::Falling(y) => piece.y = y.max(piece.y),
            DropStep::Landed(y) => {
                self.score.add_hard_drop((y - anim.start_y()).max(0) as u32);
                piece.y = y;
                self.phase = Phase::Active;
                self.last_drop = self.now;
                self.settle();
            }
        }
    }

    /// A piece that just came to rest locks now or starts its lock delay
    fn settle(&mut self) {
        let Some(piece) = &self.current_piece else {
            return;
        };
        if lock::is_completely_stuck(&self.board, piece) {
            self.lock_piece();
        } else {
            self.lock_since.get_or_insert(self.now);
        }
    }

    fn step_gravity(&mut self) {
        if self.now.saturating_sub(self.last_drop) < self.drop_time() {
            return;
        }
        self.last_drop = self.now;

        let Some(piece) = &mut self.current_piece else {
            return;
        };
        if self.board.can_place(piece, 0, 1, None) {
            piece.y += 1;
            self.lock_since = None;
        } else {
            self.settle();
        }
    }

    fn check_lock_expiry(&mut self) {
        let Some(since) = self.lock_since else {
            return;
        };
        if self.now.saturating_sub(since) <= self.drop_time() {
            return;
        }
        let can_fall = self
            .current_piece
            .as_ref()
            .is_some_and(|piece| lock::can_fall(&self.board, piece));
        if can_fall {
            self.lock_since = None;
        } else {
            self.lock_piece();
        }
    }

    /// Lock the current piece and move on to clearing or spawning
    fn lock_piece(&mut self) {
        let Some(piece) = self.current_piece.take() else {
            return;
        };
        self.lock_since = None;

        // Add soft drop score
        self.score.add_soft_drop(self.soft_drop_distance);
        self.soft_drop_distance = 0;

        self.board.lock(&piece);
        let cells: Vec<_> = piece.cells().collect();
        debug!(kind = ?piece.kind, x = piece.x, y = piece.y, "piece locked");
        self.events.push(GameEvent::Locked { cells });

        let rows = self.board.full_lines();
        if rows.is_empty() {
            self.spawn();
        } else if self.config.animations {
            self.phase = Phase::LineClear(ClearBatch {
                rows,
                started_at: self.now,
                duration: LINE_CLEAR_DURATION,
            });
        } else {
            self.finish_line_clear(rows);
        }
    }

    fn finish_line_clear(&mut self, rows: Vec<usize>) {
        self.phase = Phase::Active;
        let count = self.board.clear_lines(&rows);
        let leveled = self.score.add_lines(count);
        debug!(count, ?rows, "lines cleared");
        self.events.push(GameEvent::LinesCleared { count, rows });

        if leveled {
            let drop_time = self.score.drop_time();
            debug!(level = self.score.level, ?drop_time, "level up");
            self.events.push(GameEvent::LevelChanged {
                level: self.score.level,
                drop_time,
            });
        }
        self.spawn();
    }

    fn spawn(&mut self) {
        let upcoming = Piece::new(self.randomizer.next(), self.config.palette);
        let piece = std::mem::replace(&mut self.next_piece, upcoming);
        self.lock_since = None;
        self.last_drop = self.now;

        if self.board.is_game_over(&piece) {
            debug!(kind = ?piece.kind, points = self.score.points, "game over");
            self.state = GameState::GameOver;
            self.current_piece = None;
            self.events.push(GameEvent::GameOver);
            return;
        }
        debug!(kind = ?piece.kind, "spawned");
        self.current_piece = Some(piece);
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
