//! Score, level and gravity speed

use std::time::Duration;

/// Every this many lines the level goes up by one
pub const LINES_PER_LEVEL: u32 = 10;

/// Highest level the gravity curve is evaluated at
const MAX_SPEED_LEVEL: u32 = 20;

/// Scoring calculation
#[derive(Debug, Clone)]
pub struct Score {
    /// Current score
    pub points: u64,
    /// Current level
    pub level: u32,
    /// Total lines cleared
    pub lines: u32,
    starting_level: u32,
}

impl Default for Score {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Score {
    pub fn new(starting_level: u32) -> Self {
        let starting_level = starting_level.max(1);
        Self {
            points: 0,
            level: starting_level,
            lines: 0,
            starting_level,
        }
    }

    /// Add points and lines for a clear of `count` rows
    ///
    /// Returns true if the level went up.
    pub fn add_lines(&mut self, count: usize) -> bool {
        let base = match count {
            0 => return false,
            1 => 100,
            2 => 300,
            3 => 500,
            _ => 800,
        };
        // Points use the level the clear was made on
        self.points += base * self.level as u64;
        self.lines += count as u32;

        let level = self.starting_level + self.lines / LINES_PER_LEVEL;
        let leveled = level != self.level;
        self.level = level;
        leveled
    }

    /// Add score for soft drop (1 point per cell)
    pub fn add_soft_drop(&mut self, cells: u32) {
        self.points += cells as u64;
    }

    /// Add score for hard drop (2 points per cell)
    pub fn add_hard_drop(&mut self, cells: u32) {
        self.points += cells as u64 * 2;
    }

    /// Get the fall speed in seconds for the current level
    pub fn fall_speed(&self) -> f64 {
        // Tetris Guideline gravity formula
        // Level 1: 1 second per row, Level 20: ~0.01 seconds per row
        let level = self.level.min(MAX_SPEED_LEVEL) as f64;
        (0.8 - ((level - 1.0) * 0.007)).powf(level - 1.0)
    }

    /// Time between gravity steps at the current level
    pub fn drop_time(&self) -> Duration {
        Duration::from_secs_f64(self.fall_speed())
    }
}
