//! Hard drop fall animation
//!
//! Purely presentational timing: the piece accelerates from where it was
//! dropped, and the landing row is supplied fresh on every step because a
//! sideways nudge mid-fall can change it.

use std::time::Duration;

/// Acceleration of a hard-dropped piece, in cells per second squared
pub const GRAVITY: f64 = 400.0;

/// Upper bound on how long a drop may take to play out
pub const MAX_DURATION: Duration = Duration::from_millis(250);

/// Outcome of advancing the fall by one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropStep {
    /// Still in the air, drawn at this row
    Falling(i32),
    /// Reached (or was snapped to) the landing row
    Landed(i32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HardDropAnimation {
    start_y: i32,
    elapsed: Duration,
    budget: Duration,
}

impl HardDropAnimation {
    pub fn new(start_y: i32) -> Self {
        Self {
            start_y,
            elapsed: Duration::ZERO,
            budget: MAX_DURATION,
        }
    }

    pub fn start_y(&self) -> i32 {
        self.start_y
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Interpolated row, `y0 + g t^2 / 2`
    pub fn position(&self) -> f64 {
        let t = self.elapsed.as_secs_f64();
        self.start_y as f64 + 0.5 * GRAVITY * t * t
    }

    /// Move the clock forward by `dt` towards the current landing row
    pub fn advance(&mut self, dt: Duration, target: i32) -> DropStep {
        self.elapsed += dt;
        let pos = self.position();
        if self.elapsed >= self.budget || pos >= target as f64 {
            DropStep::Landed(target)
        } else {
            DropStep::Falling((pos.floor() as i32).min(target))
        }
    }
}
