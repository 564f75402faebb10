//! Input handling with DAS (Delayed Auto Shift) and ARR (Auto Repeat Rate)
//!
//! Uses a polling-based approach that doesn't rely on key release events,
//! which are unreliable on Linux terminals. Release events still clear the
//! held state right away where the terminal reports them.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, ModifierKeyCode};
use stackdrop::game::Action;
use stackdrop::settings::Settings;
use std::time::{Duration, Instant};

/// Time after which we consider a key "released" if no repeat received
const KEY_TIMEOUT: Duration = Duration::from_millis(100);

/// What a key press asks the front end to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Forward to the engine
    Play(Action),
    ToggleAnimations,
    CyclePalette,
    Quit,
}

/// Input handler with DAS/ARR support
pub struct InputHandler {
    /// Last press time for movement keys (for DAS)
    left_state: Option<KeyPressState>,
    right_state: Option<KeyPressState>,
    down_state: Option<KeyPressState>,
    /// Key bindings
    bindings: KeyBindings,
    /// DAS duration
    das: Duration,
    /// ARR duration
    arr: Duration,
}

#[derive(Debug, Clone)]
struct KeyPressState {
    first_press: Instant,
    last_seen: Instant,
    das_triggered: bool,
    last_arr: Option<Instant>,
}

impl KeyPressState {
    fn new(now: Instant) -> Self {
        Self {
            first_press: now,
            last_seen: now,
            das_triggered: false,
            last_arr: None,
        }
    }
}

/// Key bindings configuration - supports multiple keys per action
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub move_left: Vec<KeyCode>,
    pub move_right: Vec<KeyCode>,
    pub soft_drop: Vec<KeyCode>,
    pub hard_drop: Vec<KeyCode>,
    pub rotate_cw: Vec<KeyCode>,
    pub rotate_ccw: Vec<KeyCode>,
    pub pause: Vec<KeyCode>,
    pub reset: Vec<KeyCode>,
    pub toggle_animations: Vec<KeyCode>,
    pub cycle_palette: Vec<KeyCode>,
    pub quit: Vec<KeyCode>,
}

impl KeyBindings {
    /// Parse a key string into KeyCode, `None` for names we don't know
    fn parse_key(s: &str) -> Option<KeyCode> {
        let key = match s.to_lowercase().as_str() {
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "space" => KeyCode::Char(' '),
            "enter" => KeyCode::Enter,
            "tab" => KeyCode::Tab,
            "esc" | "escape" => KeyCode::Esc,
            "shift" => KeyCode::Modifier(ModifierKeyCode::LeftShift),
            "ctrl" | "control" => KeyCode::Modifier(ModifierKeyCode::LeftControl),
            "alt" => KeyCode::Modifier(ModifierKeyCode::LeftAlt),
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyCode::Char(c),
                    _ => return None,
                }
            }
        };
        Some(key)
    }

    /// Parse a list of key strings into KeyCodes
    fn parse_keys(keys: &[String]) -> Vec<KeyCode> {
        keys.iter()
            .filter_map(|s| {
                let key = Self::parse_key(s);
                if key.is_none() {
                    tracing::warn!(key = %s, "unknown key name in bindings");
                }
                key
            })
            .collect()
    }

    /// Create keybindings from settings
    pub fn from_settings(settings: &Settings) -> Self {
        let keys = &settings.keys;
        Self {
            move_left: Self::parse_keys(&keys.move_left),
            move_right: Self::parse_keys(&keys.move_right),
            soft_drop: Self::parse_keys(&keys.soft_drop),
            hard_drop: Self::parse_keys(&keys.hard_drop),
            rotate_cw: Self::parse_keys(&keys.rotate_cw),
            rotate_ccw: Self::parse_keys(&keys.rotate_ccw),
            pause: Self::parse_keys(&keys.pause),
            reset: Self::parse_keys(&keys.reset),
            toggle_animations: Self::parse_keys(&keys.toggle_animations),
            cycle_palette: Self::parse_keys(&keys.cycle_palette),
            quit: Self::parse_keys(&keys.quit),
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl InputHandler {
    /// Create input handler from settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            left_state: None,
            right_state: None,
            down_state: None,
            bindings: KeyBindings::from_settings(settings),
            das: Duration::from_millis(settings.gameplay.das_ms),
            arr: Duration::from_millis(settings.gameplay.arr_ms),
        }
    }

    /// Handle a key press event - returns immediate commands
    pub fn key_down(&mut self, key: KeyEvent) -> Vec<Command> {
        self.key_down_at(key, Instant::now())
    }

    fn key_down_at(&mut self, key: KeyEvent, now: Instant) -> Vec<Command> {
        // Handle Ctrl+C for quit
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return vec![Command::Quit];
        }

        let code = normalize_key(key.code);
        let b = &self.bindings;

        // Movement keys fire once now and repeat from `update`
        let held = if b.move_left.contains(&code) {
            // Cancel opposite direction
            self.right_state = None;
            Some((&mut self.left_state, Action::MoveLeft))
        } else if b.move_right.contains(&code) {
            self.left_state = None;
            Some((&mut self.right_state, Action::MoveRight))
        } else if b.soft_drop.contains(&code) {
            Some((&mut self.down_state, Action::SoftDrop))
        } else {
            None
        };

        if let Some((slot, action)) = held {
            if let Some(state) = slot.as_mut() {
                state.last_seen = now;
                return Vec::new();
            }
            *slot = Some(KeyPressState::new(now));
            return vec![Command::Play(action)];
        }

        let command = if b.hard_drop.contains(&code) {
            Command::Play(Action::HardDrop)
        } else if b.rotate_cw.contains(&code) {
            Command::Play(Action::RotateCW)
        } else if b.rotate_ccw.contains(&code) {
            Command::Play(Action::RotateCCW)
        } else if b.pause.contains(&code) {
            Command::Play(Action::Pause)
        } else if b.reset.contains(&code) {
            Command::Play(Action::Reset)
        } else if b.toggle_animations.contains(&code) {
            Command::ToggleAnimations
        } else if b.cycle_palette.contains(&code) {
            Command::CyclePalette
        } else if b.quit.contains(&code) {
            Command::Quit
        } else {
            return Vec::new();
        };
        vec![command]
    }

    /// Handle a key release event (may not be called on Linux)
    pub fn key_up(&mut self, key: KeyEvent) {
        let code = normalize_key(key.code);

        if self.bindings.move_left.contains(&code) {
            self.left_state = None;
        } else if self.bindings.move_right.contains(&code) {
            self.right_state = None;
        } else if self.bindings.soft_drop.contains(&code) {
            self.down_state = None;
        }
    }

    /// Update held keys and return repeat commands (call every frame)
    ///
    /// Repeats never come slower than the piece falls on its own.
    pub fn update(&mut self, drop_time: Duration) -> Vec<Command> {
        self.update_at(Instant::now(), drop_time)
    }

    fn update_at(&mut self, now: Instant, drop_time: Duration) -> Vec<Command> {
        // Check for timed-out keys (no recent key event = released)
        for slot in [
            &mut self.left_state,
            &mut self.right_state,
            &mut self.down_state,
        ] {
            if slot
                .as_ref()
                .is_some_and(|state| now.duration_since(state.last_seen) > KEY_TIMEOUT)
            {
                *slot = None;
            }
        }

        let das = self.das;
        let arr = self.arr.min(drop_time);

        [
            (&mut self.left_state, Action::MoveLeft),
            (&mut self.right_state, Action::MoveRight),
            (&mut self.down_state, Action::SoftDrop),
        ]
        .into_iter()
        .filter_map(|(slot, action)| {
            let state = slot.as_mut()?;
            process_das_arr(state, now, das, arr).then_some(Command::Play(action))
        })
        .collect()
    }

    /// Clear all held keys (useful for pause/resume)
    pub fn clear(&mut self) {
        self.left_state = None;
        self.right_state = None;
        self.down_state = None;
    }
}

/// Process DAS/ARR logic for a key state, returns true if should trigger action
fn process_das_arr(state: &mut KeyPressState, now: Instant, das: Duration, arr: Duration) -> bool {
    let held_duration = now.duration_since(state.first_press);

    if held_duration >= das {
        if !state.das_triggered {
            // First trigger after DAS
            state.das_triggered = true;
            state.last_arr = Some(now);
            return true;
        } else if let Some(last) = state.last_arr {
            // Subsequent ARR triggers
            if now.duration_since(last) >= arr {
                state.last_arr = Some(now);
                return true;
            }
        }
    }

    false
}

/// Normalize key codes for consistent handling
fn normalize_key(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}
