/// Keyboard state tracker.
///
/// Tracks which keys are currently held down, enabling:
///   - Continuous movement while a key is held
///   - Edge-triggered interact (a fresh press arms the simulation latch)
///   - Ordered key strokes for the contact-number prompt
///
/// Uses crossterm's keyboard enhancement for Release events when available.
/// Falls back to timeout-based release detection on terminals that don't support it.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::entity::FrameInput;
use crate::ui::gamepad::GamepadState;

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

/// Upper bound of common OS auto-repeat delays. Without Release events a
/// held key goes quiet for this long before repeats start, so a Press
/// inside this window after the key's last activity is a repeat.
const REPEAT_DELAY: Duration = Duration::from_millis(600);

// ── Key Constants ──

pub const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
pub const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
pub const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
pub const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
pub const KEYS_INTERACT: &[KeyCode] = &[KeyCode::Char(' '), KeyCode::Char('e'), KeyCode::Char('E')];
pub const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter];
pub const KEYS_QUIT: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q')];
pub const KEYS_EXPORT: &[KeyCode] = &[KeyCode::Char('d'), KeyCode::Char('D')];

pub struct KeyboardState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Last Press/Repeat per key, kept for `REPEAT_DELAY` (fallback mode).
    last_seen: HashMap<KeyCode, Instant>,

    /// Keys that went from "not held" to "held" during the most recent
    /// `drain_events()` call.
    fresh_presses: Vec<KeyCode>,

    /// Raw key events collected during drain, for meta keys and text entry.
    raw_events: Vec<KeyEvent>,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,
}

impl KeyboardState {
    pub fn new() -> Self {
        KeyboardState {
            last_active: HashMap::with_capacity(16),
            last_seen: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call this once per host iteration, before the simulation tick.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.record(key, Instant::now());
            }
        }

        self.expire(Instant::now());
    }

    fn record(&mut self, key: KeyEvent, now: Instant) {
        self.raw_events.push(key);

        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.last_active.remove(&key.code);
            }
            KeyEventKind::Release => {
                // Timeout-based expiry handles release instead
            }
            KeyEventKind::Repeat => {
                self.last_active.insert(key.code, now);
                self.last_seen.insert(key.code, now);
            }
            KeyEventKind::Press => {
                let was_held = self.is_held_at(key.code, now);
                let repeating = !self.honor_release && self.seen_within(key.code, now, REPEAT_DELAY);
                self.last_active.insert(key.code, now);
                self.last_seen.insert(key.code, now);
                if !was_held && !repeating {
                    self.fresh_presses.push(key.code);
                }
            }
        }
    }

    fn expire(&mut self, now: Instant) {
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
        self.last_seen.retain(|_, t| now.duration_since(*t) < REPEAT_DELAY);
    }

    /// Is this key currently held down?
    pub fn is_held(&self, code: KeyCode) -> bool {
        self.is_held_at(code, Instant::now())
    }

    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.is_held(*c))
    }

    /// Was this key freshly pressed this iteration? (edge trigger)
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// Press and Repeat strokes in arrival order, for text entry.
    pub fn strokes(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.raw_events
            .iter()
            .filter(|k| k.kind != KeyEventKind::Release)
            .filter(|k| !k.modifiers.contains(KeyModifiers::CONTROL))
            .map(|k| k.code)
    }

    /// Check if any raw event this iteration has Ctrl+C
    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }

    // ── Internal ──

    fn seen_within(&self, code: KeyCode, now: Instant, window: Duration) -> bool {
        self.last_seen
            .get(&code)
            .map(|t| now.duration_since(*t) < window)
            .unwrap_or(false)
    }

    fn is_held_at(&self, code: KeyCode, now: Instant) -> bool {
        self.last_active
            .get(&code)
            .map(|t| now.duration_since(*t) < HOLD_TIMEOUT)
            .unwrap_or(false)
    }
}

/// Build the per-tick snapshot the simulation consumes.
pub fn frame_input(kb: &KeyboardState, gp: &GamepadState) -> FrameInput {
    let held = |keys: &[KeyCode]| kb.any_held(keys) || kb.any_pressed(keys);
    FrameInput {
        up: held(KEYS_UP) || gp.up_held(),
        down: held(KEYS_DOWN) || gp.down_held(),
        left: held(KEYS_LEFT) || gp.left_held(),
        right: held(KEYS_RIGHT) || gp.right_held(),
        interact: held(KEYS_INTERACT) || gp.interact_held(),
        interact_pressed: kb.any_pressed(KEYS_INTERACT) || gp.interact_pressed(),
    }
}
