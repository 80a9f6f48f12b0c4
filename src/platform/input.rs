//! Input action layer
//!
//! Raw samples (held key codes, virtual touch buttons, touch gestures) are
//! folded into eight named actions. `update` is called once per simulation
//! tick and derives the just-pressed edges from the previous tick.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{GESTURE_MAX_MS, SWIPE_HOLD_MS, SWIPE_THRESHOLD, TAP_MAX_DISTANCE};

/// Named input actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Left,
    Right,
    Up,
    Down,
    Brake,
    Pause,
    Confirm,
    Debug,
}

const ACTION_COUNT: usize = 8;

impl Action {
    const fn index(self) -> usize {
        match self {
            Action::Left => 0,
            Action::Right => 1,
            Action::Up => 2,
            Action::Down => 3,
            Action::Brake => 4,
            Action::Pause => 5,
            Action::Confirm => 6,
            Action::Debug => 7,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Left => "left",
            Action::Right => "right",
            Action::Up => "up",
            Action::Down => "down",
            Action::Brake => "brake",
            Action::Pause => "pause",
            Action::Confirm => "confirm",
            Action::Debug => "debug",
        }
    }
}

/// One boolean per action
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub fn set(&mut self, action: Action, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub fn is_down(&self, action: Action) -> bool {
        self.down[action.index()]
    }

    /// Actions down here but not in `earlier`
    pub fn rising_from(&self, earlier: &ActionStates) -> ActionStates {
        let mut edges = ActionStates::default();
        for (i, edge) in edges.down.iter_mut().enumerate() {
            *edge = self.down[i] && !earlier.down[i];
        }
        edges
    }
}

/// Built-in key table
pub const DEFAULT_KEY_MAP: [(&str, Action); 13] = [
    ("ArrowLeft", Action::Left),
    ("KeyA", Action::Left),
    ("ArrowRight", Action::Right),
    ("KeyD", Action::Right),
    ("ArrowUp", Action::Up),
    ("KeyW", Action::Up),
    ("ArrowDown", Action::Brake),
    ("KeyS", Action::Brake),
    ("Escape", Action::Pause),
    ("KeyP", Action::Pause),
    ("Enter", Action::Confirm),
    ("Space", Action::Confirm),
    ("Backquote", Action::Debug),
];

/// Code to action table: defaults plus user overrides
///
/// An override replaces the default for its code. Each action has at most
/// one override at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyMap {
    overrides: BTreeMap<String, Action>,
}

impl KeyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_overrides(overrides: BTreeMap<String, Action>) -> Self {
        let mut map = Self::new();
        for (code, action) in overrides {
            map.bind(action, &code);
        }
        map
    }

    pub fn overrides(&self) -> &BTreeMap<String, Action> {
        &self.overrides
    }

    pub fn action_for(&self, code: &str) -> Option<Action> {
        self.overrides.get(code).copied().or_else(|| {
            DEFAULT_KEY_MAP
                .iter()
                .find(|(default_code, _)| *default_code == code)
                .map(|&(_, action)| action)
        })
    }

    /// Bind `code` to `action`, dropping the action's previous override
    pub fn bind(&mut self, action: Action, code: &str) {
        self.overrides.retain(|_, bound| *bound != action);
        self.overrides.insert(code.to_string(), action);
    }

    /// Code shown for an action: its override, else its first default
    pub fn code_for(&self, action: Action) -> Option<&str> {
        self.overrides
            .iter()
            .find(|(_, bound)| **bound == action)
            .map(|(code, _)| code.as_str())
            .or_else(|| {
                DEFAULT_KEY_MAP
                    .iter()
                    .find(|(_, default_action)| *default_action == action)
                    .map(|&(code, _)| code)
            })
    }
}

/// On-screen buttons
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TouchButtons {
    pub left: bool,
    pub right: bool,
    pub brake: bool,
}

impl TouchButtons {
    pub fn any(&self) -> bool {
        self.left || self.right || self.brake
    }
}

/// Touch gesture samples; times are ms on the same clock as the frame driver
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TouchEvent {
    /// `on_surface` is false for touches that begin outside the play surface
    Start {
        id: u32,
        pos: Vec2,
        time_ms: f64,
        on_surface: bool,
    },
    Move {
        id: u32,
        pos: Vec2,
    },
    End {
        id: u32,
        pos: Vec2,
        time_ms: f64,
    },
    Cancel {
        id: u32,
    },
}

/// Everything the device layer reports for one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawInput {
    pub held_codes: BTreeSet<String>,
    pub touch_buttons: TouchButtons,
    pub touches: Vec<TouchEvent>,
}

impl RawInput {
    /// Sample with only these keys held
    pub fn keys(codes: &[&str]) -> Self {
        Self {
            held_codes: codes.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.held_codes.is_empty() && !self.touch_buttons.any() && self.touches.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct TouchTrack {
    start: Vec2,
    start_ms: f64,
    on_surface: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Swipe {
    action: Action,
    at_ms: f64,
}

/// Per-tick action state with edge detection
#[derive(Debug, Clone, Default)]
pub struct InputLayer {
    keymap: KeyMap,
    keys: BTreeSet<String>,
    buttons: TouchButtons,
    /// Held through the last `clear`; ignored until released
    latched_keys: BTreeSet<String>,
    latched_buttons: TouchButtons,
    touches: BTreeMap<u32, TouchTrack>,
    pending_tap: bool,
    swipe: Option<Swipe>,
    current: ActionStates,
    previous: ActionStates,
    just_pressed: ActionStates,
    activity: bool,
}

impl InputLayer {
    pub fn new(keymap: KeyMap) -> Self {
        Self {
            keymap,
            ..Default::default()
        }
    }

    pub fn keymap(&self) -> &KeyMap {
        &self.keymap
    }

    pub fn set_keybind(&mut self, action: Action, code: &str) {
        self.keymap.bind(action, code);
        log::debug!("Bound {} to {}", code, action.as_str());
    }

    /// Take in one frame's raw sample
    pub fn ingest(&mut self, raw: &RawInput) {
        if !raw.is_empty() {
            self.activity = true;
        }

        self.keys.clone_from(&raw.held_codes);
        let keys = &self.keys;
        self.latched_keys.retain(|code| keys.contains(code));

        self.buttons = raw.touch_buttons;
        self.latched_buttons.left &= self.buttons.left;
        self.latched_buttons.right &= self.buttons.right;
        self.latched_buttons.brake &= self.buttons.brake;

        for event in &raw.touches {
            self.handle_touch(*event);
        }
    }

    fn handle_touch(&mut self, event: TouchEvent) {
        match event {
            TouchEvent::Start {
                id,
                pos,
                time_ms,
                on_surface,
            } => {
                self.touches.insert(
                    id,
                    TouchTrack {
                        start: pos,
                        start_ms: time_ms,
                        on_surface,
                    },
                );
            }
            TouchEvent::Move { .. } => {}
            TouchEvent::End { id, pos, time_ms } => {
                let Some(track) = self.touches.remove(&id) else {
                    return;
                };
                if !track.on_surface {
                    return;
                }
                let delta = pos - track.start;
                let duration = time_ms - track.start_ms;
                if duration >= GESTURE_MAX_MS {
                    return;
                }

                if delta.length() < TAP_MAX_DISTANCE && !self.buttons.any() {
                    self.pending_tap = true;
                }
                if delta.x.abs() > delta.y.abs() && delta.x.abs() > SWIPE_THRESHOLD {
                    let action = if delta.x > 0.0 {
                        Action::Right
                    } else {
                        Action::Left
                    };
                    self.swipe = Some(Swipe {
                        action,
                        at_ms: time_ms,
                    });
                }
            }
            TouchEvent::Cancel { id } => {
                self.touches.remove(&id);
            }
        }
    }

    /// Recompute actions for this tick; `now_ms` is on the touch clock
    pub fn update(&mut self, now_ms: f64) {
        self.previous = self.current;
        let mut current = ActionStates::default();

        for code in self.keys.difference(&self.latched_keys) {
            if let Some(action) = self.keymap.action_for(code) {
                current.set(action, true);
            }
        }

        let latched = self.latched_buttons;
        if self.buttons.left && !latched.left {
            current.set(Action::Left, true);
        }
        if self.buttons.right && !latched.right {
            current.set(Action::Right, true);
        }
        if self.buttons.brake && !latched.brake {
            current.set(Action::Brake, true);
        }

        // A tap waits while a movement button is held
        if self.pending_tap && !self.buttons.any() {
            current.set(Action::Confirm, true);
            self.pending_tap = false;
        }

        // Too old to become a tap or swipe; covers a lost `End`
        self.touches
            .retain(|_, track| now_ms - track.start_ms < GESTURE_MAX_MS);

        if let Some(swipe) = self.swipe {
            if now_ms - swipe.at_ms < SWIPE_HOLD_MS {
                current.set(swipe.action, true);
            } else {
                self.swipe = None;
            }
        }

        self.current = current;
        self.just_pressed = current.rising_from(&self.previous);
    }

    pub fn held(&self, action: Action) -> bool {
        self.current.is_down(action)
    }

    pub fn just_pressed(&self, action: Action) -> bool {
        self.just_pressed.is_down(action)
    }

    /// Raw codes held in the latest sample, latched ones included
    pub fn held_codes(&self) -> &BTreeSet<String> {
        &self.keys
    }

    /// Forget all action state; anything still held is ignored until released
    pub fn clear(&mut self) {
        self.latched_keys.clone_from(&self.keys);
        self.latched_buttons = self.buttons;
        self.touches.clear();
        self.pending_tap = false;
        self.swipe = None;
        self.current = ActionStates::default();
        self.previous = ActionStates::default();
        self.just_pressed = ActionStates::default();
    }

    /// Whether any raw input arrived since the last call
    pub fn take_activity(&mut self) -> bool {
        std::mem::take(&mut self.activity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn step(input: &mut InputLayer, raw: &RawInput, now_ms: f64) {
        input.ingest(raw);
        input.update(now_ms);
    }

    fn tap(id: u32, at: f64, moved: Vec2, held_for: f64) -> Vec<TouchEvent> {
        let start = Vec2::new(200.0, 300.0);
        vec![
            TouchEvent::Start {
                id,
                pos: start,
                time_ms: at,
                on_surface: true,
            },
            TouchEvent::End {
                id,
                pos: start + moved,
                time_ms: at + held_for,
            },
        ]
    }

    #[test]
    fn test_default_bindings() {
        let map = KeyMap::new();
        assert_eq!(map.action_for("KeyA"), Some(Action::Left));
        assert_eq!(map.action_for("ArrowDown"), Some(Action::Brake));
        assert_eq!(map.action_for("Backquote"), Some(Action::Debug));
        assert_eq!(map.action_for("KeyZ"), None);
        assert_eq!(map.code_for(Action::Confirm), Some("Enter"));
        assert_eq!(map.code_for(Action::Down), None);
    }

    #[test]
    fn test_rebind_replaces_previous_override() {
        let mut map = KeyMap::new();
        map.bind(Action::Left, "KeyQ");
        map.bind(Action::Left, "KeyZ");
        assert_eq!(map.action_for("KeyQ"), None);
        assert_eq!(map.action_for("KeyZ"), Some(Action::Left));
        assert_eq!(map.code_for(Action::Left), Some("KeyZ"));
        // Defaults for the action still work
        assert_eq!(map.action_for("ArrowLeft"), Some(Action::Left));

        // An override on a default code wins over the default
        map.bind(Action::Pause, "KeyA");
        assert_eq!(map.action_for("KeyA"), Some(Action::Pause));
        assert_eq!(map.overrides().len(), 2);
    }

    #[test]
    fn test_edge_lasts_one_tick() {
        let mut input = InputLayer::default();
        let held = RawInput::keys(&["Enter"]);

        step(&mut input, &held, 0.0);
        assert!(input.held(Action::Confirm));
        assert!(input.just_pressed(Action::Confirm));

        step(&mut input, &held, 16.0);
        assert!(input.held(Action::Confirm));
        assert!(!input.just_pressed(Action::Confirm));

        step(&mut input, &RawInput::default(), 33.0);
        assert!(!input.held(Action::Confirm));
        step(&mut input, &held, 50.0);
        assert!(input.just_pressed(Action::Confirm));
    }

    #[test]
    fn test_two_codes_one_action() {
        let mut input = InputLayer::default();
        step(&mut input, &RawInput::keys(&["KeyA"]), 0.0);
        // Second key for the same action while held is not a new press
        step(&mut input, &RawInput::keys(&["KeyA", "ArrowLeft"]), 16.0);
        assert!(!input.just_pressed(Action::Left));
        assert!(input.held(Action::Left));
    }

    #[test]
    fn test_clear_latches_held_keys() {
        let mut input = InputLayer::default();
        let held = RawInput::keys(&["Enter"]);
        step(&mut input, &held, 0.0);
        input.clear();
        assert!(!input.held(Action::Confirm));

        // Still held after the transition: no action, no edge
        step(&mut input, &held, 16.0);
        assert!(!input.held(Action::Confirm));
        assert!(!input.just_pressed(Action::Confirm));

        // Release and press again
        step(&mut input, &RawInput::default(), 33.0);
        step(&mut input, &held, 50.0);
        assert!(input.just_pressed(Action::Confirm));
    }

    #[test]
    fn test_touch_buttons() {
        let mut input = InputLayer::default();
        let raw = RawInput {
            touch_buttons: TouchButtons {
                brake: true,
                ..Default::default()
            },
            ..Default::default()
        };
        step(&mut input, &raw, 0.0);
        assert!(input.just_pressed(Action::Brake));
        input.clear();
        step(&mut input, &raw, 16.0);
        assert!(!input.held(Action::Brake));
    }

    #[test]
    fn test_tap_confirms_once() {
        let mut input = InputLayer::default();
        let raw = RawInput {
            touches: tap(1, 0.0, Vec2::new(5.0, 5.0), 120.0),
            ..Default::default()
        };
        step(&mut input, &raw, 120.0);
        assert!(input.just_pressed(Action::Confirm));
        step(&mut input, &RawInput::default(), 136.0);
        assert!(!input.held(Action::Confirm));
    }

    #[test]
    fn test_slow_or_long_touch_is_not_a_tap() {
        let mut input = InputLayer::default();
        let slow = RawInput {
            touches: tap(1, 0.0, Vec2::ZERO, 400.0),
            ..Default::default()
        };
        step(&mut input, &slow, 400.0);
        assert!(!input.held(Action::Confirm));

        let far = RawInput {
            touches: tap(2, 500.0, Vec2::new(0.0, 80.0), 100.0),
            ..Default::default()
        };
        step(&mut input, &far, 600.0);
        assert!(!input.held(Action::Confirm));
    }

    #[test]
    fn test_tap_ignored_with_button_held() {
        let mut input = InputLayer::default();
        let raw = RawInput {
            touch_buttons: TouchButtons {
                left: true,
                ..Default::default()
            },
            touches: tap(1, 0.0, Vec2::ZERO, 50.0),
            ..Default::default()
        };
        step(&mut input, &raw, 50.0);
        assert!(!input.held(Action::Confirm));
        assert!(input.held(Action::Left));
    }

    #[test]
    fn test_off_surface_touch_ignored() {
        let mut input = InputLayer::default();
        let raw = RawInput {
            touches: vec![
                TouchEvent::Start {
                    id: 4,
                    pos: Vec2::ZERO,
                    time_ms: 0.0,
                    on_surface: false,
                },
                TouchEvent::End {
                    id: 4,
                    pos: Vec2::ZERO,
                    time_ms: 40.0,
                },
            ],
            ..Default::default()
        };
        step(&mut input, &raw, 40.0);
        assert!(!input.just_pressed(Action::Confirm));
        assert!(!input.held(Action::Confirm));
    }

    #[test]
    fn test_unfinished_touch_expires() {
        let mut input = InputLayer::default();
        let start = RawInput {
            touches: vec![TouchEvent::Start {
                id: 9,
                pos: Vec2::new(100.0, 100.0),
                time_ms: 0.0,
                on_surface: true,
            }],
            ..Default::default()
        };
        step(&mut input, &start, 0.0);
        step(&mut input, &RawInput::default(), 100.0);
        assert_eq!(input.touches.len(), 1);

        step(&mut input, &RawInput::default(), GESTURE_MAX_MS);
        assert!(input.touches.is_empty());

        // A late end for the dropped touch does nothing
        let end = RawInput {
            touches: vec![TouchEvent::End {
                id: 9,
                pos: Vec2::new(100.0, 100.0),
                time_ms: 320.0,
            }],
            ..Default::default()
        };
        step(&mut input, &end, 320.0);
        assert!(!input.held(Action::Confirm));
    }

    #[test]
    fn test_swipe_holds_direction() {
        let mut input = InputLayer::default();
        let raw = RawInput {
            touches: tap(1, 0.0, Vec2::new(-120.0, 10.0), 150.0),
            ..Default::default()
        };
        step(&mut input, &raw, 150.0);
        assert!(input.just_pressed(Action::Left));
        // A swipe is never a tap
        assert!(!input.held(Action::Confirm));

        step(&mut input, &RawInput::default(), 300.0);
        assert!(input.held(Action::Left));
        step(&mut input, &RawInput::default(), 360.0);
        assert!(!input.held(Action::Left));
    }

    #[test]
    fn test_vertical_swipe_ignored() {
        let mut input = InputLayer::default();
        let raw = RawInput {
            touches: tap(1, 0.0, Vec2::new(60.0, 90.0), 150.0),
            ..Default::default()
        };
        step(&mut input, &raw, 150.0);
        assert!(!input.held(Action::Right));
    }

    #[test]
    fn test_activity_flag() {
        let mut input = InputLayer::default();
        input.ingest(&RawInput::default());
        assert!(!input.take_activity());
        input.ingest(&RawInput::keys(&["KeyZ"]));
        assert!(input.take_activity());
        assert!(!input.take_activity());
    }

    #[test]
    fn test_custom_binding_drives_action() {
        let mut input = InputLayer::default();
        input.set_keybind(Action::Right, "KeyL");
        step(&mut input, &RawInput::keys(&["KeyL"]), 0.0);
        assert!(input.just_pressed(Action::Right));
    }

    proptest! {
        #[test]
        fn prop_one_edge_per_press(trace in prop::collection::vec(any::<bool>(), 1..300)) {
            let mut input = InputLayer::default();
            let mut presses = 0;
            let mut edges = 0;
            let mut was_down = false;
            for (i, down) in trace.into_iter().enumerate() {
                let raw = if down { RawInput::keys(&["Space"]) } else { RawInput::default() };
                step(&mut input, &raw, i as f64 * 16.0);
                if down && !was_down {
                    presses += 1;
                }
                if input.just_pressed(Action::Confirm) {
                    edges += 1;
                    prop_assert!(input.held(Action::Confirm));
                }
                was_down = down;
            }
            prop_assert_eq!(presses, edges);
        }
    }
}
