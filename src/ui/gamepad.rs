/// Gamepad input tracker using gilrs.
///
/// Walking reads the D-pad and the left stick as one set of four held
/// directions. Face and shoulder buttons only matter through the action
/// map, loaded from the `[gamepad]` section of config.toml:
///   A / X    →  Interact (talk, advance dialogue)
///   Start    →  Confirm (start from the title, leave victory)
///   Select   →  Cancel (back to the title)

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Mappable buttons, in `buttons` index order.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Btn {
    A,
    B,
    X,
    Y,
    L1,
    R1,
    L2,
    R2,
    Start,
    Select,
}

const BTN_COUNT: usize = 10;

impl Btn {
    /// Config spelling: the Xbox label or the gilrs compass name, any case.
    fn from_name(s: &str) -> Option<Btn> {
        let btn = match s.to_ascii_uppercase().as_str() {
            "A" | "SOUTH" => Btn::A,
            "B" | "EAST" => Btn::B,
            "X" | "WEST" => Btn::X,
            "Y" | "NORTH" => Btn::Y,
            "L1" | "LB" => Btn::L1,
            "R1" | "RB" => Btn::R1,
            "L2" | "LT" => Btn::L2,
            "R2" | "RT" => Btn::R2,
            "START" => Btn::Start,
            "SELECT" | "BACK" => Btn::Select,
            _ => return None,
        };
        Some(btn)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Dir {
    Up,
    Down,
    Left,
    Right,
}

/// What one physical gilrs button means to us.
#[cfg(feature = "gamepad")]
enum Mapped {
    Button(Btn),
    Pad(Dir),
}

#[cfg(feature = "gamepad")]
fn map_button(btn: Button) -> Option<Mapped> {
    let mapped = match btn {
        Button::South => Mapped::Button(Btn::A),
        Button::East => Mapped::Button(Btn::B),
        Button::West => Mapped::Button(Btn::X),
        Button::North => Mapped::Button(Btn::Y),
        Button::LeftTrigger => Mapped::Button(Btn::L1),
        Button::RightTrigger => Mapped::Button(Btn::R1),
        Button::LeftTrigger2 => Mapped::Button(Btn::L2),
        Button::RightTrigger2 => Mapped::Button(Btn::R2),
        Button::Start => Mapped::Button(Btn::Start),
        Button::Select => Mapped::Button(Btn::Select),
        Button::DPadUp => Mapped::Pad(Dir::Up),
        Button::DPadDown => Mapped::Pad(Dir::Down),
        Button::DPadLeft => Mapped::Pad(Dir::Left),
        Button::DPadRight => Mapped::Pad(Dir::Right),
        _ => return None,
    };
    Some(mapped)
}

/// Held (continuous) and pressed (edge, cleared every `update`).
#[derive(Clone, Copy, Debug, Default)]
struct BtnState {
    held: bool,
    pressed: bool,
}

impl BtnState {
    #[cfg_attr(not(any(feature = "gamepad", test)), allow(dead_code))]
    fn set(&mut self, down: bool) {
        if down && !self.held {
            self.pressed = true;
        }
        self.held = down;
    }
}

#[derive(Debug, PartialEq)]
struct ActionMap {
    interact: Vec<Btn>,
    confirm: Vec<Btn>,
    cancel: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            interact: vec![Btn::A, Btn::X],
            confirm: vec![Btn::Start],
            cancel: vec![Btn::Select],
        }
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    buttons: [BtnState; BTN_COUNT],
    /// D-pad, indexed by `Dir`.
    dpad: [bool; 4],
    /// Left stick (x, y); y is positive up.
    stick: (f32, f32),

    actions: ActionMap,
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let gilrs = match Gilrs::new() {
            Ok(g) => {
                for (id, pad) in g.gamepads() {
                    log::info!("gamepad {:?} found: {}", id, pad.name());
                }
                Some(g)
            }
            Err(e) => {
                log::warn!("gamepad support unavailable: {e}");
                None
            }
        };

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs,
            buttons: [BtnState::default(); BTN_COUNT],
            dpad: [false; 4],
            stick: (0.0, 0.0),
            actions: ActionMap::default(),
        }
    }

    /// Replace action bindings with those named in config. A list with no
    /// recognizable names keeps the default binding.
    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        fn bind(slot: &mut Vec<Btn>, names: &[String]) {
            let btns: Vec<Btn> = names.iter().filter_map(|s| Btn::from_name(s)).collect();
            if !btns.is_empty() {
                *slot = btns;
            }
        }
        bind(&mut self.actions.interact, &cfg.interact);
        bind(&mut self.actions.confirm, &cfg.confirm);
        bind(&mut self.actions.cancel, &cfg.cancel);
    }

    /// Call once per host iteration, after the keyboard drain.
    pub fn update(&mut self) {
        for b in &mut self.buttons {
            b.pressed = false;
        }

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => self.set_button(btn, true),
                EventType::ButtonReleased(btn, _) => self.set_button(btn, false),
                EventType::AxisChanged(Axis::LeftStickX, value, _) => self.stick.0 = value,
                EventType::AxisChanged(Axis::LeftStickY, value, _) => self.stick.1 = value,
                EventType::Connected => log::info!("gamepad {:?} connected", event.id),
                EventType::Disconnected => {
                    log::info!("gamepad {:?} disconnected", event.id);
                    self.release_all();
                }
                _ => {}
            }
        }
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, btn: Button, down: bool) {
        match map_button(btn) {
            Some(Mapped::Button(b)) => self.buttons[b as usize].set(down),
            Some(Mapped::Pad(d)) => self.dpad[d as usize] = down,
            None => {}
        }
    }

    // ── Action queries (config-driven) ──

    fn any_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[b as usize].pressed)
    }

    fn any_held(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[b as usize].held)
    }

    pub fn interact_pressed(&self) -> bool {
        self.any_pressed(&self.actions.interact)
    }
    pub fn interact_held(&self) -> bool {
        self.any_held(&self.actions.interact)
    }
    pub fn confirm_pressed(&self) -> bool {
        self.any_pressed(&self.actions.confirm)
    }
    pub fn cancel_pressed(&self) -> bool {
        self.any_pressed(&self.actions.cancel)
    }

    // ── Walking (held) ──

    fn dir_held(&self, dir: Dir) -> bool {
        let (x, y) = self.stick;
        let stick = match dir {
            Dir::Up => y > STICK_DEADZONE,
            Dir::Down => y < -STICK_DEADZONE,
            Dir::Left => x < -STICK_DEADZONE,
            Dir::Right => x > STICK_DEADZONE,
        };
        stick || self.dpad[dir as usize]
    }

    pub fn up_held(&self) -> bool {
        self.dir_held(Dir::Up)
    }
    pub fn down_held(&self) -> bool {
        self.dir_held(Dir::Down)
    }
    pub fn left_held(&self) -> bool {
        self.dir_held(Dir::Left)
    }
    pub fn right_held(&self) -> bool {
        self.dir_held(Dir::Right)
    }

    #[cfg_attr(not(any(feature = "gamepad", test)), allow(dead_code))]
    fn release_all(&mut self) {
        self.buttons = [BtnState::default(); BTN_COUNT];
        self.dpad = [false; 4];
        self.stick = (0.0, 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn button_names_are_case_insensitive() {
        assert_eq!(Btn::from_name("a"), Some(Btn::A));
        assert_eq!(Btn::from_name("South"), Some(Btn::A));
        assert_eq!(Btn::from_name("back"), Some(Btn::Select));
        assert_eq!(Btn::from_name("rb"), Some(Btn::R1));
        assert_eq!(Btn::from_name("turbo"), None);
    }

    #[test]
    fn config_overrides_mapping() {
        let mut gp = GamepadState::new();
        gp.load_button_config(&GamepadConfig {
            interact: names(&["B"]),
            confirm: names(&["A", "Start"]),
            cancel: names(&["Y"]),
        });
        assert_eq!(gp.actions.interact, vec![Btn::B]);
        assert_eq!(gp.actions.confirm, vec![Btn::A, Btn::Start]);
        assert_eq!(gp.actions.cancel, vec![Btn::Y]);
    }

    #[test]
    fn unknown_names_keep_defaults() {
        let mut gp = GamepadState::new();
        gp.load_button_config(&GamepadConfig {
            interact: names(&["nope"]),
            confirm: vec![],
            cancel: names(&["??"]),
        });
        assert_eq!(gp.actions, ActionMap::default());
    }

    #[test]
    fn press_is_an_edge_hold_is_a_level() {
        let mut gp = GamepadState::new();
        gp.buttons[Btn::X as usize].set(true);
        assert!(gp.interact_pressed());
        assert!(gp.interact_held());

        gp.update();
        assert!(!gp.interact_pressed());
        assert!(gp.interact_held());

        // Still down: no second edge.
        gp.buttons[Btn::X as usize].set(true);
        assert!(!gp.interact_pressed());

        gp.release_all();
        assert!(!gp.interact_held());
    }

    #[test]
    fn stick_and_dpad_both_walk() {
        let mut gp = GamepadState::new();
        gp.stick = (0.1, -0.2);
        assert!(!gp.down_held() && !gp.right_held());
        gp.stick = (-0.8, 0.5);
        assert!(gp.left_held() && gp.up_held());
        gp.stick = (0.0, 0.0);
        gp.dpad[Dir::Right as usize] = true;
        assert!(gp.right_held());
        assert!(!gp.left_held());
    }
}
