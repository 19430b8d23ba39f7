/// Entities: Player, KeyItem, Npc.
/// Positions: the player lives in pixel space, items and NPCs on the grid.

use super::map::{tile_center, TILE_SIZE};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Down,
    Right,
    Up,
    Left,
}

/// Frame input snapshot: held directions plus the interact edge.
/// Built by the host once per tick and handed to `step` by value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Interact key currently held.
    pub interact: bool,
    /// Interact key went released → held since the previous snapshot.
    pub interact_pressed: bool,
}

#[derive(Clone, Debug)]
pub struct Player {
    /// Top-left corner of the player's square, in pixels.
    pub x: f32,
    pub y: f32,
    pub facing: Facing,
}

impl Player {
    /// Spawn on grid cell (gx, gy), facing down.
    pub fn at_tile(gx: usize, gy: usize) -> Self {
        Player {
            x: gx as f32 * TILE_SIZE,
            y: gy as f32 * TILE_SIZE,
            facing: Facing::Down,
        }
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + TILE_SIZE / 2.0, self.y + TILE_SIZE / 2.0)
    }
}

/// A golden key. `collected` only ever goes false → true.
#[derive(Clone, Debug)]
pub struct KeyItem {
    pub x: usize,
    pub y: usize,
    pub collected: bool,
}

impl KeyItem {
    pub fn new(x: usize, y: usize) -> Self {
        KeyItem { x, y, collected: false }
    }

    pub fn center(&self) -> (f32, f32) {
        tile_center(self.x, self.y)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NpcKind {
    Sage,
    Guardian,
}

#[derive(Clone, Debug)]
pub struct Npc {
    pub x: usize,
    pub y: usize,
    pub kind: NpcKind,
    pub lines: Vec<String>,
}

impl Npc {
    pub fn new(x: usize, y: usize, kind: NpcKind, lines: &[&str]) -> Self {
        Npc {
            x,
            y,
            kind,
            lines: lines.iter().map(|l| l.to_string()).collect(),
        }
    }

    pub fn center(&self) -> (f32, f32) {
        tile_center(self.x, self.y)
    }
}
