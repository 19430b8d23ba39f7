/// The built-in world: map, spawn point, keys and NPCs.
///
/// There is exactly one level and it is compiled in. `populate` is the
/// single place the registry is filled, so a fresh session and a reset
/// session always start identical.

use crate::domain::entity::{KeyItem, Npc, NpcKind, Player};
use crate::domain::map::TileMap;

pub const PLAYER_SPAWN: (usize, usize) = (9, 12);

pub const KEY_POSITIONS: [(usize, usize); 3] = [(3, 3), (16, 2), (10, 7)];

const SAGE_LINES: [&str; 3] = [
    "Greetings, traveler! You seek the secret, don't you?",
    "Three Golden Keys are hidden in this realm.",
    "Find them all, and the secret shall be revealed...",
];

const GUARDIAN_LINES: [&str; 3] = [
    "I guard the eastern key.",
    "Only the worthy may pass...",
    "...and you seem worthy enough. Go forth!",
];

/// Everything a session needs from the level.
pub struct LevelDef {
    pub map: TileMap,
    pub player: Player,
    pub keys: Vec<KeyItem>,
    pub npcs: Vec<Npc>,
}

pub fn populate() -> LevelDef {
    LevelDef {
        map: TileMap::world(),
        player: Player::at_tile(PLAYER_SPAWN.0, PLAYER_SPAWN.1),
        keys: KEY_POSITIONS.iter().map(|&(x, y)| KeyItem::new(x, y)).collect(),
        npcs: vec![
            Npc::new(5, 7, NpcKind::Sage, &SAGE_LINES),
            Npc::new(14, 5, NpcKind::Guardian, &GUARDIAN_LINES),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entities_stand_on_walkable_ground() {
        let level = populate();
        for k in &level.keys {
            assert!(level.map.cell(k.x as i64, k.y as i64).is_walkable(), "key at {},{}", k.x, k.y);
        }
        for n in &level.npcs {
            assert!(level.map.cell(n.x as i64, n.y as i64).is_walkable(), "npc at {},{}", n.x, n.y);
        }
        let (sx, sy) = PLAYER_SPAWN;
        assert!(level.map.cell(sx as i64, sy as i64).is_walkable());
    }

    #[test]
    fn registry_starts_uncollected() {
        let level = populate();
        assert_eq!(level.keys.len(), 3);
        assert!(level.keys.iter().all(|k| !k.collected));
        assert_eq!(level.npcs[0].kind, NpcKind::Sage);
        assert_eq!(level.npcs[1].kind, NpcKind::Guardian);
        assert_eq!(level.npcs[0].lines.len(), 3);
    }
}
