/// GameState: the complete snapshot of a running session.
///
/// Owned by the host and passed explicitly into `step::step` and
/// `draw::compose`. Nothing here is global.
///
/// ## Invariants
///
///   - `keys_collected` == number of keys with `collected == true`
///   - `keys_collected` never decreases
///   - `Session::Complete` is terminal: once set, `step` does nothing

use crate::config::{GameConfig, InteractionConfig, SpeedConfig};
use crate::domain::dialogue::Dialogue;
use crate::domain::entity::{KeyItem, Npc, Player};
use crate::domain::map::TileMap;
use crate::sim::level;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Session {
    Playing,
    Complete,
}

pub struct GameState {
    // ── World ──
    pub map: TileMap,
    pub player: Player,
    pub keys: Vec<KeyItem>,
    pub npcs: Vec<Npc>,

    // ── Quest tracking ──
    pub keys_collected: usize,
    pub keys_required: usize,
    pub session: Session,

    // ── Interaction ──
    pub dialogue: Dialogue,
    /// Frames left before another interaction may fire.
    pub cooldown: u32,
    /// Single-shot interact flag. Set on a fresh press, cleared when acted
    /// on or when the key is seen released.
    pub interact_latch: bool,

    // ── Animation ──
    pub frame: u64,

    // ── Tuning ──
    pub speed: SpeedConfig,
    pub interaction: InteractionConfig,
}

impl GameState {
    pub fn new(config: &GameConfig) -> Self {
        let level = level::populate();
        GameState {
            map: level.map,
            player: level.player,
            keys: level.keys,
            npcs: level.npcs,
            keys_collected: 0,
            keys_required: config.quest.keys_required,
            session: Session::Playing,
            dialogue: Dialogue::Closed,
            cooldown: 0,
            interact_latch: false,
            frame: 0,
            speed: config.speed.clone(),
            interaction: config.interaction.clone(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.session == Session::Complete
    }

    /// Line of the active dialogue, if any.
    pub fn dialogue_line(&self) -> Option<&str> {
        self.dialogue.current_line(&self.npcs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_fresh() {
        let w = GameState::new(&GameConfig::default());
        assert_eq!(w.session, Session::Playing);
        assert_eq!(w.keys_collected, 0);
        assert_eq!(w.keys_required, 3);
        assert_eq!(w.cooldown, 0);
        assert!(!w.interact_latch);
        assert!(!w.dialogue.is_active());
        assert_eq!((w.player.x, w.player.y), (288.0, 384.0));
        assert_eq!(w.dialogue_line(), None);
    }
}
