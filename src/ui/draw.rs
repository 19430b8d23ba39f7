/// Scene composition: GameState + Hud → ordered draw commands.
///
/// `compose` is pure. It decides what is visible, where, and which
/// animation phase each sprite is in; the terminal renderer only turns
/// commands into cells. Paint order is back to front: terrain, keys,
/// NPCs, the player, then the HUD layers.

use crate::domain::entity::{Facing, NpcKind};
use crate::domain::map::TILE_SIZE;
use crate::domain::tile::Terrain;
use crate::sim::world::GameState;
use crate::ui::hud::Hud;

// ── Animation periods, in frames ──

const KEY_GLINT_PERIOD: u64 = 16;
const WATER_SHIMMER_PERIOD: u64 = 30;
const PLAYER_STEP_PERIOD: u64 = 8;
const NPC_BOB_PERIOD: u64 = 20;

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Terrain { gx: usize, gy: usize, terrain: Terrain, shimmer: bool },
    Key { x: f32, y: f32, glint: bool },
    Npc { x: f32, y: f32, kind: NpcKind, bob: bool },
    Player { x: f32, y: f32, facing: Facing, step: bool },
    KeyCounter(String),
    QuestBanner(String),
    DialogueBox(String),
    RewardModal,
}

pub fn compose(state: &GameState, hud: &Hud) -> Vec<DrawCommand> {
    let frame = state.frame;
    let map = &state.map;
    let mut out = Vec::with_capacity(map.width() * map.height() + 16);

    // ── Terrain ──
    for gy in 0..map.height() {
        for gx in 0..map.width() {
            let terrain = map.cell(gx as i64, gy as i64);
            let shimmer = terrain == Terrain::Water
                && ((frame / WATER_SHIMMER_PERIOD) + gx as u64) % 2 == 0;
            out.push(DrawCommand::Terrain { gx, gy, terrain, shimmer });
        }
    }

    // ── Keys (collected ones are gone) ──
    for key in state.keys.iter().filter(|k| !k.collected) {
        out.push(DrawCommand::Key {
            x: key.x as f32 * TILE_SIZE,
            y: key.y as f32 * TILE_SIZE,
            glint: (frame / KEY_GLINT_PERIOD) % 4 == 0,
        });
    }

    // ── NPCs ──
    for npc in &state.npcs {
        out.push(DrawCommand::Npc {
            x: npc.x as f32 * TILE_SIZE,
            y: npc.y as f32 * TILE_SIZE,
            kind: npc.kind,
            bob: (frame / NPC_BOB_PERIOD) % 2 == 1,
        });
    }

    // ── Player ──
    out.push(DrawCommand::Player {
        x: state.player.x,
        y: state.player.y,
        facing: state.player.facing,
        step: (frame / PLAYER_STEP_PERIOD) % 2 == 1,
    });

    // ── HUD ──
    out.push(DrawCommand::KeyCounter(hud.key_counter.clone()));
    out.push(DrawCommand::QuestBanner(hud.quest_banner.clone()));
    if let Some(text) = &hud.dialogue {
        out.push(DrawCommand::DialogueBox(text.clone()));
    }
    if hud.reward_modal {
        out.push(DrawCommand::RewardModal);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::domain::map::{MAP_HEIGHT, MAP_WIDTH};

    fn fresh() -> (GameState, Hud) {
        let cfg = GameConfig::default();
        (GameState::new(&cfg), Hud::new(cfg.quest.keys_required))
    }

    fn keys(cmds: &[DrawCommand]) -> usize {
        cmds.iter().filter(|c| matches!(c, DrawCommand::Key { .. })).count()
    }

    #[test]
    fn every_tile_is_painted_first() {
        let (w, hud) = fresh();
        let cmds = compose(&w, &hud);
        let tiles = MAP_WIDTH * MAP_HEIGHT;
        assert!(cmds[..tiles].iter().all(|c| matches!(c, DrawCommand::Terrain { .. })));
        assert!(!matches!(cmds[tiles], DrawCommand::Terrain { .. }));
    }

    #[test]
    fn collected_keys_are_not_drawn() {
        let (mut w, hud) = fresh();
        assert_eq!(keys(&compose(&w, &hud)), 3);
        w.keys[1].collected = true;
        let cmds = compose(&w, &hud);
        assert_eq!(keys(&cmds), 2);
        assert!(!cmds.iter().any(|c| matches!(
            c,
            DrawCommand::Key { x, y, .. } if *x == 16.0 * TILE_SIZE && *y == 2.0 * TILE_SIZE
        )));
    }

    #[test]
    fn player_is_the_last_sprite() {
        let (w, hud) = fresh();
        let cmds = compose(&w, &hud);
        let last_sprite = cmds
            .iter()
            .rposition(|c| matches!(
                c,
                DrawCommand::Terrain { .. }
                    | DrawCommand::Key { .. }
                    | DrawCommand::Npc { .. }
                    | DrawCommand::Player { .. }
            ))
            .expect("sprites");
        assert!(matches!(
            cmds[last_sprite],
            DrawCommand::Player { x, y, facing: Facing::Down, .. } if x == 288.0 && y == 384.0
        ));
    }

    #[test]
    fn hud_layers_follow_hud_state() {
        let (w, mut hud) = fresh();
        let cmds = compose(&w, &hud);
        assert!(cmds.contains(&DrawCommand::KeyCounter("🔑 0/3".into())));
        assert!(!cmds.iter().any(|c| matches!(c, DrawCommand::DialogueBox(_))));
        assert!(!cmds.contains(&DrawCommand::RewardModal));

        hud.show_dialogue("hi");
        hud.show_reward_modal();
        let cmds = compose(&w, &hud);
        assert!(cmds.contains(&DrawCommand::DialogueBox("hi".into())));
        assert_eq!(cmds.last(), Some(&DrawCommand::RewardModal));
    }

    #[test]
    fn animation_phases_cycle_with_frame() {
        let (mut w, hud) = fresh();
        let glint = |cmds: &[DrawCommand]| {
            cmds.iter().find_map(|c| match c {
                DrawCommand::Key { glint, .. } => Some(*glint),
                _ => None,
            })
        };
        w.frame = 0;
        assert_eq!(glint(&compose(&w, &hud)), Some(true));
        w.frame = KEY_GLINT_PERIOD;
        assert_eq!(glint(&compose(&w, &hud)), Some(false));
        w.frame = 4 * KEY_GLINT_PERIOD;
        assert_eq!(glint(&compose(&w, &hud)), Some(true));
    }

    #[test]
    fn only_water_shimmers() {
        let (w, hud) = fresh();
        for c in compose(&w, &hud) {
            if let DrawCommand::Terrain { terrain, shimmer, .. } = c {
                if terrain != Terrain::Water {
                    assert!(!shimmer);
                }
            }
        }
    }
}
