/// The step function: advances the session by one tick.
///
/// Processing order:
///   0. Completion gate
///   1. Interact latch update (from the input snapshot)
///   2. Frame counter
///   3. Cooldown
///   4. Dialogue advancement (returns early while a dialogue is open)
///   5. Movement proposal + facing
///   6. Collision resolution, one axis at a time
///   7. Key pickups and the completion check
///   8. NPC interaction
///
/// Side effects (sound, HUD) are returned as events; the step itself
/// never talks to a collaborator.

use crate::domain::dialogue::{Advance, Dialogue};
use crate::domain::entity::{Facing, FrameInput};
use crate::domain::physics;
use crate::domain::rules;
use super::event::GameEvent;
use super::world::{GameState, Session};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut GameState, input: FrameInput) -> Vec<GameEvent> {
    if world.session == Session::Complete { return vec![]; }

    update_latch(world, &input);

    let mut events: Vec<GameEvent> = Vec::new();
    world.frame = world.frame.wrapping_add(1);

    if world.cooldown > 0 {
        world.cooldown -= 1;
    }

    if world.dialogue.is_active() {
        resolve_dialogue(world, &mut events);
        return events;
    }

    resolve_movement(world, &input);
    if resolve_pickups(world, &mut events) { return events; }
    resolve_interaction(world, &mut events);

    events
}

// ══════════════════════════════════════════════════════════════
// Input latch
// ══════════════════════════════════════════════════════════════

/// A fresh press arms the latch; releasing the key disarms it.
/// A press and release inside one tick still counts as a press.
fn update_latch(world: &mut GameState, input: &FrameInput) {
    if input.interact_pressed {
        world.interact_latch = true;
    } else if !input.interact {
        world.interact_latch = false;
    }
}

/// Consume the latch if it is armed and no cooldown is running.
fn take_press(world: &mut GameState) -> bool {
    if world.interact_latch && world.cooldown == 0 {
        world.interact_latch = false;
        true
    } else {
        false
    }
}

// ══════════════════════════════════════════════════════════════
// Dialogue
// ══════════════════════════════════════════════════════════════

fn resolve_dialogue(world: &mut GameState, events: &mut Vec<GameEvent>) {
    let npc = match world.dialogue {
        Dialogue::Active { npc, .. } => npc,
        Dialogue::Closed => return,
    };
    if !take_press(world) { return; }

    world.cooldown = world.interaction.advance_cooldown;
    match world.dialogue.advance(&world.npcs) {
        Advance::Line(index) => {
            let line = world.dialogue_line().unwrap_or_default().to_string();
            events.push(GameEvent::DialogueAdvanced { npc, index, line });
        }
        Advance::Closed => events.push(GameEvent::DialogueClosed { npc }),
    }
}

// ══════════════════════════════════════════════════════════════
// Movement
// ══════════════════════════════════════════════════════════════

/// Directions are applied in the order up, down, left, right. Every held
/// direction overwrites facing, so the last one wins.
fn resolve_movement(world: &mut GameState, input: &FrameInput) {
    let speed = world.speed.player_speed;
    let p = &mut world.player;
    let mut nx = p.x;
    let mut ny = p.y;

    if input.up {
        ny -= speed;
        p.facing = Facing::Up;
    }
    if input.down {
        ny += speed;
        p.facing = Facing::Down;
    }
    if input.left {
        nx -= speed;
        p.facing = Facing::Left;
    }
    if input.right {
        nx += speed;
        p.facing = Facing::Right;
    }

    if nx == p.x && ny == p.y { return; }

    let (x, y) = physics::resolve_move(
        &world.map, p.x, p.y, nx, ny,
        world.interaction.collision_padding,
    );
    p.x = x;
    p.y = y;
}

// ══════════════════════════════════════════════════════════════
// Pickups
// ══════════════════════════════════════════════════════════════

/// Returns true if this tick completed the quest.
fn resolve_pickups(world: &mut GameState, events: &mut Vec<GameEvent>) -> bool {
    let center = world.player.center();
    let picked = rules::check_pickups(
        &mut world.keys, center, world.interaction.pickup_radius,
    );
    if picked.is_empty() { return false; }

    for index in picked {
        world.keys_collected += 1;
        events.push(GameEvent::KeyCollected {
            index,
            collected: world.keys_collected,
            required: world.keys_required,
        });
    }

    if world.keys_collected >= world.keys_required {
        world.session = Session::Complete;
        events.push(GameEvent::QuestComplete);
        return true;
    }
    false
}

// ══════════════════════════════════════════════════════════════
// NPC interaction
// ══════════════════════════════════════════════════════════════

fn resolve_interaction(world: &mut GameState, events: &mut Vec<GameEvent>) {
    if world.dialogue.is_active() { return; }
    if !world.interact_latch || world.cooldown > 0 { return; }

    let center = world.player.center();
    let npc = match rules::find_interactable(
        &world.npcs, center, world.interaction.interact_radius,
    ) {
        Some(i) => i,
        None => return,
    };

    world.interact_latch = false;
    world.cooldown = world.interaction.open_cooldown;
    events.push(GameEvent::Interacted { npc });

    world.dialogue = Dialogue::open(&world.npcs, npc);
    if let Some(line) = world.dialogue_line() {
        events.push(GameEvent::DialogueOpened { npc, line: line.to_string() });
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
