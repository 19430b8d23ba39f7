/// Proximity rules: pickups and NPC interaction.
///
/// Both use the Euclidean distance between the player's center and the
/// target cell's center, with a strict `<` against the radius.
///
/// Interaction picks the FIRST npc in registry order that is in range,
/// not the nearest one. Two NPCs closer together than twice the radius
/// can therefore shadow each other; kept as-is.

use super::entity::{KeyItem, Npc};

#[inline]
pub fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    (dx * dx + dy * dy).sqrt()
}

/// Collect every uncollected item within `radius` of `center`.
/// Returns the indices of items collected by this call, in registry order.
pub fn check_pickups(items: &mut [KeyItem], center: (f32, f32), radius: f32) -> Vec<usize> {
    let mut picked = Vec::new();
    for (i, item) in items.iter_mut().enumerate() {
        if item.collected {
            continue;
        }
        if distance(center, item.center()) < radius {
            item.collected = true;
            picked.push(i);
        }
    }
    picked
}

/// First NPC (registry order) within `radius` of `center`.
pub fn find_interactable(npcs: &[Npc], center: (f32, f32), radius: f32) -> Option<usize> {
    npcs.iter().position(|npc| distance(center, npc.center()) < radius)
}
