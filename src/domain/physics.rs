/// Collision layer: single source of truth for "can the player be here".
///
/// ## Corner probes
///
/// The player is a `TILE_SIZE` square. A position is legal iff all four
/// corners, each pulled inward by `padding` pixels, land on walkable
/// terrain. The inset lets the sprite overlap a wall tile slightly and
/// squeeze diagonally past corners.
///
/// ## Axis separation
///
/// A proposed displacement is resolved one axis at a time:
///   1. new x, tested against the *current* y
///   2. new y, tested against the x that step 1 produced
///
/// Blocked on one axis never blocks the other, so diagonal input slides
/// along walls. This must not be folded into a single combined test.

use super::map::{TileMap, TILE_SIZE};

// ══════════════════════════════════════════════════════════════
// Corner test
// ══════════════════════════════════════════════════════════════

/// Can the player's square occupy top-left (x, y)?
#[inline]
pub fn can_occupy(map: &TileMap, x: f32, y: f32, padding: f32) -> bool {
    let near = padding;
    let far = TILE_SIZE - padding;
    map.is_walkable(x + near, y + near)
        && map.is_walkable(x + far, y + near)
        && map.is_walkable(x + near, y + far)
        && map.is_walkable(x + far, y + far)
}

// ══════════════════════════════════════════════════════════════
// Axis-separated resolution
// ══════════════════════════════════════════════════════════════

/// Resolve a move from (x, y) toward (new_x, new_y).
/// Returns the position actually reached.
pub fn resolve_move(
    map: &TileMap,
    x: f32,
    y: f32,
    new_x: f32,
    new_y: f32,
    padding: f32,
) -> (f32, f32) {
    let rx = if can_occupy(map, new_x, y, padding) { new_x } else { x };
    let ry = if can_occupy(map, rx, new_y, padding) { new_y } else { y };
    (rx, ry)
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    const PAD: f32 = 6.0;

    /// 5×5 room: wall ring, open 3×3 inside, water at (3,3).
    fn room() -> TileMap {
        TileMap::from_codes(&[
            vec![1, 1, 1, 1, 1],
            vec![1, 0, 0, 0, 1],
            vec![1, 0, 2, 0, 1],
            vec![1, 0, 0, 3, 1],
            vec![1, 1, 1, 1, 1],
        ])
    }

    // ── can_occupy ──

    #[test]
    fn tile_aligned_open_cell_is_legal() {
        assert!(can_occupy(&room(), 32.0, 32.0, PAD));
    }

    #[test]
    fn padding_allows_partial_overlap() {
        let map = room();
        // Left probe at x + 6 = 27 lands in the wall column
        assert!(!can_occupy(&map, 21.0, 32.0, PAD));
        // x + 6 = 32 exactly on the open cell: legal
        assert!(can_occupy(&map, 26.0, 32.0, PAD));
    }

    #[test]
    fn water_blocks() {
        let map = room();
        assert!(!can_occupy(&map, 96.0, 96.0, PAD));
        // Overlapping the water cell by less than the padding is fine
        assert!(can_occupy(&map, 69.0, 69.0, PAD));
        assert!(!can_occupy(&map, 71.0, 71.0, PAD));
    }

    #[test]
    fn zero_padding_is_strict() {
        let map = room();
        // Far corner at x + 32 = 128 falls in column 4 (wall)
        assert!(!can_occupy(&map, 96.0, 32.0, 0.0));
        assert!(can_occupy(&map, 95.0, 32.0, 0.0));
    }

    // ── resolve_move ──

    #[test]
    fn free_move_applies_both_axes() {
        let (x, y) = resolve_move(&room(), 40.0, 40.0, 43.0, 37.0, PAD);
        assert_eq!((x, y), (43.0, 37.0));
    }

    #[test]
    fn blocked_x_keeps_x_but_applies_y() {
        let map = room();
        // At the left wall limit, pushing left+down.
        let (x, y) = resolve_move(&map, 26.0, 40.0, 23.0, 43.0, PAD);
        assert_eq!(x, 26.0);
        assert_eq!(y, 43.0);
    }

    #[test]
    fn blocked_y_keeps_y_but_applies_x() {
        let map = room();
        // At the top wall limit, pushing up+right.
        let (x, y) = resolve_move(&map, 40.0, 26.0, 43.0, 23.0, PAD);
        assert_eq!(x, 43.0);
        assert_eq!(y, 26.0);
    }

    #[test]
    fn vertical_test_uses_resolved_x() {
        // Open column only at x=1; moving right is blocked, down is open.
        let map = TileMap::from_codes(&[
            vec![1, 1, 1],
            vec![1, 0, 1],
            vec![1, 0, 1],
            vec![1, 1, 1],
        ]);
        let (x, y) = resolve_move(&map, 32.0, 32.0, 39.0, 35.0, PAD);
        assert_eq!(x, 32.0);
        assert_eq!(y, 35.0);
    }

    #[test]
    fn both_axes_blocked_stays_put() {
        let map = room();
        let (x, y) = resolve_move(&map, 26.0, 26.0, 23.0, 23.0, PAD);
        assert_eq!((x, y), (26.0, 26.0));
    }
}
