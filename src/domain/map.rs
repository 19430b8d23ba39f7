/// The world grid: a fixed 20×15 map of terrain codes.
///
/// The simulation works in pixel space; `tile_at` converts a pixel
/// coordinate to a cell by flooring division by `TILE_SIZE`. Anything
/// outside the grid reads as `Terrain::Wall`, so the map always has a
/// solid border even where float error would push a corner probe past
/// the authored wall ring.

use super::tile::Terrain;

pub const TILE_SIZE: f32 = 32.0;
pub const MAP_WIDTH: usize = 20;
pub const MAP_HEIGHT: usize = 15;

/// 0 = grass, 1 = wall, 2 = path, 3 = water
/// (10,7) is open so the key in the central grove can be reached.
const WORLD_CODES: [[u8; MAP_WIDTH]; MAP_HEIGHT] = [
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
    [1, 0, 0, 0, 0, 2, 2, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 1, 0, 0, 2, 1, 2, 2, 2, 2, 2, 2, 2, 0, 1, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0, 2, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0, 2, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0, 2, 0, 0, 0, 0, 0, 1],
    [1, 2, 2, 2, 2, 2, 0, 0, 0, 1, 1, 0, 0, 2, 2, 2, 2, 2, 2, 1],
    [1, 2, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 2, 1],
    [1, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2, 1],
    [1, 2, 0, 0, 3, 3, 3, 0, 0, 0, 0, 0, 0, 3, 3, 3, 0, 0, 2, 1],
    [1, 2, 0, 0, 3, 3, 3, 0, 0, 0, 0, 0, 0, 3, 3, 3, 0, 0, 2, 1],
    [1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
];

#[derive(Clone, Debug)]
pub struct TileMap {
    tiles: Vec<Vec<Terrain>>,
    width: usize,
    height: usize,
}

impl TileMap {
    /// The one hardcoded world.
    pub fn world() -> Self {
        Self::from_codes(&WORLD_CODES.map(|row| row.to_vec()))
    }

    /// Build a map from rows of terrain codes. Short rows are padded with wall.
    pub fn from_codes(rows: &[Vec<u8>]) -> Self {
        let height = rows.len();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let tiles = rows
            .iter()
            .map(|row| {
                let mut cells: Vec<Terrain> = row.iter().map(|&c| Terrain::from_code(c)).collect();
                cells.resize(width, Terrain::Wall);
                cells
            })
            .collect();
        TileMap { tiles, width, height }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Terrain of grid cell (gx, gy). Out of bounds = wall.
    #[inline]
    pub fn cell(&self, gx: i64, gy: i64) -> Terrain {
        if gx < 0 || gy < 0 || gx >= self.width as i64 || gy >= self.height as i64 {
            return Terrain::Wall;
        }
        self.tiles[gy as usize][gx as usize]
    }

    /// Terrain under pixel coordinate (x, y).
    #[inline]
    pub fn tile_at(&self, x: f32, y: f32) -> Terrain {
        let gx = (x / TILE_SIZE).floor();
        let gy = (y / TILE_SIZE).floor();
        if !gx.is_finite() || !gy.is_finite() {
            return Terrain::Wall;
        }
        self.cell(gx as i64, gy as i64)
    }

    #[inline]
    pub fn is_walkable(&self, x: f32, y: f32) -> bool {
        self.tile_at(x, y).is_walkable()
    }
}

/// Pixel center of grid cell (gx, gy).
pub fn tile_center(gx: usize, gy: usize) -> (f32, f32) {
    (
        gx as f32 * TILE_SIZE + TILE_SIZE / 2.0,
        gy as f32 * TILE_SIZE + TILE_SIZE / 2.0,
    )
}
