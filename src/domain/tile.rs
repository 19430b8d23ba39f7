/// Terrain codes and their properties.
/// Properties are queried via methods, not stored as flags,
/// so terrain semantics are centralized here.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Terrain {
    Grass, // 0
    Wall,  // 1: trees / border
    Path,  // 2
    Water, // 3
}

impl Terrain {
    /// Decode a map code. Anything unknown is treated as solid.
    pub fn from_code(code: u8) -> Terrain {
        match code {
            0 => Terrain::Grass,
            2 => Terrain::Path,
            3 => Terrain::Water,
            _ => Terrain::Wall,
        }
    }

    /// Can the player stand on this terrain?
    pub fn is_walkable(self) -> bool {
        !matches!(self, Terrain::Wall | Terrain::Water)
    }
}

impl Default for Terrain {
    fn default() -> Self {
        Terrain::Wall
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walkability_by_code() {
        assert!(Terrain::from_code(0).is_walkable());
        assert!(!Terrain::from_code(1).is_walkable());
        assert!(Terrain::from_code(2).is_walkable());
        assert!(!Terrain::from_code(3).is_walkable());
    }

    #[test]
    fn unknown_code_is_wall() {
        assert_eq!(Terrain::from_code(9), Terrain::Wall);
        assert_eq!(Terrain::from_code(255), Terrain::Wall);
    }
}
