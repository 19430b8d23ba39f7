/// Dialogue state machine.
///
///   Closed ──open(npc)──▶ Active { npc, index: 0 }
///   Active { i } ──advance──▶ Active { i + 1 }   if i + 1 < len
///   Active { i } ──advance──▶ Closed             otherwise
///
/// There is no cancel transition. An NPC with no lines never opens.
/// Gating (fresh press + cooldown) lives in the step function; this
/// module only knows about lines and indices.

use super::entity::Npc;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Dialogue {
    #[default]
    Closed,
    Active {
        /// Index into the NPC registry; the lines are borrowed from there.
        npc: usize,
        index: usize,
    },
}

/// Result of an accepted advance.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Advance {
    /// Moved to this line index.
    Line(usize),
    Closed,
}

impl Dialogue {
    /// Open on `npcs[npc]`. Empty or missing dialogue stays closed.
    pub fn open(npcs: &[Npc], npc: usize) -> Dialogue {
        match npcs.get(npc) {
            Some(n) if !n.lines.is_empty() => Dialogue::Active { npc, index: 0 },
            _ => Dialogue::Closed,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Dialogue::Active { .. })
    }

    /// Step to the next line, or close past the last one.
    /// Calling this on a closed dialogue is a no-op that reports `Closed`.
    pub fn advance(&mut self, npcs: &[Npc]) -> Advance {
        if let Dialogue::Active { npc, index } = *self {
            let len = npcs.get(npc).map_or(0, |n| n.lines.len());
            if index + 1 < len {
                *self = Dialogue::Active { npc, index: index + 1 };
                return Advance::Line(index + 1);
            }
        }
        *self = Dialogue::Closed;
        Advance::Closed
    }

    /// Text of the line currently shown.
    pub fn current_line<'a>(&self, npcs: &'a [Npc]) -> Option<&'a str> {
        match *self {
            Dialogue::Active { npc, index } => npcs
                .get(npc)
                .and_then(|n| n.lines.get(index))
                .map(String::as_str),
            Dialogue::Closed => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::NpcKind;

    fn npcs() -> Vec<Npc> {
        vec![
            Npc::new(1, 1, NpcKind::Sage, &["zero", "one", "two"]),
            Npc::new(2, 2, NpcKind::Guardian, &[]),
        ]
    }

    #[test]
    fn open_shows_first_line() {
        let n = npcs();
        let d = Dialogue::open(&n, 0);
        assert_eq!(d, Dialogue::Active { npc: 0, index: 0 });
        assert_eq!(d.current_line(&n), Some("zero"));
    }

    #[test]
    fn empty_dialogue_never_opens() {
        let n = npcs();
        let d = Dialogue::open(&n, 1);
        assert_eq!(d, Dialogue::Closed);
        assert_eq!(d.current_line(&n), None);
    }

    #[test]
    fn missing_npc_never_opens() {
        assert_eq!(Dialogue::open(&npcs(), 7), Dialogue::Closed);
    }

    #[test]
    fn three_lines_close_on_third_advance() {
        let n = npcs();
        let mut d = Dialogue::open(&n, 0);
        assert_eq!(d.advance(&n), Advance::Line(1));
        assert_eq!(d.current_line(&n), Some("one"));
        assert_eq!(d.advance(&n), Advance::Line(2));
        assert_eq!(d.current_line(&n), Some("two"));
        assert_eq!(d.advance(&n), Advance::Closed);
        assert!(!d.is_active());
    }

    #[test]
    fn index_never_exceeds_line_count() {
        let n = npcs();
        let mut d = Dialogue::open(&n, 0);
        for _ in 0..10 {
            if let Dialogue::Active { index, .. } = d {
                assert!(index < n[0].lines.len());
            }
            d.advance(&n);
        }
        assert_eq!(d, Dialogue::Closed);
    }

    #[test]
    fn advance_on_closed_is_noop() {
        let n = npcs();
        let mut d = Dialogue::Closed;
        assert_eq!(d.advance(&n), Advance::Closed);
        assert_eq!(d, Dialogue::Closed);
    }

    #[test]
    fn reopen_starts_from_zero() {
        let n = npcs();
        let mut d = Dialogue::open(&n, 0);
        d.advance(&n);
        d.advance(&n);
        d.advance(&n);
        d = Dialogue::open(&n, 0);
        assert_eq!(d, Dialogue::Active { npc: 0, index: 0 });
    }
}
