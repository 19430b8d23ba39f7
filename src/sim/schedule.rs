/// Delayed side effects: pickup chime notes and the reward reveal.
///
/// The scheduler owns no thread and no clock. The host calls `advance`
/// with the wall time that passed since the previous call and gets back
/// every cue that fell due, earliest first. Cues scheduled for the same
/// instant come out in the order they were scheduled.
///
/// Teardown calls `cancel_all` so nothing from an old session fires
/// into the next one.

// ══════════════════════════════════════════════════════════════
// Cues
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Waveform {
    Sine,
    Square,
    Triangle,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Cue {
    Tone { freq: f32, secs: f32, wave: Waveform },
    RevealReward,
}

/// C5, E5, G5 at 100 ms spacing: (delay ms, Hz, seconds).
const PICKUP_NOTES: [(u64, f32, f32); 3] = [
    (0, 523.25, 0.1),
    (100, 659.25, 0.1),
    (200, 783.99, 0.2),
];

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TimerToken(u64);

struct Pending {
    token: TimerToken,
    due_ms: u64,
    cue: Cue,
}

// ══════════════════════════════════════════════════════════════
// Scheduler
// ══════════════════════════════════════════════════════════════

#[derive(Default)]
pub struct Scheduler {
    now_ms: u64,
    next_token: u64,
    pending: Vec<Pending>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `cue` to fire `delay_ms` from now.
    pub fn schedule(&mut self, delay_ms: u64, cue: Cue) -> TimerToken {
        let token = TimerToken(self.next_token);
        self.next_token += 1;
        self.pending.push(Pending {
            token,
            due_ms: self.now_ms.saturating_add(delay_ms),
            cue,
        });
        token
    }

    /// Returns false if the cue already fired or was cancelled.
    pub fn cancel(&mut self, token: TimerToken) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.token != token);
        self.pending.len() != before
    }

    pub fn cancel_all(&mut self) {
        if self.pending() > 0 {
            log::debug!("cancelling {} pending cue(s)", self.pending());
        }
        self.pending.clear();
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Move the clock forward and drain everything now due.
    pub fn advance(&mut self, elapsed_ms: u64) -> Vec<Cue> {
        self.now_ms = self.now_ms.saturating_add(elapsed_ms);
        let now = self.now_ms;

        let mut due: Vec<Pending> = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].due_ms <= now {
                due.push(self.pending.remove(i));
            } else {
                i += 1;
            }
        }
        // Stable: ties keep scheduling order.
        due.sort_by_key(|p| p.due_ms);
        due.into_iter().map(|p| p.cue).collect()
    }
}

/// Schedule the three-note pickup chime.
pub fn pickup_chime(scheduler: &mut Scheduler) -> Vec<TimerToken> {
    PICKUP_NOTES
        .iter()
        .map(|&(delay, freq, secs)| {
            scheduler.schedule(delay, Cue::Tone { freq, secs, wave: Waveform::Square })
        })
        .collect()
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn freqs(cues: &[Cue]) -> Vec<f32> {
        cues.iter()
            .filter_map(|c| match c {
                Cue::Tone { freq, .. } => Some(*freq),
                Cue::RevealReward => None,
            })
            .collect()
    }

    #[test]
    fn nothing_fires_early() {
        let mut s = Scheduler::new();
        s.schedule(1000, Cue::RevealReward);
        assert!(s.advance(999).is_empty());
        assert_eq!(s.advance(1), vec![Cue::RevealReward]);
        assert_eq!(s.pending(), 0);
    }

    #[test]
    fn chime_notes_fire_in_order_over_time() {
        let mut s = Scheduler::new();
        pickup_chime(&mut s);
        assert_eq!(freqs(&s.advance(0)), vec![523.25]);
        assert!(s.advance(50).is_empty());
        assert_eq!(freqs(&s.advance(50)), vec![659.25]);
        assert_eq!(freqs(&s.advance(100)), vec![783.99]);
        assert_eq!(s.pending(), 0);
    }

    #[test]
    fn chime_holds_the_last_note_longer() {
        let mut s = Scheduler::new();
        pickup_chime(&mut s);
        let secs: Vec<f32> = s
            .advance(500)
            .iter()
            .filter_map(|c| match c {
                Cue::Tone { secs, wave, .. } => {
                    assert_eq!(*wave, Waveform::Square);
                    Some(*secs)
                }
                Cue::RevealReward => None,
            })
            .collect();
        assert_eq!(secs, vec![0.1, 0.1, 0.2]);
    }

    #[test]
    fn one_large_step_drains_earliest_first() {
        let mut s = Scheduler::new();
        s.schedule(300, Cue::RevealReward);
        pickup_chime(&mut s);
        let cues = s.advance(1000);
        assert_eq!(cues.len(), 4);
        assert_eq!(freqs(&cues[..3]), vec![523.25, 659.25, 783.99]);
        assert_eq!(cues[3], Cue::RevealReward);
    }

    #[test]
    fn same_instant_keeps_scheduling_order() {
        let mut s = Scheduler::new();
        let a = Cue::Tone { freq: 1.0, secs: 0.1, wave: Waveform::Sine };
        let b = Cue::Tone { freq: 2.0, secs: 0.1, wave: Waveform::Sine };
        s.schedule(10, a);
        s.schedule(10, b);
        assert_eq!(s.advance(10), vec![a, b]);
    }

    #[test]
    fn delay_is_relative_to_current_clock() {
        let mut s = Scheduler::new();
        s.advance(5000);
        s.schedule(100, Cue::RevealReward);
        assert!(s.advance(99).is_empty());
        assert_eq!(s.advance(1).len(), 1);
    }

    #[test]
    fn cancel_removes_only_that_cue() {
        let mut s = Scheduler::new();
        let tokens = pickup_chime(&mut s);
        assert!(s.cancel(tokens[1]));
        assert!(!s.cancel(tokens[1]));
        assert_eq!(freqs(&s.advance(500)), vec![523.25, 783.99]);
    }

    #[test]
    fn cancel_after_fire_is_false() {
        let mut s = Scheduler::new();
        let t = s.schedule(0, Cue::RevealReward);
        s.advance(0);
        assert!(!s.cancel(t));
    }

    #[test]
    fn cancel_all_clears_the_queue() {
        let mut s = Scheduler::new();
        pickup_chime(&mut s);
        s.schedule(1000, Cue::RevealReward);
        s.cancel_all();
        assert_eq!(s.pending(), 0);
        assert!(s.advance(10_000).is_empty());
    }

    #[test]
    fn tokens_are_unique() {
        let mut s = Scheduler::new();
        let a = s.schedule(0, Cue::RevealReward);
        let b = s.schedule(0, Cue::RevealReward);
        assert_ne!(a, b);
    }
}
