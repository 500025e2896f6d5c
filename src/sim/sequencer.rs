//! Staggered reveal sequencer
//!
//! Emits item indices `0..count` one at a time: the first after an initial
//! delay, each following one a fixed stagger after the previous emission.
//! Completion is two-phase: every item emitted, then every item's own
//! animation settled.

use serde::{Deserialize, Serialize};

/// How the sequencer decides that emitted items have finished animating
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum SettleRule {
    /// Each emitted item stays outstanding until the owner reports it finished
    #[default]
    Counted,
    /// Settled once `fraction` of the last item's animation has elapsed
    Elapsed { item_duration_ms: f32, fraction: f32 },
}

/// Time-driven position within a sequence
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Cursor {
    /// Time accumulated since the sequence started
    pub elapsed_ms: f32,
    /// Index of the next item to emit
    pub next_index: u32,
    /// Accumulated time at which the next item is due
    pub next_due_ms: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sequencer {
    count: u32,
    stagger_ms: f32,
    start_delay_ms: f32,
    settle: SettleRule,
    cursor: Cursor,
    /// Emitted items whose animation has not been reported finished
    outstanding: u32,
    running: bool,
}

impl Sequencer {
    pub fn new(stagger_ms: f32, start_delay_ms: f32, settle: SettleRule) -> Self {
        Self {
            count: 0,
            stagger_ms,
            start_delay_ms,
            settle,
            cursor: Cursor::default(),
            outstanding: 0,
            running: false,
        }
    }

    /// Begin a fresh sequence of `count` items
    pub fn start(&mut self, count: u32) {
        self.count = count;
        self.cursor = Cursor {
            elapsed_ms: 0.0,
            next_index: 0,
            next_due_ms: self.start_delay_ms,
        };
        self.outstanding = 0;
        self.running = true;
    }

    /// Stop and clear all progress
    pub fn reset(&mut self) {
        self.count = 0;
        self.cursor = Cursor::default();
        self.outstanding = 0;
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn outstanding(&self) -> u32 {
        self.outstanding
    }

    /// Accumulate `dt_ms` and emit at most one due item
    pub fn advance(&mut self, dt_ms: f32) -> Option<u32> {
        if !self.running {
            return None;
        }
        self.cursor.elapsed_ms += dt_ms;

        if self.cursor.next_index < self.count && self.cursor.elapsed_ms >= self.cursor.next_due_ms
        {
            let index = self.cursor.next_index;
            self.cursor.next_index += 1;
            self.cursor.next_due_ms = self.cursor.elapsed_ms + self.stagger_ms;
            self.outstanding += 1;
            return Some(index);
        }
        None
    }

    /// Report that one emitted item's animation has finished
    pub fn item_finished(&mut self) {
        debug_assert!(self.outstanding > 0, "item finished without being emitted");
        self.outstanding = self.outstanding.saturating_sub(1);
    }

    pub fn all_emitted(&self) -> bool {
        self.running && self.cursor.next_index >= self.count
    }

    /// Every item emitted and visually settled
    pub fn is_settled(&self) -> bool {
        if !self.all_emitted() {
            return false;
        }
        match self.settle {
            SettleRule::Counted => self.outstanding == 0,
            SettleRule::Elapsed {
                item_duration_ms,
                fraction,
            } => self.cursor.elapsed_ms >= self.cursor.next_due_ms + item_duration_ms * fraction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn run(seq: &mut Sequencer, dt: f32, ticks: u32) -> Vec<(u32, f32)> {
        let mut out = Vec::new();
        for _ in 0..ticks {
            if let Some(i) = seq.advance(dt) {
                out.push((i, seq.cursor().elapsed_ms));
            }
        }
        out
    }

    #[test]
    fn test_idle_sequencer_emits_nothing() {
        let mut seq = Sequencer::new(50.0, 100.0, SettleRule::Counted);
        assert_eq!(seq.advance(1000.0), None);
        assert!(!seq.is_settled());
    }

    #[test]
    fn test_one_item_per_tick() {
        let mut seq = Sequencer::new(0.0, 0.0, SettleRule::Counted);
        seq.start(3);
        // A huge delta still only reveals a single item
        assert_eq!(seq.advance(10_000.0), Some(0));
        assert_eq!(seq.advance(0.0), Some(1));
        assert_eq!(seq.advance(0.0), Some(2));
        assert_eq!(seq.advance(10_000.0), None);
    }

    #[test]
    fn test_counted_settle_waits_for_items() {
        let mut seq = Sequencer::new(10.0, 10.0, SettleRule::Counted);
        seq.start(2);
        let emitted = run(&mut seq, 10.0, 10);
        assert_eq!(emitted.len(), 2);
        assert!(seq.all_emitted());
        assert!(!seq.is_settled());

        seq.item_finished();
        assert!(!seq.is_settled());
        seq.item_finished();
        assert!(seq.is_settled());
    }

    #[test]
    fn test_elapsed_settle_uses_fraction() {
        let settle = SettleRule::Elapsed {
            item_duration_ms: 100.0,
            fraction: 0.7,
        };
        let mut seq = Sequencer::new(10.0, 10.0, settle);
        seq.start(1);
        assert_eq!(seq.advance(10.0), Some(0));
        // Next due at 20, settled at 20 + 70 = 90
        run(&mut seq, 10.0, 7);
        assert!(!seq.is_settled());
        run(&mut seq, 10.0, 1);
        assert!(seq.is_settled());
    }

    #[test]
    fn test_empty_sequence_is_settled() {
        let mut seq = Sequencer::new(10.0, 10.0, SettleRule::Counted);
        seq.start(0);
        assert!(seq.is_settled());
    }

    #[test]
    fn test_reset_twice() {
        let mut seq = Sequencer::new(10.0, 10.0, SettleRule::Counted);
        seq.start(5);
        run(&mut seq, 10.0, 3);
        seq.reset();
        let after_first = (seq.cursor(), seq.outstanding(), seq.is_running());
        seq.reset();
        assert_eq!((seq.cursor(), seq.outstanding(), seq.is_running()), after_first);
        assert_eq!(seq.cursor(), Cursor::default());
    }

    proptest! {
        #[test]
        fn prop_kth_item_due_at_delay_plus_k_stagger(
            count in 1u32..30,
            stagger in 1u32..12,
            delay in 1u32..200,
        ) {
            // 1 ms ticks keep accumulated time exact
            let mut seq = Sequencer::new(stagger as f32, delay as f32, SettleRule::Counted);
            seq.start(count);
            let ticks = delay + count * stagger + 10;
            let emitted = run(&mut seq, 1.0, ticks);

            prop_assert_eq!(emitted.len() as u32, count);
            for (k, (index, at)) in emitted.iter().enumerate() {
                prop_assert_eq!(*index, k as u32);
                prop_assert_eq!(*at, (delay + k as u32 * stagger) as f32);
            }
        }

        #[test]
        fn prop_never_exceeds_count(count in 0u32..20, dt in 1.0f32..500.0) {
            let mut seq = Sequencer::new(5.0, 0.0, SettleRule::Counted);
            seq.start(count);
            let emitted = run(&mut seq, dt, count * 6 + 5);
            prop_assert_eq!(emitted.len() as u32, count);
            prop_assert!(emitted.windows(2).all(|w| w[0].0 < w[1].0));
        }
    }
}
