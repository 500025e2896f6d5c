//! Fire-once deferred actions
//!
//! Timers run on the match clock, which only moves when the engine ticks, so
//! they execute on the update thread between frames. All timers share one
//! cancellation token; once it is triggered nothing fires and new schedules
//! are dropped.

use serde::{Deserialize, Serialize};

use super::machine::MatchEvent;

/// What to do when a timer comes due
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerAction {
    /// Feed an event to the state machine
    Raise(MatchEvent),
    /// Stop the music and hand over to the end screen
    ShowEndScreen,
    /// Remove a block burst
    DestroyBurst(u32),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Timer {
    due_ms: f32,
    action: TimerAction,
}

/// One-shot cancellation flag
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CancelToken {
    cancelled: bool,
}

impl CancelToken {
    /// Trigger the token; returns true only for the call that triggered it
    pub fn cancel(&mut self) -> bool {
        !std::mem::replace(&mut self.cancelled, true)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scheduler {
    now_ms: f32,
    timers: Vec<Timer>,
    token: CancelToken,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Match clock
    pub fn now_ms(&self) -> f32 {
        self.now_ms
    }

    /// Schedule `action` to run `delay_ms` from now; false once cancelled
    pub fn schedule(&mut self, delay_ms: f32, action: TimerAction) -> bool {
        if self.token.is_cancelled() {
            log::debug!("Dropping {:?}: scheduler cancelled", action);
            return false;
        }
        self.timers.push(Timer {
            due_ms: self.now_ms + delay_ms.max(0.0),
            action,
        });
        true
    }

    pub fn is_pending(&self, action: TimerAction) -> bool {
        self.timers.iter().any(|t| t.action == action)
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Advance the clock and return every action that came due, oldest first
    pub fn advance(&mut self, dt_ms: f32) -> Vec<TimerAction> {
        if self.token.is_cancelled() {
            return Vec::new();
        }
        self.now_ms += dt_ms;

        let now = self.now_ms;
        let mut due: Vec<Timer> = Vec::new();
        self.timers.retain(|t| {
            if t.due_ms <= now {
                due.push(t.clone());
                false
            } else {
                true
            }
        });
        // Stable: equal due times keep scheduling order
        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms));
        due.into_iter().map(|t| t.action).collect()
    }

    /// Drop all timers and refuse new ones; returns true the first time
    pub fn cancel(&mut self) -> bool {
        self.timers.clear();
        self.token.cancel()
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_fires_once_when_due() {
        let mut sched = Scheduler::new();
        sched.schedule(100.0, TimerAction::DestroyBurst(7));
        assert!(sched.advance(60.0).is_empty());
        assert_eq!(sched.advance(40.0), vec![TimerAction::DestroyBurst(7)]);
        assert!(sched.advance(1000.0).is_empty());
    }

    #[test]
    fn test_due_order() {
        let mut sched = Scheduler::new();
        sched.schedule(50.0, TimerAction::ShowEndScreen);
        sched.schedule(10.0, TimerAction::DestroyBurst(1));
        sched.schedule(50.0, TimerAction::DestroyBurst(2));
        assert_eq!(
            sched.advance(100.0),
            vec![
                TimerAction::DestroyBurst(1),
                TimerAction::ShowEndScreen,
                TimerAction::DestroyBurst(2),
            ]
        );
    }

    #[test]
    fn test_cancel_is_final() {
        let mut sched = Scheduler::new();
        sched.schedule(10.0, TimerAction::Raise(MatchEvent::BallGutter));
        assert!(sched.cancel());
        assert!(!sched.cancel());
        assert!(sched.advance(100.0).is_empty());
        assert!(!sched.schedule(0.0, TimerAction::ShowEndScreen));
        assert_eq!(sched.pending(), 0);
    }
}
