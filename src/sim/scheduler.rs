//! Single-threaded timer schedule
//!
//! Timers fire in due-time order; timers due at the same instant fire in the
//! order they were scheduled. Cancelling removes a timer from the schedule.

use serde::{Deserialize, Serialize};

/// Handle to a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerId(u64);

/// What happens when a timer fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerAction {
    /// Emitter produces one item
    Spawn { emitter: u32 },
    /// Item reached the end of its lifetime
    Expire { item: u32 },
}

impl TimerAction {
    /// Entity the timer belongs to
    pub fn owner(&self) -> u32 {
        match *self {
            TimerAction::Spawn { emitter } => emitter,
            TimerAction::Expire { item } => item,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Timer {
    id: TimerId,
    due: f64,
    action: TimerAction,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scheduler {
    now: f64,
    /// Kept sorted by (due, id)
    timers: Vec<Timer>,
    next_id: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds elapsed on this schedule
    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Schedule `action` `delay` seconds from now
    pub fn schedule(&mut self, delay: f32, action: TimerAction) -> TimerId {
        self.schedule_at(self.now + delay.max(0.0) as f64, action)
    }

    /// Schedule `action` at absolute time `due`
    pub fn schedule_at(&mut self, due: f64, action: TimerAction) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        // Insert after every timer due at or before `due` to keep arrival order on ties
        let index = self.timers.partition_point(|t| t.due <= due);
        self.timers.insert(index, Timer { id, due, action });
        id
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    /// Drop every timer whose action matches
    pub fn cancel_where(&mut self, mut pred: impl FnMut(&TimerAction) -> bool) {
        self.timers.retain(|t| !pred(&t.action));
    }

    /// Drop every timer
    pub fn clear(&mut self) {
        self.timers.clear();
    }

    /// Move the clock forward and return the actions that came due, with their due times
    pub fn advance(&mut self, dt: f32) -> Vec<(f64, TimerAction)> {
        self.now += dt.max(0.0) as f64;
        let due_count = self.timers.partition_point(|t| t.due <= self.now);
        self.timers
            .drain(..due_count)
            .map(|t| (t.due, t.action))
            .collect()
    }
}
