//! Game event notification
//!
//! Observers are called synchronously, in registration order.

use serde::{Deserialize, Serialize};

use super::catalog::SpawnCategory;
use super::state::MatchState;

/// Why a live item left play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalReason {
    /// Cleared by the player
    Collected,
}

/// Something observers may react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    StateChanged(MatchState),
    ScoreUpdated(u64),
    LevelAdvanced { level: u32, required_anchors: u32 },
    ItemSpawned { id: u32, archetype: String, category: SpawnCategory },
    ItemRemoved { id: u32, reason: RemovalReason },
    /// Match lost; `rank` is the high score position reached, if any
    MatchEnded { final_score: u64, rank: Option<usize> },
}

/// Handle returned by `EventBus::subscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u32);

type Callback = Box<dyn FnMut(&GameEvent)>;

/// Ordered observer list
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<(SubscriberId, Callback)>,
    next_id: u32,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&GameEvent) + 'static) -> SubscriberId {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove a subscriber. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    pub fn emit(&mut self, event: &GameEvent) {
        for (_, callback) in self.subscribers.iter_mut() {
            callback(event);
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}
