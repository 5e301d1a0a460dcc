//! Live objects of the current level: spawn emitters and the items they produce

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::catalog::SpawnCategory;
use crate::tracker::AnchorPose;

/// Item spin speed around its random axis (radians/sec)
pub const ITEM_SPIN_SPEED: f32 = 2.0944;

/// Spawns items at an anchor at a fixed cadence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Emitter {
    pub id: u32,
    pub anchor: AnchorPose,
    /// Seconds between spawns, sampled once at placement
    pub wait: f32,
}

/// An item drifting toward the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnedItem {
    pub id: u32,
    pub emitter: u32,
    pub archetype: String,
    pub category: SpawnCategory,
    /// Model asset, `None` when the category has no models
    pub model: Option<String>,
    pub position: Vec3,
    /// Unit direction of travel, fixed at spawn
    pub direction: Vec3,
    pub speed: f32,
    pub scale: f32,
    pub spin_axis: Vec3,
    pub rotation: Quat,
    /// Movement halted by a UI hold
    pub halted: bool,
}

impl SpawnedItem {
    /// Move and spin for one frame
    pub fn advance(&mut self, dt: f32) {
        if self.halted {
            return;
        }
        self.position += self.direction * self.speed * dt;
        self.rotation = (self.rotation * Quat::from_axis_angle(self.spin_axis, ITEM_SPIN_SPEED * dt))
            .normalize();
    }

    /// True if the item is within `radius` of `point`
    pub fn touches(&self, point: Vec3, radius: f32) -> bool {
        self.position.distance_squared(point) <= radius * radius
    }
}

/// Everything spawned during a level. Cleared wholesale on level change or loss.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LiveObjects {
    emitters: Vec<Emitter>,
    items: Vec<SpawnedItem>,
    next_id: u32,
}

impl LiveObjects {
    pub fn new() -> Self {
        Self {
            emitters: Vec::new(),
            items: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        id
    }

    pub fn add_emitter(&mut self, anchor: AnchorPose, wait: f32) -> u32 {
        let id = self.next_entity_id();
        self.emitters.push(Emitter { id, anchor, wait });
        id
    }

    pub fn add_item(&mut self, item: SpawnedItem) {
        self.items.push(item);
    }

    pub fn emitters(&self) -> &[Emitter] {
        &self.emitters
    }

    pub fn emitter(&self, id: u32) -> Option<&Emitter> {
        self.emitters.iter().find(|e| e.id == id)
    }

    pub fn items(&self) -> &[SpawnedItem] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut [SpawnedItem] {
        &mut self.items
    }

    pub fn item(&self, id: u32) -> Option<&SpawnedItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn item_mut(&mut self, id: u32) -> Option<&mut SpawnedItem> {
        self.items.iter_mut().find(|i| i.id == id)
    }

    pub fn remove_item(&mut self, id: u32) -> Option<SpawnedItem> {
        let index = self.items.iter().position(|i| i.id == id)?;
        Some(self.items.remove(index))
    }

    /// Total emitters plus items
    pub fn len(&self) -> usize {
        self.emitters.len() + self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emitters.is_empty() && self.items.is_empty()
    }

    /// Destroy everything. IDs keep counting up.
    pub fn clear(&mut self) {
        self.emitters.clear();
        self.items.clear();
    }
}
