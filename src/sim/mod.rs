//! Match simulation
//!
//! All gameplay logic lives here. Rendering, AR tracking, and input stay with
//! the host; this module must be deterministic:
//! - Seeded RNG only
//! - Timers fire in due order, ties in scheduling order
//! - Single owner for all match state

pub mod catalog;
pub mod difficulty;
pub mod events;
pub mod live;
pub mod scheduler;
pub mod state;
pub mod tick;

pub use catalog::{Archetype, Catalog, CatalogManifest, SpawnCategory, SpawnPool};
pub use difficulty::{AnchorSchedule, LevelParameters, item_speed, score_threshold, spawn_wait_ceiling};
pub use events::{EventBus, GameEvent, RemovalReason, SubscriberId};
pub use live::{Emitter, LiveObjects, SpawnedItem};
pub use scheduler::{Scheduler, TimerAction, TimerId};
pub use state::{
    CountdownStep, MatchState, PreparationStage, ProgressionController, Request, TransitionError,
};
pub use tick::{TickInput, tick};
