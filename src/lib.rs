//! AR Waste Patrol - gameplay core for an augmented-reality cleanup game
//!
//! Core modules:
//! - `sim`: Match progression (state machine, difficulty curve, scoring, spawning)
//! - `highscores`: Bounded high score record and its persistent store
//! - `persistence`: Storage backends and the versioned save envelope
//! - `tracker`: AR anchor tracking seam
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences
//! - `platform`: Browser/native platform abstraction
//! - `ui`: Panel selection and text formatting for the host UI

pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tracker;
pub mod tuning;
pub mod ui;

pub use highscores::{HighScoreStore, HighScores, ScoreRecorder};
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed frame timestep used by the headless driver (60 Hz)
    pub const FRAME_DT: f32 = 1.0 / 60.0;

    /// Maximum number of high scores to keep
    pub const MAX_HIGH_SCORES: usize = 10;

    /// Storage key for the high score record
    pub const PLAYER_INFO_KEY: &str = "player_info";
    /// Storage key for player preferences
    pub const SETTINGS_KEY: &str = "settings";
}

/// Linearly map `value` from `[from1, to1]` onto `[from2, to2]`, clamped to the target range.
///
/// The target range may be descending (`from2 > to2`).
#[inline]
pub fn remap(value: f32, from1: f32, to1: f32, from2: f32, to2: f32) -> f32 {
    let result = (value - from1) / (to1 - from1) * (to2 - from2) + from2;
    result.clamp(from2.min(to2), from2.max(to2))
}
