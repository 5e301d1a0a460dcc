//! Data-driven game balance
//!
//! Every difficulty constant lives here so a host can override them from a
//! JSON file without rebuilding. Missing fields take their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TuningError {
    #[error("could not read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed tuning file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning: {0}")]
    Invalid(String),
}

/// Gameplay balance constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Spawn cadence ===
    /// Shortest spawn wait (seconds), reached at `max_spawn_wait_level`
    pub min_spawn_wait: f32,
    /// Longest spawn wait (seconds), used at level 1
    pub max_spawn_wait: f32,
    pub max_spawn_wait_level: u32,
    /// Upper bound of the random delay before an emitter's first spawn (seconds)
    pub max_start_offset: f32,

    // === Item movement ===
    pub min_item_speed: f32,
    pub max_item_speed: f32,
    pub max_speed_level: u32,
    /// Seconds an item lives before it expires
    pub item_lifetime: f32,
    /// Scale applied to everything spawned with a unit scale
    pub unit_scale: f32,
    /// Distance from the player at which an item counts as contact
    pub player_contact_radius: f32,

    // === Progression ===
    pub base_score_threshold: u64,
    /// Share of the base threshold each extra anchor adds
    pub anchor_threshold_factor: f64,
    pub default_anchors_required: u32,
    pub default_anchor_increment: u32,

    // === Preparation phase timing (seconds) ===
    pub level_intro: f32,
    pub ready_wait: f32,
    pub start_wait: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            min_spawn_wait: 1.0,
            max_spawn_wait: 5.0,
            max_spawn_wait_level: 10,
            max_start_offset: 5.0,

            min_item_speed: 0.1,
            max_item_speed: 1.0,
            max_speed_level: 8,
            item_lifetime: 15.0,
            unit_scale: 0.3,
            player_contact_radius: 0.15,

            base_score_threshold: 5,
            anchor_threshold_factor: 0.8,
            default_anchors_required: 1,
            default_anchor_increment: 2,

            level_intro: 3.0,
            ready_wait: 3.0,
            start_wait: 1.0,
        }
    }
}

impl Tuning {
    /// Parse and validate tuning from JSON
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file
    pub fn load(path: &Path) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Reject values the difficulty curve cannot work with
    pub fn validate(&self) -> Result<(), TuningError> {
        if !(self.min_spawn_wait > 0.0 && self.min_spawn_wait <= self.max_spawn_wait) {
            return Err(TuningError::Invalid(format!(
                "spawn wait range {}..{} is empty or non-positive",
                self.min_spawn_wait, self.max_spawn_wait
            )));
        }
        if !(self.min_item_speed >= 0.0 && self.min_item_speed <= self.max_item_speed) {
            return Err(TuningError::Invalid(format!(
                "item speed range {}..{} is inverted",
                self.min_item_speed, self.max_item_speed
            )));
        }
        if self.max_spawn_wait_level < 2 || self.max_speed_level < 2 {
            return Err(TuningError::Invalid(
                "curve end levels must be at least 2".to_string(),
            ));
        }
        if self.default_anchors_required == 0 {
            return Err(TuningError::Invalid(
                "at least one anchor must be required".to_string(),
            ));
        }
        if self.item_lifetime <= 0.0 || self.max_start_offset < 0.0 {
            return Err(TuningError::Invalid(
                "item lifetime must be positive and start offset non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "base_score_threshold": 8, "max_speed_level": 12 }"#)
            .unwrap();
        assert_eq!(tuning.base_score_threshold, 8);
        assert_eq!(tuning.max_speed_level, 12);
        assert_eq!(tuning.default_anchor_increment, 2);
        assert!((tuning.anchor_threshold_factor - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn test_inverted_spawn_range_rejected() {
        let err = Tuning::from_json(r#"{ "min_spawn_wait": 6.0 }"#).unwrap_err();
        assert!(matches!(err, TuningError::Invalid(_)));
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(matches!(
            Tuning::from_json("not json"),
            Err(TuningError::Parse(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tuning.json");
        std::fs::write(&path, r#"{ "item_lifetime": 20.0 }"#).unwrap();
        let tuning = Tuning::load(&path).unwrap();
        assert!((tuning.item_lifetime - 20.0).abs() < f32::EPSILON);
    }
}
