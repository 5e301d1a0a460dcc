//! Difficulty curve
//!
//! Pure functions of the level plus the anchor requirement schedule.

use serde::{Deserialize, Serialize};

use crate::remap;
use crate::tuning::Tuning;

/// Lower bound of an emitter's spawn wait at `level` (seconds)
pub fn spawn_wait_ceiling(level: u32, tuning: &Tuning) -> f32 {
    if level >= tuning.max_spawn_wait_level {
        return tuning.min_spawn_wait;
    }
    remap(
        level as f32,
        1.0,
        tuning.max_spawn_wait_level as f32,
        tuning.max_spawn_wait,
        tuning.min_spawn_wait,
    )
}

/// Item movement speed at `level`
pub fn item_speed(level: u32, tuning: &Tuning) -> f32 {
    if level >= tuning.max_speed_level {
        return tuning.max_item_speed;
    }
    remap(
        level as f32,
        1.0,
        tuning.max_speed_level as f32,
        tuning.min_item_speed,
        tuning.max_item_speed,
    )
}

/// Cumulative score needed to clear `level`.
///
/// The first anchor carries the full base threshold, each further anchor adds
/// `anchor_threshold_factor` of it.
pub fn score_threshold(score_at_start: u64, level: u32, required_anchors: u32, tuning: &Tuning) -> u64 {
    let base = (tuning.base_score_threshold * level as u64) as f64;
    let extra_anchors = required_anchors.saturating_sub(1) as f64;
    let scaled = base * (extra_anchors * tuning.anchor_threshold_factor + 1.0);
    score_at_start + floor_snapped(scaled) as u64
}

/// `floor`, except values within rounding error of a whole number snap to it
fn floor_snapped(value: f64) -> f64 {
    let nearest = value.round();
    if (value - nearest).abs() <= 1e-9 * nearest.abs().max(1.0) {
        nearest
    } else {
        value.floor()
    }
}

/// Schedule of levels at which one more simultaneous anchor is required.
///
/// The gap between increments grows by one each time, so requirements rise at
/// levels 3, 6, 10, 15, ... with the default tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorSchedule {
    required: u32,
    increment: u32,
    next_increment_level: u32,
}

impl AnchorSchedule {
    /// Schedule at the start of a match (level 1)
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            required: tuning.default_anchors_required,
            increment: tuning.default_anchor_increment,
            next_increment_level: 1 + tuning.default_anchor_increment,
        }
    }

    pub fn required(&self) -> u32 {
        self.required
    }

    pub fn increment(&self) -> u32 {
        self.increment
    }

    pub fn next_increment_level(&self) -> u32 {
        self.next_increment_level
    }

    /// Re-evaluate after the level changed. Returns true if the requirement rose.
    pub fn on_level(&mut self, level: u32) -> bool {
        if level < self.next_increment_level {
            return false;
        }
        self.increment += 1;
        self.required += 1;
        self.next_increment_level = level + self.increment;
        true
    }
}

/// Difficulty parameters derived for one level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelParameters {
    pub level: u32,
    pub required_anchors: u32,
    pub spawn_wait_ceiling: f32,
    pub item_speed: f32,
    pub score_threshold: u64,
}

impl LevelParameters {
    pub fn derive(level: u32, required_anchors: u32, score_at_start: u64, tuning: &Tuning) -> Self {
        Self {
            level,
            required_anchors,
            spawn_wait_ceiling: spawn_wait_ceiling(level, tuning),
            item_speed: item_speed(level, tuning),
            score_threshold: score_threshold(score_at_start, level, required_anchors, tuning),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_threshold_single_anchor() {
        let t = Tuning::default();
        assert_eq!(score_threshold(0, 1, 1, &t), 5);
        assert_eq!(score_threshold(12, 2, 1, &t), 22);
    }

    #[test]
    fn test_threshold_scales_with_anchors() {
        let t = Tuning::default();
        // 5 * 3 * 1.8 = 27
        assert_eq!(score_threshold(0, 3, 2, &t), 27);
        // 5 * 6 * 2.6 = 78
        assert_eq!(score_threshold(100, 6, 3, &t), 178);
        // 5 * 4 * 2.6 = 52
        assert_eq!(score_threshold(0, 4, 3, &t), 52);
    }

    #[test]
    fn test_anchor_schedule_levels() {
        let t = Tuning::default();
        let mut schedule = AnchorSchedule::new(&t);
        let mut raised_at = Vec::new();
        for level in 2..=20 {
            if schedule.on_level(level) {
                raised_at.push((level, schedule.required()));
            }
        }
        assert_eq!(raised_at, vec![(3, 2), (6, 3), (10, 4), (15, 5)]);
        assert_eq!(schedule.increment(), 6);
        assert_eq!(schedule.next_increment_level(), 21);
    }

    #[test]
    fn test_threshold_exact_at_high_levels() {
        let t = Tuning::default();
        let mut schedule = AnchorSchedule::new(&t);
        for level in 2..=65 {
            schedule.on_level(level);
        }
        assert_eq!(schedule.required(), 10);
        // 5 * 65 * (1 + 0.8 * 9) = 2665
        assert_eq!(score_threshold(0, 65, schedule.required(), &t), 2665);
        assert_eq!(score_threshold(0, 3, 2, &Tuning { anchor_threshold_factor: 0.5, ..t }), 22);
    }

    #[test]
    fn test_curve_endpoints() {
        let t = Tuning::default();
        assert!((spawn_wait_ceiling(1, &t) - 5.0).abs() < 1e-6);
        assert!((spawn_wait_ceiling(10, &t) - 1.0).abs() < 1e-6);
        assert!((spawn_wait_ceiling(40, &t) - 1.0).abs() < 1e-6);
        assert!((item_speed(1, &t) - 0.1).abs() < 1e-6);
        assert!((item_speed(8, &t) - 1.0).abs() < 1e-6);
        assert!((item_speed(9, &t) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_level_parameters() {
        let params = LevelParameters::derive(3, 2, 10, &Tuning::default());
        assert_eq!(params.score_threshold, 37);
        assert!(params.spawn_wait_ceiling < 5.0 && params.spawn_wait_ceiling > 1.0);
    }

    proptest! {
        #[test]
        fn prop_curves_stay_in_bounds(level in 1u32..200) {
            let t = Tuning::default();
            let wait = spawn_wait_ceiling(level, &t);
            let speed = item_speed(level, &t);
            prop_assert!(wait >= t.min_spawn_wait && wait <= t.max_spawn_wait);
            prop_assert!(speed >= t.min_item_speed && speed <= t.max_item_speed);
            prop_assert!(spawn_wait_ceiling(level + 1, &t) <= wait);
            prop_assert!(item_speed(level + 1, &t) >= speed);
        }

        #[test]
        fn prop_threshold_matches_integer_formula(level in 1u32..1000, required in 1u32..60) {
            let t = Tuning::default();
            let level = level as u64;
            let extra = (required - 1) as u64;
            prop_assert_eq!(score_threshold(0, level as u32, required, &t), 5 * level + 4 * level * extra);
        }

        #[test]
        fn prop_schedule_grows_by_one(levels in 2u32..60) {
            let t = Tuning::default();
            let mut schedule = AnchorSchedule::new(&t);
            for level in 2..=levels {
                let before = schedule;
                let raised = schedule.on_level(level);
                if raised {
                    prop_assert_eq!(schedule.required(), before.required() + 1);
                    prop_assert!(schedule.increment() > before.increment());
                    prop_assert_eq!(schedule.next_increment_level(), level + schedule.increment());
                } else {
                    prop_assert_eq!(schedule, before);
                }
            }
        }
    }
}
