//! Per-frame update
//!
//! Advances the preparation countdown, fires emitter and lifetime timers,
//! moves items, and detects player contact.

use glam::{Quat, Vec3};
use rand::Rng;

use super::events::GameEvent;
use super::live::SpawnedItem;
use super::scheduler::TimerAction;
use super::state::{CountdownStep, MatchState, PreparationStage, ProgressionController};
use crate::highscores::ScoreRecorder;
use crate::tracker::AnchorTracker;

/// Player input for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Camera (player) position in world space
    pub player_position: Vec3,
    /// Items the player cleared this frame
    pub collected: Vec<u32>,
}

/// Advance the match by `dt` seconds
pub fn tick<R: ScoreRecorder>(
    ctrl: &mut ProgressionController<R>,
    input: &TickInput,
    tracker: &impl AnchorTracker,
    dt: f32,
) {
    ctrl.player_position = input.player_position;

    match ctrl.state {
        MatchState::Menu | MatchState::Results => {}
        MatchState::Preparation => update_preparation(ctrl, tracker, dt),
        MatchState::InPlay => update_play(ctrl, input, dt),
    }
}

fn update_preparation<R: ScoreRecorder>(
    ctrl: &mut ProgressionController<R>,
    tracker: &impl AnchorTracker,
    dt: f32,
) {
    let stage = ctrl.preparation;
    ctrl.preparation = match stage {
        PreparationStage::LevelIntro { remaining } => {
            let remaining = remaining - dt;
            if remaining > 0.0 {
                PreparationStage::LevelIntro { remaining }
            } else {
                PreparationStage::Searching
            }
        }
        PreparationStage::Searching => {
            if tracker.tracked_anchor_count() >= ctrl.anchors.required() as usize {
                PreparationStage::Countdown {
                    step: CountdownStep::Ready,
                    remaining: ctrl.tuning.ready_wait,
                }
            } else {
                PreparationStage::Searching
            }
        }
        PreparationStage::Countdown { step, remaining } => {
            let remaining = remaining - dt;
            match step {
                _ if remaining > 0.0 => PreparationStage::Countdown { step, remaining },
                CountdownStep::Ready => PreparationStage::Countdown {
                    step: CountdownStep::Start,
                    remaining: ctrl.tuning.start_wait,
                },
                CountdownStep::Start => match ctrl.begin_level(tracker) {
                    Ok(()) => return,
                    Err(err) => {
                        log::warn!("Could not start level: {err}");
                        PreparationStage::Searching
                    }
                },
            }
        }
    };
}

fn update_play<R: ScoreRecorder>(ctrl: &mut ProgressionController<R>, input: &TickInput, dt: f32) {
    let level = ctrl.level;

    for &id in &input.collected {
        ctrl.despawn_item(id);
        if ctrl.state != MatchState::InPlay || ctrl.level != level {
            return;
        }
    }

    for (due, action) in ctrl.scheduler.advance(dt) {
        match action {
            TimerAction::Spawn { emitter } => spawn_from(ctrl, emitter, due),
            TimerAction::Expire { item } => expire(ctrl, item),
        }
        // Loss clears the schedule; the rest of this batch belongs to a dead level
        if ctrl.state != MatchState::InPlay {
            return;
        }
    }

    for item in ctrl.live.items_mut() {
        item.advance(dt);
    }

    let radius = ctrl.tuning.player_contact_radius;
    let player = ctrl.player_position;
    let touching = ctrl
        .live
        .items()
        .iter()
        .find(|i| i.touches(player, radius))
        .map(|i| (i.id, i.archetype.clone()));
    if let Some((id, archetype)) = touching {
        log::info!("Item {id} ({archetype}) reached the player");
        ctrl.lose_game();
    }
}

/// Produce one item from `emitter_id` and schedule its next spawn
fn spawn_from<R: ScoreRecorder>(ctrl: &mut ProgressionController<R>, emitter_id: u32, due: f64) {
    let Some(emitter) = ctrl.live.emitter(emitter_id).cloned() else {
        return;
    };
    ctrl.scheduler
        .schedule_at(due + emitter.wait as f64, TimerAction::Spawn { emitter: emitter_id });

    let Some(archetype) = ctrl.pool.pick(&mut ctrl.rng).cloned() else {
        log::warn!("Emitter {emitter_id} has an empty spawn pool");
        return;
    };
    let model = ctrl
        .catalog
        .pick_model(archetype.category, &mut ctrl.rng)
        .map(str::to_string);

    let spin_axis = Vec3::new(
        ctrl.rng.random_range(0.0..1.0),
        ctrl.rng.random_range(0.0..1.0),
        ctrl.rng.random_range(0.0..1.0),
    )
    .normalize_or(Vec3::Y);

    let id = ctrl.live.next_entity_id();
    let position = emitter.anchor.position;
    let item = SpawnedItem {
        id,
        emitter: emitter_id,
        archetype: archetype.id.clone(),
        category: archetype.category,
        model,
        position,
        direction: (ctrl.player_position - position).normalize_or_zero(),
        speed: ctrl.params.item_speed,
        scale: ctrl.tuning.unit_scale,
        spin_axis,
        rotation: Quat::IDENTITY,
        halted: false,
    };
    log::debug!("Spawned {} #{} at emitter {}", item.archetype, id, emitter_id);
    ctrl.live.add_item(item);
    ctrl.scheduler
        .schedule_at(due + ctrl.tuning.item_lifetime as f64, TimerAction::Expire { item: id });
    ctrl.events.emit(&GameEvent::ItemSpawned {
        id,
        archetype: archetype.id,
        category: archetype.category,
    });
}

/// Lifetime ran out: anything but an inert item ends the match.
///
/// Inert items stay in play and can still reach the player.
fn expire<R: ScoreRecorder>(ctrl: &mut ProgressionController<R>, item_id: u32) {
    let Some(category) = ctrl.live.item(item_id).map(|i| i.category) else {
        return;
    };
    if category.is_inert() {
        log::debug!("Inert item {item_id} outlived its lifetime");
    } else {
        log::info!("Item {item_id} expired uncollected");
        ctrl.lose_game();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FRAME_DT;
    use crate::highscores::HighScoreStore;
    use crate::persistence::MemoryStorage;
    use crate::sim::catalog::{Archetype, Catalog, CatalogManifest, SpawnCategory};
    use crate::tracker::{AnchorPose, AnchorRegistry};
    use crate::tuning::Tuning;

    type Controller = ProgressionController<HighScoreStore<MemoryStorage>>;

    fn catalog_of(category: SpawnCategory) -> Catalog {
        Catalog::from_manifest(CatalogManifest {
            archetypes: vec![Archetype::new("thing", category, 1)],
            ..CatalogManifest::builtin()
        })
    }

    fn controller(catalog: Catalog, tuning: Tuning) -> Controller {
        ProgressionController::new(tuning, catalog, HighScoreStore::load(MemoryStorage::new()), 7)
    }

    /// Player far from the single anchor so items never arrive within the test window
    fn far_player() -> TickInput {
        TickInput {
            player_position: Vec3::new(0.0, 0.0, 500.0),
            collected: Vec::new(),
        }
    }

    fn run(ctrl: &mut Controller, tracker: &AnchorRegistry, input: &TickInput, seconds: f32) {
        let steps = (seconds / FRAME_DT).ceil() as u32;
        for _ in 0..steps {
            tick(ctrl, input, tracker, FRAME_DT);
        }
    }

    fn tracker() -> AnchorRegistry {
        AnchorRegistry::with_anchors([AnchorPose::new(1, Vec3::ZERO)])
    }

    #[test]
    fn test_countdown_starts_level() {
        let mut ctrl = controller(Catalog::default(), Tuning::default());
        let tracker = tracker();
        ctrl.start_game().unwrap();

        tick(&mut ctrl, &far_player(), &tracker, FRAME_DT);
        assert!(matches!(
            ctrl.preparation(),
            PreparationStage::Countdown {
                step: CountdownStep::Ready,
                ..
            }
        ));

        run(&mut ctrl, &tracker, &far_player(), 3.5);
        assert_eq!(ctrl.state(), MatchState::Preparation);
        run(&mut ctrl, &tracker, &far_player(), 1.0);
        assert_eq!(ctrl.state(), MatchState::InPlay);
    }

    #[test]
    fn test_searching_waits_for_anchors() {
        let mut ctrl = controller(Catalog::default(), Tuning::default());
        let empty = AnchorRegistry::with_anchors(Vec::<AnchorPose>::new());
        ctrl.start_game().unwrap();
        run(&mut ctrl, &empty, &far_player(), 10.0);
        assert_eq!(ctrl.preparation(), PreparationStage::Searching);
        assert_eq!(ctrl.state(), MatchState::Preparation);
    }

    #[test]
    fn test_items_spawn_and_move_toward_player() {
        let mut ctrl = controller(catalog_of(SpawnCategory::PlasticWaste), Tuning::default());
        let tracker = tracker();
        ctrl.start_game().unwrap();
        ctrl.begin_level(&tracker).unwrap();

        // First spawn lands within the start offset
        run(&mut ctrl, &tracker, &far_player(), 5.1);
        assert_eq!(ctrl.state(), MatchState::InPlay);
        let item = ctrl.live().items().first().cloned().expect("item spawned");
        assert_eq!(item.archetype, "thing");
        assert!(item.direction.z > 0.99);
        assert!(item.position.z > 0.0);
        assert!((item.scale - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_collecting_scores() {
        let mut ctrl = controller(catalog_of(SpawnCategory::Animal), Tuning::default());
        let tracker = tracker();
        ctrl.start_game().unwrap();
        ctrl.begin_level(&tracker).unwrap();
        run(&mut ctrl, &tracker, &far_player(), 5.1);
        let id = ctrl.live().items()[0].id;

        let input = TickInput {
            collected: vec![id],
            ..far_player()
        };
        tick(&mut ctrl, &input, &tracker, FRAME_DT);
        assert_eq!(ctrl.score(), 3);
        assert!(ctrl.live().item(id).is_none());
    }

    #[test]
    fn test_expiry_loses_match() {
        let mut ctrl = controller(catalog_of(SpawnCategory::MetalWaste), Tuning::default());
        let tracker = tracker();
        ctrl.start_game().unwrap();
        ctrl.begin_level(&tracker).unwrap();
        // Start offset (< 5s) + lifetime (15s)
        run(&mut ctrl, &tracker, &far_player(), 20.5);
        assert_eq!(ctrl.state(), MatchState::Results);
        assert!(ctrl.live().is_empty());
        assert_eq!(ctrl.pending_timers(), 0);
        assert_eq!(ctrl.high_scores(), &[0]);
    }

    #[test]
    fn test_inert_items_outlive_lifetime() {
        let mut ctrl = controller(catalog_of(SpawnCategory::InertWaste), Tuning::default());
        let tracker = tracker();
        ctrl.start_game().unwrap();
        ctrl.begin_level(&tracker).unwrap();
        run(&mut ctrl, &tracker, &far_player(), 40.0);
        assert_eq!(ctrl.state(), MatchState::InPlay);
        // Every spawned item is still drifting
        assert!(ctrl.live().items().len() >= 7);
    }

    #[test]
    fn test_expired_inert_item_can_still_touch_player() {
        let tuning = Tuning {
            max_start_offset: 0.0,
            ..Tuning::default()
        };
        let mut ctrl = controller(catalog_of(SpawnCategory::InertWaste), tuning);
        let tracker = AnchorRegistry::with_anchors([AnchorPose::new(1, Vec3::new(0.0, 0.0, -2.0))]);
        let player = TickInput::default();
        ctrl.start_game().unwrap();
        ctrl.begin_level(&tracker).unwrap();

        tick(&mut ctrl, &player, &tracker, FRAME_DT);
        let first = ctrl.live().items()[0].id;

        // Past the 15s lifetime, still short of the player at 0.1 m/s
        run(&mut ctrl, &tracker, &player, 17.0);
        assert_eq!(ctrl.state(), MatchState::InPlay);
        assert!(ctrl.live().item(first).is_some());

        run(&mut ctrl, &tracker, &player, 3.0);
        assert_eq!(ctrl.state(), MatchState::Results);
    }

    #[test]
    fn test_contact_loses_match() {
        let tuning = Tuning {
            max_start_offset: 0.0,
            ..Tuning::default()
        };
        let mut ctrl = controller(catalog_of(SpawnCategory::InertWaste), tuning);
        let tracker = tracker();
        ctrl.start_game().unwrap();
        ctrl.begin_level(&tracker).unwrap();

        // Player standing on the anchor
        let input = TickInput {
            player_position: Vec3::new(0.0, 0.0, 0.05),
            collected: Vec::new(),
        };
        tick(&mut ctrl, &input, &tracker, FRAME_DT);
        assert_eq!(ctrl.state(), MatchState::Results);
    }

    #[test]
    fn test_halted_item_stays_put() {
        let tuning = Tuning {
            max_start_offset: 0.0,
            ..Tuning::default()
        };
        let mut ctrl = controller(catalog_of(SpawnCategory::InertWaste), tuning);
        let tracker = tracker();
        ctrl.start_game().unwrap();
        ctrl.begin_level(&tracker).unwrap();
        tick(&mut ctrl, &far_player(), &tracker, FRAME_DT);

        let id = ctrl.live().items()[0].id;
        assert!(ctrl.set_item_moving(id, false));
        let before = ctrl.live().item(id).unwrap().position;
        run(&mut ctrl, &tracker, &far_player(), 1.0);
        assert_eq!(ctrl.live().item(id).unwrap().position, before);
        assert!(!ctrl.set_item_moving(9999, true));
    }

    #[test]
    fn test_same_seed_same_match() {
        let tracker = tracker();
        let mut a = controller(Catalog::default(), Tuning::default());
        let mut b = controller(Catalog::default(), Tuning::default());
        for ctrl in [&mut a, &mut b] {
            ctrl.start_game().unwrap();
            ctrl.begin_level(&tracker).unwrap();
            run(ctrl, &tracker, &far_player(), 12.0);
        }
        assert_eq!(a.live().items(), b.live().items());
        assert_eq!(a.live().emitters(), b.live().emitters());
    }
}
