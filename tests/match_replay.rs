use std::cell::RefCell;
use std::rc::Rc;

use ar_waste_patrol::consts::FRAME_DT;
use ar_waste_patrol::persistence::{FileStorage, MemoryStorage};
use ar_waste_patrol::sim::{
    Catalog, GameEvent, MatchState, ProgressionController, SpawnCategory, TickInput, tick,
};
use ar_waste_patrol::tracker::{AnchorPose, AnchorRegistry};
use ar_waste_patrol::{HighScoreStore, ScoreRecorder, Tuning};
use glam::Vec3;

fn ring_tracker(count: u64) -> AnchorRegistry {
    AnchorRegistry::with_anchors((0..count).map(|i| {
        let angle = i as f32 * 1.1;
        AnchorPose::new(i, Vec3::new(3.0 * angle.cos(), 0.0, 3.0 * angle.sin()))
    }))
}

/// Player clears every item as soon as it has travelled a little way
fn greedy_input<R: ScoreRecorder>(ctrl: &ProgressionController<R>) -> TickInput {
    TickInput {
        player_position: Vec3::ZERO,
        collected: ctrl
            .live()
            .items()
            .iter()
            .filter(|item| item.position.length() < 2.9)
            .map(|item| item.id)
            .collect(),
    }
}

#[test]
fn greedy_player_climbs_levels_with_monotone_progress() {
    let tracker = ring_tracker(6);
    let mut ctrl = ProgressionController::new(
        Tuning::default(),
        Catalog::default(),
        HighScoreStore::load(MemoryStorage::new()),
        2024,
    );
    ctrl.start_game().expect("start from menu");

    let mut last_score = 0;
    let mut last_level = 1;
    let mut last_required = ctrl.required_anchors();

    for _ in 0..(600.0 / FRAME_DT) as u32 {
        let input = greedy_input(&ctrl);
        tick(&mut ctrl, &input, &tracker, FRAME_DT);

        assert!(ctrl.score() >= last_score, "score went backwards");
        assert!(ctrl.required_anchors() >= last_required);
        if ctrl.level() != last_level {
            assert_eq!(ctrl.level(), last_level + 1);
            assert_eq!(ctrl.state(), MatchState::Preparation);
            assert!(ctrl.live().is_empty());
            assert_eq!(ctrl.pending_timers(), 0);
        }
        last_score = ctrl.score();
        last_level = ctrl.level();
        last_required = ctrl.required_anchors();

        if ctrl.state() == MatchState::Results {
            break;
        }
    }

    assert!(ctrl.level() >= 3, "reached level {}", ctrl.level());
    assert!(ctrl.required_anchors() >= 2);
}

#[test]
fn identical_seeds_replay_identically() {
    let tracker = ring_tracker(4);
    let make = || {
        ProgressionController::new(
            Tuning::default(),
            Catalog::default(),
            HighScoreStore::load(MemoryStorage::new()),
            99,
        )
    };
    let mut a = make();
    let mut b = make();
    a.start_game().unwrap();
    b.start_game().unwrap();

    for _ in 0..(120.0 / FRAME_DT) as u32 {
        let input_a = greedy_input(&a);
        let input_b = greedy_input(&b);
        tick(&mut a, &input_a, &tracker, FRAME_DT);
        tick(&mut b, &input_b, &tracker, FRAME_DT);
        assert_eq!(a.score(), b.score());
        assert_eq!(a.level(), b.level());
        assert_eq!(a.live().items(), b.live().items());
    }
}

#[test]
fn idle_player_loses_and_score_persists() {
    let dir = tempfile::tempdir().unwrap();
    let tracker = ring_tracker(1);
    let mut ctrl = ProgressionController::new(
        Tuning::default(),
        Catalog::default(),
        HighScoreStore::load(FileStorage::new(dir.path())),
        5,
    );

    let ended = Rc::new(RefCell::new(None));
    {
        let ended = ended.clone();
        ctrl.subscribe(move |event| {
            if let GameEvent::MatchEnded { final_score, .. } = event {
                *ended.borrow_mut() = Some(*final_score);
            }
        });
    }

    ctrl.start_game().unwrap();
    ctrl.begin_level(&tracker).unwrap();
    ctrl.record_score(SpawnCategory::HazardousWaste);

    let idle = TickInput {
        player_position: Vec3::new(0.0, 0.0, 100.0),
        collected: Vec::new(),
    };
    for _ in 0..(30.0 / FRAME_DT) as u32 {
        tick(&mut ctrl, &idle, &tracker, FRAME_DT);
    }

    assert_eq!(ctrl.state(), MatchState::Results);
    assert_eq!(*ended.borrow(), Some(2));

    let reloaded = HighScoreStore::load(FileStorage::new(dir.path()));
    assert_eq!(reloaded.get_all(), &[2]);
}
