//! Match state and the progression controller
//!
//! The controller is the single owner of the match: state machine, level,
//! score, difficulty parameters, and the live objects of the current level.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::catalog::{Catalog, SpawnCategory, SpawnPool};
use super::difficulty::{AnchorSchedule, LevelParameters};
use super::events::{EventBus, GameEvent, RemovalReason, SubscriberId};
use super::live::LiveObjects;
use super::scheduler::{Scheduler, TimerAction};
use crate::highscores::ScoreRecorder;
use crate::tracker::AnchorTracker;
use crate::tuning::Tuning;

/// Current phase of the match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchState {
    /// Main menu, no match running
    Menu,
    /// Waiting for enough anchors before a level starts
    Preparation,
    /// Items are spawning
    InPlay,
    /// Match lost, final score shown
    Results,
}

/// Countdown shown once enough anchors are tracked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CountdownStep {
    Ready,
    Start,
}

/// Sub-phase of `MatchState::Preparation`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PreparationStage {
    /// New level banner (levels after the first)
    LevelIntro { remaining: f32 },
    /// Waiting for `required_anchors` tracked anchors
    Searching,
    Countdown { step: CountdownStep, remaining: f32 },
}

/// External control requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Request {
    StartGame,
    BeginLevel,
    ReturnToMenu,
    Restart,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("cannot {request:?} while in {from:?}")]
    Invalid { from: MatchState, request: Request },
    #[error("level needs {required} tracked anchors, only {tracked} available")]
    NotEnoughAnchors { required: u32, tracked: usize },
}

/// Owns one match from menu to results
#[derive(Debug)]
pub struct ProgressionController<R: ScoreRecorder> {
    pub(super) tuning: Tuning,
    pub(super) catalog: Catalog,
    pub(super) recorder: R,
    pub(super) state: MatchState,
    pub(super) preparation: PreparationStage,
    pub(super) level: u32,
    pub(super) score: u64,
    pub(super) anchors: AnchorSchedule,
    pub(super) params: LevelParameters,
    pub(super) pool: SpawnPool,
    pub(super) live: LiveObjects,
    pub(super) scheduler: Scheduler,
    pub(super) seed: u64,
    pub(super) rng: Pcg32,
    pub(super) events: EventBus,
    pub(super) player_position: Vec3,
}

impl<R: ScoreRecorder> ProgressionController<R> {
    /// Create a controller in the menu with the given run seed
    pub fn new(tuning: Tuning, catalog: Catalog, recorder: R, seed: u64) -> Self {
        let anchors = AnchorSchedule::new(&tuning);
        let params = LevelParameters::derive(1, anchors.required(), 0, &tuning);
        Self {
            tuning,
            catalog,
            recorder,
            state: MatchState::Menu,
            preparation: PreparationStage::Searching,
            level: 1,
            score: 0,
            anchors,
            params,
            pool: SpawnPool::default(),
            live: LiveObjects::new(),
            scheduler: Scheduler::new(),
            seed,
            rng: Pcg32::seed_from_u64(seed),
            events: EventBus::new(),
            player_position: Vec3::ZERO,
        }
    }

    // === Observers ===

    pub fn subscribe(&mut self, callback: impl FnMut(&GameEvent) + 'static) -> SubscriberId {
        self.events.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.events.unsubscribe(id)
    }

    // === Queries ===

    pub fn state(&self) -> MatchState {
        self.state
    }

    pub fn preparation(&self) -> PreparationStage {
        self.preparation
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn score_threshold(&self) -> u64 {
        self.params.score_threshold
    }

    pub fn required_anchors(&self) -> u32 {
        self.anchors.required()
    }

    pub fn anchor_schedule(&self) -> &AnchorSchedule {
        &self.anchors
    }

    pub fn params(&self) -> &LevelParameters {
        &self.params
    }

    pub fn spawn_pool(&self) -> &SpawnPool {
        &self.pool
    }

    pub fn live(&self) -> &LiveObjects {
        &self.live
    }

    pub fn pending_timers(&self) -> usize {
        self.scheduler.len()
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn recorder(&self) -> &R {
        &self.recorder
    }

    /// High score record, best first
    pub fn high_scores(&self) -> &[u64] {
        self.recorder.high_scores()
    }

    // === Transitions ===

    /// Menu -> Preparation with a fresh match
    pub fn start_game(&mut self) -> Result<(), TransitionError> {
        self.require(MatchState::Menu, Request::StartGame)?;
        self.reset();
        self.enter_preparation();
        Ok(())
    }

    /// Preparation -> InPlay once enough anchors are tracked.
    ///
    /// Places one emitter at each of the first `required_anchors` anchors.
    pub fn begin_level(&mut self, tracker: &impl AnchorTracker) -> Result<(), TransitionError> {
        self.require(MatchState::Preparation, Request::BeginLevel)?;
        let required = self.anchors.required();
        let tracked = tracker.tracked_anchor_count();
        if tracked < required as usize {
            return Err(TransitionError::NotEnoughAnchors { required, tracked });
        }

        self.pool = self.catalog.spawn_pool(self.level);
        if self.pool.is_empty() {
            log::error!("Spawn pool for level {} is empty; nothing will spawn", self.level);
        }
        self.params = LevelParameters::derive(self.level, required, self.score, &self.tuning);

        for pose in tracker.anchor_poses().iter().take(required as usize) {
            let wait = self.sample_spawn_wait();
            let emitter = self.live.add_emitter(*pose, wait);
            let offset = if self.tuning.max_start_offset > 0.0 {
                self.rng.random_range(0.0..self.tuning.max_start_offset)
            } else {
                0.0
            };
            self.scheduler.schedule(offset, TimerAction::Spawn { emitter });
        }

        log::info!(
            "Level {} started: {} anchors, threshold {}, spawn wait >= {:.2}s, speed {:.2}",
            self.level,
            required,
            self.params.score_threshold,
            self.params.spawn_wait_ceiling,
            self.params.item_speed
        );
        self.set_state(MatchState::InPlay);
        Ok(())
    }

    /// Results -> Menu, discarding the finished match
    pub fn return_to_menu(&mut self) -> Result<(), TransitionError> {
        self.require(MatchState::Results, Request::ReturnToMenu)?;
        self.reset();
        self.set_state(MatchState::Menu);
        Ok(())
    }

    /// Results -> Preparation with a fresh match
    pub fn restart(&mut self) -> Result<(), TransitionError> {
        self.require(MatchState::Results, Request::Restart)?;
        self.reset();
        self.enter_preparation();
        Ok(())
    }

    /// Add the points for `category`; advances the level once the threshold is reached.
    pub fn record_score(&mut self, category: SpawnCategory) {
        match self.state {
            MatchState::Menu | MatchState::Results => {
                log::warn!("Ignoring {} score outside a match", category.as_str());
                return;
            }
            MatchState::Preparation | MatchState::InPlay => {}
        }

        self.score += category.points();
        self.events.emit(&GameEvent::ScoreUpdated(self.score));

        if self.state == MatchState::InPlay && self.score >= self.params.score_threshold {
            self.advance_level();
        }
    }

    /// Player cleared an item. Returns its category, `None` for unknown items.
    pub fn despawn_item(&mut self, id: u32) -> Option<SpawnCategory> {
        if self.state != MatchState::InPlay {
            return None;
        }
        let item = self.live.remove_item(id)?;
        self.scheduler
            .cancel_where(|action| matches!(action, TimerAction::Expire { item } if *item == id));
        self.events.emit(&GameEvent::ItemRemoved {
            id,
            reason: RemovalReason::Collected,
        });
        self.record_score(item.category);
        Some(item.category)
    }

    /// Halt or resume an item's movement. Returns false for unknown items.
    pub fn set_item_moving(&mut self, id: u32, moving: bool) -> bool {
        match self.live.item_mut(id) {
            Some(item) => {
                item.halted = !moving;
                true
            }
            None => false,
        }
    }

    /// InPlay -> Results. The final score is offered to the high score record.
    /// Returns the rank reached; ignored (None) outside play.
    pub fn lose_game(&mut self) -> Option<usize> {
        if self.state != MatchState::InPlay {
            log::debug!("Lose signal ignored in {:?}", self.state);
            return None;
        }
        self.clear_live();
        let rank = self.recorder.offer_score(self.score);
        log::info!(
            "Match over at level {} with score {} (rank {:?})",
            self.level,
            self.score,
            rank
        );
        self.events.emit(&GameEvent::MatchEnded {
            final_score: self.score,
            rank,
        });
        self.set_state(MatchState::Results);
        rank
    }

    // === Internals ===

    fn require(&self, expected: MatchState, request: Request) -> Result<(), TransitionError> {
        if self.state == expected {
            Ok(())
        } else {
            log::warn!("Rejected {:?} in {:?}", request, self.state);
            Err(TransitionError::Invalid {
                from: self.state,
                request,
            })
        }
    }

    pub(super) fn set_state(&mut self, state: MatchState) {
        log::info!("Match state: {:?} -> {:?}", self.state, state);
        self.state = state;
        self.events.emit(&GameEvent::StateChanged(state));
    }

    fn enter_preparation(&mut self) {
        self.preparation = if self.level > 1 {
            PreparationStage::LevelIntro {
                remaining: self.tuning.level_intro,
            }
        } else {
            PreparationStage::Searching
        };
        self.set_state(MatchState::Preparation);
    }

    /// Reset every match-scoped value
    fn reset(&mut self) {
        self.clear_live();
        self.level = 1;
        self.score = 0;
        self.anchors = AnchorSchedule::new(&self.tuning);
        self.params = LevelParameters::derive(1, self.anchors.required(), 0, &self.tuning);
        self.params.score_threshold = 0;
        self.pool = SpawnPool::default();
        self.preparation = PreparationStage::Searching;
    }

    fn advance_level(&mut self) {
        self.level += 1;
        self.clear_live();
        if self.anchors.on_level(self.level) {
            log::info!(
                "Level {} now needs {} anchors",
                self.level,
                self.anchors.required()
            );
        }
        self.params =
            LevelParameters::derive(self.level, self.anchors.required(), self.score, &self.tuning);
        self.events.emit(&GameEvent::LevelAdvanced {
            level: self.level,
            required_anchors: self.anchors.required(),
        });
        self.enter_preparation();
    }

    /// Destroy every emitter and item along with their timers
    pub(super) fn clear_live(&mut self) {
        self.live.clear();
        self.scheduler.clear();
    }

    fn sample_spawn_wait(&mut self) -> f32 {
        let low = self.params.spawn_wait_ceiling;
        let high = self.tuning.max_spawn_wait.max(low);
        self.rng.random_range(low..=high)
    }
}
