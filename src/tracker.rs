//! AR anchor tracking seam
//!
//! The host AR runtime owns plane detection. The game only needs the number of
//! usable anchors and their centre poses.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Centre pose of a tracked plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnchorPose {
    pub id: u64,
    pub position: Vec3,
    pub rotation: Quat,
}

impl AnchorPose {
    pub fn new(id: u64, position: Vec3) -> Self {
        Self {
            id,
            position,
            rotation: Quat::IDENTITY,
        }
    }
}

/// Status of the AR session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Initializing,
    Tracking,
    /// Tracking temporarily lost (e.g. camera covered)
    LostTracking,
    ErrorPermissionNotGranted,
    ErrorConnection,
}

/// Environmental fault. The app reports it and quits; it is never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Camera permission is needed to run this application.")]
    PermissionDenied,
    #[error("The AR service encountered a problem connecting. Please start the app again.")]
    Connection,
}

impl SessionStatus {
    /// Map error statuses to a fatal `SessionError`
    pub fn check(self) -> Result<(), SessionError> {
        match self {
            SessionStatus::ErrorPermissionNotGranted => Err(SessionError::PermissionDenied),
            SessionStatus::ErrorConnection => Err(SessionError::Connection),
            _ => Ok(()),
        }
    }

    pub fn is_tracking(self) -> bool {
        self == SessionStatus::Tracking
    }
}

/// Source of tracked anchors
pub trait AnchorTracker {
    fn session_status(&self) -> SessionStatus;

    /// Anchors usable for spawning, in the order they were first tracked
    fn anchor_poses(&self) -> &[AnchorPose];

    fn tracked_anchor_count(&self) -> usize {
        self.anchor_poses().len()
    }
}

/// Tracking state of one detected plane in a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackingState {
    Tracking,
    Paused,
    Stopped,
}

/// A plane reported by the AR runtime in one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaneObservation {
    pub pose: AnchorPose,
    pub state: TrackingState,
}

/// Anchor list fed by per-frame plane observations
///
/// A plane becomes an anchor the first frame it is seen tracking and stays one
/// for the rest of the session.
#[derive(Debug, Clone)]
pub struct AnchorRegistry {
    status: SessionStatus,
    anchors: Vec<AnchorPose>,
}

impl Default for AnchorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AnchorRegistry {
    pub fn new() -> Self {
        Self {
            status: SessionStatus::Initializing,
            anchors: Vec::new(),
        }
    }

    /// Registry already tracking the given anchors (tests, demos)
    pub fn with_anchors(anchors: impl IntoIterator<Item = AnchorPose>) -> Self {
        let mut registry = Self::new();
        registry.status = SessionStatus::Tracking;
        for pose in anchors {
            registry.insert(pose);
        }
        registry
    }

    /// Update the session status. Error statuses are returned as faults.
    pub fn set_status(&mut self, status: SessionStatus) -> Result<(), SessionError> {
        if status != self.status {
            log::info!("AR session status: {:?} -> {:?}", self.status, status);
            self.status = status;
        }
        status.check()
    }

    /// Ingest this frame's planes. Ignored unless the session is tracking.
    /// Returns how many new anchors were added.
    pub fn observe(&mut self, planes: &[PlaneObservation]) -> usize {
        if !self.status.is_tracking() {
            return 0;
        }
        planes
            .iter()
            .filter(|p| p.state == TrackingState::Tracking)
            .filter(|p| self.insert(p.pose))
            .count()
    }

    fn insert(&mut self, pose: AnchorPose) -> bool {
        if self.anchors.iter().any(|a| a.id == pose.id) {
            return false;
        }
        log::debug!("Anchor {} tracked at {:?}", pose.id, pose.position);
        self.anchors.push(pose);
        true
    }
}

impl AnchorTracker for AnchorRegistry {
    fn session_status(&self) -> SessionStatus {
        self.status
    }

    fn anchor_poses(&self) -> &[AnchorPose] {
        &self.anchors
    }
}
