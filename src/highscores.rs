//! High score leaderboard system
//!
//! Tracks the top 10 final match scores and persists them through a `Storage`
//! backend after every change.

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_HIGH_SCORES, PLAYER_INFO_KEY};
use crate::persistence::{self, Storage};

/// High score leaderboard (sorted descending, duplicates allowed)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct HighScores {
    #[serde(rename = "highscores")]
    pub entries: Vec<u64>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Must beat the lowest kept entry
        self.entries.last().map(|&lowest| score > lowest).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|&e| score > e);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Add a new score to the leaderboard (if it qualifies)
    /// Returns the rank achieved (1-indexed) or None if didn't qualify
    pub fn add_score(&mut self, score: u64) -> Option<usize> {
        let rank = self.potential_rank(score)?;
        self.entries.insert(rank - 1, score);
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().copied()
    }

    /// Restore the ordering/length invariant on data read from disk
    fn normalize(&mut self) {
        self.entries.sort_unstable_by(|a, b| b.cmp(a));
        self.entries.truncate(MAX_HIGH_SCORES);
    }
}

/// Receives final match scores
pub trait ScoreRecorder {
    /// Offer a final score, returning the rank achieved if it was kept
    fn offer_score(&mut self, score: u64) -> Option<usize>;

    /// Current record, best first
    fn high_scores(&self) -> &[u64];
}

/// High score record bound to a storage backend
#[derive(Debug)]
pub struct HighScoreStore<S: Storage> {
    storage: S,
    record: HighScores,
}

impl<S: Storage> HighScoreStore<S> {
    /// Load the record from `storage`.
    ///
    /// Missing, unreadable, or corrupt data yields an empty record, which is
    /// written back immediately.
    pub fn load(storage: S) -> Self {
        let loaded = match storage.read(PLAYER_INFO_KEY) {
            Ok(Some(text)) => match persistence::open::<HighScores>(&text) {
                Ok(mut record) => {
                    record.normalize();
                    Some(record)
                }
                Err(err) => {
                    log::warn!("Error loading high scores ({err}); overwriting save file");
                    None
                }
            },
            Ok(None) => {
                log::info!("No high scores found, starting fresh");
                None
            }
            Err(err) => {
                log::warn!("Could not read high scores ({err}); starting fresh");
                None
            }
        };

        match loaded {
            Some(record) => {
                log::info!("Loaded {} high scores", record.len());
                Self { storage, record }
            }
            None => {
                let mut store = Self {
                    storage,
                    record: HighScores::new(),
                };
                store.save();
                store
            }
        }
    }

    /// Current record, best first
    pub fn get_all(&self) -> &[u64] {
        &self.record.entries
    }

    pub fn record(&self) -> &HighScores {
        &self.record
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Write the record through to storage
    fn save(&mut self) {
        let text = match persistence::seal(&self.record) {
            Ok(text) => text,
            Err(err) => {
                log::error!("Failed to serialize high scores: {err}");
                return;
            }
        };
        match self.storage.write(PLAYER_INFO_KEY, &text) {
            Ok(()) => log::info!("High scores saved ({} entries)", self.record.len()),
            Err(err) => log::error!("Failed to save high scores: {err}"),
        }
    }
}

impl<S: Storage> ScoreRecorder for HighScoreStore<S> {
    fn offer_score(&mut self, score: u64) -> Option<usize> {
        let rank = self.record.add_score(score)?;
        self.save();
        Some(rank)
    }

    fn high_scores(&self) -> &[u64] {
        self.get_all()
    }
}
