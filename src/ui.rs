//! Host UI support
//!
//! Maps match state to the panel that should be visible and formats the text
//! those panels show. Widget rendering belongs to the host.

use crate::sim::{CountdownStep, MatchState, PreparationStage};

/// Top-level UI panels. Exactly one is visible at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Panel {
    MainMenu,
    Preparation,
    InPlay,
    Results,
}

impl Panel {
    pub const ALL: [Panel; 4] = [Panel::MainMenu, Panel::Preparation, Panel::InPlay, Panel::Results];

    pub fn for_state(state: MatchState) -> Self {
        match state {
            MatchState::Menu => Panel::MainMenu,
            MatchState::Preparation => Panel::Preparation,
            MatchState::InPlay => Panel::InPlay,
            MatchState::Results => Panel::Results,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Panel::MainMenu => "MainMenu",
            Panel::Preparation => "PreparationPanel",
            Panel::InPlay => "InPlayPanel",
            Panel::Results => "ResultsPanel",
        }
    }
}

/// Placeholder shown when no scores are recorded yet
pub const EMPTY_HIGHSCORES: &str = "---------------------";

/// Main menu high score list, one score per line
pub fn format_highscores(scores: &[u64]) -> String {
    if scores.is_empty() {
        return EMPTY_HIGHSCORES.to_string();
    }
    scores
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Banner and prompt text for the preparation panel
pub fn preparation_text(
    stage: PreparationStage,
    level: u32,
    required_anchors: u32,
    tracked: usize,
) -> Vec<String> {
    match stage {
        PreparationStage::LevelIntro { .. } => vec![
            format!("Level {level}"),
            format!("Waste Sources Required: {required_anchors}"),
        ],
        PreparationStage::Searching => vec![
            format!("Tracked: {tracked}"),
            "Searching for surfaces...".to_string(),
        ],
        PreparationStage::Countdown { step, .. } => vec![match step {
            CountdownStep::Ready => "Ready...".to_string(),
            CountdownStep::Start => "Start!".to_string(),
        }],
    }
}
