//! List/Compare mode state machine

use serde::{Deserialize, Serialize};
use tracing::info;

/// Top-level view state of the history panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Revision log
    #[default]
    List,
    /// Diff between two selected revisions
    Compare,
}

/// Result of a mode transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Mode before the transition
    pub from: Mode,
    /// Mode after the transition
    pub to: Mode,
}

impl Transition {
    /// Whether the canonical reset must run
    ///
    /// Every entry into list mode resets, including list to list.
    pub fn resets(&self) -> bool {
        self.to == Mode::List
    }

    /// Whether the mode actually changed
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

/// Holds the current mode; construction starts in list mode without a reset
#[derive(Debug, Clone, Default)]
pub struct ModeStateMachine {
    mode: Mode,
}

impl ModeStateMachine {
    /// Create in list mode
    pub fn new() -> Self {
        Self::default()
    }

    /// Current mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Move to a mode and report what the caller must do
    pub fn transition_to(&mut self, to: Mode) -> Transition {
        let from = std::mem::replace(&mut self.mode, to);
        if from != to {
            info!(?from, ?to, "History mode changed");
        }
        Transition { from, to }
    }
}
