//! Confirm, execute and record a restore

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{HistoryError, Result};
use crate::events::ConfirmPrompt;
use crate::models::Revision;

/// Where the restore workflow stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RestoreState {
    /// Nothing pending
    #[default]
    Idle,
    /// Waiting for the user to answer the prompt
    Confirming {
        /// Version the user was asked about
        version: u32,
    },
    /// Restore request outstanding
    Executing {
        /// Version being restored
        version: u32,
    },
}

/// Idle → Confirming → Executing → Idle
///
/// Only one restore may execute at a time.
#[derive(Debug, Clone, Default)]
pub struct RestoreWorkflow {
    state: RestoreState,
}

impl RestoreWorkflow {
    /// Create an idle workflow
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    pub fn state(&self) -> RestoreState {
        self.state
    }

    /// Whether a restore is executing
    pub fn is_executing(&self) -> bool {
        matches!(self.state, RestoreState::Executing { .. })
    }

    /// Ask for confirmation; nothing else changes until the user confirms
    pub fn request(&mut self, version: u32) -> Result<ConfirmPrompt> {
        if let RestoreState::Executing { version: running } = self.state {
            return Err(HistoryError::RestoreInProgress(running));
        }
        self.state = RestoreState::Confirming { version };
        Ok(ConfirmPrompt::restore(version))
    }

    /// Enter the executing state, rejecting a second concurrent restore
    pub fn begin(&mut self, version: u32) -> Result<()> {
        if let RestoreState::Executing { version: running } = self.state {
            return Err(HistoryError::RestoreInProgress(running));
        }
        self.state = RestoreState::Executing { version };
        Ok(())
    }

    /// Return to idle after success or failure
    pub fn finish(&mut self) {
        self.state = RestoreState::Idle;
    }

    /// Dismiss a pending confirmation; an executing restore is unaffected
    pub fn cancel(&mut self) -> bool {
        if let RestoreState::Confirming { .. } = self.state {
            self.state = RestoreState::Idle;
            return true;
        }
        false
    }
}

/// Build the log entry a restore to `version` creates on top of `head`
pub fn synthesize_restored(
    head: &Revision,
    document_id: i64,
    version: u32,
    created_by: &str,
    created_at: DateTime<Utc>,
) -> Revision {
    Revision {
        id: head.id + 1,
        document_id,
        version: head.version + 1,
        parent_version: version,
        created_at,
        created_by: created_by.to_string(),
        message: format!("Restored from version {version}"),
        restored_from: Some(version),
        checked: false,
    }
}
