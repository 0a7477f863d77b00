#![warn(missing_docs)]

//! Revision history for versioned dashboards
//!
//! Lists saved revisions of a document, lets the user mark two of them for
//! comparison, fetches and caches diffs, and restores a prior version.
//!
//! ## Components
//!
//! - **RevisionStore**: paginated, ordered log of loaded revisions
//! - **SelectionManager**: bounded set of versions marked for comparison
//! - **DiffCache**: diffs keyed by version pair and format
//! - **ModeStateMachine**: list/compare view state
//! - **RestoreWorkflow**: confirm, execute and record a restore
//!
//! [`HistoryController`] composes them behind a single `Send + Sync` facade
//! talking to a [`RevisionBackend`] and an [`EventPublisher`].

pub mod config;
pub mod controller;
pub mod diff_cache;
pub mod error;
pub mod events;
pub mod generation;
pub mod mode;
pub mod models;
pub mod ports;
pub mod restore;
pub mod selection;
pub mod store;

// Re-export public API
pub use config::{ConfigLoader, DisplayTimezone, HistoryConfig, RestoreStrategy};
pub use controller::HistoryController;
pub use diff_cache::{DiffCache, DiffKey};
pub use error::{HistoryError, Operation, Result};
pub use events::{
    ConfirmAction, ConfirmPrompt, EventPublisher, HistoryEvent, NoopEventPublisher,
    NotificationKind, RecordingEventPublisher,
};
pub use generation::{Generation, GenerationSlot};
pub use mode::{Mode, ModeStateMachine, Transition};
pub use models::{DiffFormat, DiffPayload, DocumentRef, PageCursor, RestoredDocument, Revision};
pub use ports::RevisionBackend;
pub use restore::{synthesize_restored, RestoreState, RestoreWorkflow};
pub use selection::SelectionManager;
pub use store::RevisionStore;
