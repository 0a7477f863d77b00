//! Events the controller emits towards its host
//!
//! The host renders notifications, shows confirmation prompts, scrolls the
//! panel on mode changes and re-renders the document after a restore. All of
//! that happens outside this crate; the controller only publishes.

use std::sync::RwLock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::mode::Mode;
use crate::models::RestoredDocument;

/// Severity of a host notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// Operation completed
    Success,
    /// Something needs attention
    Warning,
    /// Operation failed
    Error,
}

/// What the host should call back when a prompt is answered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfirmAction {
    /// Execute a restore to the given version
    Restore {
        /// Version to restore
        version: u32,
    },
}

/// Confirmation dialog content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmPrompt {
    pub title: String,
    pub text: String,
    pub text2: String,
    pub icon: String,
    /// Label of the affirmative button
    pub yes_text: String,
    /// Action to run on confirm
    pub on_confirm: ConfirmAction,
    /// Label of an optional alternate button
    pub alt_action_text: Option<String>,
    /// Action to run when the alternate button is pressed
    pub on_alt_action: Option<ConfirmAction>,
}

impl ConfirmPrompt {
    /// Prompt warning that restoring discards unsaved changes
    pub fn restore(version: u32) -> Self {
        Self {
            title: "Restore version".to_string(),
            text: String::new(),
            text2: format!(
                "Are you sure you want to restore the dashboard to version {version}? All unsaved changes will be lost."
            ),
            icon: "fa-rotate-right".to_string(),
            yes_text: format!("Yes, restore to version {version}"),
            on_confirm: ConfirmAction::Restore { version },
            alt_action_text: None,
            on_alt_action: None,
        }
    }
}

/// Event published by the history controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HistoryEvent {
    /// Show a notification
    Notification {
        kind: NotificationKind,
        title: String,
        message: String,
    },

    /// Ask the user to confirm an action
    ConfirmRequested(ConfirmPrompt),

    /// The panel switched between list and compare view
    ModeChanged {
        /// Mode now shown
        mode: Mode,
    },

    /// A restore succeeded; the host should re-render this document
    DocumentRestored {
        /// Document at its new version
        document: RestoredDocument,
        /// Version the document was restored from
        restored_from: u32,
    },
}

impl HistoryEvent {
    /// Error notification with a title and detail
    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Notification {
            kind: NotificationKind::Error,
            title: title.into(),
            message: message.into(),
        }
    }

    /// Success notification with a title and detail
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Notification {
            kind: NotificationKind::Success,
            title: title.into(),
            message: message.into(),
        }
    }

    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            HistoryEvent::Notification { .. } => "Notification",
            HistoryEvent::ConfirmRequested(_) => "ConfirmRequested",
            HistoryEvent::ModeChanged { .. } => "ModeChanged",
            HistoryEvent::DocumentRestored { .. } => "DocumentRestored",
        }
    }

    /// Whether this is an error notification
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            HistoryEvent::Notification {
                kind: NotificationKind::Error,
                ..
            }
        )
    }
}

/// Event publisher port implemented by the host
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a history event
    async fn publish(&self, event: HistoryEvent);
}

/// Publisher that drops every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEventPublisher;

#[async_trait]
impl EventPublisher for NoopEventPublisher {
    async fn publish(&self, _event: HistoryEvent) {}
}

/// Publisher that keeps every event in memory, for hosts that poll and for tests
///
/// # Example
///
/// ```rust
/// use dashrev_history::{EventPublisher, HistoryEvent, RecordingEventPublisher};
///
/// # tokio_test::block_on(async {
/// let publisher = RecordingEventPublisher::new();
/// publisher.publish(HistoryEvent::error("Fetch failed", "timeout")).await;
///
/// assert_eq!(publisher.error_count(), 1);
/// # });
/// ```
#[derive(Debug, Default)]
pub struct RecordingEventPublisher {
    events: RwLock<Vec<HistoryEvent>>,
}

impl RecordingEventPublisher {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// All events published so far
    pub fn events(&self) -> Vec<HistoryEvent> {
        self.events
            .read()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Take and clear the recorded events
    pub fn drain(&self) -> Vec<HistoryEvent> {
        self.events
            .write()
            .map(|mut events| std::mem::take(&mut *events))
            .unwrap_or_default()
    }

    /// Number of error notifications published so far
    pub fn error_count(&self) -> usize {
        self.events().iter().filter(|e| e.is_error()).count()
    }
}

#[async_trait]
impl EventPublisher for RecordingEventPublisher {
    async fn publish(&self, event: HistoryEvent) {
        if let Ok(mut events) = self.events.write() {
            events.push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restore_prompt_mentions_version() {
        let prompt = ConfirmPrompt::restore(4);
        assert_eq!(prompt.title, "Restore version");
        assert!(prompt.text2.contains("version 4"));
        assert!(prompt.text2.contains("All unsaved changes will be lost."));
        assert_eq!(prompt.yes_text, "Yes, restore to version 4");
        assert_eq!(prompt.on_confirm, ConfirmAction::Restore { version: 4 });
        assert!(prompt.on_alt_action.is_none());
    }

    #[test]
    fn test_recording_publisher_counts_errors() {
        let publisher = RecordingEventPublisher::new();
        tokio_test::block_on(async {
            publisher.publish(HistoryEvent::error("boom", "detail")).await;
            publisher
                .publish(HistoryEvent::ModeChanged { mode: Mode::List })
                .await;
            publisher.publish(HistoryEvent::success("ok", "")).await;
        });

        assert_eq!(publisher.events().len(), 3);
        assert_eq!(publisher.error_count(), 1);
        assert_eq!(publisher.drain().len(), 3);
        assert!(publisher.events().is_empty());
    }

    #[test]
    fn test_event_type_names() {
        assert_eq!(
            HistoryEvent::ConfirmRequested(ConfirmPrompt::restore(1)).event_type(),
            "ConfirmRequested"
        );
        assert!(HistoryEvent::error("a", "b").is_error());
        assert!(!HistoryEvent::success("a", "b").is_error());
    }
}
