//! Terminal rendering and the event publisher backing it

use std::io::IsTerminal;

use async_trait::async_trait;
use colored::Colorize;
use dashrev_history::{
    ConfirmPrompt, DiffPayload, EventPublisher, HistoryEvent, NotificationKind, Revision,
};
use parking_lot::Mutex;
use tracing::debug;

/// Output styling configuration
#[derive(Debug, Clone, Copy)]
pub struct OutputStyle {
    pub use_colors: bool,
}

impl Default for OutputStyle {
    fn default() -> Self {
        Self {
            use_colors: std::io::stdout().is_terminal(),
        }
    }
}

impl OutputStyle {
    /// Plain output
    pub fn plain() -> Self {
        Self { use_colors: false }
    }

    /// Format success message
    pub fn success(&self, msg: &str) -> String {
        if self.use_colors {
            format!("{} {}", "✓".green().bold(), msg)
        } else {
            format!("✓ {msg}")
        }
    }

    /// Format error message
    pub fn error(&self, msg: &str) -> String {
        if self.use_colors {
            format!("{} {}", "✗".red().bold(), msg)
        } else {
            format!("✗ {msg}")
        }
    }

    /// Format warning message
    pub fn warning(&self, msg: &str) -> String {
        if self.use_colors {
            format!("{} {}", "⚠".yellow(), msg)
        } else {
            format!("⚠ {msg}")
        }
    }

    /// Format info message
    pub fn info(&self, msg: &str) -> String {
        if self.use_colors {
            format!("{} {}", "ℹ".blue(), msg)
        } else {
            format!("ℹ {msg}")
        }
    }

    fn heading(&self, text: &str) -> String {
        if self.use_colors {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }
}

/// Print an error to stderr
pub fn print_error(msg: &str) {
    eprintln!("{}", OutputStyle::default().error(msg));
}

/// Render the revision log as a table, newest first
pub fn render_revisions(
    style: &OutputStyle,
    revisions: &[Revision],
    current_version: u32,
    format_date: impl Fn(&Revision) -> String,
) -> String {
    let mut out = style.heading(&format!(
        "{:>8}  {:<19}  {:<16}  {}",
        "VERSION", "DATE", "UPDATED BY", "NOTES"
    ));
    out.push('\n');
    for revision in revisions {
        let marker = if revision.version == current_version {
            " (Latest)"
        } else {
            ""
        };
        out.push_str(&format!(
            "{:>8}  {:<19}  {:<16}  {}{}\n",
            revision.version,
            format_date(revision),
            revision.created_by,
            revision.message,
            marker
        ));
    }
    out
}

/// Render a diff payload: markup as-is, JSON pretty-printed
pub fn render_diff(payload: &DiffPayload) -> String {
    match payload.as_text() {
        Some(text) => text.to_string(),
        None => serde_json::to_string_pretty(&payload.0).unwrap_or_else(|_| payload.0.to_string()),
    }
}

/// Publisher that prints notifications and parks confirmation prompts
///
/// Commands pick the parked prompt up with `take_prompt` and answer it on the
/// terminal.
#[derive(Debug, Default)]
pub struct TerminalPublisher {
    style: OutputStyle,
    prompt: Mutex<Option<ConfirmPrompt>>,
}

impl TerminalPublisher {
    /// Create a publisher with the given style
    pub fn new(style: OutputStyle) -> Self {
        Self {
            style,
            prompt: Mutex::new(None),
        }
    }

    /// Take the last prompt the controller asked for
    pub fn take_prompt(&self) -> Option<ConfirmPrompt> {
        self.prompt.lock().take()
    }

    fn render(&self, event: &HistoryEvent) -> Option<String> {
        match event {
            HistoryEvent::Notification {
                kind,
                title,
                message,
            } => {
                let text = format!("{title}: {message}");
                Some(match kind {
                    NotificationKind::Success => self.style.success(&text),
                    NotificationKind::Warning => self.style.warning(&text),
                    NotificationKind::Error => self.style.error(&text),
                })
            }
            HistoryEvent::DocumentRestored {
                document,
                restored_from,
            } => Some(self.style.success(&format!(
                "Dashboard restored from version {restored_from}, now at version {}",
                document.version
            ))),
            HistoryEvent::ConfirmRequested(_) | HistoryEvent::ModeChanged { .. } => None,
        }
    }
}

#[async_trait]
impl EventPublisher for TerminalPublisher {
    async fn publish(&self, event: HistoryEvent) {
        debug!(event = event.event_type(), "History event");
        if let Some(line) = self.render(&event) {
            if event.is_error() {
                eprintln!("{line}");
            } else {
                println!("{line}");
            }
        }
        if let HistoryEvent::ConfirmRequested(prompt) = event {
            *self.prompt.lock() = Some(prompt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn revision(version: u32, message: &str) -> Revision {
        Revision {
            id: version as i64,
            document_id: 1,
            version,
            parent_version: version - 1,
            created_at: Utc.with_ymd_and_hms(2017, 2, 22, 17, 43, 1).unwrap(),
            created_by: "admin".to_string(),
            message: message.to_string(),
            restored_from: None,
            checked: false,
        }
    }

    #[test]
    fn test_render_revisions_marks_latest() {
        let table = render_revisions(
            &OutputStyle::plain(),
            &[revision(6, "Saved"), revision(5, "Saved")],
            6,
            |r| r.created_at.format("%Y-%m-%d").to_string(),
        );
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("Saved (Latest)"));
        assert!(!lines[2].contains("Latest"));
        assert!(lines[1].contains("2017-02-22"));
    }

    #[test]
    fn test_render_diff_prefers_text() {
        assert_eq!(
            render_diff(&DiffPayload::from("<p>changed</p>".to_string())),
            "<p>changed</p>"
        );
        let json = render_diff(&DiffPayload::from(serde_json::json!({ "a": 1 })));
        assert!(json.contains("\"a\": 1"));
    }

    #[tokio::test]
    async fn test_prompt_is_parked() {
        let publisher = TerminalPublisher::new(OutputStyle::plain());
        publisher
            .publish(HistoryEvent::ConfirmRequested(ConfirmPrompt::restore(4)))
            .await;

        let prompt = publisher.take_prompt().unwrap();
        assert_eq!(prompt.yes_text, "Yes, restore to version 4");
        assert!(publisher.take_prompt().is_none());
    }

    #[test]
    fn test_error_notification_rendering() {
        let publisher = TerminalPublisher::new(OutputStyle::plain());
        let line = publisher
            .render(&HistoryEvent::error(
                "There was an error fetching the diff",
                "DiffError",
            ))
            .unwrap();
        assert_eq!(line, "✗ There was an error fetching the diff: DiffError");
    }
}
