//! Command handlers
//!
//! Each command drives one `HistoryController` the way the history panel
//! would: load the log, select, compare or restore.

pub mod diff;
pub mod log;
pub mod restore;

use std::sync::Arc;

use dashrev_history::{
    DocumentRef, HistoryController, HistoryError, PageCursor, Revision, RevisionBackend,
};
use dashrev_http::HttpRevisionBackend;
use tracing::debug;

use crate::error::{CliError, CliResult};
use crate::output::{OutputStyle, TerminalPublisher};
use crate::settings::CliSettings;

/// Controller type the CLI hosts
pub type Controller = HistoryController<HttpRevisionBackend, TerminalPublisher>;

/// A controller attached to one dashboard, plus its terminal publisher
pub struct Session {
    pub controller: Controller,
    pub events: Arc<TerminalPublisher>,
    pub style: OutputStyle,
}

impl Session {
    /// Build the backend and controller for `dashboard`
    ///
    /// Without an explicit current version the newest saved version is used.
    pub async fn connect(
        settings: &CliSettings,
        dashboard: i64,
        current_version: Option<u32>,
    ) -> CliResult<Self> {
        let backend = Arc::new(HttpRevisionBackend::new(settings.http.clone())?);

        let version = match current_version {
            Some(version) => version,
            None => {
                let probe = PageCursor::first(1, settings.history.order_by.clone());
                backend
                    .fetch_revisions(Some(dashboard), &probe)
                    .await
                    .map_err(|e| CliError::Unreachable(e.detail()))?
                    .iter()
                    .map(|r| r.version)
                    .max()
                    .unwrap_or_default()
            }
        };
        debug!(dashboard, version, "Attaching history controller");

        let style = OutputStyle::default();
        let events = Arc::new(TerminalPublisher::new(style));
        let controller = HistoryController::new(
            backend,
            Arc::clone(&events),
            DocumentRef::new(dashboard, version),
            current_user(),
            settings.history.clone(),
        );

        Ok(Self {
            controller,
            events,
            style,
        })
    }

    /// Load pages until `version` is present or the log is exhausted
    pub async fn ensure_loaded(&self, version: u32) -> CliResult<Revision> {
        loop {
            if let Some(revision) = self.controller.revision(version) {
                return Ok(revision);
            }
            let loaded = self.controller.revisions().len();
            // an empty page means the server has nothing older
            if !self.controller.load_more().await? || self.controller.revisions().len() == loaded {
                return Err(HistoryError::RevisionNotFound(version).into());
            }
        }
    }

    /// Render a revision's timestamp in the configured zone
    pub fn date_of(&self, revision: &Revision) -> String {
        self.controller.format_date(revision.created_at, false)
    }
}

fn current_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "dashrev".to_string())
}
