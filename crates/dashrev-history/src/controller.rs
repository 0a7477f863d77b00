//! History panel controller
//!
//! Composes the revision store, selection, diff cache, mode machine and
//! restore workflow behind one `Send + Sync` facade. State sits behind a
//! synchronous lock that is released before every backend call; responses are
//! matched against per-slot generations so a late answer never overwrites
//! newer state.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::config::{HistoryConfig, RestoreStrategy};
use crate::diff_cache::{DiffCache, DiffKey};
use crate::error::{HistoryError, Operation, Result};
use crate::events::{ConfirmAction, EventPublisher, HistoryEvent};
use crate::generation::{Generation, GenerationSlot};
use crate::mode::{Mode, ModeStateMachine, Transition};
use crate::models::{DiffFormat, DiffPayload, DocumentRef, PageCursor, Revision};
use crate::ports::RevisionBackend;
use crate::restore::{synthesize_restored, RestoreState, RestoreWorkflow};
use crate::selection::SelectionManager;
use crate::store::RevisionStore;

const LOG_ERROR_TITLE: &str = "There was an error fetching the revision history";
const DIFF_ERROR_TITLE: &str = "There was an error fetching the diff";
const RESTORE_ERROR_TITLE: &str = "There was an error restoring the dashboard";

struct ControllerState {
    document: DocumentRef,
    store: RevisionStore,
    selection: SelectionManager,
    diffs: DiffCache,
    mode: ModeStateMachine,
    restore: RestoreWorkflow,
    diff_format: DiffFormat,
    active_diff: Option<DiffPayload>,
    appending: bool,
    log_slot: GenerationSlot,
    diff_slot: GenerationSlot,
    restore_slot: GenerationSlot,
}

impl ControllerState {
    fn new(document: DocumentRef, config: &HistoryConfig) -> Self {
        Self {
            document,
            store: RevisionStore::new(config.page_size, config.order_by.clone()),
            selection: SelectionManager::new(config.max_selection),
            diffs: DiffCache::new(),
            mode: ModeStateMachine::new(),
            restore: RestoreWorkflow::new(),
            diff_format: config.default_diff_format.clone(),
            active_diff: None,
            appending: false,
            log_slot: GenerationSlot::new(),
            diff_slot: GenerationSlot::new(),
            restore_slot: GenerationSlot::new(),
        }
    }

    /// Change mode; entering list mode runs the canonical reset
    fn transition_to(&mut self, mode: Mode, default_format: &DiffFormat) -> Transition {
        let transition = self.mode.transition_to(mode);
        if transition.resets() {
            self.selection.clear();
            self.store.uncheck_all();
            self.store.rewind();
            self.diffs.clear();
            self.diff_slot.invalidate();
            self.active_diff = None;
            self.diff_format = default_format.clone();
        }
        transition
    }

    fn loading(&self) -> bool {
        self.log_slot.is_pending() || self.diff_slot.is_pending() || self.restore_slot.is_pending()
    }
}

enum DiffPlan {
    Cached(DiffPayload),
    Fetch {
        ticket: Generation,
        key: DiffKey,
        document_id: Option<i64>,
    },
}

/// Revision history and comparison controller for one document
pub struct HistoryController<B, E>
where
    B: RevisionBackend + ?Sized,
    E: EventPublisher + ?Sized,
{
    backend: Arc<B>,
    events: Arc<E>,
    config: HistoryConfig,
    user: String,
    state: Mutex<ControllerState>,
}

impl<B, E> HistoryController<B, E>
where
    B: RevisionBackend + ?Sized,
    E: EventPublisher + ?Sized,
{
    /// Create a controller attached to `document`, acting as `user`
    ///
    /// Nothing is fetched until `reset_from_source` is called.
    pub fn new(
        backend: Arc<B>,
        events: Arc<E>,
        document: DocumentRef,
        user: impl Into<String>,
        config: HistoryConfig,
    ) -> Self {
        let state = ControllerState::new(document, &config);
        Self {
            backend,
            events,
            config,
            user: user.into(),
            state: Mutex::new(state),
        }
    }

    /// Configuration in use
    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Revision log
    // ------------------------------------------------------------------

    /// Fetch a page of the log, replacing or appending to the loaded revisions
    pub async fn load_page(
        &self,
        start: usize,
        limit: usize,
        order_by: impl Into<String>,
        append: bool,
    ) -> Result<()> {
        let cursor = PageCursor {
            start,
            limit,
            order_by: order_by.into(),
        };
        let (ticket, document_id) = {
            let mut state = self.state.lock();
            state.appending = append;
            (state.log_slot.issue(), state.document.backend_id())
        };

        debug!(?document_id, start, limit, append, "Fetching revision page");
        let result = self.backend.fetch_revisions(document_id, &cursor).await;

        let outcome = {
            let mut guard = self.state.lock();
            let state = &mut *guard;
            if !state.log_slot.complete(ticket) {
                warn!(start, append, "Discarding stale revision page");
                return Err(HistoryError::Superseded(Operation::FetchRevisions));
            }
            state.appending = false;
            // The cursor only moves once a page is in, so a failed page is retried
            result.map(|page| {
                debug!(count = page.len(), "Revision page loaded");
                state.store.apply_page(page, append);
                state.store.set_cursor(cursor);
                for version in state.selection.selected() {
                    state.store.set_checked(*version, true);
                }
            })
        };

        if let Err(err) = &outcome {
            self.notify_failure(LOG_ERROR_TITLE, err).await;
        }
        outcome
    }

    /// Load the page after the current cursor in append mode
    ///
    /// Returns false without a request when the root revision is already
    /// loaded or a log fetch is outstanding.
    pub async fn load_more(&self) -> Result<bool> {
        let next = {
            let state = self.state.lock();
            if state.store.is_last_page() || state.log_slot.is_pending() {
                return Ok(false);
            }
            state.store.cursor().next()
        };
        self.load_page(next.start, next.limit, next.order_by, true)
            .await
            .map(|_| true)
    }

    /// Drop the loaded log, fetch the first page and reset to list mode
    pub async fn reset_from_source(&self) -> Result<()> {
        let cursor = {
            let mut state = self.state.lock();
            state.store.clear();
            state.store.rewind();
            state.store.cursor().clone()
        };

        let result = self
            .load_page(0, cursor.limit, cursor.order_by, false)
            .await;
        if !matches!(result, Err(HistoryError::Superseded(_))) {
            self.show_list().await;
        }
        result
    }

    /// True once the root revision (version 1) is loaded
    pub fn is_last_page(&self) -> bool {
        self.state.lock().store.is_last_page()
    }

    /// Snapshot of the loaded revisions, newest first
    pub fn revisions(&self) -> Vec<Revision> {
        self.state.lock().store.revisions().to_vec()
    }

    /// Loaded revision for a version
    pub fn revision(&self, version: u32) -> Option<Revision> {
        self.state.lock().store.find(version).cloned()
    }

    /// Current pagination cursor
    pub fn cursor(&self) -> PageCursor {
        self.state.lock().store.cursor().clone()
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Mark or unmark a version for comparison
    ///
    /// Returns false when the selection is full; callers consult
    /// `is_disabled` first.
    pub fn toggle(&self, version: u32, checked: bool) -> bool {
        let mut state = self.state.lock();
        let applied = state.selection.toggle(version, checked);
        if applied {
            state.store.set_checked(version, checked);
        }
        applied
    }

    /// Whether an item's checkbox should be disabled
    pub fn is_disabled(&self, already_checked: bool) -> bool {
        let state = self.state.lock();
        state.selection.is_disabled(already_checked, state.store.len())
    }

    /// Whether the selection can be diffed against the loaded revisions
    pub fn is_comparable(&self) -> bool {
        let state = self.state.lock();
        state.selection.is_comparable(&state.store)
    }

    /// Selected versions, ascending
    pub fn selected(&self) -> Vec<u32> {
        self.state.lock().selection.selected().to_vec()
    }

    /// Whether the newer selected version is the document's current version
    pub fn is_original_current(&self) -> bool {
        let state = self.state.lock();
        state
            .selection
            .pair()
            .is_some_and(|(_, new)| new == state.document.version)
    }

    // ------------------------------------------------------------------
    // Mode and diffs
    // ------------------------------------------------------------------

    /// Current mode
    pub fn mode(&self) -> Mode {
        self.state.lock().mode.mode()
    }

    /// Leave comparison and return to the log
    pub async fn show_list(&self) {
        let transition = {
            let mut state = self.state.lock();
            state.transition_to(Mode::List, &self.config.default_diff_format)
        };
        self.publish_transition(transition).await;
    }

    /// Diff the selected pair in `format`, entering compare mode
    ///
    /// A cached payload for the same pair and format is returned without a
    /// request. A failed fetch rolls back to list mode.
    pub async fn get_diff(&self, format: impl Into<DiffFormat>) -> Result<DiffPayload> {
        let format = format.into();
        let (plan, transition) = {
            let mut guard = self.state.lock();
            let state = &mut *guard;
            if !state.selection.is_comparable(&state.store) {
                debug!(selected = ?state.selection.selected(), "Selection is not comparable");
                return Err(HistoryError::NotComparable(state.selection.selected().to_vec()));
            }
            let (original, new) = state
                .selection
                .pair()
                .ok_or_else(|| HistoryError::NotComparable(state.selection.selected().to_vec()))?;

            let key = DiffKey::new(original, new, format.clone());
            state.diff_format = format.clone();
            let transition = state.transition_to(Mode::Compare, &self.config.default_diff_format);

            let plan = match state.diffs.get(&key).cloned() {
                Some(payload) => {
                    debug!(original, new, %format, "Diff served from cache");
                    state.active_diff = Some(payload.clone());
                    DiffPlan::Cached(payload)
                }
                None => DiffPlan::Fetch {
                    ticket: state.diff_slot.issue(),
                    key,
                    document_id: state.document.backend_id(),
                },
            };
            (plan, transition)
        };
        self.publish_transition(transition).await;

        let (ticket, key, document_id) = match plan {
            DiffPlan::Cached(payload) => return Ok(payload),
            DiffPlan::Fetch {
                ticket,
                key,
                document_id,
            } => (ticket, key, document_id),
        };

        debug!(original = key.original, new = key.new, format = %key.format, "Fetching diff");
        let result = self
            .backend
            .fetch_diff(document_id, key.original, key.new, &key.format)
            .await;

        let (outcome, rollback) = {
            let mut guard = self.state.lock();
            let state = &mut *guard;
            if !state.diff_slot.complete(ticket) {
                warn!(original = key.original, new = key.new, "Discarding stale diff");
                return Err(HistoryError::Superseded(Operation::FetchDiff));
            }
            match result {
                Ok(payload) => {
                    if state.selection.pair() == Some((key.original, key.new)) {
                        state.active_diff = Some(payload.clone());
                    }
                    state.diffs.insert(key, payload.clone());
                    (Ok(payload), None)
                }
                Err(err) => {
                    let rollback =
                        state.transition_to(Mode::List, &self.config.default_diff_format);
                    (Err(err), Some(rollback))
                }
            }
        };

        if let Some(rollback) = rollback {
            self.publish_transition(rollback).await;
        }
        if let Err(err) = &outcome {
            self.notify_failure(DIFF_ERROR_TITLE, err).await;
        }
        outcome
    }

    /// Active diff format
    pub fn diff_format(&self) -> DiffFormat {
        self.state.lock().diff_format.clone()
    }

    /// Diff currently shown in compare mode
    pub fn active_diff(&self) -> Option<DiffPayload> {
        self.state.lock().active_diff.clone()
    }

    /// Number of cached diff payloads
    pub fn cached_diff_count(&self) -> usize {
        self.state.lock().diffs.len()
    }

    // ------------------------------------------------------------------
    // Restore
    // ------------------------------------------------------------------

    /// Ask the host to confirm a restore to `version`
    pub async fn request_restore(&self, version: u32) -> Result<()> {
        let prompt = self.state.lock().restore.request(version)?;
        self.events
            .publish(HistoryEvent::ConfirmRequested(prompt))
            .await;
        Ok(())
    }

    /// Dismiss a pending restore confirmation
    pub fn cancel_restore(&self) -> bool {
        self.state.lock().restore.cancel()
    }

    /// Run the action attached to a confirmed prompt
    pub async fn confirm(&self, action: ConfirmAction) -> Result<()> {
        match action {
            ConfirmAction::Restore { version } => self.execute_restore(version).await,
        }
    }

    /// Restore the document to `version`
    ///
    /// On success the log gains the restored head, the controller resets to
    /// list mode and the host receives the new document. On failure nothing
    /// changes besides the error notification.
    pub async fn execute_restore(&self, version: u32) -> Result<()> {
        let (ticket, document_id) = {
            let mut state = self.state.lock();
            state.restore.begin(version)?;
            (state.restore_slot.issue(), state.document.backend_id())
        };

        info!(?document_id, version, "Restoring document");
        let result = self.backend.restore(document_id, version).await;

        let outcome = {
            let mut guard = self.state.lock();
            let state = &mut *guard;
            if !state.restore_slot.complete(ticket) {
                warn!(version, "Discarding stale restore response");
                return Err(HistoryError::Superseded(Operation::Restore));
            }
            state.restore.finish();

            match result {
                Ok(Some(document)) => {
                    let mut refetch = self.config.restore_strategy == RestoreStrategy::Refetch;
                    if !refetch {
                        match state.store.head().cloned() {
                            Some(head) => {
                                let owner = document_id
                                    .or_else(|| document.document_id())
                                    .unwrap_or(head.document_id);
                                state.store.prepend(synthesize_restored(
                                    &head,
                                    owner,
                                    version,
                                    &self.user,
                                    Utc::now(),
                                ));
                            }
                            None => refetch = true,
                        }
                    }

                    let transition =
                        state.transition_to(Mode::List, &self.config.default_diff_format);
                    state.document.version = document.version;
                    if let Some(id) = document.document_id() {
                        state.document.id = Some(id);
                    }
                    Ok((document, transition, refetch))
                }
                Ok(None) => Err(HistoryError::EmptyResponse(Operation::Restore)),
                Err(err) => Err(err),
            }
        };

        match outcome {
            Ok((document, transition, refetch)) => {
                info!(version, new_version = document.version, "Document restored");
                self.publish_transition(transition).await;
                self.events
                    .publish(HistoryEvent::DocumentRestored {
                        document,
                        restored_from: version,
                    })
                    .await;
                if refetch {
                    if let Err(err) = self.reset_from_source().await {
                        warn!(error = %err, "Reloading history after restore failed");
                    }
                }
                Ok(())
            }
            Err(err) => {
                self.notify_failure(RESTORE_ERROR_TITLE, &err).await;
                Err(err)
            }
        }
    }

    /// Current restore workflow state
    pub fn restore_state(&self) -> RestoreState {
        self.state.lock().restore.state()
    }

    // ------------------------------------------------------------------
    // Document and lifecycle
    // ------------------------------------------------------------------

    /// Handle the host's "document saved" push: bump the version and reload
    pub async fn on_document_saved(&self) -> Result<()> {
        let version = {
            let mut state = self.state.lock();
            state.document.version += 1;
            state.document.version
        };
        info!(version, "Document saved, reloading history");
        self.events
            .publish(HistoryEvent::success(
                "Dashboard saved",
                format!("Version {version} saved in changelog"),
            ))
            .await;
        self.reset_from_source().await
    }

    /// Tracked copy of the document
    pub fn document(&self) -> DocumentRef {
        self.state.lock().document.clone()
    }

    /// Whether any request is outstanding
    pub fn is_loading(&self) -> bool {
        self.state.lock().loading()
    }

    /// Whether an append page fetch is outstanding
    pub fn is_appending(&self) -> bool {
        self.state.lock().appending
    }

    /// Render a revision timestamp in the document's display zone
    pub fn format_date(&self, ts: DateTime<Utc>, omit_time: bool) -> String {
        let timezone = self
            .state
            .lock()
            .document
            .timezone
            .unwrap_or(self.config.timezone);
        timezone.format(ts, omit_time)
    }

    /// Tear the panel down: drop all state and ignore outstanding responses
    pub fn detach(&self) {
        let mut state = self.state.lock();
        let document = state.document.clone();
        let mut log_slot = std::mem::take(&mut state.log_slot);
        let mut diff_slot = std::mem::take(&mut state.diff_slot);
        let mut restore_slot = std::mem::take(&mut state.restore_slot);
        log_slot.invalidate();
        diff_slot.invalidate();
        restore_slot.invalidate();

        *state = ControllerState::new(document, &self.config);
        state.log_slot = log_slot;
        state.diff_slot = diff_slot;
        state.restore_slot = restore_slot;
        debug!("History controller detached");
    }

    async fn publish_transition(&self, transition: Transition) {
        if transition.changed() {
            self.events
                .publish(HistoryEvent::ModeChanged {
                    mode: transition.to,
                })
                .await;
        }
    }

    async fn notify_failure(&self, title: &str, err: &HistoryError) {
        if !err.is_network_failure() {
            return;
        }
        error!(error = %err, "{title}");
        self.events
            .publish(HistoryEvent::error(title, err.detail()))
            .await;
    }
}
