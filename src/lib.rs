//! Shared fixtures for the dashrev workspace tests
//!
//! [`MockBackend`] serves a server-side revision history newest first, records
//! every call, and can fail or hold back individual operations so tests can
//! force responses to arrive out of order.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use dashrev_history::{
    DiffFormat, DiffPayload, DocumentRef, HistoryConfig, HistoryController, HistoryError,
    Operation, PageCursor, RecordingEventPublisher, RestoredDocument, Result, Revision,
    RevisionBackend,
};
use serde_json::json;
use tokio::sync::Semaphore;

/// A recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    FetchRevisions {
        document_id: Option<i64>,
        cursor: PageCursor,
    },
    FetchDiff {
        document_id: Option<i64>,
        original: u32,
        new: u32,
        format: DiffFormat,
    },
    Restore {
        document_id: Option<i64>,
        version: u32,
    },
}

impl Call {
    /// Operation this call belongs to
    pub fn operation(&self) -> Operation {
        match self {
            Call::FetchRevisions { .. } => Operation::FetchRevisions,
            Call::FetchDiff { .. } => Operation::FetchDiff,
            Call::Restore { .. } => Operation::Restore,
        }
    }
}

/// Build a revision the way the server lists it
pub fn revision(id: i64, version: u32) -> Revision {
    Revision {
        id,
        document_id: 1,
        version,
        parent_version: version.saturating_sub(1),
        created_at: Utc
            .with_ymd_and_hms(2017, 2, 22, 17, 43, 1)
            .single()
            .unwrap_or_else(Utc::now),
        created_by: "admin".to_string(),
        message: String::new(),
        restored_from: None,
        checked: false,
    }
}

/// In-memory revision server
#[derive(Default)]
pub struct MockBackend {
    history: RwLock<Vec<Revision>>,
    calls: RwLock<Vec<Call>>,
    failing: RwLock<Vec<Operation>>,
    empty_restore: RwLock<bool>,
    gates: RwLock<Vec<(Operation, Arc<Semaphore>)>>,
}

impl MockBackend {
    /// Server holding the given revisions
    pub fn with_revisions(revisions: Vec<Revision>) -> Self {
        let backend = Self::default();
        backend.set_history(revisions);
        backend
    }

    /// Versions 4, 5 and 6 with ids 1 to 3
    pub fn three_versions() -> Self {
        Self::with_revisions(vec![revision(1, 4), revision(2, 5), revision(3, 6)])
    }

    /// Complete history from version 1 up to `head`
    pub fn linear(head: u32) -> Self {
        Self::with_revisions((1..=head).map(|v| revision(v as i64, v)).collect())
    }

    /// Replace the server-side history
    pub fn set_history(&self, mut revisions: Vec<Revision>) {
        revisions.sort_by(|a, b| b.version.cmp(&a.version));
        if let Ok(mut history) = self.history.write() {
            *history = revisions;
        }
    }

    /// Make every later call of `operation` fail with a network error
    pub fn fail(&self, operation: Operation) {
        if let Ok(mut failing) = self.failing.write() {
            failing.push(operation);
        }
    }

    /// Let `operation` succeed again
    pub fn recover(&self, operation: Operation) {
        if let Ok(mut failing) = self.failing.write() {
            failing.retain(|op| *op != operation);
        }
    }

    /// Answer restores with an empty result
    pub fn empty_restores(&self) {
        if let Ok(mut empty) = self.empty_restore.write() {
            *empty = true;
        }
    }

    /// Hold every later call of `operation` until the returned gate gets a permit
    pub fn hold(&self, operation: Operation) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        if let Ok(mut gates) = self.gates.write() {
            gates.retain(|(op, _)| *op != operation);
            gates.push((operation, Arc::clone(&gate)));
        }
        gate
    }

    /// Stop holding new calls of `operation`; already held calls stay held
    pub fn open(&self, operation: Operation) {
        if let Ok(mut gates) = self.gates.write() {
            gates.retain(|(op, _)| *op != operation);
        }
    }

    /// Every call so far
    pub fn calls(&self) -> Vec<Call> {
        self.calls.read().map(|c| c.clone()).unwrap_or_default()
    }

    /// Number of calls of one operation
    pub fn call_count(&self, operation: Operation) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.operation() == operation)
            .count()
    }

    /// Yield until `count` calls of `operation` have been made
    pub async fn wait_for_calls(&self, operation: Operation, count: usize) {
        while self.call_count(operation) < count {
            tokio::task::yield_now().await;
        }
    }

    async fn enter(&self, call: Call) -> Result<()> {
        let operation = call.operation();
        if let Ok(mut calls) = self.calls.write() {
            calls.push(call);
        }

        let gate = self.gates.read().ok().and_then(|gates| {
            gates
                .iter()
                .find(|(op, _)| *op == operation)
                .map(|(_, gate)| Arc::clone(gate))
        });
        if let Some(gate) = gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        let failing = self
            .failing
            .read()
            .map(|f| f.contains(&operation))
            .unwrap_or(false);
        if failing {
            return Err(HistoryError::network(operation, format!("{operation} error")));
        }
        Ok(())
    }
}

#[async_trait]
impl RevisionBackend for MockBackend {
    async fn fetch_revisions(
        &self,
        document_id: Option<i64>,
        cursor: &PageCursor,
    ) -> Result<Vec<Revision>> {
        self.enter(Call::FetchRevisions {
            document_id,
            cursor: cursor.clone(),
        })
        .await?;

        let history = self.history.read().map(|h| h.clone()).unwrap_or_default();
        Ok(history
            .into_iter()
            .skip(cursor.start)
            .take(cursor.limit)
            .collect())
    }

    async fn fetch_diff(
        &self,
        document_id: Option<i64>,
        original: u32,
        new: u32,
        format: &DiffFormat,
    ) -> Result<DiffPayload> {
        self.enter(Call::FetchDiff {
            document_id,
            original,
            new,
            format: format.clone(),
        })
        .await?;

        Ok(DiffPayload::from(json!({
            "original": original,
            "new": new,
            "format": format.as_str(),
        })))
    }

    async fn restore(
        &self,
        document_id: Option<i64>,
        version: u32,
    ) -> Result<Option<RestoredDocument>> {
        self.enter(Call::Restore {
            document_id,
            version,
        })
        .await?;

        if self.empty_restore.read().map(|e| *e).unwrap_or(false) {
            return Ok(None);
        }

        let mut history = match self.history.write() {
            Ok(history) => history,
            Err(_) => return Ok(None),
        };
        let (id, new_version) = history
            .first()
            .map(|head| (head.id + 1, head.version + 1))
            .unwrap_or((1, 1));
        let mut restored = revision(id, new_version);
        restored.parent_version = version;
        restored.restored_from = Some(version);
        history.insert(0, restored);

        Ok(Some(RestoredDocument {
            dashboard: json!({ "id": document_id, "version": new_version, "title": "Ops" }),
            meta: json!({ "canSave": true }),
            version: new_version,
        }))
    }
}

/// Controller under test with its collaborators
pub type TestController = HistoryController<MockBackend, RecordingEventPublisher>;

/// Controller for document 1 at `version`, acting as "Carlos"
pub fn controller_with(
    backend: MockBackend,
    version: u32,
    config: HistoryConfig,
) -> (
    Arc<TestController>,
    Arc<MockBackend>,
    Arc<RecordingEventPublisher>,
) {
    let backend = Arc::new(backend);
    let events = Arc::new(RecordingEventPublisher::new());
    let controller = Arc::new(HistoryController::new(
        Arc::clone(&backend),
        Arc::clone(&events),
        DocumentRef::new(1, version),
        "Carlos",
        config,
    ));
    (controller, backend, events)
}

/// Controller over the 4/5/6 fixture with default configuration
pub fn fixture() -> (
    Arc<TestController>,
    Arc<MockBackend>,
    Arc<RecordingEventPublisher>,
) {
    controller_with(MockBackend::three_versions(), 6, HistoryConfig::default())
}
