//! Backend port consumed by the controller
//!
//! Implementations perform the actual I/O. Short-circuit behaviour (no
//! request when the document id is absent) belongs to the implementation.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{DiffFormat, DiffPayload, PageCursor, Revision, RestoredDocument};

/// Revision log, diff and restore endpoints for one document store
#[async_trait]
pub trait RevisionBackend: Send + Sync {
    /// Fetch up to `cursor.limit` revisions starting at `cursor.start`
    async fn fetch_revisions(
        &self,
        document_id: Option<i64>,
        cursor: &PageCursor,
    ) -> Result<Vec<Revision>>;

    /// Fetch the diff between two versions in the given format
    async fn fetch_diff(
        &self,
        document_id: Option<i64>,
        original: u32,
        new: u32,
        format: &DiffFormat,
    ) -> Result<DiffPayload>;

    /// Restore the document to `version`, creating a new version
    ///
    /// `Ok(None)` is the empty result returned without contacting the server.
    async fn restore(
        &self,
        document_id: Option<i64>,
        version: u32,
    ) -> Result<Option<RestoredDocument>>;
}
