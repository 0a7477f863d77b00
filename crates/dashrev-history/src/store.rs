//! Retained revision log for one document

use crate::models::{PageCursor, Revision};

/// Paginated revision log, newest first
#[derive(Debug, Clone)]
pub struct RevisionStore {
    revisions: Vec<Revision>,
    cursor: PageCursor,
}

impl RevisionStore {
    /// Create an empty store positioned on the first page
    pub fn new(limit: usize, order_by: impl Into<String>) -> Self {
        Self {
            revisions: Vec::new(),
            cursor: PageCursor::first(limit, order_by),
        }
    }

    /// Loaded revisions, newest first
    pub fn revisions(&self) -> &[Revision] {
        &self.revisions
    }

    /// Number of loaded revisions
    pub fn len(&self) -> usize {
        self.revisions.len()
    }

    /// Whether nothing is loaded
    pub fn is_empty(&self) -> bool {
        self.revisions.is_empty()
    }

    /// Current pagination cursor
    pub fn cursor(&self) -> &PageCursor {
        &self.cursor
    }

    /// Move the cursor to an explicit position
    pub fn set_cursor(&mut self, cursor: PageCursor) {
        self.cursor = cursor;
    }

    /// Rewind the cursor to the first page, keeping limit and ordering
    pub fn rewind(&mut self) {
        self.cursor.start = 0;
    }

    /// Take a fetched page into the log
    ///
    /// Messages are materialized once here. A replacing page is ordered newest
    /// first; an appended page is concatenated as delivered, without dedup.
    pub fn apply_page(&mut self, mut page: Vec<Revision>, append: bool) {
        for revision in &mut page {
            revision.checked = false;
            revision.materialize_message();
        }

        if append {
            self.revisions.extend(page);
        } else {
            page.sort_by(|a, b| b.version.cmp(&a.version));
            self.revisions = page;
        }
    }

    /// Drop every loaded revision
    pub fn clear(&mut self) {
        self.revisions.clear();
    }

    /// True once the root revision (version 1) has been loaded
    pub fn is_last_page(&self) -> bool {
        self.revisions.iter().any(Revision::is_initial)
    }

    /// Whether a revision with this version is loaded
    pub fn contains_version(&self, version: u32) -> bool {
        self.revisions.iter().any(|r| r.version == version)
    }

    /// Loaded revision for a version
    pub fn find(&self, version: u32) -> Option<&Revision> {
        self.revisions.iter().find(|r| r.version == version)
    }

    /// Newest loaded revision
    pub fn head(&self) -> Option<&Revision> {
        self.revisions.first()
    }

    /// Insert a revision in front of the current head
    pub fn prepend(&mut self, revision: Revision) {
        self.revisions.insert(0, revision);
    }

    /// Update the checked flag of the revision with this version
    pub fn set_checked(&mut self, version: u32, checked: bool) {
        for revision in self.revisions.iter_mut().filter(|r| r.version == version) {
            revision.checked = checked;
        }
    }

    /// Clear every checked flag
    pub fn uncheck_all(&mut self) {
        for revision in &mut self.revisions {
            revision.checked = false;
        }
    }
}
