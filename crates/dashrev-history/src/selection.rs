//! Versions marked for comparison

use crate::store::RevisionStore;

/// Ordered set of at most `max` selected versions, ascending
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionManager {
    selected: Vec<u32>,
    max: usize,
}

impl SelectionManager {
    /// Create an empty selection with the given capacity
    pub fn new(max: usize) -> Self {
        Self {
            selected: Vec::with_capacity(max),
            max,
        }
    }

    /// Selected versions, ascending
    pub fn selected(&self) -> &[u32] {
        &self.selected
    }

    /// Selection capacity
    pub fn max(&self) -> usize {
        self.max
    }

    /// Number of selected versions
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Whether nothing is selected
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Whether the selection is at capacity
    pub fn is_full(&self) -> bool {
        self.selected.len() >= self.max
    }

    /// Whether a version is selected
    pub fn contains(&self, version: u32) -> bool {
        self.selected.binary_search(&version).is_ok()
    }

    /// Add or remove a version
    ///
    /// Returns false when the change was refused because the selection is full.
    pub fn toggle(&mut self, version: u32, checked: bool) -> bool {
        match (checked, self.selected.binary_search(&version)) {
            (true, Ok(_)) => true,
            (true, Err(_)) if self.is_full() => false,
            (true, Err(pos)) => {
                self.selected.insert(pos, version);
                true
            }
            (false, Ok(pos)) => {
                self.selected.remove(pos);
                true
            }
            (false, Err(_)) => true,
        }
    }

    /// Whether an item's checkbox should be disabled
    ///
    /// An already checked item is never disabled. Others are disabled when the
    /// selection is full or when fewer than two revisions are loaded.
    pub fn is_disabled(&self, already_checked: bool, loaded: usize) -> bool {
        if already_checked {
            return false;
        }
        self.is_full() || loaded <= 1
    }

    /// True iff exactly `max` versions are selected and all are loaded
    pub fn is_comparable(&self, store: &RevisionStore) -> bool {
        self.selected.len() == self.max
            && self.selected.iter().all(|v| store.contains_version(*v))
    }

    /// `(original, new)` pair, the oldest and newest selected versions
    pub fn pair(&self) -> Option<(u32, u32)> {
        match (self.selected.first(), self.selected.last()) {
            (Some(first), Some(last)) if self.selected.len() >= 2 => Some((*first, *last)),
            _ => None,
        }
    }

    /// Deselect everything
    pub fn clear(&mut self) {
        self.selected.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Revision;
    use chrono::Utc;

    fn store_with(versions: &[u32]) -> RevisionStore {
        let mut store = RevisionStore::new(10, "version");
        store.apply_page(
            versions
                .iter()
                .map(|v| Revision {
                    id: *v as i64,
                    document_id: 1,
                    version: *v,
                    parent_version: v - 1,
                    created_at: Utc::now(),
                    created_by: String::new(),
                    message: String::new(),
                    restored_from: None,
                    checked: false,
                })
                .collect(),
            false,
        );
        store
    }

    #[test]
    fn test_toggle_keeps_ascending_order() {
        let mut selection = SelectionManager::new(2);
        assert!(selection.toggle(6, true));
        assert!(selection.toggle(4, true));
        assert_eq!(selection.selected(), &[4, 6]);
    }

    #[test]
    fn test_toggle_refuses_beyond_capacity() {
        let mut selection = SelectionManager::new(2);
        selection.toggle(4, true);
        selection.toggle(5, true);
        assert!(!selection.toggle(6, true));
        assert_eq!(selection.selected(), &[4, 5]);
    }

    #[test]
    fn test_toggle_off_removes() {
        let mut selection = SelectionManager::new(2);
        selection.toggle(4, true);
        selection.toggle(5, true);
        selection.toggle(4, false);
        assert_eq!(selection.selected(), &[5]);
        assert!(selection.toggle(9, false));
    }

    #[test]
    fn test_is_disabled() {
        let mut selection = SelectionManager::new(2);
        assert!(!selection.is_disabled(false, 3));
        selection.toggle(4, true);
        selection.toggle(5, true);
        assert!(selection.is_disabled(false, 3));
        assert!(!selection.is_disabled(true, 3));
    }

    #[test]
    fn test_is_disabled_with_single_revision() {
        let selection = SelectionManager::new(2);
        assert!(selection.is_disabled(false, 1));
        assert!(!selection.is_disabled(true, 1));
    }

    #[test]
    fn test_is_comparable_against_loaded_versions() {
        let store = store_with(&[4, 5, 6]);
        let mut selection = SelectionManager::new(2);
        assert!(!selection.is_comparable(&store));

        selection.toggle(6, true);
        assert!(!selection.is_comparable(&store));

        selection.toggle(4, true);
        assert!(selection.is_comparable(&store));

        let mut stale = SelectionManager::new(2);
        stale.toggle(2, true);
        stale.toggle(1, true);
        assert!(!stale.is_comparable(&store));
    }

    #[test]
    fn test_pair_is_min_max() {
        let mut selection = SelectionManager::new(2);
        assert_eq!(selection.pair(), None);
        selection.toggle(6, true);
        assert_eq!(selection.pair(), None);
        selection.toggle(4, true);
        assert_eq!(selection.pair(), Some((4, 6)));
    }
}
