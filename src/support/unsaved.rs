// Unsaved-changes guard for editable forms (dirty-check + optional draft auto-save)

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::prefs_repo::DraftStore;

/// Tracks a form value against its last-saved snapshot.
/// Dirtiness is structural (`PartialEq`), so an equal copy is not a change.
#[derive(Debug, Clone)]
pub struct UnsavedChangesGuard<T> {
    saved: T,
    current: T,
}

impl<T: Clone + PartialEq> UnsavedChangesGuard<T> {
    pub fn new(initial: T) -> Self {
        Self {
            saved: initial.clone(),
            current: initial,
        }
    }

    pub fn current(&self) -> &T {
        &self.current
    }

    pub fn saved(&self) -> &T {
        &self.saved
    }

    pub fn update(&mut self, value: T) {
        self.current = value;
    }

    pub fn is_dirty(&self) -> bool {
        self.current != self.saved
    }

    /// Current value becomes the new baseline.
    pub fn mark_saved(&mut self) {
        self.saved = self.current.clone();
    }

    /// Throws away edits.
    pub fn revert(&mut self) {
        self.current = self.saved.clone();
    }

    /// Returns whether navigation may proceed; `confirm` is only asked when dirty.
    pub fn confirm_navigation(&self, confirm: impl FnOnce() -> bool) -> bool {
        !self.is_dirty() || confirm()
    }
}

impl<T: Clone + PartialEq + Serialize + DeserializeOwned> UnsavedChangesGuard<T> {
    /// Saves the current value as a draft when dirty. Best effort.
    pub async fn autosave(&self, drafts: &DraftStore, form_id: &str) -> bool {
        if !self.is_dirty() {
            return false;
        }
        drafts.save(form_id, &self.current).await
    }

    /// Picks up a stored draft, if any, as the current (unsaved) value.
    pub async fn restore_draft(&mut self, drafts: &DraftStore, form_id: &str) -> bool {
        match drafts.load::<T>(form_id).await {
            Some(draft) => {
                self.current = draft.data;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Form {
        name: String,
        seeds: Vec<String>,
    }

    fn form(name: &str) -> Form {
        Form {
            name: name.into(),
            seeds: vec!["basil".into()],
        }
    }

    #[test]
    fn equal_copy_is_not_dirty() {
        let mut g = UnsavedChangesGuard::new(form("a"));
        g.update(form("a"));
        assert!(!g.is_dirty());
        assert!(g.confirm_navigation(|| panic!("should not ask")));
    }

    #[test]
    fn dirty_form_asks_before_leaving() {
        let mut g = UnsavedChangesGuard::new(form("a"));
        g.update(form("b"));
        assert!(g.is_dirty());
        assert!(!g.confirm_navigation(|| false));
        assert!(g.confirm_navigation(|| true));
    }

    #[test]
    fn mark_saved_and_revert() {
        let mut g = UnsavedChangesGuard::new(form("a"));
        g.update(form("b"));
        g.mark_saved();
        assert!(!g.is_dirty());
        g.update(form("c"));
        g.revert();
        assert_eq!(g.current(), &form("b"));
    }
}
