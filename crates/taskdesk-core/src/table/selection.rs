//! Row selection tracking across paginated views.

use std::collections::HashSet;

/// Set of selected record identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: HashSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Add `id` if absent, remove it if present.
    pub fn toggle_one(&mut self, id: &str) {
        if !self.ids.remove(id) {
            self.ids.insert(id.to_string());
        }
    }

    /// Deselect the page if it is fully selected, otherwise select all of it.
    ///
    /// Selections outside `page_ids` are never touched.
    pub fn toggle_all_on_page<S: AsRef<str>>(&mut self, page_ids: &[S]) {
        if self.all_selected(page_ids) {
            for id in page_ids {
                self.ids.remove(id.as_ref());
            }
        } else {
            self.ids
                .extend(page_ids.iter().map(|id| id.as_ref().to_string()));
        }
    }

    /// True when `page_ids` is non-empty and every id in it is selected.
    pub fn all_selected<S: AsRef<str>>(&self, page_ids: &[S]) -> bool {
        !page_ids.is_empty() && page_ids.iter().all(|id| self.ids.contains(id.as_ref()))
    }

    /// True when some but not all of `page_ids` are selected.
    pub fn partially_selected<S: AsRef<str>>(&self, page_ids: &[S]) -> bool {
        let selected = page_ids
            .iter()
            .filter(|id| self.ids.contains(id.as_ref()))
            .count();
        selected > 0 && selected < page_ids.len()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Drop every id for which `exists` returns false. Returns how many were pruned.
    pub fn retain_existing(&mut self, exists: impl Fn(&str) -> bool) -> usize {
        let before = self.ids.len();
        self.ids.retain(|id| exists(id));
        before - self.ids.len()
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.ids.remove(id)
    }

    /// Selected ids in sorted order.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.ids.iter().cloned().collect();
        ids.sort();
        ids
    }
}
