//! Column visibility.
//!
//! The first column of any descriptor list is always shown, whatever the map says.

use std::collections::BTreeMap;

use super::value::ColumnDescriptor;

/// Field key to visibility. Keys absent from the map are visible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnVisibility {
    visibility: BTreeMap<String, bool>,
}

impl ColumnVisibility {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(visibility: BTreeMap<String, bool>) -> Self {
        Self { visibility }
    }

    pub fn is_visible(&self, key: &str) -> bool {
        self.visibility.get(key).copied().unwrap_or(true)
    }

    /// Flip the visibility of `key`, treating an unset key as visible.
    pub fn toggle(&mut self, key: &str) {
        let visible = self.is_visible(key);
        self.visibility.insert(key.to_string(), !visible);
    }

    pub fn set(&mut self, key: &str, visible: bool) {
        self.visibility.insert(key.to_string(), visible);
    }

    /// Make every column visible again.
    pub fn show_all(&mut self) {
        self.visibility.clear();
    }

    pub fn as_map(&self) -> &BTreeMap<String, bool> {
        &self.visibility
    }

    /// Column 0, followed by every other column not explicitly hidden.
    pub fn visible_columns<'c, R>(
        &self,
        columns: &'c [ColumnDescriptor<R>],
    ) -> Vec<&'c ColumnDescriptor<R>> {
        let Some((first, rest)) = columns.split_first() else {
            return Vec::new();
        };
        std::iter::once(first)
            .chain(rest.iter().filter(|column| self.is_visible(&column.key)))
            .collect()
    }

    /// Number of columns, excluding column 0, currently hidden.
    pub fn hidden_count<R>(&self, columns: &[ColumnDescriptor<R>]) -> usize {
        columns
            .iter()
            .skip(1)
            .filter(|column| !self.is_visible(&column.key))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::value::JsonRecord;

    fn columns() -> Vec<ColumnDescriptor<JsonRecord>> {
        vec![
            ColumnDescriptor::new("id", "ID"),
            ColumnDescriptor::new("title", "Title"),
            ColumnDescriptor::new("status", "Status"),
        ]
    }

    fn keys(columns: &[&ColumnDescriptor<JsonRecord>]) -> Vec<String> {
        columns.iter().map(|c| c.key.clone()).collect()
    }

    #[test]
    fn test_unset_keys_default_visible() {
        let visibility = ColumnVisibility::new();
        assert!(visibility.is_visible("anything"));
        assert_eq!(keys(&visibility.visible_columns(&columns())), vec!["id", "title", "status"]);
    }

    #[test]
    fn test_toggle_flips() {
        let mut visibility = ColumnVisibility::new();
        visibility.toggle("status");
        assert!(!visibility.is_visible("status"));
        visibility.toggle("status");
        assert!(visibility.is_visible("status"));
    }

    #[test]
    fn test_first_column_always_visible() {
        let mut visibility = ColumnVisibility::new();
        visibility.set("id", false);
        visibility.set("title", false);
        let cols = columns();
        let visible = visibility.visible_columns(&cols);
        assert_eq!(visible[0].key, cols[0].key);
        assert_eq!(keys(&visible), vec!["id", "status"]);
        assert_eq!(visibility.hidden_count(&cols), 1);
    }

    #[test]
    fn test_show_all_and_empty_columns() {
        let mut visibility = ColumnVisibility::new();
        visibility.set("title", false);
        visibility.show_all();
        assert!(visibility.is_visible("title"));
        assert!(visibility.visible_columns::<JsonRecord>(&[]).is_empty());
    }
}
