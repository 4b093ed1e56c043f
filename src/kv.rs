//! Key-value edit surface used for headers, query params and form bodies.
//!
//! Rows are an ordered list of (key, value) string pairs. The editor always
//! shows at least one row: when the collection empties, a single blank
//! placeholder pair is reinstated. Rows with an empty key are kept visible
//! but dropped when the rows are collapsed into a mapping.

use std::collections::BTreeMap;

use crate::models::{map_to_form_fields, FormField};

/// Which column of the selected row is being edited
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KvColumn {
    #[default]
    Key,
    Value,
}

/// One editable pair
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KvRow {
    pub key: String,
    pub value: String,
}

impl KvRow {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        KvRow {
            key: key.into(),
            value: value.into(),
        }
    }

    fn is_blank(&self) -> bool {
        self.key.is_empty() && self.value.is_empty()
    }
}

/// Editable key-value collection.
///
/// Performs no validation of keys or values; duplicate keys collapse
/// last-write-wins when converted to a mapping.
#[derive(Clone, Debug, PartialEq)]
pub struct KvEditor {
    rows: Vec<KvRow>,
    pub selected: usize,
    pub column: KvColumn,
}

impl Default for KvEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl KvEditor {
    /// An editor with a single blank placeholder row
    pub fn new() -> Self {
        KvEditor {
            rows: vec![KvRow::default()],
            selected: 0,
            column: KvColumn::Key,
        }
    }

    /// Seed from a mapping; an empty mapping yields the placeholder row
    pub fn from_map(map: &BTreeMap<String, String>) -> Self {
        let rows: Vec<KvRow> = map
            .iter()
            .map(|(k, v)| KvRow::new(k.clone(), v.clone()))
            .collect();
        Self::from_rows(rows)
    }

    /// Seed from form records, collapsing duplicate keys last-write-wins
    pub fn from_fields(fields: &[FormField]) -> Self {
        Self::from_map(&crate::models::form_fields_to_map(fields))
    }

    fn from_rows(rows: Vec<KvRow>) -> Self {
        let mut editor = KvEditor {
            rows,
            selected: 0,
            column: KvColumn::Key,
        };
        editor.ensure_placeholder();
        editor
    }

    pub fn rows(&self) -> &[KvRow] {
        &self.rows
    }

    /// Collapse rows into a mapping, dropping rows with an empty key
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.rows
            .iter()
            .filter(|row| !row.key.is_empty())
            .map(|row| (row.key.clone(), row.value.clone()))
            .collect()
    }

    /// Project rows into form records for list-shaped body modes
    pub fn to_fields(&self) -> Vec<FormField> {
        map_to_form_fields(&self.to_map())
    }

    /// Append a blank pair and move the selection onto it
    pub fn add_row(&mut self) {
        self.rows.push(KvRow::default());
        self.selected = self.rows.len() - 1;
        self.column = KvColumn::Key;
    }

    /// Delete the selected row, reinstating the placeholder when the last
    /// row goes away. Repeated removal is idempotent on the placeholder.
    pub fn remove_selected(&mut self) {
        if self.rows.len() == 1 && self.rows[0].is_blank() {
            return;
        }
        self.rows.remove(self.selected);
        self.ensure_placeholder();
        if self.selected >= self.rows.len() {
            self.selected = self.rows.len() - 1;
        }
    }

    pub fn next_row(&mut self) {
        if self.selected + 1 < self.rows.len() {
            self.selected += 1;
        }
    }

    pub fn prev_row(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn toggle_column(&mut self) {
        self.column = match self.column {
            KvColumn::Key => KvColumn::Value,
            KvColumn::Value => KvColumn::Key,
        };
    }

    pub fn set_column(&mut self, column: KvColumn) {
        self.column = column;
    }

    /// Type a character into the focused cell
    pub fn insert_char(&mut self, c: char) {
        if let Some(cell) = self.current_cell_mut() {
            cell.push(c);
        }
    }

    /// Delete the last character of the focused cell
    pub fn backspace(&mut self) {
        if let Some(cell) = self.current_cell_mut() {
            cell.pop();
        }
    }

    fn current_cell_mut(&mut self) -> Option<&mut String> {
        let column = self.column;
        self.rows.get_mut(self.selected).map(|row| match column {
            KvColumn::Key => &mut row.key,
            KvColumn::Value => &mut row.value,
        })
    }

    fn ensure_placeholder(&mut self) {
        if self.rows.is_empty() {
            self.rows.push(KvRow::default());
            self.selected = 0;
            self.column = KvColumn::Key;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map_of(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn empty_seed_yields_single_placeholder() {
        let editor = KvEditor::from_map(&BTreeMap::new());
        assert_eq!(editor.rows().len(), 1);
        assert!(editor.rows()[0].is_blank());
        assert!(editor.to_map().is_empty());
    }

    #[test]
    fn distinct_keys_emit_one_entry_each() {
        let editor = KvEditor::from_map(&map_of(&[("a", "1"), ("b", "2"), ("c", "3")]));
        assert_eq!(editor.to_map().len(), 3);
    }

    #[test]
    fn duplicate_keys_collapse_last_write_wins() {
        let mut editor = KvEditor::from_map(&map_of(&[("a", "1")]));
        editor.add_row();
        for c in "a".chars() {
            editor.insert_char(c);
        }
        editor.toggle_column();
        editor.insert_char('9');

        let map = editor.to_map();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("a").map(String::as_str), Some("9"));
    }

    #[test]
    fn rows_without_keys_are_invisible_to_the_mapping() {
        let mut editor = KvEditor::new();
        editor.toggle_column();
        editor.insert_char('v');
        assert!(editor.to_map().is_empty());
        assert_eq!(editor.rows().len(), 1);

        editor.set_column(KvColumn::Key);
        editor.insert_char('k');
        assert_eq!(editor.to_map().get("k").map(String::as_str), Some("v"));
    }

    #[test]
    fn remove_all_rows_is_idempotent_on_the_placeholder() {
        let mut editor = KvEditor::from_map(&map_of(&[("a", "1"), ("b", "2")]));
        for _ in 0..5 {
            editor.remove_selected();
        }
        assert_eq!(editor.rows().len(), 1);
        assert!(editor.rows()[0].is_blank());

        editor.remove_selected();
        assert_eq!(editor.rows().len(), 1);
    }

    #[test]
    fn add_row_moves_selection_to_the_new_row() {
        let mut editor = KvEditor::from_map(&map_of(&[("a", "1")]));
        editor.add_row();
        assert_eq!(editor.selected, 1);
        assert_eq!(editor.column, KvColumn::Key);
        assert_eq!(editor.rows().len(), 2);
    }

    #[test]
    fn selection_stays_in_bounds_after_removal() {
        let mut editor = KvEditor::from_map(&map_of(&[("a", "1"), ("b", "2")]));
        editor.next_row();
        editor.remove_selected();
        assert_eq!(editor.selected, 0);
        assert_eq!(editor.rows().len(), 1);
    }

    #[test]
    fn round_trip_through_fields_preserves_content() {
        let fields = vec![FormField::new("a", "1"), FormField::new("b", "2")];
        let editor = KvEditor::from_fields(&fields);
        let back = editor.to_fields();
        assert_eq!(back.len(), 2);
        for field in &fields {
            assert!(back.contains(field));
        }
    }
}
