//! Two-key table
//!
//! A sparse `row × column → value` map used for the end-summary table, the
//! value table and the jump-function views. Rows are created on demand and
//! removed again when their last cell goes.

use rustc_hash::FxHashMap;
use std::hash::Hash;

/// Sparse two-dimensional map
#[derive(Debug, Clone)]
pub struct Table<R, C, V> {
    rows: FxHashMap<R, FxHashMap<C, V>>,
}

impl<R, C, V> Default for Table<R, C, V> {
    fn default() -> Self {
        Self {
            rows: FxHashMap::default(),
        }
    }
}

impl<R: Eq + Hash, C: Eq + Hash, V> Table<R, C, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a cell, returning the previous value
    pub fn insert(&mut self, row: R, column: C, value: V) -> Option<V> {
        self.rows.entry(row).or_default().insert(column, value)
    }

    /// Get a cell
    pub fn get(&self, row: &R, column: &C) -> Option<&V> {
        self.rows.get(row).and_then(|cells| cells.get(column))
    }

    /// Get a mutable cell
    pub fn get_mut(&mut self, row: &R, column: &C) -> Option<&mut V> {
        self.rows.get_mut(row).and_then(|cells| cells.get_mut(column))
    }

    /// Check if a cell exists
    pub fn contains(&self, row: &R, column: &C) -> bool {
        self.get(row, column).is_some()
    }

    /// Check if a row has at least one cell
    pub fn contains_row(&self, row: &R) -> bool {
        self.rows.contains_key(row)
    }

    /// Remove a cell
    pub fn remove(&mut self, row: &R, column: &C) -> Option<V> {
        let cells = self.rows.get_mut(row)?;
        let removed = cells.remove(column);
        if cells.is_empty() {
            self.rows.remove(row);
        }
        removed
    }

    /// All cells of a row
    pub fn row(&self, row: &R) -> Option<&FxHashMap<C, V>> {
        self.rows.get(row)
    }

    /// Iterate over row keys
    pub fn row_keys(&self) -> impl Iterator<Item = &R> {
        self.rows.keys()
    }

    /// Iterate over all cells as `(row, column, value)`
    pub fn cells(&self) -> impl Iterator<Item = (&R, &C, &V)> {
        self.rows
            .iter()
            .flat_map(|(r, cells)| cells.iter().map(move |(c, v)| (r, c, v)))
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.rows.values().map(|cells| cells.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }
}
