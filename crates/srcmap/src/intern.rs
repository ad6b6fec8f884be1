//! First-use ordered string tables for `sources` and `names`

use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Interning table assigning dense indices in order of first use.
///
/// Indices start at 0 and never change once assigned, so the resulting list
/// is ordered by first reference. That keeps the deltas written by the
/// encoder small.
#[derive(Debug, Clone, Default)]
pub struct InternTable {
    entries: Vec<Arc<str>>,
    index: FxHashMap<Arc<str>, u32>,
}

impl InternTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a value, returning its index
    ///
    /// Returns the existing index when the value was seen before.
    pub fn intern(&mut self, value: &str) -> u32 {
        if let Some(&idx) = self.index.get(value) {
            return idx;
        }
        let idx = self.entries.len() as u32;
        let value: Arc<str> = Arc::from(value);
        self.entries.push(value.clone());
        self.index.insert(value, idx);
        idx
    }

    /// Index of a value, if interned
    pub fn index_of(&self, value: &str) -> Option<u32> {
        self.index.get(value).copied()
    }

    /// Value at an index
    pub fn get(&self, idx: u32) -> Option<&str> {
        self.entries.get(idx as usize).map(|s| &**s)
    }

    /// Number of distinct values
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Values in index order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|s| &**s)
    }

    /// Consume the table, returning values in index order
    pub fn into_vec(self) -> Vec<String> {
        self.entries.iter().map(|s| s.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_use_order() {
        let mut table = InternTable::new();

        let idx1 = table.intern("greet");
        let idx2 = table.intern("window");
        let idx3 = table.intern("greet"); // duplicate

        assert_eq!(idx1, 0);
        assert_eq!(idx2, 1);
        assert_eq!(idx3, 0);
        assert_eq!(table.len(), 2);
        assert_eq!(table.into_vec(), vec!["greet", "window"]);
    }

    #[test]
    fn test_lookup() {
        let mut table = InternTable::new();
        table.intern("a.js");
        table.intern("b.js");

        assert_eq!(table.index_of("b.js"), Some(1));
        assert_eq!(table.index_of("c.js"), None);
        assert_eq!(table.get(0), Some("a.js"));
        assert_eq!(table.get(2), None);
        assert_eq!(table.iter().collect::<Vec<_>>(), vec!["a.js", "b.js"]);
    }
}
