use std::collections::HashMap;

use rowsink_core::client::ColumnInfo;

/// What the engine currently knows about the destination table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Existence {
    Unknown,
    Missing,
    Exists,
}

/// Tracks the destination table's existence and, after introspection, its
/// discovered column shape. Rebuilt from scratch on every reconnect; nothing
/// here survives the engine instance.
#[derive(Debug)]
pub(crate) struct TableState {
    name: String,
    existence: Existence,
    /// Discovered column name (lowercased) → engine-reported data type.
    columns: HashMap<String, String>,
}

impl TableState {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            existence: Existence::Unknown,
            columns: HashMap::new(),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn exists(&self) -> bool {
        self.existence == Existence::Exists
    }

    pub(crate) fn set_exists(&mut self) {
        self.existence = Existence::Exists;
    }

    /// Marks the table missing after an engine-reported relation-not-found
    /// error. The discovered shape is stale at that point, so it is dropped.
    pub(crate) fn set_missing(&mut self) {
        self.existence = Existence::Missing;
        self.columns.clear();
    }

    pub(crate) fn record_columns(&mut self, columns: Vec<ColumnInfo>) {
        self.columns = columns
            .into_iter()
            .map(|column| (column.name.to_ascii_lowercase(), column.data_type))
            .collect();
    }

    /// Case-insensitive lookup of a discovered column's data type.
    pub(crate) fn column_type(&self, name: &str) -> Option<&str> {
        self.columns
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn existence_starts_unknown() {
        let state = TableState::new("events");
        assert!(!state.exists());
    }

    #[test]
    fn marking_missing_drops_the_discovered_shape() {
        let mut state = TableState::new("events");
        state.record_columns(vec![ColumnInfo {
            name: "Name".to_string(),
            data_type: "character varying".to_string(),
        }]);
        state.set_exists();
        assert_eq!(state.column_type("name"), Some("character varying"));

        state.set_missing();
        assert!(!state.exists());
        assert_eq!(state.column_type("name"), None);
    }
}
