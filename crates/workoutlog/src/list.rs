//! Workout list abstraction.

use crate::render::ListEntry;
use crate::workout::WorkoutId;

/// The list of workouts shown next to the map.
pub trait ListView {
    /// Insert an entry at the top of the list.
    fn insert_entry(&mut self, entry: ListEntry);

    /// Remove every entry.
    fn clear(&mut self);
}

/// A list kept in memory, newest entry first.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MemoryList {
    entries: Vec<ListEntry>,
}

impl MemoryList {
    /// Create an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries in display order.
    #[must_use]
    pub fn entries(&self) -> &[ListEntry] {
        &self.entries
    }

    /// Number of rendered entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been rendered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Id of the row at `index`, as a click on that row would report it.
    #[must_use]
    pub fn row_id(&self, index: usize) -> Option<&WorkoutId> {
        self.entries.get(index).map(|entry| &entry.id)
    }
}

impl ListView for MemoryList {
    fn insert_entry(&mut self, entry: ListEntry) {
        self.entries.insert(0, entry);
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workout::{Coordinates, Workout};

    fn entry(distance: f64) -> ListEntry {
        ListEntry::from_workout(&Workout::running(
            Coordinates::new(0.0, 0.0),
            distance,
            30.0,
            170,
        ))
    }

    #[test]
    fn test_newest_entry_first() {
        let mut list = MemoryList::new();
        list.insert_entry(entry(1.0));
        list.insert_entry(entry(2.0));

        assert_eq!(list.len(), 2);
        assert_eq!(list.entries()[0].details[0].value, "2");
        assert_eq!(list.entries()[1].details[0].value, "1");
    }

    #[test]
    fn test_row_id() {
        let mut list = MemoryList::new();
        let first = entry(1.0);
        let id = first.id.clone();
        list.insert_entry(first);

        assert_eq!(list.row_id(0), Some(&id));
        assert_eq!(list.row_id(1), None);
    }

    #[test]
    fn test_clear() {
        let mut list = MemoryList::new();
        list.insert_entry(entry(1.0));
        list.clear();
        assert!(list.is_empty());
    }
}
