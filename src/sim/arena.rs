//! Index-stable entity storage with deferred removal
//!
//! Entities are marked during a tick and physically dropped by `compact`
//! at its end, so indices stay valid while collision passes iterate.

use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq)]
pub struct EntityList<T> {
    items: Vec<T>,
    doomed: BTreeSet<usize>,
}

impl<T> Default for EntityList<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            doomed: BTreeSet::new(),
        }
    }
}

impl<T> EntityList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Number of stored entities, including ones marked for removal
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    /// Flag an entity for removal at the next `compact`. Marking twice is harmless.
    pub fn mark_removed(&mut self, index: usize) {
        if index < self.items.len() {
            self.doomed.insert(index);
        }
    }

    pub fn is_marked(&self, index: usize) -> bool {
        self.doomed.contains(&index)
    }

    /// Entities not marked for removal
    pub fn iter_live(&self) -> impl Iterator<Item = &T> + '_ {
        self.items
            .iter()
            .enumerate()
            .filter(|(i, _)| !self.doomed.contains(i))
            .map(|(_, item)| item)
    }

    /// All stored entities in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Drop marked entities, preserving the order of the rest
    pub fn compact(&mut self) {
        if self.doomed.is_empty() {
            return;
        }
        let doomed = std::mem::take(&mut self.doomed);
        let mut index = 0;
        self.items.retain(|_| {
            let keep = !doomed.contains(&index);
            index += 1;
            keep
        });
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.doomed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_then_compact() {
        let mut list = EntityList::new();
        for i in 0..5 {
            list.push(i);
        }
        list.mark_removed(1);
        list.mark_removed(3);
        list.mark_removed(3);
        list.mark_removed(99);

        // Indices stay stable until compaction
        assert_eq!(list.len(), 5);
        assert_eq!(list.get(3), Some(&3));
        assert!(list.is_marked(1));
        assert_eq!(list.iter_live().copied().collect::<Vec<_>>(), vec![0, 2, 4]);

        list.compact();
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![0, 2, 4]);
        assert!(!list.is_marked(1));
    }

    #[test]
    fn test_clear() {
        let mut list = EntityList::new();
        list.push("a");
        list.mark_removed(0);
        list.clear();
        assert!(list.is_empty());
        list.push("b");
        assert!(!list.is_marked(0));
    }
}
