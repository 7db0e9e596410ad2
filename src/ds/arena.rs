//! Slot storage for cache entries.
//!
//! [`EntryArena`] owns every resident entry of an [`LfuCache`](crate::policy::lfu::LfuCache).
//! The key index and the frequency buckets only hold [`EntryHandle`]s into it,
//! so an entry is stored once and reached in O(1) from either side.
//!
//! Freed slots are recycled through a free list; a handle must not be used
//! after the entry it names has been removed.

/// Lookup handle for an entry stored in an [`EntryArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryHandle(pub(crate) usize);

impl EntryHandle {
    /// Returns the raw slot index.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Vec-backed slot arena with free-list reuse.
#[derive(Debug)]
pub struct EntryArena<T> {
    slots: Vec<Option<T>>,
    free: Vec<usize>,
    len: usize,
}

impl<T> EntryArena<T> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an arena with room for `capacity` entries before reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            len: 0,
        }
    }

    pub fn insert(&mut self, value: T) -> EntryHandle {
        let idx = match self.free.pop() {
            Some(idx) => {
                debug_assert!(self.slots[idx].is_none(), "free slot still occupied");
                self.slots[idx] = Some(value);
                idx
            },
            None => {
                self.slots.push(Some(value));
                self.slots.len() - 1
            },
        };
        self.len += 1;
        EntryHandle(idx)
    }

    pub fn remove(&mut self, handle: EntryHandle) -> Option<T> {
        let value = self.slots.get_mut(handle.0)?.take()?;
        self.free.push(handle.0);
        self.len -= 1;
        Some(value)
    }

    pub fn get(&self, handle: EntryHandle) -> Option<&T> {
        self.slots.get(handle.0)?.as_ref()
    }

    pub fn get_mut(&mut self, handle: EntryHandle) -> Option<&mut T> {
        self.slots.get_mut(handle.0)?.as_mut()
    }

    pub fn contains(&self, handle: EntryHandle) -> bool {
        self.get(handle).is_some()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drops every entry. Outstanding handles become dangling.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.len = 0;
    }

    /// Iterates occupied slots in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (EntryHandle, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_ref().map(|value| (EntryHandle(idx), value)))
    }
}

impl<T> Default for EntryArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arena_reuses_freed_slots() {
        let mut arena = EntryArena::new();
        let a = arena.insert("a");
        let b = arena.insert("b");
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.get(a), Some(&"a"));
        assert_eq!(arena.get(b), Some(&"b"));

        assert_eq!(arena.remove(a), Some("a"));
        assert_eq!(arena.len(), 1);
        assert!(!arena.contains(a));

        let c = arena.insert("c");
        assert_eq!(c.index(), a.index());
        assert_eq!(arena.get(c), Some(&"c"));
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn arena_double_remove_is_none() {
        let mut arena = EntryArena::new();
        let a = arena.insert(7u32);
        assert_eq!(arena.remove(a), Some(7));
        assert_eq!(arena.remove(a), None);
        assert!(arena.is_empty());
    }

    #[test]
    fn arena_clear_and_iter() {
        let mut arena = EntryArena::with_capacity(4);
        for i in 0..4u32 {
            arena.insert(i);
        }
        let removed = arena.iter().nth(1).map(|(handle, _)| handle).unwrap();
        arena.remove(removed);
        let values: Vec<u32> = arena.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![0, 2, 3]);

        if let Some(v) = arena.get_mut(EntryHandle(0)) {
            *v = 10;
        }
        assert_eq!(arena.get(EntryHandle(0)), Some(&10));

        arena.clear();
        assert!(arena.is_empty());
        assert_eq!(arena.iter().count(), 0);
    }
}
