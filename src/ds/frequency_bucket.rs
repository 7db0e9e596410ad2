//! Per-frequency recency lists for O(1) LFU bookkeeping.
//!
//! A [`FrequencyBucket`] is an intrusive doubly linked list of [`Entry`]
//! handles that all share one access count. The links live inside the
//! entries themselves (stored in an [`EntryArena`]), so moving an entry
//! between buckets never allocates.
//!
//! ```text
//!   freq=1: head ──► [e7] ◄──► [e2] ◄──► [e4] ◄── tail
//!                    MRU                  LRU (evicted first)
//!             next_freq = Some(3)
//!
//!   freq=3: head ──► [e1] ◄── tail
//!             prev_freq = Some(1), next_freq = None
//! ```
//!
//! Besides its own list, each bucket records the neighbouring *occupied*
//! frequencies (`prev_freq` / `next_freq`). The owning cache keeps those
//! links current as buckets appear and disappear, which lets it find the
//! next minimum frequency without scanning.

use crate::ds::arena::{EntryArena, EntryHandle};

/// One cached key/value pair with its access count and bucket links.
///
/// Link fields come first since they are touched on every promotion.
#[derive(Debug)]
pub struct Entry<K, V> {
    pub(crate) prev: Option<EntryHandle>,
    pub(crate) next: Option<EntryHandle>,
    pub(crate) freq: u64,
    pub(crate) key: K,
    pub(crate) value: V,
}

impl<K, V> Entry<K, V> {
    /// Creates an unlinked entry at frequency 1.
    pub fn new(key: K, value: V) -> Self {
        Self {
            prev: None,
            next: None,
            freq: 1,
            key,
            value,
        }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn frequency(&self) -> u64 {
        self.freq
    }
}

/// Recency-ordered list of entries sharing one frequency.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FrequencyBucket {
    head: Option<EntryHandle>,
    tail: Option<EntryHandle>,
    len: usize,
    pub(crate) prev_freq: Option<u64>,
    pub(crate) next_freq: Option<u64>,
}

impl FrequencyBucket {
    /// Creates an empty bucket linked between two occupied frequencies.
    pub fn new(prev_freq: Option<u64>, next_freq: Option<u64>) -> Self {
        Self {
            head: None,
            tail: None,
            len: 0,
            prev_freq,
            next_freq,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Most recently touched entry.
    pub fn head(&self) -> Option<EntryHandle> {
        self.head
    }

    /// Least recently touched entry; the eviction candidate of this bucket.
    pub fn tail(&self) -> Option<EntryHandle> {
        self.tail
    }

    /// Nearest lower occupied frequency, if any.
    pub fn prev_freq(&self) -> Option<u64> {
        self.prev_freq
    }

    /// Nearest higher occupied frequency, if any.
    pub fn next_freq(&self) -> Option<u64> {
        self.next_freq
    }

    /// Links `handle` in as the most recently touched entry.
    ///
    /// # Panics
    ///
    /// Panics if `handle` or the current head is not resident in `arena`.
    pub fn push_front<K, V>(&mut self, arena: &mut EntryArena<Entry<K, V>>, handle: EntryHandle) {
        let old_head = self.head;
        let entry = arena.get_mut(handle).expect("pushed entry missing from arena");
        entry.prev = None;
        entry.next = old_head;

        match old_head {
            Some(old) => {
                arena.get_mut(old).expect("bucket head missing from arena").prev = Some(handle);
            },
            None => self.tail = Some(handle),
        }
        self.head = Some(handle);
        self.len += 1;
    }

    /// Unlinks `handle` from this bucket, leaving it resident in `arena`.
    ///
    /// # Panics
    ///
    /// Panics if `handle` or one of its neighbours is not resident in `arena`,
    /// or if the bucket is already empty.
    pub fn unlink<K, V>(&mut self, arena: &mut EntryArena<Entry<K, V>>, handle: EntryHandle) {
        assert!(self.len > 0, "unlink from empty frequency bucket");
        let (prev, next) = {
            let entry = arena.get_mut(handle).expect("unlinked entry missing from arena");
            let links = (entry.prev, entry.next);
            entry.prev = None;
            entry.next = None;
            links
        };

        match prev {
            Some(p) => arena.get_mut(p).expect("bucket link dangling").next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => arena.get_mut(n).expect("bucket link dangling").prev = prev,
            None => self.tail = prev,
        }
        self.len -= 1;
    }

    /// Unlinks and returns the least recently touched entry.
    pub fn pop_back<K, V>(&mut self, arena: &mut EntryArena<Entry<K, V>>) -> Option<EntryHandle> {
        let tail = self.tail?;
        self.unlink(arena, tail);
        Some(tail)
    }

    /// Walks the bucket from most to least recently touched.
    pub fn iter<'a, K, V>(&self, arena: &'a EntryArena<Entry<K, V>>) -> BucketIter<'a, K, V> {
        BucketIter {
            arena,
            current: self.head,
        }
    }
}

/// Head-to-tail iterator over a [`FrequencyBucket`].
#[derive(Debug)]
pub struct BucketIter<'a, K, V> {
    arena: &'a EntryArena<Entry<K, V>>,
    current: Option<EntryHandle>,
}

impl<'a, K, V> Iterator for BucketIter<'a, K, V> {
    type Item = (EntryHandle, &'a Entry<K, V>);

    fn next(&mut self) -> Option<Self::Item> {
        let handle = self.current?;
        let entry = self.arena.get(handle)?;
        self.current = entry.next;
        Some((handle, entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(bucket: &FrequencyBucket, arena: &EntryArena<Entry<i64, &str>>) -> Vec<i64> {
        bucket.iter(arena).map(|(_, e)| e.key).collect()
    }

    fn setup(n: i64) -> (FrequencyBucket, EntryArena<Entry<i64, &'static str>>, Vec<EntryHandle>) {
        let mut arena = EntryArena::new();
        let mut bucket = FrequencyBucket::new(None, None);
        let handles = (0..n)
            .map(|k| {
                let h = arena.insert(Entry::new(k, "v"));
                bucket.push_front(&mut arena, h);
                h
            })
            .collect();
        (bucket, arena, handles)
    }

    #[test]
    fn push_front_orders_most_recent_first() {
        let (bucket, arena, handles) = setup(3);
        assert_eq!(keys(&bucket, &arena), vec![2, 1, 0]);
        assert_eq!(bucket.head(), Some(handles[2]));
        assert_eq!(bucket.tail(), Some(handles[0]));
        assert_eq!(bucket.len(), 3);
    }

    #[test]
    fn unlink_middle_head_and_tail() {
        let (mut bucket, mut arena, handles) = setup(4);

        bucket.unlink(&mut arena, handles[1]);
        assert_eq!(keys(&bucket, &arena), vec![3, 2, 0]);

        bucket.unlink(&mut arena, handles[3]);
        assert_eq!(keys(&bucket, &arena), vec![2, 0]);
        assert_eq!(bucket.head(), Some(handles[2]));

        bucket.unlink(&mut arena, handles[0]);
        assert_eq!(keys(&bucket, &arena), vec![2]);
        assert_eq!(bucket.tail(), Some(handles[2]));

        bucket.unlink(&mut arena, handles[2]);
        assert!(bucket.is_empty());
        assert_eq!(bucket.head(), None);
        assert_eq!(bucket.tail(), None);

        let entry = arena.get(handles[1]).unwrap();
        assert_eq!((entry.prev, entry.next), (None, None));
    }

    #[test]
    fn pop_back_returns_least_recent() {
        let (mut bucket, mut arena, handles) = setup(3);
        assert_eq!(bucket.pop_back(&mut arena), Some(handles[0]));
        assert_eq!(bucket.pop_back(&mut arena), Some(handles[1]));

        bucket.push_front(&mut arena, handles[0]);
        assert_eq!(keys(&bucket, &arena), vec![0, 2]);
        assert_eq!(bucket.pop_back(&mut arena), Some(handles[2]));
        assert_eq!(bucket.pop_back(&mut arena), Some(handles[0]));
        assert_eq!(bucket.pop_back(&mut arena), None);
    }

    #[test]
    fn neighbour_frequencies_are_kept() {
        let bucket = FrequencyBucket::new(Some(1), Some(4));
        assert_eq!(bucket.prev_freq(), Some(1));
        assert_eq!(bucket.next_freq(), Some(4));
        assert!(bucket.is_empty());
    }

    #[test]
    #[should_panic(expected = "unlink from empty frequency bucket")]
    fn unlink_from_empty_bucket_panics() {
        let mut arena: EntryArena<Entry<i64, &str>> = EntryArena::new();
        let handle = arena.insert(Entry::new(1, "a"));
        let mut bucket = FrequencyBucket::default();
        bucket.unlink(&mut arena, handle);
    }
}
