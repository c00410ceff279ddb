//! Expiry Queue Module
//!
//! Binary min-heap of cache entries ordered by absolute expiry.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::time::Instant;

use crate::cache::CacheEntry;

/// Sentinel stored in a [`HeapSlot`] while its entry is not queued.
const NOT_QUEUED: usize = usize::MAX;

// == Heap Slot ==
/// An entry's position in the queue. Readable anywhere, written only here.
#[derive(Debug)]
pub struct HeapSlot(AtomicUsize);

impl HeapSlot {
    pub(super) fn unqueued() -> Self {
        Self(AtomicUsize::new(NOT_QUEUED))
    }

    pub(super) fn get(&self) -> Option<usize> {
        match self.0.load(Ordering::Acquire) {
            NOT_QUEUED => None,
            index => Some(index),
        }
    }

    fn set(&self, index: Option<usize>) {
        self.0.store(index.unwrap_or(NOT_QUEUED), Ordering::Release);
    }
}

// == Expiry Queue ==
/// Orders entries so the soonest-expiring one sits at the front.
///
/// Entries without a TTL compare as the largest possible expiry: they lose
/// against any finite expiry and never win against each other, so they
/// collect at the back of the heap. They remain queued.
///
/// Every mutation keeps each entry's `heap_index` equal to its position in
/// the backing vector, which is what makes `fix` and `remove` O(log n).
#[derive(Debug)]
pub struct ExpiryQueue<V> {
    heap: Vec<Arc<CacheEntry<V>>>,
}

impl<V> Default for ExpiryQueue<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> ExpiryQueue<V> {
    // == Constructor ==
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self { heap: Vec::new() }
    }

    // == Push ==
    /// Inserts an entry and records its resulting position.
    pub fn push(&mut self, entry: Arc<CacheEntry<V>>) {
        let index = self.heap.len();
        entry.heap_slot().set(Some(index));
        self.heap.push(entry);
        self.sift_up(index);
    }

    // == Fix ==
    /// Restores heap order after `entry`'s expiry changed in place.
    ///
    /// # Panics
    /// Panics if the entry's recorded index does not point at itself.
    pub fn fix(&mut self, entry: &Arc<CacheEntry<V>>) {
        let index = self.position_of(entry);
        if !self.sift_down(index, self.heap.len()) {
            self.sift_up(index);
        }
    }

    // == Remove ==
    /// Removes an arbitrary entry using its recorded position.
    ///
    /// # Panics
    /// Panics if the entry's recorded index does not point at itself.
    pub fn remove(&mut self, entry: &Arc<CacheEntry<V>>) -> Arc<CacheEntry<V>> {
        let index = self.position_of(entry);
        let last = self.heap.len() - 1;
        if index != last {
            self.swap(index, last);
            if !self.sift_down(index, last) {
                self.sift_up(index);
            }
        }
        self.take_last()
    }

    // == Pop ==
    /// Removes and returns the soonest-expiring entry.
    pub fn pop(&mut self) -> Option<Arc<CacheEntry<V>>> {
        if self.heap.is_empty() {
            return None;
        }
        let last = self.heap.len() - 1;
        self.swap(0, last);
        self.sift_down(0, last);
        Some(self.take_last())
    }

    // == Peek ==
    /// Returns the soonest-expiring entry without removing it.
    pub fn peek(&self) -> Option<&Arc<CacheEntry<V>>> {
        self.heap.first()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Iterates entries in heap (not sorted) order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<CacheEntry<V>>> {
        self.heap.iter()
    }

    // == Heap Internals ==
    fn position_of(&self, entry: &Arc<CacheEntry<V>>) -> usize {
        let index = entry
            .heap_index()
            .unwrap_or_else(|| panic!("entry {:?} is not queued", entry.key()));
        assert!(
            index < self.heap.len() && Arc::ptr_eq(&self.heap[index], entry),
            "heap index {} of entry {:?} is stale",
            index,
            entry.key()
        );
        index
    }

    fn take_last(&mut self) -> Arc<CacheEntry<V>> {
        let entry = self
            .heap
            .pop()
            .expect("take_last called on an empty expiry queue");
        entry.heap_slot().set(None);
        entry
    }

    fn less(&self, i: usize, j: usize) -> bool {
        expires_before(self.heap[i].expires_at(), self.heap[j].expires_at())
    }

    fn swap(&mut self, i: usize, j: usize) {
        self.heap.swap(i, j);
        self.heap[i].heap_slot().set(Some(i));
        self.heap[j].heap_slot().set(Some(j));
    }

    fn sift_up(&mut self, mut child: usize) {
        while child > 0 {
            let parent = (child - 1) / 2;
            if !self.less(child, parent) {
                break;
            }
            self.swap(parent, child);
            child = parent;
        }
    }

    /// Sinks the element at `start` within `heap[..len]`. Returns whether it moved.
    fn sift_down(&mut self, start: usize, len: usize) -> bool {
        let mut parent = start;
        loop {
            let left = 2 * parent + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let child = if right < len && self.less(right, left) {
                right
            } else {
                left
            };
            if !self.less(child, parent) {
                break;
            }
            self.swap(parent, child);
            parent = child;
        }
        parent > start
    }
}

/// Ordering rule for the queue: a finite expiry always beats "never".
pub(crate) fn expires_before(a: Option<Instant>, b: Option<Instant>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a < b,
        (Some(_), None) => true,
        (None, _) => false,
    }
}
