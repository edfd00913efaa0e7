// Key queue - Bounded FIFO between the event thread and the machine
//
// A ring of capacity + 1 slots; one slot always stays empty so that
// head == tail means empty and head + 1 == tail means full. When the queue
// is full new codes are dropped and the queued ones are kept.

use super::keycode::VirtualKey;
use std::sync::{Arc, Mutex, MutexGuard};

/// Default number of codes the queue can hold
pub const DEFAULT_CAPACITY: usize = 1023;

/// Bounded FIFO of LK201 key codes
#[derive(Debug, Clone)]
pub struct KeyQueue {
    slots: Vec<u8>,
    head: usize,
    tail: usize,
    dropped: u64,
}

impl KeyQueue {
    /// Create a queue holding at most `capacity` codes
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "key queue capacity must be non-zero");
        Self {
            slots: vec![0; capacity + 1],
            head: 0,
            tail: 0,
            dropped: 0,
        }
    }

    #[inline]
    fn advance(&self, index: usize) -> usize {
        (index + 1) % self.slots.len()
    }

    /// Append a code at the head of the queue
    ///
    /// # Arguments
    ///
    /// * `key` - LK201 code to queue for the machine
    ///
    /// # Returns
    ///
    /// `true` if the code was queued. `false` if the queue was full; the code
    /// is dropped, counted in `dropped`, and the queued codes are kept.
    ///
    /// # Example
    ///
    /// ```
    /// use pro_term::input::{KeyQueue, VirtualKey};
    ///
    /// let mut queue = KeyQueue::new(1);
    /// assert!(queue.put(VirtualKey::A));
    /// assert!(!queue.put(VirtualKey::B));
    /// assert_eq!(queue.get(), Some(VirtualKey::A));
    /// assert_eq!(queue.dropped(), 1);
    /// ```
    pub fn put(&mut self, key: VirtualKey) -> bool {
        let next = self.advance(self.head);
        if next == self.tail {
            self.dropped += 1;
            return false;
        }
        self.slots[self.head] = key.code();
        self.head = next;
        true
    }

    /// Remove the oldest code
    pub fn get(&mut self) -> Option<VirtualKey> {
        if self.head == self.tail {
            return None;
        }
        let code = self.slots[self.tail];
        self.tail = self.advance(self.tail);
        Some(VirtualKey(code))
    }

    pub fn len(&self) -> usize {
        (self.head + self.slots.len() - self.tail) % self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    pub fn is_full(&self) -> bool {
        self.advance(self.head) == self.tail
    }

    pub fn capacity(&self) -> usize {
        self.slots.len() - 1
    }

    /// Codes discarded because the queue was full
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn clear(&mut self) {
        self.head = 0;
        self.tail = 0;
    }
}

impl Default for KeyQueue {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Queue handle shared between the producer and the emulated machine
///
/// Clones refer to the same queue.
#[derive(Debug, Clone, Default)]
pub struct SharedKeyQueue {
    inner: Arc<Mutex<KeyQueue>>,
}

impl SharedKeyQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(KeyQueue::new(capacity))),
        }
    }

    // A panic while holding the lock cannot leave head/tail inconsistent,
    // so a poisoned queue is still usable.
    fn lock(&self) -> MutexGuard<'_, KeyQueue> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Enqueue a code from the event side
    pub fn put(&self, key: VirtualKey) -> bool {
        let accepted = self.lock().put(key);
        if !accepted {
            tracing::warn!("Key queue full, dropping {}", key);
        }
        accepted
    }

    /// Dequeue the oldest code from the machine side
    pub fn get_key(&self) -> Option<VirtualKey> {
        self.lock().get()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.lock().capacity()
    }

    pub fn dropped(&self) -> u64 {
        self.lock().dropped()
    }

    /// Discard every queued code
    pub fn clear(&self) {
        self.lock().clear();
    }
}
