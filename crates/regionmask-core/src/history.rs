//! Bounded snapshot history with a debounced push.

use std::collections::VecDeque;
use std::time::Duration;

// Use web_time for WASM compatibility
#[cfg(target_arch = "wasm32")]
use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// Default number of snapshots kept (and of discarded snapshots retained).
pub const DEFAULT_HISTORY_CAPACITY: usize = 15;

/// Default debounce delay for drag snapshots.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);

/// A cancel-and-reschedule timer.
///
/// At most one deadline is pending. Scheduling again replaces it, so a burst
/// of events fires once, `delay` after the last of them.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Schedule (or re-schedule) the timer relative to `now`.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Consume the pending timer if it is due at `now`.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Capacity-bounded snapshot stack.
///
/// Popped entries move into a bounded side buffer from which they can be
/// recovered with [`History::recover`].
#[derive(Debug, Clone)]
pub struct History<T> {
    entries: VecDeque<T>,
    discarded: VecDeque<T>,
    capacity: usize,
    debouncer: Debouncer,
}

impl<T: Clone> Default for History<T> {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY, DEFAULT_DEBOUNCE)
    }
}

impl<T: Clone> History<T> {
    /// Create a history holding at most `capacity` snapshots.
    pub fn new(capacity: usize, debounce: Duration) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            discarded: VecDeque::with_capacity(capacity),
            capacity,
            debouncer: Debouncer::new(debounce),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries available to [`History::recover`].
    pub fn discarded_len(&self) -> usize {
        self.discarded.len()
    }

    /// Append a snapshot, evicting the oldest one once at capacity.
    pub fn push(&mut self, snapshot: T) {
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(snapshot);
    }

    /// Commit a new edit: push it and forget previously discarded entries.
    pub fn commit(&mut self, snapshot: T) {
        self.discarded.clear();
        self.push(snapshot);
    }

    /// Remove and return the newest snapshot, keeping a copy in the side buffer.
    pub fn pop(&mut self) -> Option<T> {
        let snapshot = self.entries.pop_back()?;
        if self.discarded.len() >= self.capacity {
            self.discarded.pop_front();
        }
        self.discarded.push_back(snapshot.clone());
        Some(snapshot)
    }

    /// Newest snapshot without removing it.
    pub fn peek(&self) -> Option<&T> {
        self.entries.back()
    }

    /// Oldest retained snapshot.
    pub fn oldest(&self) -> Option<&T> {
        self.entries.front()
    }

    /// Drop the newest snapshot and return a fresh copy of the new top.
    ///
    /// A single remaining snapshot is the floor: nothing happens and `None`
    /// is returned.
    pub fn undo(&mut self) -> Option<T> {
        if self.entries.len() <= 1 {
            return None;
        }
        self.pop();
        self.peek().cloned()
    }

    /// Move the most recently discarded snapshot back on top and return a copy.
    pub fn recover(&mut self) -> Option<T> {
        let snapshot = self.discarded.pop_back()?;
        self.push(snapshot.clone());
        Some(snapshot)
    }

    /// Request a debounced push; any pending request is replaced.
    pub fn schedule_push(&mut self, now: Instant) {
        self.debouncer.schedule(now);
    }

    pub fn cancel_pending(&mut self) {
        self.debouncer.cancel();
    }

    pub fn has_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Commit `snapshot()` if a debounced push is due at `now`.
    pub fn flush_due(&mut self, now: Instant, snapshot: impl FnOnce() -> T) -> bool {
        if self.debouncer.fire_if_due(now) {
            self.commit(snapshot());
            true
        } else {
            false
        }
    }

    /// Forget every snapshot and any pending push.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.discarded.clear();
        self.debouncer.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_evicts_oldest() {
        let mut history = History::new(DEFAULT_HISTORY_CAPACITY, DEFAULT_DEBOUNCE);
        for i in 0..DEFAULT_HISTORY_CAPACITY + 5 {
            history.push(i);
        }
        assert_eq!(history.len(), DEFAULT_HISTORY_CAPACITY);
        assert_eq!(history.oldest(), Some(&5));
        assert_eq!(history.peek(), Some(&(DEFAULT_HISTORY_CAPACITY + 4)));
    }

    #[test]
    fn test_pop_moves_to_discarded() {
        let mut history = History::new(3, DEFAULT_DEBOUNCE);
        history.push(1);
        history.push(2);
        assert_eq!(history.pop(), Some(2));
        assert_eq!(history.discarded_len(), 1);
        assert_eq!(history.peek(), Some(&1));
    }

    #[test]
    fn test_discarded_is_bounded() {
        let mut history = History::new(2, DEFAULT_DEBOUNCE);
        for round in 0..3 {
            history.push(round);
            history.pop();
        }
        assert_eq!(history.discarded_len(), 2);
        assert_eq!(history.recover(), Some(2));
        assert_eq!(history.recover(), Some(1));
        assert_eq!(history.recover(), None);
    }

    #[test]
    fn test_undo_floor() {
        let mut history = History::new(5, DEFAULT_DEBOUNCE);
        history.push("initial");
        assert_eq!(history.undo(), None);
        assert_eq!(history.undo(), None);
        assert_eq!(history.len(), 1);

        history.push("edit");
        assert_eq!(history.undo(), Some("initial"));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_recover_after_undo() {
        let mut history = History::new(5, DEFAULT_DEBOUNCE);
        history.push(0);
        history.push(1);
        history.undo();
        assert_eq!(history.recover(), Some(1));
        assert_eq!(history.peek(), Some(&1));
    }

    #[test]
    fn test_commit_clears_discarded() {
        let mut history = History::new(5, DEFAULT_DEBOUNCE);
        history.push(0);
        history.push(1);
        history.undo();
        history.commit(2);
        assert_eq!(history.discarded_len(), 0);
        assert_eq!(history.recover(), None);
    }

    #[test]
    fn test_debounce_coalesces_burst() {
        let mut history = History::new(5, Duration::from_millis(200));
        let start = Instant::now();
        for i in 0..10 {
            history.schedule_push(start + Duration::from_millis(i * 10));
        }
        let last = start + Duration::from_millis(90);
        assert!(!history.flush_due(last + Duration::from_millis(199), || 1));
        assert!(history.is_empty());
        assert!(history.flush_due(last + Duration::from_millis(200), || 1));
        assert!(!history.flush_due(last + Duration::from_millis(500), || 2));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_cancel_pending() {
        let mut debouncer = Debouncer::new(Duration::from_millis(10));
        let now = Instant::now();
        debouncer.schedule(now);
        assert!(debouncer.is_pending());
        debouncer.cancel();
        assert!(!debouncer.fire_if_due(now + Duration::from_secs(1)));
    }
}
