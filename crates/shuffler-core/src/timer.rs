//! Deterministic timer queue.
//!
//! Deadlines are expressed in engine time: the `Duration` elapsed since the
//! engine's epoch. The queue never reads a clock itself; the host feeds it
//! the current time through `pop_due`, which makes every schedule
//! reproducible in tests.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// Handle to a scheduled timer, used to cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Entry<K> {
    id: TimerId,
    kind: K,
    period: Option<Duration>,
}

/// Ordering key: deadline first, then scheduling sequence so equal
/// deadlines fire in the order they were scheduled.
type Key = (Duration, u64);

/// A single-threaded queue of one-shot and repeating timers.
#[derive(Debug)]
pub struct TimerQueue<K> {
    entries: BTreeMap<Key, Entry<K>>,
    keys: HashMap<TimerId, Key>,
    next_seq: u64,
}

impl<K: Clone> Default for TimerQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone> TimerQueue<K> {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            keys: HashMap::new(),
            next_seq: 0,
        }
    }

    fn next_key(&mut self, deadline: Duration) -> Key {
        let seq = self.next_seq;
        self.next_seq += 1;
        (deadline, seq)
    }

    fn insert(&mut self, deadline: Duration, kind: K, period: Option<Duration>) -> TimerId {
        let key = self.next_key(deadline);
        let id = TimerId(key.1);
        self.entries.insert(key, Entry { id, kind, period });
        self.keys.insert(id, key);
        id
    }

    /// Schedules a timer that fires once at `deadline`.
    pub fn schedule_once(&mut self, deadline: Duration, kind: K) -> TimerId {
        self.insert(deadline, kind, None)
    }

    /// Schedules a timer that fires at `first_deadline` and then every
    /// `period` after that until cancelled.
    ///
    /// # Panics
    ///
    /// Panics if `period` is zero.
    pub fn schedule_every(&mut self, first_deadline: Duration, period: Duration, kind: K) -> TimerId {
        assert!(!period.is_zero(), "repeating timer period must be non-zero");
        self.insert(first_deadline, kind, Some(period))
    }

    /// Cancels a timer. Returns `false` if it had already fired or was
    /// never scheduled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.keys.remove(&id) {
            Some(key) => self.entries.remove(&key).is_some(),
            None => false,
        }
    }

    /// Removes and returns the earliest timer whose deadline is at or before
    /// `now`. A repeating timer is re-armed at `deadline + period` and keeps
    /// its id.
    pub fn pop_due(&mut self, now: Duration) -> Option<(TimerId, K, Duration)> {
        let (&key, _) = self.entries.first_key_value()?;
        if key.0 > now {
            return None;
        }
        let entry = self.entries.remove(&key)?;
        self.keys.remove(&entry.id);

        let deadline = key.0;
        if let Some(period) = entry.period {
            let next = self.next_key(deadline + period);
            self.keys.insert(entry.id, next);
            self.entries.insert(
                next,
                Entry {
                    id: entry.id,
                    kind: entry.kind.clone(),
                    period: entry.period,
                },
            );
        }
        Some((entry.id, entry.kind, deadline))
    }

    /// Earliest pending deadline, if any.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.entries.first_key_value().map(|(key, _)| key.0)
    }

    /// Number of outstanding timers.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    /// Cancels every outstanding timer.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.keys.clear();
    }
}
