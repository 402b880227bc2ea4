//! Declarative timer schedule evaluated against a virtual clock.
//!
//! Entries are `(due, effect)` pairs. Nothing fires on its own: the owner
//! asks for due entries with [`Schedule::pop_due`], which hands them out in
//! `(due time, insertion order)` order.

use std::collections::{BTreeMap, HashMap};

/// Milliseconds since the session started.
pub type Millis = u64;

/// Handle to a scheduled entry, used to cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

#[derive(Debug)]
struct Entry<E> {
    effect: E,
    period: Option<Millis>,
}

#[derive(Debug)]
pub struct Schedule<E> {
    entries: BTreeMap<(Millis, TaskHandle), Entry<E>>,
    due_by_handle: HashMap<TaskHandle, Millis>,
    next_handle: u64,
}

impl<E: Clone> Schedule<E> {
    pub fn new() -> Self {
        Schedule {
            entries: BTreeMap::new(),
            due_by_handle: HashMap::new(),
            next_handle: 0,
        }
    }

    fn insert(&mut self, at: Millis, effect: E, period: Option<Millis>) -> TaskHandle {
        let handle = TaskHandle(self.next_handle);
        self.next_handle += 1;
        self.entries.insert((at, handle), Entry { effect, period });
        self.due_by_handle.insert(handle, at);
        handle
    }

    /// Fires `effect` once at `at`.
    pub fn schedule_once(&mut self, at: Millis, effect: E) -> TaskHandle {
        self.insert(at, effect, None)
    }

    /// Fires `effect` at `first_at` and every `period` after that until
    /// cancelled. A zero period is treated as one millisecond.
    pub fn schedule_repeating(&mut self, first_at: Millis, period: Millis, effect: E) -> TaskHandle {
        self.insert(first_at, effect, Some(period.max(1)))
    }

    /// Drops a pending entry. Returns false if it already fired or was
    /// cancelled before.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        match self.due_by_handle.remove(&handle) {
            Some(due) => self.entries.remove(&(due, handle)).is_some(),
            None => false,
        }
    }

    #[cfg(test)]
    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.due_by_handle.contains_key(&handle)
    }

    /// Earliest pending due time.
    #[cfg(test)]
    pub fn next_due(&self) -> Option<Millis> {
        self.entries.keys().next().map(|(due, _)| *due)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes and returns the earliest entry due at or before `now`.
    /// Repeating entries are re-armed one period later under the same handle.
    pub fn pop_due(&mut self, now: Millis) -> Option<(Millis, TaskHandle, E)> {
        let key = *self.entries.keys().next()?;
        if key.0 > now {
            return None;
        }
        let (due, handle) = key;
        let entry = self.entries.remove(&key)?;
        self.due_by_handle.remove(&handle);

        if let Some(period) = entry.period {
            let next = due + period;
            self.entries.insert(
                (next, handle),
                Entry {
                    effect: entry.effect.clone(),
                    period: entry.period,
                },
            );
            self.due_by_handle.insert(handle, next);
        }

        Some((due, handle, entry.effect))
    }
}

impl<E: Clone> Default for Schedule<E> {
    fn default() -> Self {
        Self::new()
    }
}
