//! Deterministic deferral and debouncing.
//!
//! The host drives a [`Scheduler`] by advancing it once per frame (or timer
//! turn) with the current time. Deferred work is plain data of type `T`; the
//! owner pops due entries and interprets them, so nothing here holds callbacks
//! or borrows into the coordinator.
//!
//! [`Debouncer`] sits on top: it keeps the latest value per key and keeps
//! pushing the flush back while triggers keep arriving.

use rustc_hash::FxHashMap;
use std::{collections::VecDeque, hash::Hash, time::Duration};

/// Handle for cancelling a scheduled entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

/// How long to hold an entry back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delay {
    /// Run after this many ticks. Zero still waits for the next tick.
    Ticks(u32),
    /// Run on the first tick at or after this much time has passed.
    Timeout(Duration),
}

#[derive(Clone, Copy, Debug)]
enum Due {
    Frame(u64),
    At(Duration),
}

#[derive(Debug)]
struct Entry<T> {
    id: TaskId,
    /// Nothing runs on the tick it was scheduled in.
    not_before: u64,
    due: Due,
    task: T,
}

#[derive(Debug)]
pub struct Scheduler<T> {
    frame: u64,
    now: Duration,
    next_id: u64,
    queue: VecDeque<Entry<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            frame: 0,
            now: Duration::ZERO,
            next_id: 0,
            queue: VecDeque::new(),
        }
    }

    /// Host time as of the last tick.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn schedule(&mut self, delay: Delay, task: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        let due = match delay {
            Delay::Ticks(ticks) => Due::Frame(self.frame + u64::from(ticks.max(1))),
            Delay::Timeout(timeout) => Due::At(self.now + timeout),
        };
        self.queue.push_back(Entry {
            id,
            not_before: self.frame + 1,
            due,
            task,
        });
        id
    }

    /// Removes a scheduled entry, returning its task if it had not run yet.
    pub fn cancel(&mut self, id: TaskId) -> Option<T> {
        let position = self.queue.iter().position(|entry| entry.id == id)?;
        self.queue.remove(position).map(|entry| entry.task)
    }

    pub fn is_scheduled(&self, id: TaskId) -> bool {
        self.queue.iter().any(|entry| entry.id == id)
    }

    /// Starts a new tick at host time `now`. Time never moves backwards.
    pub fn advance(&mut self, now: Duration) {
        self.frame += 1;
        self.now = self.now.max(now);
    }

    /// Pops the oldest entry that is due on the current tick.
    ///
    /// Entries scheduled while draining are never due on the same tick, so a
    /// drain loop always terminates.
    pub fn pop_due(&mut self) -> Option<(TaskId, T)> {
        let (frame, now) = (self.frame, self.now);
        let position = self.queue.iter().position(|entry| {
            frame >= entry.not_before
                && match entry.due {
                    Due::Frame(due) => frame >= due,
                    Due::At(due) => now >= due,
                }
        })?;
        self.queue
            .remove(position)
            .map(|entry| (entry.id, entry.task))
    }
}

/// Trailing debounce keyed per source.
#[derive(Debug)]
pub struct Debouncer<K, V> {
    wait: u32,
    pending: FxHashMap<K, (TaskId, V)>,
}

impl<K: Copy + Eq + Hash, V> Debouncer<K, V> {
    pub fn new(wait: u32) -> Self {
        Self {
            wait,
            pending: FxHashMap::default(),
        }
    }

    /// Stores `value` as the latest for `key` and (re)schedules `task` to
    /// flush it `wait` ticks from now.
    pub fn trigger<T>(
        &mut self,
        key: K,
        value: V,
        scheduler: &mut Scheduler<T>,
        task: T,
    ) -> TaskId {
        if let Some((previous, _)) = self.pending.remove(&key) {
            scheduler.cancel(previous);
            tracing::trace!(wait = self.wait, "Debounce window restarted");
        }
        let id = scheduler.schedule(Delay::Ticks(self.wait), task);
        self.pending.insert(key, (id, value));
        id
    }

    /// Takes the value a due task was scheduled for.
    ///
    /// Returns `None` when the task was superseded or already flushed early.
    pub fn take(&mut self, key: K, id: TaskId) -> Option<V> {
        let current = self
            .pending
            .get(&key)
            .is_some_and(|(pending, _)| *pending == id);
        if !current {
            return None;
        }
        self.pending.remove(&key).map(|(_, value)| value)
    }

    /// Takes the pending value for `key` now and cancels its scheduled flush.
    pub fn flush<T>(&mut self, key: K, scheduler: &mut Scheduler<T>) -> Option<V> {
        let (id, value) = self.pending.remove(&key)?;
        scheduler.cancel(id);
        Some(value)
    }

    pub fn cancel<T>(&mut self, key: K, scheduler: &mut Scheduler<T>) {
        if let Some((id, _)) = self.pending.remove(&key) {
            scheduler.cancel(id);
        }
    }

    pub fn is_pending(&self, key: K) -> bool {
        self.pending.contains_key(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain<T>(scheduler: &mut Scheduler<T>) -> Vec<T> {
        let mut out = Vec::new();
        while let Some((_, task)) = scheduler.pop_due() {
            out.push(task);
        }
        out
    }

    fn tick<T>(scheduler: &mut Scheduler<T>) -> Vec<T> {
        let now = scheduler.now();
        scheduler.advance(now);
        drain(scheduler)
    }

    #[test]
    fn tick_delays_count_frames() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(Delay::Ticks(2), "two");
        scheduler.schedule(Delay::Ticks(1), "one");

        assert!(drain(&mut scheduler).is_empty());
        assert_eq!(tick(&mut scheduler), vec!["one"]);
        assert_eq!(tick(&mut scheduler), vec!["two"]);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn zero_ticks_still_waits_for_next_tick() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(Delay::Ticks(0), ());
        assert!(drain(&mut scheduler).is_empty());
        assert_eq!(tick(&mut scheduler).len(), 1);
    }

    #[test]
    fn timeouts_follow_host_time() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(Delay::Timeout(Duration::from_millis(250)), "fallback");

        scheduler.advance(Duration::from_millis(16));
        assert!(drain(&mut scheduler).is_empty());
        scheduler.advance(Duration::from_millis(249));
        assert!(drain(&mut scheduler).is_empty());
        scheduler.advance(Duration::from_millis(250));
        assert_eq!(drain(&mut scheduler), vec!["fallback"]);
    }

    #[test]
    fn time_does_not_move_backwards() {
        let mut scheduler: Scheduler<()> = Scheduler::new();
        scheduler.advance(Duration::from_millis(100));
        scheduler.advance(Duration::from_millis(40));
        assert_eq!(scheduler.now(), Duration::from_millis(100));
    }

    #[test]
    fn cancelled_entries_never_run() {
        let mut scheduler = Scheduler::new();
        let id = scheduler.schedule(Delay::Ticks(1), "cancelled");
        scheduler.schedule(Delay::Ticks(1), "kept");
        assert_eq!(scheduler.cancel(id), Some("cancelled"));
        assert!(!scheduler.is_scheduled(id));
        assert_eq!(tick(&mut scheduler), vec!["kept"]);
    }

    #[test]
    fn entries_scheduled_while_draining_wait_a_tick() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(Delay::Timeout(Duration::ZERO), 1);
        scheduler.advance(Duration::ZERO);
        let (_, first) = scheduler.pop_due().unwrap();
        assert_eq!(first, 1);
        scheduler.schedule(Delay::Timeout(Duration::ZERO), 2);
        assert!(scheduler.pop_due().is_none());
        assert_eq!(tick(&mut scheduler), vec![2]);
    }

    #[test]
    fn storm_flushes_once_with_last_value() {
        let mut scheduler = Scheduler::new();
        let mut debouncer = Debouncer::new(2);

        for height in [20.0, 40.0, 60.0, 80.0] {
            debouncer.trigger(1u8, height, &mut scheduler, 1u8);
            scheduler.advance(scheduler.now());
            assert!(scheduler.pop_due().is_none());
        }

        scheduler.advance(scheduler.now());
        let (id, key) = scheduler.pop_due().unwrap();
        assert_eq!(debouncer.take(key, id), Some(80.0));
        assert!(scheduler.is_empty());
        assert!(!debouncer.is_pending(1));
    }

    #[test]
    fn keys_debounce_independently() {
        let mut scheduler = Scheduler::new();
        let mut debouncer = Debouncer::new(1);
        debouncer.trigger('a', 1, &mut scheduler, 'a');
        debouncer.trigger('b', 2, &mut scheduler, 'b');

        scheduler.advance(scheduler.now());
        let mut flushed = Vec::new();
        while let Some((id, key)) = scheduler.pop_due() {
            flushed.extend(debouncer.take(key, id));
        }
        assert_eq!(flushed, vec![1, 2]);
    }

    #[test]
    fn early_flush_cancels_scheduled_task() {
        let mut scheduler = Scheduler::new();
        let mut debouncer = Debouncer::new(1);
        let id = debouncer.trigger(7u8, "caret", &mut scheduler, 7u8);

        assert_eq!(debouncer.flush(7, &mut scheduler), Some("caret"));
        assert!(!scheduler.is_scheduled(id));
        assert_eq!(debouncer.take(7, id), None);
    }
}
