//! Event scheduling and time management.
//!
//! The [`Scheduler`] owns the logical clock and a priority queue of pending
//! wakeups. Entries are ordered by `(time, seq)` where `seq` is a monotone
//! insertion counter, so events at identical simulated time are delivered in
//! FIFO order. The clock never decreases: it advances to an entry's time when
//! that entry is popped.
//!
//! Cancellation works by marking an entry stale via its [`EventKey`]:
//! [`Scheduler::pop`] silently discards stale entries without advancing the
//! clock. This is how activity pauses (breakdowns) retract their pending
//! completion wakeups.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use tracing::trace;

use crate::SimTime;

/// Handle to a scheduled entry, used for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventKey(u64);

impl EventKey {
    /// The insertion sequence number of the entry.
    pub fn seq(&self) -> u64 {
        self.0
    }
}

/// A popped wakeup: the time it was scheduled for plus its payload.
#[derive(Debug)]
pub struct EventEntry<E> {
    pub time: SimTime,
    pub seq: u64,
    pub event: E,
}

struct HeapEntry<E> {
    time: SimTime,
    seq: u64,
    event: E,
}

impl<E> PartialEq for HeapEntry<E> {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.seq == other.seq
    }
}

impl<E> Eq for HeapEntry<E> {}

impl<E> PartialOrd for HeapEntry<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<E> Ord for HeapEntry<E> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse the ordering for min-heap behavior in BinaryHeap
        other
            .time
            .cmp(&self.time)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// The event scheduler: a logical clock plus the wakeup queue.
pub struct Scheduler<E> {
    next_seq: u64,
    events: BinaryHeap<HeapEntry<E>>,
    clock: SimTime,
    cancelled: HashSet<u64>,
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self {
            next_seq: 0,
            events: BinaryHeap::new(),
            clock: SimTime::zero(),
            cancelled: HashSet::new(),
        }
    }
}

impl<E: std::fmt::Debug> Scheduler<E> {
    /// Schedules `event` at `self.time() + delay`.
    pub fn schedule(&mut self, delay: SimTime, event: E) -> EventKey {
        self.schedule_at(self.clock + delay, event)
    }

    /// Schedules `event` at the current simulation time.
    pub fn schedule_now(&mut self, event: E) -> EventKey {
        self.schedule_at(self.clock, event)
    }

    /// Schedules `event` at the absolute time `time`.
    ///
    /// Times in the past are clamped to the current clock so the clock stays
    /// monotone.
    pub fn schedule_at(&mut self, time: SimTime, event: E) -> EventKey {
        let time = time.max(self.clock);
        self.next_seq += 1;
        let seq = self.next_seq;
        trace!(seq, ?time, current = ?self.clock, event = ?event, "event scheduled");
        self.events.push(HeapEntry { time, seq, event });
        EventKey(seq)
    }

    /// Marks a scheduled entry stale. Returns `false` if the entry already
    /// fired or was cancelled before.
    pub fn cancel(&mut self, key: EventKey) -> bool {
        if key.0 > self.next_seq {
            return false;
        }
        self.cancelled.insert(key.0)
    }

    /// Returns the current simulation time.
    #[must_use]
    pub fn time(&self) -> SimTime {
        self.clock
    }

    /// Returns the time of the next live entry, or `None` when the queue is
    /// drained. Stale entries encountered on the way are discarded.
    pub fn peek_time(&mut self) -> Option<SimTime> {
        while let Some(entry) = self.events.peek() {
            if self.cancelled.remove(&entry.seq) {
                self.events.pop();
                continue;
            }
            return Some(entry.time);
        }
        None
    }

    /// Removes and returns the next live entry, advancing the clock to its
    /// time. Stale entries are skipped without advancing the clock.
    pub fn pop(&mut self) -> Option<EventEntry<E>> {
        while let Some(entry) = self.events.pop() {
            if self.cancelled.remove(&entry.seq) {
                continue;
            }
            self.clock = entry.time;
            return Some(EventEntry {
                time: entry.time,
                seq: entry.seq,
                event: entry.event,
            });
        }
        None
    }

    /// Number of entries still queued, stale ones included.
    pub fn pending(&self) -> usize {
        self.events.len()
    }
}
