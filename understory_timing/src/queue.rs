// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::collections::BinaryHeap;
use alloc::vec::Vec;
use core::cmp::{Ordering, Reverse};

/// Handle to a scheduled timer.
///
/// Handles are generational: once a timer fires or is cancelled, its handle
/// goes stale and every operation on it is a no-op, even after the slot is
/// reused by a later timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId {
    slot: u32,
    generation: u32,
}

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    armed: Option<(f64, T)>,
}

/// Heap entry; ordered by deadline, then by scheduling order.
#[derive(Clone, Copy, Debug)]
struct Entry {
    deadline: f64,
    seq: u64,
    id: TimerId,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.deadline
            .total_cmp(&other.deadline)
            .then(self.seq.cmp(&other.seq))
    }
}

/// A queue of payloads waiting for a deadline.
///
/// Timers with equal deadlines fire in the order they were scheduled.
/// Cancellation is O(1); cancelled entries are discarded lazily as they
/// reach the front of the queue.
#[derive(Debug)]
pub struct TimerQueue<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    heap: BinaryHeap<Reverse<Entry>>,
    next_seq: u64,
    armed: usize,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            heap: BinaryHeap::new(),
            next_seq: 0,
            armed: 0,
        }
    }

    /// Number of pending timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.armed
    }

    /// Returns `true` if no timer is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.armed == 0
    }

    /// Schedules `payload` to fire at `deadline_ms`.
    ///
    /// A NaN deadline is treated as "immediately".
    pub fn schedule(&mut self, deadline_ms: f64, payload: T) -> TimerId {
        let deadline = if deadline_ms.is_nan() {
            f64::NEG_INFINITY
        } else {
            deadline_ms
        };

        let slot = match self.free.pop() {
            Some(slot) => slot,
            None => {
                let slot = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
                self.slots.push(Slot {
                    generation: 0,
                    armed: None,
                });
                slot
            }
        };
        let entry = &mut self.slots[slot as usize];
        entry.armed = Some((deadline, payload));
        let id = TimerId {
            slot,
            generation: entry.generation,
        };

        self.heap.push(Reverse(Entry {
            deadline,
            seq: self.next_seq,
            id,
        }));
        self.next_seq += 1;
        self.armed += 1;
        id
    }

    /// Schedules `payload` to fire `delay_ms` after `now_ms`.
    pub fn schedule_after(&mut self, now_ms: f64, delay_ms: f64, payload: T) -> TimerId {
        self.schedule(now_ms + delay_ms.max(0.0), payload)
    }

    /// Cancels a pending timer and returns its payload.
    ///
    /// Returns `None` for stale handles.
    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        let (_, payload) = self.disarm(id)?;
        Some(payload)
    }

    /// Returns `true` if `id` is still waiting to fire.
    #[must_use]
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.slot(id).is_some_and(|slot| slot.armed.is_some())
    }

    /// Deadline of a pending timer.
    #[must_use]
    pub fn deadline(&self, id: TimerId) -> Option<f64> {
        self.slot(id)?.armed.as_ref().map(|(deadline, _)| *deadline)
    }

    /// Borrows the payload of a pending timer.
    #[must_use]
    pub fn get(&self, id: TimerId) -> Option<&T> {
        self.slot(id)?.armed.as_ref().map(|(_, payload)| payload)
    }

    /// Earliest deadline among pending timers.
    pub fn next_deadline(&mut self) -> Option<f64> {
        self.discard_stale();
        self.heap.peek().map(|Reverse(entry)| entry.deadline)
    }

    /// Removes and returns the earliest timer whose deadline is `<= now_ms`.
    ///
    /// Call repeatedly until it returns `None` to drain everything that is due.
    pub fn pop_due(&mut self, now_ms: f64) -> Option<(TimerId, T)> {
        self.discard_stale();
        let Reverse(entry) = *self.heap.peek()?;
        if entry.deadline > now_ms {
            return None;
        }
        self.heap.pop();
        let (_, payload) = self.disarm(entry.id)?;
        Some((entry.id, payload))
    }

    /// Cancels every pending timer.
    pub fn clear(&mut self) {
        let ids: Vec<TimerId> = self.heap.iter().map(|Reverse(entry)| entry.id).collect();
        for id in ids {
            self.disarm(id);
        }
        self.heap.clear();
    }

    fn slot(&self, id: TimerId) -> Option<&Slot<T>> {
        self.slots
            .get(id.slot as usize)
            .filter(|slot| slot.generation == id.generation)
    }

    fn disarm(&mut self, id: TimerId) -> Option<(f64, T)> {
        let slot = self.slots.get_mut(id.slot as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let armed = slot.armed.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.slot);
        self.armed -= 1;
        Some(armed)
    }

    fn discard_stale(&mut self) {
        while let Some(Reverse(entry)) = self.heap.peek() {
            if self.is_pending(entry.id) {
                break;
            }
            self.heap.pop();
        }
    }
}
