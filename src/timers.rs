//! Timer queue on a virtual clock.
//!
//! Every suspension in the presentation is an entry in one of these queues.
//! Owners call [`Timers::pop_due`] in a loop from their `update(dt)` and then
//! [`Timers::advance_to`] the frame's end. While an event is handled the clock
//! reads exactly that event's due time, so delays scheduled from a handler are
//! measured from when the step fired rather than from the frame boundary.

use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Debug)]
pub struct Timers<E> {
    now: Duration,
    next_id: u64,
    queue: BTreeMap<(Duration, u64), E>,
}

impl<E> Default for Timers<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Timers<E> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            queue: BTreeMap::new(),
        }
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Due time of the earliest pending event.
    pub fn next_due(&self) -> Option<Duration> {
        self.queue.keys().next().map(|(due, _)| *due)
    }

    pub fn schedule(&mut self, delay: Duration, event: E) {
        let id = self.next_id;
        self.next_id += 1;
        self.queue.insert((self.now + delay, id), event);
    }

    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.queue.len();
        self.queue.clear();
        cancelled
    }

    /// Pops the earliest event due at or before `until`, moving the clock to its due time.
    pub fn pop_due(&mut self, until: Duration) -> Option<E> {
        let (&key, _) = self.queue.first_key_value()?;
        if key.0 > until {
            return None;
        }
        self.now = self.now.max(key.0);
        self.queue.remove(&key)
    }

    pub fn advance_to(&mut self, until: Duration) {
        if until > self.now {
            self.now = until;
        }
    }
}
