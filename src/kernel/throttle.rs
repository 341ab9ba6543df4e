//! Timer-gated coalescing, latest value wins.
//!
//! The first value passes straight through. Values arriving within
//! `interval` of the last emission are held, each replacing the previous
//! one, and the held value is released by `poll` once the window reopens.

use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct Throttle<T> {
    interval: Duration,
    last_emit: Option<Instant>,
    pending: Option<T>,
}

impl<T> Throttle<T> {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_emit: None,
            pending: None,
        }
    }

    pub fn push(&mut self, value: T, now: Instant) -> Option<T> {
        if self.window_open(now) {
            self.last_emit = Some(now);
            self.pending = None;
            return Some(value);
        }
        self.pending = Some(value);
        None
    }

    pub fn poll(&mut self, now: Instant) -> Option<T> {
        if self.pending.is_none() || !self.window_open(now) {
            return None;
        }
        self.last_emit = Some(now);
        self.pending.take()
    }

    /// When `poll` will release the held value, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.as_ref()?;
        self.last_emit.map(|last| last + self.interval)
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    fn window_open(&self, now: Instant) -> bool {
        match self.last_emit {
            Some(last) => now.saturating_duration_since(last) >= self.interval,
            None => true,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/throttle.rs"]
mod tests;
