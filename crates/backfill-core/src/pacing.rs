//! Blocking delays behind a trait so tests can observe them without waiting.
//!
//! Every suspension point in a run (retry backoff, politeness pause after a
//! provider call, inter-row delay) goes through a [`Sleeper`].

use std::sync::{Arc, Mutex};
use std::time::Duration;

pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// Real sleeper: blocks the current thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// Fake clock: records requested durations and returns immediately.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    slept: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// All durations requested so far, in order
    pub fn durations(&self) -> Vec<Duration> {
        self.slept
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn count(&self) -> usize {
        self.durations().len()
    }

    pub fn total(&self) -> Duration {
        self.durations().iter().sum()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.slept
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(duration);
    }
}

/// Fixed politeness pause applied after each successful provider request.
#[derive(Clone)]
pub struct Pacer {
    sleeper: Arc<dyn Sleeper>,
    pause: Duration,
}

impl Pacer {
    pub fn new(sleeper: Arc<dyn Sleeper>, pause: Duration) -> Self {
        Self { sleeper, pause }
    }

    pub fn pause(&self) {
        self.sleeper.sleep(self.pause);
    }
}

impl std::fmt::Debug for Pacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pacer")
            .field("pause", &self.pause)
            .finish_non_exhaustive()
    }
}
