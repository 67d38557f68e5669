//! TTL Expiry Timers
//!
//! One-shot tokio tasks that fire a record's expiry callback after its TTL.
//! Each timer carries a generation number so the callback can tell whether
//! the record it was armed for is still the one stored under its key.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

/// Handle to a scheduled one-shot expiry task.
#[derive(Debug)]
pub struct ExpiryTimer {
    generation: u64,
    deadline: Option<Instant>,
    handle: JoinHandle<()>,
}

impl ExpiryTimer {
    /// Spawns a task that sleeps for `ttl` and then runs `on_expire`.
    ///
    /// The deadline is fixed here, not when the task is first polled. A TTL
    /// too large to represent as an `Instant` never fires.
    ///
    /// Must be called from within a tokio runtime.
    pub fn arm<F>(generation: u64, ttl: Duration, on_expire: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let deadline = Instant::now().checked_add(ttl);

        let handle = tokio::spawn(async move {
            match deadline {
                Some(deadline) => time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
            on_expire.await;
        });

        Self {
            generation,
            deadline,
            handle,
        }
    }

    /// Generation this timer was armed with.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Time left until the timer fires, `None` if it never will.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Cancels the timer.
    ///
    /// A callback that has already started may still run to completion, so
    /// the expiry path has to tolerate finding nothing to remove.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    #[cfg(test)]
    pub(crate) fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}
