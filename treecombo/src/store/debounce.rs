//! Cancellable delayed tasks.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Runs at most one delayed task at a time; scheduling a new one cancels the
/// pending one.
///
/// Each scheduled task receives a ticket. A task that wakes up must claim its
/// ticket with [`Debouncer::complete`] before acting, which fails if it was
/// superseded or cancelled while it was waking.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    ticket: u64,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    /// Creates an idle debouncer.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            ticket: 0,
            pending: None,
        }
    }

    /// The quiet period before a task runs.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Cancels any pending task and schedules `task(ticket)` after the delay.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F, Fut>(&mut self, task: F) -> u64
    where
        F: FnOnce(u64) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        self.ticket += 1;
        let ticket = self.ticket;
        let delay = self.delay;
        let future = task(ticket);
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            future.await;
        }));
        ticket
    }

    /// Cancels the pending task. Returns true if one was pending.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Whether a task is waiting for its delay to pass.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Claims `ticket` for a task whose delay has passed.
    ///
    /// Returns false if the ticket was superseded or cancelled.
    pub fn complete(&mut self, ticket: u64) -> bool {
        if self.pending.is_some() && ticket == self.ticket {
            self.pending = None;
            true
        } else {
            false
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
