//! # Executor
//!
//! The consumer half. Owns the backend; every call into it happens here.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use super::handoff::{Acquire, Release};
use super::queue::{Exchange, Shared};
use crate::backend::GraphicsBackend;
use crate::command::{replay_buffer, ReplayMode, ReplayOutcome};
use crate::config::QueueConfig;

/// What one [`Executor::execute`] call did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecuteStatus {
    /// A committed buffer was replayed in full.
    Replayed(ReplayOutcome),
    /// Flush mode: one outstanding buffer was replayed, destroy records only.
    Flushed(ReplayOutcome),
    /// Flush mode and nothing is left. Further calls return immediately.
    Drained,
}

/// Running totals over the executor's lifetime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplayStats {
    /// Buffers replayed in full.
    pub buffers_replayed: u64,
    /// Buffers replayed in flush mode.
    pub buffers_flushed: u64,
    /// Records turned into backend calls.
    pub records_executed: u64,
    /// Records skipped because the queue was flushing.
    pub records_skipped: u64,
}

impl ReplayStats {
    fn add(&mut self, outcome: ReplayOutcome) {
        self.records_executed += outcome.executed as u64;
        self.records_skipped += outcome.skipped as u64;
    }
}

/// Consumer-side handle of a [`CommandQueue`](crate::CommandQueue).
///
/// Call [`execute`](Executor::execute) once per frame on the render thread.
pub struct Executor<B> {
    shared: Arc<Shared>,
    backend: B,
    default_pass_size: (u32, u32),
    stats: ReplayStats,
    producer_go: Acquire,
    consumer_go: Release,
}

impl<B> Executor<B> {
    pub(crate) fn new(
        shared: Arc<Shared>,
        backend: B,
        config: &QueueConfig,
        producer_go: Acquire,
        consumer_go: Release,
    ) -> Self {
        Self {
            shared,
            backend,
            default_pass_size: (config.default_pass_width, config.default_pass_height),
            stats: ReplayStats::default(),
            producer_go,
            consumer_go,
        }
    }

    /// The backend.
    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The backend, mutably. Only between `execute` calls.
    #[inline]
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Gives the backend back, ending this half of the queue.
    ///
    /// The final cleanup pass runs when the last half of the queue is
    /// dropped, which may be after this returns. Cleanups have no access to
    /// the backend, so it is safe to drop or reuse regardless of that
    /// ordering.
    #[must_use]
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Size handed to the backend when a default pass begins.
    #[inline]
    #[must_use]
    pub fn default_pass_size(&self) -> (u32, u32) {
        self.default_pass_size
    }

    /// Changes the default pass size, e.g. after a window resize. Takes
    /// effect for the next replayed `BeginDefaultPass`.
    pub fn set_default_pass_size(&mut self, width: u32, height: u32) {
        self.default_pass_size = (width, height);
    }

    /// Totals so far.
    #[inline]
    #[must_use]
    pub fn stats(&self) -> ReplayStats {
        self.stats
    }

    /// Whether the recorder has flushed.
    #[inline]
    #[must_use]
    pub fn is_flushing(&self) -> bool {
        self.shared.flushing.load(Ordering::Acquire)
    }
}

impl<B: GraphicsBackend> Executor<B> {
    /// Replays the next committed buffer.
    ///
    /// Outside flush mode this blocks until the recorder commits, replays
    /// every record in order, then lets the recorder commit again.
    ///
    /// In flush mode it never blocks. A buffer committed before the flush
    /// and not yet replayed is still replayed in full. After that each call
    /// replays the destroy records of the buffer that was pending at flush
    /// time, then reports [`ExecuteStatus::Drained`].
    pub fn execute(&mut self) -> ExecuteStatus {
        // A disconnected recorder always flushed first; treat it the same.
        let woken = self.is_flushing() || self.producer_go.acquire().is_ok();

        let shared = Arc::clone(&self.shared);
        let mut exchange = shared.exchange.lock();

        if !woken || self.is_flushing() {
            return self.flush_step(&mut exchange);
        }

        let outcome = self.replay_committed(&mut exchange);
        drop(exchange);

        tracing::trace!("Replayed {} records", outcome.executed);

        // The recorder may already be gone; nothing is waiting then.
        let _ = self.consumer_go.release();
        ExecuteStatus::Replayed(outcome)
    }

    /// Calls [`execute`](Executor::execute) until the queue is drained.
    ///
    /// Keeps replaying normally until the recorder flushes, so this is the
    /// whole render loop for a consumer with nothing else to do. Returns the
    /// number of buffers processed.
    pub fn drain(&mut self) -> u64 {
        let mut buffers = 0;
        while self.execute() != ExecuteStatus::Drained {
            buffers += 1;
        }
        tracing::debug!("Command queue drained after {} buffers", buffers);
        buffers
    }

    fn flush_step(&mut self, exchange: &mut Exchange) -> ExecuteStatus {
        if !exchange.committed_replayed {
            // Committed before the flush: it is a real frame, replay it whole.
            let outcome = self.replay_committed(exchange);
            tracing::debug!("Flush: last committed frame replayed, {} records", outcome.executed);
            return ExecuteStatus::Replayed(outcome);
        }

        let Some(next) = exchange.parked.take() else {
            return ExecuteStatus::Drained;
        };
        // Slot reuse: completions of the drained buffer fire here.
        let released = exchange.committed.clear();
        exchange.committed = next;

        let outcome = replay_buffer(
            &mut self.backend,
            &mut exchange.committed,
            ReplayMode::DestroyOnly,
            self.default_pass_size,
        );
        exchange.committed_replayed = true;

        self.stats.buffers_flushed += 1;
        self.stats.add(outcome);
        tracing::debug!(
            "Flush replay: {} destroys executed, {} records skipped, {} completions released",
            outcome.executed,
            outcome.skipped,
            released
        );
        ExecuteStatus::Flushed(outcome)
    }

    fn replay_committed(&mut self, exchange: &mut Exchange) -> ReplayOutcome {
        let outcome = replay_buffer(
            &mut self.backend,
            &mut exchange.committed,
            ReplayMode::Full,
            self.default_pass_size,
        );
        exchange.committed_replayed = true;
        self.stats.buffers_replayed += 1;
        self.stats.add(outcome);
        outcome
    }
}

impl<B> std::fmt::Debug for Executor<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("default_pass_size", &self.default_pass_size)
            .field("stats", &self.stats)
            .field("flushing", &self.is_flushing())
            .finish_non_exhaustive()
    }
}
