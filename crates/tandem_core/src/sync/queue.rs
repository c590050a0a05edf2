//! # Command Queue
//!
//! Builds the shared state and splits it into the producer half
//! ([`Recorder`]) and the consumer half ([`Executor`]).

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use parking_lot::Mutex;

use super::executor::Executor;
use super::handoff;
use super::recorder::Recorder;
use crate::backend::{GraphicsBackend, HandleAllocator};
use crate::cleanup::{CleanupScheduler, Retire};
use crate::command::CommandBuffer;
use crate::config::QueueConfig;
use crate::error::QueueResult;

/// State touched by both threads, only under the mutex.
pub(crate) struct Exchange {
    /// Buffer owned by the consumer side.
    pub(crate) committed: CommandBuffer,
    /// Whether the consumer has replayed `committed` since the last swap.
    pub(crate) committed_replayed: bool,
    /// Last pending buffer handed over by a flush, waiting for the consumer.
    pub(crate) parked: Option<CommandBuffer>,
    /// Deferred cleanups.
    pub(crate) cleanups: CleanupScheduler,
}

/// Shared between the recorder and the executor.
pub(crate) struct Shared {
    pub(crate) exchange: Mutex<Exchange>,
    /// Set once, under the exchange lock, when the recorder flushes.
    pub(crate) flushing: AtomicBool,
}

impl Drop for Shared {
    fn drop(&mut self) {
        // Both halves are gone: nothing can reference any resource any more.
        let exchange = self.exchange.get_mut();
        let mut released = exchange.committed.clear();
        if let Some(mut parked) = exchange.parked.take() {
            released += parked.clear();
        }
        let fired = exchange.cleanups.process(Retire::All);
        tracing::debug!(
            "Queue teardown: {} completions released, {} cleanups fired",
            released,
            fired
        );
    }
}

/// A double-buffered command queue, not yet split across threads.
///
/// Both halves can be driven from one thread (record, commit, execute,
/// repeat), which is what most tests do. For real use, [`split`] it and move
/// the [`Executor`] to the render thread.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use tandem_core::{CommandQueue, NullBackend, PassAction, QueueConfig, SlotAllocator};
///
/// let queue = CommandQueue::new(NullBackend, Arc::new(SlotAllocator::new(64)), QueueConfig::default())?;
/// let (mut recorder, mut executor) = queue.split();
///
/// let render = std::thread::spawn(move || {
///     executor.drain();
/// });
///
/// recorder.begin_default_pass(PassAction::clear([0.0, 0.0, 0.0, 1.0]));
/// recorder.end_pass();
/// recorder.end_frame();
/// recorder.commit_commands()?;
/// recorder.flush_commands();
///
/// render.join().unwrap();
/// # Ok::<(), tandem_core::QueueError>(())
/// ```
///
/// [`split`]: CommandQueue::split
pub struct CommandQueue<B> {
    recorder: Recorder,
    executor: Executor<B>,
}

impl<B: GraphicsBackend> CommandQueue<B> {
    /// Creates a queue replaying into `backend` and allocating ids from
    /// `allocator`.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::InvalidConfig`](crate::QueueError::InvalidConfig)
    /// if `config` fails validation.
    pub fn new(
        backend: B,
        allocator: Arc<dyn HandleAllocator>,
        config: QueueConfig,
    ) -> QueueResult<Self> {
        config.validate()?;

        let shared = Arc::new(Shared {
            exchange: Mutex::new(Exchange {
                committed: CommandBuffer::with_capacity(config.initial_command_capacity),
                // The empty buffer counts as drained.
                committed_replayed: true,
                parked: None,
                cleanups: CleanupScheduler::with_capacity(config.initial_cleanup_capacity),
            }),
            flushing: AtomicBool::new(false),
        });

        // The consumer starts out "done" so the first commit goes through.
        let (consumer_go_tx, consumer_go_rx) = handoff::signal(1);
        let (producer_go_tx, producer_go_rx) = handoff::signal(0);

        tracing::debug!(
            "Command queue created: {} records per buffer, {} extra cleanup frames",
            config.initial_command_capacity,
            config.cleanup_extra_frames
        );

        Ok(Self {
            recorder: Recorder::new(
                Arc::clone(&shared),
                allocator,
                &config,
                consumer_go_rx,
                producer_go_tx,
            ),
            executor: Executor::new(shared, backend, &config, producer_go_rx, consumer_go_tx),
        })
    }
}

impl<B> CommandQueue<B> {
    /// Producer half.
    #[inline]
    pub fn recorder(&mut self) -> &mut Recorder {
        &mut self.recorder
    }

    /// Consumer half.
    #[inline]
    pub fn executor(&mut self) -> &mut Executor<B> {
        &mut self.executor
    }

    /// Splits into the two halves so they can live on different threads.
    #[must_use]
    pub fn split(self) -> (Recorder, Executor<B>) {
        (self.recorder, self.executor)
    }
}
