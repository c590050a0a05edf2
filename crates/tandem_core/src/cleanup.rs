//! # Frame-Deferred Cleanup
//!
//! A destroyed resource may still be named by the buffer the consumer is
//! replaying, so its id must not go back to the allocator right away.
//!
//! ```text
//! frame N   : producer records DestroyBuffer(b), schedules dealloc(b) due N+1
//! commit N  : process(N)   -> not due; buffer N handed to the consumer
//! execute   : consumer replays buffer N, uninit(b)
//! commit N+1: process(N+1) -> dealloc(b) fires; buffer N is fully drained
//! ```
//!
//! Actions fire exactly once: each is a `FnOnce` that is moved out of the
//! list before it runs.

use std::fmt;

/// Deferred work handed to the scheduler.
pub type CleanupFn = Box<dyn FnOnce() + Send>;

/// Which actions a [`CleanupScheduler::process`] pass retires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Retire {
    /// Every action due at or before this frame.
    Through(u64),
    /// Everything, regardless of due frame. Teardown only.
    All,
}

impl Retire {
    #[inline]
    fn covers(self, due_frame: u64) -> bool {
        match self {
            Self::Through(frame) => due_frame <= frame,
            Self::All => true,
        }
    }
}

/// A cleanup callback and the frame from which it may run.
pub struct CleanupAction {
    callback: CleanupFn,
    due_frame: u64,
}

impl CleanupAction {
    /// Action due `1 + extra_frames` frames after `current_frame`.
    #[must_use]
    pub fn new(callback: CleanupFn, current_frame: u64, extra_frames: u64) -> Self {
        Self {
            callback,
            due_frame: current_frame.saturating_add(1).saturating_add(extra_frames),
        }
    }

    /// First frame at which the action may fire.
    #[inline]
    #[must_use]
    pub const fn due_frame(&self) -> u64 {
        self.due_frame
    }
}

impl fmt::Debug for CleanupAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CleanupAction")
            .field("due_frame", &self.due_frame)
            .finish_non_exhaustive()
    }
}

/// Ordered list of pending cleanup actions.
#[derive(Debug, Default)]
pub struct CleanupScheduler {
    actions: Vec<CleanupAction>,
}

impl CleanupScheduler {
    /// Creates a scheduler with room for `capacity` actions.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            actions: Vec::with_capacity(capacity),
        }
    }

    /// Schedules `callback` to fire at `current_frame + 1 + extra_frames`.
    pub fn schedule(&mut self, callback: CleanupFn, current_frame: u64, extra_frames: u64) {
        self.actions
            .push(CleanupAction::new(callback, current_frame, extra_frames));
    }

    /// Moves every action of `other` to the back of this list, keeping
    /// their order. `other` is left empty.
    pub fn append(&mut self, other: &mut CleanupScheduler) {
        self.actions.append(&mut other.actions);
    }

    /// Fires every action covered by `retire`, in insertion order, and
    /// removes it. Returns how many fired.
    pub fn process(&mut self, retire: Retire) -> usize {
        let mut fired = 0;
        let mut kept = Vec::with_capacity(self.actions.len());

        for action in self.actions.drain(..) {
            if retire.covers(action.due_frame) {
                (action.callback)();
                fired += 1;
            } else {
                kept.push(action);
            }
        }

        self.actions = kept;
        fired
    }

    /// Number of actions still waiting.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether no action is waiting.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Earliest due frame among waiting actions.
    #[must_use]
    pub fn next_due(&self) -> Option<u64> {
        self.actions.iter().map(CleanupAction::due_frame).min()
    }
}
