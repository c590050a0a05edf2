//! # Producer/Consumer Handoff
//!
//! ## The Problem
//!
//! ```text
//! Update thread:  RECORD frame N+1
//! Render thread:  REPLAY frame N
//!
//! One shared list:          RACE CONDITION
//! One list behind a lock:   the update thread stalls for a whole replay
//! ```
//!
//! ## The Solution: Double Buffering With a Strict Ping-Pong
//!
//! ```text
//!            Recorder (producer)                 Executor (consumer)
//!            ───────────────────                 ───────────────────
//!  frame N   record into pending                 take producer_go ...blocked
//!  commit    take consumer_go
//!            lock: clear drained buffer,
//!                  fire due cleanups,
//!                  swap pending <-> committed
//!            give producer_go  ───────────────>  wakes
//!  frame N+1 record into pending                 lock: replay committed
//!  commit    take consumer_go ...blocked         give consumer_go
//!            <─────────────────────────────────
//! ```
//!
//! The recorder owns the pending buffer outright, so recording never locks.
//! The committed buffer, the cleanup list and the flush state sit behind
//! one mutex. The two signals give ordering, the mutex gives exclusivity of
//! the swap step. The producer can never be more than one frame ahead.

mod executor;
mod handoff;
mod queue;
mod recorder;

pub use executor::{ExecuteStatus, Executor, ReplayStats};
pub use queue::CommandQueue;
pub use recorder::Recorder;
