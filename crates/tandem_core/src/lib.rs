//! # TANDEM Core
//!
//! A double-buffered command queue between an update thread that records GPU
//! work and a render thread that replays it:
//! - One frame of lookahead, never more
//! - Recording never locks and never blocks
//! - Destroyed resources keep their ids until no buffer can name them
//!
//! ## Architecture Rules
//!
//! 1. **Replay order is record order** - no reordering, no batching
//! 2. **Handles are ids** - allocated synchronously on the producer, initialized
//!    later on the consumer
//! 3. **Cleanup is deferred** - a destroyed id is released one full frame (plus
//!    a configurable margin) after the commit that recorded the destroy
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tandem_core::{BufferDesc, CommandQueue, NullBackend, QueueConfig, SlotAllocator};
//!
//! let mut queue = CommandQueue::new(NullBackend, Arc::new(SlotAllocator::new(64)), QueueConfig::default())?;
//!
//! let buffer = queue.recorder().make_buffer(BufferDesc { size: 64, ..BufferDesc::default() });
//! queue.recorder().update_buffer(buffer, vec![0u8; 64]);
//! queue.recorder().commit_commands()?;
//! queue.executor().execute();
//! # Ok::<(), tandem_core::QueueError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod backend;
pub mod cleanup;
pub mod command;
pub mod config;
pub mod desc;
pub mod error;
pub mod handle;
pub mod sync;

pub use backend::{GraphicsBackend, HandleAllocator, NullBackend, SlotAllocator, SlotCounts};
pub use cleanup::{CleanupAction, CleanupScheduler, Retire};
pub use command::{
    Command, CommandBuffer, CommandKind, Record, ReplayMode, ReplayOutcome, UniformBlock,
    MAX_UNIFORM_BLOCK_SIZE,
};
pub use config::QueueConfig;
pub use desc::{
    Bindings, BufferDesc, BufferKind, ImageContent, ImageDesc, IndexType, PassAction, PassDesc,
    PipelineDesc, PixelFormat, PrimitiveType, Rect, ShaderDesc, ShaderStage, ShaderStageDesc,
    Usage,
};
pub use error::{QueueError, QueueResult};
pub use handle::{BufferId, ImageId, PassId, PipelineId, ShaderId};
pub use sync::{CommandQueue, ExecuteStatus, Executor, Recorder, ReplayStats};
