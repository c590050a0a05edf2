//! # Recorder
//!
//! The producer half. Every recording method appends exactly one record to
//! the pending buffer and returns immediately; only
//! [`commit_commands`](Recorder::commit_commands) blocks.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use super::handoff::{Acquire, Release};
use super::queue::Shared;
use crate::backend::HandleAllocator;
use crate::cleanup::{CleanupFn, CleanupScheduler, Retire};
use crate::command::{Command, CommandBuffer, Record, UniformBlock};
use crate::config::QueueConfig;
use crate::desc::{
    Bindings, BufferDesc, ImageContent, ImageDesc, PassAction, PassDesc, PipelineDesc, Rect,
    ShaderDesc, ShaderStage,
};
use crate::error::{QueueError, QueueResult};
use crate::handle::{BufferId, ImageId, PassId, PipelineId, ShaderId};

/// Producer-side handle of a [`CommandQueue`](crate::CommandQueue).
///
/// There is exactly one recorder per queue and it is not `Clone`, so a
/// second producer can only exist behind a caller-side lock.
///
/// Dropping the recorder flushes the queue, as if
/// [`flush_commands`](Recorder::flush_commands) had been called.
pub struct Recorder {
    shared: Arc<Shared>,
    allocator: Arc<dyn HandleAllocator>,
    /// Buffer being filled; owned here, never shared while recording.
    pending: CommandBuffer,
    /// Cleanups scheduled this frame, moved into the shared list at commit.
    staged: CleanupScheduler,
    frame_index: u64,
    cleanup_extra_frames: u64,
    consumer_go: Acquire,
    producer_go: Release,
    flushed: bool,
}

impl Recorder {
    pub(crate) fn new(
        shared: Arc<Shared>,
        allocator: Arc<dyn HandleAllocator>,
        config: &QueueConfig,
        consumer_go: Acquire,
        producer_go: Release,
    ) -> Self {
        Self {
            shared,
            allocator,
            pending: CommandBuffer::with_capacity(config.initial_command_capacity),
            staged: CleanupScheduler::default(),
            frame_index: 0,
            cleanup_extra_frames: config.cleanup_extra_frames,
            consumer_go,
            producer_go,
            flushed: false,
        }
    }

    /// Frame being recorded. Starts at 0, advances by one per commit.
    #[inline]
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Records in the pending buffer.
    #[inline]
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Cleanups scheduled since the last commit.
    #[inline]
    #[must_use]
    pub fn staged_cleanups(&self) -> usize {
        self.staged.len()
    }

    /// The allocator `make_*` methods draw ids from.
    #[inline]
    #[must_use]
    pub fn allocator(&self) -> &Arc<dyn HandleAllocator> {
        &self.allocator
    }

    // =========================================================================
    // Generic recording
    // =========================================================================

    /// Appends a prebuilt command.
    ///
    /// Destroy commands schedule the release of their id exactly like the
    /// dedicated `destroy_*` methods. Ids in make commands must come from
    /// [`Recorder::allocator`].
    pub fn record(&mut self, command: Command) {
        self.push(Record::new(command));
    }

    /// Appends a prebuilt command and calls `on_release` once its buffer slot
    /// is reused (at the commit after next, during flush, or at teardown).
    pub fn record_with_completion(
        &mut self,
        command: Command,
        on_release: impl FnOnce() + Send + 'static,
    ) {
        self.push(Record::with_completion(command, Box::new(on_release)));
    }

    /// Runs `callback` once `1 + extra_frames` commits have passed, on the
    /// producer thread, during a commit. Fires at teardown at the latest.
    pub fn schedule_cleanup(&mut self, callback: impl FnOnce() + Send + 'static, extra_frames: u64) {
        self.staged
            .schedule(Box::new(callback), self.frame_index, extra_frames);
    }

    fn push(&mut self, record: Record) {
        if let Some(release) = self.release_for(&record.command) {
            let extra = self.cleanup_extra_frames;
            self.staged.schedule(release, self.frame_index, extra);
        }
        self.pending.push(record);
    }

    /// Id release action for destroy commands.
    fn release_for(&self, command: &Command) -> Option<CleanupFn> {
        if !command.kind().is_destroy() {
            return None;
        }
        let allocator = Arc::clone(&self.allocator);
        let release: CleanupFn = match *command {
            Command::DestroyBuffer { buffer } => Box::new(move || allocator.dealloc_buffer(buffer)),
            Command::DestroyImage { image } => Box::new(move || allocator.dealloc_image(image)),
            Command::DestroyShader { shader } => Box::new(move || allocator.dealloc_shader(shader)),
            Command::DestroyPipeline { pipeline } => {
                Box::new(move || allocator.dealloc_pipeline(pipeline))
            }
            Command::DestroyPass { pass } => Box::new(move || allocator.dealloc_pass(pass)),
            _ => return None,
        };
        Some(release)
    }

    // =========================================================================
    // One method per operation
    // =========================================================================

    /// Opens a named debug group.
    pub fn push_debug_group(&mut self, name: impl Into<String>) {
        self.record(Command::PushDebugGroup { name: name.into() });
    }

    /// Closes the innermost debug group.
    pub fn pop_debug_group(&mut self) {
        self.record(Command::PopDebugGroup);
    }

    /// Allocates a buffer id now and records its initialization.
    ///
    /// The id can be used by later records right away.
    pub fn make_buffer(&mut self, desc: BufferDesc) -> BufferId {
        let buffer = self.allocator.alloc_buffer();
        self.record(Command::MakeBuffer { buffer, desc });
        buffer
    }

    /// Allocates an image id now and records its initialization.
    pub fn make_image(&mut self, desc: ImageDesc) -> ImageId {
        let image = self.allocator.alloc_image();
        self.record(Command::MakeImage { image, desc });
        image
    }

    /// Allocates a shader id now and records its initialization.
    pub fn make_shader(&mut self, desc: ShaderDesc) -> ShaderId {
        let shader = self.allocator.alloc_shader();
        self.record(Command::MakeShader { shader, desc });
        shader
    }

    /// Allocates a pipeline id now and records its initialization.
    pub fn make_pipeline(&mut self, desc: PipelineDesc) -> PipelineId {
        let pipeline = self.allocator.alloc_pipeline();
        self.record(Command::MakePipeline { pipeline, desc });
        pipeline
    }

    /// Allocates a pass id now and records its initialization.
    pub fn make_pass(&mut self, desc: PassDesc) -> PassId {
        let pass = self.allocator.alloc_pass();
        self.record(Command::MakePass { pass, desc });
        pass
    }

    /// Records the teardown of a buffer. The id is released a frame later.
    pub fn destroy_buffer(&mut self, buffer: BufferId) {
        self.record(Command::DestroyBuffer { buffer });
    }

    /// Records the teardown of an image. The id is released a frame later.
    pub fn destroy_image(&mut self, image: ImageId) {
        self.record(Command::DestroyImage { image });
    }

    /// Records the teardown of a shader. The id is released a frame later.
    pub fn destroy_shader(&mut self, shader: ShaderId) {
        self.record(Command::DestroyShader { shader });
    }

    /// Records the teardown of a pipeline. The id is released a frame later.
    pub fn destroy_pipeline(&mut self, pipeline: PipelineId) {
        self.record(Command::DestroyPipeline { pipeline });
    }

    /// Records the teardown of a pass. The id is released a frame later.
    pub fn destroy_pass(&mut self, pass: PassId) {
        self.record(Command::DestroyPass { pass });
    }

    /// Overwrites a buffer's contents.
    pub fn update_buffer(&mut self, buffer: BufferId, data: impl Into<Arc<[u8]>>) {
        self.record(Command::UpdateBuffer {
            buffer,
            data: data.into(),
        });
    }

    /// Appends to a buffer's contents.
    pub fn append_buffer(&mut self, buffer: BufferId, data: impl Into<Arc<[u8]>>) {
        self.record(Command::AppendBuffer {
            buffer,
            data: data.into(),
        });
    }

    /// Overwrites an image's contents.
    pub fn update_image(&mut self, image: ImageId, content: ImageContent) {
        self.record(Command::UpdateImage { image, content });
    }

    /// Begins the default framebuffer pass.
    pub fn begin_default_pass(&mut self, action: PassAction) {
        self.record(Command::BeginDefaultPass { action });
    }

    /// Begins an offscreen pass.
    pub fn begin_pass(&mut self, pass: PassId, action: PassAction) {
        self.record(Command::BeginPass { pass, action });
    }

    /// Sets the viewport.
    pub fn apply_viewport(&mut self, rect: Rect) {
        self.record(Command::ApplyViewport(rect));
    }

    /// Sets the scissor rectangle.
    pub fn apply_scissor_rect(&mut self, rect: Rect) {
        self.record(Command::ApplyScissorRect(rect));
    }

    /// Binds a pipeline.
    pub fn apply_pipeline(&mut self, pipeline: PipelineId) {
        self.record(Command::ApplyPipeline { pipeline });
    }

    /// Binds buffers and images.
    pub fn apply_bindings(&mut self, bindings: Bindings) {
        self.record(Command::ApplyBindings(bindings));
    }

    /// Uploads a uniform block, copied inline into the record.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::UniformBlockTooLarge`] when `data` exceeds
    /// [`MAX_UNIFORM_BLOCK_SIZE`](crate::MAX_UNIFORM_BLOCK_SIZE). Nothing is
    /// recorded in that case.
    pub fn apply_uniforms(&mut self, stage: ShaderStage, slot: u32, data: &[u8]) -> QueueResult<()> {
        let data = UniformBlock::new(data).map_err(|err| {
            tracing::warn!("Rejected uniform upload for slot {}: {}", slot, err);
            err
        })?;
        self.record(Command::ApplyUniforms { stage, slot, data });
        Ok(())
    }

    /// Draws with the current state.
    pub fn draw(&mut self, base_element: u32, element_count: u32, instance_count: u32) {
        self.record(Command::Draw {
            base_element,
            element_count,
            instance_count,
        });
    }

    /// Ends the current pass.
    pub fn end_pass(&mut self) {
        self.record(Command::EndPass);
    }

    /// Records the backend's end-of-frame commit.
    pub fn end_frame(&mut self) {
        self.record(Command::Commit);
    }

    /// Records a closure to run on the consumer thread at this point of the
    /// replay.
    pub fn custom(&mut self, callback: impl FnMut() + Send + 'static) {
        self.record(Command::Custom(Box::new(callback)));
    }

    // =========================================================================
    // Handoff
    // =========================================================================

    /// Hands the pending buffer to the executor.
    ///
    /// Blocks until the executor has finished replaying the previous commit.
    /// Then, under the lock: clears the drained buffer (firing its
    /// completions), runs every cleanup due at the current frame, swaps the
    /// buffers and advances the frame index.
    ///
    /// Returns the index of the frame that was handed over.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Disconnected`] if the executor has been dropped.
    /// The pending buffer is kept in that case.
    pub fn commit_commands(&mut self) -> QueueResult<u64> {
        if self.consumer_go.acquire().is_err() {
            tracing::warn!("Commit of frame {} dropped: executor is gone", self.frame_index);
            return Err(QueueError::Disconnected);
        }

        let frame = self.frame_index;
        let records = self.pending.len();
        let (released, fired, next_due) = {
            let mut exchange = self.shared.exchange.lock();
            let released = exchange.committed.clear();
            exchange.cleanups.append(&mut self.staged);
            let fired = exchange.cleanups.process(Retire::Through(frame));
            std::mem::swap(&mut self.pending, &mut exchange.committed);
            exchange.committed_replayed = false;
            (released, fired, exchange.cleanups.next_due())
        };
        self.frame_index += 1;

        tracing::trace!(
            "Committed frame {}: {} records, {} completions released, {} cleanups fired, next due {:?}",
            frame,
            records,
            released,
            fired,
            next_due
        );

        if self.producer_go.release().is_err() {
            tracing::warn!("Frame {} committed but the executor is gone", frame);
            return Err(QueueError::Disconnected);
        }
        Ok(frame)
    }

    /// Enters flush mode. Irreversible: the recorder is consumed.
    ///
    /// Never blocks. The pending buffer is handed over as is; from now on
    /// the executor stops waiting for commits. The last committed buffer is
    /// still replayed in full if the executor has not reached it yet. The
    /// handed-over buffer is replayed destroy records only, after which the
    /// executor reports [`ExecuteStatus::Drained`](crate::ExecuteStatus::Drained).
    pub fn flush_commands(mut self) {
        self.begin_flush();
    }

    fn begin_flush(&mut self) {
        if self.flushed {
            return;
        }
        self.flushed = true;

        let records = self.pending.len();
        let staged = self.staged.len();
        {
            let mut exchange = self.shared.exchange.lock();
            let last = std::mem::take(&mut self.pending);
            exchange.parked = Some(last);
            exchange.cleanups.append(&mut self.staged);
            self.shared.flushing.store(true, Ordering::Release);
        }

        tracing::debug!(
            "Flushing at frame {}: {} pending records, {} cleanups staged",
            self.frame_index,
            records,
            staged
        );

        // Wake an executor blocked on the next commit.
        let _ = self.producer_go.release();
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        self.begin_flush();
    }
}

impl std::fmt::Debug for Recorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recorder")
            .field("frame_index", &self.frame_index)
            .field("pending", &self.pending.len())
            .field("staged_cleanups", &self.staged.len())
            .field("flushed", &self.flushed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::backend::{HandleAllocator, NullBackend, SlotAllocator};
    use crate::config::QueueConfig;
    use crate::desc::BufferDesc;
    use crate::sync::CommandQueue;

    fn queue() -> CommandQueue<NullBackend> {
        CommandQueue::new(NullBackend, Arc::new(SlotAllocator::new(16)), QueueConfig::default())
            .unwrap()
    }

    #[test]
    fn test_destroy_stages_release() {
        let mut queue = queue();
        let recorder = queue.recorder();

        let buffer = recorder.make_buffer(BufferDesc::default());
        assert_eq!(recorder.staged_cleanups(), 0);
        recorder.destroy_buffer(buffer);
        assert_eq!(recorder.staged_cleanups(), 1);
        assert_eq!(recorder.pending_len(), 2);

        recorder.commit_commands().unwrap();
        assert_eq!(recorder.staged_cleanups(), 0);
        assert_eq!(recorder.pending_len(), 0);
        assert_eq!(recorder.frame_index(), 1);
    }

    #[test]
    fn test_make_allocates_from_shared_allocator() {
        let allocator = Arc::new(SlotAllocator::new(4));
        let shared = Arc::clone(&allocator) as Arc<dyn HandleAllocator>;
        let mut queue = CommandQueue::new(NullBackend, shared, QueueConfig::default()).unwrap();

        queue.recorder().make_buffer(BufferDesc::default());
        queue.recorder().make_buffer(BufferDesc::default());
        assert_eq!(allocator.live().buffers, 2);
    }

    #[test]
    fn test_debug_shows_frame() {
        let mut queue = queue();
        let text = format!("{:?}", queue.recorder());
        assert!(text.contains("frame_index: 0"));
    }
}
