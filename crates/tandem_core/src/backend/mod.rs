//! # Backend Boundary
//!
//! The queue talks to the graphics API through two traits:
//!
//! - [`GraphicsBackend`]: everything that touches GPU state. Owned by the
//!   [`Executor`](crate::Executor) and only ever called on the consumer
//!   thread, one call per replayed record.
//! - [`HandleAllocator`]: hands out and takes back resource ids. Called on
//!   the producer thread so `make_*` can return a usable handle immediately.
//!
//! Backend calls are synchronous and infallible from the queue's point of
//! view. Errors are the backend's own business.

mod null;
mod slot_allocator;

pub use null::NullBackend;
pub use slot_allocator::{SlotAllocator, SlotCounts};

use crate::desc::{
    Bindings, BufferDesc, ImageContent, ImageDesc, PassAction, PassDesc, PipelineDesc, Rect,
    ShaderDesc, ShaderStage,
};
use crate::handle::{BufferId, ImageId, PassId, PipelineId, ShaderId};

/// Consumer-side graphics entry points.
pub trait GraphicsBackend {
    /// Opens a named debug group.
    fn push_debug_group(&mut self, name: &str);
    /// Closes the innermost debug group.
    fn pop_debug_group(&mut self);

    /// Creates the GPU side of an allocated buffer.
    fn init_buffer(&mut self, buffer: BufferId, desc: &BufferDesc);
    /// Creates the GPU side of an allocated image.
    fn init_image(&mut self, image: ImageId, desc: &ImageDesc);
    /// Creates the GPU side of an allocated shader.
    fn init_shader(&mut self, shader: ShaderId, desc: &ShaderDesc);
    /// Creates the GPU side of an allocated pipeline.
    fn init_pipeline(&mut self, pipeline: PipelineId, desc: &PipelineDesc);
    /// Creates the GPU side of an allocated pass.
    fn init_pass(&mut self, pass: PassId, desc: &PassDesc);

    /// Releases the GPU side of a buffer; the id stays allocated.
    fn uninit_buffer(&mut self, buffer: BufferId);
    /// Releases the GPU side of an image; the id stays allocated.
    fn uninit_image(&mut self, image: ImageId);
    /// Releases the GPU side of a shader; the id stays allocated.
    fn uninit_shader(&mut self, shader: ShaderId);
    /// Releases the GPU side of a pipeline; the id stays allocated.
    fn uninit_pipeline(&mut self, pipeline: PipelineId);
    /// Releases the GPU side of a pass; the id stays allocated.
    fn uninit_pass(&mut self, pass: PassId);

    /// Overwrites a buffer.
    fn update_buffer(&mut self, buffer: BufferId, data: &[u8]);
    /// Appends to a buffer.
    fn append_buffer(&mut self, buffer: BufferId, data: &[u8]);
    /// Overwrites an image.
    fn update_image(&mut self, image: ImageId, content: &ImageContent);

    /// Begins the default framebuffer pass.
    fn begin_default_pass(&mut self, action: &PassAction, width: u32, height: u32);
    /// Begins an offscreen pass.
    fn begin_pass(&mut self, pass: PassId, action: &PassAction);
    /// Sets the viewport.
    fn apply_viewport(&mut self, rect: Rect);
    /// Sets the scissor rectangle.
    fn apply_scissor_rect(&mut self, rect: Rect);
    /// Binds a pipeline.
    fn apply_pipeline(&mut self, pipeline: PipelineId);
    /// Binds buffers and images.
    fn apply_bindings(&mut self, bindings: &Bindings);
    /// Uploads a uniform block.
    fn apply_uniforms(&mut self, stage: ShaderStage, slot: u32, data: &[u8]);
    /// Draws with the current state.
    fn draw(&mut self, base_element: u32, element_count: u32, instance_count: u32);
    /// Ends the current pass.
    fn end_pass(&mut self);
    /// Ends the frame.
    fn commit(&mut self);
}

/// Producer-side id bookkeeping.
///
/// `alloc_*` runs when a `make_*` command is recorded. `dealloc_*` runs from a
/// cleanup action once no in-flight buffer can name the id any more.
pub trait HandleAllocator: Send + Sync {
    /// Reserves a buffer id.
    fn alloc_buffer(&self) -> BufferId;
    /// Reserves an image id.
    fn alloc_image(&self) -> ImageId;
    /// Reserves a shader id.
    fn alloc_shader(&self) -> ShaderId;
    /// Reserves a pipeline id.
    fn alloc_pipeline(&self) -> PipelineId;
    /// Reserves a pass id.
    fn alloc_pass(&self) -> PassId;

    /// Returns a buffer id to the pool.
    fn dealloc_buffer(&self, buffer: BufferId);
    /// Returns an image id to the pool.
    fn dealloc_image(&self, image: ImageId);
    /// Returns a shader id to the pool.
    fn dealloc_shader(&self, shader: ShaderId);
    /// Returns a pipeline id to the pool.
    fn dealloc_pipeline(&self, pipeline: PipelineId);
    /// Returns a pass id to the pool.
    fn dealloc_pass(&self, pass: PassId);
}
