//! # Command Records
//!
//! One [`Command`] per GPU operation. The enum is closed: every operation
//! the backend understands has exactly one variant, and the payload of a
//! variant can only be read through a match on that variant.
//!
//! ```text
//! Recorder ──push──> [Record][Record][Record]... ──replay──> GraphicsBackend
//!                     (CommandBuffer, insertion order = replay order)
//! ```

mod buffer;
mod replay;

pub use buffer::{CommandBuffer, Record};
pub use replay::{replay_buffer, ReplayMode, ReplayOutcome};

use std::fmt;
use std::sync::Arc;

use crate::desc::{
    BufferDesc, Bindings, ImageContent, ImageDesc, PassAction, PassDesc, PipelineDesc, Rect,
    ShaderDesc, ShaderStage,
};
use crate::error::{QueueError, QueueResult};
use crate::handle::{BufferId, ImageId, PassId, PipelineId, ShaderId};

/// Largest uniform payload a single record can carry inline.
pub const MAX_UNIFORM_BLOCK_SIZE: usize = 256;

/// Closure replayed by a [`Command::Custom`] record on the consumer thread.
pub type CustomFn = Box<dyn FnMut() + Send>;

/// Notification fired once when a record's buffer slot is released.
pub type CompletionFn = Box<dyn FnOnce() + Send>;

/// Discriminant of a [`Command`], without the payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// Open a debug group.
    PushDebugGroup,
    /// Close the innermost debug group.
    PopDebugGroup,
    /// Initialize a buffer.
    MakeBuffer,
    /// Initialize an image.
    MakeImage,
    /// Initialize a shader.
    MakeShader,
    /// Initialize a pipeline.
    MakePipeline,
    /// Initialize a pass.
    MakePass,
    /// Tear down a buffer.
    DestroyBuffer,
    /// Tear down an image.
    DestroyImage,
    /// Tear down a shader.
    DestroyShader,
    /// Tear down a pipeline.
    DestroyPipeline,
    /// Tear down a pass.
    DestroyPass,
    /// Overwrite buffer contents.
    UpdateBuffer,
    /// Append to buffer contents.
    AppendBuffer,
    /// Overwrite image contents.
    UpdateImage,
    /// Begin rendering to the default framebuffer.
    BeginDefaultPass,
    /// Begin rendering to an offscreen pass.
    BeginPass,
    /// Set the viewport.
    ApplyViewport,
    /// Set the scissor rectangle.
    ApplyScissorRect,
    /// Bind a pipeline.
    ApplyPipeline,
    /// Bind buffers and images.
    ApplyBindings,
    /// Upload a uniform block.
    ApplyUniforms,
    /// Issue a draw.
    Draw,
    /// End the current pass.
    EndPass,
    /// End the frame on the backend.
    Commit,
    /// Run a caller-supplied closure.
    Custom,
}

impl CommandKind {
    /// Returns true for the five destroy kinds, the only ones replayed while
    /// the queue is flushing.
    #[inline]
    #[must_use]
    pub const fn is_destroy(self) -> bool {
        matches!(
            self,
            Self::DestroyBuffer
                | Self::DestroyImage
                | Self::DestroyShader
                | Self::DestroyPipeline
                | Self::DestroyPass
        )
    }

    /// Returns true for the five make kinds.
    #[inline]
    #[must_use]
    pub const fn is_make(self) -> bool {
        matches!(
            self,
            Self::MakeBuffer | Self::MakeImage | Self::MakeShader | Self::MakePipeline | Self::MakePass
        )
    }
}

/// Uniform bytes stored inline in the record.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct UniformBlock {
    bytes: [u8; MAX_UNIFORM_BLOCK_SIZE],
    len: usize,
}

impl UniformBlock {
    /// Copies `data` into a new block.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::UniformBlockTooLarge`] if `data` is longer than
    /// [`MAX_UNIFORM_BLOCK_SIZE`]. Nothing is truncated.
    pub fn new(data: &[u8]) -> QueueResult<Self> {
        if data.len() > MAX_UNIFORM_BLOCK_SIZE {
            return Err(QueueError::UniformBlockTooLarge {
                len: data.len(),
                capacity: MAX_UNIFORM_BLOCK_SIZE,
            });
        }
        let mut bytes = [0u8; MAX_UNIFORM_BLOCK_SIZE];
        bytes[..data.len()].copy_from_slice(data);
        Ok(Self {
            bytes,
            len: data.len(),
        })
    }

    /// The stored bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Number of stored bytes.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the block holds no bytes.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl fmt::Debug for UniformBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UniformBlock").field("len", &self.len).finish()
    }
}

/// A GPU operation and its arguments.
pub enum Command {
    /// Open a named debug group.
    PushDebugGroup {
        /// Group name shown in GPU debuggers.
        name: String,
    },
    /// Close the innermost debug group.
    PopDebugGroup,
    /// Initialize an already allocated buffer handle.
    MakeBuffer {
        /// Handle allocated at record time.
        buffer: BufferId,
        /// Creation parameters.
        desc: BufferDesc,
    },
    /// Initialize an already allocated image handle.
    MakeImage {
        /// Handle allocated at record time.
        image: ImageId,
        /// Creation parameters.
        desc: ImageDesc,
    },
    /// Initialize an already allocated shader handle.
    MakeShader {
        /// Handle allocated at record time.
        shader: ShaderId,
        /// Creation parameters.
        desc: ShaderDesc,
    },
    /// Initialize an already allocated pipeline handle.
    MakePipeline {
        /// Handle allocated at record time.
        pipeline: PipelineId,
        /// Creation parameters.
        desc: PipelineDesc,
    },
    /// Initialize an already allocated pass handle.
    MakePass {
        /// Handle allocated at record time.
        pass: PassId,
        /// Creation parameters.
        desc: PassDesc,
    },
    /// Release the backend side of a buffer.
    DestroyBuffer {
        /// Buffer to tear down.
        buffer: BufferId,
    },
    /// Release the backend side of an image.
    DestroyImage {
        /// Image to tear down.
        image: ImageId,
    },
    /// Release the backend side of a shader.
    DestroyShader {
        /// Shader to tear down.
        shader: ShaderId,
    },
    /// Release the backend side of a pipeline.
    DestroyPipeline {
        /// Pipeline to tear down.
        pipeline: PipelineId,
    },
    /// Release the backend side of a pass.
    DestroyPass {
        /// Pass to tear down.
        pass: PassId,
    },
    /// Overwrite a dynamic buffer.
    UpdateBuffer {
        /// Target buffer.
        buffer: BufferId,
        /// New contents.
        data: Arc<[u8]>,
    },
    /// Append to a stream buffer.
    AppendBuffer {
        /// Target buffer.
        buffer: BufferId,
        /// Bytes to append.
        data: Arc<[u8]>,
    },
    /// Overwrite a dynamic image.
    UpdateImage {
        /// Target image.
        image: ImageId,
        /// New contents.
        content: ImageContent,
    },
    /// Begin the default pass; the size comes from the executor.
    BeginDefaultPass {
        /// Load/clear behavior.
        action: PassAction,
    },
    /// Begin an offscreen pass.
    BeginPass {
        /// Pass to render into.
        pass: PassId,
        /// Load/clear behavior.
        action: PassAction,
    },
    /// Set the viewport.
    ApplyViewport(Rect),
    /// Set the scissor rectangle.
    ApplyScissorRect(Rect),
    /// Bind a pipeline.
    ApplyPipeline {
        /// Pipeline to bind.
        pipeline: PipelineId,
    },
    /// Bind buffers and images.
    ApplyBindings(Bindings),
    /// Upload a uniform block.
    ApplyUniforms {
        /// Target stage.
        stage: ShaderStage,
        /// Uniform block slot.
        slot: u32,
        /// Inline payload.
        data: UniformBlock,
    },
    /// Issue a draw with the current state.
    Draw {
        /// First element.
        base_element: u32,
        /// Element count.
        element_count: u32,
        /// Instance count.
        instance_count: u32,
    },
    /// End the current pass.
    EndPass,
    /// End the frame on the backend.
    Commit,
    /// Run a closure on the consumer thread.
    Custom(CustomFn),
}

impl Command {
    /// Returns the payload-free kind of this command.
    #[must_use]
    pub const fn kind(&self) -> CommandKind {
        match self {
            Self::PushDebugGroup { .. } => CommandKind::PushDebugGroup,
            Self::PopDebugGroup => CommandKind::PopDebugGroup,
            Self::MakeBuffer { .. } => CommandKind::MakeBuffer,
            Self::MakeImage { .. } => CommandKind::MakeImage,
            Self::MakeShader { .. } => CommandKind::MakeShader,
            Self::MakePipeline { .. } => CommandKind::MakePipeline,
            Self::MakePass { .. } => CommandKind::MakePass,
            Self::DestroyBuffer { .. } => CommandKind::DestroyBuffer,
            Self::DestroyImage { .. } => CommandKind::DestroyImage,
            Self::DestroyShader { .. } => CommandKind::DestroyShader,
            Self::DestroyPipeline { .. } => CommandKind::DestroyPipeline,
            Self::DestroyPass { .. } => CommandKind::DestroyPass,
            Self::UpdateBuffer { .. } => CommandKind::UpdateBuffer,
            Self::AppendBuffer { .. } => CommandKind::AppendBuffer,
            Self::UpdateImage { .. } => CommandKind::UpdateImage,
            Self::BeginDefaultPass { .. } => CommandKind::BeginDefaultPass,
            Self::BeginPass { .. } => CommandKind::BeginPass,
            Self::ApplyViewport(_) => CommandKind::ApplyViewport,
            Self::ApplyScissorRect(_) => CommandKind::ApplyScissorRect,
            Self::ApplyPipeline { .. } => CommandKind::ApplyPipeline,
            Self::ApplyBindings(_) => CommandKind::ApplyBindings,
            Self::ApplyUniforms { .. } => CommandKind::ApplyUniforms,
            Self::Draw { .. } => CommandKind::Draw,
            Self::EndPass => CommandKind::EndPass,
            Self::Commit => CommandKind::Commit,
            Self::Custom(_) => CommandKind::Custom,
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PushDebugGroup { name } => f.debug_struct("PushDebugGroup").field("name", name).finish(),
            Self::MakeBuffer { buffer, .. } => f.debug_tuple("MakeBuffer").field(buffer).finish(),
            Self::MakeImage { image, .. } => f.debug_tuple("MakeImage").field(image).finish(),
            Self::MakeShader { shader, .. } => f.debug_tuple("MakeShader").field(shader).finish(),
            Self::MakePipeline { pipeline, .. } => f.debug_tuple("MakePipeline").field(pipeline).finish(),
            Self::MakePass { pass, .. } => f.debug_tuple("MakePass").field(pass).finish(),
            Self::DestroyBuffer { buffer } => f.debug_tuple("DestroyBuffer").field(buffer).finish(),
            Self::DestroyImage { image } => f.debug_tuple("DestroyImage").field(image).finish(),
            Self::DestroyShader { shader } => f.debug_tuple("DestroyShader").field(shader).finish(),
            Self::DestroyPipeline { pipeline } => f.debug_tuple("DestroyPipeline").field(pipeline).finish(),
            Self::DestroyPass { pass } => f.debug_tuple("DestroyPass").field(pass).finish(),
            Self::UpdateBuffer { buffer, data } => f
                .debug_struct("UpdateBuffer")
                .field("buffer", buffer)
                .field("data_len", &data.len())
                .finish(),
            Self::AppendBuffer { buffer, data } => f
                .debug_struct("AppendBuffer")
                .field("buffer", buffer)
                .field("data_len", &data.len())
                .finish(),
            Self::UpdateImage { image, content } => f
                .debug_struct("UpdateImage")
                .field("image", image)
                .field("mips", &content.mips.len())
                .finish(),
            Self::BeginPass { pass, .. } => f.debug_tuple("BeginPass").field(pass).finish(),
            Self::ApplyViewport(rect) => f.debug_tuple("ApplyViewport").field(rect).finish(),
            Self::ApplyScissorRect(rect) => f.debug_tuple("ApplyScissorRect").field(rect).finish(),
            Self::ApplyPipeline { pipeline } => f.debug_tuple("ApplyPipeline").field(pipeline).finish(),
            Self::ApplyUniforms { stage, slot, data } => f
                .debug_struct("ApplyUniforms")
                .field("stage", stage)
                .field("slot", slot)
                .field("len", &data.len())
                .finish(),
            Self::Draw {
                base_element,
                element_count,
                instance_count,
            } => f
                .debug_struct("Draw")
                .field("base_element", base_element)
                .field("element_count", element_count)
                .field("instance_count", instance_count)
                .finish(),
            other => write!(f, "{:?}", other.kind()),
        }
    }
}
