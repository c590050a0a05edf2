//! # Resource Descriptors and Per-Draw State
//!
//! Plain data handed to the backend verbatim. The queue never inspects these
//! beyond cloning them into a record.
//!
//! Byte payloads are `Arc<[u8]>`: the record shares ownership of the bytes,
//! so the memory stays alive until the consumer has replayed it and the
//! buffer slot is reused, whatever the producer does with its own copy.

use std::sync::Arc;

use crate::handle::{BufferId, ImageId, ShaderId};

/// Maximum vertex buffers bound by one [`Bindings`].
pub const MAX_VERTEX_BUFFERS: usize = 8;

/// Maximum images bound per shader stage by one [`Bindings`].
pub const MAX_STAGE_IMAGES: usize = 12;

/// Maximum color attachments of an offscreen pass.
pub const MAX_COLOR_ATTACHMENTS: usize = 4;

/// How often a resource's contents change.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Usage {
    /// Set once at creation, never updated.
    #[default]
    Immutable,
    /// Updated occasionally, at most once per frame.
    Dynamic,
    /// Rewritten every frame.
    Stream,
}

/// What a buffer is bound as.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BufferKind {
    /// Vertex data.
    #[default]
    Vertex,
    /// Index data.
    Index,
}

/// Describes a buffer to initialize.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BufferDesc {
    /// Size in bytes.
    pub size: usize,
    /// Vertex or index buffer.
    pub kind: BufferKind,
    /// Update frequency.
    pub usage: Usage,
    /// Initial contents, required for immutable buffers.
    pub content: Option<Arc<[u8]>>,
    /// Debug label.
    pub label: Option<String>,
}

/// Texel formats understood by the backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 8-bit RGBA, normalized.
    #[default]
    Rgba8,
    /// 8-bit BGRA, normalized.
    Bgra8,
    /// 32-bit float RGBA.
    Rgba32F,
    /// Depth only.
    Depth,
    /// Depth plus stencil.
    DepthStencil,
}

/// Mip-level contents of an image; level 0 first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImageContent {
    /// One byte blob per mip level.
    pub mips: Vec<Arc<[u8]>>,
}

impl ImageContent {
    /// Content with a single mip level.
    #[must_use]
    pub fn single(bytes: Arc<[u8]>) -> Self {
        Self { mips: vec![bytes] }
    }
}

/// Describes an image to initialize.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImageDesc {
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// Texel format.
    pub format: PixelFormat,
    /// Update frequency.
    pub usage: Usage,
    /// Whether the image can be a pass attachment.
    pub render_target: bool,
    /// Initial contents.
    pub content: Option<ImageContent>,
    /// Debug label.
    pub label: Option<String>,
}

/// One programmable stage of a shader.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShaderStageDesc {
    /// Source or bytecode, backend specific.
    pub source: String,
    /// Entry point name.
    pub entry: String,
    /// Byte size of each uniform block slot.
    pub uniform_block_sizes: Vec<usize>,
}

/// Describes a shader program to initialize.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShaderDesc {
    /// Vertex stage.
    pub vertex: ShaderStageDesc,
    /// Fragment stage.
    pub fragment: ShaderStageDesc,
    /// Debug label.
    pub label: Option<String>,
}

/// Shader stage targeted by a uniform upload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Vertex stage.
    Vertex,
    /// Fragment stage.
    Fragment,
}

/// Primitive assembly mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    /// Separate triangles.
    #[default]
    Triangles,
    /// Triangle strip.
    TriangleStrip,
    /// Separate lines.
    Lines,
    /// Points.
    Points,
}

/// Index element width, or none for non-indexed drawing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum IndexType {
    /// Non-indexed.
    #[default]
    None,
    /// 16-bit indices.
    U16,
    /// 32-bit indices.
    U32,
}

/// Describes a pipeline to initialize.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PipelineDesc {
    /// Shader the pipeline runs.
    pub shader: ShaderId,
    /// Primitive assembly.
    pub primitive: PrimitiveType,
    /// Index width.
    pub index_type: IndexType,
    /// Depth test and write enabled.
    pub depth_write: bool,
    /// Debug label.
    pub label: Option<String>,
}

/// Describes an offscreen pass to initialize.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PassDesc {
    /// Color render targets.
    pub color_attachments: [Option<ImageId>; MAX_COLOR_ATTACHMENTS],
    /// Depth-stencil render target.
    pub depth_stencil_attachment: Option<ImageId>,
    /// Debug label.
    pub label: Option<String>,
}

/// What happens to attachments at the start of a pass. `None` keeps the
/// previous contents.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PassAction {
    /// Clear color.
    pub clear_color: Option<[f32; 4]>,
    /// Clear depth.
    pub clear_depth: Option<f32>,
    /// Clear stencil.
    pub clear_stencil: Option<u8>,
}

impl PassAction {
    /// Clears color to `color`, depth to 1.0 and stencil to 0.
    #[must_use]
    pub const fn clear(color: [f32; 4]) -> Self {
        Self {
            clear_color: Some(color),
            clear_depth: Some(1.0),
            clear_stencil: Some(0),
        }
    }
}

/// Resources bound for the next draw.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Bindings {
    /// Vertex buffer slots.
    pub vertex_buffers: [Option<BufferId>; MAX_VERTEX_BUFFERS],
    /// Byte offsets into the vertex buffers.
    pub vertex_buffer_offsets: [u32; MAX_VERTEX_BUFFERS],
    /// Index buffer.
    pub index_buffer: Option<BufferId>,
    /// Byte offset into the index buffer.
    pub index_buffer_offset: u32,
    /// Vertex stage images.
    pub vertex_images: [Option<ImageId>; MAX_STAGE_IMAGES],
    /// Fragment stage images.
    pub fragment_images: [Option<ImageId>; MAX_STAGE_IMAGES],
}

impl Bindings {
    /// Binds a single vertex buffer in slot 0.
    #[must_use]
    pub fn with_vertex_buffer(buffer: BufferId) -> Self {
        let mut bindings = Self::default();
        bindings.vertex_buffers[0] = Some(buffer);
        bindings
    }
}

/// Viewport or scissor rectangle in framebuffer pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    /// Left edge.
    pub x: i32,
    /// Top or bottom edge, depending on `origin_top_left`.
    pub y: i32,
    /// Width.
    pub width: i32,
    /// Height.
    pub height: i32,
    /// Whether `y` is measured from the top.
    pub origin_top_left: bool,
}

impl Rect {
    /// Rectangle with origin at the top left.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            origin_top_left: true,
        }
    }
}
