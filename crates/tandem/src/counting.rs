//! # Counting Backend
//!
//! A [`GraphicsBackend`] that renders nothing but keeps score: how many
//! calls of each kind arrived, and which resources are alive. Any call that
//! names a resource the backend has not initialized (or already tore down)
//! is counted as a violation.

use std::collections::HashSet;
use std::hash::Hash;

use tandem_core::{
    Bindings, BufferDesc, BufferId, GraphicsBackend, ImageContent, ImageDesc, ImageId, PassAction,
    PassDesc, PassId, PipelineDesc, PipelineId, Rect, ShaderDesc, ShaderId, ShaderStage,
};

/// Call totals collected by a [`CountingBackend`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CallCounts {
    /// Resources initialized, all kinds.
    pub inits: u64,
    /// Resources torn down, all kinds.
    pub uninits: u64,
    /// Buffer and image content uploads.
    pub uploads: u64,
    /// Bytes uploaded through buffer updates and appends.
    pub upload_bytes: u64,
    /// Passes begun, default or offscreen.
    pub passes: u64,
    /// Draw calls.
    pub draws: u64,
    /// Uniform block uploads.
    pub uniform_uploads: u64,
    /// State changes: viewport, scissor, pipeline, bindings.
    pub state_changes: u64,
    /// End-of-frame commits.
    pub commits: u64,
    /// Calls naming a resource that was not alive.
    pub violations: u64,
}

#[derive(Debug)]
struct Live<T> {
    ids: HashSet<T>,
}

impl<T: Eq + Hash> Live<T> {
    fn new() -> Self {
        Self { ids: HashSet::new() }
    }

    /// Returns false if `id` was already alive.
    fn insert(&mut self, id: T) -> bool {
        self.ids.insert(id)
    }

    /// Returns false if `id` was not alive.
    fn remove(&mut self, id: &T) -> bool {
        self.ids.remove(id)
    }

    fn contains(&self, id: &T) -> bool {
        self.ids.contains(id)
    }
}

/// Backend that counts calls and tracks resource lifetimes.
#[derive(Debug)]
pub struct CountingBackend {
    counts: CallCounts,
    buffers: Live<BufferId>,
    images: Live<ImageId>,
    shaders: Live<ShaderId>,
    pipelines: Live<PipelineId>,
    passes: Live<PassId>,
    debug_depth: u32,
}

impl Default for CountingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CountingBackend {
    /// Creates a backend with no live resources.
    #[must_use]
    pub fn new() -> Self {
        Self {
            counts: CallCounts::default(),
            buffers: Live::new(),
            images: Live::new(),
            shaders: Live::new(),
            pipelines: Live::new(),
            passes: Live::new(),
            debug_depth: 0,
        }
    }

    /// Totals so far.
    #[inline]
    #[must_use]
    pub fn counts(&self) -> CallCounts {
        self.counts
    }

    /// Resources initialized and not yet torn down.
    #[must_use]
    pub fn live_resources(&self) -> usize {
        self.buffers.ids.len()
            + self.images.ids.len()
            + self.shaders.ids.len()
            + self.pipelines.ids.len()
            + self.passes.ids.len()
    }

    /// Open debug groups.
    #[inline]
    #[must_use]
    pub fn debug_depth(&self) -> u32 {
        self.debug_depth
    }

    fn check(&mut self, ok: bool, what: &str) {
        if !ok {
            self.counts.violations += 1;
            tracing::warn!("Backend violation: {}", what);
        }
    }
}

impl GraphicsBackend for CountingBackend {
    fn push_debug_group(&mut self, _name: &str) {
        self.debug_depth += 1;
    }

    fn pop_debug_group(&mut self) {
        let open = self.debug_depth > 0;
        self.check(open, "debug group popped with none open");
        self.debug_depth = self.debug_depth.saturating_sub(1);
    }

    fn init_buffer(&mut self, buffer: BufferId, _desc: &BufferDesc) {
        self.counts.inits += 1;
        let fresh = self.buffers.insert(buffer);
        self.check(fresh, "buffer initialized twice");
    }

    fn init_image(&mut self, image: ImageId, _desc: &ImageDesc) {
        self.counts.inits += 1;
        let fresh = self.images.insert(image);
        self.check(fresh, "image initialized twice");
    }

    fn init_shader(&mut self, shader: ShaderId, _desc: &ShaderDesc) {
        self.counts.inits += 1;
        let fresh = self.shaders.insert(shader);
        self.check(fresh, "shader initialized twice");
    }

    fn init_pipeline(&mut self, pipeline: PipelineId, desc: &PipelineDesc) {
        self.counts.inits += 1;
        let shader_ok = self.shaders.contains(&desc.shader);
        self.check(shader_ok, "pipeline built from a dead shader");
        let fresh = self.pipelines.insert(pipeline);
        self.check(fresh, "pipeline initialized twice");
    }

    fn init_pass(&mut self, pass: PassId, desc: &PassDesc) {
        self.counts.inits += 1;
        let attachments_ok = desc
            .color_attachments
            .iter()
            .flatten()
            .chain(desc.depth_stencil_attachment.iter())
            .all(|image| self.images.contains(image));
        self.check(attachments_ok, "pass attaches a dead image");
        let fresh = self.passes.insert(pass);
        self.check(fresh, "pass initialized twice");
    }

    fn uninit_buffer(&mut self, buffer: BufferId) {
        self.counts.uninits += 1;
        let alive = self.buffers.remove(&buffer);
        self.check(alive, "dead buffer torn down");
    }

    fn uninit_image(&mut self, image: ImageId) {
        self.counts.uninits += 1;
        let alive = self.images.remove(&image);
        self.check(alive, "dead image torn down");
    }

    fn uninit_shader(&mut self, shader: ShaderId) {
        self.counts.uninits += 1;
        let alive = self.shaders.remove(&shader);
        self.check(alive, "dead shader torn down");
    }

    fn uninit_pipeline(&mut self, pipeline: PipelineId) {
        self.counts.uninits += 1;
        let alive = self.pipelines.remove(&pipeline);
        self.check(alive, "dead pipeline torn down");
    }

    fn uninit_pass(&mut self, pass: PassId) {
        self.counts.uninits += 1;
        let alive = self.passes.remove(&pass);
        self.check(alive, "dead pass torn down");
    }

    fn update_buffer(&mut self, buffer: BufferId, data: &[u8]) {
        self.counts.uploads += 1;
        self.counts.upload_bytes += data.len() as u64;
        let alive = self.buffers.contains(&buffer);
        self.check(alive, "update of a dead buffer");
    }

    fn append_buffer(&mut self, buffer: BufferId, data: &[u8]) {
        self.counts.uploads += 1;
        self.counts.upload_bytes += data.len() as u64;
        let alive = self.buffers.contains(&buffer);
        self.check(alive, "append to a dead buffer");
    }

    fn update_image(&mut self, image: ImageId, _content: &ImageContent) {
        self.counts.uploads += 1;
        let alive = self.images.contains(&image);
        self.check(alive, "update of a dead image");
    }

    fn begin_default_pass(&mut self, _action: &PassAction, width: u32, height: u32) {
        self.counts.passes += 1;
        self.check(width > 0 && height > 0, "default pass with zero size");
    }

    fn begin_pass(&mut self, pass: PassId, _action: &PassAction) {
        self.counts.passes += 1;
        let alive = self.passes.contains(&pass);
        self.check(alive, "begin of a dead pass");
    }

    fn apply_viewport(&mut self, _rect: Rect) {
        self.counts.state_changes += 1;
    }

    fn apply_scissor_rect(&mut self, _rect: Rect) {
        self.counts.state_changes += 1;
    }

    fn apply_pipeline(&mut self, pipeline: PipelineId) {
        self.counts.state_changes += 1;
        let alive = self.pipelines.contains(&pipeline);
        self.check(alive, "dead pipeline applied");
    }

    fn apply_bindings(&mut self, bindings: &Bindings) {
        self.counts.state_changes += 1;
        let buffers_ok = bindings
            .vertex_buffers
            .iter()
            .flatten()
            .chain(bindings.index_buffer.iter())
            .all(|buffer| self.buffers.contains(buffer));
        self.check(buffers_ok, "dead buffer bound");
    }

    fn apply_uniforms(&mut self, _stage: ShaderStage, _slot: u32, _data: &[u8]) {
        self.counts.uniform_uploads += 1;
    }

    fn draw(&mut self, _base_element: u32, _element_count: u32, _instance_count: u32) {
        self.counts.draws += 1;
    }

    fn end_pass(&mut self) {}

    fn commit(&mut self) {
        self.counts.commits += 1;
    }
}
