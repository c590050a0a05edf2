//! Shared test fixtures: a backend and an allocator that log every call.

#![allow(dead_code)]

use std::sync::Arc;

use parking_lot::Mutex;
use tandem_core::{
    Bindings, BufferDesc, BufferId, CommandQueue, GraphicsBackend, HandleAllocator, ImageContent,
    ImageDesc, ImageId, PassAction, PassDesc, PassId, PipelineDesc, PipelineId, QueueConfig, Rect,
    ShaderDesc, ShaderId, ShaderStage, SlotAllocator,
};

/// Every backend or allocator call, in the order it happened.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    AllocBuffer(BufferId),
    AllocImage(ImageId),
    AllocShader(ShaderId),
    AllocPipeline(PipelineId),
    AllocPass(PassId),
    DeallocBuffer(BufferId),
    DeallocImage(ImageId),
    DeallocShader(ShaderId),
    DeallocPipeline(PipelineId),
    DeallocPass(PassId),
    PushDebugGroup(String),
    PopDebugGroup,
    InitBuffer(BufferId, usize),
    InitImage(ImageId),
    InitShader(ShaderId),
    InitPipeline(PipelineId, ShaderId),
    InitPass(PassId),
    UninitBuffer(BufferId),
    UninitImage(ImageId),
    UninitShader(ShaderId),
    UninitPipeline(PipelineId),
    UninitPass(PassId),
    UpdateBuffer(BufferId, Vec<u8>),
    AppendBuffer(BufferId, Vec<u8>),
    UpdateImage(ImageId, usize),
    BeginDefaultPass(u32, u32),
    BeginPass(PassId),
    ApplyViewport(Rect),
    ApplyScissorRect(Rect),
    ApplyPipeline(PipelineId),
    ApplyBindings(Bindings),
    ApplyUniforms(ShaderStage, u32, Vec<u8>),
    Draw(u32, u32, u32),
    EndPass,
    Commit,
    Custom(u32),
}

impl Call {
    /// Whether this is one of the five uninit calls.
    pub fn is_uninit(&self) -> bool {
        matches!(
            self,
            Call::UninitBuffer(_)
                | Call::UninitImage(_)
                | Call::UninitShader(_)
                | Call::UninitPipeline(_)
                | Call::UninitPass(_)
        )
    }

    /// Whether this went to the backend (as opposed to the allocator).
    pub fn is_backend(&self) -> bool {
        !matches!(
            self,
            Call::AllocBuffer(_)
                | Call::AllocImage(_)
                | Call::AllocShader(_)
                | Call::AllocPipeline(_)
                | Call::AllocPass(_)
                | Call::DeallocBuffer(_)
                | Call::DeallocImage(_)
                | Call::DeallocShader(_)
                | Call::DeallocPipeline(_)
                | Call::DeallocPass(_)
        )
    }
}

/// Shared, thread-safe call log.
pub type CallLog = Arc<Mutex<Vec<Call>>>;

/// Backend that appends every call to a [`CallLog`].
pub struct RecordingBackend {
    log: CallLog,
}

impl RecordingBackend {
    pub fn new(log: CallLog) -> Self {
        Self { log }
    }

    fn push(&self, call: Call) {
        self.log.lock().push(call);
    }
}

impl GraphicsBackend for RecordingBackend {
    fn push_debug_group(&mut self, name: &str) {
        self.push(Call::PushDebugGroup(name.to_owned()));
    }
    fn pop_debug_group(&mut self) {
        self.push(Call::PopDebugGroup);
    }
    fn init_buffer(&mut self, buffer: BufferId, desc: &BufferDesc) {
        self.push(Call::InitBuffer(buffer, desc.size));
    }
    fn init_image(&mut self, image: ImageId, _desc: &ImageDesc) {
        self.push(Call::InitImage(image));
    }
    fn init_shader(&mut self, shader: ShaderId, _desc: &ShaderDesc) {
        self.push(Call::InitShader(shader));
    }
    fn init_pipeline(&mut self, pipeline: PipelineId, desc: &PipelineDesc) {
        self.push(Call::InitPipeline(pipeline, desc.shader));
    }
    fn init_pass(&mut self, pass: PassId, _desc: &PassDesc) {
        self.push(Call::InitPass(pass));
    }
    fn uninit_buffer(&mut self, buffer: BufferId) {
        self.push(Call::UninitBuffer(buffer));
    }
    fn uninit_image(&mut self, image: ImageId) {
        self.push(Call::UninitImage(image));
    }
    fn uninit_shader(&mut self, shader: ShaderId) {
        self.push(Call::UninitShader(shader));
    }
    fn uninit_pipeline(&mut self, pipeline: PipelineId) {
        self.push(Call::UninitPipeline(pipeline));
    }
    fn uninit_pass(&mut self, pass: PassId) {
        self.push(Call::UninitPass(pass));
    }
    fn update_buffer(&mut self, buffer: BufferId, data: &[u8]) {
        self.push(Call::UpdateBuffer(buffer, data.to_vec()));
    }
    fn append_buffer(&mut self, buffer: BufferId, data: &[u8]) {
        self.push(Call::AppendBuffer(buffer, data.to_vec()));
    }
    fn update_image(&mut self, image: ImageId, content: &ImageContent) {
        self.push(Call::UpdateImage(image, content.mips.len()));
    }
    fn begin_default_pass(&mut self, _action: &PassAction, width: u32, height: u32) {
        self.push(Call::BeginDefaultPass(width, height));
    }
    fn begin_pass(&mut self, pass: PassId, _action: &PassAction) {
        self.push(Call::BeginPass(pass));
    }
    fn apply_viewport(&mut self, rect: Rect) {
        self.push(Call::ApplyViewport(rect));
    }
    fn apply_scissor_rect(&mut self, rect: Rect) {
        self.push(Call::ApplyScissorRect(rect));
    }
    fn apply_pipeline(&mut self, pipeline: PipelineId) {
        self.push(Call::ApplyPipeline(pipeline));
    }
    fn apply_bindings(&mut self, bindings: &Bindings) {
        self.push(Call::ApplyBindings(*bindings));
    }
    fn apply_uniforms(&mut self, stage: ShaderStage, slot: u32, data: &[u8]) {
        self.push(Call::ApplyUniforms(stage, slot, data.to_vec()));
    }
    fn draw(&mut self, base_element: u32, element_count: u32, instance_count: u32) {
        self.push(Call::Draw(base_element, element_count, instance_count));
    }
    fn end_pass(&mut self) {
        self.push(Call::EndPass);
    }
    fn commit(&mut self) {
        self.push(Call::Commit);
    }
}

/// Allocator that logs into the same [`CallLog`] as the backend.
pub struct LoggingAllocator {
    slots: SlotAllocator,
    log: CallLog,
}

impl LoggingAllocator {
    pub fn new(log: CallLog) -> Self {
        Self {
            slots: SlotAllocator::new(1024),
            log,
        }
    }

    pub fn slots(&self) -> &SlotAllocator {
        &self.slots
    }
}

impl HandleAllocator for LoggingAllocator {
    fn alloc_buffer(&self) -> BufferId {
        let id = self.slots.alloc_buffer();
        self.log.lock().push(Call::AllocBuffer(id));
        id
    }
    fn alloc_image(&self) -> ImageId {
        let id = self.slots.alloc_image();
        self.log.lock().push(Call::AllocImage(id));
        id
    }
    fn alloc_shader(&self) -> ShaderId {
        let id = self.slots.alloc_shader();
        self.log.lock().push(Call::AllocShader(id));
        id
    }
    fn alloc_pipeline(&self) -> PipelineId {
        let id = self.slots.alloc_pipeline();
        self.log.lock().push(Call::AllocPipeline(id));
        id
    }
    fn alloc_pass(&self) -> PassId {
        let id = self.slots.alloc_pass();
        self.log.lock().push(Call::AllocPass(id));
        id
    }
    fn dealloc_buffer(&self, buffer: BufferId) {
        self.log.lock().push(Call::DeallocBuffer(buffer));
        self.slots.dealloc_buffer(buffer);
    }
    fn dealloc_image(&self, image: ImageId) {
        self.log.lock().push(Call::DeallocImage(image));
        self.slots.dealloc_image(image);
    }
    fn dealloc_shader(&self, shader: ShaderId) {
        self.log.lock().push(Call::DeallocShader(shader));
        self.slots.dealloc_shader(shader);
    }
    fn dealloc_pipeline(&self, pipeline: PipelineId) {
        self.log.lock().push(Call::DeallocPipeline(pipeline));
        self.slots.dealloc_pipeline(pipeline);
    }
    fn dealloc_pass(&self, pass: PassId) {
        self.log.lock().push(Call::DeallocPass(pass));
        self.slots.dealloc_pass(pass);
    }
}

/// A queue wired to a recording backend and a logging allocator.
pub struct Harness {
    pub queue: CommandQueue<RecordingBackend>,
    pub log: CallLog,
    pub allocator: Arc<LoggingAllocator>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(QueueConfig::default())
    }

    pub fn with_config(config: QueueConfig) -> Self {
        let log: CallLog = Arc::new(Mutex::new(Vec::new()));
        let allocator = Arc::new(LoggingAllocator::new(Arc::clone(&log)));
        let queue = CommandQueue::new(
            RecordingBackend::new(Arc::clone(&log)),
            Arc::clone(&allocator) as Arc<dyn HandleAllocator>,
            config,
        )
        .unwrap();
        Self {
            queue,
            log,
            allocator,
        }
    }

    /// Commit, then execute on the same thread.
    pub fn frame(&mut self) {
        self.queue.recorder().commit_commands().unwrap();
        self.queue.executor().execute();
    }

    /// Takes the log collected so far.
    pub fn take_log(&self) -> Vec<Call> {
        std::mem::take(&mut *self.log.lock())
    }

    /// Backend calls only, allocator calls filtered out.
    pub fn take_backend_calls(&self) -> Vec<Call> {
        self.take_log().into_iter().filter(Call::is_backend).collect()
    }
}
