//! No-op backend for headless runs and examples.

use super::GraphicsBackend;
use crate::desc::{
    Bindings, BufferDesc, ImageContent, ImageDesc, PassAction, PassDesc, PipelineDesc, Rect,
    ShaderDesc, ShaderStage,
};
use crate::handle::{BufferId, ImageId, PassId, PipelineId, ShaderId};

/// A [`GraphicsBackend`] that ignores every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBackend;

impl GraphicsBackend for NullBackend {
    fn push_debug_group(&mut self, _name: &str) {}
    fn pop_debug_group(&mut self) {}
    fn init_buffer(&mut self, _buffer: BufferId, _desc: &BufferDesc) {}
    fn init_image(&mut self, _image: ImageId, _desc: &ImageDesc) {}
    fn init_shader(&mut self, _shader: ShaderId, _desc: &ShaderDesc) {}
    fn init_pipeline(&mut self, _pipeline: PipelineId, _desc: &PipelineDesc) {}
    fn init_pass(&mut self, _pass: PassId, _desc: &PassDesc) {}
    fn uninit_buffer(&mut self, _buffer: BufferId) {}
    fn uninit_image(&mut self, _image: ImageId) {}
    fn uninit_shader(&mut self, _shader: ShaderId) {}
    fn uninit_pipeline(&mut self, _pipeline: PipelineId) {}
    fn uninit_pass(&mut self, _pass: PassId) {}
    fn update_buffer(&mut self, _buffer: BufferId, _data: &[u8]) {}
    fn append_buffer(&mut self, _buffer: BufferId, _data: &[u8]) {}
    fn update_image(&mut self, _image: ImageId, _content: &ImageContent) {}
    fn begin_default_pass(&mut self, _action: &PassAction, _width: u32, _height: u32) {}
    fn begin_pass(&mut self, _pass: PassId, _action: &PassAction) {}
    fn apply_viewport(&mut self, _rect: Rect) {}
    fn apply_scissor_rect(&mut self, _rect: Rect) {}
    fn apply_pipeline(&mut self, _pipeline: PipelineId) {}
    fn apply_bindings(&mut self, _bindings: &Bindings) {}
    fn apply_uniforms(&mut self, _stage: ShaderStage, _slot: u32, _data: &[u8]) {}
    fn draw(&mut self, _base_element: u32, _element_count: u32, _instance_count: u32) {}
    fn end_pass(&mut self) {}
    fn commit(&mut self) {}
}
