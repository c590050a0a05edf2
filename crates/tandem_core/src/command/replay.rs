//! # Replay
//!
//! Turns a buffer of records into backend calls: one call per record, in
//! record order, arguments passed through unchanged.

use super::{Command, CommandBuffer};
use crate::backend::GraphicsBackend;

/// Which records a replay pass executes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplayMode {
    /// Every record.
    Full,
    /// Destroy records only. Used while flushing so resources are still
    /// released but nothing is drawn.
    DestroyOnly,
}

/// Counts from one replay pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplayOutcome {
    /// Records turned into backend calls.
    pub executed: usize,
    /// Records skipped by the mode.
    pub skipped: usize,
}

/// Replays `buffer` against `backend`.
///
/// `default_pass_size` is handed to
/// [`GraphicsBackend::begin_default_pass`].
pub fn replay_buffer<B: GraphicsBackend + ?Sized>(
    backend: &mut B,
    buffer: &mut CommandBuffer,
    mode: ReplayMode,
    default_pass_size: (u32, u32),
) -> ReplayOutcome {
    let mut outcome = ReplayOutcome::default();

    for record in buffer.iter_mut() {
        if mode == ReplayMode::DestroyOnly && !record.command.kind().is_destroy() {
            outcome.skipped += 1;
            continue;
        }
        dispatch(backend, &mut record.command, default_pass_size);
        outcome.executed += 1;
    }

    outcome
}

fn dispatch<B: GraphicsBackend + ?Sized>(
    backend: &mut B,
    command: &mut Command,
    (width, height): (u32, u32),
) {
    match command {
        Command::PushDebugGroup { name } => backend.push_debug_group(name),
        Command::PopDebugGroup => backend.pop_debug_group(),
        Command::MakeBuffer { buffer, desc } => backend.init_buffer(*buffer, desc),
        Command::MakeImage { image, desc } => backend.init_image(*image, desc),
        Command::MakeShader { shader, desc } => backend.init_shader(*shader, desc),
        Command::MakePipeline { pipeline, desc } => backend.init_pipeline(*pipeline, desc),
        Command::MakePass { pass, desc } => backend.init_pass(*pass, desc),
        Command::DestroyBuffer { buffer } => backend.uninit_buffer(*buffer),
        Command::DestroyImage { image } => backend.uninit_image(*image),
        Command::DestroyShader { shader } => backend.uninit_shader(*shader),
        Command::DestroyPipeline { pipeline } => backend.uninit_pipeline(*pipeline),
        Command::DestroyPass { pass } => backend.uninit_pass(*pass),
        Command::UpdateBuffer { buffer, data } => backend.update_buffer(*buffer, data),
        Command::AppendBuffer { buffer, data } => backend.append_buffer(*buffer, data),
        Command::UpdateImage { image, content } => backend.update_image(*image, content),
        Command::BeginDefaultPass { action } => backend.begin_default_pass(action, width, height),
        Command::BeginPass { pass, action } => backend.begin_pass(*pass, action),
        Command::ApplyViewport(rect) => backend.apply_viewport(*rect),
        Command::ApplyScissorRect(rect) => backend.apply_scissor_rect(*rect),
        Command::ApplyPipeline { pipeline } => backend.apply_pipeline(*pipeline),
        Command::ApplyBindings(bindings) => backend.apply_bindings(bindings),
        Command::ApplyUniforms { stage, slot, data } => {
            backend.apply_uniforms(*stage, *slot, data.as_bytes());
        }
        Command::Draw {
            base_element,
            element_count,
            instance_count,
        } => backend.draw(*base_element, *element_count, *instance_count),
        Command::EndPass => backend.end_pass(),
        Command::Commit => backend.commit(),
        Command::Custom(callback) => callback(),
    }
}
