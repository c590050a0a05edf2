//! # Scripted Scene
//!
//! What the update thread records every frame. Deliberately churns
//! resources so the deferred release path is exercised constantly:
//!
//! ```text
//! setup      shader, pipeline, static quad
//! frame N    instance buffer (made + destroyed)
//!            offscreen target every K frames (made + destroyed)
//!            default pass: D draws with per-draw uniforms
//! teardown   pipeline, shader, quad
//! ```

use std::sync::Arc;

use tandem_core::{
    Bindings, BufferDesc, BufferId, BufferKind, ImageDesc, PassAction, PassDesc, PipelineDesc,
    PipelineId, PixelFormat, QueueResult, Recorder, Rect, ShaderDesc, ShaderId, ShaderStage,
    ShaderStageDesc, Usage,
};

/// Bytes per instance record in the per-frame instance buffer.
const INSTANCE_STRIDE: usize = 32;

/// Shape of the scripted scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SceneConfig {
    /// Draw calls in the default pass, each with its own uniform upload.
    pub draws_per_frame: u32,
    /// Render to a fresh offscreen target every this many frames; 0 disables.
    pub offscreen_every: u64,
    /// Offscreen target size in pixels.
    pub offscreen_size: u32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            draws_per_frame: 64,
            offscreen_every: 8,
            offscreen_size: 256,
        }
    }
}

impl SceneConfig {
    /// Draw calls one frame issues, offscreen pass included.
    #[must_use]
    pub fn draws_in_frame(&self, frame: u64) -> u64 {
        let offscreen = u64::from(self.has_offscreen(frame));
        u64::from(self.draws_per_frame) + offscreen
    }

    fn has_offscreen(&self, frame: u64) -> bool {
        self.offscreen_every > 0 && frame % self.offscreen_every == 0
    }
}

/// Long-lived resources of the scene.
#[derive(Debug)]
pub struct Scene {
    config: SceneConfig,
    shader: ShaderId,
    pipeline: PipelineId,
    quad: BufferId,
}

impl Scene {
    /// Records creation of the long-lived resources.
    pub fn setup(recorder: &mut Recorder, config: SceneConfig) -> Self {
        recorder.push_debug_group("scene setup");

        let shader = recorder.make_shader(ShaderDesc {
            vertex: ShaderStageDesc {
                source: "quad.vert".to_owned(),
                entry: "main".to_owned(),
                uniform_block_sizes: vec![64],
            },
            fragment: ShaderStageDesc {
                source: "quad.frag".to_owned(),
                entry: "main".to_owned(),
                uniform_block_sizes: Vec::new(),
            },
            label: Some("quad".to_owned()),
        });
        let pipeline = recorder.make_pipeline(PipelineDesc {
            shader,
            label: Some("quad".to_owned()),
            ..PipelineDesc::default()
        });

        let vertices: Vec<u8> = [
            -1.0f32, -1.0, 1.0, -1.0, 1.0, 1.0, -1.0, -1.0, 1.0, 1.0, -1.0, 1.0,
        ]
        .iter()
        .flat_map(|v| v.to_le_bytes())
        .collect();
        let quad = recorder.make_buffer(BufferDesc {
            size: vertices.len(),
            kind: BufferKind::Vertex,
            usage: Usage::Immutable,
            content: Some(Arc::from(vertices)),
            label: Some("quad".to_owned()),
        });

        recorder.pop_debug_group();

        Self {
            config,
            shader,
            pipeline,
            quad,
        }
    }

    /// Records one frame, ending with the backend commit record.
    ///
    /// # Errors
    ///
    /// Propagates a rejected uniform upload.
    pub fn record_frame(&self, recorder: &mut Recorder, frame: u64) -> QueueResult<()> {
        recorder.push_debug_group(format!("frame {frame}"));

        let draws = self.config.draws_per_frame as usize;
        let instances = recorder.make_buffer(BufferDesc {
            size: draws * INSTANCE_STRIDE,
            kind: BufferKind::Vertex,
            usage: Usage::Stream,
            content: None,
            label: None,
        });
        recorder.update_buffer(instances, instance_data(frame, draws));

        if self.config.has_offscreen(frame) {
            self.record_offscreen(recorder);
        }

        recorder.begin_default_pass(PassAction::clear([0.1, 0.1, 0.1, 1.0]));
        recorder.apply_viewport(Rect::new(0, 0, 1280, 720));
        recorder.apply_pipeline(self.pipeline);
        let mut bindings = Bindings::with_vertex_buffer(self.quad);
        bindings.vertex_buffers[1] = Some(instances);
        recorder.apply_bindings(bindings);

        for draw in 0..self.config.draws_per_frame {
            recorder.apply_uniforms(ShaderStage::Vertex, 0, &transform(frame, draw))?;
            recorder.draw(0, 6, 1);
        }

        recorder.end_pass();
        recorder.pop_debug_group();

        // Still referenced by this frame's records; the id outlives them.
        recorder.destroy_buffer(instances);
        recorder.end_frame();
        Ok(())
    }

    fn record_offscreen(&self, recorder: &mut Recorder) {
        let size = self.config.offscreen_size;
        let target = recorder.make_image(ImageDesc {
            width: size,
            height: size,
            format: PixelFormat::Rgba8,
            render_target: true,
            ..ImageDesc::default()
        });
        let depth = recorder.make_image(ImageDesc {
            width: size,
            height: size,
            format: PixelFormat::Depth,
            render_target: true,
            ..ImageDesc::default()
        });
        let mut desc = PassDesc {
            depth_stencil_attachment: Some(depth),
            ..PassDesc::default()
        };
        desc.color_attachments[0] = Some(target);
        let pass = recorder.make_pass(desc);

        recorder.begin_pass(pass, PassAction::clear([0.0, 0.0, 0.0, 0.0]));
        recorder.apply_pipeline(self.pipeline);
        recorder.apply_bindings(Bindings::with_vertex_buffer(self.quad));
        recorder.draw(0, 6, 1);
        recorder.end_pass();

        recorder.destroy_pass(pass);
        recorder.destroy_image(depth);
        recorder.destroy_image(target);
    }

    /// Records destruction of the long-lived resources.
    pub fn teardown(self, recorder: &mut Recorder) {
        recorder.destroy_pipeline(self.pipeline);
        recorder.destroy_shader(self.shader);
        recorder.destroy_buffer(self.quad);
    }
}

#[allow(clippy::cast_possible_truncation)]
fn instance_data(frame: u64, draws: usize) -> Vec<u8> {
    let seed = frame.to_le_bytes();
    (0..draws * INSTANCE_STRIDE)
        .map(|i| seed[i % seed.len()] ^ (i as u8))
        .collect()
}

/// Column-major translation matrix, 64 bytes.
fn transform(frame: u64, draw: u32) -> [u8; 64] {
    #[allow(clippy::cast_precision_loss)]
    let (x, y) = ((frame % 360) as f32 / 360.0, draw as f32 / 64.0);
    let matrix: [f32; 16] = [
        1.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        x, y, 0.0, 1.0,
    ];
    let mut bytes = [0u8; 64];
    for (chunk, value) in bytes.chunks_exact_mut(4).zip(matrix) {
        chunk.copy_from_slice(&value.to_le_bytes());
    }
    bytes
}
