//! # Frame Pump
//!
//! Runs a [`Scene`] for a fixed number of frames with the recorder on the
//! calling thread and the executor on a dedicated render thread.
//!
//! ```text
//! caller thread                 render thread
//! ─────────────                 ─────────────
//! setup + frame 0 ── commit ──► replay 0
//! frame 1         ── commit ──► replay 1   (waits for replay 0)
//! ...
//! teardown        ── commit ──► replay teardown
//! flush           ───────────► drain, hand back backend
//! ```

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

use tandem_core::{
    CommandQueue, HandleAllocator, QueueConfig, QueueError, ReplayStats, SlotAllocator, SlotCounts,
};

use crate::counting::{CallCounts, CountingBackend};
use crate::scene::{Scene, SceneConfig};

/// Errors from a pump run.
#[derive(Error, Debug)]
pub enum PumpError {
    /// The queue rejected an operation.
    #[error("queue error: {0}")]
    Queue(#[from] QueueError),

    /// The render thread could not be started.
    #[error("failed to spawn render thread: {0}")]
    Spawn(String),

    /// The render thread panicked.
    #[error("render thread panicked")]
    RenderThreadPanicked,
}

/// Result type for pump runs.
pub type PumpResult<T> = Result<T, PumpError>;

/// Configuration for a [`FramePump`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PumpConfig {
    /// Frames to record, setup and teardown not included.
    pub frames: u64,
    /// Scene shape.
    pub scene: SceneConfig,
    /// Queue configuration.
    pub queue: QueueConfig,
    /// Ids available per resource kind.
    pub id_capacity: u32,
}

impl Default for PumpConfig {
    fn default() -> Self {
        Self {
            frames: 600,
            scene: SceneConfig::default(),
            queue: QueueConfig::default(),
            id_capacity: 4096,
        }
    }
}

/// What a run did.
#[derive(Clone, Debug)]
pub struct PumpReport {
    /// Frames recorded.
    pub frames: u64,
    /// Wall time from setup to the render thread joining.
    pub elapsed: Duration,
    /// Executor totals.
    pub stats: ReplayStats,
    /// Backend call totals.
    pub counts: CallCounts,
    /// Resources the backend still holds after the drain.
    pub live_resources: usize,
    /// Ids still handed out after both halves were dropped.
    pub live_ids: SlotCounts,
}

impl PumpReport {
    /// Frames per second over the whole run.
    #[must_use]
    pub fn frames_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            #[allow(clippy::cast_precision_loss)]
            let frames = self.frames as f64;
            frames / secs
        } else {
            0.0
        }
    }

    /// No leaked resource, no leaked id, no backend violation.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.counts.violations == 0 && self.live_resources == 0 && self.live_ids.total() == 0
    }
}

/// Two-thread scenario driver.
#[derive(Debug)]
pub struct FramePump {
    config: PumpConfig,
}

impl FramePump {
    /// Creates a pump.
    #[must_use]
    pub fn new(config: PumpConfig) -> Self {
        Self { config }
    }

    /// The configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &PumpConfig {
        &self.config
    }

    /// Runs the scene to completion and tears everything down.
    ///
    /// # Errors
    ///
    /// Returns [`PumpError::Queue`] for an invalid queue configuration or a
    /// failed commit, [`PumpError::Spawn`] or
    /// [`PumpError::RenderThreadPanicked`] if the render thread fails.
    pub fn run(&self) -> PumpResult<PumpReport> {
        let start = Instant::now();
        let allocator = Arc::new(SlotAllocator::new(self.config.id_capacity));
        let queue = CommandQueue::new(
            CountingBackend::new(),
            Arc::clone(&allocator) as Arc<dyn HandleAllocator>,
            self.config.queue.clone(),
        )?;
        let (mut recorder, mut executor) = queue.split();

        tracing::info!(
            "Frame pump starting: {} frames, {} draws per frame",
            self.config.frames,
            self.config.scene.draws_per_frame
        );

        let render = thread::Builder::new()
            .name("tandem-render".to_owned())
            .spawn(move || {
                executor.drain();
                let stats = executor.stats();
                (stats, executor.into_backend())
            })
            .map_err(|e| PumpError::Spawn(e.to_string()))?;

        let scene = Scene::setup(&mut recorder, self.config.scene);
        for frame in 0..self.config.frames {
            scene.record_frame(&mut recorder, frame)?;
            recorder.commit_commands()?;
        }
        scene.teardown(&mut recorder);
        recorder.commit_commands()?;
        recorder.flush_commands();

        let (stats, backend) = render
            .join()
            .map_err(|_| PumpError::RenderThreadPanicked)?;
        let elapsed = start.elapsed();

        let report = PumpReport {
            frames: self.config.frames,
            elapsed,
            stats,
            counts: backend.counts(),
            live_resources: backend.live_resources(),
            live_ids: allocator.live(),
        };

        tracing::info!(
            "Frame pump finished: {} buffers replayed, {} violations, {:.1} fps",
            report.stats.buffers_replayed,
            report.counts.violations,
            report.frames_per_second()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small(frames: u64) -> PumpConfig {
        PumpConfig {
            frames,
            scene: SceneConfig {
                draws_per_frame: 8,
                offscreen_every: 3,
                offscreen_size: 32,
            },
            queue: QueueConfig::default(),
            id_capacity: 256,
        }
    }

    #[test]
    fn test_run_is_clean() {
        let config = small(30);
        let report = FramePump::new(config.clone()).run().unwrap();

        assert!(report.is_clean(), "{report:?}");
        assert_eq!(report.counts.inits, report.counts.uninits);
        assert_eq!(report.counts.commits, config.frames);

        let expected_draws: u64 = (0..config.frames)
            .map(|f| config.scene.draws_in_frame(f))
            .sum();
        assert_eq!(report.counts.draws, expected_draws);
        assert_eq!(
            report.counts.uniform_uploads,
            config.frames * u64::from(config.scene.draws_per_frame)
        );
    }

    #[test]
    fn test_every_frame_replayed_in_full() {
        let report = FramePump::new(small(20)).run().unwrap();
        // Teardown adds one, the empty buffer parked by the flush another.
        assert_eq!(report.stats.buffers_replayed, 20 + 1);
        assert_eq!(report.stats.buffers_flushed, 1);
        assert_eq!(report.stats.records_skipped, 0);
        assert_eq!(report.counts.violations, 0);
    }

    #[test]
    fn test_ids_recycled_under_small_capacity() {
        // Far more buffers are made than ids exist: only deferred release
        // keeps the pool from running dry.
        let mut config = small(200);
        config.id_capacity = 8;
        config.scene.offscreen_every = 0;
        let report = FramePump::new(config).run().unwrap();
        assert!(report.is_clean(), "{report:?}");
    }

    #[test]
    fn test_zero_frames() {
        let report = FramePump::new(small(0)).run().unwrap();
        assert!(report.is_clean());
        assert_eq!(report.counts.draws, 0);
    }

    #[test]
    fn test_invalid_queue_config() {
        let mut config = small(1);
        config.queue.initial_cleanup_capacity = 0;
        let err = FramePump::new(config).run().unwrap_err();
        assert!(matches!(err, PumpError::Queue(QueueError::InvalidConfig(_))));
    }
}
