//! # Lifecycle Tests
//!
//! Deferred id release, completion notifications, flush mode and teardown.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use common::{Call, Harness};
use tandem_core::{
    BufferDesc, Command, ExecuteStatus, ImageDesc, QueueConfig, QueueError, ReplayOutcome,
};

fn counter() -> (Arc<AtomicUsize>, impl FnOnce() + Send + 'static) {
    let count = Arc::new(AtomicUsize::new(0));
    let hook = Arc::clone(&count);
    (count, move || {
        hook.fetch_add(1, Ordering::SeqCst);
    })
}

#[test]
fn test_destroy_releases_id_one_frame_later() {
    let mut harness = Harness::new();

    // Frame 0: create.
    let buffer = harness
        .queue
        .recorder()
        .make_buffer(BufferDesc { size: 16, ..BufferDesc::default() });
    harness.frame();

    // Frame 1: destroy. The backend tears it down during this frame's replay.
    harness.queue.recorder().destroy_buffer(buffer);
    harness.take_log();
    harness.frame();
    assert_eq!(harness.take_log(), vec![Call::UninitBuffer(buffer)]);
    assert_eq!(harness.allocator.slots().live().buffers, 1);

    // Frame 2: the commit releases the id, before anything is replayed.
    harness.queue.recorder().commit_commands().unwrap();
    assert_eq!(harness.take_log(), vec![Call::DeallocBuffer(buffer)]);
    assert_eq!(harness.allocator.slots().live().buffers, 0);
    harness.queue.executor().execute();

    // Exactly once.
    for _ in 0..3 {
        harness.frame();
    }
    assert!(harness.take_log().is_empty());
}

#[test]
fn test_extra_cleanup_frames_delay_release() {
    let config = QueueConfig {
        cleanup_extra_frames: 2,
        ..QueueConfig::default()
    };
    let mut harness = Harness::with_config(config);

    let image = harness.queue.recorder().make_image(ImageDesc::default());
    harness.queue.recorder().destroy_image(image);
    // Destroy recorded at frame 0: due at frame 0 + 1 + 2.
    for frame in 0..3 {
        harness.frame();
        assert!(
            !harness.take_log().contains(&Call::DeallocImage(image)),
            "released early at frame {frame}"
        );
    }
    harness.frame();
    assert_eq!(harness.take_log(), vec![Call::DeallocImage(image)]);
}

#[test]
fn test_scheduled_cleanup_fires_on_commit() {
    let mut harness = Harness::new();
    let (count, hook) = counter();

    harness.queue.recorder().schedule_cleanup(hook, 0);
    assert_eq!(harness.queue.recorder().staged_cleanups(), 1);

    harness.frame();
    assert_eq!(count.load(Ordering::SeqCst), 0);
    harness.frame();
    assert_eq!(count.load(Ordering::SeqCst), 1);
    harness.frame();
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn test_pending_cleanups_fire_once_at_teardown() {
    let (count, hook) = counter();
    let harness = Harness::new();
    let allocator = Arc::clone(&harness.allocator);

    {
        let mut harness = harness;
        let buffer = harness.queue.recorder().make_buffer(BufferDesc::default());
        harness.frame();
        harness.queue.recorder().destroy_buffer(buffer);
        harness.queue.recorder().schedule_cleanup(hook, 100);
        harness.frame();
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(allocator.slots().live().buffers, 1);
    }

    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(allocator.slots().live().total(), 0);
}

#[test]
fn test_completion_fires_when_slot_is_reused() {
    let mut harness = Harness::new();
    let (count, hook) = counter();

    let draw = Command::Draw {
        base_element: 0,
        element_count: 3,
        instance_count: 1,
    };
    harness.queue.recorder().record_with_completion(draw, hook);

    harness.frame();
    assert_eq!(count.load(Ordering::SeqCst), 0, "fired while still replayable");

    harness.frame();
    assert_eq!(count.load(Ordering::SeqCst), 1);

    harness.frame();
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn test_completion_fires_at_teardown_if_never_reused() {
    let (count, hook) = counter();
    {
        let mut harness = Harness::new();
        harness
            .queue
            .recorder()
            .record_with_completion(Command::EndPass, hook);
        harness.frame();
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn test_flush_replays_committed_frame_in_full() {
    let Harness {
        queue,
        log,
        allocator,
    } = Harness::new();
    let (mut recorder, mut executor) = queue.split();
    let backend_calls = || -> Vec<Call> {
        std::mem::take(&mut *log.lock())
            .into_iter()
            .filter(Call::is_backend)
            .collect()
    };

    let buffer = recorder.make_buffer(BufferDesc::default());
    recorder.commit_commands().unwrap();
    executor.execute();
    assert_eq!(backend_calls(), vec![Call::InitBuffer(buffer, 0)]);

    // Committed, not yet replayed when the flush starts.
    let second = recorder.make_buffer(BufferDesc { size: 8, ..BufferDesc::default() });
    recorder.draw(0, 3, 1);
    recorder.destroy_buffer(buffer);
    recorder.commit_commands().unwrap();

    // Left pending at flush time.
    let image = recorder.make_image(ImageDesc::default());
    recorder.draw(3, 3, 1);
    recorder.destroy_image(image);
    recorder.destroy_buffer(second);
    recorder.flush_commands();

    assert!(executor.is_flushing());
    assert_eq!(
        executor.execute(),
        ExecuteStatus::Replayed(ReplayOutcome { executed: 3, skipped: 0 })
    );
    assert_eq!(
        executor.execute(),
        ExecuteStatus::Flushed(ReplayOutcome { executed: 2, skipped: 2 })
    );
    assert_eq!(executor.execute(), ExecuteStatus::Drained);
    assert_eq!(executor.execute(), ExecuteStatus::Drained);

    assert_eq!(
        backend_calls(),
        vec![
            Call::InitBuffer(second, 8),
            Call::Draw(0, 3, 1),
            Call::UninitBuffer(buffer),
            Call::UninitImage(image),
            Call::UninitBuffer(second),
        ]
    );

    let stats = executor.stats();
    assert_eq!(stats.buffers_replayed, 2);
    assert_eq!(stats.buffers_flushed, 1);
    assert_eq!(stats.records_skipped, 2);

    // Ids come back once nothing can name them any more.
    assert_eq!(allocator.slots().live().total(), 3);
    drop(executor);
    assert_eq!(allocator.slots().live().total(), 0);
}

#[test]
fn test_flush_swap_fires_completions_of_drained_buffer() {
    let Harness { queue, .. } = Harness::new();
    let (mut recorder, mut executor) = queue.split();
    let (count, hook) = counter();

    let draw = Command::Draw {
        base_element: 0,
        element_count: 3,
        instance_count: 1,
    };
    recorder.record_with_completion(draw, hook);
    recorder.commit_commands().unwrap();
    assert!(matches!(executor.execute(), ExecuteStatus::Replayed(_)));
    assert_eq!(count.load(Ordering::SeqCst), 0);

    recorder.draw(3, 3, 1);
    recorder.flush_commands();
    assert_eq!(count.load(Ordering::SeqCst), 0, "fired before the swap");

    // The parked buffer takes the drained buffer's slot.
    assert_eq!(
        executor.execute(),
        ExecuteStatus::Flushed(ReplayOutcome { executed: 0, skipped: 1 })
    );
    assert_eq!(count.load(Ordering::SeqCst), 1);

    assert_eq!(executor.execute(), ExecuteStatus::Drained);
    drop(executor);
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn test_into_backend_after_flush_runs_final_cleanup() {
    let Harness {
        queue,
        log,
        allocator,
    } = Harness::new();
    let (mut recorder, mut executor) = queue.split();

    let buffer = recorder.make_buffer(BufferDesc::default());
    recorder.commit_commands().unwrap();
    recorder.destroy_buffer(buffer);
    recorder.flush_commands();
    assert_eq!(executor.drain(), 2);
    assert_eq!(allocator.slots().live().buffers, 1);

    // The recorder is gone, so giving the backend back ends the queue.
    let _backend = executor.into_backend();
    assert_eq!(allocator.slots().live().total(), 0);

    let calls = std::mem::take(&mut *log.lock());
    let uninit = calls.iter().position(|c| *c == Call::UninitBuffer(buffer));
    let dealloc = calls.iter().position(|c| *c == Call::DeallocBuffer(buffer));
    assert!(uninit < dealloc, "{calls:?}");
    assert!(uninit.is_some());
}

#[test]
fn test_dropping_recorder_flushes() {
    let Harness { queue, .. } = Harness::new();
    let (mut recorder, mut executor) = queue.split();

    recorder.draw(0, 1, 1);
    drop(recorder);

    assert!(executor.is_flushing());
    assert_eq!(
        executor.execute(),
        ExecuteStatus::Flushed(ReplayOutcome { executed: 0, skipped: 1 })
    );
    assert_eq!(executor.drain(), 0);
}

#[test]
fn test_commit_after_executor_dropped_is_disconnected() {
    let Harness { queue, .. } = Harness::new();
    let (mut recorder, executor) = queue.split();
    drop(executor);

    recorder.draw(0, 1, 1);
    assert_eq!(recorder.commit_commands(), Err(QueueError::Disconnected));
    assert_eq!(recorder.commit_commands(), Err(QueueError::Disconnected));
}

#[test]
fn test_invalid_config_rejected() {
    let config = QueueConfig {
        initial_command_capacity: 0,
        ..QueueConfig::default()
    };
    let result = tandem_core::CommandQueue::new(
        tandem_core::NullBackend,
        Arc::new(tandem_core::SlotAllocator::new(8)),
        config,
    );
    assert!(matches!(result, Err(QueueError::InvalidConfig(_))));
}
