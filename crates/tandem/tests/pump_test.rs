//! # Frame Pump Integration Tests
//!
//! Full two-thread runs under different queue configurations.

use tandem::{FramePump, PumpConfig, SceneConfig};
use tandem_core::QueueConfig;

#[test]
fn test_run_with_extra_cleanup_frames() {
    let config = PumpConfig {
        frames: 64,
        queue: QueueConfig {
            cleanup_extra_frames: 3,
            ..QueueConfig::default()
        },
        ..PumpConfig::default()
    };
    let report = FramePump::new(config).run().unwrap();
    assert!(report.is_clean(), "{report:?}");
    assert_eq!(report.counts.commits, 64);
}

#[test]
fn test_run_with_config_file() {
    let path = std::env::temp_dir().join(format!("tandem_pump_{}.toml", std::process::id()));
    std::fs::write(
        &path,
        "initial_command_capacity = 32\ncleanup_extra_frames = 1\ndefault_pass_width = 640\ndefault_pass_height = 480\n",
    )
    .unwrap();

    let queue = QueueConfig::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(queue.initial_command_capacity, 32);
    assert_eq!(queue.default_pass_width, 640);

    let config = PumpConfig {
        frames: 40,
        queue,
        scene: SceneConfig {
            draws_per_frame: 100,
            offscreen_every: 5,
            offscreen_size: 64,
        },
        id_capacity: 64,
    };
    let report = FramePump::new(config).run().unwrap();
    assert!(report.is_clean(), "{report:?}");
    // Buffers outgrow their initial capacity without losing records.
    assert_eq!(report.counts.uniform_uploads, 40 * 100);
}

#[test]
fn test_repeated_runs_are_independent() {
    let config = PumpConfig {
        frames: 16,
        ..PumpConfig::default()
    };
    let first = FramePump::new(config.clone()).run().unwrap();
    let second = FramePump::new(config).run().unwrap();
    assert_eq!(first.counts, second.counts);
}
