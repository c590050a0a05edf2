//! # Frame Pump
//!
//! Drives a TANDEM command queue across two threads and reports what the
//! render thread saw.
//!
//! ## Usage
//!
//! ```bash
//! frame_pump --frames 600 --draws 64 --offscreen-every 8 --config queue.toml
//! ```

use tandem::{FramePump, PumpConfig};
use tandem_core::QueueConfig;

fn main() {
    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║         TANDEM FRAME PUMP                                        ║");
    println!("║         ONE FRAME OF LOOKAHEAD                                   ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!();

    let args: Vec<String> = std::env::args().collect();
    let mut config = PumpConfig::default();
    let mut config_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--frames" | "-f" => {
                if i + 1 < args.len() {
                    config.frames = args[i + 1].parse().unwrap_or(config.frames);
                    i += 1;
                }
            }
            "--draws" | "-d" => {
                if i + 1 < args.len() {
                    config.scene.draws_per_frame =
                        args[i + 1].parse().unwrap_or(config.scene.draws_per_frame);
                    i += 1;
                }
            }
            "--offscreen-every" | "-o" => {
                if i + 1 < args.len() {
                    config.scene.offscreen_every =
                        args[i + 1].parse().unwrap_or(config.scene.offscreen_every);
                    i += 1;
                }
            }
            "--ids" => {
                if i + 1 < args.len() {
                    config.id_capacity = args[i + 1].parse().unwrap_or(config.id_capacity);
                    i += 1;
                }
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Usage: frame_pump [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -f, --frames <NUM>           Frames to record (default: 600)");
                println!("  -d, --draws <NUM>            Draw calls per frame (default: 64)");
                println!("  -o, --offscreen-every <NUM>  Offscreen pass period, 0 = off (default: 8)");
                println!("      --ids <NUM>              Ids per resource kind (default: 4096)");
                println!("  -c, --config <PATH>          Queue configuration (TOML)");
                println!("  -h, --help                   Show this help");
                return;
            }
            other => {
                eprintln!("Ignoring unknown argument: {other}");
            }
        }
        i += 1;
    }

    if let Some(path) = config_path {
        match QueueConfig::load(&path) {
            Ok(queue) => config.queue = queue,
            Err(e) => {
                eprintln!("ERROR: {e}");
                std::process::exit(1);
            }
        }
    }

    println!("┌─ CONFIGURATION ─────────────────────────────────────────────────┐");
    println!("│ Frames:             {}", config.frames);
    println!("│ Draws per frame:    {}", config.scene.draws_per_frame);
    println!("│ Offscreen every:    {}", config.scene.offscreen_every);
    println!("│ Ids per kind:       {}", config.id_capacity);
    println!("│ Records per buffer: {}", config.queue.initial_command_capacity);
    println!("│ Extra frames:       {}", config.queue.cleanup_extra_frames);
    println!(
        "│ Default pass:       {}x{}",
        config.queue.default_pass_width, config.queue.default_pass_height
    );
    println!("└─────────────────────────────────────────────────────────────────┘");
    println!();

    let report = match FramePump::new(config).run() {
        Ok(report) => report,
        Err(e) => {
            eprintln!("ERROR: {e}");
            std::process::exit(1);
        }
    };

    println!("┌─ REPLAY ────────────────────────────────────────────────────────┐");
    println!("│ Buffers replayed:   {}", report.stats.buffers_replayed);
    println!("│ Buffers flushed:    {}", report.stats.buffers_flushed);
    println!("│ Records executed:   {}", report.stats.records_executed);
    println!("│ Records skipped:    {}", report.stats.records_skipped);
    println!("│ Elapsed:            {:.2?}", report.elapsed);
    println!("│ Throughput:         {:.1} frames/s", report.frames_per_second());
    println!("└─────────────────────────────────────────────────────────────────┘");
    println!();

    let counts = report.counts;
    println!("┌─ BACKEND ───────────────────────────────────────────────────────┐");
    println!("│ Inits / uninits:    {} / {}", counts.inits, counts.uninits);
    println!("│ Uploads:            {} ({} bytes)", counts.uploads, counts.upload_bytes);
    println!("│ Passes:             {}", counts.passes);
    println!("│ Draws:              {}", counts.draws);
    println!("│ Uniform uploads:    {}", counts.uniform_uploads);
    println!("│ State changes:      {}", counts.state_changes);
    println!("│ Commits:            {}", counts.commits);
    println!("│ Violations:         {}", counts.violations);
    println!("│ Live resources:     {}", report.live_resources);
    println!("│ Live ids:           {}", report.live_ids.total());
    println!("└─────────────────────────────────────────────────────────────────┘");
    println!();

    if report.is_clean() {
        println!("✓ Clean run: every resource and id released, no violations");
    } else {
        println!("✗ Dirty run");
        std::process::exit(2);
    }
}
