//! # TANDEM
//!
//! Scenario driver for [`tandem_core`]: records a scripted scene on the
//! calling thread, replays it on a render thread against a backend that
//! counts calls and tracks resource lifetimes, then reports.
//!
//! ## Example
//!
//! ```rust
//! use tandem::{FramePump, PumpConfig};
//!
//! let report = FramePump::new(PumpConfig { frames: 10, ..PumpConfig::default() }).run()?;
//! assert!(report.is_clean());
//! # Ok::<(), tandem::PumpError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod counting;
pub mod pump;
pub mod scene;

pub use counting::{CallCounts, CountingBackend};
pub use pump::{FramePump, PumpConfig, PumpError, PumpReport, PumpResult};
pub use scene::{Scene, SceneConfig};
