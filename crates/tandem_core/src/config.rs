//! # Queue Configuration
//!
//! Loaded once at startup, usually from a TOML file:
//!
//! ```toml
//! initial_command_capacity = 1024
//! initial_cleanup_capacity = 128
//! cleanup_extra_frames = 1
//! default_pass_width = 1920
//! default_pass_height = 1080
//! ```
//!
//! Every key is optional; missing keys take the [`Default`] value.

use std::path::Path;

use serde::Deserialize;

use crate::error::{QueueError, QueueResult};

/// Configuration for a [`CommandQueue`](crate::CommandQueue).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueueConfig {
    /// Records reserved up front in each of the two command buffers.
    pub initial_command_capacity: usize,
    /// Cleanup actions reserved up front.
    pub initial_cleanup_capacity: usize,
    /// Extra frames added on top of the mandatory one-frame delay before a
    /// destroyed resource's handle is released.
    pub cleanup_extra_frames: u64,
    /// Width handed to the backend for the default pass.
    pub default_pass_width: u32,
    /// Height handed to the backend for the default pass.
    pub default_pass_height: u32,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            initial_command_capacity: 512,
            initial_cleanup_capacity: 128,
            cleanup_extra_frames: 0,
            default_pass_width: 1280,
            default_pass_height: 720,
        }
    }
}

impl QueueConfig {
    /// Parses and validates a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::InvalidConfig`] if the text is not valid TOML,
    /// names an unknown key, or fails [`QueueConfig::validate`].
    pub fn from_toml_str(text: &str) -> QueueResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| QueueError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::ConfigRead`] if the file cannot be read or
    /// parsed, and [`QueueError::InvalidConfig`] if validation fails.
    pub fn load(path: impl AsRef<Path>) -> QueueResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| QueueError::ConfigRead {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let config: Self = toml::from_str(&text).map_err(|e| QueueError::ConfigRead {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> QueueResult<()> {
        if self.initial_command_capacity == 0 {
            return Err(QueueError::InvalidConfig(
                "initial_command_capacity must be greater than zero".into(),
            ));
        }
        if self.initial_cleanup_capacity == 0 {
            return Err(QueueError::InvalidConfig(
                "initial_cleanup_capacity must be greater than zero".into(),
            ));
        }
        if self.default_pass_width == 0 || self.default_pass_height == 0 {
            return Err(QueueError::InvalidConfig(format!(
                "default pass size must be non-zero, got {}x{}",
                self.default_pass_width, self.default_pass_height
            )));
        }
        Ok(())
    }
}
