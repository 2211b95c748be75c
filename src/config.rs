use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

/// Runtime configuration for the compression stage.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Configuration {
    /// Edge length of compressed textures; also the resample threshold.
    pub target_size: u32,
    /// How often a waiting requester logs that it is still queued.
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
    /// Cadence of the tick driver when the queue is idle.
    #[serde(with = "humantime_serde")]
    pub tick_interval: Duration,
    /// Quality passed to the JPEG encoder (1-100).
    pub jpeg_quality: u8,
}

/// The subset of [`Configuration`] consumed by the pixel pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionSettings {
    pub target_size: u32,
    pub jpeg_quality: u8,
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Ok(serde_yaml::from_str(&s)?)
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(self) -> Result<Self> {
        ensure!(self.target_size > 0, "target-size must be greater than zero");
        ensure!(
            (1..=100).contains(&self.jpeg_quality),
            "jpeg-quality must be within 1..=100"
        );
        ensure!(
            !self.poll_interval.is_zero(),
            "poll-interval must be greater than zero"
        );
        ensure!(
            !self.tick_interval.is_zero(),
            "tick-interval must be greater than zero"
        );
        Ok(self)
    }

    pub fn settings(&self) -> CompressionSettings {
        CompressionSettings {
            target_size: self.target_size,
            jpeg_quality: self.jpeg_quality,
        }
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            target_size: 512,
            poll_interval: Duration::from_millis(250),
            tick_interval: Duration::from_millis(16),
            jpeg_quality: 75,
        }
    }
}

impl Default for CompressionSettings {
    fn default() -> Self {
        Configuration::default().settings()
    }
}
