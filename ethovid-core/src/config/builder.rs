// ============================================================================
// ethovid-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for CoreConfig
//
// AI-ASSISTANT-INFO: Builder pattern implementation for CoreConfig

use std::path::PathBuf;

use super::CoreConfig;

/// Builder for creating `CoreConfig` instances.
///
/// # Examples
///
/// ```rust
/// use ethovid_core::config::CoreConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = CoreConfigBuilder::new()
///     .input_dir(PathBuf::from("/path/to/input"))
///     .output_dir(PathBuf::from("/path/to/output"))
///     .worker_pool_size(2)
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct CoreConfigBuilder {
    inner: CoreConfig,
}

impl Default for CoreConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CoreConfigBuilder {
    /// Creates a new builder seeded with `CoreConfig::default()`.
    pub fn new() -> Self {
        Self {
            inner: CoreConfig::default(),
        }
    }

    pub fn input_dir(mut self, dir: PathBuf) -> Self {
        self.inner.input_dir = dir;
        self
    }

    pub fn output_dir(mut self, dir: PathBuf) -> Self {
        self.inner.output_dir = dir;
        self
    }

    pub fn upload_dir(mut self, dir: PathBuf) -> Self {
        self.inner.upload_dir = dir;
        self
    }

    pub fn temp_dir(mut self, dir: PathBuf) -> Self {
        self.inner.temp_dir = dir;
        self
    }

    pub fn worker_pool_size(mut self, size: usize) -> Self {
        self.inner.worker_pool_size = size.max(1);
        self
    }

    pub fn default_profile(mut self, name: &str) -> Self {
        self.inner.default_profile = name.to_string();
        self
    }

    pub fn activity_thresholds(mut self, high: f64, medium: f64, low: f64) -> Self {
        self.inner.high_threshold = high;
        self.inner.medium_threshold = medium;
        self.inner.low_threshold = low;
        self
    }

    pub fn max_segment_seconds(mut self, seconds: f64) -> Self {
        self.inner.max_segment_seconds = seconds;
        self
    }

    pub fn min_inactive_duration(mut self, seconds: f64) -> Self {
        self.inner.min_inactive_duration = seconds;
        self
    }

    pub fn max_file_size_bytes(mut self, bytes: u64) -> Self {
        self.inner.max_file_size_bytes = bytes;
        self
    }

    pub fn history_retention_secs(mut self, secs: u64) -> Self {
        self.inner.history_retention_secs = secs;
        self
    }

    /// Builds the `CoreConfig`. Unlike a fallible builder, all fields carry
    /// usable defaults, so `build` never fails.
    pub fn build(self) -> CoreConfig {
        self.inner
    }
}
