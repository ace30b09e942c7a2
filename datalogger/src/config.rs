use driver::BiasMode;
use heapless::String;

use crate::error::ConfigError;

/// Longest accepted artifact base name
pub const FILE_BASE_CAPACITY: usize = 24;

pub const DEFAULT_SAMPLE_COUNT: u32 = 1000;
pub const DEFAULT_SAMPLE_PERIOD_MS: u32 = 100;
pub const DEFAULT_FILE_BASE: &str = "med_imu";
pub const DEFAULT_CHECKPOINT_EVERY: u32 = 50;

/// Parameters of a capture session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureConfig {
    /// Samples taken before the session completes on its own
    pub sample_count: u32,
    /// Pause after each written sample
    pub sample_period_ms: u32,
    /// Artifacts are named `<file_base><counter>.csv`
    pub file_base: String<FILE_BASE_CAPACITY>,
    /// Console checkpoint cadence, in samples
    pub checkpoint_every: u32,
}

impl CaptureConfig {
    /// Replace the artifact base name. Fails when it does not fit.
    pub fn with_file_base(mut self, base: &str) -> Result<Self, ConfigError> {
        self.file_base = String::try_from(base).map_err(|_| ConfigError::FileBaseTooLong {
            max: FILE_BASE_CAPACITY,
        })?;
        Ok(self)
    }

    pub fn with_sample_count(mut self, count: u32) -> Self {
        self.sample_count = count;
        self
    }

    pub fn with_sample_period_ms(mut self, period_ms: u32) -> Self {
        self.sample_period_ms = period_ms;
        self
    }

    /// Nominal session length at the configured count and period
    pub fn estimated_duration_ms(&self) -> u64 {
        self.sample_count as u64 * self.sample_period_ms as u64
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        let mut file_base = String::new();
        // Always fits
        let _ = file_base.push_str(DEFAULT_FILE_BASE);

        Self {
            sample_count: DEFAULT_SAMPLE_COUNT,
            sample_period_ms: DEFAULT_SAMPLE_PERIOD_MS,
            file_base,
            checkpoint_every: DEFAULT_CHECKPOINT_EVERY,
        }
    }
}

/// Bring-up parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartupConfig {
    /// Attempts for init and for calibration, each
    pub init_attempts: u8,
    pub calibration_samples: u16,
    /// Whether the measured bias is applied to samples
    pub bias_mode: BiasMode,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            init_attempts: 3,
            calibration_samples: 100,
            bias_mode: BiasMode::Ignore,
        }
    }
}
