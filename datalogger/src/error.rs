use core::fmt::Debug;

use thiserror::Error;

/// Reasons a capture session ends early
///
/// `S` is the storage error type, `I` the sensor error type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CaptureError<S: Debug, I: Debug> {
    /// Creating, writing or closing the artifact failed
    #[error("Storage error: {0:?}")]
    Storage(S),

    /// The sensor could not be read mid-session
    #[error("Sensor error: {0:?}")]
    Sensor(I),

    /// A record or file name did not fit its fixed buffer
    #[error("Formatted text exceeds its buffer")]
    RecordOverflow,
}

/// Invalid capture configuration
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("File base is longer than {max} characters")]
    FileBaseTooLong { max: usize },
}
