use thiserror::Error;

/// Invalid driver configuration
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid accelerometer range selector: {0}")]
    InvalidAccelRange(u8),

    #[error("Invalid gyroscope range selector: {0}")]
    InvalidGyroRange(u8),

    #[error("Calibration needs at least one sample")]
    NoCalibrationSamples,
}

/// Errors raised by the MPU-6050 driver
///
/// `E` is the error type of the underlying I2C bus.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mpu6050Error<E> {
    /// A register transaction failed or was not acknowledged
    #[error("Bus error: {0:?}")]
    Bus(E),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),
}
