//! IMU (Inertial Measurement Unit) sensor interface
use crate::types::CalibratedSample;

/// 6-axis IMU interface consumed by the capture loop
pub trait ImuSensor {
    /// Error raised when the device cannot be read
    type Error: core::fmt::Debug;

    /// Read one sample converted to g and degrees per second
    async fn read_sample(&mut self) -> Result<CalibratedSample, Self::Error>;
}
