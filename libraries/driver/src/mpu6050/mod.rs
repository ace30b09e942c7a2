//! MPU-6050 6-axis IMU driver
//!
//! Accelerometer and gyroscope access over I2C: wake-up, full-scale range
//! configuration, burst reads, conversion to g and °/s, and zero-offset
//! calibration.

pub mod bus;
pub mod calibration;
pub mod config;
pub mod registers;

mod driver;

pub use bus::RegisterBus;
pub use calibration::BiasVector;
pub use config::{AccelRange, BiasMode, GyroRange, Mpu6050Config};
pub use driver::{Mpu6050, RawSample};
