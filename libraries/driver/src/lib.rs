#![cfg_attr(not(any(test, feature = "mock")), no_std)]

pub mod error;
pub mod mpu6050;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::{ConfigError, Mpu6050Error};
pub use mpu6050::{
    AccelRange, BiasMode, BiasVector, GyroRange, Mpu6050, Mpu6050Config, RawSample, RegisterBus,
};
