//! MPU-6050 configuration types

use super::registers::MPU6050_FS_SEL_SHIFT;
use super::registers::MPU6050_I2C_ADDR_PRIMARY;
use crate::error::ConfigError;

/// Accelerometer full-scale range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccelRange {
    /// ±2 g
    #[default]
    G2 = 0,
    /// ±4 g
    G4 = 1,
    /// ±8 g
    G8 = 2,
    /// ±16 g
    G16 = 3,
}

impl AccelRange {
    pub const ALL: [AccelRange; 4] = [
        AccelRange::G2,
        AccelRange::G4,
        AccelRange::G8,
        AccelRange::G16,
    ];

    /// Raw counts per g
    pub fn sensitivity(self) -> f32 {
        match self {
            AccelRange::G2 => 16384.0,
            AccelRange::G4 => 8192.0,
            AccelRange::G8 => 4096.0,
            AccelRange::G16 => 2048.0,
        }
    }

    /// ACCEL_CONFIG byte selecting this range
    pub fn register_value(self) -> u8 {
        (self as u8) << MPU6050_FS_SEL_SHIFT
    }

    pub fn full_scale_g(self) -> u8 {
        2 << (self as u8)
    }
}

impl TryFrom<u8> for AccelRange {
    type Error = ConfigError;

    fn try_from(selector: u8) -> Result<Self, Self::Error> {
        match selector {
            0 => Ok(AccelRange::G2),
            1 => Ok(AccelRange::G4),
            2 => Ok(AccelRange::G8),
            3 => Ok(AccelRange::G16),
            other => Err(ConfigError::InvalidAccelRange(other)),
        }
    }
}

/// Gyroscope full-scale range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GyroRange {
    /// ±250 °/s
    #[default]
    Dps250 = 0,
    /// ±500 °/s
    Dps500 = 1,
    /// ±1000 °/s
    Dps1000 = 2,
    /// ±2000 °/s
    Dps2000 = 3,
}

impl GyroRange {
    pub const ALL: [GyroRange; 4] = [
        GyroRange::Dps250,
        GyroRange::Dps500,
        GyroRange::Dps1000,
        GyroRange::Dps2000,
    ];

    /// Raw counts per degree per second
    pub fn sensitivity(self) -> f32 {
        match self {
            GyroRange::Dps250 => 131.0,
            GyroRange::Dps500 => 65.5,
            GyroRange::Dps1000 => 32.8,
            GyroRange::Dps2000 => 16.4,
        }
    }

    /// GYRO_CONFIG byte selecting this range
    pub fn register_value(self) -> u8 {
        (self as u8) << MPU6050_FS_SEL_SHIFT
    }

    pub fn full_scale_dps(self) -> u16 {
        250 << (self as u16)
    }
}

impl TryFrom<u8> for GyroRange {
    type Error = ConfigError;

    fn try_from(selector: u8) -> Result<Self, Self::Error> {
        match selector {
            0 => Ok(GyroRange::Dps250),
            1 => Ok(GyroRange::Dps500),
            2 => Ok(GyroRange::Dps1000),
            3 => Ok(GyroRange::Dps2000),
            other => Err(ConfigError::InvalidGyroRange(other)),
        }
    }
}

/// Whether `read_calibrated` subtracts the stored bias
///
/// The appliance computes a bias at startup but historically never applied
/// it, so `Ignore` is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BiasMode {
    #[default]
    Ignore,
    Subtract,
}

/// Configuration for the MPU-6050
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mpu6050Config {
    /// I2C address (0x68 or 0x69)
    pub address: u8,

    /// Accelerometer full-scale range
    pub accel_range: AccelRange,

    /// Gyroscope full-scale range
    pub gyro_range: GyroRange,

    /// Bias handling in `read_calibrated`
    pub bias_mode: BiasMode,
}

impl Default for Mpu6050Config {
    fn default() -> Self {
        Self {
            address: MPU6050_I2C_ADDR_PRIMARY,
            accel_range: AccelRange::G2,
            gyro_range: GyroRange::Dps250,
            bias_mode: BiasMode::Ignore,
        }
    }
}
