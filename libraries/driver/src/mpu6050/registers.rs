//! MPU-6050 register map
//!
//! Based on the MPU-6000/MPU-6050 Register Map and Descriptions (RM-MPU-6000A-00).

#![allow(dead_code)]

// MPU-6050 I2C addresses (depends on AD0 pin state)
pub const MPU6050_I2C_ADDR_PRIMARY: u8 = 0x68;
pub const MPU6050_I2C_ADDR_SECONDARY: u8 = 0x69;

// Configuration registers
pub const MPU6050_REG_SMPLRT_DIV: u8 = 0x19;
pub const MPU6050_REG_CONFIG: u8 = 0x1A;
pub const MPU6050_REG_GYRO_CONFIG: u8 = 0x1B;
pub const MPU6050_REG_ACCEL_CONFIG: u8 = 0x1C;

// Data registers, big-endian high byte first
pub const MPU6050_REG_ACCEL_XOUT_H: u8 = 0x3B;
pub const MPU6050_REG_TEMP_OUT_H: u8 = 0x41;
pub const MPU6050_REG_GYRO_XOUT_H: u8 = 0x43;

// Power management and identification
pub const MPU6050_REG_PWR_MGMT_1: u8 = 0x6B;
pub const MPU6050_REG_WHO_AM_I: u8 = 0x75;

/// Expected WHO_AM_I contents
pub const MPU6050_WHO_AM_I_VALUE: u8 = 0x68;

// PWR_MGMT_1 values
pub const MPU6050_PWR_WAKE: u8 = 0x00;
pub const MPU6050_PWR_DEVICE_RESET: u8 = 0x80;
pub const MPU6050_PWR_SLEEP: u8 = 0x40;

/// Full-scale selector position inside ACCEL_CONFIG / GYRO_CONFIG
pub const MPU6050_FS_SEL_SHIFT: u8 = 3;

/// Accel X/Y/Z, temperature, gyro X/Y/Z: seven big-endian words
pub const MPU6050_BURST_LEN: usize = 14;

/// Offset of the gyro block inside a burst read (temperature sits at 6..8)
pub const MPU6050_BURST_GYRO_OFFSET: usize = 8;

/// Settling time after wake-up or reset
pub const MPU6050_STARTUP_DELAY_MS: u32 = 100;
