//! Simulated MPU-6050 on an in-process I2C bus
//!
//! The device keeps a register file like the real part. Each burst read from
//! ACCEL_XOUT_H synthesizes a fresh sample: gravity on Z, a slow sway on X/Y,
//! slow rotation rates, plus fixed offsets for calibration to find. Values are
//! quantized with the sensitivity of the programmed full-scale range.

use std::f32::consts::TAU;
use std::time::Instant;

use driver::mpu6050::registers::*;
use embedded_hal::i2c::{Error, ErrorKind, NoAcknowledgeSource};
use embedded_hal_async::i2c::{ErrorType, I2c, Operation};

const REGISTER_COUNT: usize = 128;
const GYRO_SENSITIVITY: [f32; 4] = [131.0, 65.5, 32.8, 16.4];
/// 25 °C in the temperature register encoding
const TEMP_RAW_25C: i16 = -3920;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimI2cError {
    Nack,
}

impl Error for SimI2cError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
    }
}

/// Motion profile of the simulated device
#[derive(Debug, Clone, Copy)]
pub struct SimMotion {
    /// Zero-input accelerometer offset, g
    pub accel_offset: [f32; 3],
    /// Zero-input gyroscope offset, °/s
    pub gyro_offset: [f32; 3],
    /// Amplitude of the X/Y sway, g
    pub sway_g: f32,
    /// Amplitude of the rotation rates, °/s
    pub rate_dps: f32,
    pub frequency_hz: f32,
}

impl Default for SimMotion {
    fn default() -> Self {
        Self {
            accel_offset: [0.012, -0.008, 0.015],
            gyro_offset: [0.6, -0.4, 0.9],
            sway_g: 0.05,
            rate_dps: 12.0,
            frequency_hz: 0.2,
        }
    }
}

impl SimMotion {
    /// A device at rest with no offsets
    pub fn still() -> Self {
        Self {
            accel_offset: [0.0; 3],
            gyro_offset: [0.0; 3],
            sway_g: 0.0,
            rate_dps: 0.0,
            frequency_hz: 0.0,
        }
    }

    /// Physical sample at `t` seconds: (accel g, gyro °/s)
    pub fn at(&self, t: f32) -> ([f32; 3], [f32; 3]) {
        let phase = TAU * self.frequency_hz * t;
        let accel = [
            self.accel_offset[0] + self.sway_g * phase.sin(),
            self.accel_offset[1] + self.sway_g * phase.cos() - self.sway_g,
            self.accel_offset[2] + 1.0,
        ];
        let gyro = [
            self.gyro_offset[0] + self.rate_dps * phase.cos(),
            self.gyro_offset[1] - self.rate_dps * phase.sin(),
            self.gyro_offset[2],
        ];
        (accel, gyro)
    }
}

pub struct SimulatedMpu6050 {
    address: u8,
    motion: SimMotion,
    registers: [u8; REGISTER_COUNT],
    pointer: usize,
    origin: Instant,
}

impl SimulatedMpu6050 {
    pub fn new(motion: SimMotion) -> Self {
        let mut sim = Self {
            address: MPU6050_I2C_ADDR_PRIMARY,
            motion,
            registers: [0; REGISTER_COUNT],
            pointer: 0,
            origin: Instant::now(),
        };
        sim.power_on_reset();
        sim
    }

    fn power_on_reset(&mut self) {
        self.registers = [0; REGISTER_COUNT];
        self.registers[MPU6050_REG_PWR_MGMT_1 as usize] = MPU6050_PWR_SLEEP;
        self.registers[MPU6050_REG_WHO_AM_I as usize] = MPU6050_WHO_AM_I_VALUE;
    }

    fn asleep(&self) -> bool {
        self.registers[MPU6050_REG_PWR_MGMT_1 as usize] & MPU6050_PWR_SLEEP != 0
    }

    fn range_selector(&self, reg: u8) -> usize {
        ((self.registers[reg as usize] >> MPU6050_FS_SEL_SHIFT) & 0x03) as usize
    }

    /// Latch a new sample into the data registers
    fn sample(&mut self) {
        if self.asleep() {
            return;
        }
        let (accel, gyro) = self.motion.at(self.origin.elapsed().as_secs_f32());
        let accel_sensitivity = (16384u32 >> self.range_selector(MPU6050_REG_ACCEL_CONFIG)) as f32;
        let gyro_sensitivity = GYRO_SENSITIVITY[self.range_selector(MPU6050_REG_GYRO_CONFIG)];

        let base = MPU6050_REG_ACCEL_XOUT_H as usize;
        for axis in 0..3 {
            self.put(base + axis * 2, quantize(accel[axis], accel_sensitivity));
            self.put(
                base + MPU6050_BURST_GYRO_OFFSET + axis * 2,
                quantize(gyro[axis], gyro_sensitivity),
            );
        }
        self.put(MPU6050_REG_TEMP_OUT_H as usize, TEMP_RAW_25C);
    }

    fn put(&mut self, at: usize, value: i16) {
        self.registers[at..at + 2].copy_from_slice(&value.to_be_bytes());
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        let Some((reg, data)) = bytes.split_first() else {
            return;
        };
        self.pointer = *reg as usize % REGISTER_COUNT;
        for value in data {
            if self.pointer == MPU6050_REG_PWR_MGMT_1 as usize
                && value & MPU6050_PWR_DEVICE_RESET != 0
            {
                self.power_on_reset();
            } else {
                self.registers[self.pointer] = *value;
            }
            self.pointer = (self.pointer + 1) % REGISTER_COUNT;
        }
    }

    fn read_bytes(&mut self, buffer: &mut [u8]) {
        if self.pointer == MPU6050_REG_ACCEL_XOUT_H as usize {
            self.sample();
        }
        for byte in buffer.iter_mut() {
            *byte = self.registers[self.pointer];
            self.pointer = (self.pointer + 1) % REGISTER_COUNT;
        }
    }
}

fn quantize(value: f32, sensitivity: f32) -> i16 {
    (value * sensitivity)
        .round()
        .clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

impl ErrorType for SimulatedMpu6050 {
    type Error = SimI2cError;
}

impl I2c for SimulatedMpu6050 {
    async fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if address != self.address {
            return Err(SimI2cError::Nack);
        }
        for operation in operations.iter_mut() {
            match operation {
                Operation::Write(bytes) => self.write_bytes(bytes),
                Operation::Read(buffer) => self.read_bytes(buffer),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::TokioDelay;
    use driver::{AccelRange, GyroRange, Mpu6050, Mpu6050Config};

    #[tokio::test]
    async fn test_driver_reads_gravity() {
        let sim = SimulatedMpu6050::new(SimMotion::still());
        let mut imu = Mpu6050::new(sim, TokioDelay, Mpu6050Config::default());

        imu.init().await.unwrap();
        let sample = imu.read_calibrated().await.unwrap();

        assert_eq!(imu.who_am_i().await.unwrap(), MPU6050_WHO_AM_I_VALUE);
        assert!((sample.accel.z - 1.0).abs() < 1e-3);
        assert!(sample.accel.x.abs() < 1e-3);
        assert!(sample.gyro.x.abs() < 1e-2);
        assert!(sample.gyro.y.abs() < 1e-2);
        assert!(sample.gyro.z.abs() < 1e-2);
    }

    #[tokio::test]
    async fn test_quantization_follows_range() {
        let sim = SimulatedMpu6050::new(SimMotion::still());
        let config = Mpu6050Config {
            accel_range: AccelRange::G8,
            gyro_range: GyroRange::Dps2000,
            ..Default::default()
        };
        let mut imu = Mpu6050::new(sim, TokioDelay, config);

        imu.init().await.unwrap();
        let raw = imu.read_raw().await.unwrap();

        assert_eq!(raw.accel.z, 4096);
    }

    #[tokio::test]
    async fn test_asleep_until_woken() {
        let sim = SimulatedMpu6050::new(SimMotion::still());
        let mut imu = Mpu6050::new(sim, TokioDelay, Mpu6050Config::default());

        let raw = imu.read_raw().await.unwrap();
        assert_eq!(raw.accel.z, 0);

        imu.init().await.unwrap();
        assert_eq!(imu.read_raw().await.unwrap().accel.z, 16384);

        imu.reset().await.unwrap();
        assert_eq!(imu.read_raw().await.unwrap().accel.z, 0);
        assert_eq!(imu.i2c().registers[MPU6050_REG_PWR_MGMT_1 as usize], MPU6050_PWR_SLEEP);
    }

    #[test]
    fn test_motion_offsets() {
        let motion = SimMotion {
            sway_g: 0.0,
            rate_dps: 0.0,
            ..Default::default()
        };
        let (accel, gyro) = motion.at(3.0);
        assert!((accel[2] - 1.015).abs() < 1e-6);
        assert!((gyro[2] - 0.9).abs() < 1e-6);
    }
}
