//! MPU-6050 I2C driver implementation

use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;
use hal::{CalibratedSample, ImuSensor, Vector3, Vector3d};

use super::bus::RegisterBus;
use super::calibration::BiasVector;
use super::config::{AccelRange, BiasMode, GyroRange, Mpu6050Config};
use super::registers::*;
use crate::error::Mpu6050Error;

/// One burst read in device units, register order X, Y, Z
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSample {
    pub accel: Vector3<i16>,
    pub gyro: Vector3<i16>,
}

impl RawSample {
    pub fn new(accel: [i16; 3], gyro: [i16; 3]) -> Self {
        Self {
            accel: Vector3::from(accel),
            gyro: Vector3::from(gyro),
        }
    }

    /// Decode a 14-byte burst starting at ACCEL_XOUT_H. Bytes 6..8 hold the
    /// temperature and are skipped.
    pub fn from_burst(buffer: &[u8; MPU6050_BURST_LEN]) -> Self {
        let word = |offset: usize| i16::from_be_bytes([buffer[offset], buffer[offset + 1]]);
        let gyro = MPU6050_BURST_GYRO_OFFSET;

        Self {
            accel: Vector3::new(word(0), word(2), word(4)),
            gyro: Vector3::new(word(gyro), word(gyro + 2), word(gyro + 4)),
        }
    }
}

/// MPU-6050 driver
///
/// Owns the bus and a delay provider. Sensitivities follow the configured
/// full-scale ranges and are refreshed whenever the ranges are programmed.
pub struct Mpu6050<I2C, D> {
    bus: RegisterBus<I2C>,
    delay: D,
    config: Mpu6050Config,
    /// Raw counts per g
    accel_sensitivity: f32,
    /// Raw counts per °/s
    gyro_sensitivity: f32,
    bias: BiasVector,
    initialized: bool,
}

impl<I2C: I2c, D: DelayNs> Mpu6050<I2C, D> {
    /// Create a driver. No bus traffic happens until `init`.
    pub fn new(i2c: I2C, delay: D, config: Mpu6050Config) -> Self {
        Self {
            bus: RegisterBus::new(i2c, config.address),
            delay,
            config,
            accel_sensitivity: config.accel_range.sensitivity(),
            gyro_sensitivity: config.gyro_range.sensitivity(),
            bias: BiasVector::default(),
            initialized: false,
        }
    }

    /// Wake the device and program the configured ranges
    pub async fn init(&mut self) -> Result<(), Mpu6050Error<I2C::Error>> {
        self.wake_up().await?;
        self.configure_ranges(self.config.accel_range, self.config.gyro_range)
            .await?;

        self.initialized = true;
        log::info!(
            "MPU-6050 at {:#04x} ready: ±{} g, ±{} °/s",
            self.bus.address(),
            self.config.accel_range.full_scale_g(),
            self.config.gyro_range.full_scale_dps()
        );
        Ok(())
    }

    /// Clear the sleep bit and wait for the device to settle
    pub async fn wake_up(&mut self) -> Result<(), Mpu6050Error<I2C::Error>> {
        self.bus
            .write_register(MPU6050_REG_PWR_MGMT_1, MPU6050_PWR_WAKE)
            .await?;
        self.delay.delay_ms(MPU6050_STARTUP_DELAY_MS).await;
        Ok(())
    }

    /// Set the device reset bit and wait for the device to settle
    ///
    /// The device comes back asleep with default ranges; call `init` again.
    pub async fn reset(&mut self) -> Result<(), Mpu6050Error<I2C::Error>> {
        self.initialized = false;
        self.bus
            .write_register(MPU6050_REG_PWR_MGMT_1, MPU6050_PWR_DEVICE_RESET)
            .await?;
        self.delay.delay_ms(MPU6050_STARTUP_DELAY_MS).await;
        Ok(())
    }

    /// Program both full-scale ranges and adopt their sensitivities
    pub async fn configure_ranges(
        &mut self,
        accel_range: AccelRange,
        gyro_range: GyroRange,
    ) -> Result<(), Mpu6050Error<I2C::Error>> {
        self.bus
            .write_register(MPU6050_REG_ACCEL_CONFIG, accel_range.register_value())
            .await?;
        self.bus
            .write_register(MPU6050_REG_GYRO_CONFIG, gyro_range.register_value())
            .await?;

        self.config.accel_range = accel_range;
        self.config.gyro_range = gyro_range;
        self.accel_sensitivity = accel_range.sensitivity();
        self.gyro_sensitivity = gyro_range.sensitivity();
        Ok(())
    }

    pub async fn who_am_i(&mut self) -> Result<u8, Mpu6050Error<I2C::Error>> {
        self.bus.read_register(MPU6050_REG_WHO_AM_I).await
    }

    /// Read accelerometer and gyroscope in one 14-byte burst
    pub async fn read_raw(&mut self) -> Result<RawSample, Mpu6050Error<I2C::Error>> {
        let mut buffer = [0u8; MPU6050_BURST_LEN];
        self.bus
            .read_registers(MPU6050_REG_ACCEL_XOUT_H, &mut buffer)
            .await?;
        Ok(RawSample::from_burst(&buffer))
    }

    /// Read one sample in g and °/s
    pub async fn read_calibrated(&mut self) -> Result<CalibratedSample, Mpu6050Error<I2C::Error>> {
        let raw = self.read_raw().await?;
        Ok(self.convert(&raw))
    }

    /// Scale a raw sample by the current sensitivities
    ///
    /// The stored bias is subtracted first only in `BiasMode::Subtract`.
    pub fn convert(&self, raw: &RawSample) -> CalibratedSample {
        let (accel_bias, gyro_bias) = match self.config.bias_mode {
            BiasMode::Ignore => (Vector3::zeros(), Vector3::zeros()),
            BiasMode::Subtract => (self.bias.accel, self.bias.gyro),
        };

        CalibratedSample::new(
            scale(&raw.accel, &accel_bias, self.accel_sensitivity),
            scale(&raw.gyro, &gyro_bias, self.gyro_sensitivity),
        )
    }

    pub(crate) async fn pause_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms).await;
    }

    /// Store a bias for `BiasMode::Subtract`
    pub fn set_bias(&mut self, bias: BiasVector) {
        self.bias = bias;
    }

    pub fn bias(&self) -> &BiasVector {
        &self.bias
    }

    pub fn set_bias_mode(&mut self, mode: BiasMode) {
        self.config.bias_mode = mode;
    }

    pub fn bias_mode(&self) -> BiasMode {
        self.config.bias_mode
    }

    pub fn accel_sensitivity(&self) -> f32 {
        self.accel_sensitivity
    }

    pub fn gyro_sensitivity(&self) -> f32 {
        self.gyro_sensitivity
    }

    pub fn config(&self) -> &Mpu6050Config {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn i2c(&self) -> &I2C {
        self.bus.i2c()
    }

    pub fn i2c_mut(&mut self) -> &mut I2C {
        self.bus.i2c_mut()
    }

    pub fn release(self) -> (I2C, D) {
        (self.bus.release(), self.delay)
    }
}

fn scale(raw: &Vector3<i16>, bias: &Vector3<i32>, sensitivity: f32) -> Vector3d {
    raw.map(i32::from)
        .zip_map(bias, |value, offset| (value - offset) as f32 / sensitivity)
}

impl<I2C: I2c, D: DelayNs> ImuSensor for Mpu6050<I2C, D> {
    type Error = Mpu6050Error<I2C::Error>;

    async fn read_sample(&mut self) -> Result<CalibratedSample, Self::Error> {
        self.read_calibrated().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockI2c, MockI2cError};
    use embassy_futures::block_on;
    use hal::mock::MockDelay;

    fn driver(mock: MockI2c, config: Mpu6050Config) -> Mpu6050<MockI2c, MockDelay> {
        Mpu6050::new(mock, MockDelay::detached(), config)
    }

    fn assert_vec_eq(actual: &Vector3d, expected: [f32; 3]) {
        for axis in 0..3 {
            assert!(
                (actual[axis] - expected[axis]).abs() < 1e-6,
                "axis {}: expected {}, got {}",
                axis,
                expected[axis],
                actual[axis]
            );
        }
    }

    #[test]
    fn test_init_sequence() {
        let mut imu = driver(MockI2c::new(), Mpu6050Config::default());
        block_on(imu.init()).unwrap();

        assert!(imu.is_initialized());
        assert_eq!(
            imu.i2c().register_writes(),
            &[
                (MPU6050_REG_PWR_MGMT_1, 0x00),
                (MPU6050_REG_ACCEL_CONFIG, 0x00),
                (MPU6050_REG_GYRO_CONFIG, 0x00),
            ]
        );

        let (_, delay) = imu.release();
        assert!(delay.total_ms() >= 100);
    }

    #[test]
    fn test_init_selects_sensitivity_for_every_range() {
        for accel_range in AccelRange::ALL {
            for gyro_range in GyroRange::ALL {
                let config = Mpu6050Config {
                    accel_range,
                    gyro_range,
                    ..Default::default()
                };
                let mut imu = driver(MockI2c::new(), config);
                block_on(imu.init()).unwrap();

                assert_eq!(imu.accel_sensitivity(), accel_range.sensitivity());
                assert_eq!(imu.gyro_sensitivity(), gyro_range.sensitivity());
                assert_eq!(
                    imu.i2c().register(MPU6050_REG_ACCEL_CONFIG),
                    (accel_range as u8) << 3
                );
                assert_eq!(
                    imu.i2c().register(MPU6050_REG_GYRO_CONFIG),
                    (gyro_range as u8) << 3
                );
            }
        }
    }

    #[test]
    fn test_sensitivity_table() {
        let expected_accel = [16384.0, 8192.0, 4096.0, 2048.0];
        let expected_gyro = [131.0, 65.5, 32.8, 16.4];

        for (range, expected) in AccelRange::ALL.iter().zip(expected_accel) {
            assert_eq!(range.sensitivity(), expected);
        }
        for (range, expected) in GyroRange::ALL.iter().zip(expected_gyro) {
            assert_eq!(range.sensitivity(), expected);
        }
    }

    #[test]
    fn test_reset_sets_reset_bit() {
        let mut imu = driver(MockI2c::new(), Mpu6050Config::default());
        block_on(imu.init()).unwrap();
        block_on(imu.reset()).unwrap();

        assert!(!imu.is_initialized());
        assert_eq!(
            imu.i2c().register_writes().last(),
            Some(&(MPU6050_REG_PWR_MGMT_1, 0x80))
        );
        let (_, delay) = imu.release();
        assert!(delay.total_ms() >= 200);
    }

    #[test]
    fn test_read_raw_skips_temperature() {
        let mut mock = MockI2c::with_sample([1, -2, 3], [-4, 5, -6]);
        mock.set_register(MPU6050_REG_TEMP_OUT_H, 0x7F);
        mock.set_register(MPU6050_REG_TEMP_OUT_H + 1, 0xFF);
        let mut imu = driver(mock, Mpu6050Config::default());

        let raw = block_on(imu.read_raw()).unwrap();

        assert_eq!(raw, RawSample::new([1, -2, 3], [-4, 5, -6]));
        assert_eq!(imu.i2c().burst_reads(), 1);
    }

    #[test]
    fn test_from_burst_big_endian() {
        let mut buffer = [0u8; MPU6050_BURST_LEN];
        buffer[0..2].copy_from_slice(&[0x80, 0x00]);
        buffer[2..4].copy_from_slice(&[0x7F, 0xFF]);
        buffer[4..6].copy_from_slice(&[0xFF, 0xFF]);
        buffer[6..8].copy_from_slice(&[0x12, 0x34]);
        buffer[8..10].copy_from_slice(&[0x00, 0x83]);
        buffer[12..14].copy_from_slice(&[0xFF, 0x7D]);

        let raw = RawSample::from_burst(&buffer);

        assert_eq!(raw, RawSample::new([-32768, 32767, -1], [131, 0, -131]));
    }

    #[test]
    fn test_read_calibrated_divides_by_sensitivity() {
        let cases: [([i16; 3], [i16; 3]); 3] = [
            ([-32768, 32767, 0], [32767, -32768, 1]),
            ([-1, 1, -16384], [-131, 262, -65]),
            ([8192, -8192, 12345], [0, 7, -9999]),
        ];

        for accel_range in AccelRange::ALL {
            for gyro_range in GyroRange::ALL {
                for (accel, gyro) in cases {
                    let config = Mpu6050Config {
                        accel_range,
                        gyro_range,
                        ..Default::default()
                    };
                    let mut imu = driver(MockI2c::with_sample(accel, gyro), config);
                    block_on(imu.init()).unwrap();

                    let sample = block_on(imu.read_calibrated()).unwrap();

                    let a = accel_range.sensitivity();
                    let g = gyro_range.sensitivity();
                    assert_vec_eq(
                        &sample.accel,
                        [accel[0] as f32 / a, accel[1] as f32 / a, accel[2] as f32 / a],
                    );
                    assert_vec_eq(
                        &sample.gyro,
                        [gyro[0] as f32 / g, gyro[1] as f32 / g, gyro[2] as f32 / g],
                    );
                }
            }
        }
    }

    #[test]
    fn test_end_to_end_conversion() {
        let mock = MockI2c::with_sample([16384, 0, 16384], [131, 0, -131]);
        let mut imu = driver(mock, Mpu6050Config::default());
        block_on(imu.init()).unwrap();

        let sample = block_on(imu.read_sample()).unwrap();

        assert_vec_eq(&sample.accel, [1.0, 0.0, 1.0]);
        assert_vec_eq(&sample.gyro, [1.0, 0.0, -1.0]);
    }

    #[test]
    fn test_bias_ignored_by_default() {
        let mock = MockI2c::with_sample([100, 0, 16384], [10, 0, 0]);
        let mut imu = driver(mock, Mpu6050Config::default());
        imu.set_bias(BiasVector {
            accel: Vector3::new(100, 0, 0),
            gyro: Vector3::new(10, 0, 0),
        });

        let sample = block_on(imu.read_calibrated()).unwrap();

        assert_vec_eq(&sample.accel, [100.0 / 16384.0, 0.0, 1.0]);
        assert_vec_eq(&sample.gyro, [10.0 / 131.0, 0.0, 0.0]);
    }

    #[test]
    fn test_bias_subtracted_when_enabled() {
        let mock = MockI2c::with_sample([100, -50, 16384], [141, 0, -121]);
        let mut imu = driver(mock, Mpu6050Config::default());
        imu.set_bias(BiasVector {
            accel: Vector3::new(100, -50, 0),
            gyro: Vector3::new(10, 0, 10),
        });
        imu.set_bias_mode(BiasMode::Subtract);

        let sample = block_on(imu.read_calibrated()).unwrap();

        assert_vec_eq(&sample.accel, [0.0, 0.0, 1.0]);
        assert_vec_eq(&sample.gyro, [1.0, 0.0, -1.0]);
    }

    #[test]
    fn test_bus_error_is_not_swallowed() {
        let mut mock = MockI2c::new();
        mock.set_failing(true);
        let mut imu = driver(mock, Mpu6050Config::default());

        assert_eq!(block_on(imu.init()), Err(Mpu6050Error::Bus(MockI2cError::Nack)));
        assert!(!imu.is_initialized());
        assert_eq!(
            block_on(imu.read_calibrated()),
            Err(Mpu6050Error::Bus(MockI2cError::Nack))
        );
    }

    #[test]
    fn test_who_am_i() {
        let mut imu = driver(MockI2c::new(), Mpu6050Config::default());
        assert_eq!(block_on(imu.who_am_i()), Ok(MPU6050_WHO_AM_I_VALUE));
    }
}
