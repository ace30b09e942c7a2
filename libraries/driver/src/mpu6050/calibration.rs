//! Zero-offset (bias) estimation
//!
//! The device must rest flat and still, Z axis up, while samples are taken.

use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;
use hal::Vector3;

use super::driver::Mpu6050;
use crate::error::{ConfigError, Mpu6050Error};

/// Pause between calibration reads
pub const CALIBRATION_PAUSE_MS: u32 = 10;

/// Per-axis offsets in raw counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BiasVector {
    pub accel: Vector3<i32>,
    pub gyro: Vector3<i32>,
}

impl Default for BiasVector {
    fn default() -> Self {
        Self {
            accel: Vector3::zeros(),
            gyro: Vector3::zeros(),
        }
    }
}

impl<I2C: I2c, D: DelayNs> Mpu6050<I2C, D> {
    /// Estimate the bias from `samples` raw reads
    ///
    /// Each axis bias is the mean truncated toward zero. The accelerometer Z
    /// bias is further reduced by one g worth of counts at the current range.
    /// The result is returned, not installed; see `set_bias`.
    pub async fn calibrate(
        &mut self,
        samples: u16,
    ) -> Result<BiasVector, Mpu6050Error<I2C::Error>> {
        if samples == 0 {
            return Err(ConfigError::NoCalibrationSamples.into());
        }

        // i32 holds u16::MAX samples of i16 without overflow
        let mut accel_sum = Vector3::<i32>::zeros();
        let mut gyro_sum = Vector3::<i32>::zeros();

        for _ in 0..samples {
            let raw = self.read_raw().await?;
            accel_sum += raw.accel.map(i32::from);
            gyro_sum += raw.gyro.map(i32::from);
            self.pause_ms(CALIBRATION_PAUSE_MS).await;
        }

        let count = i32::from(samples);
        let mut accel = accel_sum.map(|sum| sum / count);
        let gyro = gyro_sum.map(|sum| sum / count);

        // Sensitivity is always positive, so +0.5 then truncation rounds
        accel.z -= (self.accel_sensitivity() + 0.5) as i32;

        log::info!(
            "Calibrated over {} samples: accel bias [{}, {}, {}], gyro bias [{}, {}, {}]",
            samples,
            accel.x,
            accel.y,
            accel.z,
            gyro.x,
            gyro.y,
            gyro.z
        );

        Ok(BiasVector { accel, gyro })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockI2c, MockI2cError};
    use crate::mpu6050::{AccelRange, Mpu6050Config};
    use embassy_futures::block_on;
    use hal::mock::MockDelay;

    fn driver(mock: MockI2c, accel_range: AccelRange) -> Mpu6050<MockI2c, MockDelay> {
        let config = Mpu6050Config {
            accel_range,
            ..Default::default()
        };
        Mpu6050::new(mock, MockDelay::detached(), config)
    }

    #[test]
    fn test_single_sample_bias() {
        let mut mock = MockI2c::new();
        mock.push_sample([120, -40, 16500], [7, -3, 2]);
        mock.set_sample([0, 0, 0], [0, 0, 0]);
        let mut imu = driver(mock, AccelRange::G2);

        let bias = block_on(imu.calibrate(1)).unwrap();

        assert_eq!(bias.accel, Vector3::new(120, -40, 16500 - 16384));
        assert_eq!(bias.gyro, Vector3::new(7, -3, 2));
    }

    #[test]
    fn test_constant_input_is_stable() {
        let mock = MockI2c::with_sample([-250, 310, 16000], [-12, 0, 45]);
        let mut imu = driver(mock, AccelRange::G2);

        let bias = block_on(imu.calibrate(5000)).unwrap();

        assert_eq!(bias.accel, Vector3::new(-250, 310, 16000 - 16384));
        assert_eq!(bias.gyro, Vector3::new(-12, 0, 45));
        assert_eq!(imu.i2c().burst_reads(), 5000);
    }

    #[test]
    fn test_extreme_input_does_not_overflow() {
        let mock = MockI2c::with_sample([i16::MIN, i16::MAX, i16::MIN], [i16::MAX, i16::MIN, 0]);
        let mut imu = driver(mock, AccelRange::G16);

        let bias = block_on(imu.calibrate(u16::MAX)).unwrap();

        assert_eq!(
            bias.accel,
            Vector3::new(i16::MIN as i32, i16::MAX as i32, i16::MIN as i32 - 2048)
        );
        assert_eq!(bias.gyro, Vector3::new(i16::MAX as i32, i16::MIN as i32, 0));
    }

    #[test]
    fn test_mean_truncates_toward_zero() {
        let mut mock = MockI2c::new();
        mock.push_sample([-3, 3, 0], [-1, 1, 5]);
        mock.push_sample([-4, 4, 1], [-2, 2, 6]);
        let mut imu = driver(mock, AccelRange::G2);

        let bias = block_on(imu.calibrate(2)).unwrap();

        // -3.5 -> -3, 3.5 -> 3, 0.5 -> 0
        assert_eq!(bias.accel, Vector3::new(-3, 3, -16384));
        assert_eq!(bias.gyro, Vector3::new(-1, 1, 5));
    }

    #[test]
    fn test_gravity_offset_follows_range() {
        for (range, counts) in [
            (AccelRange::G2, 16384),
            (AccelRange::G4, 8192),
            (AccelRange::G8, 4096),
            (AccelRange::G16, 2048),
        ] {
            let mock = MockI2c::with_sample([0, 0, counts as i16], [0, 0, 0]);
            let mut imu = driver(mock, range);

            let bias = block_on(imu.calibrate(3)).unwrap();

            assert_eq!(bias.accel.z, 0, "range {:?}", range);
        }
    }

    #[test]
    fn test_pauses_between_reads() {
        let mock = MockI2c::with_sample([0, 0, 16384], [0, 0, 0]);
        let mut imu = driver(mock, AccelRange::G2);

        block_on(imu.calibrate(20)).unwrap();

        let (_, delay) = imu.release();
        assert_eq!(delay.total_ms(), 20 * CALIBRATION_PAUSE_MS as u64);
    }

    #[test]
    fn test_zero_samples_rejected() {
        let mut imu = driver(MockI2c::new(), AccelRange::G2);

        assert_eq!(
            block_on(imu.calibrate(0)),
            Err(Mpu6050Error::Configuration(ConfigError::NoCalibrationSamples))
        );
        assert_eq!(imu.i2c().burst_reads(), 0);
    }

    #[test]
    fn test_bus_error_aborts_calibration() {
        let mut mock = MockI2c::with_sample([0, 0, 16384], [0, 0, 0]);
        mock.fail_after(3);
        let mut imu = driver(mock, AccelRange::G2);

        assert_eq!(
            block_on(imu.calibrate(10)),
            Err(Mpu6050Error::Bus(MockI2cError::Nack))
        );
    }
}
