//! Sensor bring-up with bounded retry

use driver::{BiasVector, Mpu6050, Mpu6050Error};
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;
use hal::{StatusEvent, StatusReporter};

use crate::config::StartupConfig;

/// Initialize and calibrate the sensor, then install the measured bias
///
/// Init is retried with a device reset in between. Calibration is retried
/// without one. Exhausting either reports a failure status and returns the
/// last error.
pub async fn bring_up<I2C, D, R>(
    imu: &mut Mpu6050<I2C, D>,
    reporter: &mut R,
    config: &StartupConfig,
) -> Result<BiasVector, Mpu6050Error<I2C::Error>>
where
    I2C: I2c,
    D: DelayNs,
    R: StatusReporter,
{
    let attempts = config.init_attempts.max(1);

    if let Err(e) = init_with_retry(imu, attempts).await {
        log::error!("IMU init failed after {} attempts: {:?}", attempts, e);
        reporter.alert();
        reporter.status(StatusEvent::InitFailed);
        return Err(e);
    }

    let bias = match calibrate_with_retry(imu, attempts, config.calibration_samples).await {
        Ok(bias) => bias,
        Err(e) => {
            log::error!("Calibration failed after {} attempts: {:?}", attempts, e);
            reporter.alert();
            reporter.status(StatusEvent::CalibrationFailed);
            return Err(e);
        }
    };

    imu.set_bias(bias);
    imu.set_bias_mode(config.bias_mode);
    log::info!("IMU ready, bias mode {:?}", config.bias_mode);
    Ok(bias)
}

async fn init_with_retry<I2C: I2c, D: DelayNs>(
    imu: &mut Mpu6050<I2C, D>,
    attempts: u8,
) -> Result<(), Mpu6050Error<I2C::Error>> {
    let mut attempt = 1;
    loop {
        match imu.init().await {
            Ok(()) => return Ok(()),
            Err(e) if attempt >= attempts => return Err(e),
            Err(e) => {
                log::warn!("IMU init attempt {}/{} failed: {:?}", attempt, attempts, e);
                if let Err(e) = imu.reset().await {
                    log::warn!("IMU reset failed: {:?}", e);
                }
            }
        }
        attempt += 1;
    }
}

async fn calibrate_with_retry<I2C: I2c, D: DelayNs>(
    imu: &mut Mpu6050<I2C, D>,
    attempts: u8,
    samples: u16,
) -> Result<BiasVector, Mpu6050Error<I2C::Error>> {
    let mut attempt = 1;
    loop {
        match imu.calibrate(samples).await {
            Ok(bias) => return Ok(bias),
            // Retrying cannot fix a bad sample count
            Err(e @ Mpu6050Error::Configuration(_)) => return Err(e),
            Err(e) if attempt >= attempts => return Err(e),
            Err(e) => {
                log::warn!("Calibration attempt {}/{} failed: {:?}", attempt, attempts, e);
            }
        }
        attempt += 1;
    }
}
