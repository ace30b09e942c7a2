//! Register-level access to the MPU-6050
//!
//! Every call is a single bus transaction. Failures are returned as
//! `Mpu6050Error::Bus` immediately; nothing here retries.

use embedded_hal_async::i2c::I2c;

use crate::error::Mpu6050Error;

/// I2C bus bound to one device address
pub struct RegisterBus<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> RegisterBus<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Write one register
    pub async fn write_register(
        &mut self,
        reg: u8,
        value: u8,
    ) -> Result<(), Mpu6050Error<I2C::Error>> {
        self.i2c
            .write(self.address, &[reg, value])
            .await
            .map_err(Mpu6050Error::Bus)
    }

    /// Read a single register
    pub async fn read_register(&mut self, reg: u8) -> Result<u8, Mpu6050Error<I2C::Error>> {
        let mut buffer = [0u8; 1];
        self.read_registers(reg, &mut buffer).await?;
        Ok(buffer[0])
    }

    /// Read `buffer.len()` consecutive registers starting at `start`
    ///
    /// Register address write and data read share one transaction
    /// (repeated START).
    pub async fn read_registers(
        &mut self,
        start: u8,
        buffer: &mut [u8],
    ) -> Result<(), Mpu6050Error<I2C::Error>> {
        self.i2c
            .write_read(self.address, &[start], buffer)
            .await
            .map_err(Mpu6050Error::Bus)
    }

    pub fn i2c(&self) -> &I2C {
        &self.i2c
    }

    pub fn i2c_mut(&mut self) -> &mut I2C {
        &mut self.i2c
    }

    pub fn release(self) -> I2C {
        self.i2c
    }
}
