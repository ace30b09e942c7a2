//! Mock I2C bus emulating an MPU-6050 register file
//!
//! Writes land in the register file and are logged. Reads return register
//! contents from the current pointer with auto-increment. Samples queued with
//! `push_sample` are latched into the data registers at the start of each
//! burst read from ACCEL_XOUT_H, one per burst.

use embedded_hal::i2c::{Error, ErrorKind, NoAcknowledgeSource};
use embedded_hal_async::i2c::{ErrorType, I2c, Operation};
use heapless::Deque;
use std::vec::Vec;

use crate::mpu6050::registers::*;

const REGISTER_COUNT: usize = 128;
const QUEUE_DEPTH: usize = 256;

/// Error reported by `MockI2c`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockI2cError {
    Nack,
}

impl Error for MockI2cError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
    }
}

/// Simulated MPU-6050 on an I2C bus
#[derive(Debug)]
pub struct MockI2c {
    address: u8,
    registers: [u8; REGISTER_COUNT],
    pointer: usize,
    queued: Deque<[u8; MPU6050_BURST_LEN], QUEUE_DEPTH>,
    register_writes: Vec<(u8, u8)>,
    burst_reads: usize,
    transactions: usize,
    fail_after: Option<usize>,
    fail_next: usize,
    failing: bool,
}

impl MockI2c {
    /// Device at the primary address, asleep, all data registers zero
    pub fn new() -> Self {
        let mut registers = [0u8; REGISTER_COUNT];
        registers[MPU6050_REG_PWR_MGMT_1 as usize] = MPU6050_PWR_SLEEP;
        registers[MPU6050_REG_WHO_AM_I as usize] = MPU6050_WHO_AM_I_VALUE;

        Self {
            address: MPU6050_I2C_ADDR_PRIMARY,
            registers,
            pointer: 0,
            queued: Deque::new(),
            register_writes: Vec::new(),
            burst_reads: 0,
            transactions: 0,
            fail_after: None,
            fail_next: 0,
            failing: false,
        }
    }

    /// Device whose data registers always hold the given sample
    pub fn with_sample(accel: [i16; 3], gyro: [i16; 3]) -> Self {
        let mut mock = Self::new();
        mock.set_sample(accel, gyro);
        mock
    }

    /// Overwrite the data registers
    pub fn set_sample(&mut self, accel: [i16; 3], gyro: [i16; 3]) {
        let frame = encode(accel, gyro);
        self.load_frame(&frame);
    }

    /// Queue a sample to be latched by the next burst read
    ///
    /// Panics when the queue is full.
    pub fn push_sample(&mut self, accel: [i16; 3], gyro: [i16; 3]) {
        if self.queued.push_back(encode(accel, gyro)).is_err() {
            panic!("MockI2c sample queue is full");
        }
    }

    pub fn queued_samples(&self) -> usize {
        self.queued.len()
    }

    pub fn set_register(&mut self, reg: u8, value: u8) {
        self.registers[reg as usize % REGISTER_COUNT] = value;
    }

    pub fn register(&self, reg: u8) -> u8 {
        self.registers[reg as usize % REGISTER_COUNT]
    }

    /// Every `(register, value)` pair written so far, in order
    pub fn register_writes(&self) -> &[(u8, u8)] {
        &self.register_writes
    }

    /// Number of reads that started at ACCEL_XOUT_H
    pub fn burst_reads(&self) -> usize {
        self.burst_reads
    }

    pub fn transactions(&self) -> usize {
        self.transactions
    }

    /// The first `count` transactions succeed, every later one is NACKed
    pub fn fail_after(&mut self, count: usize) {
        self.fail_after = Some(count);
    }

    /// NACK the next `count` transactions, then recover
    pub fn fail_next(&mut self, count: usize) {
        self.fail_next = count;
    }

    /// NACK every transaction while set
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    fn load_frame(&mut self, frame: &[u8; MPU6050_BURST_LEN]) {
        let start = MPU6050_REG_ACCEL_XOUT_H as usize;
        self.registers[start..start + MPU6050_BURST_LEN].copy_from_slice(frame);
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        let Some((reg, data)) = bytes.split_first() else {
            return;
        };
        self.pointer = *reg as usize % REGISTER_COUNT;
        for value in data {
            self.registers[self.pointer] = *value;
            self.register_writes.push((self.pointer as u8, *value));
            self.pointer = (self.pointer + 1) % REGISTER_COUNT;
        }
    }

    fn read_bytes(&mut self, buffer: &mut [u8]) {
        if self.pointer == MPU6050_REG_ACCEL_XOUT_H as usize {
            self.burst_reads += 1;
            if let Some(frame) = self.queued.pop_front() {
                self.load_frame(&frame);
            }
        }
        for byte in buffer.iter_mut() {
            *byte = self.registers[self.pointer];
            self.pointer = (self.pointer + 1) % REGISTER_COUNT;
        }
    }
}

impl Default for MockI2c {
    fn default() -> Self {
        Self::new()
    }
}

fn encode(accel: [i16; 3], gyro: [i16; 3]) -> [u8; MPU6050_BURST_LEN] {
    let mut frame = [0u8; MPU6050_BURST_LEN];
    for axis in 0..3 {
        frame[axis * 2..axis * 2 + 2].copy_from_slice(&accel[axis].to_be_bytes());
        let offset = MPU6050_BURST_GYRO_OFFSET + axis * 2;
        frame[offset..offset + 2].copy_from_slice(&gyro[axis].to_be_bytes());
    }
    frame
}

impl ErrorType for MockI2c {
    type Error = MockI2cError;
}

impl I2c for MockI2c {
    async fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if address != self.address || self.failing {
            return Err(MockI2cError::Nack);
        }
        if self.fail_next > 0 {
            self.fail_next -= 1;
            return Err(MockI2cError::Nack);
        }
        if let Some(limit) = self.fail_after {
            if self.transactions >= limit {
                return Err(MockI2cError::Nack);
            }
        }
        self.transactions += 1;

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
    use embassy_futures::block_on;

    #[test]
    fn test_queued_samples_latch_per_burst() {
        let mut mock = MockI2c::with_sample([9, 9, 9], [9, 9, 9]);
        mock.push_sample([1, 2, 3], [4, 5, 6]);

        let mut first = [0u8; MPU6050_BURST_LEN];
        block_on(mock.write_read(0x68, &[MPU6050_REG_ACCEL_XOUT_H], &mut first)).unwrap();
        let mut second = [0u8; MPU6050_BURST_LEN];
        block_on(mock.write_read(0x68, &[MPU6050_REG_ACCEL_XOUT_H], &mut second)).unwrap();

        assert_eq!(first, encode([1, 2, 3], [4, 5, 6]));
        // Registers keep the last latched frame once the queue drains
        assert_eq!(second, first);
        assert_eq!(mock.burst_reads(), 2);
    }

    #[test]
    fn test_fail_after() {
        let mut mock = MockI2c::new();
        mock.fail_after(1);

        assert!(block_on(mock.write(0x68, &[0x6B, 0x00])).is_ok());
        assert_eq!(block_on(mock.write(0x68, &[0x6B, 0x00])), Err(MockI2cError::Nack));
        assert_eq!(mock.transactions(), 1);
    }
}
