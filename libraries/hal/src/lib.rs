#![cfg_attr(not(any(test, feature = "mock")), no_std)]
extern crate nalgebra;

mod clock;
mod imu;
mod status;
mod storage;
mod types;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use clock::*;
pub use imu::*;
pub use status::*;
pub use storage::*;
pub use types::*;
