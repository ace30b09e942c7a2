//! Common data types for hardware abstraction interfaces
pub use nalgebra::Vector3;

/// 3D vector representation using nalgebra
pub type Vector3d = Vector3<f32>;

/// One IMU reading converted to physical units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibratedSample {
    /// Acceleration in g
    pub accel: Vector3d,
    /// Angular rate in degrees per second
    pub gyro: Vector3d,
}

impl CalibratedSample {
    pub fn new(accel: Vector3d, gyro: Vector3d) -> Self {
        Self { accel, gyro }
    }
}

impl Default for CalibratedSample {
    fn default() -> Self {
        Self {
            accel: Vector3d::zeros(),
            gyro: Vector3d::zeros(),
        }
    }
}
