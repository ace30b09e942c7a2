pub mod analysis;
pub mod commands;
pub mod console;
pub mod options;
pub mod sim_imu;
pub mod storage;
pub mod time;

pub use commands::Command;
pub use console::ConsoleReporter;
pub use options::Options;
pub use sim_imu::{SimMotion, SimulatedMpu6050};
pub use storage::FsStorage;
pub use time::{SystemClock, TokioDelay};
