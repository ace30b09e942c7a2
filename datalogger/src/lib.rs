#![cfg_attr(not(test), no_std)]

mod config;
mod control;
mod error;
mod record;
mod session;
mod startup;

pub use config::{CaptureConfig, StartupConfig, FILE_BASE_CAPACITY};
pub use control::{CaptureControl, TriggerAction, TriggerDebouncer, DEFAULT_DEBOUNCE_MS};
pub use error::{CaptureError, ConfigError};
pub use record::{format_record, Record, HEADER};
pub use session::{FileName, LoggerContext, Report, SessionOutcome, SessionReport};
pub use startup::bring_up;
