//! Status reporting interface (display, alert and console collaborators)
use core::fmt;

use crate::types::CalibratedSample;

/// Progress of a running capture, reported once per sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureProgress {
    /// 1-based index of the sample just taken
    pub index: u32,
    /// Number of samples the session aims for
    pub target: u32,
    /// Milliseconds since the session started
    pub elapsed_ms: u64,
    /// Estimated milliseconds until the target is reached
    pub remaining_ms: u64,
    /// The sample itself
    pub sample: CalibratedSample,
}

impl CaptureProgress {
    pub fn elapsed_s(&self) -> f32 {
        self.elapsed_ms as f32 / 1000.0
    }

    pub fn remaining_s(&self) -> u64 {
        self.remaining_ms / 1000
    }
}

/// Human-readable status updates
///
/// Terminal events close a capture session; each session produces exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusEvent<'a> {
    /// A session opened and is about to write its header
    CaptureStarted { file: &'a str },
    /// The session reached its sample target
    Saved { file: &'a str, samples: u32 },
    /// The session honored a stop request
    Stopped { samples: u32 },
    /// The artifact could not be created
    FileOpenError,
    /// A record (or the header, or the close) could not be written
    WriteError,
    /// The sensor could not be read mid-session
    SensorError,
    /// The sensor did not come up after all attempts
    InitFailed,
    /// Calibration could not complete after all attempts
    CalibrationFailed,
}

impl StatusEvent<'_> {
    /// Whether this event ends a capture session
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StatusEvent::Saved { .. }
                | StatusEvent::Stopped { .. }
                | StatusEvent::FileOpenError
                | StatusEvent::WriteError
                | StatusEvent::SensorError
        )
    }

    /// Whether this event reports a failure
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            StatusEvent::FileOpenError
                | StatusEvent::WriteError
                | StatusEvent::SensorError
                | StatusEvent::InitFailed
                | StatusEvent::CalibrationFailed
        )
    }
}

impl fmt::Display for StatusEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusEvent::CaptureStarted { .. } => write!(f, "Capturing Data..."),
            StatusEvent::Saved { file, .. } => write!(f, "Data Saved: {}", file),
            StatusEvent::Stopped { .. } => write!(f, "Capture Stopped"),
            StatusEvent::FileOpenError => write!(f, "File Open Error"),
            StatusEvent::WriteError => write!(f, "Write Error"),
            StatusEvent::SensorError => write!(f, "Sensor Error"),
            StatusEvent::InitFailed => write!(f, "IMU Init Error"),
            StatusEvent::CalibrationFailed => write!(f, "Calibration Error"),
        }
    }
}

/// Sink for status text, progress and alerts
pub trait StatusReporter {
    /// Show a short status line
    fn status(&mut self, event: StatusEvent<'_>);

    /// Per-sample progress for the primary display
    fn progress(&mut self, _progress: &CaptureProgress) {}

    /// Coarse progress for the console, on the first sample and every Nth
    fn checkpoint(&mut self, progress: &CaptureProgress) {
        log::info!(
            "Sample {}/{} - Time remaining: {} seconds",
            progress.index,
            progress.target,
            progress.remaining_s()
        );
    }

    /// Raise the error alarm (buzzer and red LED on the appliance)
    fn alert(&mut self);
}

impl<R: StatusReporter + ?Sized> StatusReporter for &mut R {
    fn status(&mut self, event: StatusEvent<'_>) {
        (**self).status(event)
    }

    fn progress(&mut self, progress: &CaptureProgress) {
        (**self).progress(progress)
    }

    fn checkpoint(&mut self, progress: &CaptureProgress) {
        (**self).checkpoint(progress)
    }

    fn alert(&mut self) {
        (**self).alert()
    }
}
