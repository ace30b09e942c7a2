//! Console stand-ins for the display and alarm

use std::io::Write;

use hal::{CalibratedSample, CaptureProgress, StatusEvent, StatusReporter};

/// Logs status lines and rings the terminal bell on alerts
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    last_status: Option<String>,
    alerts: usize,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text of the most recent status line
    pub fn last_status(&self) -> Option<&str> {
        self.last_status.as_deref()
    }

    pub fn alerts(&self) -> usize {
        self.alerts
    }
}

impl StatusReporter for ConsoleReporter {
    fn status(&mut self, event: StatusEvent<'_>) {
        let text = event.to_string();
        if event.is_failure() {
            log::error!("{}", text);
        } else {
            log::info!("{}", text);
        }
        self.last_status = Some(text);
    }

    fn progress(&mut self, progress: &CaptureProgress) {
        log::debug!(
            "Sample: {} Time: {:.2} {}",
            progress.index,
            progress.elapsed_s(),
            format_sample(&progress.sample)
        );
    }

    fn alert(&mut self) {
        self.alerts += 1;
        log::warn!("Alarm");
        let mut stdout = std::io::stdout();
        let _ = stdout.write_all(b"\x07");
        let _ = stdout.flush();
    }
}

/// Two-line display layout: `A: x y z  G: x y z`
pub fn format_sample(sample: &CalibratedSample) -> String {
    format!(
        "A: {:6.2} {:6.2} {:6.2}  G: {:6.2} {:6.2} {:6.2}",
        sample.accel.x,
        sample.accel.y,
        sample.accel.z,
        sample.gyro.x,
        sample.gyro.y,
        sample.gyro.z
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use hal::Vector3d;

    #[test]
    fn test_status_and_alerts() {
        let mut reporter = ConsoleReporter::new();

        reporter.status(StatusEvent::CaptureStarted { file: "med_imu1.csv" });
        reporter.alert();
        reporter.status(StatusEvent::WriteError);

        assert_eq!(reporter.last_status(), Some("Write Error"));
        assert_eq!(reporter.alerts(), 1);
    }

    #[test]
    fn test_format_sample() {
        let sample = CalibratedSample::new(
            Vector3d::new(0.0, -0.5, 1.0),
            Vector3d::new(12.345, 0.0, -1.0),
        );

        assert_eq!(
            format_sample(&sample),
            "A:   0.00  -0.50   1.00  G:  12.35   0.00  -1.00"
        );
    }
}
