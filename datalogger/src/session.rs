//! Capture session controller
//!
//! A session runs a fixed-rate loop: read a calibrated sample, stream it to
//! the storage sink as one CSV row, report progress, then wait one sample
//! period. The loop checks the stop flag once per iteration, so a stop
//! request lets at most the in-flight sample finish.
//!
//! Every session ends in exactly one terminal `StatusEvent`, and the artifact
//! is closed on every path where it was opened.

use core::fmt::Write;

use embedded_hal_async::delay::DelayNs;
use hal::{
    CalibratedSample, CaptureProgress, Clock, ImuSensor, StatusEvent, StatusReporter, StorageSink,
};
use heapless::String;

use crate::config::{CaptureConfig, FILE_BASE_CAPACITY};
use crate::control::{CaptureControl, TriggerAction};
use crate::error::CaptureError;
use crate::record::{format_record, HEADER};

/// Base plus the widest counter plus ".csv"
pub const FILE_NAME_CAPACITY: usize = FILE_BASE_CAPACITY + 10 + 4;

pub type FileName = String<FILE_NAME_CAPACITY>;

/// How a session ended
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome<S: core::fmt::Debug, I: core::fmt::Debug> {
    /// Every requested sample was written
    Completed,
    /// A stop request was honored; the rows written so far are kept
    Stopped,
    Failed(CaptureError<S, I>),
}

impl<S: core::fmt::Debug, I: core::fmt::Debug> SessionOutcome<S, I> {
    pub fn is_failed(&self) -> bool {
        matches!(self, SessionOutcome::Failed(_))
    }
}

/// Summary of one finished session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport<S: core::fmt::Debug, I: core::fmt::Debug> {
    pub file: FileName,
    /// Data rows written, header excluded
    pub samples: u32,
    pub outcome: SessionOutcome<S, I>,
}

/// `SessionReport` for a storage sink `S` and sensor `I`
pub type Report<S, I> = SessionReport<<S as StorageSink>::Error, <I as ImuSensor>::Error>;

/// Everything the logger owns between and during sessions
pub struct LoggerContext<'c, I, S, R, C, D> {
    imu: I,
    storage: S,
    reporter: R,
    clock: C,
    delay: D,
    control: &'c CaptureControl,
    config: CaptureConfig,
    session_counter: u32,
    latest: CalibratedSample,
}

impl<'c, I, S, R, C, D> LoggerContext<'c, I, S, R, C, D>
where
    I: ImuSensor,
    S: StorageSink,
    R: StatusReporter,
    C: Clock,
    D: DelayNs,
{
    pub fn new(
        imu: I,
        storage: S,
        reporter: R,
        clock: C,
        delay: D,
        control: &'c CaptureControl,
        config: CaptureConfig,
    ) -> Self {
        Self {
            imu,
            storage,
            reporter,
            clock,
            delay,
            control,
            config,
            session_counter: 0,
            latest: CalibratedSample::default(),
        }
    }

    /// Start a session, or request a stop if one is running
    ///
    /// Returns the report of the session it ran, or `None` when the trigger
    /// only requested a stop.
    pub async fn start_capture(&mut self) -> Option<Report<S, I>> {
        match self.control.trigger() {
            TriggerAction::StartCapture => self.run_session().await,
            TriggerAction::StopRequested => {
                log::info!("Stop requested");
                None
            }
        }
    }

    /// Run one session for a trigger that already returned `StartCapture`
    ///
    /// Returns `None` without touching the sensor or storage when no trigger
    /// moved the control to Running.
    pub async fn run_session(&mut self) -> Option<Report<S, I>> {
        if !self.control.is_running() {
            log::warn!("Session requested without a start trigger");
            return None;
        }

        self.session_counter = self.session_counter.wrapping_add(1);
        let mut file = FileName::new();
        let named = write!(file, "{}{}.csv", self.config.file_base, self.session_counter);

        self.reporter.status(StatusEvent::CaptureStarted { file: &file });
        log::info!(
            "Estimated time: {} seconds",
            self.config.estimated_duration_ms() / 1000
        );

        let finished = if named.is_err() {
            Ok((0, SessionOutcome::Failed(CaptureError::RecordOverflow)))
        } else {
            self.capture_into(&file).await
        };

        let (samples, outcome, event) = match finished {
            Ok((samples, outcome)) => {
                let event = match &outcome {
                    SessionOutcome::Completed => StatusEvent::Saved {
                        file: &file,
                        samples,
                    },
                    SessionOutcome::Stopped => StatusEvent::Stopped { samples },
                    SessionOutcome::Failed(CaptureError::Sensor(_)) => StatusEvent::SensorError,
                    SessionOutcome::Failed(_) => StatusEvent::WriteError,
                };
                (samples, outcome, event)
            }
            Err(e) => (
                0,
                SessionOutcome::Failed(CaptureError::Storage(e)),
                StatusEvent::FileOpenError,
            ),
        };

        if outcome.is_failed() {
            self.reporter.alert();
        }
        self.reporter.status(event);
        self.control.finish();

        Some(SessionReport {
            file,
            samples,
            outcome,
        })
    }

    /// Refresh the latest-sample cache. Does nothing while a session runs.
    pub async fn refresh_latest(&mut self) -> Result<CalibratedSample, I::Error> {
        if self.control.is_running() {
            return Ok(self.latest);
        }
        let sample = self.imu.read_sample().await?;
        self.latest = sample;
        Ok(sample)
    }

    /// Most recent sample, from a session or a refresh
    pub fn latest(&self) -> &CalibratedSample {
        &self.latest
    }

    pub fn is_capturing(&self) -> bool {
        self.control.is_running()
    }

    /// Sessions started so far
    pub fn session_counter(&self) -> u32 {
        self.session_counter
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    pub fn imu_mut(&mut self) -> &mut I {
        &mut self.imu
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn reporter_mut(&mut self) -> &mut R {
        &mut self.reporter
    }

    /// Create, fill and close one artifact. `Err` means it could not be created.
    async fn capture_into(
        &mut self,
        name: &str,
    ) -> Result<(u32, SessionOutcome<S::Error, I::Error>), S::Error> {
        let mut handle = self.storage.create(name).await.map_err(|e| {
            log::error!("Failed to open {}: {:?}", name, e);
            e
        })?;

        let (samples, outcome) = self.sample_loop(&mut handle).await;

        match self.storage.close(handle).await {
            Err(e) if !outcome.is_failed() => {
                log::error!("Failed to close {}: {:?}", name, e);
                Ok((samples, SessionOutcome::Failed(CaptureError::Storage(e))))
            }
            Err(e) => {
                log::warn!("Failed to close {} after an earlier failure: {:?}", name, e);
                Ok((samples, outcome))
            }
            Ok(()) => Ok((samples, outcome)),
        }
    }

    async fn sample_loop(
        &mut self,
        handle: &mut S::File,
    ) -> (u32, SessionOutcome<S::Error, I::Error>) {
        if let Err(e) = self.storage.write(handle, HEADER.as_bytes()).await {
            log::error!("Header write failed: {:?}", e);
            return (0, SessionOutcome::Failed(CaptureError::Storage(e)));
        }

        let target = self.config.sample_count;
        let period_ms = self.config.sample_period_ms;
        let checkpoint_every = self.config.checkpoint_every.max(1);
        let start_ms = self.clock.now_ms();
        let mut written = 0;

        for index in 1..=target {
            if self.control.stop_requested() {
                log::info!("Capture stopped after {} samples", written);
                return (written, SessionOutcome::Stopped);
            }

            let sample = match self.imu.read_sample().await {
                Ok(sample) => sample,
                Err(e) => {
                    log::error!("Sensor read failed at sample {}: {:?}", index, e);
                    return (written, SessionOutcome::Failed(CaptureError::Sensor(e)));
                }
            };
            self.latest = sample;

            let progress = CaptureProgress {
                index,
                target,
                elapsed_ms: self.clock.elapsed_ms(start_ms),
                remaining_ms: (target - index) as u64 * period_ms as u64,
                sample,
            };
            self.reporter.progress(&progress);

            let Ok(record) = format_record(index, &sample, progress.elapsed_ms) else {
                log::error!("Record {} does not fit its buffer", index);
                return (written, SessionOutcome::Failed(CaptureError::RecordOverflow));
            };
            if let Err(e) = self.storage.write(handle, record.as_bytes()).await {
                log::error!("Write failed at sample {}: {:?}", index, e);
                return (written, SessionOutcome::Failed(CaptureError::Storage(e)));
            }
            written = index;

            if index == 1 || index % checkpoint_every == 0 {
                self.reporter.checkpoint(&progress);
            }

            self.delay.delay_ms(period_ms).await;
        }

        (written, SessionOutcome::Completed)
    }
}
