//! Shared capture state touched by the trigger path
//!
//! `CaptureControl` is the only state shared between the capture loop and the
//! trigger (button interrupt, console key). The loop owns everything else.

use core::sync::atomic::{AtomicBool, Ordering};

/// What a trigger did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerAction {
    /// Idle became Running; the caller runs the session
    StartCapture,
    /// A session was already running; it has been asked to stop
    StopRequested,
}

#[derive(Debug, Default)]
pub struct CaptureControl {
    running: AtomicBool,
    stop: AtomicBool,
}

impl CaptureControl {
    pub const fn new() -> Self {
        Self {
            running: AtomicBool::new(false),
            stop: AtomicBool::new(false),
        }
    }

    /// Start a session, or ask the running one to stop
    ///
    /// At most one caller ever gets `StartCapture` until `finish` is called.
    pub fn trigger(&self) -> TriggerAction {
        match self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => {
                self.stop.store(false, Ordering::Release);
                TriggerAction::StartCapture
            }
            Err(_) => {
                self.stop.store(true, Ordering::Release);
                TriggerAction::StopRequested
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    /// Return to Idle, clearing any pending stop request
    pub fn finish(&self) {
        self.stop.store(false, Ordering::Release);
        self.running.store(false, Ordering::Release);
    }
}

pub const DEFAULT_DEBOUNCE_MS: u64 = 200;

/// Rejects trigger edges that follow the last accepted one too closely
#[derive(Debug, Clone, Copy)]
pub struct TriggerDebouncer {
    min_interval_ms: u64,
    last_accepted_ms: Option<u64>,
}

impl TriggerDebouncer {
    pub const fn new(min_interval_ms: u64) -> Self {
        Self {
            min_interval_ms,
            last_accepted_ms: None,
        }
    }

    /// Whether an edge at `now_ms` counts. Accepted edges restart the window.
    pub fn accept(&mut self, now_ms: u64) -> bool {
        let accepted = match self.last_accepted_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.min_interval_ms,
        };
        if accepted {
            self.last_accepted_ms = Some(now_ms);
        }
        accepted
    }
}

impl Default for TriggerDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_MS)
    }
}
