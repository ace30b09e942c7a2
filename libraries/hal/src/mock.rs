//! Mock collaborators for host testing
//!
//! `MockClock` and `MockDelay` share one simulated timeline so that pauses
//! taken by the code under test advance the time it observes.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::string::{String, ToString};
use std::vec::Vec;

use embedded_hal_async::delay::DelayNs;

use crate::{CaptureProgress, Clock, StatusEvent, StatusReporter, StorageSink};

/// Simulated monotonic clock
#[derive(Debug, Clone, Default)]
pub struct MockClock {
    now_ns: Rc<Cell<u64>>,
}

impl MockClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// A delay that advances this clock by the time it is asked to wait
    pub fn delay(&self) -> MockDelay {
        MockDelay {
            now_ns: self.now_ns.clone(),
            total_ns: 0,
        }
    }

    pub fn advance_ms(&self, ms: u64) {
        self.now_ns.set(self.now_ns.get() + ms * 1_000_000);
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u64 {
        self.now_ns.get() / 1_000_000
    }
}

/// Delay bound to a `MockClock`; returns immediately
#[derive(Debug, Clone)]
pub struct MockDelay {
    now_ns: Rc<Cell<u64>>,
    total_ns: u64,
}

impl MockDelay {
    /// Delay with its own private timeline
    pub fn detached() -> Self {
        MockClock::new().delay()
    }

    /// Total time this delay has been asked to wait
    pub fn total_ms(&self) -> u64 {
        self.total_ns / 1_000_000
    }
}

impl DelayNs for MockDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.now_ns.set(self.now_ns.get() + ns as u64);
        self.total_ns += ns as u64;
    }

    async fn delay_us(&mut self, us: u32) {
        self.delay_ns_u64(us as u64 * 1_000);
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.delay_ns_u64(ms as u64 * 1_000_000);
    }
}

impl MockDelay {
    fn delay_ns_u64(&mut self, ns: u64) {
        self.now_ns.set(self.now_ns.get() + ns);
        self.total_ns += ns;
    }
}

/// Storage failure injected by `MockStorage`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockStorageError {
    CreateFailed,
    WriteFailed,
    CloseFailed,
}

/// Handle to an artifact held by `MockStorage`
#[derive(Debug, PartialEq, Eq)]
pub struct MockFile {
    name: String,
}

/// In-memory storage sink with failure injection
#[derive(Default)]
pub struct MockStorage {
    files: BTreeMap<String, Vec<u8>>,
    creates: usize,
    writes: usize,
    closes: usize,
    open: usize,
    fail_create: bool,
    fail_close: bool,
    fail_after_writes: Option<usize>,
    on_write: Option<Box<dyn FnMut(usize)>>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `create` fails
    pub fn fail_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    /// Every `close` fails
    pub fn fail_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    /// The first `count` writes succeed, every later write fails
    pub fn fail_after_writes(mut self, count: usize) -> Self {
        self.fail_after_writes = Some(count);
        self
    }

    /// Call `hook` with the running count of successful writes after each one
    pub fn on_write(mut self, hook: impl FnMut(usize) + 'static) -> Self {
        self.on_write = Some(Box::new(hook));
        self
    }

    pub fn file(&self, name: &str) -> Option<&[u8]> {
        self.files.get(name).map(|data| data.as_slice())
    }

    /// File contents split into lines, without terminators
    pub fn lines(&self, name: &str) -> Vec<String> {
        self.file(name)
            .map(|data| {
                String::from_utf8_lossy(data)
                    .lines()
                    .map(|line| line.to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn file_names(&self) -> Vec<String> {
        self.files.keys().cloned().collect()
    }

    pub fn create_count(&self) -> usize {
        self.creates
    }

    pub fn close_count(&self) -> usize {
        self.closes
    }

    /// Artifacts created but not yet closed
    pub fn open_count(&self) -> usize {
        self.open
    }
}

impl StorageSink for MockStorage {
    type File = MockFile;
    type Error = MockStorageError;

    async fn create(&mut self, name: &str) -> Result<MockFile, MockStorageError> {
        if self.fail_create {
            return Err(MockStorageError::CreateFailed);
        }
        self.creates += 1;
        self.open += 1;
        self.files.insert(name.to_string(), Vec::new());
        Ok(MockFile {
            name: name.to_string(),
        })
    }

    async fn write(&mut self, file: &mut MockFile, bytes: &[u8]) -> Result<(), MockStorageError> {
        if let Some(limit) = self.fail_after_writes {
            if self.writes >= limit {
                return Err(MockStorageError::WriteFailed);
            }
        }
        self.files
            .entry(file.name.clone())
            .or_default()
            .extend_from_slice(bytes);
        self.writes += 1;
        if let Some(hook) = self.on_write.as_mut() {
            hook(self.writes);
        }
        Ok(())
    }

    async fn close(&mut self, _file: MockFile) -> Result<(), MockStorageError> {
        self.closes += 1;
        self.open -= 1;
        if self.fail_close {
            return Err(MockStorageError::CloseFailed);
        }
        Ok(())
    }
}

/// A status line captured by `RecordingReporter`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedStatus {
    pub text: String,
    pub terminal: bool,
    pub failure: bool,
}

/// Status reporter that keeps everything it is told
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub statuses: Vec<RecordedStatus>,
    pub progress: Vec<CaptureProgress>,
    pub checkpoints: Vec<u32>,
    pub alerts: usize,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn terminal_statuses(&self) -> Vec<&RecordedStatus> {
        self.statuses.iter().filter(|s| s.terminal).collect()
    }

    pub fn last_status(&self) -> Option<&str> {
        self.statuses.last().map(|s| s.text.as_str())
    }
}

impl StatusReporter for RecordingReporter {
    fn status(&mut self, event: StatusEvent<'_>) {
        self.statuses.push(RecordedStatus {
            text: event.to_string(),
            terminal: event.is_terminal(),
            failure: event.is_failure(),
        });
    }

    fn progress(&mut self, progress: &CaptureProgress) {
        self.progress.push(*progress);
    }

    fn checkpoint(&mut self, progress: &CaptureProgress) {
        self.checkpoints.push(progress.index);
    }

    fn alert(&mut self) {
        self.alerts += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;

    #[test]
    fn test_delay_advances_clock() {
        let clock = MockClock::new();
        let mut delay = clock.delay();

        block_on(delay.delay_ms(100));
        block_on(delay.delay_us(2_500));

        assert_eq!(clock.now_ms(), 102);
        assert_eq!(delay.total_ms(), 102);
    }

    #[test]
    fn test_storage_write_limit() {
        let mut storage = MockStorage::new().fail_after_writes(1);
        let mut file = block_on(storage.create("a.csv")).unwrap();

        assert!(block_on(storage.write(&mut file, b"one\n")).is_ok());
        assert_eq!(
            block_on(storage.write(&mut file, b"two\n")),
            Err(MockStorageError::WriteFailed)
        );
        block_on(storage.close(file)).unwrap();

        assert_eq!(storage.lines("a.csv"), vec!["one".to_string()]);
        assert_eq!(storage.open_count(), 0);
    }

    #[test]
    fn test_create_truncates() {
        let mut storage = MockStorage::new();
        let mut file = block_on(storage.create("a.csv")).unwrap();
        block_on(storage.write(&mut file, b"old\n")).unwrap();
        block_on(storage.close(file)).unwrap();

        let file = block_on(storage.create("a.csv")).unwrap();
        block_on(storage.close(file)).unwrap();

        assert_eq!(storage.file("a.csv"), Some(&b""[..]));
        assert_eq!(storage.create_count(), 2);
    }
}
