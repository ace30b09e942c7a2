//! Summary statistics over a capture file

use std::fmt;
use std::io::Read;
use std::path::Path;

use anyhow::{bail, ensure, Context, Result};
use csv::ReaderBuilder;

pub const CHANNELS: [&str; 6] = ["Accel X", "Accel Y", "Accel Z", "Gyro X", "Gyro Y", "Gyro Z"];

/// One data row of a capture file
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureRow {
    pub index: u32,
    pub channels: [f64; 6],
    pub time_s: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Sample standard deviation
    pub std: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaptureSummary {
    pub samples: usize,
    pub duration_s: f64,
    /// Samples per second over the whole recording, zero when it has no duration
    pub mean_rate_hz: f64,
    pub channels: [ChannelStats; 6],
}

pub fn load_capture(path: impl AsRef<Path>) -> Result<Vec<CaptureRow>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).with_context(|| format!("Cannot open {:?}", path))?;
    parse_capture(file).with_context(|| format!("Invalid capture file {:?}", path))
}

pub fn parse_capture(input: impl Read) -> Result<Vec<CaptureRow>> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(input);

    let headers = reader.headers()?.clone();
    ensure!(
        headers.len() == 8 && headers.get(7) == Some("Time (s)"),
        "Unexpected header {:?}",
        headers
    );

    let mut rows = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Row {} is malformed", row_idx + 1))?;
        if record.len() != 8 {
            bail!("Row {} has {} columns, expected 8", row_idx + 1, record.len());
        }

        let index: u32 = record[0]
            .parse()
            .with_context(|| format!("Bad sample index in row {}", row_idx + 1))?;
        let mut channels = [0.0; 6];
        for (column, value) in channels.iter_mut().enumerate() {
            *value = record[column + 1]
                .parse()
                .with_context(|| format!("Bad {} in row {}", CHANNELS[column], row_idx + 1))?;
        }
        let time_s: f64 = record[7]
            .parse()
            .with_context(|| format!("Bad time in row {}", row_idx + 1))?;

        rows.push(CaptureRow {
            index,
            channels,
            time_s,
        });
    }
    Ok(rows)
}

pub fn summarize(rows: &[CaptureRow]) -> Result<CaptureSummary> {
    ensure!(!rows.is_empty(), "Capture holds no samples");

    let duration_s = rows.iter().map(|row| row.time_s).fold(0.0, f64::max);
    let mean_rate_hz = if duration_s > 0.0 {
        rows.len() as f64 / duration_s
    } else {
        0.0
    };

    let channels = std::array::from_fn(|column| {
        channel_stats(rows.iter().map(|row| row.channels[column]), rows.len())
    });

    Ok(CaptureSummary {
        samples: rows.len(),
        duration_s,
        mean_rate_hz,
        channels,
    })
}

fn channel_stats(values: impl Iterator<Item = f64> + Clone, count: usize) -> ChannelStats {
    let n = count as f64;
    let (min, max, sum) = values.clone().fold(
        (f64::INFINITY, f64::NEG_INFINITY, 0.0),
        |(min, max, sum), v| (min.min(v), max.max(v), sum + v),
    );
    let mean = sum / n;
    let std = if count > 1 {
        let squares: f64 = values.map(|v| (v - mean).powi(2)).sum();
        (squares / (n - 1.0)).sqrt()
    } else {
        0.0
    };
    ChannelStats {
        min,
        max,
        mean,
        std,
    }
}

impl fmt::Display for CaptureSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total samples: {}", self.samples)?;
        writeln!(f, "Recording duration: {:.2} seconds", self.duration_s)?;
        writeln!(f, "Mean sample rate: {:.1} Hz", self.mean_rate_hz)?;
        writeln!(f)?;
        writeln!(
            f,
            "{:<8} {:>10} {:>10} {:>10} {:>10}",
            "Channel", "Min", "Max", "Mean", "Std"
        )?;
        for (name, stats) in CHANNELS.iter().zip(self.channels.iter()) {
            writeln!(
                f,
                "{:<8} {:>10.4} {:>10.4} {:>10.4} {:>10.4}",
                name, stats.min, stats.max, stats.mean, stats.std
            )?;
        }
        Ok(())
    }
}
