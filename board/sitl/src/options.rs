//! Command-line flags of the host logger

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use datalogger::{CaptureConfig, StartupConfig};
use driver::BiasMode;

pub const USAGE: &str = "Usage: sitl [--dir <path>] [--samples <n>] [--period-ms <ms>] \
[--base <name>] [--calibration-samples <n>] [--apply-bias]";

#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    /// Directory capture files are written to
    pub dir: PathBuf,
    pub capture: CaptureConfig,
    pub startup: StartupConfig,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("captures"),
            capture: CaptureConfig::default(),
            startup: StartupConfig::default(),
        }
    }
}

impl Options {
    /// Parse flags, program name excluded
    pub fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut options = Options::default();
        let mut args = args.into_iter();

        while let Some(flag) = args.next() {
            match flag.as_str() {
                "--dir" => options.dir = PathBuf::from(value(&mut args, &flag)?),
                "--samples" => options.capture.sample_count = number(&mut args, &flag)?,
                "--period-ms" => options.capture.sample_period_ms = number(&mut args, &flag)?,
                "--base" => {
                    let base = value(&mut args, &flag)?;
                    options.capture = options.capture.with_file_base(&base)?;
                }
                "--calibration-samples" => {
                    options.startup.calibration_samples = number(&mut args, &flag)?
                }
                "--apply-bias" => options.startup.bias_mode = BiasMode::Subtract,
                "-h" | "--help" => bail!("{}", USAGE),
                other => bail!("Unknown flag {}\n{}", other, USAGE),
            }
        }
        Ok(options)
    }
}

fn value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    args.next().ok_or_else(|| anyhow!("{} needs a value", flag))
}

fn number<T>(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = value(args, flag)?;
    raw.parse()
        .with_context(|| format!("{} expects a number, got {:?}", flag, raw))
}
