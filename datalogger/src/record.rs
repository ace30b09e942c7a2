//! CSV record formatting for capture artifacts

use core::fmt::Write;

use hal::CalibratedSample;
use heapless::String;

/// First line of every capture artifact
pub const HEADER: &str = "Sample,Accel X,Accel Y,Accel Z,Gyro X,Gyro Y,Gyro Z,Time (s)\n";

pub const RECORD_CAPACITY: usize = 192;

pub type Record = String<RECORD_CAPACITY>;

/// Format one data row: `<index>,<ax>,<ay>,<az>,<gx>,<gy>,<gz>,<elapsed_s>\n`
///
/// Every value carries six decimals. Fails only when the row does not fit
/// `RECORD_CAPACITY`, which takes non-physical values.
pub fn format_record(
    index: u32,
    sample: &CalibratedSample,
    elapsed_ms: u64,
) -> Result<Record, core::fmt::Error> {
    let mut record = Record::new();
    let elapsed_s = elapsed_ms as f64 / 1000.0;

    writeln!(
        record,
        "{},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6}",
        index,
        sample.accel.x,
        sample.accel.y,
        sample.accel.z,
        sample.gyro.x,
        sample.gyro.y,
        sample.gyro.z,
        elapsed_s
    )?;
    Ok(record)
}
