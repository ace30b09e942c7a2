use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use sitl::analysis::{load_capture, summarize};

fn main() -> Result<()> {
    let path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("Usage: analyze_csv <capture.csv>"))?;

    let rows = load_capture(&path)?;
    let summary = summarize(&rows)?;

    println!("Capture {:?}", path);
    print!("{}", summary);
    Ok(())
}
