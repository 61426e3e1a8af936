//! Benchmark utilities: seeds, display helpers and CSV export.

use super::timer::VariantResult;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

/// Get a seed from current time for randomization
pub fn time_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x12345678)
}

/// Format a duration with a unit suited to its magnitude.
pub fn format_duration(d: Duration) -> String {
    let nanos = d.as_nanos();
    if nanos < 1_000 {
        format!("{} ns", nanos)
    } else if nanos < 1_000_000 {
        format!("{:.2} µs", nanos as f64 / 1e3)
    } else if nanos < 1_000_000_000 {
        format!("{:.2} ms", nanos as f64 / 1e6)
    } else {
        format!("{:.3} s", d.as_secs_f64())
    }
}

/// Summary row for one variant of one algorithm (used for CSV export)
pub struct RawTimingData {
    pub algo_name: String,
    pub variant_name: String,
    pub input_size: usize,
    pub workers: usize,
    pub samples: usize,
    pub avg_nanos: u128,
    pub median_nanos: u128,
    pub min_nanos: u128,
    pub max_nanos: u128,
    pub result_sample: Option<f64>,
}

impl RawTimingData {
    pub fn from_result(algo_name: &str, input_size: usize, workers: usize, result: &VariantResult) -> Self {
        Self {
            algo_name: algo_name.to_string(),
            variant_name: result.name.clone(),
            input_size,
            workers,
            samples: result.samples,
            avg_nanos: result.avg_time.as_nanos(),
            median_nanos: result.median_time.as_nanos(),
            min_nanos: result.min_time.as_nanos(),
            max_nanos: result.max_time.as_nanos(),
            result_sample: result.result_sample,
        }
    }
}

/// Write timing rows as CSV.
pub fn write_csv<W: Write>(mut out: W, data: &[RawTimingData]) -> std::io::Result<()> {
    writeln!(
        out,
        "algorithm,variant,input_size,workers,samples,avg_time_ns,median_time_ns,min_time_ns,max_time_ns,result"
    )?;

    for entry in data {
        writeln!(
            out,
            "{},{},{},{},{},{},{},{},{},{}",
            entry.algo_name,
            entry.variant_name,
            entry.input_size,
            entry.workers,
            entry.samples,
            entry.avg_nanos,
            entry.median_nanos,
            entry.min_nanos,
            entry.max_nanos,
            entry.result_sample.map(|v| v.to_string()).unwrap_or_default()
        )?;
    }

    Ok(())
}

/// Export timing data to a CSV file
pub fn export_csv(path: &Path, data: &[RawTimingData]) -> std::io::Result<()> {
    let mut out = std::io::BufWriter::new(std::fs::File::create(path)?);
    write_csv(&mut out, data)?;
    out.flush()
}
