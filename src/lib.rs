//! `mzpicker` sums the MS1 ion intensity observed for a short list of target masses
//! across a scan log, and tracks how that intensity is distributed over the run.
//!
//! The scan log is read line by line. Lines marked as MS1 scan events are split into a
//! scan number, mass and intensity, and every target mass whose tolerance window holds
//! the mass receives the intensity, both in a running total and in a time bucket
//! of 60 scans starting from scan 120. When the log is exhausted, one row per target
//! is appended to a shared results file so that many wells can be collected together.
//!
//! # Usage
//! ```
//! use mzpicker::{ScanAggregator, Tolerance};
//!
//! let log = "preamble\n   150 ms1 100.0005 50.0\n   151 ms2 100.0 12.0\n";
//! let mut aggregator = ScanAggregator::new(&[100.0], Tolerance::PPM(10.0));
//! let stats = aggregator.process(log.as_bytes()).unwrap();
//! assert_eq!(stats.matched_records, 1);
//!
//! let rows = aggregator.summary_rows("A1");
//! assert_eq!(rows[0].to_string(), "A1,100,50,50,");
//! ```
pub mod aggregator;
pub mod buckets;
pub mod config;
pub mod error;
pub mod pools;
pub mod record;
pub mod text;
pub mod tolerance;

pub use crate::aggregator::{LineOutcome, ScanAggregator, ScanStatistics};
pub use crate::config::{PickerConfig, PickerConfigBuilder};
pub use crate::error::PickerError;
pub use crate::record::{RecordError, ScanRecord};
pub use crate::text::SummaryRow;
pub use crate::tolerance::Tolerance;

/// Run a complete pass: aggregate the scan log from `reader` and append the summary rows
/// described by `config` to its results file.
pub fn run<R: std::io::BufRead>(
    config: &PickerConfig,
    reader: R,
) -> Result<ScanStatistics, PickerError> {
    let mut aggregator = ScanAggregator::from_config(config);
    let stats = aggregator.process(reader)?;
    let rows = aggregator.summary_rows(&config.well_identifier);
    text::append_rows(&rows, config.results_path(), config.write_header)?;
    Ok(stats)
}
