//! Accumulate matched MS1 intensity per target mass over a whole scan log.
//!
//! [`ScanAggregator`] consumes the log a line at a time. Each MS1 record that survives
//! filtering is tested against every target mass window, and every window it falls in
//! receives its intensity, both in a running total and in the time bucket for its scan.
use std::io::BufRead;

use log::{debug, info};

use crate::buckets::{bucket_index, BucketOverflow, TimeBucketTable, FIRST_SCAN};
use crate::config::PickerConfig;
use crate::error::PickerError;
use crate::record::{is_candidate, parse_scan_number, ScanRecord};
use crate::text::SummaryRow;
use crate::tolerance::{TargetWindow, Tolerance};

/// What happened to a single line of input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    /// Not an MS1 scan event
    NotCandidate,
    /// Scan number is before [`FIRST_SCAN`]
    BeforeRunStart,
    ZeroIntensity,
    /// A valid record which fell outside every target window
    Unmatched,
    /// A valid record which fell inside this many target windows
    Matched(usize),
}

/// Counters describing a pass over a scan log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanStatistics {
    /// Lines read after the leading line
    pub lines: usize,
    pub candidates: usize,
    pub malformed: usize,
    pub before_run_start: usize,
    pub zero_intensity: usize,
    /// Records that matched at least one target
    pub matched_records: usize,
    /// Record-target pairs that matched
    pub matches: usize,
}

impl ScanStatistics {
    fn observe(&mut self, outcome: &Result<LineOutcome, PickerError>) {
        self.lines += 1;
        match outcome {
            Ok(LineOutcome::NotCandidate) => return,
            Ok(LineOutcome::BeforeRunStart) => self.before_run_start += 1,
            Ok(LineOutcome::ZeroIntensity) => self.zero_intensity += 1,
            Ok(LineOutcome::Unmatched) => {}
            Ok(LineOutcome::Matched(n)) => {
                self.matched_records += 1;
                self.matches += n;
            }
            Err(PickerError::Record(_)) => self.malformed += 1,
            Err(_) => {}
        }
        self.candidates += 1;
    }
}

/// Sums matched intensity for an ordered list of target masses
#[derive(Debug, Clone)]
pub struct ScanAggregator {
    pub tolerance: Tolerance,
    windows: Vec<TargetWindow>,
    totals: Vec<f64>,
    buckets: TimeBucketTable,
    max_scan: u32,
}

impl ScanAggregator {
    /// Create an aggregator over `target_masses` with a growable bucket table
    pub fn new(target_masses: &[f64], tolerance: Tolerance) -> Self {
        let buckets = TimeBucketTable::new(target_masses.len());
        Self::with_buckets(target_masses, tolerance, buckets)
    }

    /// Create an aggregator whose bucket table holds at most `capacity` buckets
    pub fn with_bucket_capacity(
        target_masses: &[f64],
        tolerance: Tolerance,
        capacity: usize,
    ) -> Self {
        let buckets = TimeBucketTable::with_capacity(target_masses.len(), capacity);
        Self::with_buckets(target_masses, tolerance, buckets)
    }

    pub fn from_config(config: &PickerConfig) -> Self {
        match config.bucket_capacity {
            Some(capacity) => {
                Self::with_bucket_capacity(&config.target_masses, config.tolerance, capacity)
            }
            None => Self::new(&config.target_masses, config.tolerance),
        }
    }

    fn with_buckets(
        target_masses: &[f64],
        tolerance: Tolerance,
        buckets: TimeBucketTable,
    ) -> Self {
        let windows = target_masses
            .iter()
            .map(|target| TargetWindow::new(*target, tolerance))
            .collect();
        Self {
            tolerance,
            windows,
            totals: vec![0.0; target_masses.len()],
            buckets,
            max_scan: FIRST_SCAN,
        }
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn target_masses(&self) -> impl Iterator<Item = f64> + '_ {
        self.windows.iter().map(|w| w.target)
    }

    pub fn windows(&self) -> &[TargetWindow] {
        &self.windows
    }

    /// The total intensity matched for each target, in target order
    pub fn totals(&self) -> &[f64] {
        &self.totals
    }

    pub fn buckets(&self) -> &TimeBucketTable {
        &self.buckets
    }

    /// The highest scan number that matched any target, or [`FIRST_SCAN`] if none did
    pub fn max_scan(&self) -> u32 {
        self.max_scan
    }

    /// The number of bucket columns reported per target
    pub fn reported_bucket_count(&self) -> usize {
        bucket_index(self.max_scan) + 1
    }

    /// Add a parsed record to every target window containing its mass.
    ///
    /// Returns the number of windows matched.
    pub fn ingest(&mut self, record: &ScanRecord) -> Result<usize, BucketOverflow> {
        let mut matched = 0;
        for (i, window) in self.windows.iter().enumerate() {
            if !window.contains(record.mass) {
                continue;
            }
            self.buckets.add(record.scan_number, i, record.intensity)?;
            self.totals[i] += record.intensity;
            self.max_scan = self.max_scan.max(record.scan_number);
            matched += 1;
        }
        Ok(matched)
    }

    /// Classify, parse, filter and accumulate one line of the scan log
    pub fn ingest_line(&mut self, line: &str) -> Result<LineOutcome, PickerError> {
        if !is_candidate(line) {
            return Ok(LineOutcome::NotCandidate);
        }
        if parse_scan_number(line)? < FIRST_SCAN {
            return Ok(LineOutcome::BeforeRunStart);
        }
        let record = ScanRecord::parse_line(line)?;
        if record.intensity == 0.0 {
            return Ok(LineOutcome::ZeroIntensity);
        }
        match self.ingest(&record)? {
            0 => Ok(LineOutcome::Unmatched),
            n => Ok(LineOutcome::Matched(n)),
        }
    }

    /// Consume a whole scan log.
    ///
    /// The first line is always discarded. Bytes that are not valid UTF-8 are replaced
    /// rather than rejected, so they can only make a record malformed. Malformed records
    /// are skipped and counted, while read failures and bucket overflows end the pass.
    pub fn process<R: BufRead>(&mut self, mut reader: R) -> Result<ScanStatistics, PickerError> {
        let mut stats = ScanStatistics::default();
        let mut buf = Vec::new();
        let mut line_number = 1;
        if read_line(&mut reader, &mut buf)? {
            while read_line(&mut reader, &mut buf)? {
                line_number += 1;
                let line = String::from_utf8_lossy(&buf);
                let outcome = self.ingest_line(&line);
                stats.observe(&outcome);
                match outcome {
                    Ok(_) => {}
                    Err(PickerError::Record(err)) => {
                        debug!("Skipping line {}: {}", line_number, err);
                    }
                    Err(err) => return Err(err),
                }
            }
        }
        info!(
            "Read {} lines, {} MS1 records ({} malformed), {} records matched {} times",
            stats.lines, stats.candidates, stats.malformed, stats.matched_records, stats.matches
        );
        Ok(stats)
    }

    /// Build one [`SummaryRow`] per target mass, in target order
    pub fn summary_rows(&self, well_identifier: &str) -> Vec<SummaryRow> {
        let n_buckets = self.reported_bucket_count();
        self.windows
            .iter()
            .zip(self.totals.iter())
            .enumerate()
            .map(|(i, (window, total))| SummaryRow {
                well_identifier: well_identifier.to_string(),
                target_mass: window.target,
                total_intensity: *total,
                buckets: self.buckets.column(i, n_buckets).collect(),
            })
            .collect()
    }
}

/// Read the next line into `buf` without its line terminator.
///
/// Returns `false` once the reader is exhausted.
fn read_line<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>) -> std::io::Result<bool> {
    buf.clear();
    if reader.read_until(b'\n', buf)? == 0 {
        return Ok(false);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    Ok(true)
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;

    const LOG: &str = "index level mz intensity
   100 ms1 100.0 999
   130 ms1 100.0005 10
   131 ms2 100.0 500
   140 ms1 200.0 5
   185 ms1 99.9995 20
   190 ms1 100.0 0
   250 ms1 100.0009 2.5
   251 ms1 100.01 4
   260 ms1 garbage 4
   261 ms1 100.0
";

    #[test_log::test]
    fn test_process_log() {
        let mut agg = ScanAggregator::new(&[100.0, 200.0], Tolerance::PPM(10.0));
        let stats = agg.process(LOG.as_bytes()).unwrap();

        assert_eq!(stats.lines, 10);
        assert_eq!(stats.candidates, 9);
        assert_eq!(stats.malformed, 2);
        assert_eq!(stats.before_run_start, 1);
        assert_eq!(stats.zero_intensity, 1);
        assert_eq!(stats.matched_records, 4);
        assert_eq!(stats.matches, 4);

        assert_eq!(agg.totals(), &[32.5, 5.0]);
        assert_eq!(agg.max_scan(), 250);
        assert_eq!(agg.reported_bucket_count(), 3);

        let rows = agg.summary_rows("A1");
        assert_eq!(rows[0].buckets, vec![10.0, 20.0, 2.5]);
        assert_eq!(rows[1].buckets, vec![5.0, 0.0, 0.0]);
        assert_eq!(rows[0].to_string(), "A1,100,32.5,10,20,2.5,");
        assert_eq!(rows[1].to_string(), "A1,200,5,5,0,0,");
    }

    #[test]
    fn test_worked_example() {
        let mut agg = ScanAggregator::new(&[100.0], Tolerance::PPM(10.0));
        agg.process("header\nms1 150 1 100.0005 50.0\n".as_bytes()).unwrap();
        let rows = agg.summary_rows("A1");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].to_string(), "A1,100,50,50,");
    }

    #[test]
    fn test_invalid_utf8_does_not_end_the_pass() {
        let mut agg = ScanAggregator::new(&[100.0], Tolerance::PPM(10.0));
        let log: &[u8] = b"head\xffer\n150 ms1 100.0 5\ncomment \xff\xfe junk\n\
            210 ms1 100.0 \xff\n200 ms1 100.0 7\r\n220 ms1 100.0 1";
        let stats = agg.process(log).unwrap();
        assert_eq!(stats.lines, 5);
        assert_eq!(stats.candidates, 4);
        assert_eq!(stats.malformed, 1);
        assert_eq!(stats.matched_records, 3);
        assert_eq!(agg.totals(), &[13.0]);
    }

    #[test]
    fn test_pre_run_scan_checked_before_mass() {
        let mut agg = ScanAggregator::new(&[100.0], Tolerance::PPM(10.0));
        assert_eq!(
            agg.ingest_line("100 ms1 garbage 4").unwrap(),
            LineOutcome::BeforeRunStart
        );
        assert!(matches!(
            agg.ingest_line("130 ms1 garbage 4"),
            Err(PickerError::Record(_))
        ));
    }

    #[test]
    fn test_first_line_always_discarded() {
        let mut agg = ScanAggregator::new(&[100.0], Tolerance::PPM(10.0));
        let stats = agg
            .process("150 ms1 100.0 50\n150 ms1 100.0 7\n".as_bytes())
            .unwrap();
        assert_eq!(stats.lines, 1);
        assert_eq!(agg.totals(), &[7.0]);
    }

    #[test]
    fn test_empty_input() {
        let mut agg = ScanAggregator::new(&[100.0], Tolerance::PPM(10.0));
        let stats = agg.process("".as_bytes()).unwrap();
        assert_eq!(stats, ScanStatistics::default());
        assert_eq!(agg.summary_rows("A1")[0].to_string(), "A1,100,0,0,");
    }

    #[rstest]
    #[case(0.0)]
    #[case(1.0)]
    #[case(25.0)]
    fn test_exact_match_any_tolerance(#[case] ppm: f64) {
        let mut agg = ScanAggregator::new(&[524.2648], Tolerance::PPM(ppm));
        let outcome = agg.ingest_line("  300 ms1 524.2648 3").unwrap();
        assert_eq!(outcome, LineOutcome::Matched(1));
    }

    #[test]
    fn test_window_boundary() {
        let mut agg = ScanAggregator::new(&[500.0], Tolerance::PPM(10.0));
        let upper = agg.windows()[0].upper;
        let record = ScanRecord::new(200, upper, 1.0);
        assert_eq!(agg.ingest(&record).unwrap(), 1);
        let record = ScanRecord::new(200, upper + 1e-9, 1.0);
        assert_eq!(agg.ingest(&record).unwrap(), 0);
        assert_eq!(agg.totals(), &[1.0]);
    }

    #[rstest]
    #[case(100.0, 50.0)]
    #[case(610.1841, 5.0)]
    #[case(524.2648, 10.0)]
    fn test_scaled_boundary_mass_matches(#[case] target: f64, #[case] ppm: f64) {
        let mut agg = ScanAggregator::new(&[target], Tolerance::PPM(ppm));
        let mass = target * (1.0 + ppm / 1e6);
        let line = format!("200 ms1 {mass} 2");
        assert_eq!(agg.ingest_line(&line).unwrap(), LineOutcome::Matched(1));
        let line = format!("200 ms1 {} 2", mass + 1e-9);
        assert_eq!(agg.ingest_line(&line).unwrap(), LineOutcome::Unmatched);
    }

    #[test]
    fn test_before_run_start_never_counts() {
        let mut agg = ScanAggregator::new(&[100.0], Tolerance::PPM(10.0));
        for scan in [0, 1, 60, 119] {
            let line = format!("{scan} ms1 100.0 1000");
            assert_eq!(agg.ingest_line(&line).unwrap(), LineOutcome::BeforeRunStart);
        }
        assert_eq!(agg.totals(), &[0.0]);
        assert_eq!(agg.max_scan(), FIRST_SCAN);
    }

    #[test]
    fn test_zero_intensity_never_counts() {
        let mut agg = ScanAggregator::new(&[100.0], Tolerance::PPM(10.0));
        assert_eq!(
            agg.ingest_line("4000 ms1 100.0 0").unwrap(),
            LineOutcome::ZeroIntensity
        );
        assert_eq!(agg.totals(), &[0.0]);
        assert_eq!(agg.max_scan(), FIRST_SCAN);
        assert_eq!(agg.reported_bucket_count(), 1);
    }

    #[test]
    fn test_overlapping_windows_all_match() {
        let mut agg = ScanAggregator::new(&[100.0, 100.0005, 300.0], Tolerance::PPM(10.0));
        let outcome = agg.ingest_line("200 ms1 100.0003 4").unwrap();
        assert_eq!(outcome, LineOutcome::Matched(2));
        assert_eq!(agg.totals(), &[4.0, 4.0, 0.0]);
    }

    #[test]
    fn test_bucket_sums_equal_totals() {
        let mut agg = ScanAggregator::new(&[100.0, 250.0], Tolerance::PPM(20.0));
        let mut log = String::from("header\n");
        for scan in 100..2000u32 {
            let mass = if scan % 3 == 0 { 100.001 } else { 250.002 };
            log.push_str(&format!("{scan} ms1 {mass} {}\n", (scan % 17) as f64 * 0.5));
        }
        agg.process(log.as_bytes()).unwrap();
        for row in agg.summary_rows("X") {
            let total: f64 = row.buckets.iter().sum();
            assert!((total - row.total_intensity).abs() < 1e-6 * row.total_intensity.max(1.0));
            assert!(row.total_intensity > 0.0);
        }
    }

    #[test]
    fn test_capacity_overflow_is_fatal() {
        let mut agg = ScanAggregator::with_bucket_capacity(&[100.0], Tolerance::PPM(10.0), 2);
        let err = agg
            .process("header\n130 ms1 100.0 1\n300 ms1 100.0 1\n".as_bytes())
            .unwrap_err();
        assert!(matches!(
            err,
            PickerError::BucketOverflow(BucketOverflow {
                index: 3,
                capacity: 2
            })
        ));
    }

    #[test]
    fn test_growable_reports_late_scans() {
        let mut agg = ScanAggregator::new(&[100.0], Tolerance::PPM(10.0));
        agg.ingest_line("9000 ms1 100.0 2").unwrap();
        assert_eq!(agg.reported_bucket_count(), 149);
        let row = &agg.summary_rows("A1")[0];
        assert_eq!(row.buckets.len(), 149);
        assert_eq!(row.buckets[148], 2.0);
    }

    #[test]
    fn test_no_targets() {
        let mut agg = ScanAggregator::new(&[], Tolerance::PPM(10.0));
        let stats = agg.process("header\n200 ms1 100.0 1\n".as_bytes()).unwrap();
        assert_eq!(stats.matched_records, 0);
        assert!(agg.summary_rows("A1").is_empty());
    }

    #[test]
    fn test_from_config() {
        let config = PickerConfig {
            target_masses: vec![100.0],
            bucket_capacity: Some(1),
            ..PickerConfig::default()
        };
        let mut agg = ScanAggregator::from_config(&config);
        assert_eq!(agg.buckets().capacity(), Some(1));
        assert!(agg.ingest_line("180 ms1 100.0 1").is_err());
    }
}
