//! Extract MS1 scan events from the lines of a scan log.
//!
//! A scan log line carries a scan number, a level token, the observed mass and its
//! intensity, separated by one or more spaces:
//!
//! ```text
//!    150 ms1 524.2648 12.5
//! ```
//!
//! Lines without the `ms1 ` marker are other scan levels or preamble and are not records.
use std::str::{FromStr, SplitWhitespace};

use thiserror::Error;

/// The literal which marks a line as an MS1 scan event
pub const MS1_MARKER: &str = "ms1 ";

const LEVEL_TOKEN: &str = "ms1";

/// The ways a candidate line can fail to yield a [`ScanRecord`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("The {0} field is missing")]
    MissingField(&'static str),
    #[error("Could not parse scan number from {0:?}")]
    InvalidScanNumber(String),
    #[error("Could not parse {field} from {token:?}")]
    InvalidNumber { field: &'static str, token: String },
}

/// A single observed ion from an MS1 scan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanRecord {
    pub scan_number: u32,
    pub mass: f64,
    pub intensity: f64,
}

/// Check whether `line` is an MS1 scan event at all
#[inline]
pub fn is_candidate(line: &str) -> bool {
    line.contains(MS1_MARKER)
}

/// Pull named fields out of a line in order, failing on the first one that is absent
struct FieldReader<'a> {
    tokens: SplitWhitespace<'a>,
}

impl<'a> FieldReader<'a> {
    fn new(line: &'a str) -> Self {
        Self {
            tokens: line.split_whitespace(),
        }
    }

    fn next_field(&mut self, name: &'static str) -> Result<&'a str, RecordError> {
        self.tokens.next().ok_or(RecordError::MissingField(name))
    }

    /// Read the scan number, stepping over a leading level token
    fn scan_number(&mut self) -> Result<u32, RecordError> {
        let mut token = self.next_field("scan number")?;
        if token == LEVEL_TOKEN {
            token = self.next_field("scan number")?;
        }
        token
            .parse::<u32>()
            .map_err(|_| RecordError::InvalidScanNumber(token.to_string()))
    }

    fn next_float(&mut self, name: &'static str) -> Result<f64, RecordError> {
        let token = self.next_field(name)?;
        token.parse::<f64>().map_err(|_| RecordError::InvalidNumber {
            field: name,
            token: token.to_string(),
        })
    }
}

impl ScanRecord {
    pub fn new(scan_number: u32, mass: f64, intensity: f64) -> Self {
        Self {
            scan_number,
            mass,
            intensity,
        }
    }

    /// Parse the positional fields of a candidate line.
    ///
    /// The fields are read as scan number, one ignored token, mass and intensity.
    /// A level token leading the line is stepped over before the scan number.
    /// Anything after the intensity is ignored.
    pub fn parse_line(line: &str) -> Result<Self, RecordError> {
        let mut fields = FieldReader::new(line);
        let scan_number = fields.scan_number()?;
        fields.next_field("scan level")?;
        let mass = fields.next_float("mass")?;
        let intensity = fields.next_float("intensity")?;

        Ok(Self::new(scan_number, mass, intensity))
    }
}

/// Read only the scan number of a candidate line, leaving the remaining fields unchecked
pub fn parse_scan_number(line: &str) -> Result<u32, RecordError> {
    FieldReader::new(line).scan_number()
}

impl FromStr for ScanRecord {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_line(s)
    }
}
