//! Assemble per-target summary rows and append them to a results file.
use std::fmt;
use std::fs;
use std::io;
use std::io::prelude::*;
use std::path;

use crate::error::PickerError;

/// The header MassFinder places at the top of a fresh results file
pub const RESULTS_HEADER: &str =
    "Well File Name,Mass,IonCount,IonCount-Minute3,IonCount-Minute4,...";

/// One output line: a target mass, its total intensity and its intensity over time
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub well_identifier: String,
    pub target_mass: f64,
    pub total_intensity: f64,
    pub buckets: Vec<f64>,
}

impl fmt::Display for SummaryRow {
    /// Every field, including the last bucket, is followed by a comma
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},",
            self.well_identifier, self.target_mass, self.total_intensity
        )?;
        for value in self.buckets.iter() {
            write!(f, "{},", value)?;
        }
        Ok(())
    }
}

pub fn rows_to_writer<W: io::Write>(rows: &[SummaryRow], writer: &mut W) -> io::Result<()> {
    for row in rows {
        writer.write_all(format!("{}\n", row).as_bytes())?;
    }
    Ok(())
}

/// Append `rows` to the file at `path`, creating it if it does not exist.
///
/// When `write_header` is set the [`RESULTS_HEADER`] line is written first, but only
/// if the file is empty.
pub fn append_rows<P: AsRef<path::Path>>(
    rows: &[SummaryRow],
    path: P,
    write_header: bool,
) -> Result<(), PickerError> {
    let path = path.as_ref();
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| PickerError::file(path, e))?;

    let is_empty = file
        .metadata()
        .map_err(|e| PickerError::file(path, e))?
        .len()
        == 0;

    let mut writer = io::BufWriter::new(file);
    write_results(rows, &mut writer, write_header && is_empty)
        .map_err(|e| PickerError::file(path, e))
}

fn write_results<W: io::Write>(
    rows: &[SummaryRow],
    writer: &mut W,
    header: bool,
) -> io::Result<()> {
    if header {
        writeln!(writer, "{}", RESULTS_HEADER)?;
    }
    rows_to_writer(rows, writer)?;
    writer.flush()
}
