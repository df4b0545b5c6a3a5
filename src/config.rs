use std::path::{Path, PathBuf};

use crate::tolerance::Tolerance;

/// Everything a single picking run needs to know, built once at startup
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PickerConfig {
    /// The results file rows are appended to
    pub results_path: PathBuf,
    /// The label written as the first field of every row
    pub well_identifier: String,
    pub tolerance: Tolerance,
    /// Target masses in output order
    pub target_masses: Vec<f64>,
    /// Reject scans past this many buckets instead of growing the table
    pub bucket_capacity: Option<usize>,
    /// Write a header line when the results file is empty
    pub write_header: bool,
}

impl PickerConfig {
    pub fn new<P: Into<PathBuf>, S: Into<String>>(
        results_path: P,
        well_identifier: S,
        tolerance: Tolerance,
        target_masses: Vec<f64>,
    ) -> Self {
        Self {
            results_path: results_path.into(),
            well_identifier: well_identifier.into(),
            tolerance,
            target_masses,
            bucket_capacity: None,
            write_header: false,
        }
    }

    pub fn results_path(&self) -> &Path {
        &self.results_path
    }
}

/// A builder for configuring [`PickerConfig`]
#[derive(Debug, Clone, Default)]
pub struct PickerConfigBuilder {
    results_path: PathBuf,
    well_identifier: String,
    tolerance: Tolerance,
    target_masses: Vec<f64>,
    bucket_capacity: Option<usize>,
    write_header: bool,
}

impl PickerConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn results_path<P: Into<PathBuf>>(&mut self, results_path: P) -> &mut Self {
        self.results_path = results_path.into();
        self
    }

    pub fn well_identifier<S: Into<String>>(&mut self, well_identifier: S) -> &mut Self {
        self.well_identifier = well_identifier.into();
        self
    }

    pub fn tolerance(&mut self, tolerance: Tolerance) -> &mut Self {
        self.tolerance = tolerance;
        self
    }

    pub fn target_mass(&mut self, mass: f64) -> &mut Self {
        self.target_masses.push(mass);
        self
    }

    pub fn target_masses<I: IntoIterator<Item = f64>>(&mut self, masses: I) -> &mut Self {
        self.target_masses.extend(masses);
        self
    }

    pub fn bucket_capacity(&mut self, bucket_capacity: Option<usize>) -> &mut Self {
        self.bucket_capacity = bucket_capacity;
        self
    }

    pub fn write_header(&mut self, write_header: bool) -> &mut Self {
        self.write_header = write_header;
        self
    }

    pub fn build(self) -> PickerConfig {
        PickerConfig {
            results_path: self.results_path,
            well_identifier: self.well_identifier,
            tolerance: self.tolerance,
            target_masses: self.target_masses,
            bucket_capacity: self.bucket_capacity,
            write_header: self.write_header,
        }
    }
}

impl From<PickerConfigBuilder> for PickerConfig {
    fn from(value: PickerConfigBuilder) -> Self {
        value.build()
    }
}
