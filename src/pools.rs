//! Read pool definition files, which name groups of target masses.
//!
//! A pool definition is a header-less CSV file of `pool,mass` rows. Rows for the same
//! pool need not be adjacent; masses are kept in the order they appear.
//!
//! ```text
//! P01,524.2648
//! P01,610.1841
//! P02,445.1200
//! ```
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("Failed to read pool definitions: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse pool definitions: {0}")]
    Csv(#[from] csv::Error),
    #[error("Pool definition row {row} is missing the {field} column")]
    MissingColumn { row: usize, field: &'static str },
    #[error("Pool definition row {row} has an invalid mass {token:?}")]
    InvalidMass { row: usize, token: String },
    #[error("No pool definition matches {0:?}")]
    UnknownPool(String),
}

/// A named, ordered group of target masses
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Pool {
    pub name: String,
    pub masses: Vec<f64>,
}

/// Pools in the order they were first defined
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PoolDefinitions {
    pub pools: Vec<Pool>,
}

impl PoolDefinitions {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, PoolError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, PoolError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut definitions = Self::default();
        for (i, record) in csv_reader.records().enumerate() {
            let record = record?;
            let row = i + 1;
            if record.iter().all(|field| field.is_empty()) {
                continue;
            }
            let name = record
                .get(0)
                .filter(|name| !name.is_empty())
                .ok_or(PoolError::MissingColumn { row, field: "pool" })?;
            let token = record
                .get(1)
                .filter(|token| !token.is_empty())
                .ok_or(PoolError::MissingColumn { row, field: "mass" })?;
            let mass = token.parse::<f64>().map_err(|_| PoolError::InvalidMass {
                row,
                token: token.to_string(),
            })?;
            definitions.push(name, mass);
        }
        Ok(definitions)
    }

    fn push(&mut self, name: &str, mass: f64) {
        match self.pools.iter_mut().find(|pool| pool.name == name) {
            Some(pool) => pool.masses.push(mass),
            None => self.pools.push(Pool {
                name: name.to_string(),
                masses: vec![mass],
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Pool> {
        self.pools.iter().find(|pool| pool.name == name)
    }

    /// Find the first pool whose name occurs in `well_identifier`, the way raw
    /// file names embed the pool they were acquired from.
    pub fn pool_for_well(&self, well_identifier: &str) -> Result<&Pool, PoolError> {
        self.pools
            .iter()
            .find(|pool| well_identifier.contains(pool.name.as_str()))
            .ok_or_else(|| PoolError::UnknownPool(well_identifier.to_string()))
    }
}
