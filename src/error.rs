use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::buckets::BucketOverflow;
use crate::pools::PoolError;
use crate::record::RecordError;

/// All the ways a picking run can fail
#[derive(Debug, Error)]
pub enum PickerError {
    #[error("Malformed scan record: {0}")]
    Record(#[from] RecordError),
    #[error(transparent)]
    BucketOverflow(#[from] BucketOverflow),
    #[error("Failed to write results file {}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to read the scan log: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Pool(#[from] PoolError),
}

impl PickerError {
    pub fn file<P: Into<PathBuf>>(path: P, source: io::Error) -> Self {
        Self::File {
            path: path.into(),
            source,
        }
    }
}
