//! Bin matched intensity into fixed-width scan number buckets, one column per target mass.
use thiserror::Error;

/// The first scan number that is considered part of the run
pub const FIRST_SCAN: u32 = 120;

/// The number of scans covered by a single bucket
pub const BUCKET_WIDTH: u32 = 60;

/// The number of buckets allocated up front
pub const DEFAULT_BUCKET_COUNT: usize = 100;

/// A scan mapped to a bucket past the end of a fixed size table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Scan bucket {index} is out of range for a table of {capacity} buckets")]
pub struct BucketOverflow {
    pub index: usize,
    pub capacity: usize,
}

/// Map a scan number to its bucket index.
///
/// Scans before [`FIRST_SCAN`] share bucket zero; callers are expected to have
/// discarded them already.
#[inline]
pub fn bucket_index(scan_number: u32) -> usize {
    (scan_number.saturating_sub(FIRST_SCAN) / BUCKET_WIDTH) as usize
}

/// A table of `buckets x targets` intensity accumulators, stored bucket-major in
/// a single allocation.
///
/// Without a capacity the table grows to fit any bucket index. With one, indices
/// at or past it are rejected with [`BucketOverflow`].
#[derive(Debug, Clone, PartialEq)]
pub struct TimeBucketTable {
    values: Vec<f64>,
    n_buckets: usize,
    width: usize,
    capacity: Option<usize>,
}

impl TimeBucketTable {
    /// A growable table for `width` target masses
    pub fn new(width: usize) -> Self {
        Self {
            values: vec![0.0; width * DEFAULT_BUCKET_COUNT],
            n_buckets: DEFAULT_BUCKET_COUNT,
            width,
            capacity: None,
        }
    }

    /// A table for `width` target masses holding at most `capacity` buckets
    pub fn with_capacity(width: usize, capacity: usize) -> Self {
        Self {
            values: vec![0.0; width * capacity],
            n_buckets: capacity,
            width,
            capacity: Some(capacity),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// The number of buckets currently allocated
    pub fn len(&self) -> usize {
        self.n_buckets
    }

    pub fn is_empty(&self) -> bool {
        self.n_buckets == 0
    }

    /// Add `intensity` to the bucket holding `scan_number` in column `target_index`
    pub fn add(
        &mut self,
        scan_number: u32,
        target_index: usize,
        intensity: f64,
    ) -> Result<(), BucketOverflow> {
        let index = bucket_index(scan_number);
        if index >= self.n_buckets {
            match self.capacity {
                Some(capacity) => return Err(BucketOverflow { index, capacity }),
                None => {
                    self.n_buckets = index + 1;
                    self.values.resize(self.n_buckets * self.width, 0.0);
                }
            }
        }
        self.values[index * self.width + target_index] += intensity;
        Ok(())
    }

    /// The accumulated value, zero for buckets never allocated
    pub fn get(&self, bucket: usize, target_index: usize) -> f64 {
        if bucket >= self.n_buckets || target_index >= self.width {
            return 0.0;
        }
        self.values[bucket * self.width + target_index]
    }

    /// Iterate over the first `count` buckets of one target's column
    pub fn column(&self, target_index: usize, count: usize) -> impl Iterator<Item = f64> + '_ {
        (0..count).map(move |bucket| self.get(bucket, target_index))
    }
}
