//! Byte-pair hash index for the compressor
//!
//! Every position of the work buffer that starts a byte pair is sorted into
//! buckets keyed by [`byte_pair_hash`]. Inside a bucket positions are in
//! ascending order, so the nearest earlier occurrences sit at the end of
//! the prefix below the current position.

use super::{byte_pair_hash, HASH_TABLE_SIZE};

/// Positions grouped by byte-pair hash, rebuilt for every work buffer
#[derive(Debug, Clone)]
pub struct HashIndex {
    /// Start of each bucket in `entries`; the extra last slot ends the final bucket
    bucket_start: Vec<u16>,
    /// Work buffer positions, bucket by bucket
    entries: Vec<u16>,
}

impl HashIndex {
    /// Create an empty index able to hold `capacity` positions
    pub fn new(capacity: usize) -> Self {
        Self {
            bucket_start: vec![0; HASH_TABLE_SIZE + 1],
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Re-index every byte pair of `buffer`
    ///
    /// Counting sort: count pairs per hash, turn counts into running
    /// totals, then place positions walking backwards so each bucket ends
    /// up ascending.
    pub fn rebuild(&mut self, buffer: &[u8]) {
        self.bucket_start.fill(0);
        self.entries.clear();

        let pairs = buffer.len().saturating_sub(1);
        if pairs == 0 {
            return;
        }

        for pair in buffer.windows(2) {
            self.bucket_start[byte_pair_hash(pair[0], pair[1])] += 1;
        }

        let mut total = 0u16;
        for slot in &mut self.bucket_start {
            total += *slot;
            *slot = total;
        }

        self.entries.resize(pairs, 0);
        for pos in (0..pairs).rev() {
            let hash = byte_pair_hash(buffer[pos], buffer[pos + 1]);
            self.bucket_start[hash] -= 1;
            self.entries[self.bucket_start[hash] as usize] = pos as u16;
        }
    }

    /// All indexed positions whose byte pair hashes to `hash`, ascending
    pub fn candidates(&self, hash: usize) -> &[u16] {
        let start = self.bucket_start[hash] as usize;
        let end = self.bucket_start[hash + 1] as usize;
        &self.entries[start..end]
    }

    /// Number of indexed positions
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is indexed
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
