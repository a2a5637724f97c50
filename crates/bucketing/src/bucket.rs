//! Bucket type, ordering, and the frozen set consumed at dispatch time.
//!
//! A bucket is a pre-warmed `(batch_size, seq_len, num_blocks)` input shape.
//! Buckets are totally ordered by `(batch_size * seq_len, seq_len,
//! batch_size)` — approximate token volume first — so "round a live request
//! up to the nearest covering bucket" is deterministic: the first covering
//! bucket in sorted order wastes the least padding.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// A fixed input shape compiled/warmed ahead of time.
///
/// For prompt buckets `seq_len` is the sequence length and `num_blocks` the
/// cached-context block count (0 with prefix caching disabled). For decode
/// buckets `seq_len` is fixed at 1 and `num_blocks` is the KV block count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bucket {
    pub batch_size: usize,
    pub seq_len: usize,
    pub num_blocks: usize,
}

impl Bucket {
    pub fn new(batch_size: usize, seq_len: usize, num_blocks: usize) -> Self {
        Self {
            batch_size,
            seq_len,
            num_blocks,
        }
    }

    /// Token volume implied by this shape, counting cached context.
    pub fn token_volume(&self, block_size: usize) -> usize {
        self.batch_size * (self.seq_len + self.num_blocks * block_size)
    }

    /// True when every dimension covers the requested shape.
    pub fn covers(&self, batch_size: usize, seq_len: usize, num_blocks: usize) -> bool {
        self.batch_size >= batch_size && self.seq_len >= seq_len && self.num_blocks >= num_blocks
    }

    fn sort_key(&self) -> (usize, usize, usize, usize) {
        // num_blocks is a final tiebreak only, keeping Ord consistent with Eq.
        (
            self.batch_size * self.seq_len,
            self.seq_len,
            self.batch_size,
            self.num_blocks,
        )
    }
}

impl Ord for Bucket {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for Bucket {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Frozen, deduplicated, sorted bucket sequence.
///
/// Built once per warmup pass and read-only afterwards; concurrent readers
/// need no synchronization as long as reconfiguration swaps the whole set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BucketSet {
    buckets: Vec<Bucket>,
}

impl BucketSet {
    /// Freeze a set from generated buckets, deduplicating and sorting.
    pub fn new(mut buckets: Vec<Bucket>) -> Self {
        buckets.sort_unstable();
        buckets.dedup();
        Self { buckets }
    }

    /// Smallest bucket covering the requested shape, by the round-up policy:
    /// first bucket in token-volume order whose every dimension is >= the
    /// request. `None` means the request exceeds the warmed space.
    pub fn find(&self, batch_size: usize, seq_len: usize, num_blocks: usize) -> Option<Bucket> {
        self.buckets
            .iter()
            .copied()
            .find(|b| b.covers(batch_size, seq_len, num_blocks))
    }

    pub fn as_slice(&self) -> &[Bucket] {
        &self.buckets
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Bucket> {
        self.buckets.iter()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

impl FromIterator<Bucket> for BucketSet {
    fn from_iter<I: IntoIterator<Item = Bucket>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a BucketSet {
    type Item = &'a Bucket;
    type IntoIter = std::slice::Iter<'a, Bucket>;

    fn into_iter(self) -> Self::IntoIter {
        self.buckets.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_token_volume_first() {
        // (4,16), (2,32), (1,64) share volume 64: seq length breaks the tie,
        // then batch size.
        let mut buckets = vec![
            Bucket::new(1, 64, 0),
            Bucket::new(4, 16, 0),
            Bucket::new(2, 32, 0),
            Bucket::new(1, 16, 0),
            Bucket::new(4, 64, 0),
        ];
        buckets.sort_unstable();
        assert_eq!(
            buckets,
            vec![
                Bucket::new(1, 16, 0),
                Bucket::new(4, 16, 0),
                Bucket::new(2, 32, 0),
                Bucket::new(1, 64, 0),
                Bucket::new(4, 64, 0),
            ]
        );
    }

    #[test]
    fn ordering_breaks_final_tie_on_blocks() {
        let a = Bucket::new(2, 32, 0);
        let b = Bucket::new(2, 32, 4);
        assert!(a < b);
        assert_eq!(a, Bucket::new(2, 32, 0));
    }

    #[test]
    fn token_volume_counts_cached_context() {
        assert_eq!(Bucket::new(2, 128, 0).token_volume(16), 256);
        assert_eq!(Bucket::new(2, 128, 4).token_volume(16), 2 * (128 + 64));
    }

    #[test]
    fn set_deduplicates_and_sorts() {
        let set = BucketSet::new(vec![
            Bucket::new(2, 32, 0),
            Bucket::new(1, 16, 0),
            Bucket::new(2, 32, 0),
        ]);
        assert_eq!(
            set.as_slice(),
            &[Bucket::new(1, 16, 0), Bucket::new(2, 32, 0)]
        );
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn find_rounds_up_to_smallest_cover() {
        let set: BucketSet = [
            Bucket::new(1, 128, 0),
            Bucket::new(2, 128, 0),
            Bucket::new(4, 256, 0),
            Bucket::new(8, 1024, 0),
        ]
        .into_iter()
        .collect();

        // Exact hit.
        assert_eq!(set.find(2, 128, 0), Some(Bucket::new(2, 128, 0)));
        // Rounds both dimensions up.
        assert_eq!(set.find(3, 200, 0), Some(Bucket::new(4, 256, 0)));
        // Covered only by the largest bucket.
        assert_eq!(set.find(5, 512, 0), Some(Bucket::new(8, 1024, 0)));
        // Outside the warmed space.
        assert_eq!(set.find(16, 128, 0), None);
    }

    #[test]
    fn find_respects_block_dimension() {
        let set: BucketSet = [Bucket::new(1, 128, 0), Bucket::new(1, 128, 8)]
            .into_iter()
            .collect();
        assert_eq!(set.find(1, 100, 0), Some(Bucket::new(1, 128, 0)));
        assert_eq!(set.find(1, 100, 3), Some(Bucket::new(1, 128, 8)));
        assert_eq!(set.find(1, 100, 9), None);
    }

    #[test]
    fn empty_set_finds_nothing() {
        let set = BucketSet::default();
        assert!(set.is_empty());
        assert_eq!(set.find(1, 1, 0), None);
    }
}
