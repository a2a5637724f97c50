//! Decode bucket generation.
//!
//! Decode buckets fix the query length at 1 and span `(batch_size,
//! num_blocks)`. By default every combination of the two ranges is emitted,
//! even ones whose implied context exceeds the model length: at dispatch
//! time batch size and block count may be padded independently, and an
//! incomplete cross-product could fail to cover a legal combination.

use std::collections::BTreeSet;

use crate::bucket::Bucket;
use crate::range::{warmup_range_with_limit, RangeConfig};

/// Generate decode buckets from a batch-size range and a block-count range.
///
/// Contiguous paged attention requires block buckets to reach the physical
/// block maximum, so `use_contiguous_pa` overrides the block range's
/// declared maximum with `max_blocks` before generation.
///
/// `skip_invalid` trades coverage for size: instead of the full
/// cross-product, each batch size keeps only block candidates up to the
/// smallest candidate covering what that batch could legitimately need
/// (`min(batch * ceil(max_model_len / block_size), max_blocks)`). This
/// requires batch and block dimensions to be requested jointly at dispatch.
pub fn generate_decode_buckets(
    bs_config: &RangeConfig,
    blocks_config: &RangeConfig,
    max_blocks: usize,
    max_model_len: usize,
    block_size: usize,
    use_contiguous_pa: bool,
    skip_invalid: bool,
) -> Vec<Bucket> {
    let batch_sizes = warmup_range_with_limit(bs_config, false, true);

    let blocks_config = if use_contiguous_pa {
        RangeConfig {
            max: max_blocks,
            ..*blocks_config
        }
    } else {
        *blocks_config
    };
    let block_counts = warmup_range_with_limit(&blocks_config, false, true);

    let mut buckets: BTreeSet<Bucket> = BTreeSet::new();
    if !skip_invalid {
        for &bs in &batch_sizes {
            for &blocks in &block_counts {
                buckets.insert(Bucket::new(bs, 1, blocks));
            }
        }
    } else {
        for &bs in &batch_sizes {
            let max_blocks_per_bs = (bs * max_model_len.div_ceil(block_size)).min(max_blocks);
            let upper_bound = block_counts
                .iter()
                .copied()
                .find(|&b| b >= max_blocks_per_bs)
                .or_else(|| block_counts.last().copied());
            let Some(upper_bound) = upper_bound else {
                continue;
            };
            for &blocks in block_counts.iter().filter(|&&b| b <= upper_bound) {
                buckets.insert(Bucket::new(bs, 1, blocks));
            }
        }
    }

    buckets.into_iter().collect()
}
