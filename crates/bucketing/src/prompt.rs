//! Prompt (prefill) bucket generation.

use std::collections::BTreeSet;

use crate::bucket::Bucket;
use crate::error::BucketingError;
use crate::range::{ceil_log2, warmup_range_with_limit, RangeConfig};

/// Sequence-length maxima at or above this use the long-context range
/// layout (exponential half plus linear tail).
pub const LONG_CONTEXT_THRESHOLD: usize = 8192;

/// Result of a prompt generation pass.
///
/// `omitted` lists buckets excluded by the token-budget filter, kept for
/// diagnostics only. `budget_relaxed` flags that filtering would have
/// eliminated every candidate and was abandoned: `captured` then holds the
/// unfiltered set at the risk of exceeding the token budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptBuckets {
    pub captured: Vec<Bucket>,
    pub omitted: Vec<Bucket>,
    pub budget_relaxed: bool,
}

/// Generate prompt buckets from a batch-size range and a sequence-length
/// range, optionally crossed with a cached-context block dimension.
///
/// With `prefix_caching`, every (batch, seq) pair gets its zero-context
/// bucket plus exponentially spaced context-block counts up to the blocks
/// that still fit under the sequence maximum.
///
/// When both `max_num_batched_tokens` and `max_model_len` are supplied,
/// buckets whose token volume exceeds the budget are moved to `omitted`.
/// If that would leave nothing, the filter is abandoned (see
/// [`PromptBuckets::budget_relaxed`]) rather than warming zero buckets.
pub fn generate_prompt_buckets(
    bs_config: &RangeConfig,
    seq_config: &RangeConfig,
    block_size: usize,
    prefix_caching: bool,
    max_num_batched_tokens: Option<usize>,
    max_model_len: Option<usize>,
) -> Result<PromptBuckets, BucketingError> {
    let seq_max = seq_config.max;
    let long_context = seq_max >= LONG_CONTEXT_THRESHOLD;

    let batch_sizes = warmup_range_with_limit(bs_config, false, true);
    let seq_lens = warmup_range_with_limit(seq_config, long_context, true);

    let mut buckets: BTreeSet<Bucket> = BTreeSet::new();
    if prefix_caching {
        for &bs in &batch_sizes {
            for &seq in &seq_lens {
                buckets.insert(Bucket::new(bs, seq, 0));
                let blocks_range = (seq_max - seq) / block_size;
                if blocks_range == 0 {
                    continue;
                }
                let count = ceil_log2(blocks_range) + 1;
                for i in 1..=count {
                    let blocks = if i == count {
                        blocks_range
                    } else {
                        (blocks_range as f64)
                            .powf((1.0 / count as f64) * i as f64)
                            .ceil() as usize
                    };
                    buckets.insert(Bucket::new(bs, seq, blocks));
                }
            }
        }
    } else {
        for &bs in &batch_sizes {
            for &seq in &seq_lens {
                buckets.insert(Bucket::new(bs, seq, 0));
            }
        }
    }

    if buckets.is_empty() {
        return Err(BucketingError::NoBucketsCaptured {
            bs: *bs_config,
            seq: *seq_config,
        });
    }

    let (Some(token_budget), Some(model_len)) = (max_num_batched_tokens, max_model_len) else {
        return Ok(PromptBuckets {
            captured: buckets.into_iter().collect(),
            omitted: Vec::new(),
            budget_relaxed: false,
        });
    };

    let within_budget =
        |b: &Bucket| b.token_volume(block_size) <= token_budget && b.seq_len <= model_len;

    if !buckets.iter().any(within_budget) {
        // Honoring the budget would leave zero buckets and an unservable
        // phase; proceed unfiltered at the risk of out-of-memory.
        let min_required_budget = buckets
            .iter()
            .min_by_key(|b| b.batch_size * b.seq_len)
            .map(|b| b.token_volume(block_size))
            .unwrap_or(0);
        tracing::warn!(
            min_required_budget,
            max_num_batched_tokens = token_budget,
            "bucketing configuration bs:{bs_config:?}, seq:{seq_config:?} cannot be used with \
             the specified token budget: the smallest bucket already exceeds it. Increase \
             max_num_batched_tokens or decrease the bucket minimum. Ignoring \
             max_num_batched_tokens at risk of out-of-memory errors"
        );
        return Ok(PromptBuckets {
            captured: buckets.into_iter().collect(),
            omitted: Vec::new(),
            budget_relaxed: true,
        });
    }

    let (captured, omitted): (Vec<Bucket>, Vec<Bucket>) =
        buckets.into_iter().partition(within_budget);

    Ok(PromptBuckets {
        captured,
        omitted,
        budget_relaxed: false,
    })
}
