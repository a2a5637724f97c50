//! Exponential bucketing strategy façade.
//!
//! Derives per-dimension range configs from the model-runner limits
//! (`bucket_count = ceil(log2(range)) + 1`), delegates to the prompt and
//! decode generators, and returns flat sorted bucket lists for the warmup
//! subsystem. Both entry points are pure: each call is independent and
//! idempotent given identical inputs and configuration.

use tracing::{info, warn};

use crate::bucket::Bucket;
use crate::config::{BucketingConfig, Phase};
use crate::decode::generate_decode_buckets;
use crate::error::BucketingError;
use crate::prompt::generate_prompt_buckets;
use crate::range::{ceil_log2, RangeConfig};

pub struct ExponentialBucketingStrategy {
    config: BucketingConfig,
}

impl ExponentialBucketingStrategy {
    pub fn new(config: BucketingConfig) -> Self {
        Self { config }
    }

    /// This strategy always derives bucket counts from the log2 formula;
    /// warn about any override flags it is going to ignore.
    fn check_for_user_flags(&self, phase: Phase) {
        let flags = self.config.override_flags(phase);
        if flags.is_empty() {
            return;
        }
        warn!("*******************************************************");
        for flag in &flags {
            warn!("Using exponential strategy - your configuration {flag} will be overwritten!");
        }
        warn!("*******************************************************");
    }

    /// Prompt-phase buckets, sorted, with the token-budget filter applied.
    pub fn get_prompt_buckets(
        &self,
        max_num_prefill_seqs: usize,
        block_size: usize,
        max_num_batched_tokens: usize,
        max_model_len: usize,
    ) -> Result<Vec<Bucket>, BucketingError> {
        self.check_for_user_flags(Phase::Prompt);
        if self.config.merged_prefill {
            info!("Merged prefill warmup is not implemented for exponential bucketing yet");
        }

        let bs_config = RangeConfig::new(
            1,
            2,
            max_num_prefill_seqs,
            ceil_log2(max_num_prefill_seqs) + 1,
        )?;
        let seq_config = RangeConfig::new(
            block_size,
            block_size,
            max_model_len,
            ceil_log2(max_model_len) + 1,
        )?;
        info!(
            max_num_batched_tokens,
            "Prompt bucket config (min, step, max_warmup, limit) bs:{bs_config:?}, seq:{seq_config:?}"
        );

        let result = generate_prompt_buckets(
            &bs_config,
            &seq_config,
            block_size,
            self.config.prefix_caching,
            Some(max_num_batched_tokens),
            Some(max_model_len),
        )?;
        Ok(result.captured)
    }

    /// Decode-phase buckets, sorted. The full batch-by-block cross-product
    /// is kept so independently padded dimensions are always covered.
    pub fn get_decode_buckets(
        &self,
        max_num_seqs: usize,
        block_size: usize,
        max_num_batched_tokens: usize,
        max_model_len: usize,
        num_max_blocks: usize,
    ) -> Result<Vec<Bucket>, BucketingError> {
        self.check_for_user_flags(Phase::Decode);

        let bs_config = RangeConfig::new(1, 2, max_num_seqs, ceil_log2(max_num_seqs) + 1)?;
        let blocks_config = RangeConfig::new(
            block_size,
            block_size,
            num_max_blocks,
            ceil_log2(num_max_blocks) + 1,
        )?;
        info!(
            max_num_batched_tokens,
            "Decode bucket config (min, step, max_warmup, limit) bs:{bs_config:?}, block:{blocks_config:?}"
        );

        Ok(generate_decode_buckets(
            &bs_config,
            &blocks_config,
            num_max_blocks,
            max_model_len,
            block_size,
            self.config.use_contiguous_pa,
            false,
        ))
    }
}
