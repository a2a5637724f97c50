use thiserror::Error;

use crate::range::RangeConfig;

#[derive(Error, Debug)]
pub enum BucketingError {
    #[error("invalid bucket range (min={min}, step={step}, max={max}, bucket_count={bucket_count}): {reason}")]
    InvalidRange {
        min: usize,
        step: usize,
        max: usize,
        bucket_count: usize,
        reason: &'static str,
    },

    #[error(
        "no buckets could be captured with following config (min, step, max_warmup, limit) \
         bs:{bs:?}, seq:{seq:?}"
    )]
    NoBucketsCaptured { bs: RangeConfig, seq: RangeConfig },
}
