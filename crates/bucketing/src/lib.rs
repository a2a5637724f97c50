//! Warmup shape bucketing for accelerator-backed LLM serving.
//!
//! Accelerator kernels are compiled ahead-of-time for fixed input shapes:
//! every distinct (batch, sequence-length, block-count) triple seen at
//! runtime triggers an expensive recompilation unless the shape was
//! pre-warmed. This crate chooses a small, bounded set of representative
//! shape buckets covering the space a server will realistically encounter,
//! so live requests can be rounded up to the nearest warmed bucket instead
//! of recompiling.
//!
//! [`ExponentialBucketingStrategy`] is the entry point: it derives
//! per-dimension ranges from the model-runner limits and produces sorted
//! prompt and decode bucket lists. [`BucketSet`] is the frozen, read-only
//! view the dispatch path uses to round a request's shape up.

pub mod bucket;
pub mod config;
pub mod decode;
pub mod error;
pub mod prompt;
pub mod range;
pub mod strategy;

pub use bucket::{Bucket, BucketSet};
pub use config::{BucketOverride, BucketingConfig, Phase};
pub use decode::generate_decode_buckets;
pub use error::BucketingError;
pub use prompt::{generate_prompt_buckets, PromptBuckets, LONG_CONTEXT_THRESHOLD};
pub use range::{ceil_log2, warmup_range_with_limit, RangeConfig};
pub use strategy::ExponentialBucketingStrategy;
