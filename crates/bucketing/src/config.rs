//! Bucketing configuration.
//!
//! The strategy reads a plain immutable struct with named, typed fields.
//! Override fields mirror the `VLLM_{PHASE}_{DIM}_BUCKET_{PARAM}` knobs
//! recognized elsewhere in the serving stack; the exponential strategy
//! always derives bucket counts itself, so overrides are only detected
//! and warned about, never applied.

use serde::{Deserialize, Serialize};

/// Warmup phase a bucket set is generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Prompt,
    Decode,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Prompt => "prompt",
            Phase::Decode => "decode",
        }
    }
}

/// Per-dimension bucket range override: `{min, step, max, limit}`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BucketOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl BucketOverride {
    /// Parameters that are explicitly set, as `(name, value)` pairs.
    fn set_params(&self) -> Vec<(&'static str, usize)> {
        [
            ("MIN", self.min),
            ("STEP", self.step),
            ("MAX", self.max),
            ("LIMIT", self.limit),
        ]
        .into_iter()
        .filter_map(|(name, v)| v.map(|v| (name, v)))
        .collect()
    }
}

/// Immutable bucketing configuration consumed by the strategy.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BucketingConfig {
    /// Prefix caching adds a context-block dimension to prompt buckets.
    #[serde(default)]
    pub prefix_caching: bool,

    /// Contiguous paged attention requires block buckets to reach the
    /// physical block maximum, not the configured warmup ceiling.
    #[serde(default)]
    pub use_contiguous_pa: bool,

    /// Merged prefill warmup is not supported by this strategy; the flag is
    /// only checked to log that fact.
    #[serde(default)]
    pub merged_prefill: bool,

    #[serde(default)]
    pub prompt_bs: BucketOverride,

    #[serde(default)]
    pub prompt_seq: BucketOverride,

    #[serde(default)]
    pub decode_bs: BucketOverride,

    #[serde(default)]
    pub decode_block: BucketOverride,
}

impl BucketingConfig {
    /// Override flags set for the given phase, rendered as the
    /// `VLLM_{PHASE}_{DIM}_BUCKET_{PARAM}=value` strings users know them by.
    pub fn override_flags(&self, phase: Phase) -> Vec<String> {
        let dims: [(&'static str, &BucketOverride); 2] = match phase {
            Phase::Prompt => [("BS", &self.prompt_bs), ("SEQ", &self.prompt_seq)],
            Phase::Decode => [("BS", &self.decode_bs), ("BLOCK", &self.decode_block)],
        };
        let phase = phase.as_str().to_uppercase();
        let mut flags = Vec::new();
        for (dim, ov) in dims {
            for (param, value) in ov.set_params() {
                flags.push(format!("VLLM_{phase}_{dim}_BUCKET_{param}={value}"));
            }
        }
        flags
    }
}
