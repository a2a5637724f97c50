//! Exponential warmup range generation.
//!
//! Accelerator kernels are compiled ahead-of-time for fixed shapes, so each
//! dimension of the warmup space is sampled at a small set of representative
//! values. Values are exponentially spaced so small shapes (where relative
//! padding waste hurts most) are sampled densely and large shapes sparsely.
//!
//! # Worked example
//!
//! `(min=128, step=128, max=2048, bucket_count=10)`: there are 16 possible
//! step-aligned values (2048/128) and we select 10 with exponential spacing.
//! The raw knots are `min * (max/min)^(i/9)`:
//!
//! ```text
//! raw     = [128.0, 174.2, 237.0, 322.5, 438.9, 597.3, 812.8, 1106.0, 1505.0, 2048.0]
//! rounded = [128,   256,   256,   384,   512,   640,   896,   1152,   1536,   2048]
//! ```
//!
//! Rounding up to the next multiple of `step` collides 174.2 and 237.0 on
//! 256. With `fill = false` the collision is dropped (9 values). With
//! `fill = true` it is resolved by taking the untaken step-aligned value
//! closest to the raw knot, which cascades:
//!
//! ```text
//! 237.0 -> (256 taken) -> 384
//! 322.5 -> (384 taken) -> 512
//! 438.9 -> (512 taken) -> 640
//! 597.3 -> (640 taken) -> 768
//! result = [128, 256, 384, 512, 640, 768, 896, 1152, 1536, 2048]
//! ```
//!
//! When resolution runs out of untaken values, generation stops early and
//! fewer values are returned. Duplicates are never returned.

use std::collections::BTreeSet;

use crate::error::BucketingError;

/// A single warmup dimension: `{min, step, max, bucket_count}`.
///
/// Validated at construction; immutable afterwards. `bucket_count == 1`
/// degenerates to the single working point `[max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeConfig {
    pub min: usize,
    pub step: usize,
    pub max: usize,
    pub bucket_count: usize,
}

impl RangeConfig {
    pub fn new(
        min: usize,
        step: usize,
        max: usize,
        bucket_count: usize,
    ) -> Result<Self, BucketingError> {
        let reason = if min == 0 {
            Some("min must be positive")
        } else if step == 0 {
            Some("step must be positive")
        } else if max < min {
            Some("max must be >= min")
        } else if bucket_count == 0 {
            Some("bucket_count must be positive")
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(BucketingError::InvalidRange {
                min,
                step,
                max,
                bucket_count,
                reason,
            });
        }
        Ok(Self {
            min,
            step,
            max,
            bucket_count,
        })
    }
}

/// ceil(log2(n)) via bit arithmetic; exact for all n >= 1.
pub fn ceil_log2(n: usize) -> usize {
    if n <= 1 {
        0
    } else {
        (usize::BITS - (n - 1).leading_zeros()) as usize
    }
}

/// Generate up to `bucket_count` representative values spanning
/// `[config.min, config.max]`.
///
/// Spacing is exponential; with `long_context` the count is split into an
/// exponential half over `[min, max / bucket_count]` and a linear tail up to
/// `max`, giving denser coverage where exponential-only spacing
/// under-samples. `fill` controls duplicate resolution after step rounding
/// (see module docs).
///
/// The result is strictly increasing, starts at `min`, and ends at `max`
/// unless duplicate resolution exhausted the value space first.
pub fn warmup_range_with_limit(config: &RangeConfig, long_context: bool, fill: bool) -> Vec<usize> {
    let RangeConfig {
        min,
        step,
        max,
        bucket_count,
    } = *config;
    if bucket_count == 1 {
        return vec![max];
    }

    // Every value the fill policy may substitute: min, min+step, ..., <= max.
    let candidates: Vec<usize> = (min..=max).step_by(step).collect();

    let (exp_count, span) = if long_context {
        (bucket_count / 2, max as f64 / bucket_count as f64)
    } else {
        (bucket_count, max as f64)
    };
    let linear_count = bucket_count - exp_count;

    let mut buckets: BTreeSet<usize> = BTreeSet::new();

    for i in 0..exp_count {
        let raw = if i == 0 {
            min as f64
        } else {
            // The exponent is computed as (1/(n-1)) * i, not i/(n-1): the
            // association changes the last-ulp rounding and therefore which
            // step multiple a knot lands on.
            let exponent = (1.0 / (exp_count - 1) as f64) * i as f64;
            min as f64 * (span / min as f64).powf(exponent)
        };
        // Endpoints are pinned so float drift can never shift min off the
        // range start or round the last knot past max.
        let bucket = if i == 0 {
            min
        } else if i + 1 == exp_count && !long_context {
            max
        } else {
            round_up_to_step(raw, step)
        };

        if fill && buckets.contains(&bucket) {
            let substitute = candidates
                .iter()
                .copied()
                .filter(|c| !buckets.contains(c))
                .min_by(|&a, &b| {
                    let da = (a as f64 - raw).abs();
                    let db = (b as f64 - raw).abs();
                    da.total_cmp(&db).then(a.cmp(&b))
                });
            match substitute {
                Some(value) => {
                    buckets.insert(value);
                }
                // No unique values left; return fewer buckets than requested.
                None => break,
            }
        } else {
            buckets.insert(bucket);
        }
    }

    if long_context {
        let tail_step = (max as f64 - span) / linear_count as f64;
        for i in 1..=linear_count {
            let raw = span + i as f64 * tail_step;
            let bucket = if i == linear_count {
                max
            } else {
                round_up_to_step(raw, step)
            };
            // Tail collisions are dropped, not filled.
            buckets.insert(bucket);
        }
    }

    buckets.into_iter().collect()
}

fn round_up_to_step(value: f64, step: usize) -> usize {
    (value / step as f64).ceil() as usize * step
}
