// Copyright 2026 The av1e-core Authors
// Use of this source code is governed by a BSD-3-Clause license that can be
// found in the LICENSE file.

//! Initial Rate Control (§2 stage 5): look-ahead statistics aggregation
//! consumed by the (out-of-scope, §1) rate-control update loop and by
//! Source-Based Operations/TPL.

use crate::pipeline::stages::picture_analysis::PictureStatistics;

/// Rolling look-ahead aggregate over the configured window of upcoming
/// pictures' [`PictureStatistics`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LookaheadAggregate {
    pub mean_variance: f64,
    pub mean_noise: f64,
    pub peak_variance: f64,
    pub frame_count: usize,
}

/// Folds one more picture's statistics into the running aggregate. Uses a
/// streaming mean so the aggregate never needs to retain the underlying
/// per-picture samples (only the running sums are state, §3's "pools are
/// non-empty at steady state" bounds apply to PA statistics the same way).
pub fn accumulate(aggregate: &mut LookaheadAggregate, stats: &PictureStatistics) {
    let n = aggregate.frame_count as f64;
    aggregate.mean_variance = (aggregate.mean_variance * n + stats.luma_variance) / (n + 1.0);
    aggregate.mean_noise = (aggregate.mean_noise * n + stats.noise_estimate) / (n + 1.0);
    aggregate.peak_variance = aggregate.peak_variance.max(stats.luma_variance);
    aggregate.frame_count += 1;
}

/// A coarse quantizer-index adjustment suggestion derived from how far the
/// look-ahead window's mean variance sits from a baseline complexity,
/// positive values meaning "this region is more complex than average,
/// spend more bits." The real rate-control update loop (out of scope, §1)
/// consumes this as one of several inputs.
pub fn complexity_bias(aggregate: &LookaheadAggregate, baseline_variance: f64) -> f64 {
    if baseline_variance <= 0.0 {
        return 0.0;
    }
    ((aggregate.mean_variance - baseline_variance) / baseline_variance).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(variance: f64, noise: f64) -> PictureStatistics {
        PictureStatistics { luma_mean: 0.0, luma_variance: variance, histogram_entropy: 0.0, noise_estimate: noise }
    }

    #[test]
    fn accumulate_tracks_running_mean_and_peak() {
        let mut aggregate = LookaheadAggregate::default();
        accumulate(&mut aggregate, &stats(10.0, 1.0));
        accumulate(&mut aggregate, &stats(30.0, 3.0));
        assert_eq!(aggregate.mean_variance, 20.0);
        assert_eq!(aggregate.peak_variance, 30.0);
        assert_eq!(aggregate.frame_count, 2);
    }

    #[test]
    fn complexity_bias_is_zero_at_baseline() {
        let mut aggregate = LookaheadAggregate::default();
        accumulate(&mut aggregate, &stats(50.0, 0.0));
        assert_eq!(complexity_bias(&aggregate, 50.0), 0.0);
    }

    #[test]
    fn complexity_bias_clamps_to_unit_range() {
        let mut aggregate = LookaheadAggregate::default();
        accumulate(&mut aggregate, &stats(1000.0, 0.0));
        assert_eq!(complexity_bias(&aggregate, 10.0), 1.0);
    }
}
