// Copyright 2026 The av1e-core Authors
// Use of this source code is governed by a BSD-3-Clause license that can be
// found in the LICENSE file.

//! Picture Analysis (§2 stage 2): computes per-frame statistics (variance,
//! histograms, noise estimates) and downsamples luma to 1/4 and 1/16,
//! populating a [`PictureAnalysisReferenceObject`].

use crate::data_model::reference::{DownscaledLuma, PictureAnalysisReferenceObject};

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PictureStatistics {
    pub luma_mean: f64,
    pub luma_variance: f64,
    /// 256-bucket luma histogram, used by TPL and rate-control lookahead.
    pub histogram_entropy: f64,
    /// High-frequency energy estimate used as a proxy for sensor noise.
    pub noise_estimate: f64,
}

/// Nearest-neighbour box-filter downscale by `factor` (2 for 1/4 area, 4
/// for 1/16 area of the linear dimension — i.e. applied twice cascades to
/// 1/16). Uses simple averaging rather than the real 7-tap decimation
/// filter, which is a SIMD kernel out of scope (§1).
fn downscale(luma: &[u8], width: u32, height: u32, factor: u32) -> DownscaledLuma {
    let out_width = width.div_ceil(factor).max(1);
    let out_height = height.div_ceil(factor).max(1);
    let mut samples = vec![0u8; (out_width * out_height) as usize];

    for out_y in 0..out_height {
        for out_x in 0..out_width {
            let mut sum = 0u32;
            let mut count = 0u32;
            for dy in 0..factor {
                let y = out_y * factor + dy;
                if y >= height {
                    continue;
                }
                for dx in 0..factor {
                    let x = out_x * factor + dx;
                    if x >= width {
                        continue;
                    }
                    sum += luma[(y * width + x) as usize] as u32;
                    count += 1;
                }
            }
            samples[(out_y * out_width + out_x) as usize] = (sum / count.max(1)) as u8;
        }
    }

    DownscaledLuma { width: out_width, height: out_height, samples }
}

/// Computes mean/variance/histogram-entropy/noise statistics over a
/// single full-resolution luma plane.
pub fn analyze(luma: &[u8]) -> PictureStatistics {
    if luma.is_empty() {
        return PictureStatistics::default();
    }

    let sum: u64 = luma.iter().map(|&v| v as u64).sum();
    let mean = sum as f64 / luma.len() as f64;

    let variance = luma.iter().map(|&v| (v as f64 - mean).powi(2)).sum::<f64>() / luma.len() as f64;

    let mut histogram = [0u32; 256];
    for &v in luma {
        histogram[v as usize] += 1;
    }
    let total = luma.len() as f64;
    let histogram_entropy = histogram
        .iter()
        .filter(|&&count| count > 0)
        .map(|&count| {
            let p = count as f64 / total;
            -p * p.log2()
        })
        .sum::<f64>();

    let noise_estimate = luma
        .windows(2)
        .map(|pair| (pair[1] as f64 - pair[0] as f64).abs())
        .sum::<f64>()
        / luma.len().saturating_sub(1).max(1) as f64;

    PictureStatistics { luma_mean: mean, luma_variance: variance, histogram_entropy, noise_estimate }
}

/// Builds the PA reference object for one picture: padded luma is assumed
/// already produced upstream (padding is a buffer-layout detail, §1
/// Non-goals), so this only derives the 1/4 and 1/16 downscales from it.
pub fn build_pa_reference(
    picture_number: u64,
    padded_luma: Vec<u8>,
    padded_width: u32,
    padded_height: u32,
) -> PictureAnalysisReferenceObject {
    let luma_quarter = downscale(&padded_luma, padded_width, padded_height, 2);
    let luma_sixteenth = downscale(&padded_luma, padded_width, padded_height, 4);

    PictureAnalysisReferenceObject {
        picture_number,
        padded_luma,
        padded_width,
        padded_height,
        luma_quarter,
        luma_sixteenth,
        ref_count: Default::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_plane_has_zero_variance_and_zero_entropy() {
        let luma = vec![128u8; 64];
        let stats = analyze(&luma);
        assert_eq!(stats.luma_mean, 128.0);
        assert_eq!(stats.luma_variance, 0.0);
        assert_eq!(stats.histogram_entropy, 0.0);
    }

    #[test]
    fn noisy_plane_has_positive_noise_estimate() {
        let luma: Vec<u8> = (0..64).map(|i| if i % 2 == 0 { 0 } else { 255 }).collect();
        let stats = analyze(&luma);
        assert!(stats.noise_estimate > 0.0);
    }

    #[test]
    fn downscale_by_4_quarters_linear_dimensions_twice() {
        let luma = vec![10u8; 16 * 16];
        let pa = build_pa_reference(1, luma, 16, 16);
        assert_eq!((pa.luma_quarter.width, pa.luma_quarter.height), (8, 8));
        assert_eq!((pa.luma_sixteenth.width, pa.luma_sixteenth.height), (4, 4));
    }

    #[test]
    fn downscale_rounds_up_on_non_multiple_dimensions() {
        let luma = vec![5u8; 9 * 5];
        let pa = build_pa_reference(1, luma, 9, 5);
        assert_eq!((pa.luma_quarter.width, pa.luma_quarter.height), (5, 3));
    }
}
