//! Quality gate: five statistical criteria, any failure rejects.

use once_cell::sync::Lazy;

use super::{NormalizedImage, IMAGE_HEIGHT, IMAGE_SIZE, IMAGE_WIDTH};
use crate::error::{FingerprintError, FingerprintResult, QualityCriterion};

const MIN_CONTRAST: f32 = 0.50;
const MIN_VARIANCE: f32 = 0.02;
const MIN_STD: f32 = 0.10;
const MIN_CENTER_RATIO: f32 = 0.15;
const MIN_GABOR: f32 = 0.01;
const MIN_COHERENCE: f32 = 0.0;

const GABOR_NUM_ORIENT: usize = 8;
const GABOR_SIGMA: f32 = 4.0;
const GABOR_WAVELENGTH: f32 = 8.0;
const GABOR_KSIZE: usize = 17;
const GABOR_HALF: usize = GABOR_KSIZE / 2;

struct GaborBank {
    kernels: [[f32; GABOR_KSIZE * GABOR_KSIZE]; GABOR_NUM_ORIENT],
    angles: [f32; GABOR_NUM_ORIENT],
}

/// Process-wide Gabor kernel cache, initialized exactly once on first use.
///
/// `once_cell::sync::Lazy` serializes concurrent first callers the same
/// way the source's `g_once` guard does, even though the matcher is
/// otherwise single-threaded.
static GABOR_BANK: Lazy<GaborBank> = Lazy::new(init_gabor_bank);

fn init_gabor_bank() -> GaborBank {
    let half = GABOR_HALF as i32;
    let freq = 1.0 / GABOR_WAVELENGTH;
    let mut kernels = [[0f32; GABOR_KSIZE * GABOR_KSIZE]; GABOR_NUM_ORIENT];
    let mut angles = [0f32; GABOR_NUM_ORIENT];

    for o in 0..GABOR_NUM_ORIENT {
        let theta = o as f32 * std::f32::consts::PI / GABOR_NUM_ORIENT as f32;
        angles[o] = theta;

        let mut sum_abs = 0f32;
        for ky in -half..=half {
            for kx in -half..=half {
                let x_theta = kx as f32 * theta.cos() + ky as f32 * theta.sin();
                let y_theta = -(kx as f32) * theta.sin() + ky as f32 * theta.cos();
                let gaussian =
                    (-(x_theta * x_theta + y_theta * y_theta) / (2.0 * GABOR_SIGMA * GABOR_SIGMA))
                        .exp();
                let sinusoid = (2.0 * std::f32::consts::PI * freq * x_theta).cos();
                let val = gaussian * sinusoid;
                let idx = (ky + half) as usize * GABOR_KSIZE + (kx + half) as usize;
                kernels[o][idx] = val;
                sum_abs += val.abs();
            }
        }

        for v in kernels[o].iter_mut() {
            *v /= sum_abs + 1e-8;
        }
    }

    log::debug!("quality: initialized {GABOR_NUM_ORIENT} Gabor kernels ({GABOR_KSIZE}x{GABOR_KSIZE})");
    GaborBank { kernels, angles }
}

fn convolve_at(img: &[f32], h: usize, w: usize, y: usize, x: usize, kernel: &[f32]) -> f32 {
    let half = GABOR_HALF as i32;
    let mut sum = 0f32;
    for ky in -half..=half {
        for kx in -half..=half {
            let iy = y as i32 + ky;
            let ix = x as i32 + kx;
            if iy >= 0 && (iy as usize) < h && ix >= 0 && (ix as usize) < w {
                let k_idx = (ky + half) as usize * GABOR_KSIZE + (kx + half) as usize;
                sum += img[iy as usize * w + ix as usize] * kernel[k_idx];
            }
        }
    }
    sum
}

/// Accept or reject a normalized image against the five quality criteria,
/// evaluated in order. Returns the failing criterion on rejection.
pub fn check_quality(image: &NormalizedImage) -> FingerprintResult<()> {
    let h = IMAGE_HEIGHT;
    let w = IMAGE_WIDTH;
    let n = IMAGE_SIZE;

    // 1. Contrast: p98 - p2, using truncated-index order statistics (not
    // the interpolated percentile the decoder uses — preserved from
    // original_source).
    let mut sorted = image.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let p2 = sorted[(0.02 * n as f32) as usize];
    let p98 = sorted[(0.98 * n as f32) as usize];
    let contrast_range = p98 - p2;

    log::debug!("quality: contrast={contrast_range:.3} (min={MIN_CONTRAST:.3})");
    if contrast_range < MIN_CONTRAST {
        log::warn!("quality FAIL: contrast");
        return Err(FingerprintError::quality_rejected(QualityCriterion::Contrast));
    }

    // 2. Variance
    let mean: f32 = image.iter().sum::<f32>() / n as f32;
    let variance: f32 = image.iter().map(|&v| (v - mean) * (v - mean)).sum::<f32>() / n as f32;

    log::debug!("quality: variance={variance:.4} (min={MIN_VARIANCE:.4})");
    if variance < MIN_VARIANCE {
        log::warn!("quality FAIL: variance");
        return Err(FingerprintError::quality_rejected(QualityCriterion::Variance));
    }

    // 3. Centered energy and weighted std
    let cx = w as f32 / 2.0;
    let cy = h as f32 / 2.0;
    let sigma = h.min(w) as f32 / 3.0;
    let range_val = if (p98 - p2) > 1e-8 { p98 - p2 } else { 1.0 };

    let mut total_energy = 0f32;
    let mut weighted_energy = 0f32;
    let mut weighted_sum = 0f32;
    let mut weighted_sq_sum = 0f32;

    for y in 0..h {
        for x in 0..w {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            let weight = (-(dx * dx + dy * dy) / (2.0 * sigma * sigma)).exp();

            let val = image[y * w + x];
            let stretched = ((val - p2) / range_val).clamp(0.0, 1.0);

            total_energy += stretched * stretched;
            let sw = stretched * weight;
            weighted_energy += sw * sw;
            weighted_sum += sw;
            weighted_sq_sum += sw * sw;
        }
    }

    let center_ratio = if total_energy > 1e-8 {
        weighted_energy / total_energy
    } else {
        0.0
    };
    let mean_weighted = weighted_sum / n as f32;
    let var_weighted = (weighted_sq_sum / n as f32) - (mean_weighted * mean_weighted);
    let std_dev = var_weighted.max(0.0).sqrt();

    log::debug!(
        "quality: std={std_dev:.3} (min={MIN_STD:.3}), center_ratio={center_ratio:.3} (min={MIN_CENTER_RATIO:.3})"
    );
    if std_dev < MIN_STD || center_ratio < MIN_CENTER_RATIO {
        log::warn!("quality FAIL: center_energy");
        return Err(FingerprintError::quality_rejected(QualityCriterion::CenterEnergy));
    }

    // 4. Gabor ridge strength
    let bank = &*GABOR_BANK;

    let img_std = variance.sqrt();
    let mut img_norm = [0f32; IMAGE_SIZE];
    for (o, &v) in img_norm.iter_mut().zip(image.iter()) {
        *o = (v - mean) / (img_std + 1e-8);
    }

    let mut orientation_map = vec![0f32; IMAGE_SIZE];
    let mut gabor_sum = 0f32;
    let mut gabor_count = 0usize;

    for y in GABOR_HALF..h - GABOR_HALF {
        for x in GABOR_HALF..w - GABOR_HALF {
            let mut max_resp = 0f32;
            let mut max_orient = 0usize;
            for o in 0..GABOR_NUM_ORIENT {
                let resp = convolve_at(&img_norm, h, w, y, x, &bank.kernels[o]).abs();
                if resp > max_resp {
                    max_resp = resp;
                    max_orient = o;
                }
            }
            gabor_sum += max_resp;
            gabor_count += 1;
            orientation_map[y * w + x] = bank.angles[max_orient];
        }
    }

    let gabor_strength = if gabor_count > 0 {
        gabor_sum / gabor_count as f32
    } else {
        0.0
    };

    log::debug!("quality: gabor={gabor_strength:.4} (min={MIN_GABOR:.4})");
    if gabor_strength < MIN_GABOR {
        log::warn!("quality FAIL: gabor_strength");
        return Err(FingerprintError::quality_rejected(QualityCriterion::GaborStrength));
    }

    // 5. Block-orientation coherence
    let block_size = 8usize;
    let mut coherence_sum = 0f32;
    let mut coherence_count = 0usize;

    let lo = block_size + GABOR_HALF;
    let mut by = lo;
    while by < h.saturating_sub(block_size + GABOR_HALF) {
        let mut bx = lo;
        while bx < w.saturating_sub(block_size + GABOR_HALF) {
            let center_orient = orientation_map[by * w + bx];
            let neighbors = [
                (by as i32 - block_size as i32, bx as i32),
                (by as i32 + block_size as i32, bx as i32),
                (by as i32, bx as i32 - block_size as i32),
                (by as i32, bx as i32 + block_size as i32),
            ];

            let mut local_coh = 0f32;
            let mut n_count = 0usize;
            for (ny, nx) in neighbors {
                if ny >= GABOR_HALF as i32
                    && (ny as usize) < h - GABOR_HALF
                    && nx >= GABOR_HALF as i32
                    && (nx as usize) < w - GABOR_HALF
                {
                    let neighbor_orient = orientation_map[ny as usize * w + nx as usize];
                    local_coh += (2.0 * (center_orient - neighbor_orient)).cos();
                    n_count += 1;
                }
            }

            if n_count > 0 {
                coherence_sum += local_coh / n_count as f32;
                coherence_count += 1;
            }

            bx += block_size;
        }
        by += block_size;
    }

    let orient_coherence = if coherence_count > 0 {
        coherence_sum / coherence_count as f32
    } else {
        0.0
    };

    log::debug!("quality: coherence={orient_coherence:.3} (min={MIN_COHERENCE:.3})");
    if orient_coherence < MIN_COHERENCE {
        log::warn!("quality FAIL: coherence");
        return Err(FingerprintError::quality_rejected(QualityCriterion::Coherence));
    }

    log::debug!("quality PASS");
    Ok(())
}
