//! Pixel-level normalized cross-correlation between two normalized images.

use super::{NormalizedImage, IMAGE_SIZE};

/// Normalized cross-correlation in `[-1, 1]`: mean-subtract, divide by
/// per-image std (stabilized with `+1e-8` before the sqrt), correlate.
pub fn compute_ncc(img1: &NormalizedImage, img2: &NormalizedImage) -> f32 {
    let mean1 = img1.iter().sum::<f32>() / IMAGE_SIZE as f32;
    let mean2 = img2.iter().sum::<f32>() / IMAGE_SIZE as f32;

    let mut std1 = 0f32;
    let mut std2 = 0f32;
    let mut corr = 0f32;

    for i in 0..IMAGE_SIZE {
        let d1 = img1[i] - mean1;
        let d2 = img2[i] - mean2;
        std1 += d1 * d1;
        std2 += d2 * d2;
        corr += d1 * d2;
    }

    std1 = (std1 / IMAGE_SIZE as f32 + 1e-8).sqrt();
    std2 = (std2 / IMAGE_SIZE as f32 + 1e-8).sqrt();

    corr / (IMAGE_SIZE as f32 * std1 * std2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_images_correlate_near_one() {
        let mut image = [0f32; IMAGE_SIZE];
        for (i, v) in image.iter_mut().enumerate() {
            *v = ((i % 7) as f32) / 7.0;
        }
        let ncc = compute_ncc(&image, &image);
        assert!(ncc > 0.99, "ncc={ncc}");
    }

    #[test]
    fn inverted_images_correlate_near_minus_one() {
        let mut image = [0f32; IMAGE_SIZE];
        for (i, v) in image.iter_mut().enumerate() {
            *v = ((i % 7) as f32) / 7.0;
        }
        let mut inverted = [0f32; IMAGE_SIZE];
        for (o, &v) in inverted.iter_mut().zip(image.iter()) {
            *o = 1.0 - v;
        }
        let ncc = compute_ncc(&image, &inverted);
        assert!(ncc < -0.99, "ncc={ncc}");
    }
}
