//! Dominant ridge orientation via the Sobel structure tensor.

use super::{NormalizedImage, IMAGE_HEIGHT, IMAGE_WIDTH};

/// Dominant ridge orientation in degrees, on a 180°-periodic axis.
///
/// Computed from the interior Sobel gradients via the structure tensor:
/// `0.5 * atan2(2*Σgx·gy, Σgx² − Σgy²)`.
pub fn compute_orientation(image: &NormalizedImage) -> f32 {
    let mut sum_gxx = 0f32;
    let mut sum_gyy = 0f32;
    let mut sum_gxy = 0f32;

    for y in 1..IMAGE_HEIGHT - 1 {
        for x in 1..IMAGE_WIDTH - 1 {
            let p = |yy: usize, xx: usize| image[yy * IMAGE_WIDTH + xx];

            let gx = -p(y - 1, x - 1) + p(y - 1, x + 1) - 2.0 * p(y, x - 1) + 2.0 * p(y, x + 1)
                - p(y + 1, x - 1)
                + p(y + 1, x + 1);
            let gy = -p(y - 1, x - 1) - 2.0 * p(y - 1, x) - p(y - 1, x + 1) + p(y + 1, x - 1)
                + 2.0 * p(y + 1, x)
                + p(y + 1, x + 1);

            sum_gxx += gx * gx;
            sum_gyy += gy * gy;
            sum_gxy += gx * gy;
        }
    }

    let angle_rad = 0.5 * (2.0 * sum_gxy).atan2(sum_gxx - sum_gyy);
    angle_rad.to_degrees()
}

/// 180°-periodic difference between two orientation angles, result in `[0, 90]`.
pub fn orientation_diff(angle1: f32, angle2: f32) -> f32 {
    let diff = (angle1 - angle2).abs() % 180.0;
    if diff > 90.0 {
        180.0 - diff
    } else {
        diff
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::IMAGE_SIZE;

    #[test]
    fn diff_is_periodic_and_bounded() {
        for k in -3..=3 {
            let d = orientation_diff(10.0, 10.0 + 180.0 * k as f32);
            assert!(d < 1e-3, "expected ~0, got {d}");
        }
        for a in [-200.0f32, -10.0, 0.0, 45.0, 90.0, 170.0, 400.0] {
            for b in [-50.0f32, 0.0, 20.0, 89.0, 200.0] {
                let d = orientation_diff(a, b);
                assert!((0.0..=90.0).contains(&d), "diff out of range: {d}");
            }
        }
    }

    #[test]
    fn diff_is_symmetric() {
        assert_eq!(orientation_diff(10.0, 60.0), orientation_diff(60.0, 10.0));
    }

    #[test]
    fn uniform_image_has_well_defined_orientation() {
        let image = [0.5f32; IMAGE_SIZE];
        let angle = compute_orientation(&image);
        assert!(angle.is_finite());
    }

    #[test]
    fn vertical_ridges_orient_near_zero_or_ninety() {
        let mut image = [0f32; IMAGE_SIZE];
        for y in 0..IMAGE_HEIGHT {
            for x in 0..IMAGE_WIDTH {
                image[y * IMAGE_WIDTH + x] = if x % 4 < 2 { 1.0 } else { 0.0 };
            }
        }
        let angle = compute_orientation(&image);
        let to_zero = orientation_diff(angle, 0.0);
        let to_ninety = orientation_diff(angle, 90.0);
        assert!(to_zero < 5.0 || to_ninety < 5.0, "angle={angle}");
    }
}
