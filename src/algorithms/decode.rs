//! Raw frame decoding: extract, median-filter, percentile-stretch, invert.

use super::{
    NormalizedImage, IMAGE_HEIGHT, IMAGE_SIZE, IMAGE_WIDTH, RAW_HEADER_BYTES,
    RAW_IMAGE_OFFSET_SAMPLES,
};

/// Decode a raw USB sensor frame into a normalized image.
///
/// `raw` must be at least [`super::RAW_FRAME_MIN_LEN`] bytes; this is a
/// precondition, not a checked error — the decoder never fails given a
/// buffer of sufficient length.
///
/// # Panics
/// Panics if `raw.len() < super::RAW_FRAME_MIN_LEN`.
pub fn decode_raw(raw: &[u8]) -> NormalizedImage {
    assert!(
        raw.len() >= super::RAW_FRAME_MIN_LEN,
        "raw frame too short: need {} bytes, got {}",
        super::RAW_FRAME_MIN_LEN,
        raw.len()
    );

    let mut temp = [0f32; IMAGE_SIZE];
    let pixel_base = RAW_HEADER_BYTES + RAW_IMAGE_OFFSET_SAMPLES * 2;
    for (i, slot) in temp.iter_mut().enumerate() {
        let off = pixel_base + i * 2;
        let raw_pixel = i16::from_le_bytes([raw[off], raw[off + 1]]);
        *slot = raw_pixel as f32;
    }

    let filtered = median_filter_3x3(&temp);

    let p5 = percentile(&filtered, 5.0);
    let p95 = percentile(&filtered, 95.0);
    let range = p95 - p5 + 1e-8;

    let mut out = [0f32; IMAGE_SIZE];
    for (o, &f) in out.iter_mut().zip(filtered.iter()) {
        let v = ((f - p5) / range).clamp(0.0, 1.0);
        *o = 1.0 - v;
    }

    log::debug!(
        "decode_raw: p5={p5:.3} p95={p95:.3} range={range:.3}"
    );

    out
}

/// Clamp-to-edge, centered 3x3 median filter over a 76x40 image.
fn median_filter_3x3(input: &NormalizedImage) -> NormalizedImage {
    let mut out = [0f32; IMAGE_SIZE];
    let mut window = [0f32; 9];

    for y in 0..IMAGE_HEIGHT as i32 {
        for x in 0..IMAGE_WIDTH as i32 {
            let mut count = 0usize;
            for dy in -1..=1 {
                for dx in -1..=1 {
                    let ny = y + dy;
                    let nx = x + dx;
                    if ny >= 0 && ny < IMAGE_HEIGHT as i32 && nx >= 0 && nx < IMAGE_WIDTH as i32 {
                        window[count] = input[ny as usize * IMAGE_WIDTH + nx as usize];
                        count += 1;
                    }
                }
            }
            let slice = &mut window[..count];
            slice.sort_by(|a, b| a.partial_cmp(b).unwrap());
            out[y as usize * IMAGE_WIDTH + x as usize] = slice[count / 2];
        }
    }

    out
}

/// Percentile via linear interpolation between order statistics.
///
/// `idx = p * (N-1) / 100`, result = `a[floor(idx)]*(1-f) + a[ceil(idx)]*f`.
pub(crate) fn percentile(values: &[f32], p: f32) -> f32 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    let idx = p / 100.0 * (n - 1) as f32;
    let lo = idx.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let frac = idx - lo as f32;
    sorted[lo] * (1.0 - frac) + sorted[hi] * frac
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synthetic_raw_frame(pixel_value: i16) -> Vec<u8> {
        let mut buf = vec![0u8; super::super::RAW_FRAME_MIN_LEN];
        let pixel_base = RAW_HEADER_BYTES + RAW_IMAGE_OFFSET_SAMPLES * 2;
        for i in 0..IMAGE_SIZE {
            let off = pixel_base + i * 2;
            let bytes = pixel_value.to_le_bytes();
            buf[off] = bytes[0];
            buf[off + 1] = bytes[1];
        }
        buf
    }

    #[test]
    fn output_always_in_unit_range() {
        let raw = synthetic_raw_frame(1234);
        let img = decode_raw(&raw);
        for &v in img.iter() {
            assert!((0.0..=1.0).contains(&v), "pixel out of range: {v}");
        }
    }

    #[test]
    #[should_panic]
    fn rejects_short_buffers() {
        let short = vec![0u8; super::super::RAW_FRAME_MIN_LEN - 1];
        let _ = decode_raw(&short);
    }

    #[test]
    fn percentile_interpolates_between_order_statistics() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile(&values, 0.0), 1.0);
        assert_eq!(percentile(&values, 100.0), 5.0);
        assert_eq!(percentile(&values, 50.0), 3.0);
    }

    #[test]
    fn median_filter_preserves_constant_image() {
        let constant = [0.5f32; IMAGE_SIZE];
        let filtered = median_filter_3x3(&constant);
        assert!(filtered.iter().all(|&v| (v - 0.5).abs() < 1e-6));
    }
}
