//! The embedding network: 4 conv+pool stages, 2 FC layers, L2 norm.
//!
//! Fixed topology, pure floating point, deterministic (bit-identical
//! across runs for a given target — no nondeterministic reductions).

use super::{Embedding, NormalizedImage, EMBEDDING_DIM, IMAGE_HEIGHT, IMAGE_WIDTH};
use crate::weights::{ConvLayer, FcLayer, WEIGHTS};

fn relu(x: f32) -> f32 {
    x.max(0.0)
}

/// 3x3 conv, stride 1, padding 1, ReLU, then 2x2 stride-2 max pool.
///
/// The pool uses truncating integer division of the pre-pool size; any
/// odd remainder is dropped (never occurs at this topology's sizes).
fn conv_relu_pool(input: &[f32], in_h: usize, in_w: usize, layer: &ConvLayer) -> (Vec<f32>, usize, usize) {
    let in_ch = layer.in_channels;
    let out_ch = layer.out_channels;
    let conv_h = in_h;
    let conv_w = in_w;

    let mut conv_out = vec![0f32; out_ch * conv_h * conv_w];
    for oc in 0..out_ch {
        for oh in 0..conv_h {
            for ow in 0..conv_w {
                let mut sum = layer.bias[oc];
                for ic in 0..in_ch {
                    for kh in 0..3usize {
                        for kw in 0..3usize {
                            let ih = oh as i32 + kh as i32 - 1;
                            let iw = ow as i32 + kw as i32 - 1;
                            if ih >= 0 && (ih as usize) < in_h && iw >= 0 && (iw as usize) < in_w {
                                let in_idx = ic * in_h * in_w + ih as usize * in_w + iw as usize;
                                let w_idx = oc * in_ch * 9 + ic * 9 + kh * 3 + kw;
                                sum += input[in_idx] * layer.weight[w_idx];
                            }
                        }
                    }
                }
                conv_out[oc * conv_h * conv_w + oh * conv_w + ow] = relu(sum);
            }
        }
    }

    let out_h = conv_h / 2;
    let out_w = conv_w / 2;
    let mut out = vec![0f32; out_ch * out_h * out_w];
    for oc in 0..out_ch {
        for oh in 0..out_h {
            for ow in 0..out_w {
                let mut max_val = f32::NEG_INFINITY;
                for kh in 0..2usize {
                    for kw in 0..2usize {
                        let ih = oh * 2 + kh;
                        let iw = ow * 2 + kw;
                        if ih < conv_h && iw < conv_w {
                            let val = conv_out[oc * conv_h * conv_w + ih * conv_w + iw];
                            if val > max_val {
                                max_val = val;
                            }
                        }
                    }
                }
                out[oc * out_h * out_w + oh * out_w + ow] = max_val;
            }
        }
    }

    (out, out_h, out_w)
}

fn fc_relu(input: &[f32], layer: &FcLayer) -> Vec<f32> {
    (0..layer.out_features)
        .map(|o| {
            let mut sum = layer.bias[o];
            for i in 0..layer.in_features {
                sum += input[i] * layer.weight[o * layer.in_features + i];
            }
            relu(sum)
        })
        .collect()
}

fn fc(input: &[f32], layer: &FcLayer) -> Vec<f32> {
    (0..layer.out_features)
        .map(|o| {
            let mut sum = layer.bias[o];
            for i in 0..layer.in_features {
                sum += input[i] * layer.weight[o * layer.in_features + i];
            }
            sum
        })
        .collect()
}

fn l2_normalize(vec: &mut [f32]) {
    let norm = (vec.iter().map(|v| v * v).sum::<f32>() + 1e-8).sqrt();
    for v in vec.iter_mut() {
        *v /= norm;
    }
}

/// Deterministic forward pass producing a 64-D L2-normalized embedding.
pub fn compute_embedding(image: &NormalizedImage) -> Embedding {
    let w = &*WEIGHTS;

    let (buf1, h1, w1) = conv_relu_pool(image, IMAGE_HEIGHT, IMAGE_WIDTH, &w.conv1);
    let (buf2, h2, w2) = conv_relu_pool(&buf1, h1, w1, &w.conv2);
    let (buf3, h3, w3) = conv_relu_pool(&buf2, h2, w2, &w.conv3);
    let (buf4, _h4, _w4) = conv_relu_pool(&buf3, h3, w3, &w.conv4);

    let fc1_out = fc_relu(&buf4, &w.fc1);
    let mut fc2_out = fc(&fc1_out, &w.fc2);

    l2_normalize(&mut fc2_out);

    let mut embedding = [0f32; EMBEDDING_DIM];
    embedding.copy_from_slice(&fc2_out);
    embedding
}

/// Plain Euclidean distance between two embeddings.
pub fn embedding_distance(a: &Embedding, b: &Embedding) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::IMAGE_SIZE;

    fn sample_image(seed: u32) -> NormalizedImage {
        let mut image = [0f32; IMAGE_SIZE];
        for (i, v) in image.iter_mut().enumerate() {
            *v = (((i as u32).wrapping_mul(2654435761).wrapping_add(seed) % 1000) as f32) / 1000.0;
        }
        image
    }

    #[test]
    fn embedding_has_unit_norm() {
        let image = sample_image(1);
        let emb = compute_embedding(&image);
        let norm = (emb.iter().map(|v| v * v).sum::<f32>()).sqrt();
        assert!((norm - 1.0).abs() < 1e-3, "norm={norm}");
    }

    #[test]
    fn self_distance_is_zero() {
        let image = sample_image(2);
        let emb = compute_embedding(&image);
        assert_eq!(embedding_distance(&emb, &emb), 0.0);
    }

    #[test]
    fn distance_is_bounded() {
        let a = compute_embedding(&sample_image(3));
        let b = compute_embedding(&sample_image(4));
        let d = embedding_distance(&a, &b);
        assert!((0.0..=2.0).contains(&d), "distance={d}");
    }

    #[test]
    fn forward_pass_is_deterministic() {
        let image = sample_image(5);
        let a = compute_embedding(&image);
        let b = compute_embedding(&image);
        assert_eq!(a, b);
    }
}
