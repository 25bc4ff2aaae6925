//! Network weights: the process-wide immutable data blob the embedding
//! network reads by symbol.
//!
//! Spec treats the trained weights as an external collaborator this crate
//! does not own (see spec.md §6, "Weights blob"). This corpus carries no
//! trained model, so [`WEIGHTS`] is populated once, at first access, from
//! a fixed-seed deterministic generator — shapes and lifetime match the
//! real contract (loaded once, never reloaded, never mutated) without
//! claiming any biometric accuracy.

use once_cell::sync::Lazy;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// A fixed-seed deterministic stand-in for the trained weights blob.
const WEIGHTS_SEED: u64 = 0x4654_3936_32; // "FT962" read as hex digits

pub struct ConvLayer {
    /// `[out_channels, in_channels, 3, 3]`, row-major.
    pub weight: Vec<f32>,
    /// `[out_channels]`.
    pub bias: Vec<f32>,
    pub in_channels: usize,
    pub out_channels: usize,
}

pub struct FcLayer {
    /// `[out_features, in_features]`, row-major.
    pub weight: Vec<f32>,
    /// `[out_features]`.
    pub bias: Vec<f32>,
    pub in_features: usize,
    pub out_features: usize,
}

pub struct NetworkWeights {
    pub conv1: ConvLayer,
    pub conv2: ConvLayer,
    pub conv3: ConvLayer,
    pub conv4: ConvLayer,
    pub fc1: FcLayer,
    pub fc2: FcLayer,
}

fn conv_layer(rng: &mut ChaCha8Rng, in_channels: usize, out_channels: usize) -> ConvLayer {
    let fan_in = (in_channels * 9) as f32;
    let scale = (2.0 / fan_in).sqrt();
    let weight = (0..out_channels * in_channels * 9)
        .map(|_| (rng.gen::<f32>() * 2.0 - 1.0) * scale)
        .collect();
    let bias = vec![0f32; out_channels];
    ConvLayer {
        weight,
        bias,
        in_channels,
        out_channels,
    }
}

fn fc_layer(rng: &mut ChaCha8Rng, in_features: usize, out_features: usize) -> FcLayer {
    let scale = (2.0 / in_features as f32).sqrt();
    let weight = (0..out_features * in_features)
        .map(|_| (rng.gen::<f32>() * 2.0 - 1.0) * scale)
        .collect();
    let bias = vec![0f32; out_features];
    FcLayer {
        weight,
        bias,
        in_features,
        out_features,
    }
}

fn init_weights() -> NetworkWeights {
    let mut rng = ChaCha8Rng::seed_from_u64(WEIGHTS_SEED);
    log::info!("weights: generating deterministic placeholder network weights");
    NetworkWeights {
        conv1: conv_layer(&mut rng, 1, 16),
        conv2: conv_layer(&mut rng, 16, 32),
        conv3: conv_layer(&mut rng, 32, 64),
        conv4: conv_layer(&mut rng, 64, 128),
        fc1: fc_layer(&mut rng, 1024, 256),
        fc2: fc_layer(&mut rng, 256, 64),
    }
}

/// Loaded once, at first access; process lifetime; never mutated after.
pub static WEIGHTS: Lazy<NetworkWeights> = Lazy::new(init_weights);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shapes_match_spec() {
        let w = &*WEIGHTS;
        assert_eq!(w.conv1.weight.len(), 16 * 1 * 9);
        assert_eq!(w.conv2.weight.len(), 32 * 16 * 9);
        assert_eq!(w.conv3.weight.len(), 64 * 32 * 9);
        assert_eq!(w.conv4.weight.len(), 128 * 64 * 9);
        assert_eq!(w.fc1.weight.len(), 256 * 1024);
        assert_eq!(w.fc2.weight.len(), 64 * 256);
    }

    #[test]
    fn generation_is_deterministic() {
        let mut rng_a = ChaCha8Rng::seed_from_u64(WEIGHTS_SEED);
        let mut rng_b = ChaCha8Rng::seed_from_u64(WEIGHTS_SEED);
        let a: f32 = rng_a.gen();
        let b: f32 = rng_b.gen();
        assert_eq!(a, b);
    }
}
