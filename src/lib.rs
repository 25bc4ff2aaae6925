//! # fpmatch-core
//!
//! Fingerprint matching core for FocalTech FT9362-class optical/capacitive
//! sensors (USB vendor 0x2808, product 0x0752). Turns a raw sensor frame
//! into a compact, orientation-aware biometric template and decides,
//! given a probe frame and a set of enrolled templates, whether the probe
//! matches with high confidence.
//!
//! Out of scope: USB transport and capture state machine, the host
//! fingerprint daemon's enroll/verify/identify action model, debug-image
//! dumping, and sourcing real trained network weights (see
//! [`weights`] for the deterministic placeholder this crate ships instead).

pub mod algorithms;
pub mod codec;
pub mod config;
pub mod error;
pub mod template;
pub mod verifier;
pub mod weights;

pub use algorithms::{Embedding, NormalizedImage, EMBEDDING_DIM, IMAGE_HEIGHT, IMAGE_SIZE, IMAGE_WIDTH};
pub use codec::{decode_templates, encode_templates};
pub use config::MatchConfig;
pub use error::{FingerprintError, FingerprintResult, QualityCriterion};
pub use template::{build_template, Template};
pub use verifier::{verify, VerifyResult, TTA_TOTAL};

/// Decode a raw USB sensor frame into a normalized image.
///
/// # Panics
/// Panics if `raw.len() < algorithms::RAW_FRAME_MIN_LEN`.
pub fn decode_raw(raw: &[u8]) -> NormalizedImage {
    algorithms::decode::decode_raw(raw)
}

/// Accept or reject a normalized image against the five quality criteria.
pub fn check_quality(image: &NormalizedImage) -> bool {
    algorithms::quality::check_quality(image).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_api_surface_is_reachable() {
        let cfg = MatchConfig::default();
        let result = verify(&cfg, &[0f32; IMAGE_SIZE], &[]);
        assert!(!result.matched);
    }
}
