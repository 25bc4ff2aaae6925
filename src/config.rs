//! Configuration types for the verifier

use serde::{Deserialize, Serialize};

/// Thresholds and feature toggles for [`crate::verifier::verify`].
///
/// Construct with [`MatchConfig::default`] and tweak fields before the
/// first verify call; there is no live reconfiguration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Maximum embedding distance for a template to count as a nearest-neighbor hit.
    pub nn_threshold: f32,

    /// Maximum allowed orientation difference (degrees) between probe and closest template.
    pub orientation_threshold: f32,

    /// Minimum pixel-level normalized cross-correlation against the best template's image.
    pub pixel_corr_threshold: f32,

    /// Minimum fraction of TTA rounds (out of 11) that must find a matching template.
    pub tta_vote_threshold: f32,

    /// Minimum number of enrolled templates that must be within `nn_threshold`.
    pub min_agreeing_templates: i32,

    /// Stage 1: reject probes whose dominant ridge orientation disagrees with every template.
    pub use_orientation_check: bool,

    /// Stage 4: require agreement across rotation/shift/brightness augmentations.
    pub use_tta: bool,

    /// Stage 5: require pixel-level correlation against the best template's stored image.
    pub use_pixel_correlation: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            nn_threshold: 0.20,
            orientation_threshold: 35.0,
            pixel_corr_threshold: 0.01,
            tta_vote_threshold: 0.75,
            min_agreeing_templates: 3,
            use_orientation_check: true,
            use_tta: true,
            use_pixel_correlation: true,
        }
    }
}
