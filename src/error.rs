//! Error types for the fpmatch-core library

use thiserror::Error;

/// Which of the five quality criteria rejected an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityCriterion {
    Contrast,
    Variance,
    CenterEnergy,
    GaborStrength,
    Coherence,
}

impl std::fmt::Display for QualityCriterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            QualityCriterion::Contrast => "contrast",
            QualityCriterion::Variance => "variance",
            QualityCriterion::CenterEnergy => "center_energy",
            QualityCriterion::GaborStrength => "gabor_strength",
            QualityCriterion::Coherence => "coherence",
        };
        f.write_str(name)
    }
}

/// Main error type for matching operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FingerprintError {
    #[error("image failed quality gate: {criterion}")]
    QualityRejected { criterion: QualityCriterion },

    #[error("codec buffer too short: need {needed} bytes, got {got}")]
    CodecShortBuffer { needed: usize, got: usize },

    #[error("codec magic mismatch: expected {expected:#010x}, got {got:#010x}")]
    CodecBadMagic { expected: u32, got: u32 },

    #[error("codec version mismatch: expected {expected}, got {got}")]
    CodecBadVersion { expected: u32, got: u32 },

    #[error("codec template_size mismatch: expected {expected}, got {got}")]
    CodecSizeMismatch { expected: u32, got: u32 },
}

impl FingerprintError {
    pub fn quality_rejected(criterion: QualityCriterion) -> Self {
        Self::QualityRejected { criterion }
    }

    pub fn codec_short_buffer(needed: usize, got: usize) -> Self {
        Self::CodecShortBuffer { needed, got }
    }

    pub fn codec_bad_magic(expected: u32, got: u32) -> Self {
        Self::CodecBadMagic { expected, got }
    }

    pub fn codec_bad_version(expected: u32, got: u32) -> Self {
        Self::CodecBadVersion { expected, got }
    }

    pub fn codec_size_mismatch(expected: u32, got: u32) -> Self {
        Self::CodecSizeMismatch { expected, got }
    }
}

/// Result type alias for convenience
pub type FingerprintResult<T> = Result<T, FingerprintError>;
