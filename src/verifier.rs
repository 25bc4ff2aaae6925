//! The five-stage verifier (component F).

use crate::algorithms::{augment, embedding, ncc, orientation, Embedding, NormalizedImage};
use crate::config::MatchConfig;
use crate::template::Template;

/// Total number of TTA rounds: identity + 4 rotations + 4 shifts + 2 brightness.
pub const TTA_TOTAL: i32 = 11;

const TTA_ROTATIONS: [f32; 4] = [-10.0, -5.0, 5.0, 10.0];
const TTA_SHIFTS: [(i32, i32); 4] = [(-2, 0), (2, 0), (0, -2), (0, 2)];
const TTA_BRIGHTNESS: [f32; 2] = [-0.05, 0.05];

/// Result of a [`verify`] call, populated up to the furthest stage reached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerifyResult {
    pub matched: bool,
    pub best_distance: f32,
    pub best_template_idx: i32,
    pub templates_below_threshold: i32,
    pub tta_votes: i32,
    pub tta_total: i32,
    pub best_ncc: f32,
    pub probe_orientation: f32,
    pub min_orientation_diff: f32,
}

impl Default for VerifyResult {
    fn default() -> Self {
        Self {
            matched: false,
            best_distance: f32::MAX,
            best_template_idx: -1,
            templates_below_threshold: 0,
            tta_votes: 0,
            tta_total: TTA_TOTAL,
            best_ncc: 0.0,
            probe_orientation: 0.0,
            min_orientation_diff: f32::MAX,
        }
    }
}

/// Verify a probe image against a set of enrolled templates.
///
/// Stages execute strictly in order; failing any stage returns no-match
/// with the result populated up to that stage. A pure function of its
/// inputs — identical inputs always produce an identical result.
pub fn verify(cfg: &MatchConfig, probe_image: &NormalizedImage, templates: &[Template]) -> VerifyResult {
    let mut result = VerifyResult::default();

    if templates.is_empty() {
        log::warn!("verify: empty template set");
        return result;
    }

    result.probe_orientation = orientation::compute_orientation(probe_image);

    // Stage 1: orientation pre-filter.
    if cfg.use_orientation_check {
        let mut min_diff = f32::MAX;
        for t in templates {
            let diff = orientation::orientation_diff(result.probe_orientation, t.orientation);
            if diff < min_diff {
                min_diff = diff;
            }
        }
        result.min_orientation_diff = min_diff;

        if min_diff > cfg.orientation_threshold {
            log::info!("verify: stage1 reject, min_orientation_diff={min_diff:.1}");
            return result;
        }
    }

    // Stage 2: nearest-neighbor embedding scan.
    let probe_embedding = embedding::compute_embedding(probe_image);
    for (idx, t) in templates.iter().enumerate() {
        let dist = embedding::embedding_distance(&probe_embedding, &t.embedding);

        if dist < result.best_distance {
            result.best_distance = dist;
            result.best_template_idx = idx as i32;
        }
        if dist < cfg.nn_threshold {
            result.templates_below_threshold += 1;
        }
    }

    if result.best_distance >= cfg.nn_threshold {
        log::info!("verify: stage2 reject, best_distance={:.4}", result.best_distance);
        return result;
    }

    // Stage 3: quorum.
    if result.templates_below_threshold < cfg.min_agreeing_templates {
        log::warn!(
            "verify: stage3 reject, templates_below_threshold={}",
            result.templates_below_threshold
        );
        return result;
    }

    // Stage 4: TTA voting.
    if cfg.use_tta {
        result.tta_votes = compute_tta_votes(probe_image, templates, cfg.nn_threshold);

        let ratio = result.tta_votes as f32 / result.tta_total as f32;
        if ratio < cfg.tta_vote_threshold {
            log::info!("verify: stage4 reject, tta_votes={}/{}", result.tta_votes, result.tta_total);
            return result;
        }
    } else {
        result.tta_votes = result.tta_total;
    }

    // Stage 5: pixel NCC.
    if cfg.use_pixel_correlation && result.best_template_idx >= 0 {
        let best = &templates[result.best_template_idx as usize];
        result.best_ncc = ncc::compute_ncc(probe_image, &best.image);

        if result.best_ncc < cfg.pixel_corr_threshold {
            log::info!("verify: stage5 reject, best_ncc={:.4}", result.best_ncc);
            return result;
        }
    } else {
        result.best_ncc = 1.0;
    }

    result.matched = true;
    log::info!(
        "verify: matched, best_distance={:.4}, best_ncc={:.3}, tta={}/{}",
        result.best_distance,
        result.best_ncc,
        result.tta_votes,
        result.tta_total
    );
    result
}

fn any_template_within(
    embedding: &Embedding,
    templates: &[Template],
    threshold: f32,
) -> bool {
    templates
        .iter()
        .any(|t| embedding::embedding_distance(embedding, &t.embedding) < threshold)
}

fn compute_tta_votes(probe_image: &NormalizedImage, templates: &[Template], threshold: f32) -> i32 {
    let mut votes = 0;

    let identity_embedding = embedding::compute_embedding(probe_image);
    let identity_hit = any_template_within(&identity_embedding, templates, threshold);
    log::trace!("verify: tta round identity, hit={identity_hit}");
    if identity_hit {
        votes += 1;
    }

    for &angle in TTA_ROTATIONS.iter() {
        let augmented = augment::rotate_image(probe_image, angle);
        let emb = embedding::compute_embedding(&augmented);
        let hit = any_template_within(&emb, templates, threshold);
        log::trace!("verify: tta round rotate({angle}), hit={hit}");
        if hit {
            votes += 1;
        }
    }

    for &(dx, dy) in TTA_SHIFTS.iter() {
        let augmented = augment::shift_image(probe_image, dx, dy);
        let emb = embedding::compute_embedding(&augmented);
        let hit = any_template_within(&emb, templates, threshold);
        log::trace!("verify: tta round shift({dx}, {dy}), hit={hit}");
        if hit {
            votes += 1;
        }
    }

    for &delta in TTA_BRIGHTNESS.iter() {
        let augmented = augment::adjust_brightness(probe_image, delta);
        let emb = embedding::compute_embedding(&augmented);
        let hit = any_template_within(&emb, templates, threshold);
        log::trace!("verify: tta round brightness({delta}), hit={hit}");
        if hit {
            votes += 1;
        }
    }

    votes
}
