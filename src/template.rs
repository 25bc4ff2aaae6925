//! Template record and builder (component E).

use crate::algorithms::{embedding, orientation, quality, Embedding, NormalizedImage};
use crate::error::FingerprintResult;

/// A fully populated template: embedding, stored image, and orientation.
///
/// Built only when [`check_quality`](crate::algorithms::quality::check_quality)
/// accepts the source image — `embedding` is always the output of the
/// embedding network applied to `image`, and `orientation` is always the
/// output of the orientation estimator applied to the same `image`.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub embedding: Embedding,
    pub image: NormalizedImage,
    pub orientation: f32,
}

/// Build a template from a normalized image.
///
/// Returns the failing criterion if the quality gate rejects the image;
/// the output is left untouched (there is no output slot to corrupt).
pub fn build_template(image: &NormalizedImage) -> FingerprintResult<Template> {
    quality::check_quality(image)?;

    let embedding = embedding::compute_embedding(image);
    let orientation = orientation::compute_orientation(image);

    log::info!("build_template: accepted, orientation={orientation:.1}deg");

    Ok(Template {
        embedding,
        image: *image,
        orientation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::IMAGE_SIZE;
    use crate::error::{FingerprintError, QualityCriterion};

    fn ridge_image() -> NormalizedImage {
        let mut image = [0f32; IMAGE_SIZE];
        for y in 0..76 {
            for x in 0..40 {
                let ridge = (((x as f32) * std::f32::consts::PI / 3.0).sin() * 0.5 + 0.5)
                    * (1.0
                        - (((x as f32 - 20.0).powi(2) + (y as f32 - 38.0).powi(2)) / (2.0 * 20.0 * 20.0))
                            .min(1.0));
                image[y * 40 + x] = ridge.clamp(0.0, 1.0);
            }
        }
        image
    }

    #[test]
    fn rejects_blank_images() {
        let image = [0f32; IMAGE_SIZE];
        let err = build_template(&image).unwrap_err();
        assert_eq!(
            err,
            FingerprintError::quality_rejected(QualityCriterion::Contrast)
        );
    }

    #[test]
    fn builds_template_iff_quality_accepts() {
        let image = ridge_image();
        if quality::check_quality(&image).is_ok() {
            let tmpl = build_template(&image).unwrap();
            assert_eq!(tmpl.image, image);
            assert_eq!(tmpl.embedding, embedding::compute_embedding(&image));
            assert_eq!(tmpl.orientation, orientation::compute_orientation(&image));
        }
    }
}
