//! Versioned, length-checked container for a set of templates (component G).
//!
//! The wire layout is host-native: the encoder writes each [`Template`]'s
//! in-memory fields as explicit little-endian `f32` arrays (stabilizing
//! float layout across hosts) but keeps the magic/version contract the
//! source defines. Portability beyond float endianness (e.g. struct
//! padding on other hosts) remains a non-goal, as in spec.md §4.7/§9.

use crate::algorithms::{EMBEDDING_DIM, IMAGE_SIZE};
use crate::error::{FingerprintError, FingerprintResult};
use crate::template::Template;

const MAGIC: u32 = 0x464E_4E01; // "FNN\x01"
const VERSION: u32 = 1;
const HEADER_LEN: usize = 16;

/// Size in bytes of one encoded template record on the wire.
const TEMPLATE_RECORD_LEN: usize = EMBEDDING_DIM * 4 + IMAGE_SIZE * 4 + 4;

/// Encode a template set: header + `N` fixed-size little-endian records.
pub fn encode_templates(templates: &[Template]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_LEN + templates.len() * TEMPLATE_RECORD_LEN);

    buf.extend_from_slice(&MAGIC.to_le_bytes());
    buf.extend_from_slice(&VERSION.to_le_bytes());
    buf.extend_from_slice(&(templates.len() as u32).to_le_bytes());
    buf.extend_from_slice(&(TEMPLATE_RECORD_LEN as u32).to_le_bytes());

    for t in templates {
        for v in t.embedding.iter() {
            buf.extend_from_slice(&v.to_le_bytes());
        }
        for v in t.image.iter() {
            buf.extend_from_slice(&v.to_le_bytes());
        }
        buf.extend_from_slice(&t.orientation.to_le_bytes());
    }

    buf
}

/// Decode a template set, validating the header and total length.
pub fn decode_templates(data: &[u8]) -> FingerprintResult<Vec<Template>> {
    if data.len() < HEADER_LEN {
        return Err(FingerprintError::codec_short_buffer(HEADER_LEN, data.len()));
    }

    let magic = u32::from_le_bytes(data[0..4].try_into().unwrap());
    let version = u32::from_le_bytes(data[4..8].try_into().unwrap());
    let num_templates = u32::from_le_bytes(data[8..12].try_into().unwrap());
    let template_size = u32::from_le_bytes(data[12..16].try_into().unwrap());

    if magic != MAGIC {
        return Err(FingerprintError::codec_bad_magic(MAGIC, magic));
    }
    if version != VERSION {
        return Err(FingerprintError::codec_bad_version(VERSION, version));
    }
    if template_size != TEMPLATE_RECORD_LEN as u32 {
        return Err(FingerprintError::codec_size_mismatch(
            TEMPLATE_RECORD_LEN as u32,
            template_size,
        ));
    }

    let expected_len = HEADER_LEN + num_templates as usize * TEMPLATE_RECORD_LEN;
    if data.len() < expected_len {
        return Err(FingerprintError::codec_short_buffer(expected_len, data.len()));
    }

    let mut templates = Vec::with_capacity(num_templates as usize);
    let mut offset = HEADER_LEN;

    for _ in 0..num_templates {
        let mut embedding = [0f32; EMBEDDING_DIM];
        for v in embedding.iter_mut() {
            *v = f32::from_le_bytes(data[offset..offset + 4].try_into().unwrap());
            offset += 4;
        }

        let mut image = [0f32; IMAGE_SIZE];
        for v in image.iter_mut() {
            *v = f32::from_le_bytes(data[offset..offset + 4].try_into().unwrap());
            offset += 4;
        }

        let orientation = f32::from_le_bytes(data[offset..offset + 4].try_into().unwrap());
        offset += 4;

        templates.push(Template {
            embedding,
            image,
            orientation,
        });
    }

    log::info!("decode_templates: decoded {} templates", templates.len());
    Ok(templates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::EMBEDDING_DIM;

    fn sample_template(seed: f32) -> Template {
        let mut embedding = [0f32; EMBEDDING_DIM];
        for (i, v) in embedding.iter_mut().enumerate() {
            *v = (i as f32 + seed) * 0.01;
        }
        let mut image = [0f32; IMAGE_SIZE];
        for (i, v) in image.iter_mut().enumerate() {
            *v = ((i as f32 + seed) % 101.0) / 101.0;
        }
        Template {
            embedding,
            image,
            orientation: 12.5 + seed,
        }
    }

    #[test]
    fn round_trips_bit_for_bit() {
        let templates: Vec<Template> = (0..15).map(|i| sample_template(i as f32)).collect();
        let encoded = encode_templates(&templates);
        let decoded = decode_templates(&encoded).unwrap();
        assert_eq!(templates, decoded);
    }

    #[test]
    fn rejects_flipped_magic() {
        let templates = vec![sample_template(0.0)];
        let mut encoded = encode_templates(&templates);
        encoded[0] ^= 0xFF;
        let err = decode_templates(&encoded).unwrap_err();
        assert!(matches!(err, FingerprintError::CodecBadMagic { .. }));
    }

    #[test]
    fn rejects_flipped_version() {
        let templates = vec![sample_template(0.0)];
        let mut encoded = encode_templates(&templates);
        encoded[4] ^= 0xFF;
        let err = decode_templates(&encoded).unwrap_err();
        assert!(matches!(err, FingerprintError::CodecBadVersion { .. }));
    }

    #[test]
    fn rejects_truncated_buffer() {
        let templates = vec![sample_template(0.0)];
        let encoded = encode_templates(&templates);
        let truncated = &encoded[..encoded.len() - 1];
        let err = decode_templates(truncated).unwrap_err();
        assert!(matches!(err, FingerprintError::CodecShortBuffer { .. }));
    }

    #[test]
    fn rejects_header_only_buffer() {
        let err = decode_templates(&[0u8; 15]).unwrap_err();
        assert!(matches!(err, FingerprintError::CodecShortBuffer { .. }));
    }

    #[test]
    fn rejects_size_mismatch() {
        let templates = vec![sample_template(0.0)];
        let mut encoded = encode_templates(&templates);
        // Corrupt template_size field (offset 12..16) to an impossible value.
        encoded[12..16].copy_from_slice(&0u32.to_le_bytes());
        let err = decode_templates(&encoded).unwrap_err();
        assert!(matches!(err, FingerprintError::CodecSizeMismatch { .. }));
    }

    #[test]
    fn empty_set_round_trips() {
        let encoded = encode_templates(&[]);
        let decoded = decode_templates(&encoded).unwrap();
        assert!(decoded.is_empty());
    }
}
