//! Fixed-topology image algorithms shared by the matching pipeline.

pub mod augment;
pub mod decode;
pub mod embedding;
pub mod ncc;
pub mod orientation;
pub mod quality;

/// Normalized image height (rows).
pub const IMAGE_HEIGHT: usize = 76;
/// Normalized image width (columns).
pub const IMAGE_WIDTH: usize = 40;
/// Normalized image size in samples (`IMAGE_HEIGHT * IMAGE_WIDTH`).
pub const IMAGE_SIZE: usize = IMAGE_HEIGHT * IMAGE_WIDTH;
/// Embedding vector length.
pub const EMBEDDING_DIM: usize = 64;

/// Offset, in 16-bit samples, of the image window within a raw sensor frame.
const RAW_IMAGE_OFFSET_SAMPLES: usize = 3040;
/// Raw frame header size in bytes, preceding the 16-bit pixel array.
const RAW_HEADER_BYTES: usize = 6;
/// Minimum raw frame length accepted by [`decode::decode_raw`].
pub const RAW_FRAME_MIN_LEN: usize =
    RAW_HEADER_BYTES + (RAW_IMAGE_OFFSET_SAMPLES + IMAGE_SIZE) * 2;

/// A normalized 76x40 fingerprint image, row-major, values in `[0, 1]`.
pub type NormalizedImage = [f32; IMAGE_SIZE];

/// A 64-dimensional L2-normalized embedding vector.
pub type Embedding = [f32; EMBEDDING_DIM];
