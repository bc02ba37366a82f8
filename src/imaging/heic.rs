//! HEIC/HEIF decoding through libheif.
//!
//! Only compiled with the `heic` feature. The `image` crate has no HEIF
//! decoder, so [`RustCodec`](super::RustCodec) routes HEIF-family buffers
//! here and gets back an ordinary RGB [`DynamicImage`].

use super::codec::CodecError;
use image::{DynamicImage, RgbImage};
use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};

/// Decode the primary image of a HEIC/HEIF buffer to interleaved RGB8.
pub fn decode(data: &[u8]) -> Result<DynamicImage, CodecError> {
    let lib_heif = LibHeif::new();
    let ctx = HeifContext::read_from_bytes(data).map_err(|e| CodecError::Decode(e.to_string()))?;
    let handle = ctx
        .primary_image_handle()
        .map_err(|e| CodecError::Decode(e.to_string()))?;

    let width = handle.width();
    let height = handle.height();
    let image = lib_heif
        .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgb), None)
        .map_err(|e| CodecError::Decode(e.to_string()))?;

    let planes = image.planes();
    let interleaved = planes
        .interleaved
        .ok_or_else(|| CodecError::Decode("HEIF image has no interleaved RGB plane".into()))?;

    let rgb = pack_rows(
        interleaved.data,
        width as usize * 3,
        height as usize,
        interleaved.stride,
    )?;
    RgbImage::from_raw(width, height, rgb)
        .map(DynamicImage::ImageRgb8)
        .ok_or_else(|| CodecError::Decode("HEIF pixel buffer size mismatch".into()))
}

/// Copy `height` rows of `row_len` bytes out of a plane whose rows start
/// every `stride` bytes, dropping any row padding.
fn pack_rows(
    plane: &[u8],
    row_len: usize,
    height: usize,
    stride: usize,
) -> Result<Vec<u8>, CodecError> {
    if stride < row_len {
        return Err(CodecError::Decode(format!(
            "HEIF stride {stride} shorter than row of {row_len} bytes"
        )));
    }
    let mut rgb = Vec::with_capacity(row_len * height);
    for y in 0..height {
        let start = y * stride;
        let row = plane
            .get(start..start + row_len)
            .ok_or_else(|| CodecError::Decode("HEIF plane shorter than declared size".into()))?;
        rgb.extend_from_slice(row);
    }
    Ok(rgb)
}
