//! Decode → resize → re-encode, and plain format conversion.
//!
//! Codec failures are logged at `debug` with their cause and surfaced as the
//! coarse [`ProcessingError`] / [`ConversionError`] kinds.

use super::calculations::{matches_native, pixel_dimensions};
use super::codec::Codec;
use crate::error::{ConversionError, ProcessingError};
use crate::types::{ImageFormat, ImageQuality, ImageSize};
use tracing::debug;

/// Encoder factor used when the requested quality is `Original` but a
/// re-encode is still needed (target size differs from native).
pub const ORIGINAL_REENCODE_FACTOR: f64 = 0.8;

fn encode_factor(quality: ImageQuality) -> f64 {
    match quality {
        ImageQuality::Original => ORIGINAL_REENCODE_FACTOR,
        other => other.factor(),
    }
}

/// Produce a re-encoded copy of `original` at `target` size and `quality`.
///
/// When `target` equals the native pixel size and `quality` is `Original`
/// the input bytes are returned unchanged, whatever `format` says.
///
/// PNG output goes through a JPEG pass at the same factor first, so the
/// quality tier still shrinks a lossless output.
pub fn compress(
    codec: &impl Codec,
    original: &[u8],
    quality: ImageQuality,
    target: ImageSize,
    format: ImageFormat,
) -> Result<Vec<u8>, ProcessingError> {
    let image = codec.decode(original).map_err(|e| {
        debug!(error = %e, bytes = original.len(), "compress: decode failed");
        ProcessingError::InvalidImageData
    })?;

    if quality == ImageQuality::Original && matches_native(target, image.width(), image.height()) {
        return Ok(original.to_vec());
    }

    let (width, height) = pixel_dimensions(target).ok_or_else(|| {
        debug!(%target, "compress: target has zero or oversized area");
        ProcessingError::ResizeFailed
    })?;
    let resized = codec.resize(&image, width, height).map_err(|e| {
        debug!(error = %e, width, height, "compress: resize failed");
        ProcessingError::ResizeFailed
    })?;

    let factor = encode_factor(quality);
    let jpeg = codec
        .encode(&resized, ImageFormat::Jpeg, factor)
        .map_err(|e| {
            debug!(error = %e, factor, "compress: JPEG encode failed");
            ProcessingError::CompressionFailed
        })?;

    match format {
        ImageFormat::Jpeg => Ok(jpeg),
        ImageFormat::Png => {
            let intermediate = codec.decode(&jpeg).map_err(|e| {
                debug!(error = %e, "compress: intermediate JPEG decode failed");
                ProcessingError::CompressionFailed
            })?;
            codec
                .encode(&intermediate, ImageFormat::Png, factor)
                .map_err(|e| {
                    debug!(error = %e, "compress: PNG encode failed");
                    ProcessingError::CompressionFailed
                })
        }
    }
}

/// Native pixel size of an encoded image, `None` if it does not decode.
pub fn get_image_size(codec: &impl Codec, data: &[u8]) -> Option<ImageSize> {
    codec
        .decode(data)
        .ok()
        .map(|image| ImageSize::from_pixels(image.width(), image.height()))
}

/// Re-encode `data` into `to` without resizing. `factor` is ignored for PNG.
pub fn convert(
    codec: &impl Codec,
    data: &[u8],
    to: ImageFormat,
    factor: f64,
) -> Result<Vec<u8>, ConversionError> {
    let image = codec.decode(data).map_err(|e| {
        debug!(error = %e, bytes = data.len(), "convert: decode failed");
        ConversionError::InvalidImageData
    })?;
    codec.encode(&image, to, factor).map_err(|e| {
        debug!(error = %e, format = %to, factor, "convert: encode failed");
        ConversionError::ConversionFailed
    })
}
