//! Production codec built on the `image` crate ecosystem.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG) | `image::ImageReader` + EXIF orientation normalization |
//! | Decode (HEIC/HEIF) | `libheif-rs` (`heic` feature) |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |
//! | Encode → PNG | `image::codecs::png::PngEncoder` |
//! | Container type | ISOBMFF `ftyp` brands, then `image::guess_format` |
//! | Metadata-free copy | `img-parts` segment / chunk rewrite, `kamadak-exif` orientation |

use super::codec::{Codec, CodecError, ContainerType, DecodedImage};
use super::params::Quality;
use super::sniff;
use crate::types::ImageFormat;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageFormat as RasterFormat, ImageReader};
use img_parts::jpeg::{Jpeg, markers};
use img_parts::png::Png;
use img_parts::{Bytes, ImageEXIF};
use std::io::Cursor;

/// JPEG segments carrying property dictionaries: EXIF/XMP, IPTC, comments.
const JPEG_METADATA_MARKERS: &[u8] = &[markers::APP1, markers::APP13, markers::COM];

/// PNG ancillary chunks carrying textual or EXIF metadata.
const PNG_METADATA_CHUNKS: &[[u8; 4]] = &[*b"eXIf", *b"tEXt", *b"zTXt", *b"iTXt", *b"tIME"];

/// EXIF orientation of a raw TIFF block, when it is a real transform (2-8).
fn exif_orientation(tiff: &[u8]) -> Option<u16> {
    let exif = exif::Reader::new().read_raw(tiff.to_vec()).ok()?;
    let field = exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?;
    let value = field.value.get_uint(0)?;
    u16::try_from(value).ok().filter(|o| (2..=8).contains(o))
}

/// A TIFF block holding nothing but the orientation tag.
fn orientation_only_exif(orientation: u16) -> Result<Bytes, CodecError> {
    let field = exif::Field {
        tag: exif::Tag::Orientation,
        ifd_num: exif::In::PRIMARY,
        value: exif::Value::Short(vec![orientation]),
    };
    let mut writer = exif::experimental::Writer::new();
    writer.push_field(&field);
    let mut buf = Cursor::new(Vec::new());
    writer
        .write(&mut buf, false)
        .map_err(|e| CodecError::Encode(format!("EXIF write failed: {e}")))?;
    Ok(Bytes::from(buf.into_inner()))
}

/// Codec backed by the `image` crate.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustCodec;

impl RustCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustCodec {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode through `image`, applying the EXIF orientation so the raster is
/// upright before any resize.
fn decode_raster(data: &[u8]) -> Result<DynamicImage, CodecError> {
    let reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
    let mut decoder = reader
        .into_decoder()
        .map_err(|e| CodecError::Decode(e.to_string()))?;
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
    let mut image =
        DynamicImage::from_decoder(decoder).map_err(|e| CodecError::Decode(e.to_string()))?;
    image.apply_orientation(orientation);
    Ok(image)
}

#[cfg(feature = "heic")]
fn decode_heif(data: &[u8]) -> Result<DynamicImage, CodecError> {
    super::heic::decode(data)
}

#[cfg(not(feature = "heic"))]
fn decode_heif(_data: &[u8]) -> Result<DynamicImage, CodecError> {
    Err(CodecError::Unsupported(
        "HEIC decoding requires the `heic` feature".into(),
    ))
}

fn encode_jpeg(image: &DynamicImage, quality: Quality) -> Result<Vec<u8>, CodecError> {
    // JPEG has no alpha channel.
    let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, quality.value() as u8);
    rgb.write_with_encoder(encoder)
        .map_err(|e| CodecError::Encode(format!("JPEG encode failed: {e}")))?;
    Ok(buf)
}

fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, CodecError> {
    let mut buf = Vec::new();
    image
        .write_with_encoder(PngEncoder::new(&mut buf))
        .map_err(|e| CodecError::Encode(format!("PNG encode failed: {e}")))?;
    Ok(buf)
}

fn strip_jpeg(data: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut jpeg = Jpeg::from_bytes(Bytes::from(data.to_vec()))
        .map_err(|e| CodecError::Decode(format!("failed to parse JPEG: {e}")))?;
    let orientation = jpeg.exif().and_then(|tiff| exif_orientation(&tiff));
    jpeg.segments_mut()
        .retain(|segment| !JPEG_METADATA_MARKERS.contains(&segment.marker()));
    // Pixels are stored unrotated; dropping the tag would turn the photo.
    if let Some(orientation) = orientation {
        jpeg.set_exif(Some(orientation_only_exif(orientation)?));
    }
    Ok(jpeg.encoder().bytes().to_vec())
}

fn strip_png(data: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut png = Png::from_bytes(Bytes::from(data.to_vec()))
        .map_err(|e| CodecError::Decode(format!("failed to parse PNG: {e}")))?;
    let orientation = png.exif().and_then(|tiff| exif_orientation(&tiff));
    png.chunks_mut()
        .retain(|chunk| !PNG_METADATA_CHUNKS.contains(&chunk.kind()));
    if let Some(orientation) = orientation {
        png.set_exif(Some(orientation_only_exif(orientation)?));
    }
    Ok(png.encoder().bytes().to_vec())
}

fn raster_container(format: RasterFormat) -> ContainerType {
    match format {
        RasterFormat::Jpeg => ContainerType::Jpeg,
        RasterFormat::Png => ContainerType::Png,
        RasterFormat::Avif => ContainerType::Avif,
        other => ContainerType::Other(
            other
                .extensions_str()
                .first()
                .copied()
                .unwrap_or("unknown")
                .to_string(),
        ),
    }
}

impl Codec for RustCodec {
    fn decode(&self, data: &[u8]) -> Result<DecodedImage, CodecError> {
        if sniff::isobmff_container(data).is_some_and(|c| c.is_heif_family()) {
            return decode_heif(data);
        }
        decode_raster(data)
    }

    fn resize(
        &self,
        image: &DecodedImage,
        width: u32,
        height: u32,
    ) -> Result<DecodedImage, CodecError> {
        if width == 0 || height == 0 {
            return Err(CodecError::Resize(format!(
                "cannot resize to {width}x{height}"
            )));
        }
        if image.width() == width && image.height() == height {
            return Ok(image.clone());
        }
        Ok(image.resize_exact(width, height, FilterType::Lanczos3))
    }

    fn encode(
        &self,
        image: &DecodedImage,
        format: ImageFormat,
        quality: f64,
    ) -> Result<Vec<u8>, CodecError> {
        match format {
            ImageFormat::Jpeg => encode_jpeg(image, Quality::from_factor(quality)),
            ImageFormat::Png => encode_png(image),
        }
    }

    fn container_type(&self, data: &[u8]) -> Option<ContainerType> {
        if let Some(container) = sniff::isobmff_container(data) {
            return Some(container);
        }
        image::guess_format(data).ok().map(raster_container)
    }

    fn copy_image_only(&self, data: &[u8], into: &ContainerType) -> Result<Vec<u8>, CodecError> {
        let detected = self.container_type(data);
        if detected.as_ref() != Some(into) {
            return Err(CodecError::Unsupported(format!(
                "cannot copy {} into {into}",
                detected.map_or_else(|| "unknown data".to_string(), |c| c.to_string())
            )));
        }
        match into {
            ContainerType::Jpeg => strip_jpeg(data),
            ContainerType::Png => strip_png(data),
            other => Err(CodecError::Unsupported(format!(
                "no metadata-free writer for {other}"
            ))),
        }
    }
}
