//! Codec capability trait and shared types.
//!
//! The [`Codec`] trait defines the five operations the pipeline needs from a
//! platform codec: decode, resize, encode, container introspection, and a
//! metadata-free container copy. Everything above this seam (transcoding,
//! sniffing, stripping, batching) is codec-agnostic.
//!
//! The production implementation is
//! [`RustCodec`](super::rust_codec::RustCodec), built on the `image` crate.

use crate::types::ImageFormat;
use image::DynamicImage;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Resize failed: {0}")]
    Resize(String),
    #[error("Encode failed: {0}")]
    Encode(String),
    #[error("Unsupported container: {0}")]
    Unsupported(String),
}

/// A decoded raster, orientation already normalized.
pub type DecodedImage = DynamicImage;

/// Registered container type of an encoded buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContainerType {
    Jpeg,
    Png,
    Heic,
    Heif,
    Avif,
    Other(String),
}

impl ContainerType {
    /// Uniform type identifier, e.g. `public.heic`.
    pub fn identifier(&self) -> String {
        match self {
            ContainerType::Jpeg => "public.jpeg".to_string(),
            ContainerType::Png => "public.png".to_string(),
            ContainerType::Heic => "public.heic".to_string(),
            ContainerType::Heif => "public.heif".to_string(),
            ContainerType::Avif => "public.avif".to_string(),
            ContainerType::Other(name) => format!("public.{}", name.to_ascii_lowercase()),
        }
    }

    pub fn is_heif_family(&self) -> bool {
        matches!(self, ContainerType::Heic | ContainerType::Heif)
    }

    pub fn as_image_format(&self) -> Option<ImageFormat> {
        match self {
            ContainerType::Jpeg => Some(ImageFormat::Jpeg),
            ContainerType::Png => Some(ImageFormat::Png),
            _ => None,
        }
    }
}

impl fmt::Display for ContainerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identifier())
    }
}

/// Platform codec used by every pipeline stage.
///
/// `Send + Sync` so one codec can be shared by the batch worker thread and
/// the rayon pool.
pub trait Codec: Send + Sync {
    /// Decode an encoded buffer into pixels.
    fn decode(&self, data: &[u8]) -> Result<DecodedImage, CodecError>;

    /// Scale to exactly `width` x `height`, ignoring aspect ratio.
    fn resize(
        &self,
        image: &DecodedImage,
        width: u32,
        height: u32,
    ) -> Result<DecodedImage, CodecError>;

    /// Encode with a quality factor in `0.0..=1.0`. Lossless formats ignore it.
    fn encode(
        &self,
        image: &DecodedImage,
        format: ImageFormat,
        quality: f64,
    ) -> Result<Vec<u8>, CodecError>;

    /// Introspect the container type without decoding pixels.
    fn container_type(&self, data: &[u8]) -> Option<ContainerType>;

    /// Copy the primary image of `data` into a fresh container of type `into`
    /// without any property dictionaries (EXIF, GPS, IPTC, XMP, ...).
    fn copy_image_only(&self, data: &[u8], into: &ContainerType) -> Result<Vec<u8>, CodecError>;
}

impl<C: Codec + ?Sized> Codec for std::sync::Arc<C> {
    fn decode(&self, data: &[u8]) -> Result<DecodedImage, CodecError> {
        (**self).decode(data)
    }

    fn resize(
        &self,
        image: &DecodedImage,
        width: u32,
        height: u32,
    ) -> Result<DecodedImage, CodecError> {
        (**self).resize(image, width, height)
    }

    fn encode(
        &self,
        image: &DecodedImage,
        format: ImageFormat,
        quality: f64,
    ) -> Result<Vec<u8>, CodecError> {
        (**self).encode(image, format, quality)
    }

    fn container_type(&self, data: &[u8]) -> Option<ContainerType> {
        (**self).container_type(data)
    }

    fn copy_image_only(&self, data: &[u8], into: &ContainerType) -> Result<Vec<u8>, CodecError> {
        (**self).copy_image_only(data, into)
    }
}
