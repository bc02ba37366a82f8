//! Single-image and batch operations over an injected codec and gateway.
//!
//! [`Pipeline`] is the one entry point callers use. It owns nothing but its
//! dependencies and the output settings; every operation takes its input by
//! reference and returns a new value, so a failed call leaves the caller's
//! [`CompressedImage`] exactly as it was.

use crate::batch::{self, BatchHandle, BatchItem};
use crate::config::OutputConfig;
use crate::error::{ConversionError, PipelineError, ProcessingError};
use crate::gateway::SaveGateway;
use crate::imaging::{self, Codec, level_target};
use crate::metadata::ImageMetadata;
use crate::types::{
    CompressedImage, ConversionResult, ImageFormat, ImageQuality, ImageSize,
};
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Output settings the compress and save paths read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputSettings {
    pub format: ImageFormat,
    pub quality: ImageQuality,
    pub strip_metadata: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            format: ImageFormat::Jpeg,
            quality: ImageQuality::Original,
            strip_metadata: true,
        }
    }
}

impl OutputSettings {
    pub fn from_config(config: &OutputConfig) -> Self {
        Self {
            format: config.format,
            quality: config.quality,
            strip_metadata: config.strip_metadata,
        }
    }
}

pub struct Pipeline<C, G> {
    codec: Arc<C>,
    gateway: Arc<G>,
    settings: OutputSettings,
}

impl<C, G> Pipeline<C, G>
where
    C: Codec + 'static,
    G: SaveGateway + 'static,
{
    pub fn new(codec: C, gateway: G, settings: OutputSettings) -> Self {
        Self {
            codec: Arc::new(codec),
            gateway: Arc::new(gateway),
            settings,
        }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn settings(&self) -> OutputSettings {
        self.settings
    }

    // -------------------------------------------------------------------------
    // Single image
    // -------------------------------------------------------------------------

    pub fn compress(
        &self,
        original: &[u8],
        quality: ImageQuality,
        target: ImageSize,
        format: ImageFormat,
    ) -> Result<Vec<u8>, ProcessingError> {
        imaging::compress(self.codec.as_ref(), original, quality, target, format)
    }

    pub fn remove_metadata(&self, data: &[u8]) -> Option<Vec<u8>> {
        imaging::remove_metadata(self.codec.as_ref(), data)
    }

    pub fn is_heic(&self, data: &[u8]) -> bool {
        imaging::is_heic(self.codec.as_ref(), data)
    }

    pub fn get_image_size(&self, data: &[u8]) -> Option<ImageSize> {
        imaging::get_image_size(self.codec.as_ref(), data)
    }

    /// Wrap freshly selected bytes as a [`CompressedImage`].
    ///
    /// Size comes from decoding; format from the container, defaulting to
    /// JPEG for containers the pipeline can't write (e.g. HEIC).
    pub fn load(
        &self,
        name: impl Into<String>,
        data: Vec<u8>,
        metadata: ImageMetadata,
    ) -> Result<CompressedImage, ProcessingError> {
        let size = self
            .get_image_size(&data)
            .ok_or(ProcessingError::InvalidImageData)?;
        let format = self
            .codec
            .container_type(&data)
            .and_then(|c| c.as_image_format())
            .unwrap_or_default();
        Ok(CompressedImage::new(name, data, metadata, size, format))
    }

    /// Re-encode from the original bytes at `quality`, keeping the current size.
    pub fn adjust_quality(
        &self,
        image: &CompressedImage,
        quality: ImageQuality,
    ) -> Result<CompressedImage, ProcessingError> {
        let format = self.settings.format;
        let data = self.compress(image.original_data(), quality, image.size(), format)?;
        Ok(image.with_rendition(data, quality, image.size(), format))
    }

    /// Re-encode from the original bytes at `target`, keeping the current quality.
    pub fn resize(
        &self,
        image: &CompressedImage,
        target: ImageSize,
    ) -> Result<CompressedImage, ProcessingError> {
        let format = self.settings.format;
        let data = self.compress(image.original_data(), image.quality(), target, format)?;
        Ok(image.with_rendition(data, image.quality(), target, format))
    }

    /// [`resize`](Self::resize) to the native size scaled by the level's factor.
    pub fn resize_to_level(
        &self,
        image: &CompressedImage,
        level: i32,
    ) -> Result<CompressedImage, ProcessingError> {
        let native = self
            .get_image_size(image.original_data())
            .ok_or(ProcessingError::InvalidImageData)?;
        self.resize(image, level_target(native, level))
    }

    /// Persist the current rendition, metadata removed when configured.
    pub fn save(&self, image: &CompressedImage) -> Result<(), PipelineError> {
        let data = if self.settings.strip_metadata {
            self.remove_metadata(image.compressed_data())
                .ok_or(ProcessingError::MetadataRemovalFailed)?
        } else {
            image.compressed_data().to_vec()
        };
        self.gateway.save(&data)?;
        debug!(name = image.name(), bytes = data.len(), "image saved");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Conversion
    // -------------------------------------------------------------------------

    pub fn convert(
        &self,
        data: &[u8],
        name: impl Into<String>,
        to: ImageFormat,
        quality: ImageQuality,
    ) -> Result<ConversionResult, ConversionError> {
        let converted = imaging::convert(self.codec.as_ref(), data, to, quality.factor())?;
        Ok(ConversionResult::new(name, data.len(), converted))
    }

    /// Convert `items` in order on a worker thread. See [`batch`].
    pub fn convert_batch(
        &self,
        items: Vec<BatchItem>,
        to: ImageFormat,
        quality: ImageQuality,
    ) -> BatchHandle {
        batch::spawn_conversion(Arc::clone(&self.codec), items, to, quality)
    }

    /// Save every result concurrently; `Ok(n)` with the number saved.
    ///
    /// Individual failures are logged and skipped. Only zero successes is an
    /// error.
    pub fn save_converted_images(
        &self,
        results: &[ConversionResult],
    ) -> Result<usize, ConversionError> {
        let saved = results
            .par_iter()
            .filter(|result| match self.gateway.save(&result.converted_data) {
                Ok(()) => true,
                Err(e) => {
                    warn!(file = %result.original_name, error = %e, "save failed");
                    false
                }
            })
            .count();

        info!(saved, total = results.len(), "converted images saved");
        if saved > 0 {
            Ok(saved)
        } else {
            Err(ConversionError::SaveFailed)
        }
    }
}
