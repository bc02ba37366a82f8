//! Value types shared across all pipeline stages.
//!
//! Everything here is plain data: no I/O, no codec calls. The quality and
//! size policies (level → compression factor, level → scale factor) live on
//! [`ImageQuality`] and [`ImageSize`] so the mapping tables sit next to the
//! types they produce.

use crate::error::ConversionError;
use crate::metadata::ImageMetadata;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

// =============================================================================
// ImageSize
// =============================================================================

/// Image dimensions in pixels. Both components are always `>= 0`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ImageSize {
    width: f64,
    height: f64,
}

impl ImageSize {
    pub const ZERO: ImageSize = ImageSize {
        width: 0.0,
        height: 0.0,
    };

    /// Negative (and NaN) components are clamped to zero.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    pub fn from_pixels(width: u32, height: u32) -> Self {
        Self::new(width as f64, height as f64)
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.width * factor, self.height * factor)
    }

    /// Scale factor for a discrete size level.
    ///
    /// | level | factor |
    /// |---|---|
    /// | 0 | 1.0 (original) |
    /// | 1 | 0.75 |
    /// | 2 | 0.5 |
    /// | 3 | 0.25 |
    ///
    /// Any other level maps to 1.0.
    pub fn scale_factor(level: i32) -> f64 {
        match level {
            1 => 0.75,
            2 => 0.5,
            3 => 0.25,
            _ => 1.0,
        }
    }

    /// Width over height, `0.0` for a zero-height size.
    pub fn aspect_ratio(&self) -> f64 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            0.0
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x {}", self.width as u64, self.height as u64)
    }
}

// =============================================================================
// ImageQuality
// =============================================================================

/// Compression intensity tiers, strongest quality first.
///
/// For lossless targets (PNG) this is a compression-intensity knob rather
/// than a literal codec quality: the pipeline introduces the loss through an
/// intermediate JPEG pass.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ImageQuality {
    #[default]
    Original,
    High,
    Normal,
    Low,
    Minimum,
}

impl ImageQuality {
    pub const ALL: [ImageQuality; 5] = [
        ImageQuality::Original,
        ImageQuality::High,
        ImageQuality::Normal,
        ImageQuality::Low,
        ImageQuality::Minimum,
    ];

    /// Compression factor in `0.0..=1.0`.
    pub fn factor(self) -> f64 {
        match self {
            ImageQuality::Original => 1.0,
            ImageQuality::High => 0.8,
            ImageQuality::Normal => 0.5,
            ImageQuality::Low => 0.3,
            ImageQuality::Minimum => 0.1,
        }
    }

    /// Quality for a discrete UI level. Level 1 maps to `Normal`, not `High`.
    /// Unknown levels map to `Original`.
    pub fn from_level(level: i32) -> Self {
        match level {
            1 => ImageQuality::Normal,
            2 => ImageQuality::Low,
            3 => ImageQuality::Minimum,
            _ => ImageQuality::Original,
        }
    }

    /// Nearest tier for an arbitrary factor (e.g. a slider position).
    pub fn from_factor(value: f64) -> Self {
        if value >= 0.9 {
            ImageQuality::Original
        } else if value >= 0.6 {
            ImageQuality::High
        } else if value >= 0.4 {
            ImageQuality::Normal
        } else if value >= 0.2 {
            ImageQuality::Low
        } else {
            ImageQuality::Minimum
        }
    }

    /// Tier whose factor is exactly `value`; anything else (including an unset
    /// `0.0`) is `Original`.
    pub fn from_stored(value: f64) -> Self {
        Self::ALL
            .into_iter()
            .find(|q| q.factor() == value)
            .unwrap_or(ImageQuality::Original)
    }

    pub fn name(self) -> &'static str {
        match self {
            ImageQuality::Original => "original",
            ImageQuality::High => "high",
            ImageQuality::Normal => "normal",
            ImageQuality::Low => "low",
            ImageQuality::Minimum => "minimum",
        }
    }
}

impl fmt::Display for ImageQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ImageQuality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|q| q.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown quality '{s}' (expected one of original, high, normal, low, minimum)"))
    }
}

// =============================================================================
// ImageFormat
// =============================================================================

/// Output container formats.
///
/// Persisted as a raw string. Deserializing goes through [`from_stored`]
/// so an unknown stored value falls back to JPEG instead of failing.
///
/// [`from_stored`]: ImageFormat::from_stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ImageFormat {
    #[default]
    Jpeg,
    Png,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Png => "png",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
        }
    }

    pub fn from_stored(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ImageFormat {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(ImageFormat::Jpeg),
            "png" => Ok(ImageFormat::Png),
            _ => Err(ConversionError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl From<String> for ImageFormat {
    fn from(value: String) -> Self {
        Self::from_stored(Some(&value))
    }
}

impl From<ImageFormat> for String {
    fn from(value: ImageFormat) -> Self {
        value.extension().to_string()
    }
}

// =============================================================================
// CompressedImage
// =============================================================================

/// A selected photo and its current compressed rendition.
///
/// `original_data` is fixed at construction and shared between every value
/// derived from this one, so transforms always start from the source bytes.
/// Transforms never mutate in place: each returns a new snapshot with
/// replaced `compressed_data`, quality, size and format.
#[derive(Debug, Clone)]
pub struct CompressedImage {
    id: Uuid,
    name: String,
    original_data: Arc<[u8]>,
    compressed_data: Vec<u8>,
    metadata: ImageMetadata,
    size: ImageSize,
    quality: ImageQuality,
    format: ImageFormat,
}

impl CompressedImage {
    pub fn new(
        name: impl Into<String>,
        original_data: Vec<u8>,
        metadata: ImageMetadata,
        size: ImageSize,
        format: ImageFormat,
    ) -> Self {
        let original_data: Arc<[u8]> = original_data.into();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            compressed_data: original_data.to_vec(),
            original_data,
            metadata,
            size,
            quality: ImageQuality::Original,
            format,
        }
    }

    /// New snapshot sharing identity and source bytes with `self`.
    pub fn with_rendition(
        &self,
        compressed_data: Vec<u8>,
        quality: ImageQuality,
        size: ImageSize,
        format: ImageFormat,
    ) -> Self {
        Self {
            id: self.id,
            name: self.name.clone(),
            original_data: Arc::clone(&self.original_data),
            compressed_data,
            metadata: self.metadata.clone(),
            size,
            quality,
            format,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn original_data(&self) -> &[u8] {
        &self.original_data
    }

    pub fn compressed_data(&self) -> &[u8] {
        &self.compressed_data
    }

    pub fn metadata(&self) -> &ImageMetadata {
        &self.metadata
    }

    pub fn size(&self) -> ImageSize {
        self.size
    }

    pub fn quality(&self) -> ImageQuality {
        self.quality
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn original_data_size(&self) -> usize {
        self.original_data.len()
    }

    pub fn compressed_data_size(&self) -> usize {
        self.compressed_data.len()
    }

    /// Compressed over original byte count; `1.0` for an empty original.
    pub fn compression_ratio(&self) -> f64 {
        if self.original_data.is_empty() {
            return 1.0;
        }
        self.compressed_data.len() as f64 / self.original_data.len() as f64
    }

    pub fn formatted_original_size(&self) -> String {
        format_byte_count(self.original_data_size() as u64)
    }

    pub fn formatted_compressed_size(&self) -> String {
        format_byte_count(self.compressed_data_size() as u64)
    }
}

// =============================================================================
// Conversion results
// =============================================================================

/// Outcome of converting one image to another format.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionResult {
    pub original_name: String,
    #[serde(skip)]
    pub converted_data: Vec<u8>,
    pub original_size: usize,
    pub converted_size: usize,
}

impl ConversionResult {
    pub fn new(original_name: impl Into<String>, original_size: usize, converted_data: Vec<u8>) -> Self {
        Self {
            original_name: original_name.into(),
            original_size,
            converted_size: converted_data.len(),
            converted_data,
        }
    }

    /// Converted over original size; `0.0` when the original was empty.
    pub fn compression_ratio(&self) -> f64 {
        if self.original_size == 0 {
            return 0.0;
        }
        self.converted_size as f64 / self.original_size as f64
    }

    pub fn saved_percentage(&self) -> f64 {
        (1.0 - self.compression_ratio()) * 100.0
    }
}

/// Position within a batch, emitted before each item is processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionProgress {
    /// 1-indexed position of the item about to be processed.
    pub current: usize,
    pub total: usize,
    pub current_file_name: String,
}

impl ConversionProgress {
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.current as f64 / self.total as f64 * 100.0
    }
}

/// Byte totals over a finished batch.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ConversionSummary {
    pub count: usize,
    pub total_original_size: usize,
    pub total_converted_size: usize,
}

impl ConversionSummary {
    pub fn from_results(results: &[ConversionResult]) -> Self {
        results.iter().fold(Self::default(), |acc, r| Self {
            count: acc.count + 1,
            total_original_size: acc.total_original_size + r.original_size,
            total_converted_size: acc.total_converted_size + r.converted_size,
        })
    }

    pub fn saved_percentage(&self) -> f64 {
        if self.total_original_size == 0 {
            return 0.0;
        }
        (1.0 - self.total_converted_size as f64 / self.total_original_size as f64) * 100.0
    }
}

/// File-style byte count using decimal units: `"512 bytes"`, `"34 KB"`, `"5.2 MB"`.
pub fn format_byte_count(bytes: u64) -> String {
    const KB: f64 = 1_000.0;
    const MB: f64 = 1_000_000.0;
    const GB: f64 = 1_000_000_000.0;

    let b = bytes as f64;
    if bytes == 0 {
        "Zero KB".to_string()
    } else if b < KB {
        format!("{bytes} bytes")
    } else if b < MB {
        format!("{:.0} KB", b / KB)
    } else if b < GB {
        format!("{:.1} MB", b / MB)
    } else {
        format!("{:.2} GB", b / GB)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_clamps_negative_components() {
        let size = ImageSize::new(-10.0, 20.0);
        assert_eq!(size.width(), 0.0);
        assert_eq!(size.height(), 20.0);
    }

    #[test]
    fn size_scale_factor_table() {
        assert_eq!(ImageSize::scale_factor(0), 1.0);
        assert_eq!(ImageSize::scale_factor(1), 0.75);
        assert_eq!(ImageSize::scale_factor(2), 0.5);
        assert_eq!(ImageSize::scale_factor(3), 0.25);
        assert_eq!(ImageSize::scale_factor(99), 1.0);
        assert_eq!(ImageSize::scale_factor(-1), 1.0);
    }

    #[test]
    fn size_scaled_multiplies_both_dimensions() {
        let size = ImageSize::new(4000.0, 3000.0).scaled(ImageSize::scale_factor(2));
        assert_eq!(size, ImageSize::new(2000.0, 1500.0));
    }

    #[test]
    fn size_aspect_ratio_and_display() {
        assert_eq!(ImageSize::new(400.0, 200.0).aspect_ratio(), 2.0);
        assert_eq!(ImageSize::new(400.0, 0.0).aspect_ratio(), 0.0);
        assert_eq!(ImageSize::new(1999.7, 1500.0).to_string(), "1999 x 1500");
    }

    #[test]
    fn quality_from_level_skips_high() {
        assert_eq!(ImageQuality::from_level(0), ImageQuality::Original);
        assert_eq!(ImageQuality::from_level(1), ImageQuality::Normal);
        assert_eq!(ImageQuality::from_level(2), ImageQuality::Low);
        assert_eq!(ImageQuality::from_level(3), ImageQuality::Minimum);
        assert_eq!(ImageQuality::from_level(99), ImageQuality::Original);
    }

    #[test]
    fn quality_factors_are_ordered() {
        let factors: Vec<f64> = ImageQuality::ALL.iter().map(|q| q.factor()).collect();
        assert_eq!(factors, vec![1.0, 0.8, 0.5, 0.3, 0.1]);
        assert!(ImageQuality::Original < ImageQuality::Minimum);
    }

    #[test]
    fn quality_from_factor_picks_nearest_tier() {
        assert_eq!(ImageQuality::from_factor(0.95), ImageQuality::Original);
        assert_eq!(ImageQuality::from_factor(0.7), ImageQuality::High);
        assert_eq!(ImageQuality::from_factor(0.45), ImageQuality::Normal);
        assert_eq!(ImageQuality::from_factor(0.25), ImageQuality::Low);
        assert_eq!(ImageQuality::from_factor(0.0), ImageQuality::Minimum);
    }

    #[test]
    fn quality_from_stored_defaults_to_original() {
        assert_eq!(ImageQuality::from_stored(0.3), ImageQuality::Low);
        assert_eq!(ImageQuality::from_stored(0.0), ImageQuality::Original);
        assert_eq!(ImageQuality::from_stored(0.42), ImageQuality::Original);
    }

    #[test]
    fn quality_parses_names() {
        assert_eq!("High".parse::<ImageQuality>().unwrap(), ImageQuality::High);
        assert!("best".parse::<ImageQuality>().is_err());
    }

    #[test]
    fn format_extension_and_mime() {
        assert_eq!(ImageFormat::Jpeg.extension(), "jpeg");
        assert_eq!(ImageFormat::Png.mime_type(), "image/png");
    }

    #[test]
    fn format_from_stored_defaults_to_jpeg() {
        assert_eq!(ImageFormat::from_stored(Some("png")), ImageFormat::Png);
        assert_eq!(ImageFormat::from_stored(Some("gif")), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::from_stored(None), ImageFormat::Jpeg);
    }

    #[test]
    fn format_strict_parse_rejects_unknown() {
        assert_eq!("JPG".parse::<ImageFormat>().unwrap(), ImageFormat::Jpeg);
        assert_eq!(
            "webp".parse::<ImageFormat>(),
            Err(ConversionError::UnsupportedFormat("webp".into()))
        );
    }

    #[test]
    fn format_serde_falls_back_on_unknown_value() {
        let f: ImageFormat = serde_json::from_str("\"tiff\"").unwrap();
        assert_eq!(f, ImageFormat::Jpeg);
        assert_eq!(serde_json::to_string(&ImageFormat::Png).unwrap(), "\"png\"");
    }

    fn sample_image(original: Vec<u8>) -> CompressedImage {
        CompressedImage::new(
            "IMG_0001.jpg",
            original,
            ImageMetadata::default(),
            ImageSize::new(40.0, 30.0),
            ImageFormat::Jpeg,
        )
    }

    #[test]
    fn compressed_image_starts_as_copy_of_original() {
        let image = sample_image(vec![1, 2, 3, 4]);
        assert_eq!(image.compressed_data(), image.original_data());
        assert_eq!(image.quality(), ImageQuality::Original);
        assert_eq!(image.compression_ratio(), 1.0);
    }

    #[test]
    fn compressed_image_ratio_guards_empty_original() {
        let image = sample_image(Vec::new());
        assert_eq!(image.compression_ratio(), 1.0);
    }

    #[test]
    fn rendition_keeps_identity_and_original() {
        let image = sample_image(vec![0; 100]);
        let smaller = image.with_rendition(
            vec![0; 25],
            ImageQuality::Low,
            ImageSize::new(20.0, 15.0),
            ImageFormat::Png,
        );
        assert_eq!(smaller.id(), image.id());
        assert_eq!(smaller.original_data(), image.original_data());
        assert_eq!(smaller.compression_ratio(), 0.25);
        assert_eq!(smaller.format(), ImageFormat::Png);
        // The source snapshot is untouched.
        assert_eq!(image.compressed_data_size(), 100);
    }

    #[test]
    fn conversion_result_ratios() {
        let result = ConversionResult::new("a.heic", 200, vec![0; 50]);
        assert_eq!(result.converted_size, 50);
        assert_eq!(result.compression_ratio(), 0.25);
        assert_eq!(result.saved_percentage(), 75.0);

        let empty = ConversionResult::new("b.heic", 0, vec![0; 10]);
        assert_eq!(empty.compression_ratio(), 0.0);
    }

    #[test]
    fn progress_percentage() {
        let progress = ConversionProgress {
            current: 1,
            total: 4,
            current_file_name: "a".into(),
        };
        assert_eq!(progress.percentage(), 25.0);

        let empty = ConversionProgress {
            current: 0,
            total: 0,
            current_file_name: String::new(),
        };
        assert_eq!(empty.percentage(), 0.0);
    }

    #[test]
    fn summary_totals() {
        let results = vec![
            ConversionResult::new("a", 100, vec![0; 40]),
            ConversionResult::new("b", 300, vec![0; 60]),
        ];
        let summary = ConversionSummary::from_results(&results);
        assert_eq!(summary.count, 2);
        assert_eq!(summary.total_original_size, 400);
        assert_eq!(summary.total_converted_size, 100);
        assert_eq!(summary.saved_percentage(), 75.0);
    }

    #[test]
    fn byte_count_formatting() {
        assert_eq!(format_byte_count(0), "Zero KB");
        assert_eq!(format_byte_count(512), "512 bytes");
        assert_eq!(format_byte_count(34_400), "34 KB");
        assert_eq!(format_byte_count(5_200_000), "5.2 MB");
    }
}
