//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

use crate::types::ImageSize;

/// Largest raster area a resize may produce (100 megapixels).
pub const MAX_PIXELS: u64 = 100_000_000;

/// Whole-pixel dimensions for a target size.
///
/// Fractional components round to the nearest pixel. Returns `None` when
/// either side rounds to zero or the area exceeds [`MAX_PIXELS`].
///
/// # Examples
/// ```
/// # use imgcompress::imaging::pixel_dimensions;
/// # use imgcompress::types::ImageSize;
/// assert_eq!(pixel_dimensions(ImageSize::new(299.6, 150.2)), Some((300, 150)));
/// assert_eq!(pixel_dimensions(ImageSize::new(0.4, 150.0)), None);
/// ```
pub fn pixel_dimensions(size: ImageSize) -> Option<(u32, u32)> {
    let w = to_pixels(size.width())?;
    let h = to_pixels(size.height())?;
    if u64::from(w) * u64::from(h) > MAX_PIXELS {
        return None;
    }
    Some((w, h))
}

fn to_pixels(value: f64) -> Option<u32> {
    let rounded = value.round();
    if !rounded.is_finite() || rounded < 1.0 || rounded > u32::MAX as f64 {
        return None;
    }
    Some(rounded as u32)
}

/// Whether `target` is exactly the native pixel size of a decoded raster.
pub fn matches_native(target: ImageSize, width: u32, height: u32) -> bool {
    target == ImageSize::from_pixels(width, height)
}

/// Target size for a discrete size level relative to `native`.
pub fn level_target(native: ImageSize, level: i32) -> ImageSize {
    native.scaled(ImageSize::scale_factor(level))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_dimensions_rounds() {
        assert_eq!(
            pixel_dimensions(ImageSize::new(1999.5, 1500.0)),
            Some((2000, 1500))
        );
        assert_eq!(pixel_dimensions(ImageSize::new(1.0, 1.0)), Some((1, 1)));
    }

    #[test]
    fn pixel_dimensions_rejects_zero_area() {
        assert_eq!(pixel_dimensions(ImageSize::ZERO), None);
        assert_eq!(pixel_dimensions(ImageSize::new(100.0, 0.2)), None);
        assert_eq!(pixel_dimensions(ImageSize::new(f64::INFINITY, 10.0)), None);
    }

    #[test]
    fn pixel_dimensions_rejects_oversized_area() {
        assert_eq!(pixel_dimensions(ImageSize::new(80_000.0, 80_000.0)), None);
        assert_eq!(pixel_dimensions(ImageSize::new(10_000.0, 10_001.0)), None);
        assert_eq!(
            pixel_dimensions(ImageSize::new(10_000.0, 10_000.0)),
            Some((10_000, 10_000))
        );
        assert_eq!(pixel_dimensions(ImageSize::new(1.0, 100_000_000.0)), Some((1, 100_000_000)));
    }

    #[test]
    fn native_match_is_exact() {
        assert!(matches_native(ImageSize::new(400.0, 300.0), 400, 300));
        assert!(!matches_native(ImageSize::new(400.2, 300.0), 400, 300));
        assert!(!matches_native(ImageSize::new(300.0, 400.0), 400, 300));
    }

    #[test]
    fn level_targets() {
        let native = ImageSize::new(4000.0, 3000.0);
        assert_eq!(level_target(native, 0), native);
        assert_eq!(level_target(native, 1), ImageSize::new(3000.0, 2250.0));
        assert_eq!(level_target(native, 3), ImageSize::new(1000.0, 750.0));
        assert_eq!(level_target(native, 42), native);
    }
}
