//! Image processing behind a single codec seam.
//!
//! | Operation | Module / function |
//! |---|---|
//! | **HEIC detection** | [`sniff::is_heic`]: `ftyp` brand, codec probe fallback |
//! | **Compress** | [`transcode::compress`]: decode → exact resize → JPEG (→ PNG) |
//! | **Convert** | [`transcode::convert`]: decode → encode, no resize |
//! | **Strip metadata** | [`strip::remove_metadata`]: same-container copy |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Codec-level quality scale
//! - **Codec**: [`Codec`] trait + [`RustCodec`]
//! - **Operations**: `sniff`, `transcode`, `strip`, free functions over any codec

mod calculations;
pub mod codec;
#[cfg(feature = "heic")]
mod heic;
mod params;
pub mod rust_codec;
pub mod sniff;
pub mod strip;
pub mod transcode;

pub use calculations::{MAX_PIXELS, level_target, pixel_dimensions};
pub use codec::{Codec, CodecError, ContainerType, DecodedImage};
pub use params::Quality;
pub use rust_codec::RustCodec;
pub use sniff::is_heic;
pub use strip::remove_metadata;
pub use transcode::{compress, convert, get_image_size};
