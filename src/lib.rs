//! # imgcompress
//!
//! Photo compression, resizing and HEIC → JPEG/PNG conversion.
//!
//! Callers hand the pipeline encoded bytes plus a desired quality tier, size
//! and format, and get back re-encoded bytes ready to save. Pixel work is
//! delegated to a [`Codec`](imaging::Codec); persistence to a
//! [`SaveGateway`](gateway::SaveGateway). Both are injected, so the whole
//! pipeline runs against mocks in tests.
//!
//! # Data Flow
//!
//! ```text
//! bytes ─▶ sniff (HEIC?) ─▶ transcode (decode → resize → encode) ─▶ CompressedImage
//!                                                                    │
//!                                  strip metadata ◀──────── save ◀───┘
//!                                        │
//!                                        ▼
//!                                   SaveGateway
//!
//! HEIC batch ─▶ worker thread (sequential convert) ─▶ BatchEvent channel ─▶ caller
//!                                                          │
//!                         save_converted_images (rayon) ◀──┘
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`pipeline`] | The [`Pipeline`](pipeline::Pipeline) facade: single-image operations, conversion, batch save |
//! | [`batch`] | Background batch conversion with progress events and cancellation |
//! | [`imaging`] | Codec seam, `image`-crate codec, HEIC sniffing, transcoding, metadata stripping |
//! | [`gateway`] | Persistence seam and the content-addressed directory writer |
//! | [`config`] | `imgcompress.toml` loading, validation and merging over stock defaults |
//! | [`types`] | Value types: sizes, quality tiers, formats, compressed images, conversion results |
//! | [`metadata`] | Typed pass-through metadata bag |
//! | [`error`] | Processing and conversion error kinds |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Quality Tiers, Not Numbers
//!
//! Users pick from five tiers (original, high, normal, low, minimum) instead
//! of a 1-100 scale. Each tier maps to a fixed encoder factor. `original` is
//! special: at the native size it returns the input bytes untouched, and when
//! a resize forces a re-encode it uses 0.8.
//!
//! ## PNG Through JPEG
//!
//! PNG is lossless, so a quality setting alone can't make it smaller. PNG
//! output is produced by encoding JPEG at the tier's factor, decoding that,
//! and writing the result as PNG.
//!
//! ## Lossless Metadata Removal
//!
//! Stripping EXIF/GPS/IPTC rewrites container segments with `img-parts`
//! instead of re-encoding, so saving never costs another generation of JPEG
//! loss.
//! A non-identity EXIF orientation survives as the only remaining tag, since
//! the stored pixels are still unrotated.

pub mod batch;
pub mod config;
pub mod error;
pub mod gateway;
pub mod imaging;
pub mod metadata;
pub mod output;
pub mod pipeline;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
