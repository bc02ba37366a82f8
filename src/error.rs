//! Error kinds surfaced by the pipeline.
//!
//! Two families mirror the two halves of the pipeline:
//!
//! - [`ProcessingError`]: compress / resize / metadata stripping of a single
//!   [`CompressedImage`](crate::types::CompressedImage).
//! - [`ConversionError`]: format conversion, batch conversion and batch save.
//!
//! Every variant is terminal for the operation that produced it. Nothing in
//! the crate retries; callers decide whether to run the whole operation again.

use crate::gateway::GatewayError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcessingError {
    #[error("Invalid image data")]
    InvalidImageData,
    #[error("Image resize failed")]
    ResizeFailed,
    #[error("Image compression failed")]
    CompressionFailed,
    #[error("Metadata removal failed")]
    MetadataRemovalFailed,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("Invalid image data")]
    InvalidImageData,
    #[error("Image conversion failed")]
    ConversionFailed,
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),
    #[error("Failed to save any image")]
    SaveFailed,
    #[error("Conversion cancelled")]
    Cancelled,
}

/// Errors from operations that span processing and persistence.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Processing(#[from] ProcessingError),
    #[error(transparent)]
    Conversion(#[from] ConversionError),
    #[error("Save failed: {0}")]
    Gateway(#[from] GatewayError),
}
