//! CLI output formatting.
//!
//! Every processed image is shown the same way across commands: a header
//! with its 1-based position and file name, then indented detail lines.
//!
//! ```text
//! 001 IMG_0001.jpg
//!     Size: 4032 x 3024 → 2016 x 1512
//!     Quality: normal (jpeg)
//!     Bytes: 3.1 MB → 412 KB (87% saved)
//! ```
//!
//! Conversion prints progress before each item and a summary at the end:
//!
//! ```text
//! [001/003] IMG_0001.heic
//! [002/003] IMG_0002.heic
//! [003/003] IMG_0003.heic
//! 001 IMG_0001.heic
//!     Bytes: 2.4 MB → 1.9 MB (21% saved)
//! ...
//! Converted 3 images: 7.2 MB → 5.6 MB (22% saved)
//! ```
//!
//! Format functions return `Vec<String>` or `String` and do no I/O.

use crate::types::{
    CompressedImage, ConversionProgress, ConversionResult, ConversionSummary, ImageSize,
    format_byte_count,
};
use serde::Serialize;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// ```text
/// 001 IMG_0001.jpg
/// ```
fn entity_header(index: usize, name: &str) -> String {
    format!("{} {}", format_index(index), name)
}

/// `"3.1 MB → 412 KB (87% saved)"`. Growth shows as a negative saving.
fn byte_change(original: usize, result: usize) -> String {
    let saved = if original == 0 {
        0.0
    } else {
        (1.0 - result as f64 / original as f64) * 100.0
    };
    format!(
        "{} → {} ({:.0}% saved)",
        format_byte_count(original as u64),
        format_byte_count(result as u64),
        saved
    )
}

// ============================================================================
// Compress
// ============================================================================

/// Outcome of one image in a `compress` run, sent to the printer thread.
#[derive(Debug)]
pub enum CompressEvent {
    Saved {
        index: usize,
        native: ImageSize,
        image: CompressedImage,
    },
    Failed {
        index: usize,
        name: String,
        error: String,
    },
}

pub fn format_compress_event(event: &CompressEvent) -> Vec<String> {
    match event {
        CompressEvent::Saved {
            index,
            native,
            image,
        } => format_compressed(*index, *native, image),
        CompressEvent::Failed { index, name, error } => vec![
            entity_header(*index, name),
            format!("{}Error: {}", indent(1), error),
        ],
    }
}

pub fn format_compressed(index: usize, native: ImageSize, image: &CompressedImage) -> Vec<String> {
    let size = if native == image.size() {
        format!("{}Size: {}", indent(1), native)
    } else {
        format!("{}Size: {} → {}", indent(1), native, image.size())
    };
    vec![
        entity_header(index, image.name()),
        size,
        format!("{}Quality: {} ({})", indent(1), image.quality(), image.format()),
        format!(
            "{}Bytes: {}",
            indent(1),
            byte_change(image.original_data_size(), image.compressed_data_size())
        ),
    ]
}

// ============================================================================
// Convert
// ============================================================================

/// ```text
/// [002/003] IMG_0002.heic
/// ```
pub fn format_progress(progress: &ConversionProgress) -> String {
    format!(
        "[{}/{}] {}",
        format_index(progress.current),
        format_index(progress.total),
        progress.current_file_name
    )
}

pub fn format_conversion_result(index: usize, result: &ConversionResult) -> Vec<String> {
    vec![
        entity_header(index, &result.original_name),
        format!(
            "{}Bytes: {}",
            indent(1),
            byte_change(result.original_size, result.converted_size)
        ),
    ]
}

pub fn format_summary(summary: &ConversionSummary) -> String {
    let noun = if summary.count == 1 { "image" } else { "images" };
    format!(
        "Converted {} {}: {}",
        summary.count,
        noun,
        byte_change(summary.total_original_size, summary.total_converted_size)
    )
}

// ============================================================================
// Info
// ============================================================================

/// What `info` reports about one input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageInfo {
    pub name: String,
    /// Container type identifier, `None` when unrecognized.
    pub container: Option<String>,
    pub heic: bool,
    pub size: Option<ImageSize>,
    pub bytes: usize,
}

pub fn format_info(index: usize, info: &ImageInfo) -> Vec<String> {
    let size = info
        .size
        .map_or_else(|| "undecodable".to_string(), |s| s.to_string());
    vec![
        entity_header(index, &info.name),
        format!(
            "{}Type: {}{}",
            indent(1),
            info.container.as_deref().unwrap_or("unknown"),
            if info.heic { " (HEIC)" } else { "" }
        ),
        format!("{}Size: {}", indent(1), size),
        format!(
            "{}Bytes: {}",
            indent(1),
            format_byte_count(info.bytes as u64)
        ),
    ]
}

pub fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}
