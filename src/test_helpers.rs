//! Shared test utilities: synthetic encoded images.
//!
//! Everything is generated in memory so unit tests need no fixture files.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let jpeg = jpeg_bytes(200, 150);
//! let tagged = jpeg_with_exif(32, 24);     // carries an APP1 EXIF segment
//! let rotated = jpeg_with_orientation(40, 30, 6);
//! let heic = heic_header(*b"mif1", &[*b"heic"]);
//! ```

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage};
use img_parts::jpeg::Jpeg;
use img_parts::png::{Png, PngChunk};
use img_parts::{Bytes, ImageEXIF};
use std::io::Cursor;

/// Gradient test pattern; compresses like a photo rather than a flat fill.
fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    })
}

/// A baseline JPEG at quality 95.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = gradient(width, height);
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, 95)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = gradient(width, height);
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

/// Big-endian TIFF header with an empty IFD, padded like a small camera blob.
fn fake_exif_payload() -> Bytes {
    let mut tiff = b"MM\0\x2a\0\0\0\x08\0\0".to_vec();
    tiff.extend_from_slice(&[0u8; 256]);
    Bytes::from(tiff)
}

/// JPEG with an APP1 EXIF segment attached.
pub fn jpeg_with_exif(width: u32, height: u32) -> Vec<u8> {
    let mut jpeg = Jpeg::from_bytes(Bytes::from(jpeg_bytes(width, height))).unwrap();
    jpeg.set_exif(Some(fake_exif_payload()));
    jpeg.encoder().bytes().to_vec()
}

/// TIFF block with an orientation tag and a camera make.
pub fn exif_with_orientation(orientation: u16) -> Vec<u8> {
    let orientation = exif::Field {
        tag: exif::Tag::Orientation,
        ifd_num: exif::In::PRIMARY,
        value: exif::Value::Short(vec![orientation]),
    };
    let make = exif::Field {
        tag: exif::Tag::Make,
        ifd_num: exif::In::PRIMARY,
        value: exif::Value::Ascii(vec![b"Apple".to_vec()]),
    };
    let mut writer = exif::experimental::Writer::new();
    writer.push_field(&orientation);
    writer.push_field(&make);
    let mut buf = Cursor::new(Vec::new());
    writer.write(&mut buf, false).unwrap();
    buf.into_inner()
}

/// `width` x `height` stored pixels, displayed per `orientation`.
pub fn jpeg_with_orientation(width: u32, height: u32, orientation: u16) -> Vec<u8> {
    let mut jpeg = Jpeg::from_bytes(Bytes::from(jpeg_bytes(width, height))).unwrap();
    jpeg.set_exif(Some(Bytes::from(exif_with_orientation(orientation))));
    jpeg.encoder().bytes().to_vec()
}

pub fn png_with_orientation(width: u32, height: u32, orientation: u16) -> Vec<u8> {
    let mut png = Png::from_bytes(Bytes::from(png_bytes(width, height))).unwrap();
    png.set_exif(Some(Bytes::from(exif_with_orientation(orientation))));
    png.encoder().bytes().to_vec()
}

/// Fields of a raw TIFF block as (tag, first value) pairs.
pub fn exif_fields(tiff: &[u8]) -> Vec<(exif::Tag, Option<u32>)> {
    exif::Reader::new()
        .read_raw(tiff.to_vec())
        .unwrap()
        .fields()
        .map(|f| (f.tag, f.value.get_uint(0)))
        .collect()
}

/// PNG with a `tEXt` comment chunk before `IEND`.
pub fn png_with_text(width: u32, height: u32) -> Vec<u8> {
    let mut png = Png::from_bytes(Bytes::from(png_bytes(width, height))).unwrap();
    let chunks = png.chunks_mut();
    let iend = chunks.len() - 1;
    chunks.insert(
        iend,
        PngChunk::new(*b"tEXt", Bytes::from_static(b"Comment\0taken on holiday")),
    );
    png.encoder().bytes().to_vec()
}

/// Leading ISOBMFF `ftyp` box with the given major and compatible brands.
/// No image data follows.
pub fn heic_header(major: [u8; 4], compatible: &[[u8; 4]]) -> Vec<u8> {
    let size = 16 + 4 * compatible.len() as u32;
    let mut data = Vec::with_capacity(size as usize);
    data.extend_from_slice(&size.to_be_bytes());
    data.extend_from_slice(b"ftyp");
    data.extend_from_slice(&major);
    data.extend_from_slice(&[0, 0, 0, 0]);
    for brand in compatible {
        data.extend_from_slice(brand);
    }
    data
}

/// A real HEIC encoded by libheif (needs an HEVC encoder plugin).
#[cfg(feature = "heic")]
pub fn heic_bytes(width: u32, height: u32) -> Vec<u8> {
    use libheif_rs::{
        Channel, ColorSpace, CompressionFormat, EncoderQuality, HeifContext, Image, LibHeif,
        RgbChroma,
    };

    let mut image = Image::new(width, height, ColorSpace::Rgb(RgbChroma::Rgb)).unwrap();
    image
        .create_plane(Channel::Interleaved, width, height, 8)
        .unwrap();
    let plane = image.planes_mut().interleaved.unwrap();
    let stride = plane.stride;
    for y in 0..height as usize {
        for x in 0..width as usize {
            let px = y * stride + x * 3;
            plane.data[px] = (x * 4 % 256) as u8;
            plane.data[px + 1] = (y * 4 % 256) as u8;
            plane.data[px + 2] = 128;
        }
    }

    let lib_heif = LibHeif::new();
    let mut context = HeifContext::new().unwrap();
    let mut encoder = lib_heif
        .encoder_for_format(CompressionFormat::Hevc)
        .unwrap();
    encoder.set_quality(EncoderQuality::Lossy(80)).unwrap();
    context.encode_image(&image, &mut encoder, None).unwrap();
    context.write_to_bytes().unwrap()
}
