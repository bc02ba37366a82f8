//! HEIC decode and conversion through libheif.
//!
//! Only built with `--features heic`. Inputs are encoded in memory with
//! libheif's HEVC encoder, so the system libheif needs an encoder plugin.

#![cfg(feature = "heic")]

use imgcompress::batch::BatchItem;
use imgcompress::gateway::DirectoryGateway;
use imgcompress::imaging::{Codec, ContainerType, RustCodec, sniff};
use imgcompress::pipeline::{OutputSettings, Pipeline};
use imgcompress::types::{ImageFormat, ImageQuality, ImageSize};
use libheif_rs::{
    Channel, ColorSpace, CompressionFormat, EncoderQuality, HeifContext, Image, LibHeif, RgbChroma,
};
use tempfile::TempDir;

fn create_test_heic(width: u32, height: u32) -> Vec<u8> {
    let mut image = Image::new(width, height, ColorSpace::Rgb(RgbChroma::Rgb)).unwrap();
    image
        .create_plane(Channel::Interleaved, width, height, 8)
        .unwrap();
    let plane = image.planes_mut().interleaved.unwrap();
    let stride = plane.stride;
    for y in 0..height as usize {
        for x in 0..width as usize {
            let px = y * stride + x * 3;
            plane.data[px] = (x * 3 % 256) as u8;
            plane.data[px + 1] = (y * 5 % 256) as u8;
            plane.data[px + 2] = ((x + y) % 256) as u8;
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

fn pipeline_in(tmp: &TempDir) -> Pipeline<RustCodec, DirectoryGateway> {
    Pipeline::new(
        RustCodec::new(),
        DirectoryGateway::new(tmp.path().join("out")),
        OutputSettings::default(),
    )
}

#[test]
fn encoded_heic_is_detected_and_decodes() {
    let codec = RustCodec::new();
    let data = create_test_heic(64, 48);

    assert_eq!(sniff::signature_match(&data), Some(true));
    assert!(sniff::is_heic(&codec, &data));
    assert_eq!(codec.container_type(&data), Some(ContainerType::Heic));

    let image = codec.decode(&data).unwrap();
    assert_eq!((image.width(), image.height()), (64, 48));
}

#[test]
fn convert_heic_to_jpeg_and_png() {
    let tmp = TempDir::new().unwrap();
    let p = pipeline_in(&tmp);
    let data = create_test_heic(64, 48);

    for (to, container) in [
        (ImageFormat::Jpeg, ContainerType::Jpeg),
        (ImageFormat::Png, ContainerType::Png),
    ] {
        let result = p
            .convert(&data, "IMG_0001.heic", to, ImageQuality::High)
            .unwrap();
        assert_eq!(result.original_name, "IMG_0001.heic");
        assert_eq!(result.original_size, data.len());
        assert!(result.converted_size > 0);
        assert_eq!(
            p.codec().container_type(&result.converted_data),
            Some(container)
        );
        assert_eq!(
            p.get_image_size(&result.converted_data),
            Some(ImageSize::new(64.0, 48.0))
        );
    }
}

#[test]
fn batch_of_three_heic_converts_in_order() {
    let tmp = TempDir::new().unwrap();
    let p = pipeline_in(&tmp);
    let items: Vec<BatchItem> = (1..=3)
        .map(|i| BatchItem::new(format!("IMG_{i:04}.heic"), create_test_heic(32 + 16 * i, 32)))
        .collect();

    let mut currents = Vec::new();
    let results = p
        .convert_batch(items, ImageFormat::Jpeg, ImageQuality::High)
        .wait(|progress| currents.push((progress.current, progress.total)))
        .unwrap();

    assert_eq!(currents, vec![(1, 3), (2, 3), (3, 3)]);
    let names: Vec<&str> = results.iter().map(|r| r.original_name.as_str()).collect();
    assert_eq!(names, vec!["IMG_0001.heic", "IMG_0002.heic", "IMG_0003.heic"]);
    for (i, result) in results.iter().enumerate() {
        assert!(result.converted_size > 0);
        let width = 32.0 + 16.0 * (i as f64 + 1.0);
        assert_eq!(
            p.get_image_size(&result.converted_data),
            Some(ImageSize::new(width, 32.0))
        );
    }
    assert_eq!(p.save_converted_images(&results), Ok(3));
}
