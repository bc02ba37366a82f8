//! HEIC/HEIF detection from raw bytes.
//!
//! Two paths, cheapest first:
//!
//! 1. **Signature**: an ISOBMFF file starts with an `ftyp` box whose major
//!    brand sits at bytes 8..12. When the `ftyp` tag is present, the brand
//!    alone decides.
//! 2. **Probe**: buffers too short for the signature, or without an `ftyp`
//!    box, are handed to the codec's container introspection.

use super::codec::{Codec, ContainerType};

/// Major brands accepted by the signature path.
///
/// `mif1` is only the generic HEIF structural brand, so an AVIF file that
/// declares `mif1` as its major brand still passes [`signature_match`].
/// The codec's container type looks at the compatible brands as well and
/// reports such a file as AVIF, which the pipeline can't decode.
pub const HEIC_BRANDS: [[u8; 4]; 3] = [*b"heic", *b"heix", *b"mif1"];

/// Brands that identify HEVC-coded HEIF content.
const HEVC_BRANDS: [[u8; 4]; 6] = [*b"heic", *b"heix", *b"heim", *b"heis", *b"hevc", *b"hevx"];
const AVIF_BRANDS: [[u8; 4]; 2] = [*b"avif", *b"avis"];
/// Structural brands that only say "this is HEIF"; the codec comes from the
/// compatible-brand list.
const GENERIC_HEIF_BRANDS: [[u8; 4]; 3] = [*b"mif1", *b"msf1", *b"heif"];

fn ftyp_major_brand(data: &[u8]) -> Option<[u8; 4]> {
    if data.len() < 12 || &data[4..8] != b"ftyp" {
        return None;
    }
    let mut brand = [0u8; 4];
    brand.copy_from_slice(&data[8..12]);
    Some(brand)
}

/// Compatible brands of the leading `ftyp` box, bounded by the declared box
/// size and the buffer length.
fn ftyp_compatible_brands(data: &[u8]) -> impl Iterator<Item = [u8; 4]> + '_ {
    let declared = data
        .get(0..4)
        .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]) as usize)
        .unwrap_or(0);
    let end = declared.min(data.len());
    let brands = data.get(16..end).unwrap_or(&[]);
    brands.chunks_exact(4).map(|c| [c[0], c[1], c[2], c[3]])
}

/// Signature check: `Some(true|false)` when an `ftyp` box is present,
/// `None` when the buffer is inconclusive.
pub fn signature_match(data: &[u8]) -> Option<bool> {
    ftyp_major_brand(data).map(|brand| HEIC_BRANDS.contains(&brand))
}

/// Ask the codec for the container type and accept HEIC/HEIF.
pub fn probe(codec: &impl Codec, data: &[u8]) -> bool {
    codec
        .container_type(data)
        .is_some_and(|container| container.is_heif_family())
}

/// Whether `data` is HEIC/HEIF. Never fails: unreadable input is `false`.
pub fn is_heic(codec: &impl Codec, data: &[u8]) -> bool {
    match signature_match(data) {
        Some(result) => result,
        None => probe(codec, data),
    }
}

/// Classify an ISOBMFF image container from its `ftyp` box.
///
/// Returns `None` for non-ISOBMFF data and for ISOBMFF brands that are not
/// still-image formats (e.g. plain MP4).
pub(crate) fn isobmff_container(data: &[u8]) -> Option<ContainerType> {
    let major = ftyp_major_brand(data)?;
    if HEVC_BRANDS.contains(&major) {
        return Some(ContainerType::Heic);
    }
    if AVIF_BRANDS.contains(&major) {
        return Some(ContainerType::Avif);
    }
    if !GENERIC_HEIF_BRANDS.contains(&major) {
        return None;
    }

    let mut container = ContainerType::Heif;
    for brand in ftyp_compatible_brands(data) {
        if HEVC_BRANDS.contains(&brand) {
            return Some(ContainerType::Heic);
        }
        if AVIF_BRANDS.contains(&brand) {
            container = ContainerType::Avif;
        }
    }
    Some(container)
}
