//! Pass-through image metadata.
//!
//! The pipeline never reads or interprets these values; they travel with a
//! [`CompressedImage`](crate::types::CompressedImage) so the caller can show
//! or persist them next to the compressed bytes.
//!
//! Properties are keyed by a closed set of well-known tags ([`MetadataKey`]).
//! Tags outside that set are kept as opaque bytes under their original name
//! in [`ImageMetadata::unrecognized`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Well-known EXIF-style tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataKey {
    Make,
    Model,
    LensModel,
    Software,
    Orientation,
    DateTimeOriginal,
    ExposureTime,
    FNumber,
    Iso,
    FocalLength,
    GpsLatitude,
    GpsLongitude,
    GpsAltitude,
    PixelWidth,
    PixelHeight,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Integer(i64),
    Real(f64),
    Text(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<MetadataKey, MetadataValue>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub unrecognized: BTreeMap<String, Vec<u8>>,
}

impl ImageMetadata {
    pub fn with_created_at(created_at: DateTime<Utc>) -> Self {
        Self {
            created_at: Some(created_at),
            ..Self::default()
        }
    }

    pub fn get(&self, key: MetadataKey) -> Option<&MetadataValue> {
        self.properties.get(&key)
    }

    pub fn insert(&mut self, key: MetadataKey, value: MetadataValue) {
        self.properties.insert(key, value);
    }

    pub fn insert_unrecognized(&mut self, tag: impl Into<String>, raw: Vec<u8>) {
        self.unrecognized.insert(tag.into(), raw);
    }

    pub fn is_empty(&self) -> bool {
        self.created_at.is_none() && self.properties.is_empty() && self.unrecognized.is_empty()
    }
}
