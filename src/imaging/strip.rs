//! Metadata removal by same-container copy.

use super::codec::Codec;
use tracing::debug;

/// Copy the primary image of `data` into a fresh container of the same type
/// with no property dictionaries attached.
///
/// Returns `None` when the container type can't be detected or the codec
/// can't write a metadata-free copy of that type. The output container type
/// always matches the input.
pub fn remove_metadata(codec: &impl Codec, data: &[u8]) -> Option<Vec<u8>> {
    let Some(container) = codec.container_type(data) else {
        debug!(bytes = data.len(), "remove_metadata: unknown container");
        return None;
    };
    match codec.copy_image_only(data, &container) {
        Ok(stripped) => Some(stripped),
        Err(e) => {
            debug!(error = %e, %container, "remove_metadata: copy failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::codec::ContainerType;
    use crate::imaging::codec::tests::{MockCodec, RecordedOp};

    #[test]
    fn copies_into_detected_container() {
        let codec = MockCodec::with_container(Some(ContainerType::Png));
        let out = remove_metadata(&codec, b"png bytes").unwrap();
        assert_eq!(out, b"png bytes");
        assert_eq!(
            codec.get_operations(),
            vec![
                RecordedOp::ContainerType,
                RecordedOp::CopyImageOnly {
                    into: ContainerType::Png
                }
            ]
        );
    }

    #[test]
    fn unknown_container_is_none() {
        let codec = MockCodec::with_container(None);
        assert_eq!(remove_metadata(&codec, b"???"), None);
        assert_eq!(codec.get_operations(), vec![RecordedOp::ContainerType]);
    }

    #[test]
    fn copy_failure_is_none() {
        let codec = MockCodec::new();
        assert_eq!(remove_metadata(&codec, b"BAD data"), None);
    }
}
