//! Persistence seam for finished images.
//!
//! The pipeline hands encoded bytes to a [`SaveGateway`] and only cares
//! whether the save succeeded. [`DirectoryGateway`] is the file-system
//! implementation used by the CLI.

use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::types::ImageFormat;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Save rejected: {0}")]
    Rejected(String),
}

/// Destination for encoded image bytes (photo library, directory, ...).
///
/// `Send + Sync` so saves can fan out over the rayon pool.
pub trait SaveGateway: Send + Sync {
    fn save(&self, data: &[u8]) -> Result<(), GatewayError>;
}

/// Length of the hex digest prefix used for file names.
const NAME_HASH_LEN: usize = 16;

/// Writes each image into one directory as `<sha256 prefix>.<ext>`.
///
/// Names are content-addressed: concurrent saves of different images never
/// collide and saving identical bytes twice overwrites the same file.
#[derive(Debug, Clone)]
pub struct DirectoryGateway {
    dir: PathBuf,
}

impl DirectoryGateway {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path `data` is (or would be) saved under.
    pub fn path_for(&self, data: &[u8]) -> PathBuf {
        let digest = format!("{:x}", Sha256::digest(data));
        self.dir
            .join(format!("{}.{}", &digest[..NAME_HASH_LEN], extension_for(data)))
    }
}

/// File extension from the encoded bytes' magic number.
fn extension_for(data: &[u8]) -> &'static str {
    match image::guess_format(data) {
        Ok(image::ImageFormat::Jpeg) => ImageFormat::Jpeg.extension(),
        Ok(image::ImageFormat::Png) => ImageFormat::Png.extension(),
        Ok(other) => other.extensions_str().first().copied().unwrap_or("bin"),
        Err(_) => "bin",
    }
}

impl SaveGateway for DirectoryGateway {
    fn save(&self, data: &[u8]) -> Result<(), GatewayError> {
        if data.is_empty() {
            return Err(GatewayError::Rejected("empty image data".into()));
        }
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(data);
        fs::write(&path, data)?;
        debug!(path = %path.display(), bytes = data.len(), "saved image");
        Ok(())
    }
}
