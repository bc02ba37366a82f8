//! Application configuration.
//!
//! Handles loading, validating, and merging `imgcompress.toml`. Stock defaults
//! are serialized to a TOML table and the user file is merged over it, so a
//! config file only needs the keys it wants to change.
//!
//! ## Config File Location
//!
//! `imgcompress.toml` in the working directory, or any file passed with
//! `--config PATH`. A missing default file is not an error; a missing
//! explicit file is.
//!
//! ## Configuration Options
//!
//! ```toml
//! # Every key may be omitted; the values below are the defaults
//!
//! [output]
//! format = "jpeg"           # jpeg | png (unknown values fall back to jpeg)
//! quality = "original"      # original | high | normal | low | minimum
//! strip_metadata = true     # Remove EXIF/GPS/IPTC before saving
//! directory = "compressed"  # Where saved images are written
//!
//! [conversion]
//! format = "jpeg"           # Target format for HEIC conversion
//! quality = "high"
//! max_items = 50            # Largest accepted conversion batch
//!
//! [processing]
//! max_processes = 4         # Max parallel save workers (omit for auto = CPU cores)
//! ```
//!
//! A key or section the config doesn't know is a parse error.

use crate::types::{ImageFormat, ImageQuality};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "imgcompress.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `imgcompress.toml`.
///
/// All fields have defaults. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Compress / save settings.
    pub output: OutputConfig,
    /// HEIC conversion settings.
    pub conversion: ConversionConfig,
    /// Worker pool sizing.
    pub processing: ProcessingConfig,
}

impl AppConfig {
    /// Reject values the pipeline can't run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.conversion.max_items == 0 {
            return Err(ConfigError::Validation(
                "conversion.max_items must be greater than 0".into(),
            ));
        }
        if self.output.directory.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "output.directory must not be empty".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub format: ImageFormat,
    pub quality: ImageQuality,
    pub strip_metadata: bool,
    pub directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: ImageFormat::Jpeg,
            quality: ImageQuality::Original,
            strip_metadata: true,
            directory: PathBuf::from("compressed"),
        }
    }
}

/// Settings for HEIC → JPEG/PNG conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConversionConfig {
    pub format: ImageFormat,
    pub quality: ImageQuality,
    /// Largest number of inputs one conversion run accepts.
    pub max_items: usize,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            format: ImageFormat::Jpeg,
            quality: ImageQuality::High,
            max_items: 50,
        }
    }
}

/// Worker pool sizing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel workers.
    /// When absent, defaults to the number of CPU cores.
    /// Clamped to the core count.
    pub max_processes: Option<usize>,
}

/// Worker count for the rayon pool: `max_processes` if set, never more
/// than the available cores.
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

/// Stock defaults as a TOML table, the base layer for merging.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(AppConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` into `base`. Tables merge key by key; any
/// other overlay value replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value. `Ok(None)` when it doesn't exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay over `base`, deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<AppConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: AppConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the effective config.
///
/// With `explicit`, that file must exist. Without it, `imgcompress.toml` in
/// the working directory is used when present.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let overlay = match explicit {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            Some(toml::from_str(&content)?)
        }
        None => load_raw_config(Path::new(DEFAULT_CONFIG_FILE))?,
    };
    resolve_config(stock_defaults_value(), overlay)
}

/// A documented `imgcompress.toml` with every option at its default.
pub fn stock_config_toml() -> &'static str {
    r##"# imgcompress Configuration
# =========================
# Every key is optional and shown at its default; delete what you
# don't change. Read from ./imgcompress.toml or --config PATH.
# Misspelled keys are reported as errors.

# ---------------------------------------------------------------------------
# Compression and saving
# ---------------------------------------------------------------------------
[output]
# Output container: "jpeg" or "png". Unknown values fall back to jpeg.
# PNG output is produced through a JPEG pass, so quality still applies.
format = "jpeg"

# Quality tier: original, high, normal, low, minimum.
# "original" keeps the source bytes when the size is unchanged.
quality = "original"

# Remove EXIF, GPS, IPTC and comment metadata before saving.
strip_metadata = true

# Directory that saved images are written to.
directory = "compressed"

# ---------------------------------------------------------------------------
# HEIC conversion
# ---------------------------------------------------------------------------
[conversion]
format = "jpeg"
quality = "high"

# Largest number of images accepted in one conversion run.
max_items = 50

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel save / compress workers.
# Leave unset to use one worker per CPU core.
# max_processes = 4
"##
}
