//! I/O helpers for input photographs and JSON reports.
//!
//! - `load_rgb_image`: decode a PNG/JPEG into an owned 8-bit RGB buffer.
//! - `write_json_file`: pretty-print a serializable value to disk.
use crate::error::EstimateError;
use image::RgbImage;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Decode an image from disk, converting any channel layout to 8-bit RGB.
pub fn load_rgb_image(path: &Path) -> Result<RgbImage, EstimateError> {
    let img = image::open(path).map_err(|source| EstimateError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(img.into_rgb8())
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize JSON for {}: {e}", path.display()))?;
    fs::write(path, json).map_err(|e| format!("Failed to write JSON {}: {e}", path.display()))
}

fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}
