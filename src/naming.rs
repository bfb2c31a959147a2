//! Default descriptions for newly imported pictures.
//!
//! A fresh import has no human-written description yet, so the filename
//! stands in: `042-Lake-Zurich.jpg` imports as "Lake Zurich",
//! `IMG_0042.jpg` as "IMG 0042". A numeric ordering prefix (`NNN-`) is
//! dropped — it orders files on disk and says nothing about the picture —
//! and dashes/underscores read as spaces.

use std::path::Path;

/// Derives a display description from a picture's filename.
pub fn description_from_filename(path: &Path) -> String {
    let stem = match path.file_stem().and_then(|s| s.to_str()) {
        Some(stem) => stem,
        None => return path.display().to_string(),
    };
    let without_prefix = match stem.split_once('-') {
        Some((prefix, rest)) if prefix.parse::<u32>().is_ok() && !rest.is_empty() => rest,
        _ => stem,
    };
    without_prefix.replace(['-', '_'], " ")
}
