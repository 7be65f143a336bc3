use std::path::{Path, PathBuf};

use log::{debug, info};
use walkdir::WalkDir;

use crate::error::ScanError;

/// One JPEG queued for processing. Lives only for the duration of a batch.
#[derive(Debug, Clone)]
pub struct ImageRecord {
    pub path: PathBuf,
    pub filename: String,
}

/// Enumerates the JPEG images that make up one batch.
pub struct BatchScanner {
    input_directory: PathBuf,
}

impl BatchScanner {
    pub fn new<P: AsRef<Path>>(input_directory: P) -> Self {
        Self {
            input_directory: input_directory.as_ref().to_path_buf(),
        }
    }

    /// Lists the immediate children of the input folder whose names end in
    /// `.jpg` or `.jpeg` (case-insensitive), sorted by filename. The list
    /// is captured once per batch; files added mid-run are not picked up,
    /// and the `ready/` and `failed/` subdirectories are never descended
    /// into.
    pub fn scan(&self) -> Result<Vec<ImageRecord>, ScanError> {
        let mut records = Vec::new();

        for entry in WalkDir::new(&self.input_directory)
            .min_depth(1)
            .max_depth(1) // Only scan top level, not the outcome buckets
        {
            let entry = entry.map_err(|e| ScanError::ScanFailed {
                path: self.input_directory.clone(),
                source: e,
            })?;
            let path = entry.path();

            if path.is_dir() {
                continue;
            }

            let Some(filename) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !is_jpeg_name(filename) {
                continue;
            }

            debug!("Found image: {}", path.display());
            records.push(ImageRecord {
                path: path.to_path_buf(),
                filename: filename.to_string(),
            });
        }

        // Filesystem enumeration order is unspecified; sort so progress
        // output and tests are reproducible.
        records.sort_by(|a, b| a.filename.cmp(&b.filename));

        info!(
            "Scanned {} images in {}",
            records.len(),
            self.input_directory.display()
        );
        Ok(records)
    }
}

fn is_jpeg_name(filename: &str) -> bool {
    let lower = filename.to_ascii_lowercase();
    lower.ends_with(".jpg") || lower.ends_with(".jpeg")
}
