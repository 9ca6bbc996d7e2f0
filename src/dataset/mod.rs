//! # Dataset Module
//!
//! Writes the generated dataset to disk: one PNG per sample under
//! `images/`, plus a single `manifest.json` listing every sample with its
//! annotations and a `config.json` capturing the randomization config
//! (seed included) the dataset was generated with.
//!
//! ## Layout
//!
//! ```text
//! output/
//!   images/
//!     000000.png
//!     000001.png
//!     ...
//!   manifest.json
//!   config.json
//! ```
//!
//! ## Partial-run safety
//!
//! Records are appended only after their image write succeeded, and the
//! manifest is written once at finalize. A run that dies halfway leaves
//! stray images but never a manifest entry pointing at an image that was
//! not written.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::annotate::{CameraAnnotation, ObjectAnnotation};
use crate::error::DatasetError;
use crate::randomize::RandomizationConfig;
use crate::render::RenderedFrame;

/// One finished dataset sample as it appears in the manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    pub index: usize,
    /// Image path relative to the output root
    pub image: String,
    pub annotations: Vec<ObjectAnnotation>,
    pub camera: CameraAnnotation,
}

/// Accumulates images and records for one run and finalizes the manifest.
pub struct DatasetWriter {
    output_dir: PathBuf,
    records: Vec<SampleRecord>,
    start_index: usize,
}

impl DatasetWriter {
    const IMAGE_DIR: &'static str = "images";

    /// Creates a writer rooted at `output_dir`.
    ///
    /// With `incremental` set and an existing output directory, the
    /// previous manifest is loaded and extended, and generation continues
    /// after the highest sample index already on disk. Otherwise the
    /// directory is cleared and recreated. Incremental mode with a missing
    /// directory silently degrades to a fresh run, so a dataset can be
    /// rebuilt from scratch by deleting its directory.
    pub fn create(output_dir: impl AsRef<Path>, incremental: bool) -> Result<Self, DatasetError> {
        let output_dir = output_dir.as_ref().to_path_buf();
        let image_dir = output_dir.join(Self::IMAGE_DIR);

        let incremental = incremental && output_dir.is_dir();
        let mut records = Vec::new();
        let start_index = if incremental {
            let manifest_path = output_dir.join("manifest.json");
            if manifest_path.is_file() {
                let text = fs::read_to_string(&manifest_path)?;
                records = serde_json::from_str(&text)?;
            }
            let image_max = Self::scan_max_index(&image_dir)?;
            let record_max = records.iter().map(|r: &SampleRecord| r.index).max();
            match image_max.max(record_max) {
                Some(max) => max + 1,
                None => 0,
            }
        } else {
            make_clean_directory(&output_dir)?;
            0
        };
        fs::create_dir_all(&image_dir)?;

        Ok(Self {
            output_dir,
            records,
            start_index,
        })
    }

    /// First sample index this run will write
    pub fn start_index(&self) -> usize {
        self.start_index
    }

    /// Number of records in the manifest, including any loaded from a
    /// previous run in incremental mode
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Image path for a sample index, relative to the output root
    pub fn image_rel_path(index: usize) -> String {
        format!("{}/{:06}.png", Self::IMAGE_DIR, index)
    }

    /// Encodes and writes one frame as PNG.
    ///
    /// # Returns
    /// The absolute path of the written image
    pub fn write_image(&self, index: usize, frame: &RenderedFrame) -> Result<PathBuf, DatasetError> {
        let path = self.output_dir.join(Self::image_rel_path(index));
        image::save_buffer(
            &path,
            &frame.pixels,
            frame.width,
            frame.height,
            image::ExtendedColorType::Rgba8,
        )?;
        Ok(path)
    }

    /// Appends a sample record. Call only after its image write succeeded.
    pub fn append_record(&mut self, record: SampleRecord) {
        self.records.push(record);
    }

    /// Writes `manifest.json` and `config.json`.
    ///
    /// The manifest is a top-level JSON array and is valid even when no
    /// samples were written.
    ///
    /// # Returns
    /// The manifest path
    pub fn finalize(&self, config: &RandomizationConfig) -> Result<PathBuf, DatasetError> {
        let manifest_path = self.output_dir.join("manifest.json");
        let manifest = serde_json::to_string_pretty(&self.records)?;
        fs::write(&manifest_path, manifest)?;

        let config_path = self.output_dir.join("config.json");
        let config_text = serde_json::to_string_pretty(config)?;
        fs::write(config_path, config_text)?;

        info!(
            "finalized dataset: {} records at {}",
            self.records.len(),
            manifest_path.display()
        );
        Ok(manifest_path)
    }

    /// Highest image index below `image_dir`, if any image exists
    fn scan_max_index(image_dir: &Path) -> Result<Option<usize>, DatasetError> {
        if !image_dir.is_dir() {
            return Ok(None);
        }
        let mut max: Option<usize> = None;
        for entry in fs::read_dir(image_dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(stem) = Path::new(&name).file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if let Ok(index) = stem.parse::<usize>() {
                max = Some(max.map_or(index, |m| m.max(index)));
            }
        }
        Ok(max)
    }
}

/// Creates an empty directory, deleting any previous content.
fn make_clean_directory(path: &Path) -> Result<(), DatasetError> {
    if path.is_dir() {
        fs::remove_dir_all(path)?;
    } else if path.is_file() {
        fs::remove_file(path)?;
    }
    fs::create_dir_all(path)?;
    Ok(())
}
