//! Page model and the in-memory page manifest.
//!
//! Every derived artifact of a page is named from its stem (`page0000`,
//! `page0001`, ...), so the manifest built right after rasterization is the
//! only place page identity is decided.

use std::path::{Path, PathBuf};

use crate::ocr::BORDERED_SUFFIX;

/// One page of a publication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Zero-based position in the publication.
    pub index: usize,
    /// `page` followed by the four-digit zero-padded index.
    pub stem: String,
    /// Raw raster as written by the rasterizer.
    pub raster_path: PathBuf,
    dir: PathBuf,
}

impl Page {
    pub fn new(index: usize, raster_path: PathBuf, dir: &Path) -> Self {
        Self {
            index,
            stem: Self::stem_for(index),
            raster_path,
            dir: dir.to_path_buf(),
        }
    }

    pub fn stem_for(index: usize) -> String {
        format!("page{:04}", index)
    }

    /// Build the ordered manifest from sorted raster paths.
    pub fn manifest(dir: &Path, rasters: Vec<PathBuf>) -> Vec<Page> {
        rasters
            .into_iter()
            .enumerate()
            .map(|(index, raster)| Page::new(index, raster, dir))
            .collect()
    }

    /// Border-padded copy used as OCR input.
    pub fn bordered_path(&self) -> PathBuf {
        self.dir.join(format!("{}{}", self.stem, BORDERED_SUFFIX))
    }

    /// Path passed to the OCR engine, which appends `.txt`.
    pub fn text_output_base(&self) -> PathBuf {
        self.dir.join(&self.stem)
    }

    pub fn text_path(&self) -> PathBuf {
        self.dir.join(format!("{}.txt", self.stem))
    }

    pub fn optimized_file_name(&self) -> String {
        format!("{}.jpg", self.stem)
    }

    pub fn optimized_path(&self) -> PathBuf {
        self.dir.join(self.optimized_file_name())
    }

    /// One-based page label for progress messages.
    pub fn human_name(&self) -> String {
        format!("page {}", self.index + 1)
    }
}
