//! JSON documents written next to the page images.
//!
//! Struct field order is the on-disk key order.

use std::path::Path;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use super::error::ProcessError;
use super::search::WordCount;
use crate::models::{MetaRecord, Page};

/// Per-publication `structure.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageStructure {
    pub pages: Vec<PageEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageEntry {
    pub file: String,
}

impl PageStructure {
    /// Lists the optimized image of every page that has one on disk.
    pub fn from_pages(pages: &[Page]) -> Self {
        Self {
            pages: pages
                .iter()
                .filter(|page| page.optimized_path().exists())
                .map(|page| PageEntry {
                    file: page.optimized_file_name(),
                })
                .collect(),
        }
    }
}

/// Per-publication `search.json`.
#[derive(Debug, Clone, Serialize)]
pub struct SearchIndex<'a> {
    pub word_frequencies: WordFrequencies<'a>,
}

impl<'a> SearchIndex<'a> {
    pub fn new(counts: &'a WordCount) -> Self {
        Self {
            word_frequencies: WordFrequencies(counts),
        }
    }
}

/// Serializes as `[{"word": count}, ...]` in table order.
#[derive(Debug, Clone, Copy)]
pub struct WordFrequencies<'a>(pub &'a WordCount);

impl Serialize for WordFrequencies<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for (word, count) in self.0.iter() {
            seq.serialize_element(&SingleEntry(word, count))?;
        }
        seq.end()
    }
}

struct SingleEntry<'a>(&'a str, u64);

impl Serialize for SingleEntry<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.0, &self.1)?;
        map.end()
    }
}

/// Root `structure.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicationStructure {
    pub publications: Vec<PublicationEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicationEntry {
    pub folder: String,
}

impl PublicationStructure {
    /// Every subdirectory of `output_root`, sorted by name.
    pub fn scan(output_root: &Path) -> std::io::Result<Self> {
        let mut folders = Vec::new();
        for entry in std::fs::read_dir(output_root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                folders.push(entry.file_name().to_string_lossy().to_string());
            }
        }
        folders.sort();
        Ok(Self {
            publications: folders
                .into_iter()
                .map(|folder| PublicationEntry { folder })
                .collect(),
        })
    }
}

/// Write `value` as pretty-printed JSON with a trailing newline.
pub async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ProcessError> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    tokio::fs::write(path, json).await?;
    Ok(())
}

pub async fn write_meta(path: &Path, meta: &MetaRecord) -> Result<(), ProcessError> {
    write_json(path, meta).await
}
