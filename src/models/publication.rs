//! Publication model: one scanned book and its output directory.

use std::path::{Path, PathBuf};

/// Name of the per-publication bibliographic record.
pub const META_FILENAME: &str = "meta.json";
/// Name of the per-publication search index.
pub const SEARCH_FILENAME: &str = "search.json";
/// Name of the page listing, both per publication and at the output root.
pub const STRUCTURE_FILENAME: &str = "structure.json";

/// Processing status, derived from whether the output directory exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublicationStatus {
    Unprocessed,
    Processed,
}

impl PublicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unprocessed => "unprocessed",
            Self::Processed => "processed",
        }
    }
}

/// A scanned book discovered in the input tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publication {
    /// Stable identifier: the source file stem, also the output folder name.
    pub id: String,
    /// Source PDF.
    pub source_path: PathBuf,
    /// `<output_root>/<id>`.
    pub output_dir: PathBuf,
}

impl Publication {
    /// Build a publication for `source_path`, or `None` if it has no usable stem.
    pub fn from_source(source_path: &Path, output_root: &Path) -> Option<Self> {
        let id = source_path.file_stem()?.to_str()?.to_string();
        if id.is_empty() {
            return None;
        }
        Some(Self {
            output_dir: output_root.join(&id),
            source_path: source_path.to_path_buf(),
            id,
        })
    }

    pub fn status(&self) -> PublicationStatus {
        if self.output_dir.exists() {
            PublicationStatus::Processed
        } else {
            PublicationStatus::Unprocessed
        }
    }

    pub fn meta_path(&self) -> PathBuf {
        self.output_dir.join(META_FILENAME)
    }

    pub fn search_path(&self) -> PathBuf {
        self.output_dir.join(SEARCH_FILENAME)
    }

    pub fn structure_path(&self) -> PathBuf {
        self.output_dir.join(STRUCTURE_FILENAME)
    }

    /// File name of the source, for log messages.
    pub fn source_name(&self) -> String {
        self.source_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_from_source_uses_stem() {
        let publication =
            Publication::from_source(Path::new("/in/shelf/Dune.pdf"), Path::new("/out")).unwrap();
        assert_eq!(publication.id, "Dune");
        assert_eq!(publication.output_dir, PathBuf::from("/out/Dune"));
        assert_eq!(publication.meta_path(), PathBuf::from("/out/Dune/meta.json"));
        assert_eq!(publication.source_name(), "Dune.pdf");
    }

    #[test]
    fn test_status_tracks_output_directory() {
        let temp = TempDir::new().unwrap();
        let publication =
            Publication::from_source(Path::new("book.pdf"), temp.path()).unwrap();
        assert_eq!(publication.status(), PublicationStatus::Unprocessed);

        std::fs::create_dir(&publication.output_dir).unwrap();
        assert_eq!(publication.status(), PublicationStatus::Processed);
        assert_eq!(publication.status().as_str(), "processed");
    }
}
