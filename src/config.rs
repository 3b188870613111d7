//! Configuration management for scanshelf.
//!
//! Every knob has a default, so a missing config file is never an error. A
//! file, when present, only needs to name the values it changes.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILENAME: &str = "scanshelf.toml";

/// Default bibliographic lookup endpoint (Google Books volumes search).
pub const DEFAULT_LOOKUP_ENDPOINT: &str = "https://www.googleapis.com/books/v1/volumes";

/// Environment variable holding an optional Google Books API key.
pub const API_KEY_ENV: &str = "GOOGLE_BOOKS_API_KEY";

/// Errors loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {format} config: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },
}

/// Which steps run for each publication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingOptions {
    /// Skip publications whose output directory already exists.
    pub ignore_existing: bool,
    /// Rasterize the source PDF into page images.
    pub generate_pngs: bool,
    /// Border-pad each page and run OCR on it.
    pub extract_text: bool,
    /// Produce an optimized JPEG per page.
    pub generate_jpgs: bool,
    /// Delete raw page rasters once every page is processed.
    pub cleanup_pngs: bool,
    /// Write the per-publication `structure.json`.
    pub generate_pdf_structures: bool,
    /// Write the per-publication `search.json`.
    pub generate_pdf_searches: bool,
    /// Write the root `structure.json` listing every publication.
    pub generate_structure: bool,
    /// Never replace an existing `meta.json`.
    pub preserve_existing_meta: bool,
    /// Look up bibliographic metadata from ISBNs found in the text.
    pub generate_meta_from_isbn: bool,
    /// Delete OCR text and bordered images after indexing.
    pub cleanup_txts: bool,
    /// Log a failed publication and move on instead of aborting the batch.
    pub continue_on_error: bool,
    /// Pages processed concurrently within one publication.
    pub page_workers: usize,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            ignore_existing: true,
            generate_pngs: true,
            extract_text: true,
            generate_jpgs: true,
            cleanup_pngs: true,
            generate_pdf_structures: true,
            generate_pdf_searches: true,
            generate_structure: true,
            preserve_existing_meta: true,
            generate_meta_from_isbn: true,
            cleanup_txts: true,
            continue_on_error: false,
            page_workers: 1,
        }
    }
}

/// External tool settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub pdftoppm: String,
    pub convert: String,
    pub tesseract: String,
    /// Rasterization resolution.
    pub dpi: u32,
    /// Border added around each page before OCR, in pixels.
    pub border_width: u32,
    pub border_color: String,
    /// JPEG quality for optimized page images.
    pub jpeg_quality: u8,
    /// OCR error-stream lines with these prefixes are notices, not failures.
    pub ocr_informational_prefixes: Vec<String>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            pdftoppm: "pdftoppm".to_string(),
            convert: "convert".to_string(),
            tesseract: "tesseract".to_string(),
            dpi: 300,
            border_width: 10,
            border_color: "White".to_string(),
            jpeg_quality: 85,
            ocr_informational_prefixes: vec!["Detected".to_string()],
        }
    }
}

/// Bibliographic lookup service settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    pub endpoint: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    pub user_agent: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_LOOKUP_ENDPOINT.to_string(),
            timeout_secs: 30,
            user_agent: format!("scanshelf/{}", env!("CARGO_PKG_VERSION")),
            api_key: None,
        }
    }
}

/// Complete configuration, passed by reference into each component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub processing: ProcessingOptions,
    pub tools: ToolsConfig,
    pub lookup: LookupConfig,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load from `path` if given, else from `./scanshelf.toml` if it exists,
    /// else defaults. Environment overrides are applied in every case.
    pub async fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::load_from_path(path).await?,
            None => {
                let candidate = PathBuf::from(DEFAULT_CONFIG_FILENAME);
                if candidate.exists() {
                    Self::load_from_path(&candidate).await?
                } else {
                    tracing::debug!("No config file found, using defaults");
                    Self::default()
                }
            }
        };
        Ok(config.with_env_overrides())
    }

    /// Load configuration from a specific file path.
    /// Supports TOML, YAML, and JSON based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let expanded = expand_path(path);
        let contents = tokio::fs::read_to_string(&expanded)
            .await
            .map_err(|source| ConfigError::Read {
                path: expanded.clone(),
                source,
            })?;

        let ext = expanded
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("toml");

        let mut config = Self::parse(&contents, ext)?;
        config.source_path = Some(expanded);
        Ok(config)
    }

    fn parse(contents: &str, ext: &str) -> Result<Self, ConfigError> {
        match ext {
            "yaml" | "yml" => serde_yaml::from_str(contents).map_err(|e| ConfigError::Parse {
                format: "YAML",
                message: e.to_string(),
            }),
            "json" => serde_json::from_str(contents).map_err(|e| ConfigError::Parse {
                format: "JSON",
                message: e.to_string(),
            }),
            _ => toml::from_str(contents).map_err(|e| ConfigError::Parse {
                format: "TOML",
                message: e.to_string(),
            }),
        }
    }

    /// Apply environment variable overrides.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.is_empty() {
                self.lookup.api_key = Some(key);
            }
        }
        self
    }
}

/// Expand a leading `~` in a user-supplied path.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(raw.as_ref()).as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.processing.ignore_existing);
        assert!(config.processing.preserve_existing_meta);
        assert!(!config.processing.continue_on_error);
        assert_eq!(config.processing.page_workers, 1);
        assert_eq!(config.tools.dpi, 300);
        assert_eq!(config.tools.border_width, 10);
        assert_eq!(config.tools.jpeg_quality, 85);
        assert_eq!(config.tools.ocr_informational_prefixes, vec!["Detected"]);
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config = Config::parse(
            "[processing]\ncleanup_txts = false\npage_workers = 4\n",
            "toml",
        )
        .unwrap();
        assert!(!config.processing.cleanup_txts);
        assert_eq!(config.processing.page_workers, 4);
        assert!(config.processing.cleanup_pngs);
        assert_eq!(config.tools, ToolsConfig::default());
    }

    #[test]
    fn test_yaml_and_json_formats() {
        let yaml = Config::parse("tools:\n  dpi: 150\n", "yml").unwrap();
        assert_eq!(yaml.tools.dpi, 150);

        let json = Config::parse(r#"{"lookup": {"timeout_secs": 5}}"#, "json").unwrap();
        assert_eq!(json.lookup.timeout_secs, 5);
        assert_eq!(json.lookup.endpoint, DEFAULT_LOOKUP_ENDPOINT);
    }

    #[test]
    fn test_invalid_config_reports_format() {
        let err = Config::parse("processing = [", "toml").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { format: "TOML", .. }));
    }

    #[tokio::test]
    async fn test_load_from_path_records_source() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("custom.toml");
        std::fs::write(&path, "[tools]\ntesseract = \"/opt/tesseract\"\n").unwrap();

        let config = Config::load_from_path(&path).await.unwrap();
        assert_eq!(config.tools.tesseract, "/opt/tesseract");
        assert_eq!(config.source_path.as_deref(), Some(path.as_path()));
    }

    #[tokio::test]
    async fn test_load_missing_file_is_error() {
        let temp = TempDir::new().unwrap();
        let result = Config::load(Some(&temp.path().join("absent.toml"))).await;
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
