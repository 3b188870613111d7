//! Checking for CLI tool availability.

use crate::config::ToolsConfig;

/// Check if a binary is available in PATH.
pub fn check_binary(name: &str) -> bool {
    which::which(name).is_ok()
}

/// Availability of one external tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolStatus {
    pub name: String,
    pub program: String,
    pub available: bool,
    pub hint: &'static str,
}

/// Report on every external tool the pipeline needs.
pub fn check_tools(tools: &ToolsConfig) -> Vec<ToolStatus> {
    [
        (
            "pdftoppm",
            &tools.pdftoppm,
            "Install with: apt install poppler-utils",
        ),
        (
            "convert",
            &tools.convert,
            "Install with: apt install imagemagick",
        ),
        (
            "tesseract",
            &tools.tesseract,
            "Install with: apt install tesseract-ocr",
        ),
    ]
    .into_iter()
    .map(|(name, program, hint)| ToolStatus {
        name: name.to_string(),
        program: program.clone(),
        available: check_binary(program),
        hint,
    })
    .collect()
}
