//! External tools: rasterization, image transforms, and OCR.
//!
//! - pdftoppm (Poppler) renders each PDF page to PNG
//! - ImageMagick `convert` pads pages for OCR and writes optimized JPEGs
//! - Tesseract extracts text from the padded pages
//!
//! All of them run through a [`ToolRunner`] so tests can substitute a fake.

mod backend;
mod convert;
mod model_utils;
mod pdf_utils;
mod tesseract;

pub use backend::{CommandRunner, Invocation, ToolError, ToolOutput, ToolRunner};
pub use convert::ImageConverter;
pub use model_utils::{check_binary, check_tools, ToolStatus};
pub use pdf_utils::{find_page_images, Rasterizer, BORDERED_SUFFIX, RASTER_PREFIX};
pub use tesseract::TesseractEngine;

use crate::config::ToolsConfig;

/// The three external tools, configured once per run.
#[derive(Debug, Clone)]
pub struct Toolchain {
    pub rasterizer: Rasterizer,
    pub converter: ImageConverter,
    pub ocr: TesseractEngine,
}

impl Toolchain {
    pub fn from_config(tools: &ToolsConfig) -> Self {
        Self {
            rasterizer: Rasterizer::new(&tools.pdftoppm, tools.dpi),
            converter: ImageConverter::new(
                &tools.convert,
                tools.border_width,
                &tools.border_color,
                tools.jpeg_quality,
            ),
            ocr: TesseractEngine::new(&tools.tesseract, tools.ocr_informational_prefixes.clone()),
        }
    }
}
