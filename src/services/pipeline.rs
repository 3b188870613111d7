//! Per-page processing: border-pad, OCR, and optimize.
//!
//! Pages of one publication may run concurrently, but each page's border
//! step finishes before its OCR step, and cleanup only happens once every
//! page is done.

use std::path::Path;

use futures::stream::{self, StreamExt, TryStreamExt};

use super::error::ProcessError;
use crate::config::ProcessingOptions;
use crate::models::Page;
use crate::ocr::{ToolError, ToolRunner, Toolchain};

/// Drives the external tools over the pages of one publication.
pub struct PagePipeline<'a> {
    runner: &'a dyn ToolRunner,
    tools: &'a Toolchain,
    extract_text: bool,
    generate_jpgs: bool,
}

impl<'a> PagePipeline<'a> {
    pub fn new(
        runner: &'a dyn ToolRunner,
        tools: &'a Toolchain,
        options: &ProcessingOptions,
    ) -> Self {
        Self {
            runner,
            tools,
            extract_text: options.extract_text,
            generate_jpgs: options.generate_jpgs,
        }
    }

    /// Run the enabled steps for one page.
    pub async fn process_page(&self, page: &Page) -> Result<(), ToolError> {
        if self.extract_text {
            tracing::info!("Extracting text from {}", page.human_name());
            self.tools
                .converter
                .add_border(self.runner, &page.raster_path, &page.bordered_path())
                .await?;
            self.tools
                .ocr
                .extract_text(self.runner, &page.bordered_path(), &page.text_output_base())
                .await?;
        }

        if self.generate_jpgs {
            tracing::info!("Optimising image from {}", page.human_name());
            self.tools
                .converter
                .optimize(self.runner, &page.raster_path, &page.optimized_path())
                .await?;
        }

        Ok(())
    }

    /// Process every page with at most `workers` in flight. The first
    /// failure stops the remaining pages.
    pub async fn process_pages(&self, pages: &[Page], workers: usize) -> Result<(), ToolError> {
        stream::iter(pages.iter().map(|page| self.process_page(page)))
            .buffer_unordered(workers.max(1))
            .try_collect::<Vec<()>>()
            .await?;
        Ok(())
    }
}

/// Delete every page's raw raster.
pub async fn cleanup_images(pages: &[Page]) -> Result<(), ProcessError> {
    for page in pages {
        tracing::info!("Cleaning up image for {}", page.human_name());
        remove(&page.raster_path).await?;
    }
    Ok(())
}

/// Delete the OCR text and bordered image of every page that has text.
pub async fn cleanup_text(pages: &[Page]) -> Result<(), ProcessError> {
    for page in pages {
        let text_path = page.text_path();
        if !text_path.exists() {
            continue;
        }
        tracing::info!("Cleaning up text for {}", page.human_name());
        remove(&text_path).await?;
        remove(&page.bordered_path()).await?;
    }
    Ok(())
}

async fn remove(path: &Path) -> Result<(), ProcessError> {
    tokio::fs::remove_file(path)
        .await
        .map_err(|source| ProcessError::Cleanup {
            path: path.to_path_buf(),
            source,
        })
}
