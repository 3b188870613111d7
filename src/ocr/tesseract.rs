//! Tesseract OCR via command-line.

use std::path::Path;

use super::backend::{Invocation, ToolError, ToolRunner};

/// Tesseract OCR engine.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    program: String,
    informational_prefixes: Vec<String>,
}

impl TesseractEngine {
    pub fn new(program: impl Into<String>, informational_prefixes: Vec<String>) -> Self {
        Self {
            program: program.into(),
            informational_prefixes,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Tesseract appends `.txt` to `output_base` itself.
    pub fn invocation(&self, image_path: &Path, output_base: &Path) -> Invocation {
        Invocation::new(&self.program)
            .arg(image_path)
            .arg(output_base)
    }

    /// OCR `image_path` into `<output_base>.txt`.
    ///
    /// Orientation and script detection notices arrive on stderr and are
    /// tolerated; anything else there is a failure.
    pub async fn extract_text(
        &self,
        runner: &dyn ToolRunner,
        image_path: &Path,
        output_base: &Path,
    ) -> Result<(), ToolError> {
        let output = runner
            .run(&self.invocation(image_path, output_base))
            .await?
            .into_checked(self.program(), &self.informational_prefixes)?;
        if !output.stderr.is_empty() {
            tracing::debug!("tesseract: {}", output.stderr.trim());
        }
        Ok(())
    }
}
