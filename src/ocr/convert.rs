//! Image transforms through ImageMagick's `convert`.

use std::path::Path;

use super::backend::{Invocation, ToolError, ToolRunner};

/// Border padding and JPEG optimization.
#[derive(Debug, Clone)]
pub struct ImageConverter {
    program: String,
    border_width: u32,
    border_color: String,
    quality: u8,
}

impl ImageConverter {
    pub fn new(
        program: impl Into<String>,
        border_width: u32,
        border_color: impl Into<String>,
        quality: u8,
    ) -> Self {
        Self {
            program: program.into(),
            border_width,
            border_color: border_color.into(),
            quality,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Pad `input` with a solid border. Text touching the page edge OCRs
    /// noticeably worse without it.
    pub fn border_invocation(&self, input: &Path, output: &Path) -> Invocation {
        let geometry = format!("{0}x{0}", self.border_width);
        Invocation::new(&self.program)
            .arg(input)
            .args(["-bordercolor", &self.border_color, "-border", &geometry])
            .arg(output)
    }

    /// Strip metadata and write an interlaced JPEG of `input`.
    pub fn optimize_invocation(&self, input: &Path, output: &Path) -> Invocation {
        let quality = format!("{}%", self.quality);
        Invocation::new(&self.program)
            .arg(input)
            .args(["-strip", "-interlace", "Plane", "-quality", &quality])
            .arg(output)
    }

    pub async fn add_border(
        &self,
        runner: &dyn ToolRunner,
        input: &Path,
        output: &Path,
    ) -> Result<(), ToolError> {
        runner
            .run(&self.border_invocation(input, output))
            .await?
            .into_checked(self.program(), &[])?;
        Ok(())
    }

    pub async fn optimize(
        &self,
        runner: &dyn ToolRunner,
        input: &Path,
        output: &Path,
    ) -> Result<(), ToolError> {
        runner
            .run(&self.optimize_invocation(input, output))
            .await?
            .into_checked(self.program(), &[])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::backend::ToolOutput;
    use async_trait::async_trait;

    struct FailingRunner;

    #[async_trait]
    impl ToolRunner for FailingRunner {
        async fn run(&self, _invocation: &Invocation) -> Result<ToolOutput, ToolError> {
            Ok(ToolOutput {
                success: false,
                stdout: String::new(),
                stderr: "unable to open image\n".to_string(),
            })
        }
    }

    fn converter() -> ImageConverter {
        ImageConverter::new("convert", 10, "White", 85)
    }

    #[test]
    fn test_border_invocation() {
        let inv = converter().border_invocation(
            Path::new("page-01.png"),
            Path::new("page0000.bordered.png"),
        );
        assert_eq!(
            inv.to_string(),
            "convert page-01.png -bordercolor White -border 10x10 page0000.bordered.png"
        );
    }

    #[test]
    fn test_optimize_invocation() {
        let inv =
            converter().optimize_invocation(Path::new("page-01.png"), Path::new("page0000.jpg"));
        assert_eq!(
            inv.to_string(),
            "convert page-01.png -strip -interlace Plane -quality 85% page0000.jpg"
        );
    }

    #[tokio::test]
    async fn test_failure_names_configured_program() {
        let converter = ImageConverter::new("magick-convert", 10, "White", 85);
        let err = converter
            .add_border(&FailingRunner, Path::new("in.png"), Path::new("out.png"))
            .await
            .unwrap_err();
        match err {
            ToolError::Failed { tool, stderr } => {
                assert_eq!(tool, "magick-convert");
                assert!(stderr.contains("unable to open image"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
