//! PDF rasterization via pdftoppm.

use std::path::{Path, PathBuf};

use super::backend::{Invocation, ToolError, ToolRunner};

/// File prefix pdftoppm is told to use for page images.
pub const RASTER_PREFIX: &str = "page";

/// Suffix of the border-padded OCR input, which must not be mistaken for a raster.
pub const BORDERED_SUFFIX: &str = ".bordered.png";

/// Wraps the pdftoppm binary.
#[derive(Debug, Clone)]
pub struct Rasterizer {
    program: String,
    dpi: u32,
}

impl Rasterizer {
    pub fn new(program: impl Into<String>, dpi: u32) -> Self {
        Self {
            program: program.into(),
            dpi,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Build the command that renders every page of `pdf_path` into `output_dir`.
    ///
    /// pdftoppm names files like page-01.png, page-02.png, with a padding
    /// width that depends on the total page count.
    pub fn invocation(&self, pdf_path: &Path, output_dir: &Path) -> Invocation {
        Invocation::new(&self.program)
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg("-png")
            .arg(pdf_path)
            .arg(output_dir.join(RASTER_PREFIX))
    }

    /// Render every page of `pdf_path` into `output_dir`.
    pub async fn rasterize(
        &self,
        runner: &dyn ToolRunner,
        pdf_path: &Path,
        output_dir: &Path,
    ) -> Result<(), ToolError> {
        runner
            .run(&self.invocation(pdf_path, output_dir))
            .await?
            .into_checked(self.program(), &[])?;
        Ok(())
    }
}

/// Find raw page rasters in `dir`, sorted by file name.
///
/// Zero padding makes the lexicographic order the page order.
pub fn find_page_images(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut images = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with(RASTER_PREFIX)
            && name.ends_with(".png")
            && !name.ends_with(BORDERED_SUFFIX)
        {
            images.push(entry.path());
        }
    }
    images.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_page_images_empty() {
        let temp = TempDir::new().unwrap();
        assert!(find_page_images(temp.path()).unwrap().is_empty());
    }

    #[test]
    fn test_find_page_images_sorted_and_filtered() {
        let temp = TempDir::new().unwrap();
        for name in [
            "page-10.png",
            "page-02.png",
            "page-01.png",
            "page0000.bordered.png",
            "page0000.txt",
            "page0000.jpg",
            "cover.png",
        ] {
            std::fs::write(temp.path().join(name), b"fake").unwrap();
        }

        let found: Vec<String> = find_page_images(temp.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(found, vec!["page-01.png", "page-02.png", "page-10.png"]);
    }

    #[test]
    fn test_rasterize_invocation() {
        let raster = Rasterizer::new("pdftoppm", 300);
        let inv = raster.invocation(Path::new("/in/book.pdf"), Path::new("/out/book"));
        assert_eq!(
            inv.to_string(),
            "pdftoppm -r 300 -png /in/book.pdf /out/book/page"
        );
    }
}
