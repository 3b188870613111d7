//! Finding source PDFs under the input root.

use std::path::{Path, PathBuf};

use crate::models::Publication;

/// Every `*.pdf` under `input_root` (recursively) as a publication rooted at
/// `output_root`, sorted by identifier.
pub fn discover_publications(
    input_root: &Path,
    output_root: &Path,
) -> std::io::Result<Vec<Publication>> {
    let mut sources = Vec::new();
    collect_pdfs(input_root, &mut sources)?;

    let mut publications: Vec<Publication> = sources
        .iter()
        .filter_map(|path| Publication::from_source(path, output_root))
        .collect();
    publications.sort_by(|a, b| a.id.cmp(&b.id).then(a.source_path.cmp(&b.source_path)));

    for pair in publications.windows(2) {
        if pair[0].id == pair[1].id {
            tracing::warn!(
                "{} and {} share the output folder {}",
                pair[0].source_path.display(),
                pair[1].source_path.display(),
                pair[0].id
            );
        }
    }

    Ok(publications)
}

fn collect_pdfs(dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            collect_pdfs(&path, out)?;
        } else if file_type.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
        {
            out.push(path);
        }
    }
    Ok(())
}
