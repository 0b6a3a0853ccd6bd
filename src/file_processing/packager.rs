use super::writer::resolve_output_path;
use crate::errors::AppError;
use crate::models::FileCollection;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Default archive name for a downloaded project.
pub const DEFAULT_ARCHIVE_NAME: &str = "frame2code-project.zip";

/// Packs the collection into a zip archive, one entry per file path.
pub fn create_zip(files: &FileCollection, archive_path: &Path) -> Result<usize, AppError> {
    for file in files {
        resolve_output_path(Path::new(""), &file.path)?;
    }

    if let Some(parent) = archive_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut zip = ZipWriter::new(File::create(archive_path)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for file in files {
        zip.start_file(file.path.as_str(), options)?;
        zip.write_all(file.content.as_bytes())?;
    }
    zip.finish()?;

    log::info!(
        "Packed {} file(s) into {}",
        files.len(),
        archive_path.display()
    );
    Ok(files.len())
}
