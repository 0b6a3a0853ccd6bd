use crate::errors::AppError;
use crate::models::{is_project_relative, FileCollection};
use std::path::{Path, PathBuf};
use tokio::fs;

/// File name used for the raw text of a response that failed to parse.
pub const RAW_RESPONSE_FILE: &str = "response.raw.txt";

/// Resolves a generated path under `root`, refusing anything that escapes it.
pub fn resolve_output_path(root: &Path, relative: &str) -> Result<PathBuf, AppError> {
    if !is_project_relative(relative) {
        return Err(AppError::InvalidInput(format!(
            "Refusing to write outside the project: {}",
            relative
        )));
    }
    Ok(root.join(relative))
}

/// Writes every file of the collection under `output_directory`.
///
/// All paths are checked before anything is written.
pub async fn write_project(
    files: &FileCollection,
    output_directory: &Path,
) -> Result<usize, AppError> {
    let targets = files
        .iter()
        .map(|file| -> Result<_, AppError> {
            Ok((resolve_output_path(output_directory, &file.path)?, file))
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    fs::create_dir_all(output_directory).await?;

    let mut saved_files = 0;
    for (target, file) in targets {
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&target, file.content.as_bytes()).await?;
        log::debug!("Wrote {}", target.display());
        saved_files += 1;
    }

    Ok(saved_files)
}

/// Saves the raw model text next to the project so it can be inspected.
pub async fn save_raw_response(output_directory: &Path, raw: &str) -> Result<PathBuf, AppError> {
    fs::create_dir_all(output_directory).await?;
    let path = output_directory.join(RAW_RESPONSE_FILE);
    fs::write(&path, raw.as_bytes()).await?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeneratedFile;
    use tempfile::tempdir;

    #[test]
    fn rejects_escaping_paths() {
        let root = Path::new("/tmp/project");
        for bad in ["../etc/passwd", "/etc/passwd", "app/../../x", "", "  "] {
            assert!(
                matches!(resolve_output_path(root, bad), Err(AppError::InvalidInput(_))),
                "{} should be rejected",
                bad
            );
        }
        assert_eq!(
            resolve_output_path(root, "./app/page.tsx").unwrap(),
            root.join("./app/page.tsx")
        );
    }

    #[tokio::test]
    async fn writes_nested_files() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("project");
        let files = FileCollection::from_files(vec![
            GeneratedFile::new("app/page.tsx", "page"),
            GeneratedFile::new("preview.html", "<html></html>"),
        ]);

        let saved = write_project(&files, &out).await.unwrap();

        assert_eq!(saved, 2);
        assert_eq!(
            std::fs::read_to_string(out.join("app/page.tsx")).unwrap(),
            "page"
        );
        assert_eq!(
            std::fs::read_to_string(out.join("preview.html")).unwrap(),
            "<html></html>"
        );
    }

    #[tokio::test]
    async fn bad_path_writes_nothing() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("project");
        let files = FileCollection::from_files(vec![
            GeneratedFile::new("README.md", "# App"),
            GeneratedFile::new("../escape.txt", "nope"),
        ]);

        assert!(write_project(&files, &out).await.is_err());
        assert!(!out.exists());
        assert!(!dir.path().join("escape.txt").exists());
    }

    #[tokio::test]
    async fn saves_raw_response() {
        let dir = tempdir().unwrap();
        let path = save_raw_response(dir.path(), "not json").await.unwrap();
        assert_eq!(path, dir.path().join(RAW_RESPONSE_FILE));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "not json");
    }
}
