use super::writer::RAW_RESPONSE_FILE;
use crate::errors::AppError;
use crate::models::request::ImageInput;
use crate::models::{FileCollection, GeneratedFile};
use std::path::{Path, PathBuf};
use tokio::fs;
use walkdir::{DirEntry, WalkDir};

/// Maximum allowed sketch size (20 MB), the inline-data ceiling of the API.
const MAX_IMAGE_SIZE: u64 = 20 * 1024 * 1024;

/// Directories never loaded back into a project.
const SKIPPED_PROJECT_DIRS: [&str; 2] = ["node_modules", "target"];

/// Maps a sketch file extension to its MIME type.
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

/// Expands the given paths into sketch files.
///
/// Files keep the order they were given in, which is the screen order the
/// model sees. Directories are walked in sorted order.
pub fn collect_image_paths(paths: &[PathBuf]) -> Result<Vec<PathBuf>, AppError> {
    let mut images = Vec::new();

    for path in paths {
        if path.is_file() {
            if mime_for_path(path).is_none() {
                return Err(AppError::InvalidInput(format!(
                    "Unsupported image type: {}",
                    path.display()
                )));
            }
            images.push(path.clone());
        } else if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry = entry.map_err(|e| AppError::InvalidInput(e.to_string()))?;
                if entry.file_type().is_file() && mime_for_path(entry.path()).is_some() {
                    images.push(entry.into_path());
                }
            }
        } else {
            return Err(AppError::InvalidInput(format!(
                "Path does not exist: {}",
                path.display()
            )));
        }
    }

    Ok(images)
}

/// Reads sketches into memory.
pub async fn read_images(paths: &[PathBuf]) -> Result<Vec<ImageInput>, AppError> {
    let mut images = Vec::with_capacity(paths.len());
    for path in paths {
        let metadata = fs::metadata(path).await?;
        if metadata.len() > MAX_IMAGE_SIZE {
            return Err(AppError::InvalidInput(format!(
                "Image too large: {} (max {} bytes)",
                path.display(),
                MAX_IMAGE_SIZE
            )));
        }

        let mime_type = mime_for_path(path).ok_or_else(|| {
            AppError::InvalidInput(format!("Unsupported image type: {}", path.display()))
        })?;
        let data = fs::read(path).await?;
        log::debug!("Read sketch {} ({} bytes)", path.display(), data.len());

        images.push(ImageInput {
            name: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            mime_type: mime_type.to_string(),
            data,
        });
    }
    Ok(images)
}

fn is_skipped(entry: &DirEntry) -> bool {
    if entry.depth() == 0 {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.')
        || (entry.file_type().is_dir() && SKIPPED_PROJECT_DIRS.iter().any(|dir| name == *dir))
        || (entry.depth() == 1 && entry.file_type().is_file() && name == RAW_RESPONSE_FILE)
}

/// Loads a previously written project back into a collection.
///
/// Paths are relative to `root` and use `/` separators. Non-UTF-8 files and
/// a saved raw model response are skipped.
pub async fn load_project(root: &Path) -> Result<FileCollection, AppError> {
    if !root.is_dir() {
        return Err(AppError::InvalidInput(format!(
            "Project directory does not exist: {}",
            root.display()
        )));
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_skipped(entry));

    for entry in walker {
        let entry = entry.map_err(|e| AppError::InvalidInput(e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = match entry.path().strip_prefix(root) {
            Ok(relative) => relative,
            Err(_) => continue,
        };
        let path = relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        match fs::read_to_string(entry.path()).await {
            Ok(content) => files.push(GeneratedFile::new(path, content)),
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                log::warn!("Skipping non-text file {}", entry.path().display());
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(FileCollection::from_files(files))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as std_fs;
    use tempfile::tempdir;

    #[test]
    fn mime_types_by_extension() {
        assert_eq!(mime_for_path(Path::new("a.PNG")), Some("image/png"));
        assert_eq!(mime_for_path(Path::new("a.jpeg")), Some("image/jpeg"));
        assert_eq!(mime_for_path(Path::new("a.webp")), Some("image/webp"));
        assert_eq!(mime_for_path(Path::new("a.txt")), None);
    }

    #[test]
    fn collects_files_in_given_order_and_directories_sorted() {
        let dir = tempdir().unwrap();
        let screens = dir.path().join("screens");
        std_fs::create_dir(&screens).unwrap();
        std_fs::write(screens.join("b.png"), b"b").unwrap();
        std_fs::write(screens.join("a.jpg"), b"a").unwrap();
        std_fs::write(screens.join("notes.txt"), b"skip").unwrap();
        let login = dir.path().join("login.webp");
        std_fs::write(&login, b"l").unwrap();

        let images = collect_image_paths(&[login.clone(), screens.clone()]).unwrap();

        assert_eq!(
            images,
            vec![login, screens.join("a.jpg"), screens.join("b.png")]
        );
    }

    #[test]
    fn rejects_unsupported_file() {
        let dir = tempdir().unwrap();
        let notes = dir.path().join("notes.txt");
        std_fs::write(&notes, b"text").unwrap();
        assert!(matches!(
            collect_image_paths(&[notes]),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn rejects_missing_path() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            collect_image_paths(&[dir.path().join("nope.png")]),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn reads_image_bytes_and_mime() {
        let dir = tempdir().unwrap();
        let sketch = dir.path().join("home.png");
        std_fs::write(&sketch, [0x89, b'P', b'N', b'G']).unwrap();

        let images = read_images(&[sketch]).await.unwrap();

        assert_eq!(images.len(), 1);
        assert_eq!(images[0].name, "home.png");
        assert_eq!(images[0].mime_type, "image/png");
        assert_eq!(images[0].data, vec![0x89, b'P', b'N', b'G']);
    }

    #[tokio::test]
    async fn loads_project_with_relative_paths() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        std_fs::create_dir_all(root.join("app")).unwrap();
        std_fs::create_dir_all(root.join("node_modules/react")).unwrap();
        std_fs::create_dir_all(root.join(".git")).unwrap();
        std_fs::write(root.join("app/page.tsx"), "page").unwrap();
        std_fs::write(root.join("preview.html"), "<html></html>").unwrap();
        std_fs::write(root.join("node_modules/react/index.js"), "skip").unwrap();
        std_fs::write(root.join(".git/HEAD"), "skip").unwrap();
        std_fs::write(root.join("logo.bin"), [0xff, 0xfe, 0x00]).unwrap();

        let project = load_project(root).await.unwrap();

        assert_eq!(
            project.paths().collect::<Vec<_>>(),
            vec!["app/page.tsx", "preview.html"]
        );
        assert_eq!(project.get("app/page.tsx").unwrap().content, "page");
    }

    #[tokio::test]
    async fn saved_raw_response_is_not_part_of_the_project() {
        let dir = tempdir().unwrap();
        std_fs::write(dir.path().join("preview.html"), "<html></html>").unwrap();
        crate::file_processing::writer::save_raw_response(dir.path(), "Sure! here")
            .await
            .unwrap();

        let project = load_project(dir.path()).await.unwrap();

        assert_eq!(project.paths().collect::<Vec<_>>(), vec!["preview.html"]);
    }

    #[tokio::test]
    async fn load_project_requires_directory() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            load_project(&dir.path().join("missing")).await,
            Err(AppError::InvalidInput(_))
        ));
    }
}
