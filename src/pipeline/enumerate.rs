//! File enumeration: list the images in a directory, sorted by name.
//!
//! Only the file extension is checked. A file that merely claims to be a PNG
//! is caught later, when the inspector tries to read its header.

use crate::error::Img2PdfError;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// Extensions accepted when no explicit allowlist is configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "webp"];

/// An image file found in the source directory.
///
/// Identity is the filename; `path` is `dir.join(name)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageFile {
    pub name: String,
    pub path: PathBuf,
}

impl ImageFile {
    pub fn new(dir: &Path, name: impl Into<String>) -> Self {
        let name = name.into();
        let path = dir.join(&name);
        Self { name, path }
    }
}

/// Whether `name` ends with `.<ext>` for one of `extensions`, ignoring case.
pub fn has_image_extension(name: &str, extensions: &[String]) -> bool {
    let lower = name.to_lowercase();
    extensions.iter().any(|ext| {
        let ext = ext.trim_start_matches('.').to_lowercase();
        lower.len() > ext.len() && lower.ends_with(&ext) && lower[..lower.len() - ext.len()].ends_with('.')
    })
}

/// List matching images in `dir`, sorted lexicographically by filename.
///
/// Errors are typed: [`Img2PdfError::DirectoryNotFound`] when the path does
/// not exist and [`Img2PdfError::DirectoryUnreadable`] for any other listing
/// failure. An empty `Vec` is not an error here.
pub fn try_list_images(dir: &Path, extensions: &[String]) -> Result<Vec<ImageFile>, Img2PdfError> {
    let entries = std::fs::read_dir(dir).map_err(|e| match e.kind() {
        ErrorKind::NotFound => Img2PdfError::DirectoryNotFound {
            path: dir.to_path_buf(),
        },
        _ => Img2PdfError::DirectoryUnreadable {
            path: dir.to_path_buf(),
            source: e,
        },
    })?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Img2PdfError::DirectoryUnreadable {
            path: dir.to_path_buf(),
            source: e,
        })?;
        // Directories named `foo.png` are not images.
        if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            debug!("Skipping non-UTF-8 filename {:?}", entry.file_name());
            continue;
        };
        if has_image_extension(&name, extensions) {
            names.push(name);
        }
    }

    names.sort();
    names.dedup();
    debug!("Found {} image(s) in {}", names.len(), dir.display());

    Ok(names.into_iter().map(|n| ImageFile::new(dir, n)).collect())
}

/// List matching images in `dir`, reporting failures as a diagnostic.
///
/// A missing or unreadable directory logs an error and yields an empty list;
/// callers treat "empty" as the single "nothing to do" signal.
pub fn list_images(dir: &Path, extensions: &[String]) -> Vec<ImageFile> {
    match try_list_images(dir, extensions) {
        Ok(files) => files,
        Err(e) => {
            error!("{}", e);
            Vec::new()
        }
    }
}

/// The default allowlist as owned strings.
pub fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"").unwrap();
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        let exts = default_extensions();
        assert!(has_image_extension("a.PNG", &exts));
        assert!(has_image_extension("shot.JpEg", &exts));
        assert!(has_image_extension("x.tiff", &exts));
        assert!(!has_image_extension("notes.txt", &exts));
        assert!(!has_image_extension("png", &exts));
        assert!(!has_image_extension("archive.png.zip", &exts));
        // Suffix must follow a dot.
        assert!(!has_image_extension("mypng", &exts));
    }

    #[test]
    fn lists_only_images_sorted() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["b.png", "a.JPG", "c.webp", "readme.md", "z.gif", "10.bmp", "2.bmp"] {
            touch(tmp.path(), name);
        }
        fs::create_dir(tmp.path().join("folder.png")).unwrap();

        let files = try_list_images(tmp.path(), &default_extensions()).unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["10.bmp", "2.bmp", "a.JPG", "b.png", "c.webp"]);
        assert_eq!(files[3].path, tmp.path().join("b.png"));
    }

    #[test]
    fn missing_directory_is_typed_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("does-not-exist");
        let err = try_list_images(&missing, &default_extensions()).unwrap_err();
        assert!(matches!(err, Img2PdfError::DirectoryNotFound { .. }));
    }

    #[test]
    fn missing_directory_yields_empty_list() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("does-not-exist");
        assert!(list_images(&missing, &default_extensions()).is_empty());
    }

    #[test]
    fn custom_allowlist() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "a.png");
        touch(tmp.path(), "b.jpg");
        let files = try_list_images(tmp.path(), &[".PNG".to_string()]).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "a.png");
    }
}
