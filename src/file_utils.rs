use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use log::warn;
use tempfile::Builder;
use walkdir::WalkDir;

use crate::errors::AppError;

// @module: File and directory utilities

/// Extensions recognized as scanned images, matched case-insensitively
pub const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "tiff"];

/// One discovered input image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    path: PathBuf,
    file_name: String,
    extension: String,
}

impl ImageRef {
    // @creates: ImageRef from a path, None when it has no file name
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let path = path.as_ref();
        let file_name = path.file_name()?.to_string_lossy().to_string();
        let extension = path.extension()
            .map(|ext| ext.to_string_lossy().to_string())
            .unwrap_or_default();

        Some(Self {
            path: path.to_path_buf(),
            file_name,
            extension,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Base file name used in logs and reports
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Extension as found on disk (original case)
    pub fn extension(&self) -> &str {
        &self.extension
    }
}

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<(), AppError> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    /// Whether the path carries one of the recognized image extensions
    pub fn is_image_file<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .map(|ext| {
                let ext = ext.to_string_lossy();
                IMAGE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known))
            })
            .unwrap_or(false)
    }

    /// Enumerate the images directly inside `dir`.
    ///
    /// Only immediate entries are considered. The result is deduplicated and
    /// sorted by full path so repeated runs over an unchanged directory see
    /// the same order. An empty directory is a valid, empty result.
    pub fn discover_images<P: AsRef<Path>>(dir: P) -> Result<Vec<ImageRef>, AppError> {
        let dir = dir.as_ref();

        if !Self::dir_exists(dir) {
            return Err(AppError::Discovery(format!(
                "Input directory does not exist or is not a directory: {}",
                dir.display()
            )));
        }

        let mut paths = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                // The directory itself could not be listed
                Err(e) if e.depth() == 0 => {
                    return Err(AppError::Discovery(format!(
                        "Failed to read directory {}: {}",
                        dir.display(),
                        e
                    )));
                }
                // A bad entry only affects itself: an image name still becomes
                // an outcome (its read fails later), anything else is skipped
                Err(e) => {
                    match e.path() {
                        Some(path) if Self::is_image_file(path) => {
                            warn!("Unreadable image entry {}: {}", path.display(), e);
                            paths.push(path.to_path_buf());
                        }
                        _ => warn!("Skipping unreadable entry in {}: {}", dir.display(), e),
                    }
                    continue;
                }
            };
            let path = entry.path();

            if entry.file_type().is_file() && Self::is_image_file(path) {
                paths.push(path.to_path_buf());
            }
        }

        paths.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
        paths.dedup();

        Ok(paths.iter().filter_map(ImageRef::from_path).collect())
    }

    /// Read the raw bytes of an image
    pub async fn read_bytes<P: AsRef<Path>>(path: P) -> std::io::Result<Vec<u8>> {
        tokio::fs::read(path.as_ref()).await
    }

    /// Replace `path` with `content` atomically.
    ///
    /// The content is staged in a temporary file next to the target and then
    /// renamed over it, so a failed write never leaves a truncated file. An
    /// existing target keeps its permissions; a new one gets the same mode a
    /// plain file creation would.
    pub fn write_atomic<P: AsRef<Path>>(path: P, content: &str) -> Result<(), AppError> {
        let path = path.as_ref();
        let report_error = |e: &dyn std::fmt::Display| AppError::ReportWrite(format!("{}: {}", path.display(), e));
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        Self::ensure_dir(&parent).map_err(|e| report_error(&e))?;

        let existing = fs::metadata(path).ok().map(|meta| meta.permissions());

        let mut builder = Builder::new();
        builder.prefix(".ocrbatch-");
        if let Some(permissions) = Self::staging_permissions(existing.clone()) {
            builder.permissions(permissions);
        }
        let mut staged = builder.tempfile_in(&parent).map_err(|e| report_error(&e))?;

        staged.write_all(content.as_bytes())
            .and_then(|_| staged.flush())
            .map_err(|e| report_error(&e))?;
        // Creation is subject to the umask; an existing target's mode is restored exactly
        if let Some(permissions) = existing {
            staged.as_file().set_permissions(permissions).map_err(|e| report_error(&e))?;
        }
        staged.persist(path).map_err(|e| report_error(&e.error))?;

        Ok(())
    }

    #[cfg(unix)]
    fn staging_permissions(existing: Option<fs::Permissions>) -> Option<fs::Permissions> {
        use std::os::unix::fs::PermissionsExt;
        Some(existing.unwrap_or_else(|| fs::Permissions::from_mode(0o666)))
    }

    #[cfg(not(unix))]
    fn staging_permissions(existing: Option<fs::Permissions>) -> Option<fs::Permissions> {
        existing
    }
}
