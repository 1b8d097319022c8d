//! Image discovery under a tree root.
//!
//! Only the source tree is scanned. Each discovered file is identified by an
//! [`ImagePath`], its path relative to the root with `/` separators, which
//! is then used as the join key into the target tree.

use std::cmp::Ordering;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use walkdir::{DirEntry, WalkDir};

use crate::error::{Error, Result};

/// Recognized image extensions, matched case-insensitively.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Relative path of an image, shared by the source and target trees.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImagePath(String);

impl ImagePath {
    /// The path as a `/`-separated string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parent directory portion, or `""` for images directly under the root.
    #[must_use]
    pub fn parent(&self) -> &str {
        self.0.rsplit_once('/').map_or("", |(dir, _)| dir)
    }

    /// Resolve this relative path against a tree root.
    #[must_use]
    pub fn resolve(&self, root: &Path) -> PathBuf {
        self.0
            .split('/')
            .filter(|segment| !segment.is_empty())
            .fold(root.to_path_buf(), |path, segment| path.join(segment))
    }
}

impl From<&str> for ImagePath {
    fn from(path: &str) -> Self {
        Self(path.to_string())
    }
}

impl From<String> for ImagePath {
    fn from(path: String) -> Self {
        Self(path)
    }
}

impl AsRef<str> for ImagePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImagePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Check whether a file name carries a recognized image extension.
///
/// Names without a `.` are never images.
#[must_use]
pub fn is_image_file(file_name: &str) -> bool {
    file_name.rsplit_once('.').is_some_and(|(_, ext)| {
        IMAGE_EXTENSIONS
            .iter()
            .any(|known| ext.eq_ignore_ascii_case(known))
    })
}

/// Recursively list the images under `root`.
///
/// Directory entries are visited in name order, with each directory's
/// subdirectories expanded before its own files are listed.
pub fn scan(root: impl AsRef<Path>) -> Result<Vec<ImagePath>> {
    let root = root.as_ref();

    if !root.exists() {
        return Err(Error::DirectoryNotFound { path: root.to_path_buf() });
    }
    if !root.is_dir() {
        return Err(Error::NotADirectory { path: root.to_path_buf() });
    }

    let walker = WalkDir::new(root)
        .min_depth(1)
        .follow_links(true)
        .sort_by(directories_first);

    let mut images = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => match dangling_link(&err) {
                // Kept so the pair reports the missing source file.
                Some(path) => {
                    push_image(&mut images, path, root)?;
                    continue;
                }
                None => return Err(scan_error(err, root)),
            },
        };
        if entry.file_type().is_dir() {
            continue;
        }
        push_image(&mut images, entry.path(), root)?;
    }

    log::debug!("Scanned {} images under {}", images.len(), root.display());
    Ok(images)
}

/// Append `path` if its name carries an image extension.
///
/// A name that is not valid UTF-8 is matched lossily, so an image with such
/// a name is rejected with [`Error::NonUtf8Path`] instead of being skipped.
fn push_image(images: &mut Vec<ImagePath>, path: &Path, root: &Path) -> Result<()> {
    let is_image = path
        .file_name()
        .is_some_and(|name| is_image_file(&name.to_string_lossy()));
    if is_image {
        images.push(relative_image_path(path, root)?);
    }
    Ok(())
}

/// A symlink below the root whose target does not exist.
fn dangling_link(err: &walkdir::Error) -> Option<&Path> {
    if err.depth() == 0 {
        return None;
    }
    let path = err.path()?;
    let metadata = fs::symlink_metadata(path).ok()?;
    (metadata.file_type().is_symlink() && !path.exists()).then_some(path)
}

/// Directory test that sees through symlinks, which walkdir has not
/// followed yet when it sorts.
fn is_directory(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() || (entry.path_is_symlink() && entry.path().is_dir())
}

fn directories_first(a: &DirEntry, b: &DirEntry) -> Ordering {
    is_directory(b)
        .cmp(&is_directory(a))
        .then_with(|| a.file_name().cmp(b.file_name()))
}

fn relative_image_path(path: &Path, root: &Path) -> Result<ImagePath> {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let mut segments = Vec::new();
    for component in relative.components() {
        if let Component::Normal(segment) = component {
            let segment = segment
                .to_str()
                .ok_or_else(|| Error::NonUtf8Path { path: path.to_path_buf() })?;
            segments.push(segment);
        }
    }
    Ok(ImagePath(segments.join("/")))
}

fn scan_error(err: walkdir::Error, root: &Path) -> Error {
    let path = err.path().unwrap_or(root).to_path_buf();
    match err.io_error().map(io::Error::kind) {
        Some(io::ErrorKind::NotFound) => Error::DirectoryNotFound { path },
        Some(io::ErrorKind::PermissionDenied) => Error::PermissionDenied { path },
        _ => Error::Io(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file("a.png"));
        assert!(is_image_file("c.JPG"));
        assert!(is_image_file("d.Jpeg"));
        assert!(is_image_file("archive.tar.png"));
        assert!(!is_image_file("b.txt"));
        assert!(!is_image_file("png"));
        assert!(!is_image_file("image.webp"));
    }

    #[test]
    fn test_scan_filters_extensions() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.png");
        touch(dir.path(), "b.txt");
        touch(dir.path(), "c.JPG");
        touch(dir.path(), "noext");

        let images = scan(dir.path()).unwrap();
        let names: Vec<&str> = images.iter().map(ImagePath::as_str).collect();
        assert_eq!(names, vec!["a.png", "c.JPG"]);
    }

    #[test]
    fn test_scan_subdirectories_before_files() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "top.png");
        touch(dir.path(), "b/2.png");
        touch(dir.path(), "a/1.png");
        touch(dir.path(), "a/deep/0.jpeg");
        touch(dir.path(), "a/readme.md");

        let images = scan(dir.path()).unwrap();
        let names: Vec<&str> = images.iter().map(ImagePath::as_str).collect();
        assert_eq!(names, vec!["a/deep/0.jpeg", "a/1.png", "b/2.png", "top.png"]);
    }

    #[test]
    fn test_scan_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = scan(&missing).unwrap_err();
        assert!(matches!(err, Error::DirectoryNotFound { path } if path == missing));
    }

    #[test]
    fn test_scan_file_root() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.png");
        let err = scan(dir.path().join("a.png")).unwrap_err();
        assert!(matches!(err, Error::NotADirectory { .. }));
    }

    #[test]
    fn test_scan_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(scan(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_image_path_parts() {
        let path = ImagePath::from("scene/views/01.png");
        assert_eq!(path.parent(), "scene/views");
        assert_eq!(ImagePath::from("01.png").parent(), "");
    }

    #[test]
    fn test_image_path_resolve() {
        let path = ImagePath::from("scene/01.png");
        assert_eq!(
            path.resolve(Path::new("/data/source")),
            Path::new("/data/source").join("scene").join("01.png")
        );
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_scan_rejects_non_utf8_image_name() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "ok.png");
        let bad = dir.path().join(OsStr::from_bytes(b"bad\xff.png"));
        fs::write(&bad, b"").unwrap();
        // Non-images are still ignored whatever their name.
        fs::write(dir.path().join(OsStr::from_bytes(b"notes\xff.txt")), b"").unwrap();

        let err = scan(dir.path()).unwrap_err();
        assert!(matches!(err, Error::NonUtf8Path { path } if path == bad));
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_keeps_dangling_image_link() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.png");
        std::os::unix::fs::symlink(dir.path().join("gone.png"), dir.path().join("x.png")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone.txt"), dir.path().join("y.txt")).unwrap();

        let images = scan(dir.path()).unwrap();
        let names: Vec<&str> = images.iter().map(ImagePath::as_str).collect();
        assert_eq!(names, vec!["a.png", "x.png"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_linked_directory_sorts_as_directory() {
        let dir = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        touch(outside.path(), "1.png");
        touch(dir.path(), "a.png");
        std::os::unix::fs::symlink(outside.path(), dir.path().join("link")).unwrap();

        let images = scan(dir.path()).unwrap();
        let names: Vec<&str> = images.iter().map(ImagePath::as_str).collect();
        assert_eq!(names, vec!["link/1.png", "a.png"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_unreadable_subdirectory() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "locked/1.png");
        let locked = dir.path().join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Permission bits are not enforced for privileged users.
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let result = scan(dir.path());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        assert!(matches!(result, Err(Error::PermissionDenied { path }) if path == locked));
    }
}
