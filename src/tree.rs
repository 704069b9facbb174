//! Filesystem tree helpers used when splitting resource directories.

use crate::util::{self, PathNotPrefixed};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// An error encountered when traversing a file tree.
#[derive(Debug, Error)]
pub enum TraversalError {
    /// Failed to get directory listing.
    #[error("Failed to read directory at {path:?}: {cause}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        cause: io::Error,
    },
    /// Failed to inspect entry from directory listing.
    #[error("Failed to read directory entry in {dir:?}: {cause}")]
    EntryRead {
        dir: PathBuf,
        #[source]
        cause: io::Error,
    },
}

fn read_dir_sorted(dir: &Path) -> Result<Vec<PathBuf>, TraversalError> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(|cause| TraversalError::DirectoryRead {
        path: dir.to_owned(),
        cause,
    })? {
        paths.push(
            entry
                .map_err(|cause| TraversalError::EntryRead {
                    dir: dir.to_owned(),
                    cause,
                })?
                .path(),
        );
    }
    paths.sort();
    Ok(paths)
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), TraversalError> {
    for path in read_dir_sorted(dir)? {
        if path.is_dir() {
            collect_files(&path, files)?;
        } else {
            files.push(path);
        }
    }
    Ok(())
}

/// Lists every file under `root`, recursively. Directories themselves aren't
/// listed. Entries are sorted within each directory, so the order is stable
/// between runs.
pub fn list_files(root: impl AsRef<Path>) -> Result<Vec<PathBuf>, TraversalError> {
    let mut files = Vec::new();
    collect_files(root.as_ref(), &mut files).map(|()| files)
}

#[derive(Debug, Error)]
pub enum CopyError {
    #[error(transparent)]
    TraversalFailed(#[from] TraversalError),
    #[error(transparent)]
    PathOutsideRoot(#[from] PathNotPrefixed),
    #[error("Failed to create directory at {path:?}: {cause}")]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        cause: io::Error,
    },
    #[error("Failed to copy file at {src:?} to {dest:?}: {cause}")]
    FileCopyFailed {
        src: PathBuf,
        dest: PathBuf,
        #[source]
        cause: io::Error,
    },
}

/// Copies the file at `src` to `dest`, creating `dest`'s parent directories.
pub fn copy_file(src: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<(), CopyError> {
    let (src, dest) = (src.as_ref(), dest.as_ref());
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|cause| CopyError::DirectoryCreationFailed {
            path: parent.to_owned(),
            cause,
        })?;
    }
    log::debug!("copying {:?} to {:?}", src, dest);
    fs::copy(src, dest)
        .map(|_| ())
        .map_err(|cause| CopyError::FileCopyFailed {
            src: src.to_owned(),
            dest: dest.to_owned(),
            cause,
        })
}

fn copy_dir(src: &Path, dest: &Path, copied: &mut usize) -> Result<(), CopyError> {
    fs::create_dir_all(dest).map_err(|cause| CopyError::DirectoryCreationFailed {
        path: dest.to_owned(),
        cause,
    })?;
    for path in read_dir_sorted(src)? {
        let dest = util::rebase_path(&path, src, dest)?;
        if path.is_dir() {
            copy_dir(&path, &dest, copied)?;
        } else {
            copy_file(&path, &dest)?;
            *copied += 1;
        }
    }
    Ok(())
}

/// Copies the whole tree at `src` into `dest`, merging with anything already
/// there. Returns the number of files copied.
pub fn copy_tree(src: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<usize, CopyError> {
    let (src, dest) = (src.as_ref(), dest.as_ref());
    log::info!("copying tree at {:?} to {:?}", src, dest);
    let mut copied = 0;
    copy_dir(src, dest, &mut copied).map(|()| copied)
}

#[derive(Debug, Error)]
pub enum RecreateError {
    #[error("Failed to remove directory at {path:?}: {cause}")]
    RemoveFailed {
        path: PathBuf,
        #[source]
        cause: io::Error,
    },
    #[error("Failed to create directory at {path:?}: {cause}")]
    CreateFailed {
        path: PathBuf,
        #[source]
        cause: io::Error,
    },
}

/// Makes sure an empty directory exists at `path`, discarding anything that
/// was there before.
pub fn recreate_dir(path: impl AsRef<Path>) -> Result<(), RecreateError> {
    let path = path.as_ref();
    if path.is_dir() {
        fs::remove_dir_all(path).map_err(|cause| RecreateError::RemoveFailed {
            path: path.to_owned(),
            cause,
        })?;
    } else if path.exists() {
        fs::remove_file(path).map_err(|cause| RecreateError::RemoveFailed {
            path: path.to_owned(),
            cause,
        })?;
    }
    fs::create_dir_all(path).map_err(|cause| RecreateError::CreateFailed {
        path: path.to_owned(),
        cause,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn list_files_recurses_and_skips_dirs() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "b.png", "b");
        touch(tmp.path(), "import/0e/0e91c.json", "{}");
        touch(tmp.path(), "a.png", "a");
        fs::create_dir_all(tmp.path().join("empty")).unwrap();
        let files = list_files(tmp.path()).unwrap();
        assert_eq!(
            files,
            vec![
                tmp.path().join("a.png"),
                tmp.path().join("b.png"),
                tmp.path().join("import/0e/0e91c.json"),
            ]
        );
    }

    #[test]
    fn list_files_on_missing_dir_fails() {
        let tmp = TempDir::new().unwrap();
        let err = list_files(tmp.path().join("nope")).unwrap_err();
        assert!(matches!(err, TraversalError::DirectoryRead { .. }));
    }

    #[test]
    fn copy_tree_preserves_layout() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("res");
        touch(&src, "raw-assets/a1/a1.png", "png");
        touch(&src, "s9.json", "scene");
        fs::create_dir_all(src.join("empty")).unwrap();
        let dest = tmp.path().join("remote_res");
        assert_eq!(copy_tree(&src, &dest).unwrap(), 2);
        assert_eq!(
            fs::read_to_string(dest.join("raw-assets/a1/a1.png")).unwrap(),
            "png"
        );
        assert_eq!(fs::read_to_string(dest.join("s9.json")).unwrap(), "scene");
        assert!(dest.join("empty").is_dir());
    }

    #[test]
    fn recreate_dir_empties_existing_dir() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("remote_res");
        touch(&dir, "stale/c3.png", "old");
        recreate_dir(&dir).unwrap();
        assert!(dir.is_dir());
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
    }

    #[test]
    fn recreate_dir_creates_missing_dir() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("a/b/temp_res");
        recreate_dir(&dir).unwrap();
        assert!(dir.is_dir());
    }
}
