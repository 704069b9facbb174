use std::{
    fmt::{self, Display},
    path::{Component, Path, PathBuf},
};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Failed to get user's home directory!")]
pub struct NoHomeDir;

pub fn home_dir() -> Result<PathBuf, NoHomeDir> {
    home::home_dir().ok_or(NoHomeDir)
}

pub fn expand_home(path: impl AsRef<Path>) -> Result<PathBuf, NoHomeDir> {
    let path = path.as_ref();
    if let Ok(path) = path.strip_prefix("~") {
        home_dir().map(|home| home.join(path))
    } else {
        Ok(path.to_owned())
    }
}

#[derive(Debug)]
pub struct PathNotPrefixed {
    path: PathBuf,
    prefix: PathBuf,
}

impl Display for PathNotPrefixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Path {:?} didn't have prefix {:?}.",
            self.path, self.prefix
        )
    }
}

impl std::error::Error for PathNotPrefixed {}

/// Joins `path` onto `root`, resolving `.` and `..` by hand when `root` is a
/// verbatim (`\\?\`) path, since those aren't normalized by the OS.
pub fn prefix_path(root: impl AsRef<Path>, path: impl AsRef<Path>) -> PathBuf {
    let root = root.as_ref();
    let path = path.as_ref();
    let is_verbatim = if let Some(Component::Prefix(prefix)) = root.components().next() {
        prefix.kind().is_verbatim()
    } else {
        false
    };
    if !is_verbatim {
        return root.join(path);
    }
    let mut buf = root.components().collect::<Vec<_>>();
    for component in path.components() {
        match component {
            Component::RootDir => {
                buf.truncate(1);
                buf.push(component);
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if buf.last().is_some() {
                    buf.pop();
                }
            }
            _ => buf.push(component),
        };
    }
    buf.into_iter().collect()
}

pub fn unprefix_path(
    root: impl AsRef<Path>,
    path: impl AsRef<Path>,
) -> Result<PathBuf, PathNotPrefixed> {
    let root = root.as_ref();
    let path = path.as_ref();
    path.strip_prefix(root)
        .map(|path| path.to_owned())
        .map_err(|_| PathNotPrefixed {
            path: path.to_owned(),
            prefix: root.to_owned(),
        })
}

/// Moves `path` from under `from` to the same relative location under `to`.
pub fn rebase_path(
    path: impl AsRef<Path>,
    from: impl AsRef<Path>,
    to: impl AsRef<Path>,
) -> Result<PathBuf, PathNotPrefixed> {
    unprefix_path(from, path).map(|rel| prefix_path(to, rel))
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;

    #[rstest(root, path, result,
        #[cfg(unix)]
        case(
            "/home/user/game/build/android-instant",
            "res/import/0e/0e91c.json",
            "/home/user/game/build/android-instant/res/import/0e/0e91c.json"
        ),
        #[cfg(unix)]
        case(
            "/home/user/game/build/android-instant",
            "/tmp/res/raw-assets/a1.png",
            "/tmp/res/raw-assets/a1.png"
        ),
        #[cfg(windows)]
        case(
            "\\\\?\\C:\\Users\\user\\game\\build\\android-instant",
            "res\\..\\res\\import\\.\\0e91c.json",
            "\\\\?\\C:\\Users\\user\\game\\build\\android-instant\\res\\import\\0e91c.json"
        )
    )]
    fn test_prefix_path(root: impl AsRef<Path>, path: impl AsRef<Path>, result: &str) {
        assert_eq!(prefix_path(root, path), PathBuf::from(result));
    }

    #[rstest(path, result,
        case("build/res/raw-assets/a1/a1.png", "build/temp_res/raw-assets/a1/a1.png"),
        case("build/res/s9.json", "build/temp_res/s9.json")
    )]
    fn test_rebase_path(path: &str, result: &str) {
        assert_eq!(
            rebase_path(path, "build/res", "build/temp_res").unwrap(),
            PathBuf::from(result)
        );
    }

    #[test]
    fn rebase_path_outside_root_fails() {
        // Only whole components count; `res_extra` isn't under `res`.
        assert!(rebase_path("build/res_extra/a1.png", "build/res", "build/temp_res").is_err());
    }

    #[test]
    fn expand_home_leaves_plain_paths_alone() {
        assert_eq!(
            expand_home("settings/android-instant").unwrap(),
            PathBuf::from("settings/android-instant")
        );
    }
}
