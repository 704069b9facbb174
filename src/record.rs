use crate::util::cli::{Report, Reportable};
use serde::Deserialize;
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

pub static FILE_NAME: &str = "packageInfo.json";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read package record at {path:?}: {cause}")]
    ReadFailed { path: PathBuf, cause: io::Error },
    #[error("Failed to parse package record at {path:?}: {cause}")]
    ParseFailed {
        path: PathBuf,
        cause: serde_json::Error,
    },
}

impl Reportable for LoadError {
    fn report(&self) -> Report {
        Report::error("Failed to load package record", self)
    }
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct FirstPackage {
    #[serde(default)]
    pub items: Vec<String>,
}

/// A previously computed first-package selection.
///
/// Counts are whatever JSON numbers the editor wrote, so `10.0` is as good as
/// `10`, and either may be missing.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PackageRecord {
    pub total_count: Option<f64>,
    pub select_count: Option<f64>,
    #[serde(default)]
    pub first: FirstPackage,
}

impl PackageRecord {
    /// A record may be named directly, or by the directory holding it.
    pub fn resolve_path(path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_dir() {
            path.join(FILE_NAME)
        } else {
            path.to_owned()
        }
    }

    /// Returns `Ok(None)` if there's no record at `path`, or if the file is
    /// blank.
    pub fn load(path: impl AsRef<Path>) -> Result<Option<Self>, LoadError> {
        let path = Self::resolve_path(path);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(cause) if cause.kind() == io::ErrorKind::NotFound => {
                log::info!("no package record found at {:?}", path);
                return Ok(None);
            }
            Err(cause) => return Err(LoadError::ReadFailed { path, cause }),
        };
        if contents.trim().is_empty() {
            log::info!("package record at {:?} is empty", path);
            return Ok(None);
        }
        serde_json::from_str(&contents)
            .map(|record: Self| {
                log::info!(
                    "loaded package record from {:?}: {:?} of {:?} selected, {} first-package items",
                    path,
                    record.select_count,
                    record.total_count,
                    record.first.items.len()
                );
                Some(record)
            })
            .map_err(|cause| LoadError::ParseFailed { path, cause })
    }

    /// `(total, selected)` if every asset was selected. `selectCount` can
    /// exceed `totalCount` when assets get dragged into the first package by
    /// hand, which counts as a full selection too. A missing count never does.
    pub fn full_selection(&self) -> Option<(f64, f64)> {
        match (self.total_count, self.select_count) {
            (Some(total), Some(selected)) if total <= selected => Some((total, selected)),
            _ => None,
        }
    }
}

/// The identifiers that must ship in the first package: the record's items
/// plus any scenes the build names.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FirstPackageSet {
    ids: Vec<String>,
}

impl FirstPackageSet {
    pub fn new(
        items: impl IntoIterator<Item = impl Into<String>>,
        scenes: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            ids: items
                .into_iter()
                .map(Into::into)
                .chain(scenes.into_iter().map(Into::into))
                .collect(),
        }
    }

    pub fn from_record(record: &PackageRecord, scenes: &[String]) -> Self {
        Self::new(record.first.items.iter().cloned(), scenes.iter().cloned())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Containment, not equality: `a1` matches `a12` and `xa1y` too.
    pub fn contains_id(&self, asset_id: &str) -> bool {
        self.ids.iter().any(|id| asset_id.contains(id.as_str()))
    }

    pub fn matches(&self, path: impl AsRef<Path>) -> bool {
        asset_id(path.as_ref())
            .map(|asset_id| self.contains_id(&asset_id))
            .unwrap_or_default()
    }
}

/// The file name with its last extension stripped.
pub fn asset_id(path: &Path) -> Option<String> {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[rstest(path, id,
        case("res/raw-assets/a1.png", "a1"),
        case("res/import/0e/0e91c1a2-3b4c.json", "0e91c1a2-3b4c"),
        case("res/x.y.z", "x.y"),
        case("res/s9", "s9")
    )]
    fn test_asset_id(path: &str, id: &str) {
        assert_eq!(asset_id(Path::new(path)).as_deref(), Some(id));
    }

    #[rstest(asset, expected,
        case("a1", true),
        case("b2", true),
        case("s9", true),
        case("a12", true),
        case("xa1y", true),
        case("c3", false),
        case("a", false)
    )]
    fn test_contains_id(asset: &str, expected: bool) {
        let set = FirstPackageSet::new(vec!["a1", "b2"], vec!["s9"]);
        assert_eq!(set.contains_id(asset), expected);
    }

    #[test]
    fn matches_uses_file_stem() {
        let set = FirstPackageSet::new(vec!["a1"], Vec::<String>::new());
        assert!(set.matches("res/raw-assets/a1.png"));
        assert!(!set.matches("res/a1/c3.png"));
    }

    #[test]
    fn parses_record_json() {
        let record: PackageRecord = serde_json::from_str(
            r#"{"totalCount": 10, "selectCount": 4, "first": {"items": ["a1", "b2"]}, "extra": true}"#,
        )
        .unwrap();
        assert_eq!(record.total_count, Some(10.0));
        assert_eq!(record.select_count, Some(4.0));
        assert_eq!(record.first.items, vec!["a1", "b2"]);
        assert_eq!(record.full_selection(), None);
    }

    #[rstest(json, expected,
        case(r#"{"totalCount": 10, "selectCount": 4}"#, None),
        case(r#"{"totalCount": 10, "selectCount": 10}"#, Some((10.0, 10.0))),
        case(r#"{"totalCount": 10, "selectCount": 12}"#, Some((10.0, 12.0))),
        case(r#"{"totalCount": 10.0, "selectCount": 12.5}"#, Some((10.0, 12.5))),
        case(r#"{"totalCount": 10}"#, None),
        case(r#"{"selectCount": 3}"#, None),
        case(r#"{}"#, None)
    )]
    fn test_full_selection(json: &str, expected: Option<(f64, f64)>) {
        let record: PackageRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.full_selection(), expected);
    }

    #[test]
    fn load_missing_record_is_none() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(PackageRecord::load(tmp.path().join("nope.json")).unwrap(), None);
    }

    #[test]
    fn load_blank_record_is_none() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(FILE_NAME);
        fs::write(&path, "  \n").unwrap();
        assert_eq!(PackageRecord::load(&path).unwrap(), None);
    }

    #[test]
    fn load_from_directory() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(FILE_NAME),
            r#"{"totalCount": 3, "selectCount": 1, "first": {"items": ["a1"]}}"#,
        )
        .unwrap();
        let record = PackageRecord::load(tmp.path()).unwrap().unwrap();
        assert_eq!(record.first.items, vec!["a1"]);
    }

    #[test]
    fn load_malformed_record_fails() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(FILE_NAME);
        fs::write(&path, "{ totalCount: ").unwrap();
        assert!(matches!(
            PackageRecord::load(&path),
            Err(LoadError::ParseFailed { .. })
        ));
    }
}
