//! Splits a built resource directory into the first package and the remote
//! bundle.
//!
//! After a split, `res` holds only the first-package files and `remote_res`
//! holds the *entire* pre-split tree, since the resource directory is renamed
//! wholesale rather than filtered. The final pair of renames isn't atomic;
//! an interruption between them leaves `res` missing and no rollback is
//! attempted.

use crate::{
    opts::SkipRecord,
    record::{self, FirstPackageSet, PackageRecord},
    tree,
    util::{
        self,
        cli::{Report, Reportable},
        PathNotPrefixed,
    },
};
use std::{
    fmt::{self, Display},
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

pub static RESOURCE_DIR_NAME: &str = "res";
pub static REMOTE_DIR_NAME: &str = "remote_res";
pub static TEMP_DIR_NAME: &str = "temp_res";

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    RecreateFailed(#[from] tree::RecreateError),
    #[error(transparent)]
    CopyFailed(#[from] tree::CopyError),
    #[error(transparent)]
    TraversalFailed(#[from] tree::TraversalError),
    #[error(transparent)]
    RecordLoadFailed(#[from] record::LoadError),
    #[error(transparent)]
    PathOutsideRoot(#[from] PathNotPrefixed),
    #[error("Failed to clear the way for {path:?}: {cause}")]
    RemoteClearFailed {
        path: PathBuf,
        #[source]
        cause: io::Error,
    },
    #[error("Failed to rename {from:?} to {to:?}: {cause}")]
    RenameFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        cause: io::Error,
    },
}

impl Reportable for Error {
    fn report(&self) -> Report {
        match self {
            Self::RecordLoadFailed(err) => err.report(),
            Self::RenameFailed { .. } => Report::error(
                "Failed to swap the first package into place",
                format!(
                    "{}; the resource directories may be left half-swapped, so rebuild before trying again.",
                    self
                ),
            ),
            _ => Report::error("Failed to split first package", self),
        }
    }
}

/// The three directories a split touches.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Layout {
    resource_dir: PathBuf,
    remote_dir: PathBuf,
    temp_dir: PathBuf,
}

impl Layout {
    pub fn new(
        resource_dir: impl Into<PathBuf>,
        remote_dir: impl Into<PathBuf>,
        temp_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            resource_dir: resource_dir.into(),
            remote_dir: remote_dir.into(),
            temp_dir: temp_dir.into(),
        }
    }

    /// `res`, `remote_res` and `temp_res` under a build's output directory.
    pub fn under(dest: impl AsRef<Path>) -> Self {
        let dest = dest.as_ref();
        Self::new(
            util::prefix_path(dest, RESOURCE_DIR_NAME),
            util::prefix_path(dest, REMOTE_DIR_NAME),
            util::prefix_path(dest, TEMP_DIR_NAME),
        )
    }

    pub fn resource_dir(&self) -> &Path {
        &self.resource_dir
    }

    pub fn remote_dir(&self) -> &Path {
        &self.remote_dir
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Outcome {
    /// Record was skipped; everything was copied to the remote dir.
    Skipped,
    /// No record (or a blank one) was found, so nothing was split.
    NoRecord,
    /// Every asset was already selected; everything was copied to the remote dir.
    AllSelected { total: f64, selected: f64 },
    /// `kept` of `total` files stayed in the first package.
    Split { kept: usize, total: usize },
}

impl Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skipped => write!(f, "package record skipped; all resources are remote"),
            Self::NoRecord => write!(f, "no package record; resources left as-is"),
            Self::AllSelected { total, selected } => write!(
                f,
                "{} of {} assets selected; all resources are remote",
                selected, total
            ),
            Self::Split { kept, total } => {
                write!(f, "kept {} of {} files in the first package", kept, total)
            }
        }
    }
}

fn split(layout: &Layout, first_package: &FirstPackageSet) -> Result<Outcome, Error> {
    tree::recreate_dir(&layout.temp_dir)?;
    let files = tree::list_files(&layout.resource_dir)?;
    let total = files.len();
    let mut kept = 0;
    for path in files {
        if first_package.matches(&path) {
            let dest = util::rebase_path(&path, &layout.resource_dir, &layout.temp_dir)?;
            tree::copy_file(&path, &dest)?;
            kept += 1;
        } else {
            log::debug!("leaving {:?} out of the first package", path);
        }
    }

    // `remote_dir` is still the empty dir we made, and some platforms won't
    // rename onto an existing directory.
    fs::remove_dir(&layout.remote_dir).map_err(|cause| Error::RemoteClearFailed {
        path: layout.remote_dir.clone(),
        cause,
    })?;
    rename(&layout.resource_dir, &layout.remote_dir)?;
    rename(&layout.temp_dir, &layout.resource_dir)?;
    Ok(Outcome::Split { kept, total })
}

fn rename(from: &Path, to: &Path) -> Result<(), Error> {
    log::info!("renaming {:?} to {:?}", from, to);
    fs::rename(from, to).map_err(|cause| Error::RenameFailed {
        from: from.to_owned(),
        to: to.to_owned(),
        cause,
    })
}

/// Splits `layout.resource_dir()` into the first package and the remote
/// bundle.
///
/// `scenes` always ship in the first package, in addition to the record's
/// items. A missing or blank record at `record_path` leaves the resource dir
/// alone, with an empty remote dir.
pub fn partition(
    layout: &Layout,
    record_path: impl AsRef<Path>,
    scenes: &[String],
    skip_record: SkipRecord,
) -> Result<Outcome, Error> {
    tree::recreate_dir(&layout.remote_dir)?;

    if skip_record.yes() {
        tree::copy_tree(&layout.resource_dir, &layout.remote_dir)?;
        return Ok(Outcome::Skipped);
    }

    log::info!("moving first package files");
    let record = match PackageRecord::load(record_path)? {
        Some(record) => record,
        None => return Ok(Outcome::NoRecord),
    };

    if let Some((total, selected)) = record.full_selection() {
        tree::copy_tree(&layout.resource_dir, &layout.remote_dir)?;
        return Ok(Outcome::AllSelected { total, selected });
    }

    let first_package = FirstPackageSet::from_record(&record, scenes);
    log::info!(
        "splitting {:?} with {} first-package identifiers",
        layout.resource_dir,
        first_package.len()
    );
    split(layout, &first_package)
}
