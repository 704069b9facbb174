//! Bakes instant-game routing into a generated native project.

mod gradle;
mod main_js;
mod shim;
mod strings_xml;

use crate::{
    config::Routing,
    opts::Flavor,
    tree,
    util::{
        self,
        cli::{Report, Reportable},
    },
};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

pub static ANDROID_PROJECT_DIR: &str = "frameworks/runtime-src/proj.android-studio";
pub static SCRIPT_DIR: &str = "src";

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to read {path:?}: {cause}")]
    ReadFailed { path: PathBuf, cause: io::Error },
    #[error("Failed to write {path:?}: {cause}")]
    WriteFailed { path: PathBuf, cause: io::Error },
    #[error("Failed to install downloader scripts: {0}")]
    ShimCopyFailed(#[from] tree::CopyError),
    #[error("Failed to render gradle properties: {0}")]
    PropertiesRenderFailed(java_properties::PropertiesError),
    #[error("{path:?} has no closing `</resources>` tag")]
    ResourcesTagMissing { path: PathBuf },
}

impl Reportable for Error {
    fn report(&self) -> Report {
        Report::error("Failed to patch Android Instant project", self)
    }
}

pub(crate) fn read(path: &Path) -> Result<Option<String>, Error> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(cause) if cause.kind() == io::ErrorKind::NotFound => {
            log::info!("{:?} doesn't exist; skipping", path);
            Ok(None)
        }
        Err(cause) => Err(Error::ReadFailed {
            path: path.to_owned(),
            cause,
        }),
    }
}

pub(crate) fn write(path: &Path, contents: &str) -> Result<(), Error> {
    log::info!("writing {:?}", path);
    fs::write(path, contents).map_err(|cause| Error::WriteFailed {
        path: path.to_owned(),
        cause,
    })
}

/// The files a patch run changed.
#[derive(Debug, Default)]
pub struct Patched {
    pub scripts_installed: usize,
    pub changed: Vec<PathBuf>,
}

impl Patched {
    fn record(&mut self, path: PathBuf, changed: bool) {
        if changed {
            self.changed.push(path);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.scripts_installed == 0 && self.changed.is_empty()
    }
}

pub fn android_project_dir(dest: impl AsRef<Path>) -> PathBuf {
    util::prefix_path(dest, ANDROID_PROJECT_DIR)
}

/// Installs the downloader scripts and writes `routing` into the project at
/// `dest`. Files that don't exist are skipped, and anything already patched
/// is left alone, so running this twice is harmless.
pub fn patch(dest: impl AsRef<Path>, routing: &Routing) -> Result<Patched, Error> {
    let dest = dest.as_ref();
    log::info!("adding Android Instant support to {:?}", dest);
    let mut patched = Patched::default();

    let script_dir = util::prefix_path(dest, SCRIPT_DIR);
    if let Some(shim_dir) = routing.shim_dir() {
        patched.scripts_installed = shim::install(shim_dir, &script_dir)?;
    }
    let downloader = script_dir.join(shim::DOWNLOADER);
    let changed = shim::set_remote_server(&downloader, routing.remote_server_root())?;
    patched.record(downloader, changed);

    let main_js = util::prefix_path(dest, main_js::FILE_NAME);
    let changed = main_js::add_requires(&main_js, &shim::REQUIRES)?;
    patched.record(main_js, changed);

    let project_dir = android_project_dir(dest);
    match routing.flavor() {
        Flavor::GradleProperties => {
            let properties = project_dir.join(gradle::PROPERTIES_FILE_NAME);
            let changed = gradle::add_properties(&properties, routing)?;
            patched.record(properties, changed);

            let build_gradle = project_dir.join(gradle::BUILD_GRADLE_PATH);
            let changed = gradle::add_manifest_placeholders(&build_gradle)?;
            patched.record(build_gradle, changed);
        }
        Flavor::StringsXml => {
            let strings = project_dir.join(strings_xml::PATH);
            let changed = strings_xml::add_strings(&strings, routing)?;
            patched.record(strings, changed);
        }
    }

    Ok(patched)
}
