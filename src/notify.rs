use crate::util::cli::{Report, Reportable, TextWrapper};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Failed to create directory at {path:?}: {cause}")]
    DirectoryCreationFailed { path: PathBuf, cause: io::Error },
    #[error("Failed to write preview path to {path:?}: {cause}")]
    WriteFailed { path: PathBuf, cause: io::Error },
}

impl Reportable for NotifyError {
    fn report(&self) -> Report {
        Report::error("Failed to announce remote bundle to the preview server", self)
    }
}

/// Tells whoever runs the preview server where the remote bundle lives.
pub trait PreviewNotifier {
    fn announce(&self, remote_dir: &Path) -> Result<(), NotifyError>;
}

/// Announces by printing, for when a person is watching the build.
#[derive(Debug)]
pub struct LogNotifier<'a> {
    wrapper: &'a TextWrapper,
}

impl<'a> LogNotifier<'a> {
    pub fn new(wrapper: &'a TextWrapper) -> Self {
        Self { wrapper }
    }
}

impl PreviewNotifier for LogNotifier<'_> {
    fn announce(&self, remote_dir: &Path) -> Result<(), NotifyError> {
        log::info!("remote bundle is at {:?}", remote_dir);
        Report::victory(
            "Remote bundle ready for preview",
            format!("Serve {:?} from your preview server.", remote_dir),
        )
        .print(self.wrapper);
        Ok(())
    }
}

/// Announces by writing the remote bundle's path to a file the host watches.
#[derive(Debug)]
pub struct FileNotifier {
    path: PathBuf,
}

impl FileNotifier {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreviewNotifier for FileNotifier {
    fn announce(&self, remote_dir: &Path) -> Result<(), NotifyError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|cause| NotifyError::DirectoryCreationFailed {
                path: parent.to_owned(),
                cause,
            })?;
        }
        log::info!(
            "writing preview path {:?} to {:?}",
            remote_dir,
            self.path
        );
        fs::write(&self.path, format!("{}\n", remote_dir.display())).map_err(|cause| {
            NotifyError::WriteFailed {
                path: self.path.clone(),
                cause,
            }
        })
    }
}
