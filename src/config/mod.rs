mod raw;

pub use self::raw::{LoadError, PartitionRaw, Raw, RoutingRaw};
use crate::{
    opts::{Flavor, SkipRecord},
    util::{
        self,
        cli::{Report, Reportable},
        NoHomeDir,
    },
};
use std::{
    fmt::{self, Display},
    io,
    path::{Path, PathBuf},
};

static DEFAULT_RECORD_PATH: &str = ".";
static DEFAULT_SCHEME: &str = "https";
static DEFAULT_PATH_PATTERN: &str = "/";

#[derive(Debug)]
pub enum RoutingInvalid {
    RemoteServerRootMissing,
    HostMissing,
    SchemeInvalid { scheme: String },
}

impl Display for RoutingInvalid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RemoteServerRootMissing => {
                write!(f, "`routing.remote-server-root` must be set to a non-empty URL")
            }
            Self::HostMissing => write!(f, "`routing.host` must be set to a non-empty host"),
            Self::SchemeInvalid { scheme } => write!(
                f,
                "`routing.scheme` {:?} should be a bare scheme like \"https\", without \":\" or \"/\"",
                scheme
            ),
        }
    }
}

#[derive(Debug)]
pub enum FromRawError {
    RoutingInvalid(RoutingInvalid),
    RecordPathInvalid(NoHomeDir),
}

impl Display for FromRawError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RoutingInvalid(err) => write!(f, "{}", err),
            Self::RecordPathInvalid(err) => {
                write!(f, "`partition.record-path` couldn't be expanded: {}", err)
            }
        }
    }
}

#[derive(Debug)]
pub enum Error {
    LoadFailed(LoadError),
    CanonicalizeFailed { path: PathBuf, cause: io::Error },
    FromRawFailed { path: PathBuf, cause: FromRawError },
}

impl Reportable for Error {
    fn report(&self) -> Report {
        match self {
            Self::LoadFailed(err) => Report::error("Failed to load config", err),
            Self::CanonicalizeFailed { path, cause } => Report::error(
                "Failed to load config",
                format!("Failed to canonicalize root dir {:?}: {}", path, cause),
            ),
            Self::FromRawFailed { path, cause } => {
                Report::error(format!("Config file at {:?} invalid", path), cause)
            }
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Partition {
    record_path: PathBuf,
    skip_record: SkipRecord,
}

impl Partition {
    fn from_raw(root_dir: &Path, raw: Option<PartitionRaw>) -> Result<Self, FromRawError> {
        let raw = raw.unwrap_or_default();
        let record_path = match raw.record_path {
            Some(record_path) => {
                if record_path == Path::new(DEFAULT_RECORD_PATH) {
                    log::warn!(
                        "`partition.record-path` is set to the default value; you can remove it from your config"
                    );
                }
                util::expand_home(record_path).map_err(FromRawError::RecordPathInvalid)?
            }
            None => {
                log::info!(
                    "`partition.record-path` not set; defaulting to {:?}",
                    DEFAULT_RECORD_PATH
                );
                PathBuf::from(DEFAULT_RECORD_PATH)
            }
        };
        Ok(Self {
            record_path: util::prefix_path(root_dir, record_path),
            skip_record: SkipRecord::from_flag(raw.skip_record.unwrap_or_default()),
        })
    }

    pub fn record_path(&self) -> &Path {
        &self.record_path
    }

    pub fn skip_record(&self) -> SkipRecord {
        self.skip_record
    }

    pub fn with_record_path(mut self, record_path: impl Into<PathBuf>) -> Self {
        self.record_path = record_path.into();
        self
    }

    pub fn with_skip_record(mut self, skip_record: SkipRecord) -> Self {
        self.skip_record = skip_record;
        self
    }
}

/// Where an installed instant app sends its users, and how that gets baked
/// into the native project.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Routing {
    remote_server_root: String,
    scheme: String,
    host: String,
    path_pattern: String,
    flavor: Flavor,
    shim_dir: Option<PathBuf>,
}

impl Routing {
    fn from_raw(root_dir: &Path, raw: RoutingRaw) -> Result<Self, RoutingInvalid> {
        let remote_server_root = raw
            .remote_server_root
            .filter(|root| !root.trim().is_empty())
            .ok_or(RoutingInvalid::RemoteServerRootMissing)?;
        let host = raw
            .host
            .filter(|host| !host.trim().is_empty())
            .ok_or(RoutingInvalid::HostMissing)?;

        let scheme = raw.scheme.unwrap_or_else(|| {
            log::info!(
                "`routing.scheme` not set; defaulting to {:?}",
                DEFAULT_SCHEME
            );
            DEFAULT_SCHEME.to_owned()
        });
        if scheme.is_empty() || scheme.contains(':') || scheme.contains('/') {
            return Err(RoutingInvalid::SchemeInvalid { scheme });
        }

        let path_pattern = raw.path_pattern.unwrap_or_else(|| {
            log::info!(
                "`routing.path-pattern` not set; defaulting to {:?}",
                DEFAULT_PATH_PATTERN
            );
            DEFAULT_PATH_PATTERN.to_owned()
        });

        let flavor = raw.flavor.unwrap_or_else(|| {
            log::info!(
                "`routing.flavor` not set; defaulting to {:?}",
                Flavor::default().as_str()
            );
            Flavor::default()
        });

        Ok(Self {
            remote_server_root,
            scheme,
            host,
            path_pattern,
            flavor,
            shim_dir: raw
                .shim_dir
                .map(|shim_dir| util::prefix_path(root_dir, shim_dir)),
        })
    }

    pub fn remote_server_root(&self) -> &str {
        &self.remote_server_root
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn path_pattern(&self) -> &str {
        &self.path_pattern
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    pub fn shim_dir(&self) -> Option<&Path> {
        self.shim_dir.as_deref()
    }

    pub fn with_flavor(mut self, flavor: Flavor) -> Self {
        self.flavor = flavor;
        self
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    root_dir: PathBuf,
    partition: Partition,
    routing: Option<Routing>,
}

impl Config {
    pub fn from_raw(root_dir: PathBuf, raw: Raw) -> Result<Self, FromRawError> {
        let partition = Partition::from_raw(&root_dir, raw.partition)?;
        let routing = raw
            .routing
            .map(|routing| Routing::from_raw(&root_dir, routing))
            .transpose()
            .map_err(FromRawError::RoutingInvalid)?;
        Ok(Self {
            root_dir,
            partition,
            routing,
        })
    }

    /// Searches `cwd` and its ancestors for a config file, falling back to
    /// defaults rooted at `cwd` if there isn't one.
    pub fn load(cwd: impl AsRef<Path>) -> Result<Self, Error> {
        let cwd = cwd.as_ref();
        match Raw::load(cwd).map_err(Error::LoadFailed)? {
            Some((root_dir, raw)) => {
                Self::from_raw(root_dir.clone(), raw).map_err(|cause| Error::FromRawFailed {
                    path: root_dir.join(Raw::file_name()),
                    cause,
                })
            }
            None => {
                let root_dir = cwd
                    .canonicalize()
                    .map_err(|cause| Error::CanonicalizeFailed {
                        path: cwd.to_owned(),
                        cause,
                    })?;
                Self::from_raw(root_dir.clone(), Raw::default()).map_err(|cause| {
                    Error::FromRawFailed {
                        path: root_dir,
                        cause,
                    }
                })
            }
        }
    }

    /// Loads the config file at `path`; relative paths inside it resolve
    /// against its parent directory.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let raw = Raw::load_file(path).map_err(Error::LoadFailed)?;
        let parent = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let root_dir = parent
            .canonicalize()
            .map_err(|cause| Error::CanonicalizeFailed {
                path: parent.to_owned(),
                cause,
            })?;
        Self::from_raw(root_dir, raw).map_err(|cause| Error::FromRawFailed {
            path: path.to_owned(),
            cause,
        })
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    pub fn routing(&self) -> Option<&Routing> {
        self.routing.as_ref()
    }
}
