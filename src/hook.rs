//! The whole Android Instant post-build step: split resources, patch the
//! native project, then point the preview server at the remote bundle.

use crate::{
    config::{Config, Routing},
    notify::{NotifyError, PreviewNotifier},
    partition::{self, Layout},
    project,
    util::cli::{Report, Reportable},
};
use std::path::PathBuf;
use thiserror::Error;

pub static PLATFORM: &str = "android-instant";

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    PartitionFailed(#[from] partition::Error),
    #[error("No `[routing]` section in the config at {root_dir:?}")]
    RoutingMissing { root_dir: PathBuf },
    #[error(transparent)]
    PatchFailed(#[from] project::Error),
    #[error(transparent)]
    NotifyFailed(#[from] NotifyError),
}

impl Reportable for Error {
    fn report(&self) -> Report {
        match self {
            Self::PartitionFailed(err) => err.report(),
            Self::RoutingMissing { root_dir } => Report::action_request(
                format!(
                    "Please add a `[routing]` section to {:?} and try again!",
                    root_dir.join(crate::config::Raw::file_name())
                ),
                "Android Instant builds need `remote-server-root` and `host` to know where the remote bundle is served from.",
            ),
            Self::PatchFailed(err) => err.report(),
            Self::NotifyFailed(err) => err.report(),
        }
    }
}

/// What the editor's build pipeline tells us about the build that just ran.
#[derive(Clone, Debug)]
pub struct BuildOptions {
    pub dest: PathBuf,
    pub actual_platform: String,
    pub scenes: Vec<String>,
}

impl BuildOptions {
    pub fn is_instant(&self) -> bool {
        self.actual_platform.eq_ignore_ascii_case(PLATFORM)
    }
}

#[derive(Debug)]
pub enum Outcome {
    NotInstant,
    Done {
        partition: partition::Outcome,
        patched: project::Patched,
    },
}

/// Routing is optional in the config file, but every instant build needs it.
pub fn routing(config: &Config) -> Result<&Routing, Error> {
    config.routing().ok_or_else(|| Error::RoutingMissing {
        root_dir: config.root_dir().to_owned(),
    })
}

pub fn handle(
    options: &BuildOptions,
    config: &Config,
    notifier: &dyn PreviewNotifier,
) -> Result<Outcome, Error> {
    if !options.is_instant() {
        log::info!(
            "platform {:?} isn't {:?}; nothing to do",
            options.actual_platform,
            PLATFORM
        );
        return Ok(Outcome::NotInstant);
    }
    let routing = routing(config)?;

    let layout = Layout::under(&options.dest);
    let partition = partition::partition(
        &layout,
        config.partition().record_path(),
        &options.scenes,
        config.partition().skip_record(),
    )?;
    log::info!("{}", partition);

    let patched = project::patch(&options.dest, routing)?;
    notifier.announce(layout.remote_dir())?;
    Ok(Outcome::Done { partition, patched })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        config::Raw,
        notify::FileNotifier,
        partition::{REMOTE_DIR_NAME, RESOURCE_DIR_NAME},
    };
    use rstest::rstest;
    use std::{fs, path::Path};
    use tempfile::TempDir;

    fn touch(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn config(root: &Path, toml_str: &str) -> Config {
        let raw: Raw = toml::from_str(toml_str).unwrap();
        Config::from_raw(root.to_owned(), raw).unwrap()
    }

    static ROUTED: &str = r#"
[partition]
record-path = "settings"

[routing]
remote-server-root = "http://10.0.2.2:7456/"
host = "example.com"
"#;

    #[rstest(platform, expected,
        case("android-instant", true),
        case("Android-Instant", true),
        case("android", false),
        case("ios", false)
    )]
    fn test_is_instant(platform: &str, expected: bool) {
        let options = BuildOptions {
            dest: PathBuf::from("build"),
            actual_platform: platform.to_owned(),
            scenes: Vec::new(),
        };
        assert_eq!(options.is_instant(), expected);
    }

    #[test]
    fn other_platforms_are_left_alone() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("build");
        touch(&dest.join(RESOURCE_DIR_NAME).join("a1.png"), "a1");
        let notifier = FileNotifier::new(tmp.path().join("preview-path"));
        let options = BuildOptions {
            dest: dest.clone(),
            actual_platform: "android".to_owned(),
            scenes: Vec::new(),
        };
        let outcome = handle(&options, &config(tmp.path(), ROUTED), &notifier).unwrap();
        assert!(matches!(outcome, Outcome::NotInstant));
        assert!(!dest.join(REMOTE_DIR_NAME).exists());
        assert!(!notifier.path().exists());
    }

    #[test]
    fn missing_routing_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let notifier = FileNotifier::new(tmp.path().join("preview-path"));
        let options = BuildOptions {
            dest: tmp.path().join("build"),
            actual_platform: PLATFORM.to_owned(),
            scenes: Vec::new(),
        };
        let err = handle(&options, &config(tmp.path(), ""), &notifier).unwrap_err();
        assert!(matches!(err, Error::RoutingMissing { .. }));
    }

    #[test]
    fn full_run() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("build");
        for name in &["a1.png", "b2.png", "c3.png", "s9.json"] {
            touch(&dest.join(RESOURCE_DIR_NAME).join(name), name);
        }
        touch(
            &tmp.path().join("settings/packageInfo.json"),
            r#"{"totalCount": 10, "selectCount": 4, "first": {"items": ["a1", "b2"]}}"#,
        );
        touch(&dest.join("main.js"), "require('src/settings.js');\n");
        let notifier = FileNotifier::new(tmp.path().join("preview-path"));
        let options = BuildOptions {
            dest: dest.clone(),
            actual_platform: PLATFORM.to_owned(),
            scenes: vec!["s9".to_owned()],
        };

        let outcome = handle(&options, &config(tmp.path(), ROUTED), &notifier).unwrap();
        match outcome {
            Outcome::Done { partition, patched } => {
                assert_eq!(partition, partition::Outcome::Split { kept: 3, total: 4 });
                assert_eq!(patched.changed, vec![dest.join("main.js")]);
            }
            Outcome::NotInstant => panic!("expected an instant build"),
        }
        assert!(!dest.join(RESOURCE_DIR_NAME).join("c3.png").exists());
        assert!(dest.join(REMOTE_DIR_NAME).join("c3.png").exists());
        assert_eq!(
            fs::read_to_string(notifier.path()).unwrap(),
            format!("{}\n", dest.join(REMOTE_DIR_NAME).display())
        );
    }
}
