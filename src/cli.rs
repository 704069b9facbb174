use crate::{
    config::{self, Config},
    hook::{self, BuildOptions},
    notify::{FileNotifier, LogNotifier, PreviewNotifier},
    opts::{Flavor, SkipRecord},
    partition::{self, Layout},
    project,
    util::cli::{self, Exec, GlobalFlags, Report, Reportable, TextWrapper},
    NAME,
};
use std::path::{Path, PathBuf};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    bin_name = cli::bin_name(NAME),
    settings = cli::SETTINGS,
)]
pub struct Input {
    #[structopt(flatten)]
    flags: GlobalFlags,
    #[structopt(
        long = "config",
        help = "Use this config file instead of searching for one",
        global = true,
        parse(from_os_str)
    )]
    config: Option<PathBuf>,
    #[structopt(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, StructOpt)]
pub enum Command {
    #[structopt(
        name = "partition",
        about = "Splits `res` into the first package and `remote_res`"
    )]
    Partition {
        #[structopt(long = "dest", help = "Build output directory", parse(from_os_str))]
        dest: PathBuf,
        #[structopt(
            long = "record",
            help = "Package record file, or the directory holding `packageInfo.json`",
            parse(from_os_str)
        )]
        record: Option<PathBuf>,
        #[structopt(
            long = "scene",
            help = "Scene that always ships in the first package",
            number_of_values = 1
        )]
        scenes: Vec<String>,
        #[structopt(
            long = "skip-record",
            help = "Ignore the package record and treat everything as remote",
            parse(from_flag = SkipRecord::from_flag),
        )]
        skip_record: SkipRecord,
    },
    #[structopt(name = "patch", about = "Writes instant routing into the native project")]
    Patch {
        #[structopt(long = "dest", help = "Build output directory", parse(from_os_str))]
        dest: PathBuf,
        #[structopt(
            long = "flavor",
            help = "Which native file carries the routing",
            possible_values = &["gradle-properties", "strings-xml"]
        )]
        flavor: Option<Flavor>,
    },
    #[structopt(name = "hook", about = "Runs every post-build step for a build")]
    Hook {
        #[structopt(long = "dest", help = "Build output directory", parse(from_os_str))]
        dest: PathBuf,
        #[structopt(long = "platform", help = "Platform the editor actually built")]
        platform: String,
        #[structopt(
            long = "scene",
            help = "Scene that always ships in the first package",
            number_of_values = 1
        )]
        scenes: Vec<String>,
        #[structopt(
            long = "announce-to",
            help = "Write the remote bundle path to this file instead of printing it",
            parse(from_os_str)
        )]
        announce_to: Option<PathBuf>,
    },
}

#[derive(Debug)]
pub enum Error {
    ConfigFailed(config::Error),
    PartitionFailed(partition::Error),
    PatchFailed(project::Error),
    HookFailed(hook::Error),
}

impl Reportable for Error {
    fn report(&self) -> Report {
        match self {
            Self::ConfigFailed(err) => err.report(),
            Self::PartitionFailed(err) => err.report(),
            Self::PatchFailed(err) => err.report(),
            Self::HookFailed(err) => err.report(),
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config, Error> {
    match path {
        Some(path) => Config::load_file(path),
        None => Config::load("."),
    }
    .map_err(Error::ConfigFailed)
}

/// Flags given on the command line win over the config file; an absent
/// `--skip-record` leaves the configured value alone.
fn partition_settings(
    configured: &config::Partition,
    record: Option<PathBuf>,
    skip_record: SkipRecord,
) -> config::Partition {
    let settings = match record {
        Some(record) => configured.clone().with_record_path(record),
        None => configured.clone(),
    };
    if skip_record.yes() {
        settings.with_skip_record(skip_record)
    } else {
        settings
    }
}

fn report_patched(patched: &project::Patched, wrapper: &TextWrapper) {
    if patched.is_empty() {
        Report::victory(
            "Native project already up to date",
            "Nothing needed patching.",
        )
        .print(wrapper);
    } else {
        let changed = patched
            .changed
            .iter()
            .map(|path| format!("{:?}", path))
            .collect::<Vec<_>>()
            .join(", ");
        Report::victory(
            "Patched native project",
            format!(
                "Installed {} downloader script(s); changed {}",
                patched.scripts_installed,
                if changed.is_empty() { "no files" } else { changed.as_str() }
            ),
        )
        .print(wrapper);
    }
}

impl Exec for Input {
    type Report = Error;

    fn global_flags(&self) -> GlobalFlags {
        self.flags
    }

    fn exec(self, wrapper: &TextWrapper) -> Result<(), Self::Report> {
        let Self {
            flags: _,
            config,
            command,
        } = self;
        let config = load_config(config.as_deref())?;
        match command {
            Command::Partition {
                dest,
                record,
                scenes,
                skip_record,
            } => {
                let settings = partition_settings(config.partition(), record, skip_record);
                let outcome = partition::partition(
                    &Layout::under(&dest),
                    settings.record_path(),
                    &scenes,
                    settings.skip_record(),
                )
                .map_err(Error::PartitionFailed)?;
                Report::victory("Resources partitioned", outcome).print(wrapper);
                Ok(())
            }
            Command::Patch { dest, flavor } => {
                let routing = hook::routing(&config)
                    .map_err(Error::HookFailed)?
                    .clone();
                let routing = match flavor {
                    Some(flavor) => routing.with_flavor(flavor),
                    None => routing,
                };
                let patched = project::patch(&dest, &routing).map_err(Error::PatchFailed)?;
                report_patched(&patched, wrapper);
                Ok(())
            }
            Command::Hook {
                dest,
                platform,
                scenes,
                announce_to,
            } => {
                let options = BuildOptions {
                    dest,
                    actual_platform: platform,
                    scenes,
                };
                let log_notifier = LogNotifier::new(wrapper);
                let file_notifier = announce_to.map(FileNotifier::new);
                let notifier: &dyn PreviewNotifier = match &file_notifier {
                    Some(file_notifier) => file_notifier,
                    None => &log_notifier,
                };
                match hook::handle(&options, &config, notifier).map_err(Error::HookFailed)? {
                    hook::Outcome::NotInstant => log::info!("skipped non-instant build"),
                    hook::Outcome::Done { partition, patched } => {
                        Report::victory("Resources partitioned", partition).print(wrapper);
                        report_patched(&patched, wrapper);
                    }
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::Raw;
    use rstest::rstest;

    fn configured(toml_str: &str) -> config::Partition {
        let raw: Raw = toml::from_str(toml_str).unwrap();
        Config::from_raw(PathBuf::from("/project"), raw)
            .unwrap()
            .partition()
            .clone()
    }

    #[rstest(record, expected,
        case(Some("/elsewhere/packageInfo.json"), "/elsewhere/packageInfo.json"),
        case(None, "/project/settings")
    )]
    fn test_record_flag_precedence(record: Option<&str>, expected: &str) {
        let configured = configured("[partition]\nrecord-path = \"settings\"\n");
        let settings = partition_settings(&configured, record.map(PathBuf::from), SkipRecord::No);
        assert_eq!(settings.record_path(), Path::new(expected));
    }

    #[rstest(configured_skip, flag, expected,
        case(false, SkipRecord::Yes, SkipRecord::Yes),
        case(false, SkipRecord::No, SkipRecord::No),
        case(true, SkipRecord::No, SkipRecord::Yes),
        case(true, SkipRecord::Yes, SkipRecord::Yes)
    )]
    fn test_skip_record_flag_precedence(
        configured_skip: bool,
        flag: SkipRecord,
        expected: SkipRecord,
    ) {
        let configured = configured(&format!(
            "[partition]\nskip-record = {}\n",
            configured_skip
        ));
        let settings = partition_settings(&configured, None, flag);
        assert_eq!(settings.skip_record(), expected);
    }

    #[test]
    fn flags_override_the_whole_partition_section() {
        let configured = configured("[partition]\nrecord-path = \"settings\"\n");
        let settings = partition_settings(
            &configured,
            Some(PathBuf::from("/tmp/record.json")),
            SkipRecord::Yes,
        );
        assert_eq!(settings.record_path(), Path::new("/tmp/record.json"));
        assert_eq!(settings.skip_record(), SkipRecord::Yes);
        assert_eq!(configured.skip_record(), SkipRecord::No);
    }
}
