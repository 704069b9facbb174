#[cfg(feature = "cli")]
use crate::opts;
use colored::{Color, Colorize as _};
use std::fmt::{Debug, Display};
#[cfg(feature = "cli")]
use structopt::{
    clap::{self, AppSettings},
    StructOpt,
};

#[cfg(feature = "cli")]
pub static SETTINGS: &[AppSettings] = &[
    AppSettings::ColoredHelp,
    AppSettings::DeriveDisplayOrder,
    AppSettings::SubcommandRequiredElseHelp,
    AppSettings::VersionlessSubcommands,
];

pub fn bin_name(name: &str) -> String {
    format!("cargo {}", name)
}

pub type TextWrapper = textwrap::Wrapper<'static, textwrap::NoHyphenation>;

pub fn text_wrapper() -> TextWrapper {
    TextWrapper::with_splitter(textwrap::termwidth(), textwrap::NoHyphenation)
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Label {
    Error,
    ActionRequest,
    Victory,
}

impl Label {
    fn color(self) -> Color {
        match self {
            Self::Error => Color::BrightRed,
            Self::ActionRequest => Color::BrightYellow,
            Self::Victory => Color::BrightGreen,
        }
    }

    fn exit_code(self) -> i8 {
        match self {
            Self::Victory => 0,
            _ => 1,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::ActionRequest => "action request",
            Self::Victory => "victory",
        }
    }
}

/// A message for the person running the build, with a one-line summary and
/// an indented block of details.
#[derive(Clone, Debug)]
pub struct Report {
    label: Label,
    msg: String,
    details: String,
}

impl Report {
    fn new(label: Label, msg: impl Display, details: impl Display) -> Self {
        Self {
            label,
            msg: msg.to_string(),
            details: details.to_string(),
        }
    }

    pub fn error(msg: impl Display, details: impl Display) -> Self {
        Self::new(Label::Error, msg, details)
    }

    pub fn action_request(msg: impl Display, details: impl Display) -> Self {
        Self::new(Label::ActionRequest, msg, details)
    }

    pub fn victory(msg: impl Display, details: impl Display) -> Self {
        Self::new(Label::Victory, msg, details)
    }

    pub fn exit_code(&self) -> i8 {
        self.label.exit_code()
    }

    fn format(&self, wrapper: &TextWrapper) -> String {
        static INDENT: &str = "    ";
        let head = if colored::control::SHOULD_COLORIZE.should_colorize() {
            let color = self.label.color();
            wrapper.fill(&format!(
                "{} {}",
                format!("{}:", self.label.as_str()).color(color).bold(),
                self.msg.as_str().color(color)
            ))
        } else {
            wrapper.fill(&format!("{}: {}", self.label.as_str(), self.msg))
        };
        let wrapper = wrapper
            .clone()
            .initial_indent(INDENT)
            .subsequent_indent(INDENT);
        format!("{}\n{}\n", head, wrapper.fill(&self.details))
    }

    pub fn print(&self, wrapper: &TextWrapper) {
        let s = self.format(wrapper);
        if matches!(self.label, Label::Error) {
            eprint!("{}", s)
        } else {
            print!("{}", s)
        }
    }
}

pub trait Reportable: Debug {
    fn report(&self) -> Report;
}

#[cfg(feature = "cli")]
#[derive(Clone, Copy, Debug, StructOpt)]
pub struct GlobalFlags {
    #[structopt(
        short = "v",
        long = "verbose",
        help = "Make life louder",
        global = true,
        multiple = true,
        parse(from_occurrences = opts::NoiseLevel::from_occurrences),
    )]
    pub noise_level: opts::NoiseLevel,
}

#[cfg(feature = "cli")]
pub trait Exec: Debug + StructOpt {
    type Report: Reportable;

    fn global_flags(&self) -> GlobalFlags;

    fn exec(self, wrapper: &TextWrapper) -> Result<(), Self::Report>;
}

#[cfg(feature = "cli")]
fn get_args(name: &str) -> Vec<String> {
    let mut args: Vec<String> = std::env::args().collect();
    // Running this as a cargo subcommand gives us our name as an argument,
    // so let's just discard that...
    if args.get(1).map(String::as_str) == Some(name) {
        args.remove(1);
    }
    args
}

#[cfg(feature = "cli")]
fn init_logging(noise_level: opts::NoiseLevel) {
    use env_logger::{Builder, Env};
    let default_level = match noise_level {
        opts::NoiseLevel::Polite => "warn",
        opts::NoiseLevel::LoudAndProud => "android_instant=info",
        opts::NoiseLevel::FranklyQuitePedantic => "debug",
    };
    let env = Env::default().default_filter_or(default_level);
    Builder::from_env(env).init();
}

#[cfg(feature = "cli")]
#[derive(Debug)]
enum Exit {
    Report(Report),
    Clap(clap::Error),
}

#[cfg(feature = "cli")]
impl Exit {
    fn report(reportable: impl Reportable) -> Self {
        log::info!("exiting with {:#?}", reportable);
        Self::Report(reportable.report())
    }

    fn do_the_thing(self, wrapper: TextWrapper) -> ! {
        match self {
            Self::Report(report) => {
                report.print(&wrapper);
                // We only expose access to the 8 lsb of the exit code, since:
                // https://doc.rust-lang.org/std/process/fn.exit.html#platform-specific-behavior
                std::process::exit(report.exit_code() as i32)
            }
            Self::Clap(err) => err.exit(),
        }
    }

    fn main(inner: impl FnOnce(&TextWrapper) -> Result<(), Self>) {
        let wrapper = text_wrapper();
        if let Err(exit) = inner(&wrapper) {
            exit.do_the_thing(wrapper)
        }
    }
}

#[cfg(feature = "cli")]
pub fn exec<E: Exec>(name: &str) {
    Exit::main(|wrapper| {
        let input = E::from_iter_safe(get_args(name)).map_err(Exit::Clap)?;
        init_logging(input.global_flags().noise_level);
        input.exec(wrapper).map_err(Exit::report)
    })
}
