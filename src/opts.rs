use serde::{Deserialize, Serialize};
use std::{
    fmt::{self, Display},
    str::FromStr,
};
use thiserror::Error;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Ord, PartialEq, PartialOrd, Serialize)]
pub enum NoiseLevel {
    Polite,
    LoudAndProud,
    FranklyQuitePedantic,
}

impl Default for NoiseLevel {
    fn default() -> Self {
        Self::Polite
    }
}

impl NoiseLevel {
    pub fn from_occurrences(occurrences: u64) -> Self {
        match occurrences {
            0 => Self::Polite,
            1 => Self::LoudAndProud,
            _ => Self::FranklyQuitePedantic,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum SkipRecord {
    Yes,
    No,
}

impl Default for SkipRecord {
    fn default() -> Self {
        Self::No
    }
}

impl SkipRecord {
    pub fn from_flag(flag: bool) -> Self {
        if flag {
            Self::Yes
        } else {
            Self::No
        }
    }

    pub fn yes(self) -> bool {
        matches!(self, Self::Yes)
    }
}

/// Which native file carries the instant-game routing parameters.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Flavor {
    GradleProperties,
    StringsXml,
}

impl Default for Flavor {
    fn default() -> Self {
        Self::GradleProperties
    }
}

impl Flavor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GradleProperties => "gradle-properties",
            Self::StringsXml => "strings-xml",
        }
    }
}

impl Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("{0:?} isn't a flavor; expected `gradle-properties` or `strings-xml`")]
pub struct FlavorInvalid(String);

impl FromStr for Flavor {
    type Err = FlavorInvalid;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gradle-properties" => Ok(Self::GradleProperties),
            "strings-xml" => Ok(Self::StringsXml),
            _ => Err(FlavorInvalid(s.to_owned())),
        }
    }
}
