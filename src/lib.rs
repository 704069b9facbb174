#![forbid(unsafe_code)]

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod hook;
pub mod notify;
pub mod opts;
pub mod partition;
pub mod project;
pub mod record;
pub mod tree;
pub mod util;

pub static NAME: &str = "android-instant";
