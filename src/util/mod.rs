pub mod cli;
mod path;

pub use self::path::*;
