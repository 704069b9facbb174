#![cfg(feature = "cli")]
#![forbid(unsafe_code)]

use android_instant::{cli::Input, util::cli::exec, NAME};

fn main() {
    exec::<Input>(NAME)
}
