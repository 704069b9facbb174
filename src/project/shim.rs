use super::Error;
use crate::tree;
use once_cell_regex::{exports::regex::NoExpand, regex};
use std::path::Path;

pub static DOWNLOADER: &str = "android-instant-downloader.js";
pub static REQUIRES: [&str; 2] = [
    "src/android-instant-downloader.js",
    "src/android-instant-helper.js",
];

pub fn install(shim_dir: &Path, script_dir: &Path) -> Result<usize, Error> {
    tree::copy_tree(shim_dir, script_dir).map_err(Error::ShimCopyFailed)
}

fn js_single_quoted(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Points the downloader at `remote_server_root`. Only the empty placeholder
/// is replaced, so a downloader that's already configured stays as it is.
pub fn set_remote_server(downloader: &Path, remote_server_root: &str) -> Result<bool, Error> {
    let contents = match super::read(downloader)? {
        Some(contents) => contents,
        None => return Ok(false),
    };
    let placeholder = regex!(r"INSTANT_REMOTE_SERVER\s=\s''");
    if !placeholder.is_match(&contents) {
        log::info!("{:?} has no remote server placeholder", downloader);
        return Ok(false);
    }
    let replacement = format!(
        "INSTANT_REMOTE_SERVER = '{}'",
        js_single_quoted(remote_server_root)
    );
    let patched = placeholder.replace_all(&contents, NoExpand(&replacement));
    super::write(downloader, &patched).map(|()| true)
}
