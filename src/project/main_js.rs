use super::Error;
use std::path::Path;

pub static FILE_NAME: &str = "main.js";

fn has_require(contents: &str, module: &str) -> bool {
    contents.contains(&format!("require('{}')", module))
        || contents.contains(&format!("require(\"{}\")", module))
}

/// Byte offset just past the last line that calls `require`, along with that
/// line's indentation.
fn after_last_require(contents: &str) -> Option<(usize, &str)> {
    let found = contents.rfind("require(")?;
    let line_start = contents[..found].rfind('\n').map_or(0, |i| i + 1);
    let line = &contents[line_start..];
    let indent = &line[..line.len() - line.trim_start().len()];
    let indent = &indent[..indent.len().min(found - line_start)];
    let end = contents[found..]
        .find('\n')
        .map_or(contents.len(), |i| found + i + 1);
    Some((end, indent))
}

/// Makes sure `main.js` requires each of `modules`, adding any that are
/// missing right after the existing requires.
pub fn add_requires(path: &Path, modules: &[&str]) -> Result<bool, Error> {
    let contents = match super::read(path)? {
        Some(contents) => contents,
        None => return Ok(false),
    };
    let missing = modules
        .iter()
        .filter(|module| !has_require(&contents, module))
        .collect::<Vec<_>>();
    if missing.is_empty() {
        log::info!("{:?} already requires the downloader scripts", path);
        return Ok(false);
    }

    let (at, indent) = after_last_require(&contents).unwrap_or((contents.len(), ""));
    let mut insertion = String::new();
    if at > 0 && !contents[..at].ends_with('\n') {
        insertion.push('\n');
    }
    for module in missing {
        log::info!("adding require for {:?} to {:?}", module, path);
        insertion.push_str(&format!("{}require('{}');\n", indent, module));
    }
    let patched = format!("{}{}{}", &contents[..at], insertion, &contents[at..]);
    super::write(path, &patched).map(|()| true)
}
