use super::Error;
use crate::config::Routing;
use java_properties::PropertiesWriter;
use std::path::Path;

pub static PROPERTIES_FILE_NAME: &str = "gradle.properties";
pub static BUILD_GRADLE_PATH: &str = "game/build.gradle";

pub static SCHEME_KEY: &str = "INSTANT_GAME_SCHEME";
pub static HOST_KEY: &str = "INSTANT_GAME_HOST";
pub static PATH_PATTERN_KEY: &str = "INSTANT_GAME_PATHPATTERN";

static MANIFEST_PLACEHOLDERS: &str = "android.defaultConfig.manifestPlaceholders";

fn render_properties(routing: &Routing) -> Result<String, Error> {
    let mut buf = Vec::new();
    {
        let mut writer = PropertiesWriter::new_with_encoding(&mut buf, encoding::all::UTF_8);
        for (key, value) in [
            (SCHEME_KEY, routing.scheme()),
            (HOST_KEY, routing.host()),
            (PATH_PATTERN_KEY, routing.path_pattern()),
        ]
        .iter()
        {
            writer
                .write(key, value)
                .map_err(Error::PropertiesRenderFailed)?;
        }
        writer.flush().map_err(Error::PropertiesRenderFailed)?;
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Appends the routing keys to `gradle.properties`, unless the scheme key
/// already appears anywhere in it, comments included. The rest of the file
/// isn't parsed, so lines gradle would reject don't stop the patch.
pub fn add_properties(path: &Path, routing: &Routing) -> Result<bool, Error> {
    let contents = match super::read(path)? {
        Some(contents) => contents,
        None => return Ok(false),
    };
    if contents.contains(SCHEME_KEY) {
        log::info!("{:?} already mentions `{}`", path, SCHEME_KEY);
        return Ok(false);
    }
    let mut patched = contents;
    patched.push_str("\n\n# google play instant config\n");
    patched.push_str(&render_properties(routing)?);
    super::write(path, &patched).map(|()| true)
}

/// Feeds the routing properties into the manifest through placeholders.
pub fn add_manifest_placeholders(path: &Path) -> Result<bool, Error> {
    let contents = match super::read(path)? {
        Some(contents) => contents,
        None => return Ok(false),
    };
    if contents.contains(MANIFEST_PLACEHOLDERS) {
        log::info!("{:?} already sets manifest placeholders", path);
        return Ok(false);
    }
    let patched = format!(
        "{}\n{} = [scheme:{},host:{},pathPattern:{}]",
        contents, MANIFEST_PLACEHOLDERS, SCHEME_KEY, HOST_KEY, PATH_PATTERN_KEY
    );
    super::write(path, &patched).map(|()| true)
}
