use super::Error;
use crate::config::Routing;
use std::path::Path;

pub static PATH: &str = "game/res/values/strings.xml";

pub static SCHEME_NAME: &str = "instant_game_scheme";
pub static HOST_NAME: &str = "instant_game_host";
pub static PATH_PATTERN_NAME: &str = "instant_game_path_pattern";

static CLOSING_TAG: &str = "</resources>";

fn escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            // Android's resource compiler treats bare apostrophes as errors.
            '\'' => escaped.push_str("\\'"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn has_string(contents: &str, name: &str) -> bool {
    contents.contains(&format!("name=\"{}\"", name))
}

/// Adds the routing strings to `strings.xml`, skipping any that are already
/// defined.
pub fn add_strings(path: &Path, routing: &Routing) -> Result<bool, Error> {
    let contents = match super::read(path)? {
        Some(contents) => contents,
        None => return Ok(false),
    };
    let at = contents
        .rfind(CLOSING_TAG)
        .ok_or_else(|| Error::ResourcesTagMissing {
            path: path.to_owned(),
        })?;
    let mut insertion = String::new();
    for (name, value) in [
        (SCHEME_NAME, routing.scheme()),
        (HOST_NAME, routing.host()),
        (PATH_PATTERN_NAME, routing.path_pattern()),
    ]
    .iter()
    {
        if has_string(&contents, name) {
            log::info!("{:?} already defines `{}`", path, name);
        } else {
            insertion.push_str(&format!(
                "    <string name=\"{}\" translatable=\"false\">{}</string>\n",
                name,
                escape(value)
            ));
        }
    }
    if insertion.is_empty() {
        return Ok(false);
    }
    let patched = format!("{}{}{}", &contents[..at], insertion, &contents[at..]);
    super::write(path, &patched).map(|()| true)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::project::test::routing;
    use rstest::rstest;
    use std::fs;
    use tempfile::TempDir;

    static STRINGS: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<resources>\n    <string name=\"app_name\">Game</string>\n</resources>\n";

    #[rstest(input, expected,
        case("/game", "/game"),
        case("/a&b", "/a&amp;b"),
        case("<x>", "&lt;x&gt;"),
        case("it's \"here\"", "it\\'s &quot;here&quot;")
    )]
    fn test_escape(input: &str, expected: &str) {
        assert_eq!(escape(input), expected);
    }

    #[test]
    fn inserts_strings_before_closing_tag() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("strings.xml");
        fs::write(&path, STRINGS).unwrap();
        assert!(add_strings(&path, &routing("strings-xml", None)).unwrap());
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<resources>\n    <string name=\"app_name\">Game</string>\n    <string name=\"instant_game_scheme\" translatable=\"false\">https</string>\n    <string name=\"instant_game_host\" translatable=\"false\">example.com</string>\n    <string name=\"instant_game_path_pattern\" translatable=\"false\">/game</string>\n</resources>\n"
        );
        assert!(!add_strings(&path, &routing("strings-xml", None)).unwrap());
    }

    #[test]
    fn only_missing_strings_are_added() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("strings.xml");
        fs::write(
            &path,
            "<resources>\n    <string name=\"instant_game_host\">custom.example.com</string>\n</resources>",
        )
        .unwrap();
        assert!(add_strings(&path, &routing("strings-xml", None)).unwrap());
        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.matches("instant_game_host").count(), 1);
        assert!(contents.contains("custom.example.com"));
        assert!(contents.contains("instant_game_path_pattern"));
    }

    #[test]
    fn missing_closing_tag_fails() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("strings.xml");
        fs::write(&path, "<resources>").unwrap();
        assert!(matches!(
            add_strings(&path, &routing("strings-xml", None)),
            Err(Error::ResourcesTagMissing { .. })
        ));
    }
}
