//! Inline heading classes: `# Title --- classes["wide", "dark"]`.

use std::sync::LazyLock;

use regex::Regex;

static HEADING_CLASSES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^(#{1,6}[ \t]+.*?)[ \t]*---[ \t]*classes\[([^\]\n]*)\][ \t]*\r?$"#)
        .expect("heading classes pattern is valid")
});

static QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]+)""#).expect("quoted name pattern is valid"));

/// Strip class annotations from headings in `body`.
///
/// Returns the rewritten body and the class names in order of appearance.
#[must_use]
pub fn extract_heading_classes(body: &str) -> (String, Vec<String>) {
    let mut classes = Vec::new();
    let rewritten = HEADING_CLASSES.replace_all(body, |caps: &regex::Captures<'_>| {
        classes.extend(
            QUOTED
                .captures_iter(&caps[2])
                .map(|quoted| quoted[1].to_owned()),
        );
        caps[1].to_owned()
    });
    (rewritten.into_owned(), classes)
}
