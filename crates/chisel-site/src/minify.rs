//! Whitespace minification for written HTML.

/// Trim every line and drop blank ones.
///
/// Lines inside `<pre>` blocks are kept byte for byte.
#[must_use]
pub fn minify_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_pre = false;

    for line in html.lines() {
        let lower = line.to_ascii_lowercase();
        let opens = lower.matches("<pre").count();
        let closes = lower.matches("</pre>").count();

        if in_pre {
            out.push_str(line);
            out.push('\n');
        } else {
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                out.push_str(if opens > closes { line.trim_start() } else { trimmed });
                out.push('\n');
            }
        }

        if opens > closes {
            in_pre = true;
        } else if closes > opens {
            in_pre = false;
        }
    }
    out
}
