//! HTML attribute escaping for caller-supplied values.
//!
//! Every attacker-influenceable value (filenames, element id, media
//! directory) passes through [`attribute`] exactly once before it reaches
//! markup-adjacent strings.

/// Escapes a value for embedding in a double-quoted HTML attribute.
///
/// Reverses one level of literal backslash escaping first, then
/// entity-encodes `&`, `<`, `>` and `"`. Single quotes pass through, so
/// escaped values must only ever land inside double-quoted attributes.
pub fn attribute(value: &str) -> String {
    let stripped = strip_backslashes(value);
    let mut out = String::with_capacity(stripped.len());
    for c in stripped.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Removes one level of backslash escaping. A trailing lone backslash is
/// dropped.
fn strip_backslashes(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}
