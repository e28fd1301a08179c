use std::borrow::Cow;

const ELLIPSIS: &str = "...";

/// Shortens `s` to at most `max_len` characters (Unicode scalar values, not bytes).
///
/// If there is room for it, the last three characters of the result are replaced with `...`.
pub fn truncate(s: &str, max_len: usize) -> Cow<'_, str> {
    if s.chars().count() <= max_len {
        return Cow::Borrowed(s);
    }

    if max_len > ELLIPSIS.len() {
        let mut result = s
            .chars()
            .take(max_len - ELLIPSIS.len())
            .collect::<String>();
        result.push_str(ELLIPSIS);

        Cow::Owned(result)
    } else {
        Cow::Owned(s.chars().take(max_len).collect())
    }
}

/// Replaces the five XML special characters with their named entities.
pub fn escape_xml(s: &str) -> String {
    let mut result = String::with_capacity(s.len());

    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&apos;"),
            c => result.push(c),
        }
    }

    result
}
