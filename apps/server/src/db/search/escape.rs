//! `LIKE`/`ILIKE` pattern escaping.
//!
//! User text is matched as a literal substring, so the pattern
//! metacharacters `%` and `_` (and the escape character `\` itself) must be
//! escaped before the text is wrapped in `%...%`. Queries using these
//! patterns declare `ESCAPE '\'`.

pub(crate) fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Pattern matching `input` anywhere in the value
pub(crate) fn contains_pattern(input: &str) -> String {
    format!("%{}%", escape_like(input))
}
