//! Backslash escapes in literal text.
//!
//! A `\` directly before one of `& $ " ' \ < >` is dropped and the following
//! character is kept literally. Any other backslash is ordinary text.
//!
//! Text nodes keep their raw source and are unescaped only when evaluated, so
//! merging two raw fragments never applies an escape twice or loses one.

use std::borrow::Cow;

use crate::constants::{ESCAPABLE, ESCAPE};

/// Removes escape backslashes from raw text.
///
/// ```rust
/// use datasets::macros::unescape;
///
/// assert_eq!(unescape(r#"a\&b"#), "a&b");
/// assert_eq!(unescape(r#"\\\&"#), r#"\&"#);
/// assert_eq!(unescape(r#"\n"#), r#"\n"#);
/// ```
pub fn unescape(raw: &str) -> Cow<'_, str> {
    if !raw.contains(ESCAPE) {
        return Cow::Borrowed(raw);
    }
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ESCAPE
            && let Some(&next) = chars.peek()
            && ESCAPABLE.contains(&next)
        {
            out.push(next);
            chars.next();
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

/// Escapes every escapable character so that [`unescape`] restores `text`.
pub fn escape(text: &str) -> Cow<'_, str> {
    if !text.chars().any(|c| ESCAPABLE.contains(&c)) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 4);
    for c in text.chars() {
        if ESCAPABLE.contains(&c) {
            out.push(ESCAPE);
        }
        out.push(c);
    }
    Cow::Owned(out)
}
