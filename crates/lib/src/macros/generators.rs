//! Value generators behind the non-reference macros.
//!
//! These are plain functions over an RNG or an instant; argument parsing and
//! error reporting live in the evaluator.

use chrono::{
    DateTime, Utc,
    format::{Item, StrftimeItems},
};
use rand::{Rng, RngCore};

/// `len` random decimal digits, the first one non-zero.
pub fn random_digits<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    let mut out = String::with_capacity(len);
    for i in 0..len {
        let low = if i == 0 { 1 } else { 0 };
        let digit: u32 = rng.gen_range(low..10);
        out.push(char::from_digit(digit, 10).unwrap_or('0'));
    }
    out
}

/// A random integer in `min..=max`. Callers ensure `min <= max`.
pub fn random_between<R: Rng + ?Sized>(rng: &mut R, min: i64, max: i64) -> i64 {
    rng.gen_range(min..=max)
}

/// `len` random uppercase ASCII letters.
pub fn random_chars<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| char::from(rng.gen_range(b'A'..=b'Z')))
        .collect()
}

/// A random v4 UUID drawn from `rng`.
pub fn random_uuid<R: RngCore + ?Sized>(rng: &mut R, upper: bool) -> String {
    let mut bytes = [0u8; 16];
    rng.fill_bytes(&mut bytes);
    let uuid = uuid::Builder::from_random_bytes(bytes).into_uuid();
    let text = uuid.hyphenated().to_string();
    if upper { text.to_uppercase() } else { text }
}

/// Parses a day offset such as `+1`, `-2`, `3d` or an empty string (zero).
pub fn parse_day_offset(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    let trimmed = trimmed
        .strip_suffix(['d', 'D'])
        .unwrap_or(trimmed)
        .trim_start_matches('+');
    if trimmed.is_empty() {
        return Some(0);
    }
    trimmed.parse().ok()
}

/// Formats `instant` with a Java-style pattern or a strftime string.
///
/// Patterns containing `%` are taken as strftime. Returns `None` if the
/// resulting format is invalid.
pub fn format_date(instant: &DateTime<Utc>, pattern: &str) -> Option<String> {
    let format = if pattern.contains('%') {
        pattern.to_string()
    } else {
        java_pattern_to_strftime(pattern)
    };
    let items: Vec<Item<'_>> = StrftimeItems::new(&format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return None;
    }
    Some(instant.format_with_items(items.into_iter()).to_string())
}

/// Translates the common Java `DateTimeFormatter` letters to strftime.
///
/// Text in single quotes is literal, `''` is a quote. Letters without a
/// mapping are kept as-is.
pub fn java_pattern_to_strftime(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '\'' {
            if chars.get(i + 1) == Some(&'\'') {
                out.push('\'');
                i += 2;
                continue;
            }
            i += 1;
            while i < chars.len() && chars[i] != '\'' {
                push_literal(&mut out, chars[i]);
                i += 1;
            }
            i += 1;
            continue;
        }
        let mut run = 1;
        while i + run < chars.len() && chars[i + run] == c {
            run += 1;
        }
        let mapped = match (c, run) {
            ('y', 2) => Some("%y"),
            ('y', _) | ('u', _) => Some("%Y"),
            ('M', 1) => Some("%-m"),
            ('M', 2) => Some("%m"),
            ('M', 3) => Some("%b"),
            ('M', _) => Some("%B"),
            ('d', 1) => Some("%-d"),
            ('d', _) => Some("%d"),
            ('H', 1) => Some("%-H"),
            ('H', _) => Some("%H"),
            ('h', 1) => Some("%-I"),
            ('h', _) => Some("%I"),
            ('m', 1) => Some("%-M"),
            ('m', _) => Some("%M"),
            ('s', 1) => Some("%-S"),
            ('s', _) => Some("%S"),
            ('S', 1..=3) => Some("%3f"),
            ('S', 4..=6) => Some("%6f"),
            ('S', _) => Some("%9f"),
            ('a', _) => Some("%p"),
            ('E', 1..=3) => Some("%a"),
            ('E', _) => Some("%A"),
            _ => None,
        };
        match mapped {
            Some(spec) => out.push_str(spec),
            None => {
                for _ in 0..run {
                    push_literal(&mut out, c);
                }
            }
        }
        i += run;
    }
    out
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}
