//! IRC case-mapping functions.
//!
//! IRC servers compare nicknames and channel names case-insensitively,
//! and under `rfc1459` some punctuation is also considered equivalent
//! (e.g. `[` and `{`). Which rule the session uses is a configuration
//! choice: see [`CaseMapping`].

use std::borrow::Cow;

/// Rule used to decide whether two nicks or channel names are the same.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CaseMapping {
    /// RFC 1459 mapping: ASCII letters plus `[]\~` ↔ `{}|^`.
    #[default]
    Rfc1459,
    /// Plain ASCII case folding.
    Ascii,
    /// Exact byte comparison, no folding at all.
    Strict,
}

impl CaseMapping {
    /// Fold `s` into the key used for lookups under this mapping.
    ///
    /// Borrows when the input is already folded.
    #[must_use]
    pub fn fold<'a>(&self, s: &'a str) -> Cow<'a, str> {
        let needs_folding = match self {
            CaseMapping::Strict => false,
            CaseMapping::Ascii => s.bytes().any(|b| b.is_ascii_uppercase()),
            CaseMapping::Rfc1459 => s.chars().any(|c| rfc1459_lower(c) != c),
        };
        if !needs_folding {
            return Cow::Borrowed(s);
        }
        match self {
            CaseMapping::Ascii => Cow::Owned(s.to_ascii_lowercase()),
            _ => Cow::Owned(irc_to_lower(s)),
        }
    }

    /// Compare two names under this mapping.
    #[must_use]
    pub fn equals(&self, a: &str, b: &str) -> bool {
        match self {
            CaseMapping::Strict => a == b,
            CaseMapping::Ascii => a.eq_ignore_ascii_case(b),
            CaseMapping::Rfc1459 => irc_eq(a, b),
        }
    }
}

#[inline]
fn rfc1459_lower(c: char) -> char {
    match c {
        '[' => '{',
        ']' => '}',
        '\\' => '|',
        '~' => '^',
        'A'..='Z' => c.to_ascii_lowercase(),
        _ => c,
    }
}

/// Convert a string to IRC lowercase using RFC 1459 case mapping.
///
/// In addition to ASCII lowercase conversion, this maps:
/// - `[` → `{`
/// - `]` → `}`
/// - `\` → `|`
/// - `~` → `^`
pub fn irc_to_lower(s: &str) -> String {
    s.chars().map(rfc1459_lower).collect()
}

/// Compare two strings using IRC case-insensitive comparison.
///
/// Uses the RFC 1459 case mapping where certain characters are equivalent.
pub fn irc_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.chars()
        .zip(b.chars())
        .all(|(ca, cb)| rfc1459_lower(ca) == rfc1459_lower(cb))
}
